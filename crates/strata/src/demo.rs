//! In-binary component graph used by `strata demo`.
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use strata_core::memo::Memo;
use strata_core::{
    Action, Component, Context, Dep, Dependencies, Error, Invoke, Kernel, KernelConfig, Result,
    Scope, role, with_kernel,
};

const USERS: &str = "users";

struct Db {
    rows: HashMap<u32, &'static str>,
}

impl Component for Db {
    type Role = role::Resource;
    type Resolved = Arc<Self>;
    const MODULE: &'static str = "infra";

    fn construct(_deps: &mut Dependencies<'_, Self>) -> Result<Self> {
        info!("Opening in-memory database");
        Ok(Self {
            rows: HashMap::from([(1, "ada"), (2, "grace")]),
        })
    }

    fn resolved(self: Arc<Self>) -> Arc<Self> {
        self
    }
}

struct RequestId(u32);

struct UserRepo {
    db: Dep<Db>,
    names: Memo<u32, Option<String>>,
}

impl Component for UserRepo {
    type Role = role::Repo;
    type Resolved = Arc<Self>;
    const MODULE: &'static str = USERS;

    fn construct(deps: &mut Dependencies<'_, Self>) -> Result<Self> {
        let db = deps.inject::<Db>()?;
        let rows = db.clone();
        Ok(Self {
            db,
            names: deps.memo(move |id: &u32| rows.rows.get(id).map(|name| name.to_string())),
        })
    }

    fn resolved(self: Arc<Self>) -> Arc<Self> {
        self
    }
}

struct UserService {
    repo: Dep<UserRepo>,
    request: Dep<Context<RequestId>>,
}

impl Component for UserService {
    type Role = role::Service;
    type Resolved = Arc<Self>;
    const MODULE: &'static str = USERS;

    fn construct(deps: &mut Dependencies<'_, Self>) -> Result<Self> {
        Ok(Self {
            repo: deps.inject::<UserRepo>()?,
            request: deps.inject::<Context<RequestId>>()?,
        })
    }

    fn resolved(self: Arc<Self>) -> Arc<Self> {
        self
    }
}

struct GetUser {
    service: Dep<UserService>,
}

impl Component for GetUser {
    type Role = role::Action;
    type Resolved = Arc<Self>;
    const MODULE: &'static str = USERS;

    fn construct(deps: &mut Dependencies<'_, Self>) -> Result<Self> {
        Ok(Self {
            service: deps.inject::<UserService>()?,
        })
    }

    fn resolved(self: Arc<Self>) -> Arc<Self> {
        self
    }
}

#[async_trait]
impl Action for GetUser {
    type Args = u32;
    type Output = String;

    async fn handle(&self, id: u32) -> String {
        let name = self.service.repo.names.call(&id);
        format!(
            "request {}: user {} is {}",
            self.service.request.0,
            id,
            name.as_deref().unwrap_or("unknown")
        )
    }
}

struct Identities {
    service: Arc<UserService>,
    repo: Arc<UserRepo>,
    db: Arc<Db>,
}

impl Identities {
    fn resolve(kernel: &Kernel) -> Result<Self> {
        let service = kernel.get::<UserService>()?;
        let repo = Arc::clone(&*service.repo);
        let db = Arc::clone(&*repo.db);
        Ok(Self { service, repo, db })
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn request(app: &Kernel, id: u32) -> Kernel {
    app.scoped()
        .context::<Context<RequestId>>(Arc::new(RequestId(id)))
}

/// Resolves the graph on two request forks and reports what was shared.
pub async fn run(config: KernelConfig) -> Result<()> {
    println!(
        "Kernel config: root_invoke={}, trace_resolution={}",
        config.root_invoke.as_str(),
        config.trace_resolution
    );
    let app = Kernel::with_config(config);

    let mut seen = Vec::new();
    for id in 1..=2 {
        let fork = request(&app, id);
        let reply = with_kernel(fork.clone(), GetUser::invoke(id)).await?;
        let ids = Identities::resolve(&fork)?;
        println!("{}", reply);
        println!("  service={:p} repo={:p} db={:p}", ids.service, ids.repo, ids.db);
        seen.push(ids);
    }
    let (a, b) = (&seen[0], &seen[1]);
    println!("db shared across requests: {}", yes_no(Arc::ptr_eq(&a.db, &b.db)));
    println!(
        "service and repo per request: {}",
        yes_no(!Arc::ptr_eq(&a.service, &b.service) && !Arc::ptr_eq(&a.repo, &b.repo))
    );

    match app.get::<UserRepo>() {
        Ok(_) => println!("root resolution of an invoke-scoped repo: degraded"),
        Err(Error::RootInvokeRejected { .. }) => {
            println!("root resolution of an invoke-scoped repo: rejected")
        }
        Err(e) => return Err(e),
    }

    app.bind_with_scope::<UserRepo, UserRepo>(Scope::Singleton);
    let first = Identities::resolve(&request(&app, 3))?;
    let second = Identities::resolve(&request(&app, 4))?;
    println!(
        "repo shared after singleton rebinding: {}",
        yes_no(Arc::ptr_eq(&first.repo, &second.repo) && !Arc::ptr_eq(&first.service, &second.service))
    );
    Ok(())
}
