#![cfg(test)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rand::Rng;
use tokio::sync::Barrier;

use crate::access::role;
use crate::context::Context;
use crate::inject::{Dep, Dependencies};
use crate::kernel::{Component, Kernel, Result};

use super::common::{Tenant, UserService};

const TASKS: usize = 16;

// Each counter belongs to a type built only by one test below.
static POOL_BUILDS: AtomicUsize = AtomicUsize::new(0);
static SESSION_BUILDS: AtomicUsize = AtomicUsize::new(0);

struct Pool;

impl Component for Pool {
    type Role = role::Resource;
    type Resolved = Arc<Self>;
    const MODULE: &'static str = "infra";

    fn construct(_deps: &mut Dependencies<'_, Self>) -> Result<Self> {
        POOL_BUILDS.fetch_add(1, Ordering::SeqCst);
        Ok(Self)
    }

    fn resolved(self: Arc<Self>) -> Arc<Self> {
        self
    }
}

struct Session {
    pool: Dep<Pool>,
}

impl Component for Session {
    type Role = role::Service;
    type Resolved = Arc<Self>;
    const MODULE: &'static str = "sessions";

    fn construct(deps: &mut Dependencies<'_, Self>) -> Result<Self> {
        SESSION_BUILDS.fetch_add(1, Ordering::SeqCst);
        Ok(Self {
            pool: deps.inject::<Pool>()?,
        })
    }

    fn resolved(self: Arc<Self>) -> Arc<Self> {
        self
    }
}

fn jitter() -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(0..3))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_interleaved_tasks_share_one_invoke_instance() {
    let fork = Kernel::new()
        .scoped()
        .context::<Context<Tenant>>(Arc::new(Tenant("acme".to_string())));
    let barrier = Arc::new(Barrier::new(TASKS));

    let mut handles = Vec::new();
    for _ in 0..TASKS {
        let fork = fork.clone();
        let barrier = Arc::clone(&barrier);
        let delay = jitter();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            tokio::time::sleep(delay).await;
            let service = fork.get::<UserService>().unwrap();
            tokio::task::yield_now().await;
            let again = fork.get::<UserService>().unwrap();
            assert!(Arc::ptr_eq(&service, &again));
            service
        }));
    }

    let mut services = Vec::new();
    for handle in handles {
        services.push(handle.await.unwrap());
    }
    let first = &services[0];
    assert!(services.iter().all(|service| Arc::ptr_eq(service, first)));
    assert!(Arc::ptr_eq(&*first.repo, &*fork.get::<UserService>().unwrap().repo));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_singleton_raced_from_forks_is_built_once() {
    let root = Kernel::new();
    let shared_fork = root.scoped();
    let barrier = Arc::new(Barrier::new(TASKS));

    let mut handles = Vec::new();
    for i in 0..TASKS {
        // Half the tasks race on one fork, the rest on forks of their own.
        let kernel = if i % 2 == 0 {
            shared_fork.clone()
        } else {
            root.scoped()
        };
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            let session = kernel.get::<Session>().unwrap();
            (kernel, session)
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    assert_eq!(POOL_BUILDS.load(Ordering::SeqCst), 1);
    let pool = root.get::<Pool>().unwrap();
    assert!(results.iter().all(|(_, session)| Arc::ptr_eq(&*session.pool, &pool)));

    // One session for the shared fork plus one per private fork.
    assert_eq!(SESSION_BUILDS.load(Ordering::SeqCst), 1 + TASKS / 2);
    let shared_session = shared_fork.get::<Session>().unwrap();
    for (kernel, session) in &results {
        assert_eq!(
            Arc::ptr_eq(session, &shared_session),
            kernel.same_as(&shared_fork)
        );
    }
}
