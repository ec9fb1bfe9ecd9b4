#![cfg(test)]

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::ambient::{Invoke, set_global_invoke_kernel, set_invoke_kernel_provider, with_kernel};
use crate::context::Context;
use crate::kernel::{Error, Kernel, Scope};
use crate::tests::ambient_guard;

use super::common::{Db, FixtureUserRepo, GetUser, Tenant, UserRepo};

fn tenant(name: &str) -> Arc<Tenant> {
    Arc::new(Tenant(name.to_string()))
}

#[tokio::test]
async fn test_request_scoped_invocation() {
    let _guard = ambient_guard().await;
    let app = Kernel::new();
    let request = app.scoped().context::<Context<Tenant>>(tenant("acme"));

    let name = with_kernel(request, GetUser::invoke(2)).await.unwrap();
    assert_eq!(name, "acme/grace");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_see_their_own_tenant() {
    let _guard = ambient_guard().await;
    let app = Kernel::new();
    app.bind_with_scope::<UserRepo, UserRepo>(Scope::Singleton);
    let db = app.get::<Db>().unwrap();

    let mut handles = Vec::new();
    for i in 0..24 {
        let name = format!("tenant-{i}");
        let request = app.scoped().context::<Context<Tenant>>(tenant(&name));
        let delay = rand::thread_rng().gen_range(0..5);
        handles.push(tokio::spawn(with_kernel(request, async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            let reply = GetUser::invoke(1).await.unwrap();
            (name, reply)
        })));
    }

    for handle in handles {
        let (name, reply) = handle.await.unwrap();
        assert_eq!(reply, format!("{name}/ada"));
    }
    assert!(Arc::ptr_eq(&db, &app.get::<Db>().unwrap()));
}

#[tokio::test]
async fn test_provider_supplies_request_kernel() {
    let _guard = ambient_guard().await;
    let app = Kernel::new();
    app.bind::<UserRepo, FixtureUserRepo>();
    set_invoke_kernel_provider(move || {
        let request = app.scoped().context::<Context<Tenant>>(tenant("provided"));
        async move { Some(request) }
    });

    assert_eq!(GetUser::invoke(1).await.unwrap(), "provided/fixture");
}

#[tokio::test]
async fn test_global_kernel_fallback() {
    let _guard = ambient_guard().await;
    let app = Kernel::new();
    app.bind_value::<Context<Tenant>>(tenant("global"));
    set_global_invoke_kernel(app);

    assert_eq!(GetUser::invoke(2).await.unwrap(), "global/grace");
}

#[tokio::test]
async fn test_unconfigured_invocation_reports_missing_context() {
    let _guard = ambient_guard().await;
    let err = GetUser::invoke(1).await.unwrap_err();
    assert!(matches!(err, Error::ContextNotBound { .. }));
    assert!(err.to_string().contains("Tenant"));
}

#[tokio::test]
async fn test_explicit_kernel_invocation() {
    let app = Kernel::new();
    app.bind_value::<Context<Tenant>>(tenant("explicit"));
    let action = GetUser::with_kernel(&app);

    assert_eq!(action.invoke(1).await.unwrap(), "explicit/ada");
    assert_eq!(action.invoke(3).await.unwrap(), "explicit/unknown");
}
