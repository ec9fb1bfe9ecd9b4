#![cfg(test)]

use std::sync::Arc;

use crate::context::Context;
use crate::kernel::{Kernel, Scope};

use super::common::{Db, FixtureUserRepo, GetUser, Tenant, UserRepo, UserService};

fn request(root: &Kernel, tenant: &str) -> Kernel {
    root.scoped()
        .context::<Context<Tenant>>(Arc::new(Tenant(tenant.to_string())))
}

fn repo_of(kernel: &Kernel) -> Arc<UserRepo> {
    kernel
        .resolve::<UserRepo>()
        .unwrap()
        .downcast::<UserRepo>()
        .unwrap()
}

#[test]
fn test_forks_get_own_service_and_repo_but_share_db() {
    let root = Kernel::new();
    let first = request(&root, "acme");
    let second = request(&root, "acme");

    let action_a = first.get::<GetUser>().unwrap();
    let action_b = second.get::<GetUser>().unwrap();

    let service_a = first.get::<UserService>().unwrap();
    let service_b = second.get::<UserService>().unwrap();
    assert!(Arc::ptr_eq(&*action_a.service, &service_a));
    assert!(Arc::ptr_eq(&*action_b.service, &service_b));
    assert!(!Arc::ptr_eq(&service_a, &service_b));

    let repo_a = repo_of(&first);
    let repo_b = repo_of(&second);
    assert!(!Arc::ptr_eq(&repo_a, &repo_b));
    assert!(Arc::ptr_eq(&*service_a.repo, &first.get::<UserRepo>().unwrap()));

    let db = root.get::<Db>().unwrap();
    assert!(Arc::ptr_eq(&*repo_a.db, &db));
    assert!(Arc::ptr_eq(&*repo_b.db, &db));
}

#[test]
fn test_singleton_rebinding_outlives_invoke_scoped_parent() {
    let root = Kernel::new();
    root.bind_with_scope::<UserRepo, FixtureUserRepo>(Scope::Singleton);

    let service_a = request(&root, "acme").get::<UserService>().unwrap();
    let service_b = request(&root, "acme").get::<UserService>().unwrap();

    assert!(!Arc::ptr_eq(&service_a, &service_b));
    assert!(Arc::ptr_eq(&*service_a.repo, &*service_b.repo));
    assert_eq!(service_a.repo.kind(), "fixture");
    assert_eq!(service_a.display_name(1), "acme/fixture");
}

#[test]
fn test_rebinding_back_evicts_the_singleton_repo() {
    let root = Kernel::new();
    root.bind_with_scope::<UserRepo, FixtureUserRepo>(Scope::Singleton);
    let before = request(&root, "acme").get::<UserRepo>().unwrap();
    assert_eq!(before.kind(), "fixture");

    root.bind_with_scope::<UserRepo, UserRepo>(Scope::Singleton);
    let after_a = request(&root, "acme").get::<UserRepo>().unwrap();
    let after_b = request(&root, "acme").get::<UserRepo>().unwrap();
    assert_eq!(after_a.kind(), "db");
    assert!(Arc::ptr_eq(&after_a, &after_b));
    assert!(!Arc::ptr_eq(&before, &after_a));
}

#[test]
fn test_fork_override_does_not_leak_to_siblings() {
    let root = Kernel::new();
    let overridden = request(&root, "acme");
    overridden.bind::<UserRepo, FixtureUserRepo>();
    let plain = request(&root, "acme");

    assert_eq!(overridden.get::<UserService>().unwrap().display_name(1), "acme/fixture");
    assert_eq!(plain.get::<UserService>().unwrap().display_name(1), "acme/ada");
}

#[test]
fn test_nested_fork_inherits_parent_context() {
    let root = Kernel::new();
    let outer = request(&root, "globex");
    let inner = outer.scoped();

    let service = inner.get::<UserService>().unwrap();
    assert_eq!(service.display_name(2), "globex/grace");
    // Invoke scope caches on the fork that resolved it.
    assert!(!Arc::ptr_eq(&service, &outer.get::<UserService>().unwrap()));
}
