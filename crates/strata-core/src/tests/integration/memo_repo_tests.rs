#![cfg(test)]

use std::sync::Arc;
use std::sync::atomic::Ordering;

use crate::context::Context;
use crate::kernel::{Kernel, Scope};

use super::common::{AvatarRepo, Db, Tenant, UserRepo, UserService};

fn request(root: &Kernel) -> Kernel {
    root.scoped()
        .context::<Context<Tenant>>(Arc::new(Tenant("acme".to_string())))
}

#[test]
fn test_repo_memo_lives_per_fork() {
    let root = Kernel::new();
    let db = root.get::<Db>().unwrap();

    let first = request(&root);
    let service = first.get::<UserService>().unwrap();
    service.display_name(1);
    service.display_name(1);
    first.get::<UserService>().unwrap().display_name(1);
    assert_eq!(db.queries.load(Ordering::SeqCst), 1);

    request(&root).get::<UserService>().unwrap().display_name(1);
    assert_eq!(db.queries.load(Ordering::SeqCst), 2);
}

#[test]
fn test_singleton_repo_shares_its_memo() {
    let root = Kernel::new();
    root.bind_with_scope::<UserRepo, UserRepo>(Scope::Singleton);
    let db = root.get::<Db>().unwrap();

    request(&root).get::<UserService>().unwrap().display_name(2);
    request(&root).get::<UserService>().unwrap().display_name(2);
    assert_eq!(db.queries.load(Ordering::SeqCst), 1);
}

#[test]
fn test_busting_the_repo_memo_requeries() {
    let root = Kernel::new();
    let db = root.get::<Db>().unwrap();
    let fork = request(&root);
    let repo = fork.resolve::<UserRepo>().unwrap().downcast::<UserRepo>().unwrap();

    assert_eq!(repo.names.call(&1).as_deref(), Some("ada"));
    db.insert(1, "lovelace");
    assert_eq!(repo.names.call(&1).as_deref(), Some("ada"));

    repo.names.bust(&1);
    assert_eq!(repo.names.call(&1).as_deref(), Some("lovelace"));
    assert_eq!(db.queries.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_async_repo_memo_shares_and_evicts() {
    let fork = Kernel::new().scoped();
    let repo = fork.get::<AvatarRepo>().unwrap();

    let (a, b) = tokio::join!(repo.avatars.call(&3), repo.avatars.call(&3));
    assert_eq!(a, b);
    assert_eq!(repo.fetches.load(Ordering::SeqCst), 1);

    assert!(repo.avatars.call(&0).await.is_err());
    assert!(!repo.avatars.contains(&0));
    assert!(repo.avatars.call(&0).await.is_err());
    assert_eq!(repo.fetches.load(Ordering::SeqCst), 3);

    repo.avatars.prime(&4).value("https://cdn.example/4.png".to_string());
    assert_eq!(
        repo.avatars.call(&4).await.as_deref(),
        Ok("https://cdn.example/4.png")
    );
    assert_eq!(repo.fetches.load(Ordering::SeqCst), 3);

    let sibling = Kernel::new().scoped().get::<AvatarRepo>().unwrap();
    assert!(!sibling.avatars.contains(&3));
}
