#![cfg(test)]

use std::sync::Arc;

use crate::access::{AccessError, Layer};
use crate::context::Context;
use crate::kernel::{Error, Kernel};

use super::common::{Db, LeakyProfileService, ProfileService, Tenant, UsersFacade};

fn request() -> Kernel {
    Kernel::new()
        .scoped()
        .context::<Context<Tenant>>(Arc::new(Tenant("initech".to_string())))
}

#[tokio::test]
async fn test_facade_bridges_modules() {
    let kernel = request();
    let profiles = kernel.get::<ProfileService>().unwrap();
    let card = profiles.card(1).await.unwrap();
    assert_eq!(card, "initech/ada <https://avatars.example/1.png>");
}

#[test]
fn test_facade_is_transient_but_its_service_is_per_fork() {
    let kernel = request();
    let a = kernel.get::<UsersFacade>().unwrap();
    let b = kernel.get::<UsersFacade>().unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&*a.service, &*b.service));
}

#[test]
fn test_reaching_past_the_facade_is_rejected() {
    let kernel = request();
    match kernel.get::<LeakyProfileService>() {
        Err(Error::Access(AccessError::CrossModuleViolation {
            parent_module,
            target_module,
            target_layer,
            ..
        })) => {
            assert_eq!(parent_module, "profiles");
            assert_eq!(target_module, "users");
            assert_eq!(target_layer, Layer::Repo);
        }
        other => panic!("expected a cross-module violation, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_resources_and_contexts_cross_modules() {
    let kernel = request();
    let profiles = kernel.get::<ProfileService>().unwrap();
    let users = profiles.users.service.clone();
    assert_eq!(users.tenant.0, "initech");
    assert!(kernel.get::<Db>().is_ok());
}
