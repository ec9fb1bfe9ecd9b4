//! # Strata Access Control
//!
//! Decides which component roles may depend on which others.
//!
//! Every component carries a [`Layer`] (its structural role) and a
//! [`Visibility`] (whether it can be reached from another module). The
//! rules are enforced twice:
//!
//! - **Statically**, through the role marker types in [`role`] and the
//!   [`Accepts`](role::Accepts) trait. `Dependencies::inject` only compiles
//!   when the target role accepts the declaring role, and the compiler names
//!   both roles when it does not.
//! - **At runtime**, by [`check_dependency`](policy::check_dependency), which
//!   runs every time a dependency is declared. It reads the target's
//!   descriptor, so per-component `allowed_parents` overrides are honoured.
//!   This check is authoritative.
//!
//! ## Layer table
//!
//! | target   | allowed dependents                         |
//! |----------|--------------------------------------------|
//! | action   | none                                       |
//! | service  | service, action                            |
//! | repo     | repo, service, action                      |
//! | facade   | repo, service, action, resource            |
//! | resource | action, service, repo, resource            |
//! | context  | action, service, repo, resource, context   |
//!
//! A facade declares its dependencies as a service would
//! ([`Layer::injects_as`]), so it may inject services, repos, facades,
//! resources and contexts.
pub mod error;
pub mod layer;
pub mod policy;
pub mod role;

pub use error::AccessError;
pub use layer::{Layer, Visibility};
pub use policy::check_dependency;
pub use role::{Accepts, Memoizable, Role};
