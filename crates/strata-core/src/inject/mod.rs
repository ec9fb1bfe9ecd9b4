//! # Strata Dependency Declaration
//!
//! Two-phase construction. In the first phase a component's
//! `Component::construct` declares its dependencies through
//! [`Dependencies`]; each declaration is checked against the access policy
//! immediately and yields an inert [`Dep`] placeholder. In the second phase
//! the constructing kernel resolves every declared placeholder, using the
//! scope recorded on it, and fills the `Dep` in place before the instance is
//! handed out.
pub mod declare;
pub mod dep;

pub use declare::Dependencies;
pub use dep::{Dep, Placeholder};
