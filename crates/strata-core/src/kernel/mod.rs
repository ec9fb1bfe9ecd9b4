//! # Strata Kernel
//!
//! The resolution tree. A [`Kernel`] owns a binding registry and the caches
//! for the three lifetime [`Scope`]s:
//!
//! - `singleton` instances are cached on the kernel that owns the key's
//!   binding (the root for unbound keys) and shared below it;
//! - `invoke` instances are cached on the fork that resolved them;
//! - `transient` instances are never cached.
//!
//! Components are declared by implementing [`Component`]; the type itself
//! is the registry key. Bindings on a fork shadow those of its ancestors.
pub mod binding;
pub mod component;
pub mod constants;
pub mod container;
pub mod error;
pub mod scope;

pub use binding::{Binding, BindingRegistry};
pub use component::{Component, Descriptor, Erased, Instance};
pub use container::{BuildFn, Kernel, ResolutionTrail};
pub use error::{Error, Result};
pub use scope::Scope;
