//! Role marker types for the compile-time layer check.
//!
//! A component names its role through `Component::Role`. The kernel derives
//! the runtime [`Layer`] from [`Role::LAYER`], so the static and runtime
//! checks always agree on what a component is.
use crate::access::layer::Layer;

/// A structural role a component can play.
pub trait Role: Send + Sync + 'static {
    const LAYER: Layer;
}

/// Implemented by a target role for every role allowed to depend on it.
#[diagnostic::on_unimplemented(
    message = "a `{Parent}` component is not allowed to depend on a `{Self}` component",
    label = "forbidden dependency",
    note = "cross-layer access goes through a facade or a resource; \
            `Dependencies::inject_dynamic` defers the decision to the runtime check"
)]
pub trait Accepts<Parent: Role>: Role {}

/// Roles that receive the memoization capability.
#[diagnostic::on_unimplemented(
    message = "`{Self}` components cannot declare memoized functions",
    note = "only repos are memoizable; use `Memo::new` for a standalone cache"
)]
pub trait Memoizable: Role {}

macro_rules! roles {
    ($($(#[$doc:meta])* $name:ident => $layer:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
            pub struct $name;

            impl Role for $name {
                const LAYER: Layer = Layer::$layer;
            }
        )*
    };
}

macro_rules! accepts {
    ($target:ident <= $($parent:ident),*) => {
        $(impl Accepts<$parent> for $target {})*
    };
}

roles! {
    /// Entry-point role.
    Action => Action,
    /// Business-logic role.
    Service => Service,
    /// Data-access role.
    Repo => Repo,
    /// Cross-module entry role.
    Facade => Facade,
    /// Shared infrastructure role.
    Resource => Resource,
    /// Per-invocation value role.
    Context => Context,
}

// A facade injects with a service's rights, so it appears wherever Service does.
accepts!(Service <= Service, Action, Facade);
accepts!(Repo <= Repo, Service, Action, Facade);
accepts!(Facade <= Repo, Service, Action, Resource, Facade);
accepts!(Resource <= Action, Service, Repo, Resource, Facade);
accepts!(Context <= Action, Service, Repo, Resource, Context, Facade);

impl Memoizable for Repo {}
