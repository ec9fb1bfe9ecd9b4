//! # Strata Core
//!
//! A hierarchical dependency-resolution kernel with layered access control,
//! scope-aware instance caching, per-instance memoization and ambient kernel
//! discovery for asynchronous entry points.
//!
//! ```ignore
//! let app = Kernel::new();
//! app.bind_with_scope::<UserRepo, CachedUserRepo>(Scope::Singleton);
//!
//! let request = app.scoped().context::<Context<RequestId>>(Arc::new(RequestId(7)));
//! let user = with_kernel(request, GetUser::invoke(42)).await?;
//! ```
pub mod access;
pub mod ambient;
pub mod config;
pub mod context;
pub mod inject;
pub mod kernel;
pub mod memo;

pub use access::{AccessError, Layer, Visibility, role};
pub use ambient::{
    Action, Invoke, KernelSource, WithKernel, discover_kernel, invoke_kernel, with_kernel,
    with_kernel_sync,
};
pub use config::{KernelConfig, RootInvokePolicy};
pub use context::Context;
pub use inject::{Dep, Dependencies};
pub use kernel::{Component, Descriptor, Error, Instance, Kernel, Result, Scope};
pub use memo::{AsyncMemo, Memo};

// Test module declaration
#[cfg(test)]
mod tests;
