//! # Strata Ambient Kernel
//!
//! Lets parameterless entry points such as [`Invoke::invoke`] find "the
//! current kernel" without it being passed down explicitly. Discovery tries,
//! in order:
//!
//! 1. the provider installed with [`set_invoke_kernel_provider`];
//! 2. the kernel installed for the current task with [`with_kernel`];
//! 3. a fresh fork of the global kernel set with [`set_global_invoke_kernel`];
//! 4. a new, empty root kernel.
//!
//! Tier 2 is tokio task-local storage. It stays visible across every
//! `.await` inside the scoped future and never leaks into other tasks,
//! including tasks spawned from inside the scope.
pub mod action;
pub mod global;
pub mod task;

pub use action::{Action, Invoke, WithKernel};
pub use global::{
    KernelProvider, clear_global_invoke_kernel, clear_invoke_kernel_provider, kernel_from_global,
    kernel_from_provider, reset_ambient, set_global_invoke_kernel, set_invoke_kernel_provider,
};
pub use task::{kernel_from_context, with_kernel, with_kernel_sync};

use std::fmt;

use crate::kernel::Kernel;

/// Which discovery tier produced a kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelSource {
    Provider,
    Context,
    Global,
    Fresh,
}

impl fmt::Display for KernelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KernelSource::Provider => "provider",
            KernelSource::Context => "task context",
            KernelSource::Global => "global kernel",
            KernelSource::Fresh => "fresh kernel",
        };
        f.write_str(name)
    }
}

/// Finds the kernel an invocation should resolve against.
pub async fn discover_kernel() -> (Kernel, KernelSource) {
    let (kernel, source) = if let Some(kernel) = kernel_from_provider().await {
        (kernel, KernelSource::Provider)
    } else if let Some(kernel) = kernel_from_context() {
        (kernel, KernelSource::Context)
    } else if let Some(global) = kernel_from_global() {
        (global.scoped(), KernelSource::Global)
    } else {
        (Kernel::new(), KernelSource::Fresh)
    };
    log::debug!("Invocation kernel #{} from {}", kernel.id(), source);
    (kernel, source)
}

/// The kernel an invocation should resolve against.
pub async fn invoke_kernel() -> Kernel {
    discover_kernel().await.0
}
