//! Process-wide ambient state: the provider hook (tier 1) and the global
//! kernel (tier 3). Both are set and cleared explicitly; [`reset_ambient`]
//! returns the process to its initial state.
use std::future::Future;
use std::sync::{Arc, LazyLock};

use futures::future::{BoxFuture, FutureExt};
use parking_lot::RwLock;

use crate::kernel::Kernel;

/// Asynchronous function yielding the kernel for the current invocation.
/// Returning `None` defers to the next discovery tier.
pub type KernelProvider = Arc<dyn Fn() -> BoxFuture<'static, Option<Kernel>> + Send + Sync>;

#[derive(Default)]
struct AmbientState {
    provider: RwLock<Option<KernelProvider>>,
    global: RwLock<Option<Kernel>>,
}

static AMBIENT: LazyLock<AmbientState> = LazyLock::new(AmbientState::default);

pub fn set_invoke_kernel_provider<F, Fut>(provider: F)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<Kernel>> + Send + 'static,
{
    let provider: KernelProvider = Arc::new(move || provider().boxed());
    *AMBIENT.provider.write() = Some(provider);
    log::debug!("Installed invoke kernel provider");
}

pub fn clear_invoke_kernel_provider() {
    *AMBIENT.provider.write() = None;
}

/// Runs the installed provider, if any.
pub async fn kernel_from_provider() -> Option<Kernel> {
    let provider = AMBIENT.provider.read().clone();
    match provider {
        Some(provider) => provider().await,
        None => None,
    }
}

/// Installs the kernel that invocations fork from when nothing more
/// specific is available.
pub fn set_global_invoke_kernel(kernel: Kernel) {
    log::debug!("Installed kernel #{} as global invoke kernel", kernel.id());
    *AMBIENT.global.write() = Some(kernel);
}

pub fn clear_global_invoke_kernel() {
    *AMBIENT.global.write() = None;
}

/// The global kernel itself, not a fork of it.
pub fn kernel_from_global() -> Option<Kernel> {
    AMBIENT.global.read().clone()
}

/// Clears the provider and the global kernel.
pub fn reset_ambient() {
    clear_invoke_kernel_provider();
    clear_global_invoke_kernel();
}
