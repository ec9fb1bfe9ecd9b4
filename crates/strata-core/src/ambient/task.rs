use std::future::Future;

use crate::kernel::Kernel;

tokio::task_local! {
    static CURRENT_KERNEL: Kernel;
}

/// Runs `future` with `kernel` as the current task's ambient kernel.
pub async fn with_kernel<F: Future>(kernel: Kernel, future: F) -> F::Output {
    CURRENT_KERNEL.scope(kernel, future).await
}

/// Runs `f` with `kernel` as the ambient kernel for its synchronous extent.
pub fn with_kernel_sync<R>(kernel: Kernel, f: impl FnOnce() -> R) -> R {
    CURRENT_KERNEL.sync_scope(kernel, f)
}

/// The kernel installed by the innermost enclosing [`with_kernel`].
pub fn kernel_from_context() -> Option<Kernel> {
    CURRENT_KERNEL.try_with(Kernel::clone).ok()
}
