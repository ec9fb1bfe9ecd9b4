pub mod integration;

use std::sync::LazyLock;

use tokio::sync::{Mutex, MutexGuard};

// Discovery reads process-wide state, so every test that discovers a kernel
// or installs a provider or global kernel holds this.
static AMBIENT_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) async fn ambient_guard() -> MutexGuard<'static, ()> {
    let guard = AMBIENT_LOCK.lock().await;
    crate::ambient::reset_ambient();
    guard
}
