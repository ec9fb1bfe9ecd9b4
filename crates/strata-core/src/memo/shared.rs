use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use futures::future::{self, BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

/// A cached, cloneable handle on one execution of a memoized function.
pub type MemoFuture<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;

type Loader<A, T, E> = Arc<dyn Fn(A) -> BoxFuture<'static, Result<T, E>> + Send + Sync>;
type Entries<A, T, E> = Arc<Mutex<HashMap<A, Entry<T, E>>>>;

struct Entry<T, E> {
    // Distinguishes a re-installed entry from the one a settling future belongs to.
    generation: u64,
    future: MemoFuture<T, E>,
}

/// A memoized asynchronous function.
pub struct AsyncMemo<A, T, E> {
    loader: Loader<A, T, E>,
    entries: Entries<A, T, E>,
    generation: AtomicU64,
}

impl<A, T, E> AsyncMemo<A, T, E>
where
    A: Hash + Eq + Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(func: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            loader: Arc::new(move |args: A| func(args).boxed()),
            entries: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        }
    }

    /// Returns the cached execution for `args`, starting one on a miss. The
    /// entry is stored before it settles and removed if it settles to `Err`.
    pub fn call(&self, args: &A) -> MemoFuture<T, E> {
        if let Some(entry) = self.entries.lock().get(args) {
            return entry.future.clone();
        }
        let pending = (self.loader)(args.clone());
        self.install(args, pending, false)
    }

    /// Runs the function without reading or writing the cache.
    pub fn fresh(&self, args: &A) -> BoxFuture<'static, Result<T, E>> {
        (self.loader)(args.clone())
    }

    /// Like [`AsyncMemo::call`], and drives the execution on the current
    /// tokio runtime so it makes progress without an awaiting caller.
    pub fn preload(&self, args: &A) -> MemoFuture<T, E> {
        let future = self.call(args);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => drop(handle.spawn(future.clone())),
            Err(_) => log::debug!("Preload outside a tokio runtime; the work starts on first poll"),
        }
        future
    }

    /// Returns a setter installing a result for `args` as if computed.
    pub fn prime(&self, args: &A) -> AsyncPrimer<'_, A, T, E> {
        AsyncPrimer {
            memo: self,
            args: args.clone(),
        }
    }

    /// Evicts the entry for `args`. Returns whether one existed.
    pub fn bust(&self, args: &A) -> bool {
        self.entries.lock().remove(args).is_some()
    }

    /// Evicts every entry.
    pub fn bust_all(&self) {
        self.entries.lock().clear();
    }

    pub fn contains(&self, args: &A) -> bool {
        self.entries.lock().contains_key(args)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn install(
        &self,
        args: &A,
        pending: BoxFuture<'static, Result<T, E>>,
        replace: bool,
    ) -> MemoFuture<T, E> {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let settled = evict_on_error(Arc::downgrade(&self.entries), args.clone(), generation, pending);

        let mut entries = self.entries.lock();
        if !replace {
            // Another caller may have installed one while the loader ran.
            if let Some(existing) = entries.get(args) {
                return existing.future.clone();
            }
        }
        entries.insert(
            args.clone(),
            Entry {
                generation,
                future: settled.clone(),
            },
        );
        settled
    }
}

fn evict_on_error<A, T, E>(
    entries: Weak<Mutex<HashMap<A, Entry<T, E>>>>,
    key: A,
    generation: u64,
    pending: BoxFuture<'static, Result<T, E>>,
) -> MemoFuture<T, E>
where
    A: Hash + Eq + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    async move {
        let outcome = pending.await;
        if outcome.is_err() {
            if let Some(entries) = entries.upgrade() {
                let mut entries = entries.lock();
                if entries
                    .get(&key)
                    .is_some_and(|entry| entry.generation == generation)
                {
                    entries.remove(&key);
                    log::debug!("Evicted failed memo entry (generation {})", generation);
                }
            }
        }
        outcome
    }
    .boxed()
    .shared()
}

impl<A, T, E> fmt::Debug for AsyncMemo<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncMemo")
            .field("entries", &self.entries.lock().len())
            .finish()
    }
}

/// Setter returned by [`AsyncMemo::prime`].
#[must_use = "a primer does nothing until `value` or `future` is called"]
pub struct AsyncPrimer<'a, A, T, E> {
    memo: &'a AsyncMemo<A, T, E>,
    args: A,
}

impl<A, T, E> AsyncPrimer<'_, A, T, E>
where
    A: Hash + Eq + Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Installs a settled result.
    pub fn value(self, value: T) {
        let _ = self
            .memo
            .install(&self.args, future::ready(Ok(value)).boxed(), true);
    }

    /// Installs a pending result. If it settles to `Err`, the entry is
    /// evicted as for a computed one.
    pub fn future<Fut>(self, pending: Fut)
    where
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let _ = self.memo.install(&self.args, pending.boxed(), true);
    }
}
