use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

type MemoFn<A, R> = Arc<dyn Fn(&A) -> R + Send + Sync>;

/// A synchronous memoized function.
pub struct Memo<A, R> {
    func: MemoFn<A, R>,
    cache: Mutex<HashMap<A, R>>,
}

impl<A, R> Memo<A, R>
where
    A: Hash + Eq + Clone,
    R: Clone,
{
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached result for `args`, computing it on a miss.
    pub fn call(&self, args: &A) -> R {
        if let Some(hit) = self.cache.lock().get(args) {
            return hit.clone();
        }
        // The lock is released while computing so `func` may re-enter.
        let computed = (self.func)(args);
        self.cache
            .lock()
            .entry(args.clone())
            .or_insert(computed)
            .clone()
    }

    /// Runs the function without reading or writing the cache.
    pub fn fresh(&self, args: &A) -> R {
        (self.func)(args)
    }

    /// Same as [`Memo::call`]; marks a call whose result the caller ignores.
    pub fn preload(&self, args: &A) -> R {
        self.call(args)
    }

    /// Returns a setter installing a result for `args` as if computed.
    pub fn prime(&self, args: &A) -> Primer<'_, A, R> {
        Primer {
            memo: self,
            args: args.clone(),
        }
    }

    /// Evicts the entry for `args`. Returns whether one existed.
    pub fn bust(&self, args: &A) -> bool {
        self.cache.lock().remove(args).is_some()
    }

    /// Evicts every entry.
    pub fn bust_all(&self) {
        self.cache.lock().clear();
    }

    pub fn contains(&self, args: &A) -> bool {
        self.cache.lock().contains_key(args)
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }
}

impl<A, T, E> Memo<A, Result<T, E>>
where
    A: Hash + Eq + Clone,
    T: Clone,
    E: Clone,
{
    /// Like [`Memo::call`], but an `Err` is returned without being cached.
    pub fn try_call(&self, args: &A) -> Result<T, E> {
        if let Some(hit) = self.cache.lock().get(args) {
            return hit.clone();
        }
        let computed = (self.func)(args);
        if computed.is_ok() {
            self.cache.lock().insert(args.clone(), computed.clone());
        }
        computed
    }
}

impl<A, R> fmt::Debug for Memo<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("entries", &self.cache.lock().len())
            .finish()
    }
}

/// Setter returned by [`Memo::prime`].
#[must_use = "a primer does nothing until `value` is called"]
pub struct Primer<'a, A, R> {
    memo: &'a Memo<A, R>,
    args: A,
}

impl<A, R> Primer<'_, A, R>
where
    A: Hash + Eq + Clone,
    R: Clone,
{
    pub fn value(self, value: R) {
        self.memo.cache.lock().insert(self.args, value);
    }
}
