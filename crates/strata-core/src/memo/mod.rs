//! # Strata Memoization
//!
//! Per-instance function-result caches keyed by the structural hash of the
//! call arguments (`Hash + Eq` on the argument tuple).
//!
//! - [`Memo`] wraps a synchronous function.
//! - [`AsyncMemo`] wraps a function returning a future of `Result`. The
//!   pending future is cached before it settles, so concurrent callers share
//!   one execution, and an `Err` outcome evicts its entry so the next call
//!   runs the function again.
//!
//! Both expose `call`, `fresh`, `preload`, `prime`, `bust` and `bust_all`.
//! A memo lives inside the component that declared it, so its cache lives
//! exactly as long as that instance: per fork for invoke-scoped repos.
pub mod cache;
pub mod shared;

pub use cache::{Memo, Primer};
pub use shared::{AsyncMemo, AsyncPrimer, MemoFuture};
