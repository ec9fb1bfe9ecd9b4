/// Module that owns the built-in components such as `Context`.
pub const BUILTIN_MODULE: &str = "strata::builtin";

/// Unwrap key used by the built-in context component.
pub const CONTEXT_UNWRAP_KEY: &str = "value";

/// Depth of a kernel with no parent.
pub const ROOT_DEPTH: usize = 0;
