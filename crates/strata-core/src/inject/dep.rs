use std::any::TypeId;
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

use crate::kernel::component::Component;
use crate::kernel::scope::Scope;

/// What a dependency declaration recorded: the target and the scope to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    pub key: TypeId,
    pub name: &'static str,
    /// The override if one was declared, else the target's default scope.
    pub scope: Scope,
    /// Whether `scope` was declared explicitly.
    pub overridden: bool,
}

impl Placeholder {
    /// Scope to force during substitution. Without an explicit override the
    /// kernel falls back to the binding's scope, then the target's default.
    pub fn requested_scope(&self) -> Option<Scope> {
        self.overridden.then_some(self.scope)
    }
}

/// A declared dependency on `T`, filled with `T::Resolved` by the kernel
/// that constructs the owning component.
///
/// `Dep` dereferences to the resolved value.
///
/// # Panics
///
/// Dereferencing before substitution panics. That can only happen inside
/// the owning component's own `construct`, which runs before the kernel
/// resolves its placeholders.
pub struct Dep<T: Component> {
    placeholder: Placeholder,
    slot: Arc<OnceLock<T::Resolved>>,
}

impl<T: Component> Dep<T> {
    pub(crate) fn pending(placeholder: Placeholder) -> Self {
        Self {
            placeholder,
            slot: Arc::new(OnceLock::new()),
        }
    }

    pub(crate) fn slot(&self) -> Arc<OnceLock<T::Resolved>> {
        Arc::clone(&self.slot)
    }

    pub fn placeholder(&self) -> &Placeholder {
        &self.placeholder
    }

    /// The resolved value, or `None` while still a placeholder.
    pub fn get(&self) -> Option<&T::Resolved> {
        self.slot.get()
    }

    pub fn is_resolved(&self) -> bool {
        self.slot.get().is_some()
    }
}

impl<T: Component> Clone for Dep<T> {
    fn clone(&self) -> Self {
        Self {
            placeholder: self.placeholder,
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: Component> Deref for Dep<T> {
    type Target = T::Resolved;

    fn deref(&self) -> &Self::Target {
        match self.slot.get() {
            Some(resolved) => resolved,
            None => panic!(
                "dependency on {} was used before the kernel resolved it",
                self.placeholder.name
            ),
        }
    }
}

impl<T: Component> fmt::Debug for Dep<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dep")
            .field("target", &self.placeholder.name)
            .field("scope", &self.placeholder.scope)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
