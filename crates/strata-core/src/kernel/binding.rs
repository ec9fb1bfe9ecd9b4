use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use crate::kernel::component::Instance;
use crate::kernel::container::BuildFn;
use crate::kernel::scope::Scope;

/// Registry entry overriding how a key resolves.
#[derive(Clone)]
pub enum Binding {
    /// Construct `implementation` instead of the key type.
    Implementation {
        implementation: &'static str,
        build: BuildFn,
        /// The implementation's own default scope.
        default_scope: Scope,
        /// Scope recorded at bind time, if one was given.
        scope: Option<Scope>,
    },
    /// Return a literal value; nothing is instantiated.
    Value { value: Instance, scope: Scope },
}

impl Binding {
    /// The scope this binding resolves with when the caller gives none.
    pub fn effective_scope(&self) -> Scope {
        match self {
            Binding::Implementation {
                scope,
                default_scope,
                ..
            } => scope.unwrap_or(*default_scope),
            Binding::Value { scope, .. } => *scope,
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Implementation {
                implementation,
                default_scope,
                scope,
                ..
            } => f
                .debug_struct("Implementation")
                .field("implementation", implementation)
                .field("default_scope", default_scope)
                .field("scope", scope)
                .finish(),
            Binding::Value { value, scope } => f
                .debug_struct("Value")
                .field("value", value)
                .field("scope", scope)
                .finish(),
        }
    }
}

/// Bindings owned by one kernel node, keyed by the key type's `TypeId`.
#[derive(Default, Debug)]
pub struct BindingRegistry {
    bindings: HashMap<TypeId, (&'static str, Binding)>,
}

impl BindingRegistry {
    /// Create a new empty binding registry
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Insert or replace the binding for `key`. Returns the previous one.
    pub fn insert(&mut self, key: TypeId, key_name: &'static str, binding: Binding) -> Option<Binding> {
        self.bindings
            .insert(key, (key_name, binding))
            .map(|(_, previous)| previous)
    }

    pub fn get(&self, key: &TypeId) -> Option<&Binding> {
        self.bindings.get(key).map(|(_, binding)| binding)
    }

    pub fn remove(&mut self, key: &TypeId) -> Option<Binding> {
        self.bindings.remove(key).map(|(_, binding)| binding)
    }

    /// Names of every bound key.
    pub fn key_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.bindings.values().map(|(name, _)| *name).collect();
        names.sort_unstable();
        names
    }
}
