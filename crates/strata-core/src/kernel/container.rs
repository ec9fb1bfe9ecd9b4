use std::any::{TypeId, type_name};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, ReentrantMutex, RwLock};

use crate::config::{KernelConfig, RootInvokePolicy};
use crate::inject::Dependencies;
use crate::kernel::binding::{Binding, BindingRegistry};
use crate::kernel::component::{Component, Descriptor, Instance, short_type_name};
use crate::kernel::constants::ROOT_DEPTH;
use crate::kernel::error::{Error, Result};
use crate::kernel::scope::Scope;

/// Constructs an implementation on behalf of a key.
pub type BuildFn = fn(&Kernel, &mut ResolutionTrail) -> Result<Instance>;

type InstanceCache = Mutex<HashMap<TypeId, Instance>>;

static NEXT_KERNEL_ID: AtomicU64 = AtomicU64::new(1);

/// Component types under construction on the current resolution path.
#[derive(Debug, Default)]
pub struct ResolutionTrail {
    stack: Vec<(TypeId, &'static str)>,
}

impl ResolutionTrail {
    pub(crate) fn new() -> Self {
        Self { stack: Vec::new() }
    }

    fn enter(&mut self, key: TypeId, name: &'static str) -> Result<()> {
        if self.stack.iter().any(|(entered, _)| *entered == key) {
            let mut path: Vec<&'static str> = self
                .stack
                .iter()
                .skip_while(|(entered, _)| *entered != key)
                .map(|(_, entered_name)| short_type_name(entered_name))
                .collect();
            path.push(short_type_name(name));
            return Err(Error::CircularDependency { path });
        }
        self.stack.push((key, name));
        Ok(())
    }

    fn exit(&mut self) {
        self.stack.pop();
    }

}

struct KernelNode {
    id: u64,
    depth: usize,
    parent: Option<Kernel>,
    config: Arc<KernelConfig>,
    bindings: RwLock<BindingRegistry>,
    // Singletons of keys bound on this node. The root also holds the
    // singletons of unbound keys.
    singletons: InstanceCache,
    // Never populated on the root.
    invoke_cache: InstanceCache,
    // Only locked on the root; serialises resolution across the tree.
    resolution: ReentrantMutex<()>,
    degraded: Mutex<HashSet<TypeId>>,
}

/// A node in the resolution tree.
///
/// `Kernel` is a cheap handle; clones share the same node. A singleton is
/// cached on the node that owns its binding, or on the root for unbound
/// keys, so it is shared by every kernel that sees that binding.
/// [`Kernel::scoped`] forks a child that inherits bindings and singletons
/// and owns its own invoke cache and binding overrides.
#[derive(Clone)]
pub struct Kernel {
    node: Arc<KernelNode>,
}

impl Kernel {
    /// Creates an empty root kernel with the default configuration.
    pub fn new() -> Self {
        Self::with_config(KernelConfig::default())
    }

    /// Creates an empty root kernel.
    pub fn with_config(config: KernelConfig) -> Self {
        let kernel = Self::from_node(None, ROOT_DEPTH, Arc::new(config));
        log::debug!("Created root kernel #{}", kernel.id());
        kernel
    }

    fn from_node(parent: Option<Kernel>, depth: usize, config: Arc<KernelConfig>) -> Self {
        Self {
            node: Arc::new(KernelNode {
                id: NEXT_KERNEL_ID.fetch_add(1, Ordering::Relaxed),
                depth,
                parent,
                config,
                bindings: RwLock::new(BindingRegistry::new()),
                singletons: Mutex::new(HashMap::new()),
                invoke_cache: Mutex::new(HashMap::new()),
                resolution: ReentrantMutex::new(()),
                degraded: Mutex::new(HashSet::new()),
            }),
        }
    }

    /// Forks a child kernel representing one bounded unit of work.
    pub fn scoped(&self) -> Kernel {
        let child = Self::from_node(
            Some(self.clone()),
            self.node.depth + 1,
            Arc::clone(&self.node.config),
        );
        log::debug!("Forked kernel #{} from #{}", child.id(), self.id());
        child
    }

    pub fn id(&self) -> u64 {
        self.node.id
    }

    /// Number of forks between this kernel and its root.
    pub fn depth(&self) -> usize {
        self.node.depth
    }

    pub fn is_root(&self) -> bool {
        self.node.parent.is_none()
    }

    pub fn parent(&self) -> Option<&Kernel> {
        self.node.parent.as_ref()
    }

    pub fn root(&self) -> &Kernel {
        let mut current = self;
        while let Some(parent) = &current.node.parent {
            current = parent;
        }
        current
    }

    pub fn config(&self) -> &KernelConfig {
        &self.node.config
    }

    /// Whether two handles point at the same node.
    pub fn same_as(&self, other: &Kernel) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    // --- Bindings ---

    /// Resolves `K` by constructing `I` instead, with `I`'s default scope.
    pub fn bind<K, I>(&self) -> &Self
    where
        K: Component,
        I: Component<Resolved = K::Resolved>,
    {
        self.bind_implementation::<K, I>(None)
    }

    /// Resolves `K` by constructing `I` instead, with `scope`.
    pub fn bind_with_scope<K, I>(&self, scope: Scope) -> &Self
    where
        K: Component,
        I: Component<Resolved = K::Resolved>,
    {
        self.bind_implementation::<K, I>(Some(scope))
    }

    fn bind_implementation<K, I>(&self, scope: Option<Scope>) -> &Self
    where
        K: Component,
        I: Component<Resolved = K::Resolved>,
    {
        let binding = Binding::Implementation {
            implementation: type_name::<I>(),
            build: build_component::<I>,
            default_scope: I::descriptor().scope,
            scope,
        };
        self.install::<K>(binding)
    }

    /// Resolves `K` to `value` itself. Defaults to singleton scope.
    pub fn bind_value<K: Component>(&self, value: K::Resolved) -> &Self {
        self.bind_value_with_scope::<K>(value, Scope::Singleton)
    }

    pub fn bind_value_with_scope<K: Component>(&self, value: K::Resolved, scope: Scope) -> &Self {
        let binding = Binding::Value {
            value: Instance::value(value),
            scope,
        };
        self.install::<K>(binding)
    }

    /// Binds `value` for `K` at invoke scope and returns this kernel, so a
    /// fork can be configured in one expression.
    pub fn context<K: Component>(&self, value: K::Resolved) -> Kernel {
        self.bind_value_with_scope::<K>(value, Scope::Invoke);
        self.clone()
    }

    /// Removes this node's binding for `K`. Ancestors' bindings are untouched.
    pub fn unbind<K: Component>(&self) -> bool {
        let key = TypeId::of::<K>();
        let removed = self.node.bindings.write().remove(&key).is_some();
        if removed {
            self.evict_singleton(key);
            log::debug!("Kernel #{}: unbound {}", self.id(), type_name::<K>());
        }
        removed
    }

    /// Whether `K` is bound on this kernel or an ancestor.
    pub fn is_bound<K: Component>(&self) -> bool {
        self.lookup(TypeId::of::<K>()).is_some()
    }

    /// Keys bound directly on this node.
    pub fn bound_keys(&self) -> Vec<&'static str> {
        self.node.bindings.read().key_names()
    }

    fn install<K: Component>(&self, binding: Binding) -> &Self {
        let key = TypeId::of::<K>();
        log::debug!(
            "Kernel #{}: bound {} -> {:?}",
            self.id(),
            type_name::<K>(),
            binding
        );
        self.node
            .bindings
            .write()
            .insert(key, type_name::<K>(), binding);
        self.evict_singleton(key);
        self
    }

    // Only this node's cache: a binding change on a fork never reaches
    // singletons owned by its ancestors.
    fn evict_singleton(&self, key: TypeId) {
        if self.node.singletons.lock().remove(&key).is_some() {
            log::debug!("Kernel #{}: evicted cached singleton", self.id());
        }
    }

    /// The nearest binding for `key` and the kernel that owns it.
    fn lookup(&self, key: TypeId) -> Option<(&Kernel, Binding)> {
        let mut current = Some(self);
        while let Some(kernel) = current {
            if let Some(binding) = kernel.node.bindings.read().get(&key) {
                return Some((kernel, binding.clone()));
            }
            current = kernel.parent();
        }
        None
    }

    // --- Resolution ---

    /// Returns the raw resolved instance or bound value for `K`.
    pub fn resolve<K: Component>(&self) -> Result<Instance> {
        self.resolve_traced::<K>(None, &mut ResolutionTrail::new())
    }

    /// Like [`Kernel::resolve`], forcing `scope`.
    pub fn resolve_in<K: Component>(&self, scope: Scope) -> Result<Instance> {
        self.resolve_traced::<K>(Some(scope), &mut ResolutionTrail::new())
    }

    /// Resolves `K` and projects it onto `K::Resolved`, applying the
    /// component's unwrap. Value bindings are returned as bound.
    pub fn get<K: Component>(&self) -> Result<K::Resolved> {
        self.get_traced::<K>(None, &mut ResolutionTrail::new())
    }

    /// Like [`Kernel::get`], forcing `scope`.
    pub fn get_in<K: Component>(&self, scope: Scope) -> Result<K::Resolved> {
        self.get_traced::<K>(Some(scope), &mut ResolutionTrail::new())
    }

    /// Constructs a fresh `T`, ignoring any binding for `T` itself. Its
    /// dependencies still resolve through the binding graph.
    pub fn create<T: Component>(&self) -> Result<Arc<T>> {
        let _resolving = self.root().node.resolution.lock();
        self.instantiate::<T>(&mut ResolutionTrail::new())
    }

    pub(crate) fn get_traced<K: Component>(
        &self,
        scope: Option<Scope>,
        trail: &mut ResolutionTrail,
    ) -> Result<K::Resolved> {
        let instance = self.resolve_traced::<K>(scope, trail)?;
        instance
            .resolved_as::<K::Resolved>()
            .ok_or(Error::TypeMismatch {
                key: type_name::<K>(),
                expected: type_name::<K::Resolved>(),
            })
    }

    pub(crate) fn resolve_traced<K: Component>(
        &self,
        requested: Option<Scope>,
        trail: &mut ResolutionTrail,
    ) -> Result<Instance> {
        let root = self.root();
        let _resolving = root.node.resolution.lock();
        let key = TypeId::of::<K>();

        let (owner, binding) = match self.lookup(key) {
            Some((owner, binding)) => (owner, Some(binding)),
            None => (root, None),
        };

        let (build, implementation, scope) = match &binding {
            Some(Binding::Value { value, .. }) => {
                self.trace(format_args!("{} -> bound value", type_name::<K>()));
                return Ok(value.clone());
            }
            Some(
                bound @ Binding::Implementation {
                    build,
                    implementation,
                    ..
                },
            ) => (
                *build,
                *implementation,
                requested.unwrap_or_else(|| bound.effective_scope()),
            ),
            None => (
                build_component::<K> as BuildFn,
                type_name::<K>(),
                requested.unwrap_or_else(|| K::descriptor().scope),
            ),
        };

        self.trace(format_args!(
            "{} -> {} ({})",
            type_name::<K>(),
            short_type_name(implementation),
            scope
        ));

        match scope {
            Scope::Singleton => self.cached(&owner.node.singletons, key, build, trail),
            Scope::Invoke if !self.is_root() => self.cached(&self.node.invoke_cache, key, build, trail),
            Scope::Invoke => {
                self.unscoped_invoke::<K>(key)?;
                build(self, trail)
            }
            Scope::Transient => build(self, trail),
        }
    }

    fn cached(
        &self,
        cache: &InstanceCache,
        key: TypeId,
        build: BuildFn,
        trail: &mut ResolutionTrail,
    ) -> Result<Instance> {
        if let Some(hit) = cache.lock().get(&key).cloned() {
            return Ok(hit);
        }
        let created = build(self, trail)?;
        cache.lock().insert(key, created.clone());
        Ok(created)
    }

    // Invoke scope on a root has no fork to cache in.
    fn unscoped_invoke<K: Component>(&self, key: TypeId) -> Result<()> {
        match self.config().root_invoke {
            RootInvokePolicy::Reject => Err(Error::RootInvokeRejected {
                component: type_name::<K>(),
            }),
            RootInvokePolicy::Degrade => {
                if self.node.degraded.lock().insert(key) {
                    log::warn!(
                        "{} is invoke-scoped but was resolved on root kernel #{}; \
                         a new instance is created per resolution",
                        type_name::<K>(),
                        self.id()
                    );
                }
                Ok(())
            }
        }
    }

    pub(crate) fn instantiate<T: Component>(&self, trail: &mut ResolutionTrail) -> Result<Arc<T>> {
        let descriptor = T::descriptor();
        trail.enter(TypeId::of::<T>(), descriptor.name)?;
        let built = self.construct_with::<T>(&descriptor, trail);
        trail.exit();
        built
    }

    fn construct_with<T: Component>(
        &self,
        descriptor: &Descriptor,
        trail: &mut ResolutionTrail,
    ) -> Result<Arc<T>> {
        let mut deps = Dependencies::<T>::new(descriptor);
        let instance = T::construct(&mut deps)?;
        deps.substitute(self, trail)?;
        Ok(Arc::new(instance))
    }

    fn trace(&self, args: fmt::Arguments<'_>) {
        if self.config().trace_resolution {
            log::debug!("Kernel #{}: {}", self.id(), args);
        }
    }
}

pub(crate) fn build_component<I: Component>(
    kernel: &Kernel,
    trail: &mut ResolutionTrail,
) -> Result<Instance> {
    kernel.instantiate::<I>(trail).map(Instance::constructed)
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("id", &self.node.id)
            .field("depth", &self.node.depth)
            .field("parent", &self.node.parent.as_ref().map(Kernel::id))
            .field("bindings", &self.node.bindings.read().key_names())
            .finish()
    }
}
