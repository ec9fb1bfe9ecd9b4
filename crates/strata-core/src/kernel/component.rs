use std::any::{Any, type_name};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::access::layer::{Layer, Visibility};
use crate::access::role::Role;
use crate::inject::Dependencies;
use crate::kernel::error::Result;
use crate::kernel::scope::Scope;

/// A constructible unit the kernel can resolve.
///
/// The type itself is the registry key. `Resolved` is what dependents and
/// [`Kernel::get`](crate::Kernel::get) receive: usually `Arc<Self>`, an
/// `Arc<dyn Trait>` when the key is meant to be rebound to other
/// implementations, or a projected field when the component unwraps.
///
/// ```ignore
/// struct UserService {
///     repo: Dep<UserRepo>,
/// }
///
/// impl Component for UserService {
///     type Role = role::Service;
///     type Resolved = Arc<Self>;
///     const MODULE: &'static str = "users";
///
///     fn construct(deps: &mut Dependencies<'_, Self>) -> Result<Self> {
///         Ok(Self { repo: deps.inject::<UserRepo>()? })
///     }
///
///     fn resolved(self: Arc<Self>) -> Arc<Self> {
///         self
///     }
/// }
/// ```
pub trait Component: Any + Send + Sync + Sized {
    /// Role marker; fixes the component's [`Layer`].
    type Role: Role;
    /// What a resolution of this key hands out.
    type Resolved: Clone + Send + Sync + 'static;
    /// Logical module (namespace) the component belongs to.
    const MODULE: &'static str;

    /// Metadata used by the kernel and the access policy. Override to change
    /// the default scope, visibility, allowed parents or unwrap key.
    fn descriptor() -> Descriptor {
        Descriptor::of::<Self>()
    }

    /// First construction phase. Declare dependencies through `deps`; the
    /// returned `Dep` fields stay inert until the kernel substitutes them.
    fn construct(deps: &mut Dependencies<'_, Self>) -> Result<Self>;

    /// Projects a constructed instance onto [`Component::Resolved`].
    fn resolved(self: Arc<Self>) -> Self::Resolved;
}

/// Static metadata describing a component type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    /// Fully qualified type name.
    pub name: &'static str,
    pub module: &'static str,
    pub layer: Layer,
    pub visibility: Visibility,
    /// Default scope when neither the caller nor a binding picks one.
    pub scope: Scope,
    /// Name of the field `resolved()` projects onto, if any.
    pub unwrap: Option<&'static str>,
    /// Layers allowed to depend on this component.
    pub allowed_parents: Cow<'static, [Layer]>,
}

impl Descriptor {
    /// Descriptor with the defaults of `layer`.
    pub fn new(name: &'static str, module: &'static str, layer: Layer) -> Self {
        Self {
            name,
            module,
            layer,
            visibility: layer.default_visibility(),
            scope: layer.default_scope(),
            unwrap: None,
            allowed_parents: Cow::Borrowed(layer.default_parents()),
        }
    }

    /// Default descriptor for a component type.
    pub fn of<C: Component>() -> Self {
        Self::new(type_name::<C>(), C::MODULE, <C::Role as Role>::LAYER)
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_unwrap(mut self, key: &'static str) -> Self {
        self.unwrap = Some(key);
        self
    }

    pub fn with_allowed_parents(mut self, parents: &[Layer]) -> Self {
        self.allowed_parents = Cow::Owned(parents.to_vec());
        self
    }
}

pub(crate) fn short_type_name(name: &'static str) -> &'static str {
    let base = name.split('<').next().unwrap_or(name);
    match base.rfind("::") {
        Some(idx) => &name[idx + 2..],
        None => name,
    }
}

/// Type-erased shared value.
pub type Erased = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Constructed(&'static str),
    Value,
}

/// A raw resolution result, as returned by [`Kernel::resolve`](crate::Kernel::resolve).
///
/// Holds both the raw instance (for constructed components) and its
/// projection onto the key's `Resolved` type. Value bindings hold the value
/// for both, so they are never unwrapped.
#[derive(Clone)]
pub struct Instance {
    raw: Erased,
    resolved: Erased,
    origin: Origin,
}

impl Instance {
    pub(crate) fn constructed<I: Component>(instance: Arc<I>) -> Self {
        let resolved: Erased = Arc::new(Arc::clone(&instance).resolved());
        Self {
            raw: instance,
            resolved,
            origin: Origin::Constructed(type_name::<I>()),
        }
    }

    pub(crate) fn value<R: Clone + Send + Sync + 'static>(value: R) -> Self {
        let erased: Erased = Arc::new(value);
        Self {
            raw: Arc::clone(&erased),
            resolved: erased,
            origin: Origin::Value,
        }
    }

    /// The constructed instance, if it is an `I`.
    pub fn downcast<I: Component>(&self) -> Option<Arc<I>> {
        Arc::clone(&self.raw).downcast::<I>().ok()
    }

    /// The bound value, if this came from a value binding holding an `R`.
    pub fn value_as<R: Clone + 'static>(&self) -> Option<R> {
        match self.origin {
            Origin::Value => self.raw.downcast_ref::<R>().cloned(),
            Origin::Constructed(_) => None,
        }
    }

    pub(crate) fn resolved_as<R: Clone + 'static>(&self) -> Option<R> {
        self.resolved.downcast_ref::<R>().cloned()
    }

    pub fn is_value(&self) -> bool {
        matches!(self.origin, Origin::Value)
    }

    /// Name of the implementation type, or `None` for value bindings.
    pub fn implementation(&self) -> Option<&'static str> {
        match self.origin {
            Origin::Constructed(name) => Some(name),
            Origin::Value => None,
        }
    }

    /// Identity comparison of the underlying instances.
    pub fn same_as(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.raw, &other.raw)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("origin", &self.origin)
            .field("ptr", &Arc::as_ptr(&self.raw).cast::<()>())
            .finish()
    }
}
