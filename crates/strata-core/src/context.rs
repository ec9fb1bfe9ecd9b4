//! Built-in context component.
use std::any::type_name;
use std::sync::Arc;

use crate::access::role;
use crate::access::Visibility;
use crate::inject::Dependencies;
use crate::kernel::constants::{BUILTIN_MODULE, CONTEXT_UNWRAP_KEY};
use crate::kernel::{Component, Descriptor, Error, Result, Scope};

/// A per-invocation value of type `C`, visible to every layer that accepts
/// contexts, in every module.
///
/// A context is never constructed; it only resolves when a value was bound
/// on the kernel or one of its ancestors:
///
/// ```ignore
/// let request = kernel.scoped().context::<Context<RequestId>>(Arc::new(RequestId(7)));
/// let id: Arc<RequestId> = request.get::<Context<RequestId>>()?;
/// ```
pub struct Context<C> {
    value: Arc<C>,
}

impl<C> Context<C> {
    pub fn value(&self) -> &Arc<C> {
        &self.value
    }
}

impl<C: Send + Sync + 'static> Component for Context<C> {
    type Role = role::Context;
    type Resolved = Arc<C>;
    const MODULE: &'static str = BUILTIN_MODULE;

    fn descriptor() -> Descriptor {
        Descriptor::of::<Self>()
            .with_visibility(Visibility::Global)
            .with_scope(Scope::Invoke)
            .with_unwrap(CONTEXT_UNWRAP_KEY)
    }

    fn construct(_deps: &mut Dependencies<'_, Self>) -> Result<Self> {
        Err(Error::ContextNotBound {
            context: type_name::<C>(),
        })
    }

    fn resolved(self: Arc<Self>) -> Arc<C> {
        Arc::clone(&self.value)
    }
}
