use std::any::TypeId;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::access::policy::check_dependency;
use crate::access::role::{Accepts, Memoizable};
use crate::inject::dep::{Dep, Placeholder};
use crate::kernel::component::{Component, Descriptor};
use crate::kernel::container::{Kernel, ResolutionTrail};
use crate::kernel::error::Result;
use crate::kernel::scope::Scope;
use crate::memo::{AsyncMemo, Memo};

type Fill = Box<dyn FnOnce(&Kernel, &mut ResolutionTrail) -> Result<()>>;

struct Pending {
    placeholder: Placeholder,
    fill: Fill,
}

/// Declaration context handed to `Component::construct` for component `P`.
pub struct Dependencies<'a, P: Component> {
    parent: &'a Descriptor,
    pending: Vec<Pending>,
    _component: PhantomData<fn() -> P>,
}

impl<'a, P: Component> Dependencies<'a, P> {
    pub(crate) fn new(parent: &'a Descriptor) -> Self {
        Self {
            parent,
            pending: Vec::new(),
            _component: PhantomData,
        }
    }

    /// Descriptor of the component being constructed.
    pub fn descriptor(&self) -> &Descriptor {
        self.parent
    }

    /// Declares a dependency on `T` at `T`'s own scope.
    ///
    /// Fails with an access violation if `T` does not accept `P`, or if `T`
    /// lives in another module and is not globally visible.
    pub fn inject<T>(&mut self) -> Result<Dep<T>>
    where
        T: Component,
        T::Role: Accepts<P::Role>,
    {
        self.declare::<T>(None)
    }

    /// Declares a dependency on `T`, forcing `scope` when it is resolved.
    pub fn inject_in<T>(&mut self, scope: Scope) -> Result<Dep<T>>
    where
        T: Component,
        T::Role: Accepts<P::Role>,
    {
        self.declare::<T>(Some(scope))
    }

    /// Declares a dependency without the compile-time role bound; only the
    /// runtime policy applies. Needed when a target widens its
    /// `allowed_parents` beyond its role's defaults.
    pub fn inject_dynamic<T: Component>(&mut self, scope: Option<Scope>) -> Result<Dep<T>> {
        self.declare::<T>(scope)
    }

    fn declare<T: Component>(&mut self, scope: Option<Scope>) -> Result<Dep<T>> {
        let target = T::descriptor();
        check_dependency(self.parent, &target)?;

        let placeholder = Placeholder {
            key: TypeId::of::<T>(),
            name: target.name,
            scope: scope.unwrap_or(target.scope),
            overridden: scope.is_some(),
        };
        let dep = Dep::<T>::pending(placeholder);
        let slot = dep.slot();
        self.pending.push(Pending {
            placeholder,
            fill: Box::new(move |kernel: &Kernel, trail: &mut ResolutionTrail| {
                let resolved = kernel.get_traced::<T>(placeholder.requested_scope(), trail)?;
                // A slot is only ever filled by its own pending entry.
                let _ = slot.set(resolved);
                Ok(())
            }),
        });
        Ok(dep)
    }

    /// Placeholders declared so far, in declaration order.
    pub fn declared(&self) -> Vec<Placeholder> {
        self.pending.iter().map(|pending| pending.placeholder).collect()
    }

    /// Creates a memoized function owned by the component being built.
    pub fn memo<A, R, F>(&self, func: F) -> Memo<A, R>
    where
        P::Role: Memoizable,
        A: Hash + Eq + Clone,
        R: Clone,
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        Memo::new(func)
    }

    /// Creates a memoized asynchronous function owned by the component being
    /// built.
    pub fn memo_async<A, T, E, F, Fut>(&self, func: F) -> AsyncMemo<A, T, E>
    where
        P::Role: Memoizable,
        A: Hash + Eq + Clone + Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
    {
        AsyncMemo::new(func)
    }

    /// Second phase: resolve every placeholder against `kernel`.
    pub(crate) fn substitute(self, kernel: &Kernel, trail: &mut ResolutionTrail) -> Result<()> {
        for pending in self.pending {
            log::trace!(
                "Substituting {} into {} ({})",
                pending.placeholder.name,
                self.parent.name,
                pending.placeholder.scope
            );
            (pending.fill)(kernel, trail)?;
        }
        Ok(())
    }
}

impl<P: Component> fmt::Debug for Dependencies<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependencies")
            .field("component", &self.parent.name)
            .field("declared", &self.declared())
            .finish()
    }
}
