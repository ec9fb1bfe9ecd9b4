use std::marker::PhantomData;

use async_trait::async_trait;

use crate::access::role;
use crate::ambient::discover_kernel;
use crate::kernel::{Component, Kernel, Result};

/// An entry-point component with a single handling method.
#[async_trait]
pub trait Action: Component<Role = role::Action> {
    type Args: Send + 'static;
    type Output: Send + 'static;

    async fn handle(&self, args: Self::Args) -> Self::Output;
}

/// Entry points for running an [`Action`]. Implemented for every action.
#[async_trait]
pub trait Invoke: Action {
    /// Discovers the ambient kernel, constructs the action on it and runs
    /// its handler.
    async fn invoke(args: Self::Args) -> Result<Self::Output>;

    /// Binds the action to `kernel`; each `invoke` runs on a new fork of it.
    fn with_kernel(kernel: &Kernel) -> WithKernel<Self>;
}

#[async_trait]
impl<A: Action> Invoke for A {
    async fn invoke(args: A::Args) -> Result<A::Output> {
        let (kernel, _) = discover_kernel().await;
        let action = kernel.create::<A>()?;
        Ok(action.handle(args).await)
    }

    fn with_kernel(kernel: &Kernel) -> WithKernel<A> {
        WithKernel {
            kernel: kernel.clone(),
            _action: PhantomData,
        }
    }
}

/// An action bound to an explicit kernel.
pub struct WithKernel<A> {
    kernel: Kernel,
    _action: PhantomData<fn() -> A>,
}

impl<A: Action> WithKernel<A> {
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub async fn invoke(&self, args: A::Args) -> Result<A::Output> {
        let scoped = self.kernel.scoped();
        let action = scoped.create::<A>()?;
        Ok(action.handle(args).await)
    }
}
