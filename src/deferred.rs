//! Callables captured now and synthesized when they are installed.

use std::fmt;

use stackbind_core::{IntoResults, NativeFn};

use crate::closure::{IntoNativeFn, Prebuilt, method_bound};
use crate::error::RegistrationError;
use crate::receiver::IntoReceiver;
use crate::signature::Method;

type Synthesize = Box<dyn FnOnce() -> Result<NativeFn, RegistrationError>>;

/// A callable bundled with its binding arguments, not yet wrapped.
///
/// Nothing is classified or allocated until [`synthesize`](Self::synthesize)
/// runs, which [`Registry::deferred`](crate::Registry::deferred) does at
/// installation time.
pub struct FunctionArgs {
    description: &'static str,
    synthesize: Synthesize,
}

impl FunctionArgs {
    /// Defer any installable callable.
    pub fn new<F, M>(callable: F) -> Self
    where
        F: IntoNativeFn<M> + 'static,
    {
        Self {
            description: std::any::type_name::<F>(),
            synthesize: Box::new(move || callable.into_native_fn()),
        }
    }

    /// Defer a member function together with its bound receiver.
    ///
    /// The receiver is converted right away, so a reference binding captures
    /// its target now even though the callback is built later.
    pub fn bound<F, M, R>(callable: F, receiver: R) -> Self
    where
        F: Method<M>,
        F::Output: IntoResults,
        M: 'static,
        R: IntoReceiver<F::Receiver>,
    {
        let receiver = receiver.into_receiver();
        Self {
            description: std::any::type_name::<F>(),
            synthesize: Box::new(move || Ok(method_bound(callable, receiver))),
        }
    }

    /// Build the callback.
    pub fn synthesize(self) -> Result<NativeFn, RegistrationError> {
        (self.synthesize)()
    }
}

impl fmt::Debug for FunctionArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionArgs")
            .field("callable", &self.description)
            .finish()
    }
}

impl IntoNativeFn<Prebuilt> for FunctionArgs {
    fn into_native_fn(self) -> Result<NativeFn, RegistrationError> {
        self.synthesize()
    }
}
