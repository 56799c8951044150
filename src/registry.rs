//! Named installation of callbacks into a [`State`].
//!
//! Each method synthesizes one callback and stores it in the named global
//! slot. The methods chain:
//!
//! ```
//! use stackbind::prelude::*;
//!
//! let mut state = State::new();
//! Registry::new(&mut state)
//!     .function("double", |x: i64| x * 2)?
//!     .overload(
//!         "sum",
//!         OverloadSet::new()
//!             .with(function(|a: i64, b: i64| a + b))
//!             .with(function(|a: i64, b: i64, c: i64| a + b + c)),
//!     )?;
//!
//! assert_eq!(state.call_global("double", vec![Dynamic::Int(4)])?, vec![Dynamic::Int(8)]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use stackbind_core::{FromDynamic, IntoDynamic, IntoResults, NativeFn, RawCallback, State};
use tracing::{debug, warn};

use crate::closure::{self, IntoNativeFn};
use crate::constructor::ConstructorList;
use crate::deferred::FunctionArgs;
use crate::error::RegistrationError;
use crate::member::Field;
use crate::overload::OverloadSet;
use crate::property::PropertyPair;
use crate::receiver::IntoReceiver;
use crate::signature::{Function, Method};

/// Installs callbacks into the global slots of a [`State`].
pub struct Registry<'s> {
    state: &'s mut State,
}

impl<'s> Registry<'s> {
    pub fn new(state: &'s mut State) -> Self {
        Self { state }
    }

    pub fn state(&mut self) -> &mut State {
        &mut *self.state
    }

    /// Store a finished callback under `name`. Re-registering a name
    /// replaces the previous slot.
    pub fn install(&mut self, name: &str, callback: NativeFn) -> Result<&mut Self, RegistrationError> {
        if name.is_empty() {
            return Err(RegistrationError::EmptyName);
        }
        let info = callback.info();
        if let Some(previous) = self.state.set_global(name, callback) {
            warn!(name, previous = previous.type_name(), "replaced existing slot");
        }
        debug!(name, shape = ?info.shape, binding = ?info.binding, arity = %info.arity, "installed callback");
        Ok(self)
    }

    /// Install anything [`IntoNativeFn`] accepts.
    pub fn set<M>(&mut self, name: &str, value: impl IntoNativeFn<M>) -> Result<&mut Self, RegistrationError> {
        let callback = value.into_native_fn().map_err(|err| err.named(name))?;
        self.install(name, callback)
    }

    /// Install a raw-shaped callback with no wrapping.
    pub fn raw(&mut self, name: &str, callback: RawCallback) -> Result<&mut Self, RegistrationError> {
        self.install(name, closure::direct(callback))
    }

    pub fn function<F, M>(&mut self, name: &str, callable: F) -> Result<&mut Self, RegistrationError>
    where
        F: Function<M>,
        F::Output: IntoResults,
        M: 'static,
    {
        self.install(name, closure::function(callable))
    }

    pub fn method<F, M>(&mut self, name: &str, callable: F) -> Result<&mut Self, RegistrationError>
    where
        F: Method<M>,
        F::Output: IntoResults,
        M: 'static,
    {
        self.install(name, closure::method(callable))
    }

    pub fn method_bound<F, M, R>(
        &mut self,
        name: &str,
        callable: F,
        receiver: R,
    ) -> Result<&mut Self, RegistrationError>
    where
        F: Method<M>,
        F::Output: IntoResults,
        M: 'static,
        R: IntoReceiver<F::Receiver>,
    {
        self.install(name, closure::method_bound(callable, receiver))
    }

    pub fn field<T, V>(&mut self, name: &str, field: Field<T, V>) -> Result<&mut Self, RegistrationError>
    where
        T: 'static,
        V: FromDynamic + IntoDynamic + Clone + 'static,
    {
        self.install(name, closure::field(field))
    }

    pub fn field_bound<T, V, R>(
        &mut self,
        name: &str,
        field: Field<T, V>,
        receiver: R,
    ) -> Result<&mut Self, RegistrationError>
    where
        T: 'static,
        V: FromDynamic + IntoDynamic + Clone + 'static,
        R: IntoReceiver<T>,
    {
        self.install(name, closure::field_bound(field, receiver))
    }

    pub fn overload(&mut self, name: &str, set: OverloadSet) -> Result<&mut Self, RegistrationError> {
        let callback = set.into_native_fn().map_err(|err| err.named(name))?;
        self.install(name, callback)
    }

    pub fn property(&mut self, name: &str, pair: PropertyPair) -> Result<&mut Self, RegistrationError> {
        let callback = pair.into_native_fn().map_err(|err| err.named(name))?;
        self.install(name, callback)
    }

    pub fn constructors<T: 'static>(
        &mut self,
        name: &str,
        list: ConstructorList<T>,
    ) -> Result<&mut Self, RegistrationError> {
        self.install(name, list.into_native_fn()?)
    }

    /// Synthesize a deferred callable and install it.
    pub fn deferred(&mut self, name: &str, args: FunctionArgs) -> Result<&mut Self, RegistrationError> {
        let callback = args.synthesize().map_err(|err| err.named(name))?;
        self.install(name, callback)
    }
}
