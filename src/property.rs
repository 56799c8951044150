//! Property pairs: a read accessor and a write accessor behind one slot.

use stackbind_core::{CallbackShape, NativeFn};

use crate::closure::{IntoNativeFn, Prebuilt};
use crate::error::RegistrationError;
use crate::overload::OverloadedFunction;

/// Which halves of a property are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyAccess {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

/// A `{read, write}` accessor pair.
///
/// A pair with one half installs that accessor directly. A pair with both
/// routes on the argument count, the same way a raw member variable does:
/// the read accessor gets `(receiver)`, the write accessor gets
/// `(receiver, value)`, and any other count is a dispatch error.
///
/// ```
/// use stackbind::{Dynamic, PropertyPair, State, method};
///
/// struct Thermostat {
///     target: f64,
/// }
///
/// let target = PropertyPair::read_write(
///     method(|t: &Thermostat| t.target),
///     method(|t: &mut Thermostat, value: f64| t.target = value.clamp(5.0, 30.0)),
/// )
/// .into_native_fn()?;
///
/// let mut state = State::new();
/// let thermostat = state.allocate(Thermostat { target: 20.0 });
/// let Dynamic::Object(handle) = thermostat else { unreachable!() };
///
/// state.call(&target, vec![Dynamic::Object(handle), Dynamic::Float(42.0)])?;
/// let out = state.call(&target, vec![Dynamic::Object(handle)])?;
/// assert_eq!(out, vec![Dynamic::Float(30.0)]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PropertyPair {
    read: Option<NativeFn>,
    write: Option<NativeFn>,
}

impl PropertyPair {
    pub fn new(read: Option<NativeFn>, write: Option<NativeFn>) -> Self {
        Self { read, write }
    }

    pub fn read_write(read: NativeFn, write: NativeFn) -> Self {
        Self::new(Some(read), Some(write))
    }

    pub fn read_only(read: NativeFn) -> Self {
        Self::new(Some(read), None)
    }

    pub fn write_only(write: NativeFn) -> Self {
        Self::new(None, Some(write))
    }

    pub fn read(&self) -> Option<&NativeFn> {
        self.read.as_ref()
    }

    pub fn write(&self) -> Option<&NativeFn> {
        self.write.as_ref()
    }

    /// `None` when neither half is present.
    pub fn access(&self) -> Option<PropertyAccess> {
        match (&self.read, &self.write) {
            (Some(_), Some(_)) => Some(PropertyAccess::ReadWrite),
            (Some(_), None) => Some(PropertyAccess::ReadOnly),
            (None, Some(_)) => Some(PropertyAccess::WriteOnly),
            (None, None) => None,
        }
    }

    /// Build the slot's callback. The access mode is fixed from here on.
    pub fn into_native_fn(self) -> Result<NativeFn, RegistrationError> {
        match (self.read, self.write) {
            (Some(read), Some(write)) => {
                Ok(OverloadedFunction::new(vec![read, write]).into_native_fn(CallbackShape::Property))
            }
            (Some(accessor), None) | (None, Some(accessor)) => Ok(accessor),
            (None, None) => Err(RegistrationError::EmptyProperty {
                name: String::new(),
            }),
        }
    }
}

impl IntoNativeFn<Prebuilt> for PropertyPair {
    fn into_native_fn(self) -> Result<NativeFn, RegistrationError> {
        PropertyPair::into_native_fn(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{function, method, method_bound};
    use stackbind_core::{Arity, Dynamic, NativeError, State};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Lamp {
        lit: bool,
    }

    fn pair() -> PropertyPair {
        PropertyPair::read_write(
            method(|l: &Lamp| l.lit),
            method(|l: &mut Lamp, lit: bool| l.lit = lit),
        )
    }

    #[test]
    fn access_follows_present_halves() {
        assert_eq!(pair().access(), Some(PropertyAccess::ReadWrite));
        assert_eq!(
            PropertyPair::read_only(function(|| 1i64)).access(),
            Some(PropertyAccess::ReadOnly)
        );
        assert_eq!(
            PropertyPair::write_only(function(|_: i64| ())).access(),
            Some(PropertyAccess::WriteOnly)
        );
        assert_eq!(PropertyPair::default().access(), None);
    }

    #[test]
    fn single_half_installs_directly() {
        let read = function(|| 5i64);
        let slot = PropertyPair::read_only(read.clone()).into_native_fn().unwrap();
        assert!(slot.ptr_eq(&read));
        assert_eq!(slot.shape(), CallbackShape::FreeFunction);
    }

    #[test]
    fn empty_pair_is_rejected() {
        assert!(matches!(
            PropertyPair::new(None, None).into_native_fn(),
            Err(RegistrationError::EmptyProperty { .. })
        ));
    }

    #[test]
    fn read_write_folds_on_arity() {
        let slot = pair().into_native_fn().unwrap();
        assert_eq!(slot.shape(), CallbackShape::Property);
        assert_eq!(slot.arity(), Arity::range(1, 2));

        let mut state = State::new();
        let lamp = state.allocate(Lamp { lit: false });
        let Dynamic::Object(handle) = lamp else {
            panic!("expected an object slot");
        };

        let written = state
            .call(&slot, vec![Dynamic::Object(handle), Dynamic::Bool(true)])
            .unwrap();
        assert!(written.is_empty());
        let read = state.call(&slot, vec![Dynamic::Object(handle)]).unwrap();
        assert_eq!(read, vec![Dynamic::Bool(true)]);
    }

    #[test]
    fn other_arities_are_dispatch_errors() {
        let slot = pair().into_native_fn().unwrap();
        let mut state = State::new();
        let lamp = state.allocate(Lamp { lit: false });
        let Dynamic::Object(handle) = lamp else {
            panic!("expected an object slot");
        };

        for args in [
            vec![],
            vec![Dynamic::Object(handle), Dynamic::Bool(true), Dynamic::Bool(false)],
        ] {
            let err = state.call(&slot, args).unwrap_err();
            assert!(matches!(err, NativeError::Dispatch(_)));
            assert_eq!(
                err.as_dispatch().unwrap().candidates,
                vec![Arity::exact(1), Arity::exact(2)]
            );
        }
        assert_eq!(state.stack_depth(), 0);
    }

    #[test]
    fn mistyped_write_is_rejected_before_the_setter_runs() {
        let slot = pair().into_native_fn().unwrap();
        let mut state = State::new();
        let lamp = state.allocate(Lamp { lit: true });
        let Dynamic::Object(handle) = lamp else {
            panic!("expected an object slot");
        };

        let err = state
            .call(&slot, vec![Dynamic::Object(handle), Dynamic::Int(5)])
            .unwrap_err();
        let dispatch = err.as_dispatch().unwrap();
        assert_eq!(dispatch.attempted, 2);
        assert_eq!(dispatch.type_rejected, vec![1]);
        assert!(state.heap().get::<Lamp>(handle).unwrap().lit);
        assert_eq!(state.stack_depth(), 0);
    }

    #[test]
    fn bound_accessors_shift_by_one() {
        let lamp = Rc::new(RefCell::new(Lamp { lit: true }));
        let slot = PropertyPair::read_write(
            method_bound(|l: &Lamp| l.lit, &lamp),
            method_bound(|l: &mut Lamp, lit: bool| l.lit = lit, &lamp),
        )
        .into_native_fn()
        .unwrap();
        assert_eq!(slot.arity(), Arity::range(0, 1));

        let mut state = State::new();
        assert!(state.call(&slot, vec![Dynamic::Bool(false)]).unwrap().is_empty());
        assert_eq!(state.call(&slot, vec![]).unwrap(), vec![Dynamic::Bool(false)]);
        assert!(!lamp.borrow().lit);
    }
}
