//! Receiver binding for member callables.
//!
//! A member callback finds its receiver in one of three places:
//!
//! | Binding      | Receiver comes from                    | Lifetime              |
//! |--------------|----------------------------------------|-----------------------|
//! | `Unbound`    | interpreter argument 0, on every call  | the interpreter's     |
//! | `Owned`      | a value moved into the closure state   | dropped with closure  |
//! | `Referenced` | a `Weak` captured at wrap time         | the caller's          |
//!
//! The choice between owned and referenced is made by the static type of
//! the value passed to [`method_bound`](crate::method_bound) or
//! [`field_bound`](crate::field_bound), through [`IntoReceiver`].

use std::any::type_name;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use stackbind_core::{Binding, CallContext, NativeError};

/// A receiver captured at wrap time.
pub enum BoundReceiver<T> {
    /// A copy owned by the closure state.
    Owned(RefCell<T>),
    /// A non-owning reference. The closure never keeps the referent alive.
    Referenced(Weak<RefCell<T>>),
}

impl<T: 'static> BoundReceiver<T> {
    pub fn owned(value: T) -> Self {
        BoundReceiver::Owned(RefCell::new(value))
    }

    pub fn referenced(target: &Rc<RefCell<T>>) -> Self {
        BoundReceiver::Referenced(Rc::downgrade(target))
    }

    pub fn binding(&self) -> Binding {
        match self {
            BoundReceiver::Owned(_) => Binding::Owned,
            BoundReceiver::Referenced(_) => Binding::Referenced,
        }
    }

    /// Check whether the receiver can still be reached.
    pub fn is_live(&self) -> bool {
        match self {
            BoundReceiver::Owned(_) => true,
            BoundReceiver::Referenced(weak) => weak.strong_count() > 0,
        }
    }

    fn upgrade(weak: &Weak<RefCell<T>>) -> Result<Rc<RefCell<T>>, NativeError> {
        weak.upgrade().ok_or(NativeError::DanglingReceiver {
            type_name: type_name::<T>(),
        })
    }

    fn borrowed() -> NativeError {
        NativeError::ReceiverBorrowed {
            type_name: type_name::<T>(),
        }
    }

    pub fn with_ref<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, NativeError> {
        match self {
            BoundReceiver::Owned(cell) => {
                let this = cell.try_borrow().map_err(|_| Self::borrowed())?;
                Ok(f(&this))
            }
            BoundReceiver::Referenced(weak) => {
                let target = Self::upgrade(weak)?;
                let this = target.try_borrow().map_err(|_| Self::borrowed())?;
                let value = f(&this);
                Ok(value)
            }
        }
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, NativeError> {
        match self {
            BoundReceiver::Owned(cell) => {
                let mut this = cell.try_borrow_mut().map_err(|_| Self::borrowed())?;
                Ok(f(&mut this))
            }
            BoundReceiver::Referenced(weak) => {
                let target = Self::upgrade(weak)?;
                let mut this = target.try_borrow_mut().map_err(|_| Self::borrowed())?;
                let value = f(&mut this);
                Ok(value)
            }
        }
    }
}

/// Values that can be bound as the receiver of a `T` member.
///
/// Plain values bind by value. Shared handles bind by reference:
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use stackbind::{Binding, IntoReceiver};
///
/// struct Player;
///
/// let shared = Rc::new(RefCell::new(Player));
/// assert_eq!(IntoReceiver::<Player>::into_receiver(&shared).binding(), Binding::Referenced);
/// assert_eq!(IntoReceiver::<Player>::into_receiver(Player).binding(), Binding::Owned);
/// ```
pub trait IntoReceiver<T> {
    fn into_receiver(self) -> BoundReceiver<T>;
}

impl<T: 'static> IntoReceiver<T> for T {
    fn into_receiver(self) -> BoundReceiver<T> {
        BoundReceiver::owned(self)
    }
}

impl<T: 'static> IntoReceiver<T> for &Rc<RefCell<T>> {
    fn into_receiver(self) -> BoundReceiver<T> {
        BoundReceiver::referenced(self)
    }
}

// Only a weak reference is kept; the caller's handle is dropped here.
impl<T: 'static> IntoReceiver<T> for Rc<RefCell<T>> {
    fn into_receiver(self) -> BoundReceiver<T> {
        BoundReceiver::referenced(&self)
    }
}

impl<T: 'static> IntoReceiver<T> for Weak<RefCell<T>> {
    fn into_receiver(self) -> BoundReceiver<T> {
        BoundReceiver::Referenced(self)
    }
}

impl<T: 'static> IntoReceiver<T> for BoundReceiver<T> {
    fn into_receiver(self) -> BoundReceiver<T> {
        self
    }
}

/// Access to a member callable's receiver, wherever it lives.
pub trait ReceiverAccess<T> {
    fn with_ref<R>(&mut self, f: impl FnOnce(&T) -> R) -> Result<R, NativeError>;

    fn with_mut<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R, NativeError>;
}

impl<T: 'static> ReceiverAccess<T> for &BoundReceiver<T> {
    fn with_ref<R>(&mut self, f: impl FnOnce(&T) -> R) -> Result<R, NativeError> {
        (**self).with_ref(f)
    }

    fn with_mut<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R, NativeError> {
        (**self).with_mut(f)
    }
}

/// The receiver in argument slot 0 of an unbound member call.
pub struct StackReceiver<'a, 's> {
    ctx: &'a mut CallContext<'s>,
}

impl<'a, 's> StackReceiver<'a, 's> {
    pub fn new(ctx: &'a mut CallContext<'s>) -> Self {
        Self { ctx }
    }
}

impl<T: 'static> ReceiverAccess<T> for StackReceiver<'_, '_> {
    fn with_ref<R>(&mut self, f: impl FnOnce(&T) -> R) -> Result<R, NativeError> {
        self.ctx.this::<T>().map(f)
    }

    fn with_mut<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R, NativeError> {
        self.ctx.this_mut::<T>().map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackbind_core::{BindConfig, Dynamic, ObjectHeap};

    #[derive(Debug, PartialEq)]
    struct Gauge(i64);

    #[test]
    fn plain_values_bind_owned() {
        let receiver: BoundReceiver<Gauge> = Gauge(1).into_receiver();
        assert_eq!(receiver.binding(), Binding::Owned);
        receiver.with_mut(|g| g.0 += 1).unwrap();
        assert_eq!(receiver.with_ref(|g| g.0).unwrap(), 2);
    }

    #[test]
    fn shared_handles_bind_by_reference() {
        let shared = Rc::new(RefCell::new(Gauge(1)));
        let receiver: BoundReceiver<Gauge> = (&shared).into_receiver();
        assert_eq!(receiver.binding(), Binding::Referenced);
        assert_eq!(Rc::strong_count(&shared), 1);

        shared.borrow_mut().0 = 9;
        assert_eq!(receiver.with_ref(|g| g.0).unwrap(), 9);
    }

    #[test]
    fn bound_receivers_pass_through() {
        let shared = Rc::new(RefCell::new(Gauge(3)));
        let bound = BoundReceiver::referenced(&shared);
        let receiver: BoundReceiver<Gauge> = bound.into_receiver();
        assert_eq!(receiver.binding(), Binding::Referenced);
        assert_eq!(receiver.with_ref(|g| g.0).unwrap(), 3);

        let owned: BoundReceiver<Gauge> = BoundReceiver::owned(Gauge(5)).into_receiver();
        assert_eq!(owned.binding(), Binding::Owned);
    }

    #[test]
    fn dropped_referent_is_reported() {
        let shared = Rc::new(RefCell::new(Gauge(1)));
        let receiver: BoundReceiver<Gauge> = Rc::downgrade(&shared).into_receiver();
        assert!(receiver.is_live());
        drop(shared);

        assert!(!receiver.is_live());
        assert!(matches!(
            receiver.with_ref(|g| g.0),
            Err(NativeError::DanglingReceiver { .. })
        ));
    }

    #[test]
    fn outstanding_borrow_is_reported() {
        let shared = Rc::new(RefCell::new(Gauge(1)));
        let receiver: BoundReceiver<Gauge> = (&shared).into_receiver();
        let _guard = shared.borrow_mut();
        assert!(matches!(
            receiver.with_mut(|g| g.0 = 2),
            Err(NativeError::ReceiverBorrowed { .. })
        ));
    }

    #[test]
    fn stack_receiver_reads_slot_zero() {
        let mut slots = vec![Dynamic::native(Gauge(4)), Dynamic::Int(1)];
        let mut heap = ObjectHeap::new();
        let config = BindConfig::default();
        let mut ctx = CallContext::new(&mut slots, 0, &mut heap, &config);

        let mut receiver = StackReceiver::new(&mut ctx);
        ReceiverAccess::<Gauge>::with_mut(&mut receiver, |g| g.0 *= 2).unwrap();
        let value = ReceiverAccess::<Gauge>::with_ref(&mut receiver, |g| g.0).unwrap();
        assert_eq!(value, 8);
        assert!(ReceiverAccess::<String>::with_ref(&mut receiver, |s| s.len()).is_err());
    }
}
