//! Member variable projections.

use std::any::type_name;
use std::fmt;

use stackbind_core::{Arity, CallableKind};

use crate::signature::CallableDescriptor;

/// A read/write projection of a `T` receiver onto one `V` field.
///
/// Usually built with the [`field!`](crate::field!) macro:
///
/// ```
/// use stackbind::{Field, field};
///
/// struct Player {
///     health: i64,
/// }
///
/// let health: Field<Player, i64> = field!(Player, health);
/// let mut player = Player { health: 10 };
/// *health.get_mut(&mut player) -= 3;
/// assert_eq!(*health.get(&player), 7);
/// assert_eq!(health.name(), "health");
/// ```
pub struct Field<T, V> {
    name: &'static str,
    get: fn(&T) -> &V,
    get_mut: fn(&mut T) -> &mut V,
}

impl<T, V> Field<T, V> {
    pub const fn new(name: &'static str, get: fn(&T) -> &V, get_mut: fn(&mut T) -> &mut V) -> Self {
        Self { name, get, get_mut }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get<'a>(&self, this: &'a T) -> &'a V {
        (self.get)(this)
    }

    pub fn get_mut<'a>(&self, this: &'a mut T) -> &'a mut V {
        (self.get_mut)(this)
    }

    /// Describe the unbound accessor: `(receiver)` reads, `(receiver, value)`
    /// writes.
    pub fn descriptor(&self) -> CallableDescriptor {
        CallableDescriptor {
            kind: CallableKind::MemberVariable,
            params: vec![type_name::<V>()],
            ret: type_name::<V>(),
            receiver: Some(type_name::<T>()),
            arity: Arity::range(1, 2),
        }
    }
}

impl<T, V> Clone for Field<T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, V> Copy for Field<T, V> {}

impl<T, V> fmt::Debug for Field<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field({}::{}: {})", type_name::<T>(), self.name, type_name::<V>())
    }
}

/// Build a [`Field`] projecting `$ty` onto its `$field`.
#[macro_export]
macro_rules! field {
    ($ty:ty, $field:ident) => {
        $crate::Field::<$ty, _>::new(
            ::core::stringify!($field),
            |this: &$ty| &this.$field,
            |this: &mut $ty| &mut this.$field,
        )
    };
}
