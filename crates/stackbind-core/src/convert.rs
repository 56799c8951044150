//! Conversions between Rust values and stack slots.
//!
//! These traits define how Rust types are read from and written to slots.
//! Argument conversion failures surface as [`ConversionError`] and pass
//! through the adaptation layer unchanged.

use std::fmt::Display;

use crate::{CallContext, ConversionError, Dynamic, NativeError, NativeFn, ObjectHandle};

/// Trait for types that can be read out of a stack slot.
///
/// # Example
///
/// ```ignore
/// impl FromDynamic for Celsius {
///     fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
///         f64::from_dynamic(slot).map(Celsius)
///     }
/// }
/// ```
pub trait FromDynamic: Sized {
    /// Whether a caller may omit this parameter when it is trailing.
    const OPTIONAL: bool = false;

    /// Convert a slot into this type.
    fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError>;

    /// Check whether [`from_dynamic`](Self::from_dynamic) would succeed.
    fn accepts(slot: &Dynamic) -> bool {
        Self::from_dynamic(slot).is_ok()
    }
}

/// Trait for types that can be written into a stack slot.
pub trait IntoDynamic {
    fn into_dynamic(self) -> Dynamic;
}

/// Trait for callable return values, which may push zero or more slots.
///
/// Every [`IntoDynamic`] type pushes exactly one slot. `()` pushes none,
/// tuples push one slot per element, and `Result` pushes its `Ok` value or
/// fails the call with [`NativeError::Callback`].
pub trait IntoResults {
    /// Push the results and return how many slots were pushed.
    fn push_into(self, ctx: &mut CallContext<'_>) -> Result<usize, NativeError>;
}

fn mismatch(expected: &'static str, slot: &Dynamic) -> ConversionError {
    ConversionError::TypeMismatch {
        expected,
        actual: slot.type_name(),
    }
}

// =============================================================================
// Integers
// =============================================================================

macro_rules! impl_integer {
    ($($ty:ty => $name:literal),* $(,)?) => {$(
        impl FromDynamic for $ty {
            fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
                match slot {
                    Dynamic::Int(v) => <$ty>::try_from(*v).map_err(|_| {
                        ConversionError::IntegerOverflow {
                            value: *v,
                            target_type: $name,
                        }
                    }),
                    _ => Err(mismatch($name, slot)),
                }
            }
        }

        impl IntoDynamic for $ty {
            fn into_dynamic(self) -> Dynamic {
                Dynamic::Int(self as i64)
            }
        }
    )*};
}

impl_integer! {
    i8 => "int8",
    i16 => "int16",
    i32 => "int",
    u8 => "uint8",
    u16 => "uint16",
    u32 => "uint",
}

impl FromDynamic for i64 {
    fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Int(v) => Ok(*v),
            _ => Err(mismatch("int64", slot)),
        }
    }
}

impl IntoDynamic for i64 {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Int(self)
    }
}

// 64-bit unsigned values share the slot's bits with i64: values above
// i64::MAX travel as negative ints and read back unchanged.
impl FromDynamic for u64 {
    fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Int(v) => Ok(*v as u64),
            _ => Err(mismatch("uint64", slot)),
        }
    }
}

impl IntoDynamic for u64 {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Int(self as i64)
    }
}

impl FromDynamic for usize {
    fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Int(v) => usize::try_from(*v as u64).map_err(|_| {
                ConversionError::IntegerOverflow {
                    value: *v,
                    target_type: "usize",
                }
            }),
            _ => Err(mismatch("usize", slot)),
        }
    }
}

impl IntoDynamic for usize {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Int(self as u64 as i64)
    }
}

// =============================================================================
// Floats, booleans and strings
// =============================================================================

impl FromDynamic for f32 {
    fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Float(v) => {
                let narrowed = *v as f32;
                if v.is_finite() && narrowed.is_infinite() {
                    Err(ConversionError::FloatConversion {
                        value: *v,
                        target_type: "float",
                    })
                } else {
                    Ok(narrowed)
                }
            }
            _ => Err(mismatch("float", slot)),
        }
    }
}

impl IntoDynamic for f32 {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Float(self as f64)
    }
}

impl FromDynamic for f64 {
    fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Float(v) => Ok(*v),
            _ => Err(mismatch("double", slot)),
        }
    }
}

impl IntoDynamic for f64 {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Float(self)
    }
}

impl FromDynamic for bool {
    fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Bool(v) => Ok(*v),
            _ => Err(mismatch("bool", slot)),
        }
    }
}

impl IntoDynamic for bool {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Bool(self)
    }
}

impl FromDynamic for String {
    fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::String(s) => Ok(s.clone()),
            _ => Err(mismatch("string", slot)),
        }
    }

    fn accepts(slot: &Dynamic) -> bool {
        matches!(slot, Dynamic::String(_))
    }
}

impl IntoDynamic for String {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::String(self)
    }
}

impl IntoDynamic for &str {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::String(self.to_owned())
    }
}

// =============================================================================
// Handles, callbacks and raw slots
// =============================================================================

impl FromDynamic for ObjectHandle {
    fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Object(handle) => Ok(*handle),
            Dynamic::NullHandle => Err(ConversionError::NullHandle {
                target_type: "object",
            }),
            _ => Err(mismatch("object", slot)),
        }
    }
}

impl IntoDynamic for ObjectHandle {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Object(self)
    }
}

impl FromDynamic for NativeFn {
    fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Function(f) => Ok(f.clone()),
            _ => Err(mismatch("function", slot)),
        }
    }

    fn accepts(slot: &Dynamic) -> bool {
        matches!(slot, Dynamic::Function(_))
    }
}

impl IntoDynamic for NativeFn {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Function(self)
    }
}

/// Takes any slot that can be copied out of the stack.
impl FromDynamic for Dynamic {
    fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
        slot.try_clone()
            .ok_or(ConversionError::NotCloneable {
                actual: slot.type_name(),
            })
    }

    fn accepts(slot: &Dynamic) -> bool {
        !matches!(slot, Dynamic::Native(_))
    }
}

impl IntoDynamic for Dynamic {
    fn into_dynamic(self) -> Dynamic {
        self
    }
}

/// `Option<T>` parameters may be omitted; `Void` and null read as `None`.
impl<T: FromDynamic> FromDynamic for Option<T> {
    const OPTIONAL: bool = true;

    fn from_dynamic(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            slot if slot.is_nil() => Ok(None),
            other => T::from_dynamic(other).map(Some),
        }
    }

    fn accepts(slot: &Dynamic) -> bool {
        slot.is_nil() || T::accepts(slot)
    }
}

impl<T: IntoDynamic> IntoDynamic for Option<T> {
    fn into_dynamic(self) -> Dynamic {
        match self {
            Some(value) => value.into_dynamic(),
            None => Dynamic::Void,
        }
    }
}

// =============================================================================
// Results
// =============================================================================

impl<T: IntoDynamic> IntoResults for T {
    fn push_into(self, ctx: &mut CallContext<'_>) -> Result<usize, NativeError> {
        ctx.push_slot(self.into_dynamic())
    }
}

impl IntoResults for () {
    fn push_into(self, _ctx: &mut CallContext<'_>) -> Result<usize, NativeError> {
        Ok(0)
    }
}

macro_rules! impl_tuple_results {
    ($($name:ident),+) => {
        impl<$($name: IntoDynamic),+> IntoResults for ($($name,)+) {
            #[allow(non_snake_case)]
            fn push_into(self, ctx: &mut CallContext<'_>) -> Result<usize, NativeError> {
                let ($($name,)+) = self;
                let mut count = 0;
                $(count += ctx.push_slot($name.into_dynamic())?;)+
                Ok(count)
            }
        }
    };
}

impl_tuple_results!(A, B);
impl_tuple_results!(A, B, C);
impl_tuple_results!(A, B, C, D);

/// `Err` fails the call with the error's message; nothing is pushed.
impl<T: IntoResults, E: Display> IntoResults for Result<T, E> {
    fn push_into(self, ctx: &mut CallContext<'_>) -> Result<usize, NativeError> {
        match self {
            Ok(value) => value.push_into(ctx),
            Err(err) => Err(NativeError::Callback {
                message: err.to_string(),
            }),
        }
    }
}
