//! The value held by one stack slot.

use std::any::Any;
use std::fmt;

use super::{NativeFn, ObjectHandle};

/// A stack slot.
///
/// Integers of every width travel as `Int(i64)` and both float widths as
/// `Float(f64)`; the [`FromDynamic`](crate::FromDynamic) impls narrow them
/// back with range checks. An omitted trailing argument reads as `Void`.
///
/// `Native` slots own an arbitrary boxed value, so `Dynamic` is not `Clone`.
/// See [`try_clone`](Self::try_clone).
pub enum Dynamic {
    Void,
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    /// Receiver living in the [`ObjectHeap`](crate::ObjectHeap).
    Object(ObjectHandle),
    /// Receiver owned by the slot itself.
    Native(Box<dyn Any>),
    NullHandle,
    Function(NativeFn),
}

impl Dynamic {
    pub fn native<T: Any>(value: T) -> Self {
        Dynamic::Native(Box::new(value))
    }

    /// Name used in conversion and receiver error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Void => "void",
            Dynamic::Int(_) => "int",
            Dynamic::Float(_) => "float",
            Dynamic::Bool(_) => "bool",
            Dynamic::String(_) => "string",
            Dynamic::Object(_) => "object",
            Dynamic::Native(_) => "native",
            Dynamic::NullHandle => "null",
            Dynamic::Function(_) => "function",
        }
    }

    /// `Void` or `NullHandle`: the slots an `Option` parameter reads as `None`.
    pub fn is_nil(&self) -> bool {
        matches!(self, Dynamic::Void | Dynamic::NullHandle)
    }

    pub fn as_function(&self) -> Option<&NativeFn> {
        match self {
            Dynamic::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Copy the slot out of the stack. `None` for `Native` slots.
    pub fn try_clone(&self) -> Option<Self> {
        let copy = match self {
            Dynamic::Void => Dynamic::Void,
            Dynamic::Int(v) => Dynamic::Int(*v),
            Dynamic::Float(v) => Dynamic::Float(*v),
            Dynamic::Bool(v) => Dynamic::Bool(*v),
            Dynamic::String(s) => Dynamic::String(s.clone()),
            Dynamic::Object(handle) => Dynamic::Object(*handle),
            Dynamic::NullHandle => Dynamic::NullHandle,
            Dynamic::Function(f) => Dynamic::Function(f.clone()),
            Dynamic::Native(_) => return None,
        };
        Some(copy)
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamic::Void => f.write_str("Void"),
            Dynamic::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Dynamic::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Dynamic::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Dynamic::String(s) => f.debug_tuple("String").field(s).finish(),
            Dynamic::Object(handle) => f
                .debug_tuple("Object")
                .field(&handle.index())
                .field(&handle.generation())
                .finish(),
            Dynamic::Native(_) => f.write_str("Native(..)"),
            Dynamic::NullHandle => f.write_str("NullHandle"),
            Dynamic::Function(func) => f.debug_tuple("Function").field(&func.shape()).finish(),
        }
    }
}

/// Native slots are opaque and never equal; functions compare by identity.
impl PartialEq for Dynamic {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Dynamic::Void, Dynamic::Void) | (Dynamic::NullHandle, Dynamic::NullHandle) => true,
            (Dynamic::Int(a), Dynamic::Int(b)) => a == b,
            (Dynamic::Float(a), Dynamic::Float(b)) => a == b,
            (Dynamic::Bool(a), Dynamic::Bool(b)) => a == b,
            (Dynamic::String(a), Dynamic::String(b)) => a == b,
            (Dynamic::Object(a), Dynamic::Object(b)) => a == b,
            (Dynamic::Function(a), Dynamic::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}
