//! Static classification of native callables.
//!
//! A callable is classified by which of the traits below its type
//! implements, never by anything observed at run time:
//!
//! - [`Function<Marker>`]: `Fn(P0, P1, ..) -> R` where every parameter
//!   converts from a slot. Covers fn items, `fn` pointers, closures and
//!   boxed `dyn Fn` values.
//! - [`Method<Marker>`]: `Fn(&T, P0, ..) -> R` or `Fn(&mut T, P0, ..) -> R`,
//!   a member function whose receiver is `T`.
//! - [`Field`](crate::Field): a projection of a `T` receiver onto one of its
//!   fields.
//!
//! The `Marker` parameter only exists so that the per-arity impls do not
//! overlap; it is always inferred. A type with no single call signature
//! implements none of these traits, so classification fails at build time:
//!
//! ```compile_fail
//! use stackbind::function;
//!
//! struct NotCallable;
//! let _ = function(NotCallable);
//! ```
//!
//! Parameters must convert from a slot:
//!
//! ```compile_fail
//! use stackbind::function;
//!
//! let _ = function(|bytes: Vec<u8>| bytes.len() as i64);
//! ```
//!
//! Both implementations are provided for up to 8 parameters.

use std::any::type_name;
use std::fmt;
use std::mem::size_of;

use stackbind_core::{Arity, CallContext, CallableKind, FromDynamic, NativeError};

use crate::receiver::ReceiverAccess;

/// A tuple of parameter types, read from consecutive argument slots.
pub trait ParamList: Sized {
    /// Number of declared parameters.
    const LEN: usize;

    /// Accepted argument counts. Trailing optional parameters lower the
    /// minimum.
    fn arity() -> Arity;

    fn type_names() -> Vec<&'static str>;

    /// Convert the arguments starting at `offset`.
    fn extract(ctx: &CallContext<'_>, offset: usize) -> Result<Self, NativeError>;

    /// Check, without converting, whether the arguments starting at
    /// `offset` would convert.
    fn accepts(ctx: &CallContext<'_>, offset: usize) -> bool;
}

/// A callable taking only slot-convertible parameters.
pub trait Function<Marker>: 'static {
    type Params: ParamList;
    type Output;

    fn invoke(&self, params: Self::Params) -> Self::Output;
}

/// Receiver taken by shared reference.
pub struct ByRef;

/// Receiver taken by mutable reference.
pub struct ByMut;

/// A member function of `Self::Receiver`.
pub trait Method<Marker>: 'static {
    type Receiver: 'static;
    type Params: ParamList;
    type Output;

    /// Whether the receiver is taken by `&mut`.
    const MUTABLE: bool;

    fn invoke<A: ReceiverAccess<Self::Receiver>>(
        &self,
        receiver: &mut A,
        params: Self::Params,
    ) -> Result<Self::Output, NativeError>;
}

macro_rules! impl_callables {
    ($($P:ident $p:ident $idx:tt),*) => {
        impl<$($P: FromDynamic),*> ParamList for ($($P,)*) {
            const LEN: usize = <[&str]>::len(&[$(stringify!($P)),*]);

            fn arity() -> Arity {
                let optional: &[bool] = &[$(<$P as FromDynamic>::OPTIONAL),*];
                let mut min = optional.len();
                while min > 0 && optional[min - 1] {
                    min -= 1;
                }
                Arity::range(min, optional.len())
            }

            fn type_names() -> Vec<&'static str> {
                vec![$(type_name::<$P>()),*]
            }

            #[allow(unused_variables)]
            fn extract(ctx: &CallContext<'_>, offset: usize) -> Result<Self, NativeError> {
                Ok(($(ctx.arg::<$P>(offset + $idx)?,)*))
            }

            #[allow(unused_variables)]
            fn accepts(ctx: &CallContext<'_>, offset: usize) -> bool {
                true $(&& ctx.arg_accepts::<$P>(offset + $idx))*
            }
        }

        impl<F, R, $($P),*> Function<fn($($P),*) -> R> for F
        where
            F: Fn($($P),*) -> R + 'static,
            $($P: FromDynamic + 'static,)*
            R: 'static,
        {
            type Params = ($($P,)*);
            type Output = R;

            fn invoke(&self, ($($p,)*): Self::Params) -> R {
                (self)($($p),*)
            }
        }

        impl<T, F, R, $($P),*> Method<(ByRef, T, fn($($P),*) -> R)> for F
        where
            T: 'static,
            F: Fn(&T, $($P),*) -> R + 'static,
            $($P: FromDynamic + 'static,)*
            R: 'static,
        {
            type Receiver = T;
            type Params = ($($P,)*);
            type Output = R;
            const MUTABLE: bool = false;

            fn invoke<A: ReceiverAccess<Self::Receiver>>(
                &self,
                receiver: &mut A,
                ($($p,)*): Self::Params,
            ) -> Result<R, NativeError> {
                receiver.with_ref(move |this| (self)(this, $($p),*))
            }
        }

        impl<T, F, R, $($P),*> Method<(ByMut, T, fn($($P),*) -> R)> for F
        where
            T: 'static,
            F: Fn(&mut T, $($P),*) -> R + 'static,
            $($P: FromDynamic + 'static,)*
            R: 'static,
        {
            type Receiver = T;
            type Params = ($($P,)*);
            type Output = R;
            const MUTABLE: bool = true;

            fn invoke<A: ReceiverAccess<Self::Receiver>>(
                &self,
                receiver: &mut A,
                ($($p,)*): Self::Params,
            ) -> Result<R, NativeError> {
                receiver.with_mut(move |this| (self)(this, $($p),*))
            }
        }
    };
}

impl_callables!();
impl_callables!(P0 p0 0);
impl_callables!(P0 p0 0, P1 p1 1);
impl_callables!(P0 p0 0, P1 p1 1, P2 p2 2);
impl_callables!(P0 p0 0, P1 p1 1, P2 p2 2, P3 p3 3);
impl_callables!(P0 p0 0, P1 p1 1, P2 p2 2, P3 p3 3, P4 p4 4);
impl_callables!(P0 p0 0, P1 p1 1, P2 p2 2, P3 p3 3, P4 p4 4, P5 p5 5);
impl_callables!(P0 p0 0, P1 p1 1, P2 p2 2, P3 p3 3, P4 p4 4, P5 p5 5, P6 p6 6);
impl_callables!(P0 p0 0, P1 p1 1, P2 p2 2, P3 p3 3, P4 p4 4, P5 p5 5, P6 p6 6, P7 p7 7);

/// Static description of one classified callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallableDescriptor {
    pub kind: CallableKind,
    pub params: Vec<&'static str>,
    pub ret: &'static str,
    /// Receiver type, for member kinds only.
    pub receiver: Option<&'static str>,
    /// Interpreter-visible argument counts, receiver included.
    pub arity: Arity,
}

impl CallableDescriptor {
    /// Describe a free callable.
    pub fn of_function<F, M>(_callable: &F) -> Self
    where
        F: Function<M>,
    {
        Self {
            kind: callable_kind::<F>(),
            params: <F::Params as ParamList>::type_names(),
            ret: type_name::<F::Output>(),
            receiver: None,
            arity: <F::Params as ParamList>::arity(),
        }
    }

    /// Describe a member function called with the receiver as argument 0.
    pub fn of_method<F, M>(_callable: &F) -> Self
    where
        F: Method<M>,
    {
        Self {
            kind: CallableKind::MemberFunction,
            params: <F::Params as ParamList>::type_names(),
            ret: type_name::<F::Output>(),
            receiver: Some(type_name::<F::Receiver>()),
            arity: <F::Params as ParamList>::arity().shifted(1),
        }
    }

    pub fn is_member(&self) -> bool {
        self.receiver.is_some()
    }
}

impl fmt::Display for CallableDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ", self.kind)?;
        if let Some(receiver) = self.receiver {
            write!(f, "{}::", receiver)?;
        }
        write!(f, "({}) -> {}", self.params.join(", "), self.ret)
    }
}

/// Classify a free callable from its type alone.
///
/// Zero-sized callables (fn items and closures capturing nothing) take the
/// free-function path. `fn` pointer types are function pointers. Anything
/// else carries state and is a functor.
pub fn callable_kind<F>() -> CallableKind {
    if size_of::<F>() == 0 {
        return CallableKind::FreeFunction;
    }
    // `type_name` output is not a stable format; a pointer type whose name
    // matches none of these prefixes is reported as a functor.
    let name = type_name::<F>();
    let pointer = ["fn(", "unsafe fn(", "extern ", "unsafe extern ", "for<"]
        .iter()
        .any(|prefix| name.starts_with(prefix));
    if pointer {
        CallableKind::FunctionPointer
    } else {
        CallableKind::Functor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(a: i64, b: i64) -> i64 {
        a + b
    }

    struct Point {
        x: i64,
    }

    impl Point {
        fn x(&self) -> i64 {
            self.x
        }

        fn translate(&mut self, dx: i64, scale: Option<i64>) {
            self.x = (self.x + dx) * scale.unwrap_or(1);
        }
    }

    #[test]
    fn fn_items_are_free_functions() {
        let desc = CallableDescriptor::of_function(&add);
        assert_eq!(desc.kind, CallableKind::FreeFunction);
        assert_eq!(desc.params, vec!["i64", "i64"]);
        assert_eq!(desc.ret, "i64");
        assert_eq!(desc.arity, Arity::exact(2));
        assert!(!desc.is_member());
    }

    #[test]
    fn stateless_closures_degrade_to_free_functions() {
        let desc = CallableDescriptor::of_function(&|x: i64| x * 2);
        assert_eq!(desc.kind, CallableKind::FreeFunction);
    }

    #[test]
    fn fn_pointers_are_classified() {
        let pointer: fn(i64, i64) -> i64 = add;
        let desc = CallableDescriptor::of_function(&pointer);
        assert_eq!(desc.kind, CallableKind::FunctionPointer);
    }

    #[test]
    fn higher_ranked_fn_pointers_are_classified() {
        let len: for<'a> fn(&'a str) -> usize = str::len;
        assert_eq!(len("abc"), 3);
        assert_eq!(
            callable_kind::<for<'a> fn(&'a str) -> usize>(),
            CallableKind::FunctionPointer
        );
        assert_eq!(
            callable_kind::<unsafe fn(i64) -> i64>(),
            CallableKind::FunctionPointer
        );
    }

    #[test]
    fn capturing_closures_and_boxes_are_functors() {
        let offset = 3i64;
        let closure = move |x: i64| x + offset;
        assert_eq!(
            CallableDescriptor::of_function(&closure).kind,
            CallableKind::Functor
        );

        let boxed: Box<dyn Fn(i64) -> i64> = Box::new(move |x| x - offset);
        assert_eq!(
            CallableDescriptor::of_function(&boxed).kind,
            CallableKind::Functor
        );
    }

    #[test]
    fn methods_carry_receiver() {
        let desc = CallableDescriptor::of_method(&Point::x);
        assert_eq!(desc.kind, CallableKind::MemberFunction);
        assert!(desc.receiver.is_some_and(|r| r.ends_with("Point")));
        assert_eq!(desc.arity, Arity::exact(1));
        assert!(desc.params.is_empty());
    }

    #[test]
    fn trailing_optional_lowers_min_arity() {
        let desc = CallableDescriptor::of_method(&Point::translate);
        assert_eq!(desc.arity, Arity::range(2, 3));
        assert_eq!(desc.ret, "()");
    }

    #[test]
    fn param_list_arity() {
        assert_eq!(<() as ParamList>::arity(), Arity::exact(0));
        assert_eq!(<(i64, Option<bool>) as ParamList>::arity(), Arity::range(1, 2));
        // an optional before a required parameter cannot be omitted
        assert_eq!(<(Option<i64>, bool) as ParamList>::arity(), Arity::exact(2));
        assert_eq!(<(i64, f64, bool) as ParamList>::LEN, 3);
    }

    #[test]
    fn display_shows_signature() {
        let desc = CallableDescriptor::of_function(&add);
        assert_eq!(desc.to_string(), "FreeFunction (i64, i64) -> i64");
    }
}
