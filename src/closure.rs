//! Closure synthesis: one callable in, one [`NativeFn`] out.
//!
//! | Shape            | Built by                        | Upvalues |
//! |------------------|---------------------------------|----------|
//! | `Direct`         | [`direct`]                      | 0        |
//! | `FreeFunction`   | [`function`]                    | 1        |
//! | `MemberFunction` | [`method`], [`method_bound`]    | 1        |
//! | `MemberVariable` | [`field`], [`field_bound`]      | 1        |
//!
//! The shape, the callable kind and the receiver binding are all fixed
//! here, at wrap time. Nothing in a synthesized callback inspects them again
//! while it runs.
//!
//! A wrapped callback converts every argument before it invokes the
//! callable, so a conversion or arity failure never runs the callable and
//! never pushes anything.

use std::marker::PhantomData;

use stackbind_core::{
    Arity, Binding, CallContext, CallableKind, CallbackShape, DispatchError, FromDynamic,
    IntoDynamic, IntoResults, NativeCallable, NativeError, NativeFn, RawCallback,
};
use tracing::trace;

use crate::error::RegistrationError;
use crate::member::Field;
use crate::receiver::{BoundReceiver, IntoReceiver, StackReceiver};
use crate::signature::{Function, Method, ParamList, callable_kind};

// =============================================================================
// Callback state blocks
// =============================================================================

struct FreeFunctionCallback<F, M> {
    callable: F,
    _marker: PhantomData<fn() -> M>,
}

impl<F, M> NativeCallable for FreeFunctionCallback<F, M>
where
    F: Function<M>,
    F::Output: IntoResults,
{
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<usize, NativeError> {
        ctx.check_arity(<F::Params as ParamList>::arity())?;
        let params = <F::Params as ParamList>::extract(ctx, 0)?;
        ctx.push_results(self.callable.invoke(params))
    }

    fn arity(&self) -> Arity {
        <F::Params as ParamList>::arity()
    }

    fn accepts(&self, ctx: &CallContext<'_>) -> bool {
        <F::Params as ParamList>::accepts(ctx, 0)
    }
}

struct MemberFunctionCallback<F, M> {
    callable: F,
    _marker: PhantomData<fn() -> M>,
}

impl<F, M> NativeCallable for MemberFunctionCallback<F, M>
where
    F: Method<M>,
    F::Output: IntoResults,
{
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<usize, NativeError> {
        ctx.check_arity(<F::Params as ParamList>::arity().shifted(1))?;
        // receiver before parameters
        ctx.this::<F::Receiver>()?;
        let params = <F::Params as ParamList>::extract(ctx, 1)?;
        let output = self.callable.invoke(&mut StackReceiver::new(ctx), params)?;
        ctx.push_results(output)
    }

    fn arity(&self) -> Arity {
        <F::Params as ParamList>::arity().shifted(1)
    }

    fn accepts(&self, ctx: &CallContext<'_>) -> bool {
        ctx.this_accepts::<F::Receiver>() && <F::Params as ParamList>::accepts(ctx, 1)
    }
}

struct BoundMethodCallback<F: Method<M>, M> {
    callable: F,
    receiver: BoundReceiver<F::Receiver>,
    _marker: PhantomData<fn() -> M>,
}

impl<F, M> NativeCallable for BoundMethodCallback<F, M>
where
    F: Method<M>,
    F::Output: IntoResults,
{
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<usize, NativeError> {
        ctx.check_arity(<F::Params as ParamList>::arity())?;
        let params = <F::Params as ParamList>::extract(ctx, 0)?;
        let output = self.callable.invoke(&mut &self.receiver, params)?;
        ctx.push_results(output)
    }

    fn arity(&self) -> Arity {
        <F::Params as ParamList>::arity()
    }

    fn accepts(&self, ctx: &CallContext<'_>) -> bool {
        <F::Params as ParamList>::accepts(ctx, 0)
    }
}

/// Unbound member variable: `(receiver)` reads, `(receiver, value)` writes.
struct FieldCallback<T, V> {
    field: Field<T, V>,
}

impl<T, V> NativeCallable for FieldCallback<T, V>
where
    T: 'static,
    V: FromDynamic + IntoDynamic + Clone + 'static,
{
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<usize, NativeError> {
        match ctx.arg_count() {
            1 => {
                let value = self.field.get(ctx.this::<T>()?).clone();
                ctx.push(value)
            }
            2 => {
                ctx.this::<T>()?;
                let value = ctx.arg::<V>(1)?;
                *self.field.get_mut(ctx.this_mut::<T>()?) = value;
                Ok(0)
            }
            n => Err(DispatchError::new(n, vec![Arity::exact(1), Arity::exact(2)]).into()),
        }
    }

    fn arity(&self) -> Arity {
        Arity::range(1, 2)
    }

    fn accepts(&self, ctx: &CallContext<'_>) -> bool {
        match ctx.arg_count() {
            1 => ctx.this_accepts::<T>(),
            2 => ctx.this_accepts::<T>() && ctx.arg_accepts::<V>(1),
            _ => false,
        }
    }
}

/// Bound member variable: `()` reads, `(value)` writes.
struct BoundFieldCallback<T, V> {
    field: Field<T, V>,
    receiver: BoundReceiver<T>,
}

impl<T, V> NativeCallable for BoundFieldCallback<T, V>
where
    T: 'static,
    V: FromDynamic + IntoDynamic + Clone + 'static,
{
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<usize, NativeError> {
        match ctx.arg_count() {
            0 => {
                let value = self.receiver.with_ref(|this| self.field.get(this).clone())?;
                ctx.push(value)
            }
            1 => {
                let value = ctx.arg::<V>(0)?;
                self.receiver
                    .with_mut(|this| *self.field.get_mut(this) = value)?;
                Ok(0)
            }
            n => Err(DispatchError::new(n, vec![Arity::exact(0), Arity::exact(1)]).into()),
        }
    }

    fn arity(&self) -> Arity {
        Arity::range(0, 1)
    }

    fn accepts(&self, ctx: &CallContext<'_>) -> bool {
        match ctx.arg_count() {
            0 => true,
            1 => ctx.arg_accepts::<V>(0),
            _ => false,
        }
    }
}

// =============================================================================
// Synthesis
// =============================================================================

fn synthesized(f: NativeFn) -> NativeFn {
    let info = f.info();
    trace!(
        shape = ?info.shape,
        kind = ?info.kind,
        binding = ?info.binding,
        arity = %info.arity,
        "synthesized callback"
    );
    f
}

/// Install a callback that already has the foreign shape, with no wrapping.
pub fn direct(callback: RawCallback) -> NativeFn {
    synthesized(NativeFn::direct(callback))
}

/// Wrap a free callable: fn item, `fn` pointer, closure or boxed `dyn Fn`.
///
/// ```
/// use stackbind::{Dynamic, State, function};
///
/// let mut state = State::new();
/// let add = function(|a: i64, b: i64| a + b);
/// assert_eq!(state.call(&add, vec![Dynamic::Int(2), Dynamic::Int(3)])?, vec![Dynamic::Int(5)]);
/// # Ok::<(), stackbind::NativeError>(())
/// ```
pub fn function<F, M>(callable: F) -> NativeFn
where
    F: Function<M>,
    F::Output: IntoResults,
    M: 'static,
{
    let kind = callable_kind::<F>();
    synthesized(NativeFn::closure(
        CallbackShape::FreeFunction,
        Some(kind),
        Binding::Unbound,
        FreeFunctionCallback {
            callable,
            _marker: PhantomData::<fn() -> M>,
        },
    ))
}

/// Wrap a member function whose receiver is interpreter argument 0.
pub fn method<F, M>(callable: F) -> NativeFn
where
    F: Method<M>,
    F::Output: IntoResults,
    M: 'static,
{
    synthesized(NativeFn::closure(
        CallbackShape::MemberFunction,
        Some(CallableKind::MemberFunction),
        Binding::Unbound,
        MemberFunctionCallback {
            callable,
            _marker: PhantomData::<fn() -> M>,
        },
    ))
}

/// Wrap a member function with a receiver fixed now.
///
/// A plain value is moved into the closure; `&Rc<RefCell<T>>`,
/// `Rc<RefCell<T>>` and `Weak<RefCell<T>>` bind by reference.
pub fn method_bound<F, M, R>(callable: F, receiver: R) -> NativeFn
where
    F: Method<M>,
    F::Output: IntoResults,
    M: 'static,
    R: IntoReceiver<F::Receiver>,
{
    let receiver = receiver.into_receiver();
    let binding = receiver.binding();
    synthesized(NativeFn::closure(
        CallbackShape::MemberFunction,
        Some(CallableKind::MemberFunction),
        binding,
        BoundMethodCallback {
            callable,
            receiver,
            _marker: PhantomData::<fn() -> M>,
        },
    ))
}

/// Wrap a member variable. The argument count picks read or write.
pub fn field<T, V>(field: Field<T, V>) -> NativeFn
where
    T: 'static,
    V: FromDynamic + IntoDynamic + Clone + 'static,
{
    synthesized(NativeFn::closure(
        CallbackShape::MemberVariable,
        Some(CallableKind::MemberVariable),
        Binding::Unbound,
        FieldCallback { field },
    ))
}

/// Wrap a member variable of a receiver fixed now.
pub fn field_bound<T, V, R>(field: Field<T, V>, receiver: R) -> NativeFn
where
    T: 'static,
    V: FromDynamic + IntoDynamic + Clone + 'static,
    R: IntoReceiver<T>,
{
    let receiver = receiver.into_receiver();
    let binding = receiver.binding();
    synthesized(NativeFn::closure(
        CallbackShape::MemberVariable,
        Some(CallableKind::MemberVariable),
        binding,
        BoundFieldCallback { field, receiver },
    ))
}

// =============================================================================
// Unified installation
// =============================================================================

/// Anything installable in a single callback slot.
///
/// The `Marker` parameter is inferred and selects the synthesis path:
/// free callables go through [`function`], receiver-taking callables through
/// [`method`], fields through [`field`], and prebuilt records (overload
/// sets, property pairs, constructor lists) through their own builders.
/// Raw-shaped callbacks must be passed through [`direct`] first.
pub trait IntoNativeFn<Marker> {
    fn into_native_fn(self) -> Result<NativeFn, RegistrationError>;
}

#[doc(hidden)]
pub struct Prebuilt;

#[doc(hidden)]
pub struct FreeFunctionMarker<M>(PhantomData<fn() -> M>);

#[doc(hidden)]
pub struct MemberFunctionMarker<M>(PhantomData<fn() -> M>);

#[doc(hidden)]
pub struct MemberVariableMarker;

impl IntoNativeFn<Prebuilt> for NativeFn {
    fn into_native_fn(self) -> Result<NativeFn, RegistrationError> {
        Ok(self)
    }
}

impl<F, M> IntoNativeFn<FreeFunctionMarker<M>> for F
where
    F: Function<M>,
    F::Output: IntoResults,
    M: 'static,
{
    fn into_native_fn(self) -> Result<NativeFn, RegistrationError> {
        Ok(function(self))
    }
}

impl<F, M> IntoNativeFn<MemberFunctionMarker<M>> for F
where
    F: Method<M>,
    F::Output: IntoResults,
    M: 'static,
{
    fn into_native_fn(self) -> Result<NativeFn, RegistrationError> {
        Ok(method(self))
    }
}

impl<T, V> IntoNativeFn<MemberVariableMarker> for Field<T, V>
where
    T: 'static,
    V: FromDynamic + IntoDynamic + Clone + 'static,
{
    fn into_native_fn(self) -> Result<NativeFn, RegistrationError> {
        Ok(field(self))
    }
}
