//! Constructor lists: arity-selected construction of heap receivers.

use std::any::type_name;
use std::marker::PhantomData;

use stackbind_core::{
    Arity, Binding, CallContext, CallbackShape, NativeCallable, NativeError, NativeFn,
};

use crate::closure::{IntoNativeFn, Prebuilt};
use crate::error::RegistrationError;
use crate::overload::OverloadedFunction;
use crate::signature::{Function, ParamList, callable_kind};

struct ConstructorCallback<F, M> {
    constructor: F,
    _marker: PhantomData<fn() -> M>,
}

impl<F, M> NativeCallable for ConstructorCallback<F, M>
where
    F: Function<M>,
    F::Output: 'static,
{
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<usize, NativeError> {
        ctx.check_arity(<F::Params as ParamList>::arity())?;
        let params = <F::Params as ParamList>::extract(ctx, 0)?;
        let value = self.constructor.invoke(params);
        let handle = ctx.heap_mut().allocate(value);
        ctx.push(handle)
    }

    fn arity(&self) -> Arity {
        <F::Params as ParamList>::arity()
    }

    fn accepts(&self, ctx: &CallContext<'_>) -> bool {
        <F::Params as ParamList>::accepts(ctx, 0)
    }
}

/// Ordered constructors for `T`.
///
/// Calling the slot picks the first constructor admitting the arguments
/// (the same rule as [`OverloadSet`](crate::OverloadSet)), allocates the new
/// value in the object heap and pushes its handle.
///
/// ```
/// use stackbind::{ConstructorList, Dynamic, State};
///
/// #[derive(Default)]
/// struct Vec2 {
///     x: f64,
///     y: f64,
/// }
///
/// let new_vec2 = ConstructorList::<Vec2>::new()
///     .with_default()
///     .with(|x: f64, y: f64| Vec2 { x, y })
///     .into_native_fn()?;
///
/// let mut state = State::new();
/// let out = state.call(&new_vec2, vec![Dynamic::Float(1.0), Dynamic::Float(2.0)])?;
/// let Dynamic::Object(handle) = out[0] else { unreachable!() };
/// assert_eq!(state.heap().get::<Vec2>(handle).map(|v| v.y), Some(2.0));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ConstructorList<T> {
    candidates: Vec<NativeFn>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> ConstructorList<T> {
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Append a constructor: any free callable returning `T`.
    pub fn with<F, M>(mut self, constructor: F) -> Self
    where
        F: Function<M, Output = T>,
        M: 'static,
    {
        let kind = callable_kind::<F>();
        self.candidates.push(NativeFn::closure(
            CallbackShape::Constructor,
            Some(kind),
            Binding::Unbound,
            ConstructorCallback {
                constructor,
                _marker: PhantomData::<fn() -> M>,
            },
        ));
        self
    }

    /// Append the zero-argument `T::default` constructor.
    pub fn with_default(self) -> Self
    where
        T: Default,
    {
        self.with(T::default)
    }

    /// Append a factory callback that pushes the new object itself.
    pub fn with_factory(mut self, factory: NativeFn) -> Self {
        self.candidates.push(factory);
        self
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn into_native_fn(self) -> Result<NativeFn, RegistrationError> {
        let mut candidates = self.candidates;
        match candidates.len() {
            0 => Err(RegistrationError::EmptyConstructorList {
                type_name: type_name::<T>(),
            }),
            1 => Ok(candidates.remove(0)),
            _ => Ok(OverloadedFunction::new(candidates).into_native_fn(CallbackShape::Constructor)),
        }
    }
}

impl<T: 'static> Default for ConstructorList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> IntoNativeFn<Prebuilt> for ConstructorList<T> {
    fn into_native_fn(self) -> Result<NativeFn, RegistrationError> {
        ConstructorList::into_native_fn(self)
    }
}
