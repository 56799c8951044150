//! The installable callback record.
//!
//! Every callback the interpreter sees has the same shape: it receives the
//! call frame and returns how many results it pushed. A [`NativeFn`] is
//! either a bare function pointer of that shape (no captured state) or a
//! closure owning exactly one state block.

use std::fmt;
use std::rc::Rc;

use crate::{Arity, NativeError};

use super::CallContext;

/// The foreign callback ABI: `(execution context) -> result count`.
pub type RawCallback = fn(&mut CallContext<'_>) -> Result<usize, NativeError>;

/// Trait for callable native functions.
///
/// The `call` method receives a `CallContext` that provides access to
/// arguments and pushes results, returning how many it pushed.
pub trait NativeCallable {
    /// Call this function with the given context.
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<usize, NativeError>;

    /// The argument counts this callable declares.
    fn arity(&self) -> Arity {
        Arity::variadic()
    }

    /// Check, without converting anything, whether the frame's arguments
    /// are acceptable to the declared parameter types.
    fn accepts(&self, _ctx: &CallContext<'_>) -> bool {
        true
    }
}

// Closures of the callback shape are callables themselves
impl<F> NativeCallable for F
where
    F: Fn(&mut CallContext<'_>) -> Result<usize, NativeError>,
{
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<usize, NativeError> {
        (self)(ctx)
    }
}

/// Static classification of the callable a callback was synthesized from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallableKind {
    /// Function items and stateless closures.
    FreeFunction,
    /// `fn(..)` pointer values.
    FunctionPointer,
    /// Functions whose first parameter is the receiver.
    MemberFunction,
    /// Field projections of a receiver type.
    MemberVariable,
    /// Closures and boxed callables carrying state.
    Functor,
}

/// How a callback was put together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackShape {
    /// Installed as-is, no wrapping.
    Direct,
    FreeFunction,
    MemberFunction,
    MemberVariable,
    Overloaded,
    Property,
    Constructor,
}

/// Where a member callback gets its receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    /// First interpreter argument, or no receiver at all.
    Unbound,
    /// A copy owned by the closure state.
    Owned,
    /// A non-owning reference captured at wrap time.
    Referenced,
}

/// Inspectable metadata fixed when a callback is synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackInfo {
    pub shape: CallbackShape,
    pub kind: Option<CallableKind>,
    pub binding: Binding,
    pub arity: Arity,
}

#[derive(Clone)]
enum Callback {
    Direct(RawCallback),
    Closure(Rc<dyn NativeCallable>),
}

/// Type-erased native callback.
///
/// Cloning shares the closure state; the state is dropped when the last
/// clone (for example the global slot it was installed in) goes away.
#[derive(Clone)]
pub struct NativeFn {
    callback: Callback,
    info: CallbackInfo,
}

impl NativeFn {
    /// Install a callback that already has the foreign shape.
    pub fn direct(callback: RawCallback) -> Self {
        Self {
            callback: Callback::Direct(callback),
            info: CallbackInfo {
                shape: CallbackShape::Direct,
                kind: Some(CallableKind::FunctionPointer),
                binding: Binding::Unbound,
                arity: Arity::variadic(),
            },
        }
    }

    /// Wrap a closure state block. The arity is taken from the callable.
    pub fn closure<C>(
        shape: CallbackShape,
        kind: Option<CallableKind>,
        binding: Binding,
        callable: C,
    ) -> Self
    where
        C: NativeCallable + 'static,
    {
        let arity = callable.arity();
        Self {
            callback: Callback::Closure(Rc::new(callable)),
            info: CallbackInfo {
                shape,
                kind,
                binding,
                arity,
            },
        }
    }

    /// Wrap a raw-shaped closure. Unlike [`direct`](Self::direct) this
    /// captures the closure as state.
    pub fn from_callable<C>(callable: C) -> Self
    where
        C: NativeCallable + 'static,
    {
        Self::closure(
            CallbackShape::Direct,
            Some(CallableKind::Functor),
            Binding::Unbound,
            callable,
        )
    }

    /// Call this native function with the given context.
    pub fn call(&self, ctx: &mut CallContext<'_>) -> Result<usize, NativeError> {
        match &self.callback {
            Callback::Direct(f) => f(ctx),
            Callback::Closure(state) => state.call(ctx),
        }
    }

    /// Check the frame's argument types against the callable's parameters.
    pub fn accepts(&self, ctx: &CallContext<'_>) -> bool {
        match &self.callback {
            Callback::Direct(_) => true,
            Callback::Closure(state) => state.accepts(ctx),
        }
    }

    pub fn info(&self) -> CallbackInfo {
        self.info
    }

    pub fn shape(&self) -> CallbackShape {
        self.info.shape
    }

    pub fn binding(&self) -> Binding {
        self.info.binding
    }

    pub fn arity(&self) -> Arity {
        self.info.arity
    }

    /// Number of captured state blocks: 0 for direct callbacks, 1 otherwise.
    pub fn upvalue_count(&self) -> usize {
        match self.callback {
            Callback::Direct(_) => 0,
            Callback::Closure(_) => 1,
        }
    }

    /// The bare function pointer, for direct callbacks.
    pub fn as_raw(&self) -> Option<RawCallback> {
        match self.callback {
            Callback::Direct(f) => Some(f),
            Callback::Closure(_) => None,
        }
    }

    /// Check whether two records share the same callback.
    pub fn ptr_eq(&self, other: &NativeFn) -> bool {
        match (&self.callback, &other.callback) {
            (Callback::Direct(a), Callback::Direct(b)) => std::ptr::fn_addr_eq(*a, *b),
            (Callback::Closure(a), Callback::Closure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<RawCallback> for NativeFn {
    fn from(callback: RawCallback) -> Self {
        NativeFn::direct(callback)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn")
            .field("shape", &self.info.shape)
            .field("binding", &self.info.binding)
            .field("arity", &self.info.arity)
            .field("upvalues", &self.upvalue_count())
            .finish()
    }
}
