//! Value-stack collaborator for the stackbind adaptation layer.
//!
//! This crate owns everything the adaptation layer needs from an embedded,
//! stack-based interpreter without being one:
//!
//! - [`Dynamic`]: the value stored in a stack slot
//! - [`ObjectHeap`]: generational arena holding receiver objects
//! - [`CallContext`]: the frame a native callback sees while it runs
//! - [`State`]: an execution context (stack, heap, global slots, config)
//! - [`NativeFn`]: the installable `{callback, upvalue count}` record
//! - [`FromDynamic`] / [`IntoDynamic`] / [`IntoResults`]: slot conversions
//!
//! Every callback conforms to one fixed shape, [`RawCallback`]:
//! `fn(&mut CallContext) -> Result<usize, NativeError>`, returning the number
//! of results it pushed.

pub mod arity;
pub mod config;
pub mod convert;
pub mod error;
pub mod runtime;

pub use arity::Arity;
pub use config::{BindConfig, BindProperty, ExtraArguments};
pub use convert::{FromDynamic, IntoDynamic, IntoResults};
pub use error::{ConversionError, DispatchError, NativeError};
pub use runtime::{
    Binding, CallContext, CallableKind, CallbackInfo, CallbackShape, Dynamic, NativeCallable,
    NativeFn, ObjectHandle, ObjectHeap, RawCallback, State,
};
