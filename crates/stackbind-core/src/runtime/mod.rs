//! Runtime collaborator: slot values, the object heap, call frames and the
//! execution context native callbacks run against.
//!
//! ## Key Types
//!
//! - [`Dynamic`]: Runtime value type for stack slots
//! - [`NativeFn`]: Installable callback record (direct or closure)
//! - [`CallContext`]: Frame view handed to a callback while it runs
//! - [`ObjectHeap`]: Generational arena for receiver objects
//! - [`State`]: Stack, heap, global slots and configuration

mod call_context;
mod dynamic;
mod native_fn;
mod object_heap;
mod state;

pub use call_context::CallContext;
pub use dynamic::Dynamic;
pub use native_fn::{
    Binding, CallableKind, CallbackInfo, CallbackShape, NativeCallable, NativeFn, RawCallback,
};
pub use object_heap::{ObjectHandle, ObjectHeap};
pub use state::State;
