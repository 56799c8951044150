//! Adaptation layer exposing native Rust callables to a stack-based
//! interpreter as uniform callbacks.
//!
//! Every callable handed to this crate ends up as one [`NativeFn`]: a
//! callback of the fixed shape `fn(&mut CallContext) -> Result<usize, _>`
//! plus at most one captured state block. What goes into that state block is
//! decided once, at wrap time:
//!
//! - [`signature`]: static classification of free functions, function
//!   pointers, member functions, member variables and functors
//! - [`receiver`]: unbound, owned or referenced receivers for member access
//! - [`closure`]: the callback shapes (direct, free function, member
//!   function, member variable)
//! - [`overload`]: first-match-wins routing across candidate callables
//! - [`property`]: read/write accessor pairs folded into one slot
//! - [`constructor`] and [`deferred`]: constructor lists and callables
//!   synthesized at installation
//! - [`registry`]: named installation into a [`State`]
//!
//! ```
//! use stackbind::prelude::*;
//!
//! struct Counter {
//!     count: i64,
//! }
//!
//! impl Counter {
//!     fn add(&mut self, n: i64) -> i64 {
//!         self.count += n;
//!         self.count
//!     }
//! }
//!
//! let mut state = State::new();
//! Registry::new(&mut state).method_bound("add", Counter::add, Counter { count: 1 })?;
//!
//! let results = state.call_global("add", vec![Dynamic::Int(2)])?;
//! assert_eq!(results, vec![Dynamic::Int(3)]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod closure;
pub mod constructor;
pub mod deferred;
pub mod error;
pub mod member;
pub mod overload;
pub mod property;
pub mod receiver;
pub mod registry;
pub mod signature;

pub use stackbind_core::{
    Arity, BindConfig, BindProperty, Binding, CallContext, CallableKind, CallbackInfo,
    CallbackShape, ConversionError, DispatchError, Dynamic, ExtraArguments, FromDynamic,
    IntoDynamic, IntoResults, NativeCallable, NativeError, NativeFn, ObjectHandle, ObjectHeap,
    RawCallback, State,
};

pub use closure::{IntoNativeFn, direct, field, field_bound, function, method, method_bound};
pub use constructor::ConstructorList;
pub use deferred::FunctionArgs;
pub use error::RegistrationError;
pub use member::Field;
pub use overload::{OverloadSet, OverloadedFunction};
pub use property::{PropertyAccess, PropertyPair};
pub use receiver::{BoundReceiver, IntoReceiver, ReceiverAccess};
pub use registry::Registry;
pub use signature::{CallableDescriptor, Function, Method, ParamList};

// Re-export main types
pub mod prelude {
    pub use crate::closure::*;
    pub use crate::constructor::ConstructorList;
    pub use crate::deferred::FunctionArgs;
    pub use crate::error::RegistrationError;
    pub use crate::field;
    pub use crate::member::Field;
    pub use crate::overload::OverloadSet;
    pub use crate::property::PropertyPair;
    pub use crate::registry::Registry;
    pub use stackbind_core::{
        Arity, BindConfig, CallContext, Dynamic, ExtraArguments, NativeError, NativeFn, State,
    };
}
