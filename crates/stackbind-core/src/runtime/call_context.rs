//! Call frame bridging the value stack and native Rust functions.

use std::any::{Any, type_name};
use std::fmt;

use crate::convert::{FromDynamic, IntoDynamic, IntoResults};
use crate::{Arity, BindConfig, ExtraArguments, NativeError};

use super::{Dynamic, ObjectHeap};

/// Context for native function calls.
///
/// A frame covers the stack slots from `base` to the stack top as it was
/// when the call started; those are the arguments. Anything pushed while
/// the callback runs lands above them and counts as a result.
///
/// ## Typed Argument Access
///
/// ```ignore
/// let x: i32 = ctx.arg(0)?;
/// let y: Option<f64> = ctx.arg(1)?; // may be omitted by the caller
/// ```
///
/// ## Results
///
/// ```ignore
/// ctx.push(x + 1)?;          // one result
/// ctx.push_results((a, b))?; // two results
/// ```
pub struct CallContext<'s> {
    stack: &'s mut Vec<Dynamic>,
    /// Index of the first argument
    base: usize,
    /// Stack height when the call started; results start here
    arg_top: usize,
    heap: &'s mut ObjectHeap,
    config: &'s BindConfig,
}

impl<'s> CallContext<'s> {
    /// Create a frame whose arguments are `stack[base..]`.
    pub fn new(
        stack: &'s mut Vec<Dynamic>,
        base: usize,
        heap: &'s mut ObjectHeap,
        config: &'s BindConfig,
    ) -> Self {
        let arg_top = stack.len();
        Self {
            stack,
            base: base.min(arg_top),
            arg_top,
            heap,
            config,
        }
    }

    /// Get the number of arguments, receiver included.
    pub fn arg_count(&self) -> usize {
        self.arg_top - self.base
    }

    /// Get a raw reference to an argument slot.
    pub fn arg_slot(&self, index: usize) -> Result<&Dynamic, NativeError> {
        if index < self.arg_count() {
            Ok(&self.stack[self.base + index])
        } else {
            Err(NativeError::ArgumentIndexOutOfBounds {
                index,
                count: self.arg_count(),
            })
        }
    }

    /// Get a typed argument value.
    ///
    /// Optional parameter types (see [`FromDynamic::OPTIONAL`]) read an
    /// omitted trailing argument as `Void`.
    pub fn arg<T: FromDynamic>(&self, index: usize) -> Result<T, NativeError> {
        if index >= self.arg_count() && T::OPTIONAL {
            return T::from_dynamic(&Dynamic::Void).map_err(NativeError::from);
        }
        let slot = self.arg_slot(index)?;
        T::from_dynamic(slot).map_err(NativeError::from)
    }

    /// Check whether the argument at `index` would convert to `T`.
    pub fn arg_accepts<T: FromDynamic>(&self, index: usize) -> bool {
        match self.arg_slot(index) {
            Ok(slot) => T::accepts(slot),
            Err(_) => T::OPTIONAL,
        }
    }

    /// Validate the argument count for a single callback according to the
    /// configured [`ExtraArguments`] policy.
    pub fn check_arity(&self, expected: Arity) -> Result<(), NativeError> {
        let actual = self.arg_count();
        let ok = match self.config.extra_arguments() {
            ExtraArguments::Ignore => actual >= expected.min(),
            ExtraArguments::Reject => expected.admits(actual),
        };
        if ok {
            Ok(())
        } else {
            Err(NativeError::ArgumentCount { expected, actual })
        }
    }

    /// Get the raw receiver slot (argument 0).
    pub fn receiver(&self) -> Result<&Dynamic, NativeError> {
        self.arg_slot(0)
            .map_err(|_| NativeError::invalid_this("no receiver argument"))
    }

    /// Check whether argument slot 0 holds a live `T` receiver.
    pub fn this_accepts<T: Any>(&self) -> bool {
        self.this::<T>().is_ok()
    }

    /// Get an immutable reference to the receiver in argument slot 0.
    ///
    /// The receiver may be an inline `Native` value or an `Object` handle
    /// into the heap. The type must match exactly.
    pub fn this<T: Any>(&self) -> Result<&T, NativeError> {
        match self.receiver()? {
            Dynamic::Native(boxed) => boxed
                .downcast_ref::<T>()
                .ok_or_else(|| native_mismatch::<T>()),
            Dynamic::Object(handle) => self.heap.try_get::<T>(*handle),
            other => Err(NativeError::invalid_this(format!(
                "expected {}, got {}",
                type_name::<T>(),
                other.type_name()
            ))),
        }
    }

    /// Get a mutable reference to the receiver in argument slot 0.
    pub fn this_mut<T: Any>(&mut self) -> Result<&mut T, NativeError> {
        if self.arg_count() == 0 {
            return Err(NativeError::invalid_this("no receiver argument"));
        }
        let index = self.base;

        // Object handles reference the heap, not the slot
        if let Dynamic::Object(handle) = self.stack[index] {
            return self.heap.try_get_mut::<T>(handle);
        }
        match &mut self.stack[index] {
            Dynamic::Native(boxed) => boxed
                .downcast_mut::<T>()
                .ok_or_else(|| native_mismatch::<T>()),
            other => Err(NativeError::invalid_this(format!(
                "expected {}, got {}",
                type_name::<T>(),
                other.type_name()
            ))),
        }
    }

    /// Push a raw slot value as a result.
    pub fn push_slot(&mut self, value: Dynamic) -> Result<usize, NativeError> {
        let limit = self.config.max_stack_depth();
        if self.stack.len() >= limit {
            return Err(NativeError::StackOverflow {
                depth: self.stack.len() + 1,
                limit,
            });
        }
        self.stack.push(value);
        Ok(1)
    }

    /// Push a typed value as a result. Returns the slot count (always 1).
    pub fn push<T: IntoDynamic>(&mut self, value: T) -> Result<usize, NativeError> {
        self.push_slot(value.into_dynamic())
    }

    /// Push any number of results. Returns how many slots were pushed.
    pub fn push_results<R: IntoResults>(&mut self, results: R) -> Result<usize, NativeError> {
        results.push_into(self)
    }

    /// Number of results pushed so far.
    pub fn pushed(&self) -> usize {
        self.stack.len() - self.arg_top
    }

    /// Get access to the object heap.
    pub fn heap(&self) -> &ObjectHeap {
        self.heap
    }

    /// Get mutable access to the object heap.
    pub fn heap_mut(&mut self) -> &mut ObjectHeap {
        self.heap
    }

    pub fn config(&self) -> &BindConfig {
        self.config
    }
}

fn native_mismatch<T: Any>() -> NativeError {
    NativeError::invalid_this(format!(
        "native value is not a {}",
        type_name::<T>()
    ))
}

impl fmt::Debug for CallContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallContext")
            .field("arg_count", &self.arg_count())
            .field("base", &self.base)
            .field("pushed", &self.pushed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConversionError;

    struct Frame {
        slots: Vec<Dynamic>,
        heap: ObjectHeap,
        config: BindConfig,
    }

    impl Frame {
        fn new(slots: Vec<Dynamic>) -> Self {
            Self {
                slots,
                heap: ObjectHeap::new(),
                config: BindConfig::default(),
            }
        }

        fn ctx(&mut self) -> CallContext<'_> {
            CallContext::new(&mut self.slots, 0, &mut self.heap, &self.config)
        }
    }

    #[test]
    fn arg_count_excludes_slots_below_base() {
        let mut slots = vec![Dynamic::Int(1), Dynamic::Int(2), Dynamic::Int(3)];
        let mut heap = ObjectHeap::new();
        let config = BindConfig::default();

        let ctx = CallContext::new(&mut slots, 1, &mut heap, &config);
        assert_eq!(ctx.arg_count(), 2);
        assert_eq!(ctx.arg::<i64>(0).unwrap(), 2);
    }

    #[test]
    fn typed_args() {
        let mut frame = Frame::new(vec![
            Dynamic::Int(42),
            Dynamic::Float(3.5),
            Dynamic::Bool(true),
        ]);
        let ctx = frame.ctx();

        assert_eq!(ctx.arg::<i32>(0).unwrap(), 42);
        assert_eq!(ctx.arg::<f64>(1).unwrap(), 3.5);
        assert!(ctx.arg::<bool>(2).unwrap());
    }

    #[test]
    fn arg_conversion_error_is_unchanged() {
        let mut frame = Frame::new(vec![Dynamic::String("x".into())]);
        let ctx = frame.ctx();
        let err = ctx.arg::<i64>(0).unwrap_err();
        assert!(matches!(
            err,
            NativeError::Conversion(ConversionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn missing_optional_arg_reads_as_none() {
        let mut frame = Frame::new(vec![Dynamic::Int(1)]);
        let ctx = frame.ctx();
        assert_eq!(ctx.arg::<Option<i64>>(1).unwrap(), None);
        assert!(ctx.arg::<i64>(1).is_err());
        assert!(ctx.arg_accepts::<Option<i64>>(1));
        assert!(!ctx.arg_accepts::<i64>(1));
    }

    #[test]
    fn check_arity_follows_policy() {
        let mut frame = Frame::new(vec![Dynamic::Int(1), Dynamic::Int(2)]);
        assert!(frame.ctx().check_arity(Arity::exact(2)).is_ok());
        assert!(matches!(
            frame.ctx().check_arity(Arity::exact(1)),
            Err(NativeError::ArgumentCount { actual: 2, .. })
        ));
        assert!(frame.ctx().check_arity(Arity::exact(3)).is_err());

        frame.config = BindConfig::new().with_extra_arguments(ExtraArguments::Ignore);
        assert!(frame.ctx().check_arity(Arity::exact(1)).is_ok());
        assert!(frame.ctx().check_arity(Arity::exact(3)).is_err());
    }

    #[test]
    fn this_inline_native() {
        let mut frame = Frame::new(vec![Dynamic::native(42i32), Dynamic::Int(10)]);
        let mut ctx = frame.ctx();
        assert_eq!(*ctx.this::<i32>().unwrap(), 42);

        *ctx.this_mut::<i32>().unwrap() = 7;
        assert_eq!(*ctx.this::<i32>().unwrap(), 7);
        assert!(ctx.this::<String>().is_err());
    }

    #[test]
    fn this_heap_object() {
        let mut frame = Frame::new(vec![]);
        let handle = frame.heap.allocate(String::from("hi"));
        frame.slots.push(Dynamic::Object(handle));

        let mut ctx = frame.ctx();
        ctx.this_mut::<String>().unwrap().push('!');
        assert_eq!(ctx.this::<String>().unwrap(), "hi!");
    }

    #[test]
    fn this_without_receiver() {
        let mut frame = Frame::new(vec![]);
        assert!(matches!(
            frame.ctx().this::<i32>(),
            Err(NativeError::InvalidThis { .. })
        ));
        let mut frame = Frame::new(vec![Dynamic::Int(3)]);
        assert!(frame.ctx().this_mut::<i32>().is_err());
    }

    #[test]
    fn pushes_count_as_results() {
        let mut frame = Frame::new(vec![Dynamic::Int(1)]);
        let mut ctx = frame.ctx();
        assert_eq!(ctx.push(5i64).unwrap(), 1);
        assert_eq!(ctx.push_results((1i64, true)).unwrap(), 2);
        assert_eq!(ctx.push_results(()).unwrap(), 0);
        assert_eq!(ctx.pushed(), 3);
        assert_eq!(ctx.arg_count(), 1);
    }

    #[test]
    fn push_respects_stack_limit() {
        let mut frame = Frame::new(vec![Dynamic::Int(1)]);
        frame.config = BindConfig::new().with_max_stack_depth(1);
        assert!(matches!(
            frame.ctx().push(2i64),
            Err(NativeError::StackOverflow { limit: 1, .. })
        ));
    }
}
