//! Execution context: value stack, object heap and named global slots.

use rustc_hash::FxHashMap;

use crate::convert::IntoDynamic;
use crate::{BindConfig, NativeError};

use super::{CallContext, Dynamic, NativeFn, ObjectHeap};

/// One interpreter execution context.
///
/// Native calls are synchronous and run to completion on the caller's
/// thread. After every call, successful or not, the stack is back at the
/// height it had before the arguments were pushed: a failed call never
/// leaves partial results behind.
pub struct State {
    stack: Vec<Dynamic>,
    heap: ObjectHeap,
    globals: FxHashMap<String, Dynamic>,
    config: BindConfig,
}

impl State {
    pub fn new() -> Self {
        Self::with_config(BindConfig::default())
    }

    pub fn with_config(config: BindConfig) -> Self {
        Self {
            stack: Vec::new(),
            heap: ObjectHeap::new(),
            globals: FxHashMap::default(),
            config,
        }
    }

    pub fn config(&self) -> &BindConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut BindConfig {
        &mut self.config
    }

    pub fn heap(&self) -> &ObjectHeap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut ObjectHeap {
        &mut self.heap
    }

    /// Current value stack height.
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Allocate a receiver object and return a slot referring to it.
    pub fn allocate<T: 'static>(&mut self, value: T) -> Dynamic {
        Dynamic::Object(self.heap.allocate(value))
    }

    /// Store a value under `name`, returning the previous occupant.
    pub fn set_global(&mut self, name: impl Into<String>, value: impl IntoDynamic) -> Option<Dynamic> {
        self.globals.insert(name.into(), value.into_dynamic())
    }

    pub fn global(&self, name: &str) -> Option<&Dynamic> {
        self.globals.get(name)
    }

    pub fn remove_global(&mut self, name: &str) -> Option<Dynamic> {
        self.globals.remove(name)
    }

    pub fn has_global(&self, name: &str) -> bool {
        self.globals.contains_key(name)
    }

    /// Call `function` with `args`, returning the results it pushed.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn call(&mut self, function: &NativeFn, args: Vec<Dynamic>) -> Result<Vec<Dynamic>, NativeError> {
        let base = self.stack.len();
        let limit = self.config.max_stack_depth();
        if base + args.len() > limit {
            return Err(NativeError::StackOverflow {
                depth: base + args.len(),
                limit,
            });
        }
        self.stack.extend(args);

        let outcome = {
            let mut ctx = CallContext::new(&mut self.stack, base, &mut self.heap, &self.config);
            function.call(&mut ctx).map(|count| (count, ctx.pushed()))
        };

        let results = match outcome {
            Ok((count, pushed)) if count <= pushed => {
                let top = self.stack.len();
                Ok(self.stack.drain(top - count..).collect())
            }
            Ok((count, pushed)) => Err(NativeError::ResultCount {
                reported: count,
                pushed,
            }),
            Err(err) => {
                tracing::debug!(error = %err, "native call failed");
                Err(err)
            }
        };
        self.stack.truncate(base);
        results
    }

    /// Call the callback installed under `name`.
    pub fn call_global(&mut self, name: &str, args: Vec<Dynamic>) -> Result<Vec<Dynamic>, NativeError> {
        let function = match self.globals.get(name) {
            Some(Dynamic::Function(f)) => f.clone(),
            Some(other) => {
                return Err(NativeError::NotCallable {
                    name: name.to_string(),
                    actual: other.type_name(),
                });
            }
            None => {
                return Err(NativeError::UnknownGlobal {
                    name: name.to_string(),
                });
            }
        };
        self.call(&function, args)
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("stack_depth", &self.stack.len())
            .field("globals", &self.globals.len())
            .field("heap", &self.heap)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(ctx: &mut CallContext<'_>) -> Result<usize, NativeError> {
        let mut total = 0i64;
        for i in 0..ctx.arg_count() {
            total += ctx.arg::<i64>(i)?;
        }
        ctx.push(total)
    }

    fn push_then_fail(ctx: &mut CallContext<'_>) -> Result<usize, NativeError> {
        ctx.push(1i64)?;
        ctx.push(2i64)?;
        Err(NativeError::other("failed after pushing"))
    }

    fn overclaim(ctx: &mut CallContext<'_>) -> Result<usize, NativeError> {
        ctx.push(1i64)?;
        Ok(2)
    }

    #[test]
    fn call_returns_pushed_results() {
        let mut state = State::new();
        let results = state
            .call(&NativeFn::direct(sum), vec![Dynamic::Int(1), Dynamic::Int(2)])
            .unwrap();
        assert_eq!(results, vec![Dynamic::Int(3)]);
        assert_eq!(state.stack_depth(), 0);
    }

    #[test]
    fn failed_call_leaves_no_partial_results() {
        let mut state = State::new();
        let err = state
            .call(&NativeFn::direct(push_then_fail), vec![Dynamic::Int(1)])
            .unwrap_err();
        assert!(matches!(err, NativeError::Other { .. }));
        assert_eq!(state.stack_depth(), 0);
    }

    #[test]
    fn overclaimed_results_fail() {
        let mut state = State::new();
        let err = state
            .call(&NativeFn::direct(overclaim), vec![])
            .unwrap_err();
        assert!(matches!(
            err,
            NativeError::ResultCount {
                reported: 2,
                pushed: 1
            }
        ));
        assert_eq!(state.stack_depth(), 0);
    }

    #[test]
    fn call_global_resolves_functions() {
        let mut state = State::new();
        state.set_global("sum", NativeFn::direct(sum));
        state.set_global("answer", 42i64);

        let results = state.call_global("sum", vec![Dynamic::Int(4)]).unwrap();
        assert_eq!(results, vec![Dynamic::Int(4)]);

        assert!(matches!(
            state.call_global("answer", vec![]),
            Err(NativeError::NotCallable { actual: "int", .. })
        ));
        assert!(matches!(
            state.call_global("missing", vec![]),
            Err(NativeError::UnknownGlobal { .. })
        ));
    }

    #[test]
    fn argument_push_respects_limit() {
        let mut state = State::with_config(BindConfig::new().with_max_stack_depth(2));
        let err = state
            .call(
                &NativeFn::direct(sum),
                vec![Dynamic::Int(1), Dynamic::Int(1), Dynamic::Int(1)],
            )
            .unwrap_err();
        assert!(matches!(err, NativeError::StackOverflow { limit: 2, .. }));
    }

    #[test]
    fn set_global_returns_previous() {
        let mut state = State::new();
        assert!(state.set_global("x", 1i64).is_none());
        assert_eq!(state.set_global("x", 2i64), Some(Dynamic::Int(1)));
        assert_eq!(state.remove_global("x"), Some(Dynamic::Int(2)));
        assert!(!state.has_global("x"));
    }
}
