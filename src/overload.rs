//! Overload routing.
//!
//! Several candidates share one slot. On every call the router walks them in
//! registration order and commits to the first one that admits the actual
//! argument list:
//!
//! 1. the argument count must fall inside the candidate's arity;
//! 2. with [`BindProperty::OverloadTypeCheck`](stackbind_core::BindProperty)
//!    on (the default), every argument must also be convertible to the
//!    candidate's parameter type.
//!
//! Both tests only look at the slots. No argument is converted and nothing
//! is pushed for a candidate that is passed over, so a rejected candidate
//! leaves no trace. Once a candidate is chosen its result or failure is
//! returned unchanged. Candidates that can accept the same arguments are
//! not diagnosed; the earlier one always wins.

use stackbind_core::{
    Arity, Binding, CallContext, CallbackShape, DispatchError, NativeCallable, NativeError,
    NativeFn,
};
use tracing::debug;

use crate::closure::{IntoNativeFn, Prebuilt};
use crate::error::RegistrationError;

/// An ordered list of candidates for one slot.
///
/// ```
/// use stackbind::{Dynamic, OverloadSet, State, function};
///
/// let area = OverloadSet::new()
///     .with(function(|side: f64| side * side))
///     .with(function(|w: f64, h: f64| w * h))
///     .into_native_fn()?;
///
/// let mut state = State::new();
/// let out = state.call(&area, vec![Dynamic::Float(2.0), Dynamic::Float(3.0)])?;
/// assert_eq!(out, vec![Dynamic::Float(6.0)]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct OverloadSet {
    candidates: Vec<NativeFn>,
}

impl OverloadSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate. Earlier candidates take precedence.
    pub fn with(mut self, candidate: NativeFn) -> Self {
        self.candidates.push(candidate);
        self
    }

    /// Synthesize and append a callable not wrapped yet.
    pub fn add<M>(mut self, candidate: impl IntoNativeFn<M>) -> Result<Self, RegistrationError> {
        self.candidates.push(candidate.into_native_fn()?);
        Ok(self)
    }

    pub fn push(&mut self, candidate: NativeFn) {
        self.candidates.push(candidate);
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn candidates(&self) -> &[NativeFn] {
        &self.candidates
    }

    /// Build the slot's callback.
    ///
    /// A single candidate is returned as is, without a router in front of
    /// it.
    pub fn into_native_fn(self) -> Result<NativeFn, RegistrationError> {
        let mut candidates = self.candidates;
        match candidates.len() {
            0 => Err(RegistrationError::EmptyOverloadSet {
                name: String::new(),
            }),
            1 => Ok(candidates.remove(0)),
            _ => Ok(OverloadedFunction::new(candidates).into_native_fn(CallbackShape::Overloaded)),
        }
    }
}

impl From<Vec<NativeFn>> for OverloadSet {
    fn from(candidates: Vec<NativeFn>) -> Self {
        Self { candidates }
    }
}

impl FromIterator<NativeFn> for OverloadSet {
    fn from_iter<I: IntoIterator<Item = NativeFn>>(iter: I) -> Self {
        Self {
            candidates: iter.into_iter().collect(),
        }
    }
}

impl Extend<NativeFn> for OverloadSet {
    fn extend<I: IntoIterator<Item = NativeFn>>(&mut self, iter: I) {
        self.candidates.extend(iter);
    }
}

impl IntoNativeFn<Prebuilt> for OverloadSet {
    fn into_native_fn(self) -> Result<NativeFn, RegistrationError> {
        OverloadSet::into_native_fn(self)
    }
}

/// The dispatch state block of an overloaded slot.
pub struct OverloadedFunction {
    candidates: Vec<NativeFn>,
}

impl OverloadedFunction {
    pub fn new(candidates: Vec<NativeFn>) -> Self {
        Self { candidates }
    }

    pub fn candidates(&self) -> &[NativeFn] {
        &self.candidates
    }

    /// Wrap the router as one callback with the given shape.
    pub fn into_native_fn(self, shape: CallbackShape) -> NativeFn {
        debug!(candidates = self.candidates.len(), ?shape, "built overload router");
        NativeFn::closure(shape, None, Binding::Unbound, self)
    }

    /// Index of the first candidate admitting the frame's arguments.
    pub fn select(&self, ctx: &CallContext<'_>) -> Result<usize, DispatchError> {
        let count = ctx.arg_count();
        let type_check = ctx.config().overload_type_check();
        let mut type_rejected = Vec::new();

        for (index, candidate) in self.candidates.iter().enumerate() {
            if !candidate.arity().admits(count) {
                continue;
            }
            if type_check && !candidate.accepts(ctx) {
                type_rejected.push(index);
                continue;
            }
            return Ok(index);
        }

        Err(DispatchError {
            attempted: count,
            candidates: self.candidates.iter().map(NativeFn::arity).collect(),
            type_rejected,
        })
    }
}

impl NativeCallable for OverloadedFunction {
    #[cfg_attr(feature = "profiling", profiling::function)]
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<usize, NativeError> {
        match self.select(ctx) {
            Ok(index) => {
                debug!(index, arguments = ctx.arg_count(), "overload selected");
                self.candidates[index].call(ctx)
            }
            Err(err) => {
                debug!(error = %err, "no overload matched");
                Err(err.into())
            }
        }
    }

    fn arity(&self) -> Arity {
        self.candidates
            .iter()
            .map(NativeFn::arity)
            .reduce(Arity::union)
            .unwrap_or(Arity::exact(0))
    }

    fn accepts(&self, ctx: &CallContext<'_>) -> bool {
        self.select(ctx).is_ok()
    }
}
