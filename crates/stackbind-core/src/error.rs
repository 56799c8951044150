//! Error types for native calls.
//!
//! ```text
//! NativeError (call-time failure reported to the interpreter)
//! ├── Conversion      - a slot could not become the requested Rust type
//! ├── ArgumentCount   - a single callback got the wrong number of arguments
//! ├── Dispatch        - no overload candidate admitted the argument list
//! └── receiver / stack / callback failures
//! ```
//!
//! Conversion errors are produced by [`FromDynamic`](crate::FromDynamic)
//! implementations and pass through the adaptation layer unchanged.

use thiserror::Error;

use crate::Arity;

/// Errors that can occur when converting between Rust and slot values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// Type mismatch during conversion
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Attempted to convert a null handle to a non-nullable type
    #[error("null handle cannot be converted to {target_type}")]
    NullHandle { target_type: &'static str },

    /// Integer overflow during conversion
    #[error("integer overflow: value {value} does not fit in {target_type}")]
    IntegerOverflow { value: i64, target_type: &'static str },

    /// Float conversion error
    #[error("float conversion error: value {value} cannot be represented as {target_type}")]
    FloatConversion {
        value: f64,
        target_type: &'static str,
    },

    /// The slot holds a value that cannot be duplicated out of the stack
    #[error("{actual} value cannot be copied out of its slot")]
    NotCloneable { actual: &'static str },
}

/// No overload candidate admitted the actual argument list.
///
/// `candidates` lists every candidate's declared arity in registration
/// order. `type_rejected` holds the indices of candidates whose arity
/// matched but whose parameter types rejected the arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.describe())]
pub struct DispatchError {
    pub attempted: usize,
    pub candidates: Vec<Arity>,
    pub type_rejected: Vec<usize>,
}

impl DispatchError {
    pub fn new(attempted: usize, candidates: Vec<Arity>) -> Self {
        Self {
            attempted,
            candidates,
            type_rejected: Vec::new(),
        }
    }

    fn describe(&self) -> String {
        let arities = self
            .candidates
            .iter()
            .map(Arity::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let mut message = format!(
            "no matching overload for {} argument(s); candidate arities: [{}]",
            self.attempted, arities
        );
        if !self.type_rejected.is_empty() {
            let rejected = self
                .type_rejected
                .iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            message.push_str(&format!(
                "; candidates [{}] matched the count but rejected the argument types",
                rejected
            ));
        }
        message
    }
}

/// Errors that can occur during native function execution.
#[derive(Debug, Error)]
pub enum NativeError {
    /// Error converting arguments or return values
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Argument count outside the callback's declared range
    #[error("wrong number of arguments: expected {expected}, got {actual}")]
    ArgumentCount { expected: Arity, actual: usize },

    /// Argument index out of bounds
    #[error("argument index {index} out of bounds (function has {count} arguments)")]
    ArgumentIndexOutOfBounds { index: usize, count: usize },

    /// Overload resolution failed
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Invalid receiver for a member call
    #[error("invalid receiver: {message}")]
    InvalidThis { message: String },

    /// A receiver bound by reference outlived its referent
    #[error("bound receiver of type {type_name} has been dropped")]
    DanglingReceiver { type_name: &'static str },

    /// A bound receiver is already borrowed by an outer call
    #[error("bound receiver of type {type_name} is already borrowed")]
    ReceiverBorrowed { type_name: &'static str },

    /// Stale object handle (object was freed)
    #[error("stale object handle: object at index {index} has been freed")]
    StaleHandle { index: u32 },

    /// Callback claimed more results than it pushed
    #[error("callback reported {reported} result(s) but pushed {pushed}")]
    ResultCount { reported: usize, pushed: usize },

    /// The value stack would grow past its configured limit
    #[error("stack overflow: depth {depth} exceeds limit {limit}")]
    StackOverflow { depth: usize, limit: usize },

    /// No global slot with this name
    #[error("no global named '{name}'")]
    UnknownGlobal { name: String },

    /// Global slot does not hold a callback
    #[error("global '{name}' is a {actual}, not a function")]
    NotCallable { name: String, actual: &'static str },

    /// Error returned by the wrapped native callable itself
    #[error("{message}")]
    Callback { message: String },

    /// Generic native error
    #[error("native error: {message}")]
    Other { message: String },
}

impl NativeError {
    /// Create an "invalid this" error with a message.
    pub fn invalid_this(message: impl Into<String>) -> Self {
        NativeError::InvalidThis {
            message: message.into(),
        }
    }

    /// Create a generic native error.
    pub fn other(message: impl Into<String>) -> Self {
        NativeError::Other {
            message: message.into(),
        }
    }

    /// The dispatch failure, if this error is one.
    pub fn as_dispatch(&self) -> Option<&DispatchError> {
        match self {
            NativeError::Dispatch(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_error_type_mismatch() {
        let err = ConversionError::TypeMismatch {
            expected: "int",
            actual: "string",
        };
        assert!(err.to_string().contains("type mismatch"));
        assert!(err.to_string().contains("int"));
        assert!(err.to_string().contains("string"));
    }

    #[test]
    fn conversion_error_passes_through_native_error() {
        let err: NativeError = ConversionError::NullHandle {
            target_type: "Point",
        }
        .into();
        assert!(matches!(
            err,
            NativeError::Conversion(ConversionError::NullHandle { .. })
        ));
    }

    #[test]
    fn dispatch_error_lists_candidates() {
        let err = DispatchError::new(3, vec![Arity::exact(1), Arity::exact(2), Arity::range(0, 1)]);
        let msg = err.to_string();
        assert!(msg.contains("3 argument(s)"));
        assert!(msg.contains("[1, 2, 0..=1]"));
        assert!(!msg.contains("rejected"));
    }

    #[test]
    fn dispatch_error_reports_type_rejections() {
        let err = DispatchError {
            attempted: 2,
            candidates: vec![Arity::exact(2), Arity::exact(2)],
            type_rejected: vec![0, 1],
        };
        assert!(err.to_string().contains("candidates [0, 1] matched the count"));
    }

    #[test]
    fn dispatch_is_transparent() {
        let err: NativeError = DispatchError::new(0, vec![Arity::exact(1)]).into();
        assert!(err.to_string().starts_with("no matching overload"));
        assert!(err.as_dispatch().is_some());
    }

    #[test]
    fn argument_count_display() {
        let err = NativeError::ArgumentCount {
            expected: Arity::exact(2),
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "wrong number of arguments: expected 2, got 1"
        );
    }

    #[test]
    fn native_error_helpers() {
        assert!(NativeError::invalid_this("nope").to_string().contains("nope"));
        assert!(NativeError::other("boom").to_string().contains("boom"));
    }
}
