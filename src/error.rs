//! Installation-time errors.
//!
//! Call-time failures are [`NativeError`](stackbind_core::NativeError)s.
//! The errors here can only happen while building or installing a slot.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A property pair with neither accessor
    #[error("property '{name}' has neither a read nor a write accessor")]
    EmptyProperty { name: String },

    /// An overload set with no candidates
    #[error("overload set '{name}' has no candidates")]
    EmptyOverloadSet { name: String },

    /// A constructor list with no constructors
    #[error("constructor list for {type_name} is empty")]
    EmptyConstructorList { type_name: &'static str },

    /// Slots must be named
    #[error("slot name cannot be empty")]
    EmptyName,
}

impl RegistrationError {
    /// Attach the slot name to an error raised before the name was known.
    pub fn named(self, slot: &str) -> Self {
        match self {
            RegistrationError::EmptyProperty { name } if name.is_empty() => {
                RegistrationError::EmptyProperty {
                    name: slot.to_string(),
                }
            }
            RegistrationError::EmptyOverloadSet { name } if name.is_empty() => {
                RegistrationError::EmptyOverloadSet {
                    name: slot.to_string(),
                }
            }
            other => other,
        }
    }
}
