use thiserror::Error;

/// Reasons a user trigger did not produce a command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Joint index has no axis letter
    #[error("can't zero origin for joint {joint}: no axis letter for that index")]
    InvalidJointIndex { joint: i32 },

    /// No mode selected when the trigger arrived
    #[error("no action recognised: button has no mode selected")]
    UnrecognizedMode,
}

/// Errors from the name-based property surface
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    #[error("unknown property '{0}'")]
    UnknownKey(String),

    #[error("property '{key}' expects a {expected} value")]
    TypeMismatch { key: String, expected: &'static str },
}

/// Errors from parsing status-bus vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("unknown status event '{0}'")]
    UnknownEvent(String),
}
