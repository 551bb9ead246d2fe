//! Common result and error types for the Silica synthesis core.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates an unrecoverable internal error (a bug in the synthesis
/// core or an inconsistency in its inputs), not a user-facing error. The
/// core is a single-shot deterministic transformation: nothing here retries
/// or recovers, every failure is a diagnostic for the operator.
pub type SilicaResult<T> = Result<T, InternalError>;

/// An internal synthesis error indicating a bug or an invalid input graph.
///
/// These errors should never occur during normal operation. If one does
/// occur, it means the caller handed the core an inconsistent component set
/// (an unregistered member, a cyclic procedure chain) or there is a logic
/// error in the core itself.
#[derive(Debug, thiserror::Error)]
#[error("internal synthesis error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("member never registered");
        assert_eq!(
            format!("{err}"),
            "internal synthesis error: member never registered"
        );
    }

    #[test]
    fn ok_path() {
        let r: SilicaResult<i32> = Ok(42);
        assert!(r.is_ok());
        assert_eq!(r.ok(), Some(42));
    }

    #[test]
    fn err_path() {
        let r: SilicaResult<i32> = Err(InternalError::new("test error"));
        assert!(r.is_err());
        assert_eq!(r.err().unwrap().message, "test error");
    }

    #[test]
    fn from_string() {
        let err: InternalError = "from string".to_string().into();
        assert_eq!(err.message, "from string");
    }
}
