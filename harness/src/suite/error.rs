use crate::client::{Envelope, TransportError};
use crate::validation::{validate, Expectation, ValidationFailure};

/// Why a case did not pass. Terminal for that case only.
#[derive(Debug, thiserror::Error)]
pub enum CaseError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("{0}")]
    Assertion(String),

    /// The service did not behave in a way the case can judge.
    #[error("skipped: {0}")]
    Skipped(String),
}

impl CaseError {
    /// Every message attached to the failure; the full list for validation errors.
    #[must_use]
    pub fn details(&self) -> Vec<String> {
        match self {
            Self::Validation(failure) => failure.errors.clone(),
            other => vec![other.to_string()],
        }
    }
}

/// Validate `envelope`, turning a failed result into [`CaseError::Validation`].
///
/// # Errors
/// Returns the complete error list when the envelope does not meet `expectation`.
pub fn check(envelope: &Envelope, expectation: &Expectation<'_>) -> Result<(), CaseError> {
    validate(envelope, expectation).into_result()?;
    Ok(())
}

/// # Errors
/// Returns [`CaseError::Assertion`] with `message` when `condition` is false.
pub fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<(), CaseError> {
    if condition {
        Ok(())
    } else {
        Err(CaseError::Assertion(message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validation_details_keep_every_error() {
        let envelope = Envelope::json(404, json!({"title": 1}));
        let err = check(&envelope, &Expectation::status(200).with_content_type("text/html"))
            .expect_err("should fail");

        assert!(matches!(err, CaseError::Validation(_)));
        assert_eq!(err.details().len(), 2);
    }

    #[test]
    fn ensure_formats_lazily() {
        assert!(ensure(true, || unreachable!()).is_ok());
        let err = ensure(false, || "ids differ".to_string()).expect_err("should fail");
        assert_eq!(err.to_string(), "ids differ");
        assert_eq!(err.details(), vec!["ids differ".to_string()]);
    }
}
