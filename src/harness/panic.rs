//! Normalization of recovered panic payloads.

use std::any::Any;

use thiserror::Error;

/// Descriptive error for a recovered panic whose payload was not already a
/// chain error.
///
/// String payloads (`panic!("...")`) keep their text; any other non-error
/// payload becomes a fixed description, since an opaque payload cannot be
/// formatted. Caller error types absorb this via `From`, most simply with
/// a `#[error(transparent)]` variant:
///
/// ```rust
/// use relay::harness::Panic;
/// use thiserror::Error;
///
/// #[derive(Debug, Clone, PartialEq, Error)]
/// enum JobError {
///     #[error("job rejected")]
///     Rejected,
///     #[error(transparent)]
///     Panicked(#[from] Panic),
/// }
///
/// let err = JobError::from(Panic::new("worker gave up"));
/// assert_eq!(err.to_string(), "panic: worker gave up");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("panic: {0}")]
pub struct Panic(String);

impl Panic {
    /// Builds a `Panic` from the payload's textual form.
    pub fn new(message: impl Into<String>) -> Self {
        Panic(message.into())
    }

    /// The recovered payload text.
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Converts a caught unwind payload into the chain's error type.
///
/// A payload that already is an `E` passes through untouched, so the
/// caller observes the exact error value the state panicked with.
pub(crate) fn normalize<E>(payload: Box<dyn Any + Send>) -> E
where
    E: From<Panic> + 'static,
{
    let payload = match payload.downcast::<E>() {
        Ok(error) => return *error,
        Err(other) => other,
    };
    let payload = match payload.downcast::<Panic>() {
        Ok(panic) => return (*panic).into(),
        Err(other) => other,
    };
    let message = if let Some(text) = payload.downcast_ref::<&'static str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        String::from("opaque panic payload")
    };
    Panic::new(message).into()
}

#[cfg(test)]
mod tests {
    use thiserror::Error;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Error)]
    enum TestError {
        #[error("SENTINEL")]
        Sentinel,
        #[error(transparent)]
        Panicked(#[from] Panic),
    }

    fn payload_of<T: Send + 'static>(value: T) -> Box<dyn Any + Send> {
        Box::new(value)
    }

    #[test]
    fn error_payloads_pass_through_unchanged() {
        let err: TestError = normalize(payload_of(TestError::Sentinel));
        assert_eq!(err, TestError::Sentinel);
    }

    #[test]
    fn panic_payloads_convert_via_from() {
        let err: TestError = normalize(payload_of(Panic::new("already wrapped")));
        assert_eq!(err, TestError::Panicked(Panic::new("already wrapped")));
    }

    #[test]
    fn str_payloads_keep_their_text() {
        let err: TestError = normalize(payload_of("plain message"));
        assert_eq!(err, TestError::Panicked(Panic::new("plain message")));
    }

    #[test]
    fn string_payloads_keep_their_text() {
        let err: TestError = normalize(payload_of(String::from("formatted message")));
        assert_eq!(err, TestError::Panicked(Panic::new("formatted message")));
    }

    #[test]
    fn opaque_payloads_get_a_description() {
        let err: TestError = normalize(payload_of(42_u64));
        assert_eq!(err, TestError::Panicked(Panic::new("opaque panic payload")));
    }
}
