use super::Error;

/// Error when an operation is configured in a way that cannot be executed.
///
/// This occurs when:
/// - A record type has no registered table descriptor
/// - A builder names a property the record type does not have
/// - An operation ends up with an empty column set
/// - A hook is supplied to an operation that does not support it
///
/// Configuration errors are always raised before any statement is sent.
#[derive(Debug)]
pub(super) struct ConfigurationError {
    message: Box<str>,
}

impl std::error::Error for ConfigurationError {}

impl core::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "configuration error: {}", self.message)
    }
}

impl Error {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Configuration(ConfigurationError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a configuration error.
    pub fn is_configuration(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::Configuration(_)))
    }
}
