use std::fmt;

use snafu::Snafu;

use crate::constants::{cmqc, reason_name};

/// Completion code of an MQI call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompletionCode {
    Ok,
    Warning,
    Failed,
    Unknown(i32),
}

impl From<i32> for CompletionCode {
    fn from(value: i32) -> Self {
        match value {
            cmqc::MQCC_OK => Self::Ok,
            cmqc::MQCC_WARNING => Self::Warning,
            cmqc::MQCC_FAILED => Self::Failed,
            other => Self::Unknown(other),
        }
    }
}

/// An error reported by the queue manager, carrying the raw completion and reason codes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MqiError {
    pub comp: i32,
    pub reason: i32,
}

impl MqiError {
    pub const fn new(comp: i32, reason: i32) -> Self {
        Self { comp, reason }
    }

    /// Completion code, decoded.
    pub fn completion(&self) -> CompletionCode {
        CompletionCode::from(self.comp)
    }

    /// Returns `true` if this error carries the given reason code.
    pub fn is_reason(&self, reason: i32) -> bool {
        self.reason == reason
    }

    /// Human-readable description of the reason code.
    pub fn error_as_string(&self) -> String {
        match (self.completion(), reason_name(self.reason)) {
            (CompletionCode::Ok, _) => "OK".to_string(),
            (CompletionCode::Warning, Some(name)) => format!("WARNING: {}", name),
            (CompletionCode::Failed, Some(name)) => format!("FAILED: {}", name),
            (_, _) => format!("Error code {} not defined", self.reason),
        }
    }
}

impl fmt::Display for MqiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MQI Error. Comp: {}, Reason {}: {}",
            self.comp,
            self.reason,
            self.error_as_string()
        )
    }
}

impl std::error::Error for MqiError {}

/// Codec error.
#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum Error {
    /// The queue manager returned a failure completion code.
    #[snafu(display("{}", source))]
    Mqi { source: MqiError },

    /// The binding was used incorrectly, or data handed to it was malformed.
    #[snafu(display("MQI interface error: {}", reason))]
    Interface { reason: String },

    /// A PCF parameter carried a type tag that has no decoder.
    #[snafu(display("unsupported PCF parameter type {}", tag))]
    UnsupportedParameterType { tag: i32 },

    /// The buffer ended before a record was complete.
    #[snafu(display("buffer truncated: needed {} bytes, {} remaining", needed, remaining))]
    Truncated { needed: usize, remaining: usize },

    /// A length or count field held an impossible value.
    #[snafu(display("invalid length for {}: {}", what, length))]
    InvalidLength { what: &'static str, length: i64 },

    /// A buffer was larger than the structure it was unpacked into.
    #[snafu(display("buffer too long: expected at most {} bytes, got {}", expected, actual))]
    BufferTooLong { expected: usize, actual: usize },
}

impl Error {
    /// Returns the MQI error if this is a queue manager failure.
    pub fn as_mqi(&self) -> Option<&MqiError> {
        match self {
            Self::Mqi { source } => Some(source),
            _ => None,
        }
    }

    /// Returns `true` if this is an MQI error with the given reason code.
    pub fn is_reason(&self, reason: i32) -> bool {
        self.as_mqi().is_some_and(|e| e.is_reason(reason))
    }
}

impl From<MqiError> for Error {
    fn from(source: MqiError) -> Self {
        Self::Mqi { source }
    }
}

/// Codec result.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::cmqc::*;

    #[test]
    fn mqi_error_display() {
        let failed = MqiError::new(MQCC_FAILED, MQRC_NO_MSG_AVAILABLE);
        assert_eq!(
            failed.to_string(),
            "MQI Error. Comp: 2, Reason 2033: FAILED: MQRC_NO_MSG_AVAILABLE"
        );

        let warning = MqiError::new(MQCC_WARNING, MQRC_TRUNCATED_MSG_ACCEPTED);
        assert_eq!(
            warning.to_string(),
            "MQI Error. Comp: 1, Reason 2079: WARNING: MQRC_TRUNCATED_MSG_ACCEPTED"
        );

        let ok = MqiError::new(MQCC_OK, MQRC_NONE);
        assert_eq!(ok.to_string(), "MQI Error. Comp: 0, Reason 0: OK");

        let unknown = MqiError::new(MQCC_FAILED, 9999);
        assert_eq!(
            unknown.to_string(),
            "MQI Error. Comp: 2, Reason 9999: Error code 9999 not defined"
        );
    }

    #[test]
    fn error_reason_matching() {
        let error = Error::from(MqiError::new(MQCC_FAILED, MQRC_UNKNOWN_OBJECT_NAME));
        assert!(error.is_reason(MQRC_UNKNOWN_OBJECT_NAME));
        assert!(!error.is_reason(MQRC_NO_MSG_AVAILABLE));

        let error = Error::Interface {
            reason: "bad".to_string(),
        };
        assert!(error.as_mqi().is_none());
    }
}
