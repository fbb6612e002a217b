//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! value casts and parsing, flattened buffer layout violations, and failures reported by the
//! native engine boundary. Orchestration misuse (adding attributes before a shape was opened)
//! is not represented here: it panics.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// A host value could not be converted to the attribute's declared type.
    #[error("could not cast attribute '{attribute}' to {target}")]
    Cast {
        attribute: String,
        target: &'static str,
    },

    #[error("attribute '{attribute}' has no supported value type")]
    UnsupportedType { attribute: String },

    /// Malformed encoded array, number, boolean or hex color text.
    #[error("could not parse {kind} from '{input}'")]
    Parse { kind: &'static str, input: String },

    #[error("invalid buffer layout: {0}")]
    InvalidBuffer(String),

    #[error("duplicate attribute key '{key}'")]
    DuplicateKey { key: String },

    /// The engine reported failure; callers should treat this as "no result".
    #[error("native call '{0}' failed")]
    NativeCall(&'static str),

    #[error("rule package error: {0}")]
    Package(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn parse(kind: &'static str, input: impl Into<String>) -> Self {
        Error::Parse {
            kind,
            input: input.into(),
        }
    }

    pub(crate) fn cast(attribute: impl Into<String>, target: &'static str) -> Self {
        Error::Cast {
            attribute: attribute.into(),
            target,
        }
    }

    /// Returns `true` if the error comes from a failed engine call rather than from bad input.
    pub fn is_native_failure(&self) -> bool {
        matches!(self, Error::NativeCall(_))
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cast_message_names_attribute() {
        let err = Error::cast("/ce/rule/height", "double");
        assert_eq!(
            err.to_string(),
            "could not cast attribute '/ce/rule/height' to double"
        );
    }

    #[test]
    fn native_failure_is_distinguished() {
        assert!(Error::NativeCall("generate").is_native_failure());
        assert!(!Error::parse("bool", "maybe").is_native_failure());
    }

    #[test]
    fn from_str_allocates_owned_message() {
        let err: Error = "issue".into();
        assert!(matches!(err, Error::Other(ref msg) if msg == "issue"));
    }
}
