//! Error types for the Lava API client.

use std::time::Duration;
use thiserror::Error;

/// Errors returned by schema validation, request marshaling, and transport.
#[derive(Error, Debug)]
pub enum Error {
    /// A required field was absent from the raw input.
    #[error("{schema}: missing required field '{field}'")]
    MissingField {
        schema: &'static str,
        field: &'static str,
    },

    /// A field value could not be coerced to its declared type.
    #[error("field '{field}': cannot coerce {got} to {expected}")]
    TypeCoercion {
        field: String,
        expected: &'static str,
        got: String,
    },

    /// A choice-constrained field held a value outside the declared set.
    #[error("field '{field}': invalid value '{value}', expected one of {allowed:?}")]
    InvalidChoice {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    /// A dotted attribute path could not be resolved against an instance.
    #[error("attribute path '{path}': no attribute '{segment}'")]
    MissingAttribute { path: String, segment: String },

    /// The response body lacked the expected envelope key.
    #[error("unexpected response shape: missing '{0}' key")]
    MissingWrapper(&'static str),

    /// The API returned a non-success status code.
    #[error("API error {code}: {message}")]
    Api { code: u16, message: String },

    /// The underlying HTTP request failed before a response was produced.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The client was configured with an unusable base URL.
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),

    /// A wait loop hit its deadline before the resource reached a
    /// terminal status.
    #[error("timed out after {0:?} waiting for a terminal status")]
    WaitTimeout(Duration),
}

/// Result type alias for Lava API operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns true if this is a "not found" error (404).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api { code: 404, .. })
    }

    /// Returns true if this is a server-side error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { code, .. } if *code >= 500)
    }

    /// Returns true if this error came out of schema validation or
    /// request marshaling rather than the transport.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MissingField { .. } | Error::TypeCoercion { .. } | Error::InvalidChoice { .. }
        )
    }

    /// Returns true if a wait loop gave up on its deadline.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::WaitTimeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_404_is_not_found() {
        let err = Error::Api {
            code: 404,
            message: "no such cluster".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_server_error());
    }

    #[test]
    fn api_5xx_is_server_error() {
        let err = Error::Api {
            code: 503,
            message: "maintenance".to_string(),
        };
        assert!(err.is_server_error());
        assert!(!err.is_not_found());
    }

    #[test]
    fn validation_predicates() {
        let err = Error::MissingField {
            schema: "Cluster",
            field: "id",
        };
        assert!(err.is_validation());
        assert!(!err.is_timeout());

        let err = Error::WaitTimeout(Duration::from_secs(60));
        assert!(err.is_timeout());
        assert!(!err.is_validation());
    }

    #[test]
    fn display_names_the_field() {
        let err = Error::MissingField {
            schema: "Cluster",
            field: "stack_id",
        };
        assert_eq!(err.to_string(), "Cluster: missing required field 'stack_id'");
    }
}
