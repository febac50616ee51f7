//! Error types for the measurement and dispatch core.
//!
//! Defines [`ConfigError`] for preparation-time failures (descriptor and
//! scenario-file problems, detected before any RPC is issued) and the
//! crate-level [`Error`] covering remote failures surfaced while driving a
//! peer.

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors detected while parsing or validating test configuration.
///
/// These are all raised during `prepare`; none of them leaves an RPC in
/// flight.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A descriptor segment was not a single `key=value` pair.
    #[error("descriptor segment '{segment}' is not a key=value pair")]
    MalformedSegment { segment: String },

    /// A field the selected capability needs was absent or empty.
    #[error("{field} is required for {capability} load test")]
    MissingField {
        field: &'static str,
        capability: &'static str,
    },

    /// `numevents` did not parse as a positive integer.
    #[error("numevents must be a positive integer: found={value}")]
    InvalidNumEvents { value: String },

    /// The method is not valid for the selected capability.
    #[error("unsupported method of {capability} load test: method={method}")]
    UnsupportedMethod {
        capability: &'static str,
        method: String,
    },

    /// The `callback` extension carried an unrecognized wait mode.
    #[error("callback must be one of true, first, all: found={value}")]
    InvalidCallbackMode { value: String },

    /// The (capability, target, method) triple is outside the resolution
    /// matrix.
    #[error("unsupported load test: capability={capability}, target={target}, method={method}")]
    Unsupported {
        capability: String,
        target: String,
        method: String,
    },

    /// TLS material could not be loaded or was inconsistent.
    #[error("invalid TLS credentials: {message}")]
    Tls { message: String },

    /// Scenario file could not be read from disk.
    #[error("failed to read scenario file '{path}': {source}")]
    ScenarioIo {
        source: std::io::Error,
        path: String,
    },

    /// Scenario file contained invalid TOML.
    #[error("failed to parse scenario TOML: {source}")]
    ScenarioParse {
        #[from]
        source: toml::de::Error,
    },

    /// Scenario file parsed but carried invalid values.
    #[error("scenario validation error: {message}")]
    ScenarioValidation { message: String },
}

/// Errors surfaced while driving a remote peer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Preparation-time failure; no RPC was issued.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A remote call failed. Single-call paths propagate this verbatim;
    /// the best-effort publish-multi path reports only the last one
    /// encountered.
    #[error("rpc error: {0}")]
    Rpc(#[from] tonic::Status),

    /// The underlying transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// Writing a histogram summary failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The confirmation stream broke before delivery was confirmed. The
    /// stream is a harness invariant, so this is fatal to the test run,
    /// but it is reported to the caller rather than aborting the process.
    #[error("confirmation stream failed: {0}")]
    Confirmation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_names_field_and_capability() {
        let err = ConfigError::MissingField {
            field: "topic",
            capability: "pubsub",
        };
        assert_eq!(err.to_string(), "topic is required for pubsub load test");
    }

    #[test]
    fn test_invalid_numevents_names_value() {
        let err = ConfigError::InvalidNumEvents {
            value: "lots".to_string(),
        };
        assert!(err.to_string().contains("found=lots"));
    }

    #[test]
    fn test_unsupported_names_triple() {
        let err = ConfigError::Unsupported {
            capability: "state".to_string(),
            target: "appcallback".to_string(),
            method: "get".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("capability=state"));
        assert!(msg.contains("target=appcallback"));
        assert!(msg.contains("method=get"));
    }

    #[test]
    fn test_config_error_converts_to_error() {
        let err: Error = ConfigError::MissingField {
            field: "key",
            capability: "state",
        }
        .into();
        assert!(matches!(err, Error::Config(_)));
    }
}
