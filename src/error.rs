//! Error taxonomy for the arrivals pipeline.

use reqwest::StatusCode;

/// Errors produced while configuring or running the pipeline.
///
/// `Network`, `Status` and `Io` are transient: the failing cycle is dropped
/// and the next one fetches again. `Decode` rejects one payload. `Config` is
/// raised at construction time and prevents the scheduler from starting.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("feed request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("feed endpoint {url} returned status {status}")]
    Status { status: StatusCode, url: String },
    #[error("failed to read feed source: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode feed: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Short class name used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Network(_) | Error::Status { .. } | Error::Io(_) => "network",
            Error::Decode(_) => "decode",
            Error::Config(_) => "config",
        }
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_groups_transport_failures() {
        let status = Error::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            url: "http://localhost/feed".to_string(),
        };
        assert_eq!(status.kind(), "network");

        let io = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.kind(), "network");

        assert_eq!(Error::config("bad").kind(), "config");
    }

    #[test]
    fn test_status_message_names_endpoint() {
        let err = Error::Status {
            status: StatusCode::FORBIDDEN,
            url: "http://localhost/feed".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("http://localhost/feed"));
    }
}
