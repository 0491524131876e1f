//! Error types for the calendar pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while fetching or transforming a calendar
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure talking to the upstream site
    #[error("Upstream request failed: {0}")]
    UpstreamError(String),

    /// Upstream answered with a non-success status
    #[error("Upstream responded with status {0}")]
    UpstreamStatus(u16),

    /// The fetched document has no calendar graphic
    #[error("Calendar graphic not found in upstream document")]
    GraphicNotFound,

    /// An element the pipeline relies on is absent
    #[error("Expected element missing: {0}")]
    MissingElement(String),

    /// A day cell carries no usable activity level
    #[error("Invalid activity level: {0}")]
    InvalidLevel(String),

    /// A selector failed to compile
    #[error("Invalid selector: {0}")]
    SelectorError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl Error {
    /// True when the upstream could not be reached or refused the request.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::UpstreamError(_) | Error::UpstreamStatus(_))
    }

    /// True when the upstream answered but its markup broke our assumptions.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::GraphicNotFound | Error::MissingElement(_) | Error::InvalidLevel(_)
        )
    }
}
