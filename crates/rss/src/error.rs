// ABOUTME: Error types for feed decoding, generation, and fetching.
// ABOUTME: Provides the Error enum plus the standalone DateFormatError.

use thiserror::Error;

/// Errors produced while decoding, generating, or fetching a feed.
#[derive(Debug, Error)]
pub enum Error {
    /// The input is not well-formed XML.
    #[error("failed to parse feed: {0}")]
    Xml(String),

    /// The document's root element is not `rss`.
    #[error("unexpected root element <{0}>, expected <rss>")]
    UnexpectedRoot(String),

    /// The `version` attribute is outside the accepted set.
    #[error("invalid RSS version: {0}")]
    InvalidVersion(String),

    /// The document parsed but has no `channel`.
    #[error("the document doesn't conform to RSS specification")]
    NotRss,

    /// A field's text or attribute failed type coercion.
    #[error("invalid value of {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    /// A date field matched none of the accepted formats.
    #[error("failed to parse {field}")]
    Date {
        field: &'static str,
        #[source]
        source: DateFormatError,
    },

    /// The serializer failed while writing the document.
    #[error("failed to generate feed: {0}")]
    Encode(String),

    /// The URL handed to the client could not be parsed.
    #[error("invalid feed URL: {0}")]
    InvalidUrl(String),

    /// The server answered with a non-success status.
    #[error("the feed server responded with {0}")]
    Status(reqwest::StatusCode),

    /// The response declared a media type that is not a feed.
    #[error("the feed has an invalid Content-Type ({0})")]
    ContentType(String),

    /// The HTTP transport failed before a response arrived.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// True when retrying the request later could succeed (5xx statuses).
    pub fn is_temporary(&self) -> bool {
        matches!(self, Error::Status(status) if status.is_server_error())
    }

    pub(crate) fn xml(err: impl std::fmt::Display) -> Self {
        Error::Xml(err.to_string())
    }

    pub(crate) fn encode(err: impl std::fmt::Display) -> Self {
        Error::Encode(err.to_string())
    }
}

/// A timestamp string that matched none of the accepted date formats.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized date format: {0}")]
pub struct DateFormatError(pub String);
