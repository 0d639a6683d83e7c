use thiserror::Error;

/// Convenience result type for feed operations.
pub type FeedResult<T> = Result<T, FeedError>;

/// Error type returned by the coercion core, the feed client and frame assembly.
///
/// Core failures (`MalformedValue`, `UnknownField`, `UnknownFieldType`) are raised at the point
/// of detection and abort the dataset build.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A value declared Integer/Date/ObjectId could not be parsed as an integer.
    #[error("malformed value in column '{column}': {message} (raw='{raw}')")]
    MalformedValue {
        column: String,
        raw: String,
        message: String,
    },

    /// A record carried a field name with no schema entry.
    #[error("unknown field '{name}'")]
    UnknownField { name: String },

    /// A schema field declared a type label outside the recognized set.
    #[error("unknown field type '{label}' for column '{column}'")]
    UnknownFieldType { column: String, label: String },

    /// The envelope does not have the expected shape (duplicate names, missing blocks, etc.).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// Wraps a core failure with the 1-based record number it occurred in.
    #[error("record {record}: {source}")]
    Record {
        record: usize,
        #[source]
        source: Box<FeedError>,
    },

    /// The requested index range is empty.
    #[error("invalid index range: start {start} is greater than end {end}")]
    InvalidRange { start: i64, end: i64 },

    /// The feed base URL could not be parsed.
    #[error("invalid feed url: {0}")]
    Url(#[from] url::ParseError),

    /// Transport failure (connect, TLS, body read).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The feed answered with a non-success status.
    #[error("feed returned http status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// The response body is not valid JSON for the expected envelope.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The service answered 200 but with an error envelope.
    #[error("feed service error {code}: {message}")]
    Service { code: i64, message: String },

    /// DataFrame assembly failed.
    #[error("frame error: {0}")]
    Frame(#[from] polars::prelude::PolarsError),
}

impl FeedError {
    /// Attach a 1-based record number to a core failure.
    pub fn in_record(self, record: usize) -> Self {
        Self::Record {
            record,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, looking through [`FeedError::Record`] wrappers.
    pub fn root(&self) -> &FeedError {
        match self {
            Self::Record { source, .. } => source.root(),
            other => other,
        }
    }
}
