//! Response envelope of the feed's `query` endpoint and its assembly into a [`DataSet`].
//!
//! The envelope carries the schema (`fields`) next to the records (`features`). The schema is
//! read once into a [`ColumnMapper`]; every record's `attributes` then go through it.

use serde::Deserialize;

use crate::error::{FeedError, FeedResult};
use crate::mapping::{ColumnMapper, FieldDescriptor};
use crate::types::DataSet;

/// Decoded `query` response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEnvelope {
    /// Schema descriptor. `None` when the service answered without one.
    #[serde(default)]
    pub fields: Option<Vec<FieldDescriptor>>,
    /// Records.
    #[serde(default)]
    pub features: Vec<Feature>,
    /// Set by the service when the range held more records than one response returns.
    #[serde(default)]
    pub exceeded_transfer_limit: bool,
    /// Present when the service rejected the query (still HTTP 200).
    #[serde(default)]
    pub error: Option<ServiceError>,
}

/// One record. Geometry and other keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// Error block of a rejected query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceError {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Vec<String>,
}

impl From<ServiceError> for FeedError {
    fn from(e: ServiceError) -> Self {
        let message = if e.details.is_empty() {
            e.message
        } else {
            format!("{} ({})", e.message, e.details.join("; "))
        };
        FeedError::Service {
            code: e.code,
            message,
        }
    }
}

/// Result of assembling one envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedData {
    /// Mapper holding the schema and every categorical encoding observed.
    pub mapper: ColumnMapper,
    /// Coerced rows, aligned with `mapper.column_names()`.
    pub dataset: DataSet,
    /// The service truncated the result.
    pub exceeded_transfer_limit: bool,
}

/// Parse a response body into an envelope, surfacing service error envelopes as errors.
pub fn parse_envelope(body: &str) -> FeedResult<FeedEnvelope> {
    let mut envelope: FeedEnvelope = serde_json::from_str(body)?;
    if let Some(err) = envelope.error.take() {
        return Err(err.into());
    }
    Ok(envelope)
}

/// Build the mapper from the envelope's schema and coerce every record.
///
/// Fails on the first record that cannot be coerced; the error names the 1-based record number.
pub fn assemble(envelope: &FeedEnvelope) -> FeedResult<FeedData> {
    let fields = envelope
        .fields
        .as_deref()
        .ok_or_else(|| FeedError::SchemaMismatch {
            message: "response has no 'fields' block".to_string(),
        })?;

    let mut mapper = ColumnMapper::build_from_schema(fields)?;
    let mut rows = Vec::with_capacity(envelope.features.len());
    for (idx0, feature) in envelope.features.iter().enumerate() {
        let row = mapper
            .coerce_record(&feature.attributes)
            .map_err(|e| e.in_record(idx0 + 1))?;
        rows.push(row);
    }

    let dataset = DataSet::new(mapper.column_names(), rows);
    Ok(FeedData {
        mapper,
        dataset,
        exceeded_transfer_limit: envelope.exceeded_transfer_limit,
    })
}
