//! `ksi-feed` retrieves KSI ("Killed or Seriously Injured") traffic-collision records from an
//! ArcGIS feature layer and turns them into a typed, in-memory [`types::DataSet`].
//!
//! The feed describes its own schema: every response carries a `fields` block naming each
//! field's declared type. [`mapping::ColumnMapper`] reads that block once and then coerces every
//! raw value:
//!
//! - `Integer`, `Date` and `OID` fields become [`types::Value::Int64`]
//! - `String` fields become booleans (`"Yes"`/`"No"`), integers (digit strings), floats
//!   (`digits.digits`), or a categorical integer code assigned in order of first appearance
//! - `null` stays [`types::Value::Null`]
//!
//! ## Quick example: fetch and print
//!
//! ```no_run
//! use ksi_feed::feed::{FeedClient, FeedOptions, FeedQuery};
//! use ksi_feed::frame::to_data_frame;
//!
//! # fn main() -> Result<(), ksi_feed::FeedError> {
//! let client = FeedClient::new(FeedOptions {
//!     query: FeedQuery::with_range(1, 1_000),
//!     ..Default::default()
//! })?;
//! let data = client.fetch()?;
//! println!("rows={}", data.dataset.row_count());
//! println!("{}", to_data_frame(&data.dataset)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Assembling a body obtained elsewhere
//!
//! ```rust
//! use ksi_feed::feed::{assemble, parse_envelope};
//! use ksi_feed::types::Value;
//!
//! let body = r#"{
//!     "fields": [
//!         {"name": "ACCLASS", "type": "esriFieldTypeString"},
//!         {"name": "INDEX_", "type": "esriFieldTypeInteger"}
//!     ],
//!     "features": [
//!         {"attributes": {"ACCLASS": "Fatal", "INDEX_": "1"}},
//!         {"attributes": {"ACCLASS": "Non-Fatal Injury", "INDEX_": "2"}},
//!         {"attributes": {"ACCLASS": "Fatal", "INDEX_": "3"}}
//!     ]
//! }"#;
//!
//! let data = assemble(&parse_envelope(body).unwrap()).unwrap();
//! assert_eq!(data.dataset.columns, vec!["ACCLASS", "INDEX_"]);
//! assert_eq!(data.dataset.rows[2], vec![Value::Int64(1), Value::Int64(3)]);
//! ```
//!
//! ## Modules
//!
//! - [`mapping`]: schema parsing and per-field coercion (the categorical encoder lives here)
//! - [`feed`]: query construction, the blocking client, envelope decoding, observers
//! - [`types`]: field kinds, values and the in-memory dataset
//! - [`frame`]: conversion into a Polars `DataFrame`
//! - [`error`]: error type shared across the crate

pub mod error;
pub mod feed;
pub mod frame;
pub mod mapping;
pub mod types;

pub use error::{FeedError, FeedResult};
