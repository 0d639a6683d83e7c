//! Schema-driven value coercion.
//!
//! [`ColumnMapper::build_from_schema`] reads a feed's field metadata once. Afterwards every raw
//! value is routed through [`ColumnMapper::coerce_field`] (or a whole record through
//! [`ColumnMapper::coerce_record`]) to the owning [`ColumnType`].
//!
//! ## Example
//!
//! ```rust
//! use ksi_feed::mapping::{ColumnMapper, FieldDescriptor};
//! use ksi_feed::types::Value;
//! use serde_json::json;
//!
//! let mut mapper = ColumnMapper::build_from_schema(&[
//!     FieldDescriptor::new("ACCLASS", "esriFieldTypeString"),
//!     FieldDescriptor::new("INDEX_", "esriFieldTypeInteger"),
//! ])
//! .unwrap();
//!
//! assert_eq!(mapper.coerce_field("ACCLASS", &json!("Fatal")).unwrap(), Value::Int64(1));
//! assert_eq!(mapper.coerce_field("ACCLASS", &json!("Non-Fatal Injury")).unwrap(), Value::Int64(2));
//! assert_eq!(mapper.coerce_field("ACCLASS", &json!("Fatal")).unwrap(), Value::Int64(1));
//! assert_eq!(mapper.coerce_field("INDEX_", &json!("3")).unwrap(), Value::Int64(3));
//! assert_eq!(mapper.column_names(), vec!["ACCLASS", "INDEX_"]);
//! ```

pub mod column;
pub mod mapper;

pub use column::ColumnType;
pub use mapper::{ColumnMapper, FieldDescriptor};
