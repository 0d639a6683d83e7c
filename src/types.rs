//! Core data model types.
//!
//! A feed's schema declares one [`FieldType`] per field. Coercion produces typed [`Value`]s, one
//! [`Row`] per feed record, collected into a [`DataSet`] whose rows are aligned with its column
//! names.

use std::fmt;

/// Prefix the feed puts in front of every declared type label (`esriFieldTypeInteger`, ...).
pub const FIELD_TYPE_PREFIX: &str = "esriFieldType";

/// Declared kind of a feed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Whole number.
    Integer,
    /// Epoch milliseconds, kept as an integer.
    Date,
    /// Service-assigned object id.
    ObjectId,
    /// Free text; may hold booleans, numbers or categorical values.
    Text,
}

impl FieldType {
    /// Parse a label with the vendor prefix already stripped (`Integer`, `Date`, `OID`, `String`).
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Integer" => Some(Self::Integer),
            "Date" => Some(Self::Date),
            "OID" => Some(Self::ObjectId),
            "String" => Some(Self::Text),
            _ => None,
        }
    }

    /// Parse a full declared type such as `esriFieldTypeString`.
    pub fn from_declared(declared: &str) -> Option<Self> {
        declared
            .strip_prefix(FIELD_TYPE_PREFIX)
            .and_then(Self::from_label)
    }

    /// The feed's label for this kind, without the vendor prefix.
    pub fn label(self) -> &'static str {
        match self {
            Self::Integer => "Integer",
            Self::Date => "Date",
            Self::ObjectId => "OID",
            Self::Text => "String",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single typed value in a [`DataSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value.
    Null,
    /// 64-bit signed integer (also categorical codes).
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// One coerced feed record, values in schema order.
pub type Row = Vec<Value>;

/// In-memory tabular dataset.
///
/// Rows are stored row-major; every row is positionally aligned with [`DataSet::columns`].
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Column names in schema order.
    pub columns: Vec<String>,
    /// Row-major value storage.
    pub rows: Vec<Row>,
}

impl DataSet {
    /// Create a dataset from column names and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the dataset.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns the index of a column by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate one column's values top to bottom. Returns `None` for an unknown column.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value>> {
        let idx = self.index_of(name)?;
        Some(self.rows.iter().map(move |row| row.get(idx).unwrap_or(&Value::Null)))
    }
}
