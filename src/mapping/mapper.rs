//! Schema parsing and per-field routing.

use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{FeedError, FeedResult};
use crate::types::{FIELD_TYPE_PREFIX, FieldType, Row, Value};

use super::column::ColumnType;

static NULL: serde_json::Value = serde_json::Value::Null;

/// One entry of the feed's `fields` block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldDescriptor {
    /// Field name as it appears in record attributes.
    pub name: String,
    /// Vendor-prefixed type label, e.g. `esriFieldTypeString`.
    #[serde(rename = "type")]
    pub declared_type: String,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
        }
    }
}

/// Registry of [`ColumnType`]s keyed by field name, in schema order.
///
/// The set of columns is fixed at construction; only each column's encoding table grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapper {
    columns: IndexMap<String, ColumnType>,
}

impl ColumnMapper {
    /// Build a mapper from the schema's field descriptors.
    ///
    /// Fails with [`FeedError::UnknownFieldType`] for labels outside Integer/Date/OID/String
    /// (or without the `esriFieldType` prefix), and with [`FeedError::SchemaMismatch`] for
    /// duplicate field names.
    pub fn build_from_schema(fields: &[FieldDescriptor]) -> FeedResult<Self> {
        let mut columns = IndexMap::with_capacity(fields.len());
        for field in fields {
            let kind = FieldType::from_declared(&field.declared_type).ok_or_else(|| {
                FeedError::UnknownFieldType {
                    column: field.name.clone(),
                    label: field
                        .declared_type
                        .strip_prefix(FIELD_TYPE_PREFIX)
                        .unwrap_or(field.declared_type.as_str())
                        .to_string(),
                }
            })?;
            if columns.contains_key(&field.name) {
                return Err(FeedError::SchemaMismatch {
                    message: format!("duplicate field '{}'", field.name),
                });
            }
            columns.insert(field.name.clone(), ColumnType::new(field.name.clone(), kind));
        }
        Ok(Self { columns })
    }

    /// Coerce a single raw value for `name`.
    pub fn coerce_field(&mut self, name: &str, raw: &serde_json::Value) -> FeedResult<Value> {
        let column = self
            .columns
            .get_mut(name)
            .ok_or_else(|| FeedError::UnknownField {
                name: name.to_string(),
            })?;
        column.coerce(raw)
    }

    /// Coerce one record's attributes into a [`Row`] in schema order.
    ///
    /// Every attribute must name a schema field. Schema fields missing from the record are null.
    /// The record is validated as a whole first, so a rejected record assigns no codes.
    pub fn coerce_record(
        &mut self,
        attributes: &serde_json::Map<String, serde_json::Value>,
    ) -> FeedResult<Row> {
        if let Some(unknown) = attributes.keys().find(|k| !self.columns.contains_key(*k)) {
            return Err(FeedError::UnknownField {
                name: unknown.clone(),
            });
        }
        for (name, column) in &self.columns {
            column.validate(attributes.get(name).unwrap_or(&NULL))?;
        }

        let mut row = Vec::with_capacity(self.columns.len());
        for (name, column) in self.columns.iter_mut() {
            let raw = attributes.get(name).unwrap_or(&NULL);
            row.push(column.coerce(raw)?);
        }
        Ok(row)
    }

    /// Field names in schema order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.keys().cloned().collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnType> {
        self.columns.get(name)
    }

    pub fn columns(&self) -> impl Iterator<Item = &ColumnType> {
        self.columns.values()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl fmt::Display for ColumnMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ColumnMapper ({} columns)", self.columns.len())?;
        for column in self.columns.values() {
            write!(f, "{column}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ColumnMapper, FieldDescriptor};
    use crate::error::FeedError;
    use crate::types::{FieldType, Value};

    fn ksi_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("INJURY", "esriFieldTypeString"),
            FieldDescriptor::new("INDEX_", "esriFieldTypeInteger"),
        ]
    }

    #[test]
    fn build_preserves_schema_order_and_kinds() {
        let mapper = ColumnMapper::build_from_schema(&ksi_fields()).unwrap();
        assert_eq!(mapper.column_names(), vec!["INJURY", "INDEX_"]);
        assert_eq!(mapper.column("INJURY").unwrap().kind(), FieldType::Text);
        assert_eq!(mapper.column("INDEX_").unwrap().kind(), FieldType::Integer);
        assert_eq!(mapper.len(), 2);
    }

    #[test]
    fn descriptors_deserialize_from_feed_json() {
        let fields: Vec<FieldDescriptor> = serde_json::from_value(json!([
            {"name": "OBJECTID", "type": "esriFieldTypeOID", "alias": "OBJECTID"},
            {"name": "DATE", "type": "esriFieldTypeDate", "alias": "DATE", "length": 8}
        ]))
        .unwrap();
        let mapper = ColumnMapper::build_from_schema(&fields).unwrap();
        assert_eq!(mapper.column("OBJECTID").unwrap().kind(), FieldType::ObjectId);
        assert_eq!(mapper.column("DATE").unwrap().kind(), FieldType::Date);
    }

    #[test]
    fn unknown_type_label_fails_at_build() {
        let fields = vec![FieldDescriptor::new("LATITUDE", "esriFieldTypeDouble")];
        match ColumnMapper::build_from_schema(&fields).unwrap_err() {
            FeedError::UnknownFieldType { column, label } => {
                assert_eq!(column, "LATITUDE");
                assert_eq!(label, "Double");
            }
            other => panic!("unexpected error: {other}"),
        }

        let unprefixed = vec![FieldDescriptor::new("X", "String")];
        assert!(matches!(
            ColumnMapper::build_from_schema(&unprefixed),
            Err(FeedError::UnknownFieldType { .. })
        ));
    }

    #[test]
    fn duplicate_field_names_are_rejected() {
        let fields = vec![
            FieldDescriptor::new("A", "esriFieldTypeString"),
            FieldDescriptor::new("A", "esriFieldTypeInteger"),
        ];
        assert!(matches!(
            ColumnMapper::build_from_schema(&fields),
            Err(FeedError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn coerce_field_routes_by_name() {
        let mut mapper = ColumnMapper::build_from_schema(&ksi_fields()).unwrap();
        assert_eq!(mapper.coerce_field("INDEX_", &json!("7")).unwrap(), Value::Int64(7));
        assert_eq!(mapper.coerce_field("INJURY", &json!("Major")).unwrap(), Value::Int64(1));
        assert_eq!(mapper.coerce_field("INJURY", &json!("Minor")).unwrap(), Value::Int64(2));
        assert_eq!(mapper.coerce_field("INJURY", &json!("Major")).unwrap(), Value::Int64(1));
    }

    #[test]
    fn coerce_field_rejects_unknown_name() {
        let mut mapper = ColumnMapper::build_from_schema(&ksi_fields()).unwrap();
        match mapper.coerce_field("NOT_A_FIELD", &json!("x")).unwrap_err() {
            FeedError::UnknownField { name } => assert_eq!(name, "NOT_A_FIELD"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn coerce_record_orders_by_schema_and_nulls_missing_fields() {
        let mut mapper = ColumnMapper::build_from_schema(&ksi_fields()).unwrap();
        let attrs = json!({"INDEX_": 5, "INJURY": "Fatal"});
        let row = mapper.coerce_record(attrs.as_object().unwrap()).unwrap();
        assert_eq!(row, vec![Value::Int64(1), Value::Int64(5)]);

        let partial = json!({"INDEX_": 6});
        let row = mapper.coerce_record(partial.as_object().unwrap()).unwrap();
        assert_eq!(row, vec![Value::Null, Value::Int64(6)]);
    }

    #[test]
    fn coerce_record_rejects_unknown_attribute() {
        let mut mapper = ColumnMapper::build_from_schema(&ksi_fields()).unwrap();
        let attrs = json!({"INDEX_": 5, "INJURY": "Fatal", "EXTRA": 1});
        assert!(matches!(
            mapper.coerce_record(attrs.as_object().unwrap()),
            Err(FeedError::UnknownField { name }) if name == "EXTRA"
        ));
        // Nothing was encoded for the rejected record.
        assert_eq!(mapper.column("INJURY").unwrap().category_count(), 0);
    }

    #[test]
    fn malformed_record_assigns_no_codes() {
        let fields = vec![
            FieldDescriptor::new("ACCLASS", "esriFieldTypeString"),
            FieldDescriptor::new("INDEX_", "esriFieldTypeInteger"),
        ];
        let mut mapper = ColumnMapper::build_from_schema(&fields).unwrap();

        let bad = json!({"ACCLASS": "Fatal", "INDEX_": "n/a"});
        assert!(matches!(
            mapper.coerce_record(bad.as_object().unwrap()),
            Err(FeedError::MalformedValue { column, .. }) if column == "INDEX_"
        ));
        assert_eq!(mapper.column("ACCLASS").unwrap().category_count(), 0);

        // The next accepted record still gets the first code.
        let good = json!({"ACCLASS": "Non-Fatal Injury", "INDEX_": "2"});
        let row = mapper.coerce_record(good.as_object().unwrap()).unwrap();
        assert_eq!(row, vec![Value::Int64(1), Value::Int64(2)]);
    }

    #[test]
    fn display_dumps_every_column() {
        let mut mapper = ColumnMapper::build_from_schema(&ksi_fields()).unwrap();
        mapper.coerce_field("INJURY", &json!("Major")).unwrap();
        let out = mapper.to_string();
        assert!(out.starts_with("ColumnMapper (2 columns)"));
        assert!(out.contains("ColumnType INJURY: String"));
        assert!(out.contains("ColumnType INDEX_: Integer"));
        assert!(out.contains("1: Major"));
    }
}
