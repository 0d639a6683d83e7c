//! Conversion of a [`DataSet`] into a Polars [`DataFrame`].
//!
//! Each column gets a dtype that holds all of its non-null values without merging distinct
//! ones: all booleans become `Boolean`, all integers `Int64`, integers mixed with floats
//! `Float64`. A column mixing booleans with numbers (a text field holding `"Yes"`/`"No"` next to
//! categorical codes) becomes `String`, one `Value` display per cell. A column with only nulls
//! becomes an all-null `Int64` column.

use polars::prelude::{Column, DataFrame, NamedFrom, Series};

use crate::error::{FeedError, FeedResult};
use crate::types::{DataSet, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnDtype {
    Bool,
    Int,
    Float,
    Mixed,
}

impl ColumnDtype {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(Self::Bool),
            Value::Int64(_) => Some(Self::Int),
            Value::Float64(_) => Some(Self::Float),
        }
    }

    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (a, b) if a == b => a,
            (Self::Int, Self::Float) | (Self::Float, Self::Int) => Self::Float,
            _ => Self::Mixed,
        }
    }
}

/// Build a [`DataFrame`] with one column per dataset column, in order.
pub fn to_data_frame(dataset: &DataSet) -> FeedResult<DataFrame> {
    let width = dataset.column_count();
    if let Some((idx0, row)) = dataset.rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(FeedError::SchemaMismatch {
            message: format!(
                "row {} has {} values but the dataset has {width} columns",
                idx0 + 1,
                row.len()
            ),
        });
    }

    let mut df = DataFrame::empty();
    for (idx, name) in dataset.columns.iter().enumerate() {
        let values: Vec<&Value> = dataset.rows.iter().map(|row| &row[idx]).collect();
        df.with_column(Column::from(column_series(name, &values)))?;
    }
    Ok(df)
}

fn column_series(name: &str, values: &[&Value]) -> Series {
    let dtype = values
        .iter()
        .filter_map(|v| ColumnDtype::of(v))
        .reduce(ColumnDtype::merge)
        .unwrap_or(ColumnDtype::Int);

    match dtype {
        ColumnDtype::Bool => {
            let col: Vec<Option<bool>> = values
                .iter()
                .map(|v| match v {
                    Value::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), col)
        }
        ColumnDtype::Int => {
            let col: Vec<Option<i64>> = values
                .iter()
                .map(|v| match v {
                    Value::Int64(i) => Some(*i),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), col)
        }
        ColumnDtype::Float => {
            let col: Vec<Option<f64>> = values
                .iter()
                .map(|v| match v {
                    Value::Float64(f) => Some(*f),
                    Value::Int64(i) => Some(*i as f64),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), col)
        }
        ColumnDtype::Mixed => {
            let col: Vec<Option<String>> = values
                .iter()
                .map(|v| (!v.is_null()).then(|| v.to_string()))
                .collect();
            Series::new(name.into(), col)
        }
    }
}
