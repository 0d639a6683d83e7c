//! Per-field coercion: one declared [`FieldType`] plus that field's categorical encoding table.

use std::fmt;

use indexmap::IndexMap;

use crate::error::{FeedError, FeedResult};
use crate::types::{FieldType, Value};

const AFFIRMATIVE: &str = "Yes";
const NEGATIVE: &str = "No";

/// A single schema field and the state needed to coerce its raw values.
///
/// Text fields encode free-text values as integer codes. Codes start at 1 and are assigned in
/// order of first appearance; once assigned, a code never changes for the life of the column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnType {
    name: String,
    kind: FieldType,
    encoding: IndexMap<String, i64>,
}

impl ColumnType {
    /// Create a column with an empty encoding table.
    pub fn new(name: impl Into<String>, kind: FieldType) -> Self {
        Self {
            name: name.into(),
            kind,
            encoding: IndexMap::new(),
        }
    }

    /// Field name this column coerces values for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared kind, fixed at schema build.
    pub fn kind(&self) -> FieldType {
        self.kind
    }

    /// Code already assigned to `text`, if it has been seen.
    pub fn code_for(&self, text: &str) -> Option<i64> {
        self.encoding.get(text).copied()
    }

    /// Categorical values in code order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, i64)> {
        self.encoding.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of distinct categorical values encoded so far.
    pub fn category_count(&self) -> usize {
        self.encoding.len()
    }

    /// Coerce one raw feed value into a typed [`Value`].
    ///
    /// - `null` stays [`Value::Null`] for every kind.
    /// - Integer, Date and ObjectId parse as `i64`; anything non-numeric is
    ///   [`FeedError::MalformedValue`].
    /// - Text maps `"Yes"`/`"No"` to booleans, digit strings to integers, `digits.digits` to
    ///   floats, and everything else to a categorical code.
    pub fn coerce(&mut self, raw: &serde_json::Value) -> FeedResult<Value> {
        if raw.is_null() {
            return Ok(Value::Null);
        }

        match self.kind {
            FieldType::Integer | FieldType::Date | FieldType::ObjectId => self.coerce_integer(raw),
            FieldType::Text => match raw {
                serde_json::Value::String(text) => Ok(self.coerce_text(text)),
                serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
                serde_json::Value::Number(n) => Ok(match n.as_i64() {
                    Some(i) => Value::Int64(i),
                    None => n.as_f64().map(Value::Float64).unwrap_or(Value::Null),
                }),
                other => Err(self.malformed(other, "expected text or number")),
            },
        }
    }

    /// Check that `raw` would coerce without error, leaving the encoding table untouched.
    ///
    /// Text values that would be encoded are accepted; only their code assignment is deferred to
    /// [`Self::coerce`].
    pub fn validate(&self, raw: &serde_json::Value) -> FeedResult<()> {
        if raw.is_null() {
            return Ok(());
        }
        match self.kind {
            FieldType::Integer | FieldType::Date | FieldType::ObjectId => {
                self.coerce_integer(raw).map(|_| ())
            }
            FieldType::Text => match raw {
                serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                    Err(self.malformed(raw, "expected text or number"))
                }
                _ => Ok(()),
            },
        }
    }

    fn coerce_integer(&self, raw: &serde_json::Value) -> FeedResult<Value> {
        match raw {
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Ok(Value::Int64(i));
                }
                match n.as_f64() {
                    // Truncate toward zero, as integer conversion of a number does.
                    Some(f) if f.is_finite() && f.abs() < i64::MAX as f64 => {
                        Ok(Value::Int64(f.trunc() as i64))
                    }
                    _ => Err(self.malformed(raw, "number out of range for i64")),
                }
            }
            serde_json::Value::String(text) => text
                .trim()
                .parse::<i64>()
                .map(Value::Int64)
                .map_err(|e| self.malformed(raw, &format!("expected integer: {e}"))),
            other => Err(self.malformed(other, "expected integer")),
        }
    }

    fn coerce_text(&mut self, text: &str) -> Value {
        if text == AFFIRMATIVE {
            return Value::Bool(true);
        }
        if text == NEGATIVE {
            return Value::Bool(false);
        }

        if is_digits(text) {
            return match text.parse::<i64>() {
                Ok(i) => Value::Int64(i),
                // Digit-only text always parses as f64.
                Err(_) => text.parse::<f64>().map(Value::Float64).unwrap_or(Value::Null),
            };
        }

        if is_decimal(text) {
            if let Ok(f) = text.parse::<f64>() {
                return Value::Float64(f);
            }
        }

        Value::Int64(self.encode(text))
    }

    fn encode(&mut self, text: &str) -> i64 {
        if let Some(code) = self.encoding.get(text) {
            return *code;
        }
        let code = self.encoding.len() as i64 + 1;
        self.encoding.insert(text.to_owned(), code);
        code
    }

    fn malformed(&self, raw: &serde_json::Value, message: &str) -> FeedError {
        let raw = match raw {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        FeedError::MalformedValue {
            column: self.name.clone(),
            raw,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ColumnType {}: {}", self.name, self.kind)?;
        for (text, code) in self.categories() {
            writeln!(f, "\t{code}: {text}")?;
        }
        Ok(())
    }
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn is_decimal(text: &str) -> bool {
    match text.split_once('.') {
        Some((whole, frac)) => is_digits(whole) && is_digits(frac),
        None => false,
    }
}
