//! Decoded query results.
//!
//! Column values read from the engine are normalised into [`DecodedValue`]s,
//! collected into [`Row`]s and returned inside an immutable
//! [`QueryOutcome`].

use serde::Serialize;

use crate::error::SqlKitError;

/// One column value after it has been read from the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum DecodedValue {
    /// `INTEGER` storage class, read as 64-bit.
    Integer(i64),
    /// `FLOAT` storage class, read as a double.
    Float(f64),
    /// `TEXT` storage class, decoded as UTF-8.
    Text(String),
    /// NULL, BLOB or anything else. Never stored in a [`Row`].
    Unsupported,
}

impl DecodedValue {
    /// Returns `false` for [`DecodedValue::Unsupported`].
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    /// Returns the integer payload, if any.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the float payload, if any.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Renders the value as text: integers in decimal, floats with six
    /// decimals, text verbatim.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Integer(v) => v.to_string(),
            Self::Float(v) => format!("{v:.6}"),
            Self::Text(v) => v.clone(),
            Self::Unsupported => String::new(),
        }
    }
}

/// A named column value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// Column name as reported by the engine.
    pub name: String,
    /// Decoded value.
    pub value: DecodedValue,
}

/// One result row, in the engine's column order.
///
/// Column names may repeat; [`Row::get`] returns the first match.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    fields: Vec<Field>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Appends a column. Unsupported values are dropped.
    pub fn push(&mut self, name: impl Into<String>, value: DecodedValue) {
        if value.is_supported() {
            self.fields.push(Field {
                name: name.into(),
                value,
            });
        }
    }

    /// Returns the first value whose column name is `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DecodedValue> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    /// Returns the stored columns in order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of stored columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when no column was stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns `(name, text)` pairs, see [`DecodedValue::to_display_string`].
    #[must_use]
    pub fn to_string_pairs(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|field| (field.name.clone(), field.value.to_display_string()))
            .collect()
    }
}

impl FromIterator<(String, DecodedValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, DecodedValue)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (name, value) in iter {
            row.push(name, value);
        }
        row
    }
}

/// Result of one executed statement.
///
/// Built fresh for each call and immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    success: bool,
    error_message: Option<String>,
    rows: Vec<Row>,
    last_inserted_id: i64,
}

impl QueryOutcome {
    pub(crate) const fn completed(rows: Vec<Row>, last_inserted_id: i64) -> Self {
        Self {
            success: true,
            error_message: None,
            rows,
            last_inserted_id,
        }
    }

    pub(crate) fn failed(error: &SqlKitError) -> Self {
        Self {
            success: false,
            error_message: Some(error.to_string()),
            rows: Vec::new(),
            last_inserted_id: 0,
        }
    }

    /// Whether the statement ran to completion.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.success
    }

    /// Human-readable reason when [`success`](Self::success) is `false`.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Decoded rows, in the order the engine produced them.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// First row, if any.
    #[must_use]
    pub fn first_row(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// The connection's last inserted rowid, read right after stepping.
    ///
    /// Only meaningful when the statement performed an insert.
    #[must_use]
    pub const fn last_inserted_id(&self) -> i64 {
        self.last_inserted_id
    }

    /// Consumes the outcome, returning its rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_values_are_never_stored() {
        let mut row = Row::new();
        row.push("a", DecodedValue::Integer(1));
        row.push("b", DecodedValue::Unsupported);
        row.push("c", DecodedValue::Text("x".to_string()));
        assert_eq!(row.len(), 2);
        assert!(row.fields().iter().all(|f| f.value.is_supported()));
        assert!(row.get("b").is_none());
    }

    #[test]
    fn test_lookup_is_first_match_by_name() {
        let row: Row = [
            ("id".to_string(), DecodedValue::Integer(1)),
            ("id".to_string(), DecodedValue::Integer(2)),
        ]
        .into_iter()
        .collect();
        assert_eq!(row.get("id"), Some(&DecodedValue::Integer(1)));
    }

    #[test]
    fn test_display_strings() {
        let row: Row = [
            ("i".to_string(), DecodedValue::Integer(-7)),
            ("f".to_string(), DecodedValue::Float(1.5)),
            ("t".to_string(), DecodedValue::Text("hi".to_string())),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            row.to_string_pairs(),
            vec![
                ("i".to_string(), "-7".to_string()),
                ("f".to_string(), "1.500000".to_string()),
                ("t".to_string(), "hi".to_string()),
            ]
        );
    }

    #[test]
    fn test_failed_outcome_carries_message() {
        let outcome = QueryOutcome::failed(&SqlKitError::NotRegistered("x".to_string()));
        assert!(!outcome.success());
        assert_eq!(outcome.error_message(), Some("database 'x' is not registered"));
        assert!(outcome.rows().is_empty());
    }
}
