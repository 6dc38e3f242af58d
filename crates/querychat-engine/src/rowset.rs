//! Tabular query results.
//!
//! The backend returns `full_result` as a JSON array of records. This module
//! turns that array into a [`RowSet`] with an explicit column schema so the
//! renderer never has to guess at record shapes.

use serde_json::Value;

/// A single column in a result schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name, as it appears in the record keys.
    pub name: String,
}

impl Column {
    /// Create a new column descriptor.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Ordered records sharing one column schema.
///
/// The schema is taken from the key order of the first record. Every record
/// is validated against it: missing keys are padded with an empty cell and
/// keys the schema does not know are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSet {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
    padded_cells: usize,
    extra_keys: usize,
}

impl RowSet {
    /// Build a row set from JSON records.
    ///
    /// Returns `None` when there is nothing to derive a schema from: the
    /// slice is empty or its first record is not an object.
    pub fn from_records(records: &[Value]) -> Option<Self> {
        let Value::Object(first) = records.first()? else {
            return None;
        };

        let columns: Vec<Column> = first.keys().map(Column::new).collect();
        let mut padded_cells = 0;
        let mut extra_keys = 0;

        let rows = records
            .iter()
            .map(|record| {
                let Value::Object(map) = record else {
                    padded_cells += columns.len();
                    return vec![String::new(); columns.len()];
                };

                extra_keys += map
                    .keys()
                    .filter(|key| !columns.iter().any(|c| &c.name == *key))
                    .count();

                columns
                    .iter()
                    .map(|column| match map.get(&column.name) {
                        Some(value) => cell_text(value),
                        None => {
                            padded_cells += 1;
                            String::new()
                        }
                    })
                    .collect()
            })
            .collect();

        Some(Self {
            columns,
            rows,
            padded_cells,
            extra_keys,
        })
    }

    /// Column names in display order.
    pub fn header(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Rows of display strings, one cell per column.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the row set has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of cells filled in because a record lacked the column.
    pub fn padded_cells(&self) -> usize {
        self.padded_cells
    }

    /// Number of record keys dropped because the schema lacked them.
    pub fn extra_keys(&self) -> usize {
        self.extra_keys
    }

    /// Whether every record matched the schema exactly.
    pub fn is_uniform(&self) -> bool {
        self.padded_cells == 0 && self.extra_keys == 0
    }
}

/// The result block attached to an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultSet {
    /// At least one record with a usable schema.
    Table(RowSet),
    /// Empty array, or a value that is not an array of records.
    Empty,
}

impl ResultSet {
    /// Classify a `full_result` value.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(records) => RowSet::from_records(records).map_or(Self::Empty, Self::Table),
            _ => Self::Empty,
        }
    }
}

/// Stringify a JSON scalar for display.
///
/// Strings are shown verbatim and `null` as an empty cell; everything else
/// uses its JSON text.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
