//! Column-ordered table of JSON cells.

use serde::Serialize;
use serde_json::{Map, Value};

/// A flat table: named columns in a fixed order and one row of cells per record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from JSON objects.
    ///
    /// Columns appear in first-seen order across all objects; cells for keys a
    /// record lacks are null. Non-object values become a single `value` column.
    pub fn from_objects<I>(objects: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let mut table = Table::default();
        let mut pending: Vec<Map<String, Value>> = Vec::new();

        for object in objects {
            let map = match object {
                Value::Object(map) => map,
                other => {
                    let mut map = Map::new();
                    map.insert("value".to_string(), other);
                    map
                }
            };
            for key in map.keys() {
                if table.column(key).is_none() {
                    table.columns.push(key.clone());
                }
            }
            pending.push(map);
        }

        for mut map in pending {
            let row = table
                .columns
                .iter()
                .map(|col| map.get_mut(col).map(Value::take).unwrap_or(Value::Null))
                .collect();
            table.rows.push(row);
        }

        table
    }

    /// Build a table from serializable records.
    pub fn from_records<T: Serialize>(records: &[T]) -> Result<Self, serde_json::Error> {
        let objects = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_objects(objects))
    }

    /// Append a row. Short rows are padded with nulls, long rows truncated.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` in column `name`.
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        let col = self.column(name)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Rows as JSON objects keyed by column name.
    pub fn to_records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let map: Map<String, Value> = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect();
                Value::Object(map)
            })
            .collect()
    }
}
