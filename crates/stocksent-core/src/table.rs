//! Column-oriented news table.
//!
//! Every column has the same number of rows. Operations never modify a table
//! in place: adding a column or dropping duplicates produces a new table, and
//! a failed operation leaves the input untouched.

use std::collections::HashSet;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::record::NewsRecord;

pub const HEADLINE: &str = "headline";
pub const DATE: &str = "date";
pub const DESCRIPTION: &str = "description";
pub const SENTIMENT: &str = "sentiment";
pub const FINBERT_SENTIMENT: &str = "finbert_sentiment";

/// Columns every aggregated table carries, in order.
pub const CANONICAL_COLUMNS: [&str; 3] = [HEADLINE, DATE, DESCRIPTION];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("missing column `{0}`")]
    MissingColumn(String),

    #[error("column `{name}` is {actual}, expected {expected}")]
    WrongKind {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("column `{0}` already exists")]
    DuplicateColumn(String),

    #[error("column `{name}` has {actual} rows, table has {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("cannot concatenate tables with columns [{left}] and [{right}]")]
    SchemaMismatch { left: String, right: String },
}

/// Typed column storage.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Text(Vec<Option<String>>),
    /// Continuous scores such as lexicon polarity.
    Float(Vec<f64>),
    /// Discrete labels in `{-1, 0, 1}`.
    Label(Vec<i8>),
}

impl Column {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Column::Text(v) => v.len(),
            Column::Float(v) => v.len(),
            Column::Label(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Column::Text(_) => "text",
            Column::Float(_) => "float",
            Column::Label(_) => "label",
        }
    }

    fn empty_like(&self) -> Column {
        match self {
            Column::Text(_) => Column::Text(Vec::new()),
            Column::Float(_) => Column::Float(Vec::new()),
            Column::Label(_) => Column::Label(Vec::new()),
        }
    }

    fn append(&mut self, other: Column) {
        match (self, other) {
            (Column::Text(a), Column::Text(b)) => a.extend(b),
            (Column::Float(a), Column::Float(b)) => a.extend(b),
            (Column::Label(a), Column::Label(b)) => a.extend(b),
            (a, b) => unreachable!(
                "cannot append a {} column to a {} column",
                b.kind(),
                a.kind()
            ),
        }
    }

    fn retain_mask(&mut self, keep: &[bool]) {
        fn filter<T>(values: &mut Vec<T>, keep: &[bool]) {
            let mut idx = 0;
            values.retain(|_| {
                let k = keep[idx];
                idx += 1;
                k
            });
        }
        match self {
            Column::Text(v) => filter(v, keep),
            Column::Float(v) => filter(v, keep),
            Column::Label(v) => filter(v, keep),
        }
    }
}

/// Which occurrence survives when rows share a dedup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupKeep {
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsTable {
    columns: Vec<(String, Column)>,
    rows: usize,
}

impl Default for NewsTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl NewsTable {
    /// A table with the canonical `{headline, date, description}` schema and
    /// no rows.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_records(Vec::new())
    }

    /// Builds a canonical-schema table from normalized records, preserving
    /// their order.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = NewsRecord>,
    {
        let mut headlines = Vec::new();
        let mut dates = Vec::new();
        let mut descriptions = Vec::new();

        for record in records {
            let (headline, date, description) = record.into_parts();
            headlines.push(Some(headline));
            dates.push(date);
            descriptions.push(description);
        }

        let rows = headlines.len();
        Self {
            columns: vec![
                (HEADLINE.to_string(), Column::Text(headlines)),
                (DATE.to_string(), Column::Text(dates)),
                (DESCRIPTION.to_string(), Column::Text(descriptions)),
            ],
            rows,
        }
    }

    /// Builds a table from arbitrary named columns.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateColumn`] if a name repeats, or
    /// [`SchemaError::LengthMismatch`] if the columns differ in length.
    pub fn from_columns(columns: Vec<(String, Column)>) -> Result<Self, SchemaError> {
        let rows = columns.first().map_or(0, |(_, c)| c.len());
        let mut seen = HashSet::new();
        for (name, column) in &columns {
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::DuplicateColumn(name.clone()));
            }
            if column.len() != rows {
                return Err(SchemaError::LengthMismatch {
                    name: name.clone(),
                    expected: rows,
                    actual: column.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    /// Borrows a text column by name.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingColumn`] or [`SchemaError::WrongKind`].
    pub fn text_column(&self, name: &str) -> Result<&[Option<String>], SchemaError> {
        match self.column(name) {
            Some(Column::Text(values)) => Ok(values),
            Some(other) => Err(SchemaError::WrongKind {
                name: name.to_string(),
                expected: "text",
                actual: other.kind(),
            }),
            None => Err(SchemaError::MissingColumn(name.to_string())),
        }
    }

    /// Returns a new table with `column` appended under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateColumn`] if `name` exists, or
    /// [`SchemaError::LengthMismatch`] if `column` has the wrong row count.
    pub fn with_column(&self, name: &str, column: Column) -> Result<Self, SchemaError> {
        if self.has_column(name) {
            return Err(SchemaError::DuplicateColumn(name.to_string()));
        }
        if column.len() != self.rows {
            return Err(SchemaError::LengthMismatch {
                name: name.to_string(),
                expected: self.rows,
                actual: column.len(),
            });
        }
        let mut next = self.clone();
        next.columns.push((name.to_string(), column));
        Ok(next)
    }

    /// Appends the rows of `other` after the rows of `self`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaMismatch`] unless both tables have the
    /// same column names and kinds in the same order.
    pub fn concat(mut self, other: NewsTable) -> Result<Self, SchemaError> {
        let same_schema = self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .zip(&other.columns)
                .all(|((ln, lc), (rn, rc))| ln == rn && lc.kind() == rc.kind());
        if !same_schema {
            return Err(SchemaError::SchemaMismatch {
                left: self.column_names().join(", "),
                right: other.column_names().join(", "),
            });
        }

        self.rows += other.rows;
        for ((_, left), (_, right)) in self.columns.iter_mut().zip(other.columns) {
            left.append(right);
        }
        Ok(self)
    }

    /// Keeps exactly one row per distinct value of the text column `key`.
    ///
    /// Row order among survivors is preserved. Null keys compare equal to
    /// each other.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if `key` is missing or not a text column.
    pub fn dedup_by(mut self, key: &str, keep: DedupKeep) -> Result<Self, SchemaError> {
        let values = self.text_column(key)?;
        let mut mask = vec![false; values.len()];
        let mut seen: HashSet<Option<&str>> = HashSet::new();

        match keep {
            DedupKeep::First => {
                for (i, v) in values.iter().enumerate() {
                    mask[i] = seen.insert(v.as_deref());
                }
            }
            DedupKeep::Last => {
                for (i, v) in values.iter().enumerate().rev() {
                    mask[i] = seen.insert(v.as_deref());
                }
            }
        }

        let kept = mask.iter().filter(|k| **k).count();
        if kept == self.rows {
            return Ok(self);
        }
        for (_, column) in &mut self.columns {
            column.retain_mask(&mask);
        }
        self.rows = kept;
        Ok(self)
    }

    /// [`NewsTable::dedup_by`] on the `headline` column.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the table has no `headline` text column.
    pub fn dedup_by_headline(self, keep: DedupKeep) -> Result<Self, SchemaError> {
        self.dedup_by(HEADLINE, keep)
    }

    /// A table with the same columns and no rows.
    #[must_use]
    pub fn empty_like(&self) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .map(|(n, c)| (n.clone(), c.empty_like()))
                .collect(),
            rows: 0,
        }
    }

    /// Row-oriented JSON: an array of objects keyed by column name.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

struct RowRef<'a> {
    table: &'a NewsTable,
    index: usize,
}

impl Serialize for RowRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.table.columns.len()))?;
        for (name, column) in &self.table.columns {
            match column {
                Column::Text(v) => map.serialize_entry(name, &v[self.index])?,
                Column::Float(v) => map.serialize_entry(name, &v[self.index])?,
                Column::Label(v) => map.serialize_entry(name, &v[self.index])?,
            }
        }
        map.end()
    }
}

impl Serialize for NewsTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows))?;
        for index in 0..self.rows {
            seq.serialize_element(&RowRef { table: self, index })?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(headline: &str, date: &str, description: Option<&str>) -> NewsRecord {
        NewsRecord::new(headline, Some(date.into()), description.map(str::to_string)).unwrap()
    }

    fn headlines(table: &NewsTable) -> Vec<Option<&str>> {
        table
            .text_column(HEADLINE)
            .unwrap()
            .iter()
            .map(Option::as_deref)
            .collect()
    }

    #[test]
    fn empty_table_has_canonical_schema() {
        let t = NewsTable::empty();
        assert!(t.is_empty());
        assert_eq!(t.column_names(), CANONICAL_COLUMNS.to_vec());
    }

    #[test]
    fn from_records_fills_missing_description_with_null() {
        let t = NewsTable::from_records(vec![record("A", "2025-01-01", None)]);
        assert_eq!(t.len(), 1);
        assert_eq!(t.text_column(DESCRIPTION).unwrap(), &[None]);
    }

    #[test]
    fn from_records_keeps_missing_date_as_null() {
        let undated = NewsRecord::new("A", None, None).unwrap();
        let t = NewsTable::from_records(vec![undated]);
        assert_eq!(t.text_column(DATE).unwrap(), &[None]);
        assert_eq!(t.to_json()[0]["date"], serde_json::Value::Null);
    }

    #[test]
    #[should_panic(expected = "cannot append a float column to a text column")]
    fn append_rejects_mismatched_kinds() {
        let mut column = Column::Text(vec![Some("A".into())]);
        column.append(Column::Float(vec![1.0]));
    }

    #[test]
    fn with_column_returns_new_table_and_leaves_input_alone() {
        let t = NewsTable::from_records(vec![record("A", "d", None)]);
        let next = t.with_column(SENTIMENT, Column::Float(vec![0.5])).unwrap();
        assert!(!t.has_column(SENTIMENT));
        assert_eq!(next.column(SENTIMENT), Some(&Column::Float(vec![0.5])));
    }

    #[test]
    fn with_column_rejects_length_mismatch() {
        let t = NewsTable::from_records(vec![record("A", "d", None)]);
        let err = t
            .with_column(SENTIMENT, Column::Float(vec![0.5, 0.1]))
            .unwrap_err();
        assert!(matches!(err, SchemaError::LengthMismatch { expected: 1, actual: 2, .. }));
    }

    #[test]
    fn with_column_rejects_duplicate_name() {
        let t = NewsTable::empty();
        let err = t.with_column(HEADLINE, Column::Text(vec![])).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateColumn(HEADLINE.to_string()));
    }

    #[test]
    fn text_column_reports_missing_and_wrong_kind() {
        let t = NewsTable::empty()
            .with_column(SENTIMENT, Column::Float(vec![]))
            .unwrap();
        assert_eq!(
            t.text_column("nope").unwrap_err(),
            SchemaError::MissingColumn("nope".to_string())
        );
        assert!(matches!(
            t.text_column(SENTIMENT).unwrap_err(),
            SchemaError::WrongKind { actual: "float", .. }
        ));
    }

    #[test]
    fn from_columns_rejects_ragged_columns() {
        let err = NewsTable::from_columns(vec![
            (HEADLINE.to_string(), Column::Text(vec![Some("a".into())])),
            (DESCRIPTION.to_string(), Column::Text(vec![])),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::LengthMismatch { .. }));
    }

    #[test]
    fn concat_appends_rows_in_order() {
        let a = NewsTable::from_records(vec![record("A", "1", None)]);
        let b = NewsTable::from_records(vec![record("B", "2", Some("x")), record("C", "3", None)]);
        let t = a.concat(b).unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(headlines(&t), vec![Some("A"), Some("B"), Some("C")]);
    }

    #[test]
    fn concat_rejects_different_schema() {
        let a = NewsTable::empty();
        let b = NewsTable::empty()
            .with_column(SENTIMENT, Column::Float(vec![]))
            .unwrap();
        assert!(matches!(
            a.concat(b).unwrap_err(),
            SchemaError::SchemaMismatch { .. }
        ));
    }

    #[test]
    fn dedup_keep_first_keeps_earliest_occurrence() {
        let t = NewsTable::from_records(vec![
            record("A", "1", Some("first")),
            record("B", "2", None),
            record("A", "3", Some("second")),
        ]);
        let t = t.dedup_by_headline(DedupKeep::First).unwrap();
        assert_eq!(headlines(&t), vec![Some("A"), Some("B")]);
        assert_eq!(t.text_column(DATE).unwrap()[0].as_deref(), Some("1"));
    }

    #[test]
    fn dedup_keep_last_keeps_latest_occurrence_in_position() {
        let t = NewsTable::from_records(vec![
            record("A", "1", None),
            record("B", "2", None),
            record("A", "3", None),
        ]);
        let t = t.dedup_by_headline(DedupKeep::Last).unwrap();
        assert_eq!(headlines(&t), vec![Some("B"), Some("A")]);
        assert_eq!(t.text_column(DATE).unwrap()[1].as_deref(), Some("3"));
    }

    #[test]
    fn serializes_rows_as_objects_with_nulls() {
        let t = NewsTable::from_records(vec![record("A", "2025-01-01", None)])
            .with_column(SENTIMENT, Column::Float(vec![0.25]))
            .unwrap()
            .with_column(FINBERT_SENTIMENT, Column::Label(vec![-1]))
            .unwrap();
        assert_eq!(
            t.to_json(),
            serde_json::json!([{
                "headline": "A",
                "date": "2025-01-01",
                "description": null,
                "sentiment": 0.25,
                "finbert_sentiment": -1
            }])
        );
    }
}
