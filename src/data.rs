use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::constants::cells::{FALSE_RENDERING, NULL_RENDERING, TRUE_RENDERING};
use crate::errors::TreatmentError;

pub use crate::types::{BlockLabel, BlockPart, ColumnName, Treatment};

/// A single cell of a subject table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Missing value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Free-form text.
    Text(String),
    /// Nested arrays or objects, kept as raw JSON.
    Nested(serde_json::Value),
}

impl CellValue {
    /// Deterministic string rendering used for block keys and identifiers.
    ///
    /// Integral floats keep a trailing `.0` so `1` and `1.0` stay distinguishable.
    pub fn canonical(&self) -> String {
        match self {
            CellValue::Null => NULL_RENDERING.to_string(),
            CellValue::Bool(true) => TRUE_RENDERING.to_string(),
            CellValue::Bool(false) => FALSE_RENDERING.to_string(),
            CellValue::Int(value) => value.to_string(),
            CellValue::Float(value) => canonical_float(*value),
            CellValue::Text(value) => value.clone(),
            CellValue::Nested(value) => value.to_string(),
        }
    }
}

fn canonical_float(value: f64) -> String {
    if value.is_nan() {
        return NULL_RENDERING.to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e16 {
        return format!("{value:.1}");
    }
    format!("{value}")
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Int(i64::from(value))
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

/// Column-ordered table of subjects.
///
/// Only the identifier and stratification columns are read during assignment;
/// every other column is ignored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubjectTable {
    columns: Vec<ColumnName>,
    rows: Vec<Vec<CellValue>>,
}

impl SubjectTable {
    /// Create an empty table with the given column order.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ColumnName>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from order-preserving records.
    ///
    /// Columns appear in first-seen order; cells missing from a record read as null.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = IndexMap<ColumnName, CellValue>>,
    {
        let records: Vec<IndexMap<ColumnName, CellValue>> = records.into_iter().collect();
        let columns: Vec<ColumnName> = records
            .iter()
            .flat_map(|record| record.keys().cloned())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        let rows = records
            .into_iter()
            .map(|mut record| {
                columns
                    .iter()
                    .map(|column| record.swap_remove(column).unwrap_or(CellValue::Null))
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    /// Append one row; the cell count must match the column count.
    pub fn push_row<I, V>(&mut self, row: I) -> Result<(), TreatmentError>
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let row: Vec<CellValue> = row.into_iter().map(Into::into).collect();
        if row.len() != self.columns.len() {
            return Err(TreatmentError::InvalidParameter(format!(
                "row {} has {} cells but the table has {} columns",
                self.rows.len(),
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Column names in table order.
    pub fn columns(&self) -> &[ColumnName] {
        &self.columns
    }

    /// Position of `name` among the columns.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// All rows in insertion order.
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Opaque subject identifier carried into the output.
///
/// Keys serialize as the original cell, so integer identifiers stay integers.
/// Equality, hashing and ordering of keys go through [`CellValue::canonical`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubjectId {
    /// Zero-based row position (used when no identifier column is given).
    Position(u64),
    /// The identifier column's cell.
    Key(CellValue),
}

impl PartialEq for SubjectId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SubjectId::Position(left), SubjectId::Position(right)) => left == right,
            (SubjectId::Key(left), SubjectId::Key(right)) => {
                left.canonical() == right.canonical()
            }
            _ => false,
        }
    }
}

impl Eq for SubjectId {}

impl Hash for SubjectId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            SubjectId::Position(position) => {
                0u8.hash(state);
                position.hash(state);
            }
            SubjectId::Key(key) => {
                1u8.hash(state);
                key.canonical().hash(state);
            }
        }
    }
}

impl PartialOrd for SubjectId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SubjectId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SubjectId::Position(left), SubjectId::Position(right)) => left.cmp(right),
            (SubjectId::Key(left), SubjectId::Key(right)) => {
                left.canonical().cmp(&right.canonical())
            }
            (SubjectId::Position(_), SubjectId::Key(_)) => Ordering::Less,
            (SubjectId::Key(_), SubjectId::Position(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectId::Position(position) => write!(f, "{position}"),
            SubjectId::Key(key) => f.write_str(&key.canonical()),
        }
    }
}

/// Synthetic block identity derived from the stratification columns.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockKey {
    /// Canonical values in stratification-column order.
    pub parts: Vec<BlockPart>,
    /// Joined label; equality and ordering use this alone.
    pub label: BlockLabel,
}

impl BlockKey {
    /// Join `parts` with `separator` into a block key.
    pub fn from_parts(parts: Vec<BlockPart>, separator: &str) -> Self {
        let label = parts.join(separator);
        Self { parts, label }
    }
}

impl PartialEq for BlockKey {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
    }
}

impl Eq for BlockKey {}

impl PartialOrd for BlockKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BlockKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.label.cmp(&other.label)
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Normalized working row: identifier plus block key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subject {
    /// Subject identifier.
    pub id: SubjectId,
    /// Block the subject belongs to.
    pub block: BlockKey,
}

/// One output row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Subject identifier.
    pub id: SubjectId,
    /// Assigned treatment label.
    pub treat: Treatment,
}

/// Per-block accounting for one assignment run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSummary {
    /// Block identity.
    pub key: BlockKey,
    /// Subjects in the block before any subsampling.
    pub size: usize,
    /// Subjects kept after weighted subsampling (equals `size` without weighting).
    pub sampled: usize,
    /// Subjects assigned through the balanced fitting prefix.
    pub fitted: usize,
    /// Subjects assigned through the misfit interval rule.
    pub misfits: usize,
}

/// Result of one assignment run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentTable {
    /// Number of treatment labels requested.
    pub treats: Treatment,
    /// Assignments in block order, fitting prefix before misfits.
    pub assignments: Vec<Assignment>,
    /// Per-block accounting in processing order.
    pub blocks: Vec<BlockSummary>,
}

impl AssignmentTable {
    /// Number of assigned subjects.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether no subject was assigned.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Look up the label assigned to `id`.
    pub fn treatment_for(&self, id: &SubjectId) -> Option<Treatment> {
        self.assignments
            .iter()
            .find(|assignment| &assignment.id == id)
            .map(|assignment| assignment.treat)
    }
}
