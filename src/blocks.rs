//! Identifier validation and block-key derivation.
//!
//! Produces the normalized working rows (identifier + block key) that every
//! later stage reads, and groups them into blocks in ascending key order.

use std::collections::{BTreeMap, HashSet};

use crate::config::AssignmentConfig;
use crate::constants::blocks::POSITIONAL_INDEX_COLUMN;
use crate::data::{BlockKey, Subject, SubjectId, SubjectTable};
use crate::errors::TreatmentError;

/// Subjects grouped by block, keys ascending, members in table order.
pub type Blocks = BTreeMap<BlockKey, Vec<SubjectId>>;

/// Reduce `table` to identifier + block key rows.
///
/// Fails on unknown columns or duplicate identifiers; the table is not modified.
pub fn normalize_subjects(
    table: &SubjectTable,
    config: &AssignmentConfig,
) -> Result<Vec<Subject>, TreatmentError> {
    let idx_position = config
        .idx_col
        .as_deref()
        .map(|name| resolve_column(table, name, "identifier"))
        .transpose()?;
    let block_positions = config
        .block_cols
        .iter()
        .map(|name| resolve_column(table, name, "block"))
        .collect::<Result<Vec<_>, _>>()?;

    let id_column = config
        .idx_col
        .clone()
        .unwrap_or_else(|| POSITIONAL_INDEX_COLUMN.to_string());
    let mut seen: HashSet<SubjectId> = HashSet::with_capacity(table.len());
    let mut subjects = Vec::with_capacity(table.len());

    for (row_idx, row) in table.rows().iter().enumerate() {
        let id = match idx_position {
            Some(position) => SubjectId::Key(row[position].clone()),
            None => SubjectId::Position(row_idx as u64),
        };
        if !seen.insert(id.clone()) {
            return Err(TreatmentError::DuplicateIdentifier {
                column: id_column,
                value: id.to_string(),
            });
        }
        let parts = block_positions
            .iter()
            .map(|&position| row[position].canonical())
            .collect();
        subjects.push(Subject {
            id,
            block: BlockKey::from_parts(parts, &config.block_separator),
        });
    }

    Ok(subjects)
}

/// Group normalized subjects by block key.
pub fn group_blocks(subjects: Vec<Subject>) -> Blocks {
    let mut blocks = Blocks::new();
    for subject in subjects {
        blocks.entry(subject.block).or_default().push(subject.id);
    }
    blocks
}

fn resolve_column(table: &SubjectTable, name: &str, role: &str) -> Result<usize, TreatmentError> {
    table.column_index(name).ok_or_else(|| {
        TreatmentError::InvalidParameter(format!(
            "{role} column '{name}' is not present in the subject table"
        ))
    })
}
