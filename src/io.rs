//! JSON subject-table reader and JSON Lines assignment writer.

use indexmap::IndexMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::constants::io::JSON_ARRAY_OPEN;
use crate::data::{AssignmentTable, CellValue, SubjectTable};
use crate::errors::TreatmentError;
use crate::types::ColumnName;

type Record = IndexMap<ColumnName, CellValue>;

/// Read a subject table from a JSON array of objects or a JSON Lines file.
pub fn read_subject_table(path: &Path) -> Result<SubjectTable, TreatmentError> {
    let raw = fs::read_to_string(path)?;
    let table = parse_subject_table(&raw)?;
    debug!(
        path = %path.display(),
        rows = table.len(),
        columns = table.columns().len(),
        "loaded subject table"
    );
    Ok(table)
}

/// Parse a subject table from in-memory JSON text.
///
/// Input starting with `[` is a JSON array; anything else is one object per
/// non-blank line.
pub fn parse_subject_table(raw: &str) -> Result<SubjectTable, TreatmentError> {
    let trimmed = raw.trim_start();
    let records: Vec<Record> = if trimmed.as_bytes().first() == Some(&JSON_ARRAY_OPEN) {
        serde_json::from_str(trimmed)
            .map_err(|err| TreatmentError::Parse(format!("invalid JSON array: {err}")))?
    } else {
        trimmed
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(line_idx, line)| {
                serde_json::from_str(line).map_err(|err| {
                    TreatmentError::Parse(format!("line {}: {err}", line_idx + 1))
                })
            })
            .collect::<Result<_, _>>()?
    };
    Ok(SubjectTable::from_records(records))
}

/// Write one `{"id":…,"treat":…}` object per line.
pub fn write_assignments<W: Write>(
    writer: W,
    table: &AssignmentTable,
) -> Result<(), TreatmentError> {
    let mut writer = BufWriter::new(writer);
    for assignment in &table.assignments {
        serde_json::to_writer(&mut writer, assignment)
            .map_err(|err| TreatmentError::Io(err.into()))?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
