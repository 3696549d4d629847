/// Name of a column in a subject table.
/// Examples: `household_id`, `gender`, `smoker`
pub type ColumnName = String;
/// Treatment label in `[0, treats)`.
/// Examples: `0` (control), `1`, `2`
pub type Treatment = u32;
/// Canonical string rendering of one stratification value.
/// Examples: `female`, `1`, `2.5`, `True`, `nan`
pub type BlockPart = String;
/// Joined block label used for grouping and ordering.
/// Example: `female1` (from `gender=female`, `smoker=1`)
pub type BlockLabel = String;
