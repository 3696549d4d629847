/// Constants used by assignment defaults.
pub mod assign {
    /// Seed used when the caller does not provide one.
    pub const DEFAULT_SEED: u64 = 0;
    /// Treatment count used by `AssignmentConfig::default()` (control + one arm).
    pub const DEFAULT_TREATS: u32 = 2;
}

/// Constants used by block-key derivation.
pub mod blocks {
    /// Separator inserted between stratification parts (plain concatenation).
    pub const DEFAULT_BLOCK_SEPARATOR: &str = "";
    /// Column name reported for the positional fallback identifier.
    pub const POSITIONAL_INDEX_COLUMN: &str = "index";
}

/// Canonical renderings of non-text cell values.
pub mod cells {
    /// Rendering of a missing cell.
    pub const NULL_RENDERING: &str = "nan";
    /// Rendering of a `true` cell.
    pub const TRUE_RENDERING: &str = "True";
    /// Rendering of a `false` cell.
    pub const FALSE_RENDERING: &str = "False";
}

/// Constants used by the JSON table reader/writer.
pub mod io {
    /// Opening byte that marks a JSON array input (anything else is JSON Lines).
    pub const JSON_ARRAY_OPEN: u8 = b'[';
}
