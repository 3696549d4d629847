#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Stratified assigner and one-shot entry point.
pub mod assign;
/// Identifier validation and block-key derivation.
pub mod blocks;
/// Command-line runner shared by the `stochatreat` binary.
pub mod cli;
/// Assignment configuration types.
pub mod config;
/// Centralized constants used across blocks, cells, and IO.
pub mod constants;
/// Subject table, identifier, and assignment result types.
pub mod data;
/// JSON table reader and JSON Lines assignment writer.
pub mod io;
/// Treatment balance metrics.
pub mod metrics;
/// Balanced per-block partition and misfit resolution.
pub mod partition;
mod rng;
/// Shared type aliases.
pub mod types;
/// Weighted per-block subsampling.
pub mod weighting;

mod errors;

pub use assign::{StratifiedAssigner, stochatreat};
pub use config::AssignmentConfig;
pub use data::{
    Assignment, AssignmentTable, BlockKey, BlockSummary, CellValue, SubjectId, SubjectTable,
};
pub use errors::TreatmentError;
pub use metrics::{TreatmentBalance, TreatmentShare, treatment_balance};
pub use types::{BlockLabel, BlockPart, ColumnName, Treatment};
