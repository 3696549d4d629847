use crate::constants::assign::{DEFAULT_SEED, DEFAULT_TREATS};
use crate::constants::blocks::DEFAULT_BLOCK_SEPARATOR;
use crate::errors::TreatmentError;
use crate::types::{ColumnName, Treatment};

/// Top-level assignment configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct AssignmentConfig {
    /// Stratification columns, in the order their values are joined into block keys.
    pub block_cols: Vec<ColumnName>,
    /// Number of treatment cells (including control).
    pub treats: Treatment,
    /// RNG seed that fully determines the assignment.
    pub seed: u64,
    /// Identifier column; `None` falls back to the row position.
    pub idx_col: Option<ColumnName>,
    /// Target sample size; enables weighted subsampling of each block.
    pub size: Option<usize>,
    /// Per-block sampling weights aligned to ascending block-key order.
    ///
    /// When only `size` is set, weights default to each block's share of the table.
    pub weights: Option<Vec<f64>>,
    /// Separator placed between stratification values in a block key.
    pub block_separator: String,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            block_cols: Vec::new(),
            treats: DEFAULT_TREATS,
            seed: DEFAULT_SEED,
            idx_col: None,
            size: None,
            weights: None,
            block_separator: DEFAULT_BLOCK_SEPARATOR.to_string(),
        }
    }
}

impl AssignmentConfig {
    /// Convenience constructor for the common single-call case.
    pub fn new<I, S>(block_cols: I, treats: Treatment, seed: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ColumnName>,
    {
        Self {
            block_cols: block_cols.into_iter().map(Into::into).collect(),
            treats,
            seed,
            ..Self::default()
        }
    }

    /// Validate table-independent parameters.
    ///
    /// Weight length is checked later, once the number of blocks is known.
    pub fn validated(self) -> Result<Self, TreatmentError> {
        if self.treats < 1 {
            return Err(TreatmentError::InvalidParameter(format!(
                "treats must be at least 1 (got {})",
                self.treats
            )));
        }
        if self.block_cols.is_empty() {
            return Err(TreatmentError::InvalidParameter(
                "at least one block column is required".to_string(),
            ));
        }
        if self.size == Some(0) {
            return Err(TreatmentError::InvalidParameter(
                "size must be a positive number".to_string(),
            ));
        }
        if let Some(weights) = &self.weights
            && let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0)
        {
            return Err(TreatmentError::Configuration(format!(
                "weights must be finite and non-negative (found {bad})"
            )));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_treats() {
        let err = AssignmentConfig::new(["block"], 0, 0).validated().unwrap_err();
        assert!(matches!(err, TreatmentError::InvalidParameter(_)));
    }

    #[test]
    fn rejects_missing_block_columns() {
        let config = AssignmentConfig {
            treats: 2,
            ..AssignmentConfig::default()
        };
        assert!(matches!(
            config.validated(),
            Err(TreatmentError::InvalidParameter(_))
        ));
    }

    #[test]
    fn rejects_zero_size() {
        let config = AssignmentConfig {
            size: Some(0),
            ..AssignmentConfig::new(["block"], 2, 0)
        };
        assert!(matches!(
            config.validated(),
            Err(TreatmentError::InvalidParameter(_))
        ));
    }

    #[test]
    fn rejects_negative_weights() {
        let config = AssignmentConfig {
            weights: Some(vec![0.5, -0.1]),
            ..AssignmentConfig::new(["block"], 2, 0)
        };
        assert!(matches!(
            config.validated(),
            Err(TreatmentError::Configuration(_))
        ));
    }

    #[test]
    fn defaults_use_plain_concatenation_and_seed_zero() {
        let config = AssignmentConfig::default();
        assert_eq!(config.seed, 0);
        assert_eq!(config.block_separator, "");
        assert!(config.idx_col.is_none());
    }
}
