use tracing::{debug, info};

use crate::blocks::{group_blocks, normalize_subjects};
use crate::config::AssignmentConfig;
use crate::data::{AssignmentTable, BlockSummary, SubjectTable};
use crate::errors::TreatmentError;
use crate::partition::partition_block;
use crate::rng::DeterministicRng;
use crate::weighting::{resolve_draw_counts, subsample};

/// Stratified treatment assigner bound to a validated configuration.
///
/// Every call to [`StratifiedAssigner::assign`] seeds its own generator, so the
/// assigner can be reused or shared across threads without the runs affecting
/// each other.
#[derive(Clone, Debug)]
pub struct StratifiedAssigner {
    config: AssignmentConfig,
}

impl StratifiedAssigner {
    /// Validate `config` and build an assigner.
    pub fn new(config: AssignmentConfig) -> Result<Self, TreatmentError> {
        Ok(Self {
            config: config.validated()?,
        })
    }

    /// Configuration this assigner runs with.
    pub fn config(&self) -> &AssignmentConfig {
        &self.config
    }

    /// Assign a treatment to every (sampled) subject of `table`.
    ///
    /// Blocks are processed in ascending key order. Within a block the draws
    /// are: weighted subsample (if configured), one permutation draw per kept
    /// subject, then one draw per misfit. All validation happens before the
    /// first draw.
    pub fn assign(&self, table: &SubjectTable) -> Result<AssignmentTable, TreatmentError> {
        let subjects = normalize_subjects(table, &self.config)?;
        let total = subjects.len();
        let blocks = group_blocks(subjects);
        let draw_counts = resolve_draw_counts(&blocks, total, &self.config)?;

        let treats = self.config.treats;
        let mut rng = DeterministicRng::new(self.config.seed);
        let mut assignments = Vec::with_capacity(total);
        let mut summaries = Vec::with_capacity(blocks.len());

        for (block_idx, (key, members)) in blocks.into_iter().enumerate() {
            let size = members.len();
            let members = match &draw_counts {
                Some(counts) => subsample(members, counts[block_idx], &mut rng),
                None => members,
            };
            let sampled = members.len();
            let partition = partition_block(members, treats, &mut rng);
            debug!(
                block = %key,
                size,
                sampled,
                fitted = partition.fitted.len(),
                misfits = partition.misfits.len(),
                "assigned block"
            );
            summaries.push(BlockSummary {
                key,
                size,
                sampled,
                fitted: partition.fitted.len(),
                misfits: partition.misfits.len(),
            });
            assignments.extend(partition.into_assignments());
        }

        info!(
            subjects = total,
            assigned = assignments.len(),
            blocks = summaries.len(),
            treats,
            seed = self.config.seed,
            "treatment assignment complete"
        );
        Ok(AssignmentTable {
            treats,
            assignments,
            blocks: summaries,
        })
    }
}

/// One-shot helper: validate `config` and assign treatments over `table`.
pub fn stochatreat(
    table: &SubjectTable,
    config: &AssignmentConfig,
) -> Result<AssignmentTable, TreatmentError> {
    StratifiedAssigner::new(config.clone())?.assign(table)
}
