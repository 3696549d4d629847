use crate::data::{Assignment, AssignmentTable, BlockKey, Treatment};

/// Aggregate balance metrics for per-label assignment counts.
#[derive(Clone, Debug, PartialEq)]
pub struct TreatmentBalance {
    /// Assignments counted.
    pub total: usize,
    /// Labels `0..treats` considered.
    pub treats: Treatment,
    /// Smallest per-label count.
    pub min: usize,
    /// Largest per-label count.
    pub max: usize,
    /// `max / total`.
    pub max_share: f64,
    /// `min / total`.
    pub min_share: f64,
    /// `max / min`; infinite when some label received nobody.
    pub ratio: f64,
    /// One entry per label, in label order.
    pub per_treatment: Vec<TreatmentShare>,
}

/// One label's share of an assignment set.
#[derive(Clone, Debug, PartialEq)]
pub struct TreatmentShare {
    /// Treatment label.
    pub treat: Treatment,
    /// Subjects with this label.
    pub count: usize,
    /// `count / total`, zero for an empty set.
    pub share: f64,
}

/// Balance of one block within a run.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockBalance {
    /// Block identity.
    pub key: BlockKey,
    /// Balance within the block.
    pub balance: TreatmentBalance,
}

/// Compute balance metrics over `assignments` for labels `0..treats`.
/// Labels that received nobody still appear with a zero count.
pub fn treatment_balance(assignments: &[Assignment], treats: Treatment) -> TreatmentBalance {
    let mut counts = vec![0usize; treats as usize];
    for assignment in assignments {
        if let Some(slot) = counts.get_mut(assignment.treat as usize) {
            *slot += 1;
        }
    }
    let total: usize = counts.iter().sum();
    let min = counts.iter().copied().min().unwrap_or(0);
    let max = counts.iter().copied().max().unwrap_or(0);
    let share = |count: usize| {
        if total == 0 {
            0.0
        } else {
            count as f64 / total as f64
        }
    };
    let ratio = if min == 0 {
        f64::INFINITY
    } else {
        max as f64 / min as f64
    };
    let per_treatment = counts
        .iter()
        .enumerate()
        .map(|(treat, count)| TreatmentShare {
            treat: treat as Treatment,
            count: *count,
            share: share(*count),
        })
        .collect();
    TreatmentBalance {
        total,
        treats,
        min,
        max,
        max_share: share(max),
        min_share: share(min),
        ratio,
        per_treatment,
    }
}

/// Per-block balance in the run's block order.
///
/// Relies on the assembly order of [`AssignmentTable::assignments`]: each
/// block's rows are contiguous and blocks follow `table.blocks`.
pub fn block_balances(table: &AssignmentTable) -> Vec<BlockBalance> {
    let mut offset = 0;
    table
        .blocks
        .iter()
        .map(|summary| {
            let end = (offset + summary.sampled).min(table.assignments.len());
            let rows = &table.assignments[offset..end];
            offset = end;
            BlockBalance {
                key: summary.key.clone(),
                balance: treatment_balance(rows, table.treats),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BlockSummary, SubjectId};

    fn assignments(labels: &[Treatment]) -> Vec<Assignment> {
        labels
            .iter()
            .enumerate()
            .map(|(idx, treat)| Assignment {
                id: SubjectId::Position(idx as u64),
                treat: *treat,
            })
            .collect()
    }

    #[test]
    fn treatment_balance_reports_balance() {
        let balance = treatment_balance(&assignments(&[0, 1, 1, 0]), 2);
        assert_eq!(balance.total, 4);
        assert_eq!(balance.min, 2);
        assert_eq!(balance.max, 2);
        assert!((balance.max_share - 0.5).abs() < 1e-9);
        assert!((balance.ratio - 1.0).abs() < 1e-9);
        assert!(
            balance
                .per_treatment
                .iter()
                .all(|entry| (entry.share - 0.5).abs() < 1e-9)
        );
    }

    #[test]
    fn treatment_balance_reports_empty_labels() {
        let balance = treatment_balance(&assignments(&[0, 0, 1]), 3);
        assert_eq!(balance.min, 0);
        assert!(balance.ratio.is_infinite());
        assert_eq!(balance.per_treatment[2].count, 0);
        assert_eq!(balance.per_treatment[0].count, 2);
    }

    #[test]
    fn block_balances_slice_contiguous_rows() {
        let table = AssignmentTable {
            treats: 2,
            assignments: assignments(&[0, 1, 1, 0, 0]),
            blocks: vec![
                BlockSummary {
                    key: BlockKey::from_parts(vec!["a".into()], ""),
                    size: 2,
                    sampled: 2,
                    fitted: 2,
                    misfits: 0,
                },
                BlockSummary {
                    key: BlockKey::from_parts(vec!["b".into()], ""),
                    size: 3,
                    sampled: 3,
                    fitted: 2,
                    misfits: 1,
                },
            ],
        };
        let balances = block_balances(&table);
        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0].balance.total, 2);
        assert_eq!(balances[1].balance.per_treatment[0].count, 2);
        assert_eq!(balances[1].balance.per_treatment[1].count, 1);
    }
}
