//! Balanced per-block partition and misfit resolution.
//!
//! A block is shuffled by drawing one uniform value per subject and sorting by
//! that value (descending). The largest prefix divisible by `treats` is cut
//! into equal contiguous slices, one label per slice. The remaining
//! `n % treats` subjects are misfits: each draws another uniform value and takes
//! the label of the equal-width interval of `[0, 1)` it falls in.

use rand::Rng;

use crate::data::{Assignment, SubjectId, Treatment};

/// Assignments for one block, split by the rule that produced them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockPartition {
    /// Fitting prefix, labels in contiguous equal slices.
    pub fitted: Vec<Assignment>,
    /// Remainder assigned through the interval rule.
    pub misfits: Vec<Assignment>,
}

impl BlockPartition {
    /// Subjects assigned in this block.
    pub fn len(&self) -> usize {
        self.fitted.len() + self.misfits.len()
    }

    /// Whether the block assigned nobody.
    pub fn is_empty(&self) -> bool {
        self.fitted.is_empty() && self.misfits.is_empty()
    }

    /// Fitting prefix followed by misfits.
    pub fn into_assignments(self) -> Vec<Assignment> {
        let mut assignments = self.fitted;
        assignments.extend(self.misfits);
        assignments
    }
}

/// Partition one block into `treats` balanced groups plus misfits.
///
/// Consumes exactly `members.len()` draws for the permutation, then one draw per
/// misfit, in that order. `treats` must be at least 1.
pub fn partition_block<R: Rng + ?Sized>(
    members: Vec<SubjectId>,
    treats: Treatment,
    rng: &mut R,
) -> BlockPartition {
    let treat_count = treats.max(1) as usize;
    let mut keyed: Vec<(SubjectId, f64)> = members
        .into_iter()
        .map(|id| {
            let draw = rng.random::<f64>();
            (id, draw)
        })
        .collect();
    // Stable sort: equal draws keep table order.
    keyed.sort_by(|left, right| right.1.total_cmp(&left.1));

    let base = keyed.len() / treat_count;
    let fitting_len = base * treat_count;
    let mut ordered = keyed.into_iter().map(|(id, _)| id);

    let fitted = ordered
        .by_ref()
        .take(fitting_len)
        .enumerate()
        .map(|(position, id)| Assignment {
            id,
            treat: (position / base) as Treatment,
        })
        .collect();
    let misfits = ordered
        .map(|id| Assignment {
            id,
            treat: misfit_label(rng.random::<f64>(), treats),
        })
        .collect();

    BlockPartition { fitted, misfits }
}

/// Label of the equal-width sub-interval of `[0, 1)` containing `draw`.
pub fn misfit_label(draw: f64, treats: Treatment) -> Treatment {
    let treats = treats.max(1);
    let slot = (draw.clamp(0.0, 1.0) * f64::from(treats)).floor() as Treatment;
    slot.min(treats - 1)
}
