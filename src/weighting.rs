//! Weighted per-block subsampling toward a target sample size.

use rand::Rng;
use rand::seq::index;
use tracing::warn;

use crate::blocks::Blocks;
use crate::config::AssignmentConfig;
use crate::data::SubjectId;
use crate::errors::TreatmentError;

/// Resolve how many subjects to keep from each block, in block order.
///
/// Returns `None` when neither a target size nor weights are configured.
/// Weights default to each block's share of `total` subjects; a target size
/// defaults to `total` when only weights are given.
pub fn resolve_draw_counts(
    blocks: &Blocks,
    total: usize,
    config: &AssignmentConfig,
) -> Result<Option<Vec<usize>>, TreatmentError> {
    if config.size.is_none() && config.weights.is_none() {
        return Ok(None);
    }
    let size = config.size.unwrap_or(total);

    let weights = match &config.weights {
        Some(weights) => {
            if weights.len() != blocks.len() {
                return Err(TreatmentError::Configuration(format!(
                    "length of weights ({}) is not the same as the number of blocks ({})",
                    weights.len(),
                    blocks.len()
                )));
            }
            weights.clone()
        }
        None => empirical_shares(blocks, total),
    };

    let counts = blocks
        .iter()
        .zip(weights)
        .map(|((key, members), weight)| {
            let requested = (weight * size as f64).round() as usize;
            if requested > members.len() {
                warn!(
                    block = %key,
                    requested,
                    available = members.len(),
                    "weighted draw exceeds block size; keeping the whole block"
                );
            }
            requested.min(members.len())
        })
        .collect();
    Ok(Some(counts))
}

/// Each block's share of `total` subjects.
pub fn empirical_shares(blocks: &Blocks, total: usize) -> Vec<f64> {
    if total == 0 {
        return vec![0.0; blocks.len()];
    }
    blocks
        .values()
        .map(|members| members.len() as f64 / total as f64)
        .collect()
}

/// Uniformly draw `count` members without replacement, keeping their block order.
///
/// Consumes no randomness when the whole block is kept.
pub fn subsample<R: Rng + ?Sized>(
    members: Vec<SubjectId>,
    count: usize,
    rng: &mut R,
) -> Vec<SubjectId> {
    if count >= members.len() {
        return members;
    }
    let mut picked = index::sample(rng, members.len(), count).into_vec();
    picked.sort_unstable();
    picked
        .into_iter()
        .map(|position| members[position].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BlockKey;
    use crate::rng::DeterministicRng;

    fn blocks(sizes: &[usize]) -> Blocks {
        let mut blocks = Blocks::new();
        let mut next = 0u64;
        for (idx, size) in sizes.iter().enumerate() {
            let members = (0..*size)
                .map(|_| {
                    next += 1;
                    SubjectId::Position(next - 1)
                })
                .collect();
            blocks.insert(BlockKey::from_parts(vec![format!("b{idx}")], ""), members);
        }
        blocks
    }

    #[test]
    fn no_size_and_no_weights_disables_weighting() {
        let config = AssignmentConfig::new(["block"], 2, 0);
        assert_eq!(resolve_draw_counts(&blocks(&[4, 6]), 10, &config).unwrap(), None);
    }

    #[test]
    fn default_weights_preserve_block_proportions() {
        let config = AssignmentConfig {
            size: Some(5),
            ..AssignmentConfig::new(["block"], 2, 0)
        };
        let counts = resolve_draw_counts(&blocks(&[4, 6]), 10, &config).unwrap();
        assert_eq!(counts, Some(vec![2, 3]));
    }

    #[test]
    fn weight_length_mismatch_names_both_lengths() {
        let config = AssignmentConfig {
            size: Some(5),
            weights: Some(vec![0.2, 0.3, 0.5]),
            ..AssignmentConfig::new(["block"], 2, 0)
        };
        match resolve_draw_counts(&blocks(&[4, 6]), 10, &config) {
            Err(TreatmentError::Configuration(message)) => {
                assert!(message.contains("(3)"));
                assert!(message.contains("(2)"));
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn oversized_requests_clamp_to_block_size() {
        let config = AssignmentConfig {
            size: Some(10),
            weights: Some(vec![0.9, 0.1]),
            ..AssignmentConfig::new(["block"], 2, 0)
        };
        let counts = resolve_draw_counts(&blocks(&[4, 6]), 10, &config).unwrap();
        assert_eq!(counts, Some(vec![4, 1]));
    }

    #[test]
    fn weights_without_size_target_the_full_table() {
        let config = AssignmentConfig {
            weights: Some(vec![0.2, 0.5]),
            ..AssignmentConfig::new(["block"], 2, 0)
        };
        let counts = resolve_draw_counts(&blocks(&[4, 6]), 10, &config).unwrap();
        assert_eq!(counts, Some(vec![2, 5]));
    }

    #[test]
    fn subsample_draws_distinct_members_in_block_order() {
        let members: Vec<SubjectId> = (0..20).map(SubjectId::Position).collect();
        let mut rng = DeterministicRng::new(3);
        let picked = subsample(members.clone(), 7, &mut rng);
        assert_eq!(picked.len(), 7);
        assert!(picked.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(picked.iter().all(|id| members.contains(id)));
    }

    #[test]
    fn subsample_keeps_whole_block_when_count_covers_it() {
        let members: Vec<SubjectId> = (0..3).map(SubjectId::Position).collect();
        let mut rng = DeterministicRng::new(3);
        assert_eq!(subsample(members.clone(), 3, &mut rng), members);
    }
}
