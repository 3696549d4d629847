use std::collections::HashSet;

use stochatreat::{AssignmentConfig, CellValue, SubjectId, SubjectTable, stochatreat};

fn build_table(sizes: &[(&str, usize)]) -> SubjectTable {
    let mut table = SubjectTable::new(["id", "stratum"]);
    let mut next = 0i64;
    for (stratum, size) in sizes {
        for _ in 0..*size {
            table
                .push_row([CellValue::Int(next), CellValue::from(*stratum)])
                .unwrap();
            next += 1;
        }
    }
    table
}

fn build_config(size: Option<usize>, weights: Option<Vec<f64>>, seed: u64) -> AssignmentConfig {
    AssignmentConfig {
        idx_col: Some("id".into()),
        size,
        weights,
        ..AssignmentConfig::new(["stratum"], 2, seed)
    }
}

#[test]
fn target_size_keeps_stratum_proportions() {
    let table = build_table(&[("a", 40), ("b", 60)]);
    let result = stochatreat(&table, &build_config(Some(50), None, 7)).unwrap();
    assert_eq!(result.len(), 50);
    assert_eq!(result.blocks[0].sampled, 20);
    assert_eq!(result.blocks[1].sampled, 30);
    assert_eq!(result.blocks[0].size, 40);
}

#[test]
fn explicit_weights_drive_per_block_draws() {
    let table = build_table(&[("a", 40), ("b", 60)]);
    let result = stochatreat(&table, &build_config(Some(20), Some(vec![0.25, 0.75]), 7)).unwrap();
    assert_eq!(result.blocks[0].sampled, 5);
    assert_eq!(result.blocks[1].sampled, 15);
    assert_eq!(result.len(), 20);
    assert_eq!(result.blocks[1].misfits, 1);
}

#[test]
fn sampled_subjects_come_from_their_block_without_repeats() {
    let table = build_table(&[("a", 40), ("b", 60)]);
    let result = stochatreat(&table, &build_config(Some(30), None, 3)).unwrap();
    let ids: HashSet<_> = result.assignments.iter().map(|row| row.id.clone()).collect();
    assert_eq!(ids.len(), result.len());

    let block_a = &result.assignments[..result.blocks[0].sampled];
    for row in block_a {
        match &row.id {
            SubjectId::Key(CellValue::Int(id)) => assert!(*id < 40),
            other => panic!("unexpected identifier {other:?}"),
        }
    }
}

#[test]
fn oversized_weights_keep_the_whole_block() {
    let table = build_table(&[("a", 4), ("b", 60)]);
    let result = stochatreat(&table, &build_config(Some(20), Some(vec![0.5, 0.5]), 1)).unwrap();
    assert_eq!(result.blocks[0].sampled, 4);
    assert_eq!(result.blocks[1].sampled, 10);
}

#[test]
fn weighted_runs_are_reproducible() {
    let table = build_table(&[("a", 33), ("b", 17), ("c", 50)]);
    let config = build_config(Some(40), None, 21);
    assert_eq!(
        stochatreat(&table, &config).unwrap(),
        stochatreat(&table, &config).unwrap()
    );
}
