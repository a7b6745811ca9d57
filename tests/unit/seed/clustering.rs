//! Unit tests for seed/cluster.rs

use crate::helpers::{named, random_dna};
use anchorblast::config::{ClusterStrategy, HashConfig, SeedConfig};
use anchorblast::seed::{build_clusterer, collect_seeds, BestDiagonal, HashIndex};

#[test]
fn test_exact_substring_forms_one_diagonal() {
    let seq = random_dna(200, 21);
    let index = HashIndex::build(&[named("s", &seq)], &HashConfig::default()).unwrap();
    let query = &seq[20..120];

    let seeds = collect_seeds(query, &index);
    let clusterer = BestDiagonal {
        minimum_diagonal_length: 2,
        max_offset: 3,
        best: None,
    };
    let diagonals = clusterer.diagonals(&seeds, index.geometry());

    let main: Vec<_> = diagonals.iter().filter(|d| d.offset == 20).collect();
    assert_eq!(main.len(), 1);
    let d = main[0];
    // sampled words at 22, 33, ..., 99
    assert_eq!(d.score, 8);
    assert_eq!((d.database_position, d.query_position), (22, 2));
    assert_eq!(d.database_end_position, 22 + 7 * 11 + 10);
    assert_eq!(d.query_end_position, 2 + 7 * 11 + 10);
}

#[test]
fn test_cumulative_chains_exons() {
    let exon1 = random_dna(66, 31);
    let intron = random_dna(300, 37);
    let exon2 = random_dna(66, 41);
    let genome = [exon1.as_slice(), intron.as_slice(), exon2.as_slice()].concat();
    let query = [exon1.as_slice(), exon2.as_slice()].concat();

    let index = HashIndex::build(&[named("g", &genome)], &HashConfig::default()).unwrap();
    let seeds = collect_seeds(&query, &index);

    let config = SeedConfig {
        strategy: ClusterStrategy::BestCumulativeDiagonal,
        maximum_distance: Some(1000),
        best: None,
        ..SeedConfig::default()
    };
    let anchors = build_clusterer(&config)
        .cluster(&seeds, index.geometry())
        .unwrap();

    assert!(anchors.iter().any(|a| a.offset == 0));
    assert!(anchors.iter().any(|a| a.offset == 300));

    let blocked = SeedConfig {
        maximum_distance: Some(10),
        minimum_cumulative_diagonal_length: 7,
        ..config
    };
    let anchors = build_clusterer(&blocked)
        .cluster(&seeds, index.geometry())
        .unwrap();
    // neither exon alone reaches seven words
    assert!(anchors.iter().all(|a| a.offset != 0 && a.offset != 300));
}
