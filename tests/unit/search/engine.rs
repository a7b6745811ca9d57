//! End-to-end tests for search/engine.rs

use crate::helpers::{named, random_dna};
use anchorblast::search::{BarProgress, NoProgress, ProgressReporter};
use anchorblast::sequence::reverse_complement;
use anchorblast::{Alignment, ScoringMatrix, SearchConfig, SearchEngine, Strand};
use std::sync::atomic::{AtomicUsize, Ordering};

fn engine(database: Vec<(&str, Vec<u8>)>, config: SearchConfig) -> SearchEngine {
    let database = database
        .into_iter()
        .map(|(name, seq)| named(name, &seq))
        .collect();
    SearchEngine::new(database, ScoringMatrix::blastn(), config).unwrap()
}

#[test]
fn test_finds_query_among_several_sequences() {
    let targets: Vec<Vec<u8>> = (0..5).map(|i| random_dna(400, 100 + i)).collect();
    let query = named("q", &targets[3][150..250]);
    let engine = engine(
        targets
            .iter()
            .enumerate()
            .map(|(i, t)| (["a", "b", "c", "d", "e"][i], t.clone()))
            .collect(),
        SearchConfig::default(),
    );

    let hits = engine.search(&query).unwrap();
    assert_eq!(hits.len(), 1);
    let hit = &hits[0];
    assert_eq!(hit.database_id(), 3);
    assert_eq!(hit.database_name(), "d");
    assert_eq!(hit.query_name(), "q");
    assert_eq!(hit.strand(), Strand::Plus);
    assert_eq!(hit.score(), 100.0);
    assert_eq!((hit.database_start(), hit.database_end()), (151, 250));
    assert_eq!((hit.query_start(), hit.query_end()), (1, 100));
}

#[test]
fn test_reverse_complement_symmetry() {
    let target = random_dna(300, 17);
    let fragment = target[80..200].to_vec();

    // reverse-complemented query against the forward target
    let forward_db = engine(vec![("t", target.clone())], SearchConfig::default());
    let minus = forward_db
        .search(&named("q", &reverse_complement(&fragment)))
        .unwrap();

    // forward query against the reverse-complemented target
    let reverse_db = engine(
        vec![("t", reverse_complement(&target))],
        SearchConfig::default(),
    );
    let mirrored = reverse_db.search(&named("q", &fragment)).unwrap();

    assert_eq!(minus.len(), 1);
    assert_eq!(mirrored.len(), 1);
    assert_eq!(minus[0].strand(), Strand::Minus);
    assert_eq!(mirrored[0].strand(), Strand::Minus);
    assert_eq!(minus[0].score(), 120.0);
    assert_eq!(minus[0].score(), mirrored[0].score());
    assert_eq!((minus[0].database_start(), minus[0].database_end()), (81, 200));
    assert_eq!(
        (mirrored[0].database_start(), mirrored[0].database_end()),
        (101, 220)
    );
}

#[test]
fn test_low_complexity_query_finds_nothing() {
    let mut target = random_dna(300, 23);
    target.extend(std::iter::repeat(b'A').take(200));
    let engine = engine(vec![("t", target)], SearchConfig::default());
    let hits = engine.search(&named("polyA", &vec![b'A'; 80])).unwrap();
    assert!(hits.is_empty());
}

#[test]
fn test_spliced_query_gives_composite_hit() {
    let exon1 = random_dna(66, 51);
    let intron = random_dna(300, 53);
    let exon2 = random_dna(66, 57);
    let genome = [exon1.as_slice(), intron.as_slice(), exon2.as_slice()].concat();
    let transcript = [exon1.as_slice(), exon2.as_slice()].concat();

    let engine = engine(vec![("chr", genome.clone())], SearchConfig::spliced());
    let hits = engine.search(&named("tx", &transcript)).unwrap();

    assert_eq!(hits.len(), 1);
    let hit = &hits[0];
    assert!(hit.is_composite());
    let segments = hit.segments();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].database_start(), 1);
    assert_eq!(segments[1].database_end(), genome.len());
    assert_eq!(hit.query_start(), 1);
    assert_eq!(hit.query_end(), transcript.len());
    assert!(segments[0].query_end() < segments[1].query_start());
    assert!(hit.score() >= 120.0);
}

#[test]
fn test_minimum_score_filters_short_hits() {
    let target = random_dna(300, 29);
    let query = named("q", &target[100..140]);
    let mut config = SearchConfig::default();

    let permissive = engine(vec![("t", target.clone())], config);
    assert_eq!(permissive.search(&query).unwrap().len(), 1);

    config.minimum_score = Some(41.0);
    let strict = engine(vec![("t", target)], config);
    assert!(strict.search(&query).unwrap().is_empty());
}

#[test]
fn test_long_read_preset_runs_banded_homopolymer_extension() {
    let target = random_dna(2600, 61);
    let mut read = target[300..2300].to_vec();
    // delete one base from an inserted homopolymer run
    read.splice(1000..1000, b"GGGGGG".iter().copied());
    let mut reference = target.clone();
    reference.splice(1300..1300, b"GGGGGGG".iter().copied());

    let engine = SearchEngine::new(
        vec![named("ref", &reference)],
        ScoringMatrix::long_read(),
        SearchConfig::long_read(),
    )
    .unwrap();
    let hits = engine.search(&named("read", &read)).unwrap();

    assert_eq!(hits.len(), 1);
    let hit = &hits[0];
    assert_eq!(hit.strand(), Strand::Plus);
    assert_eq!((hit.query_start(), hit.query_end()), (1, read.len()));
    assert_eq!((hit.database_start(), hit.database_end()), (301, 2307));
    // every read base matches; the single deletion costs less than a full gap open
    let gap_cost = read.len() as f64 - hit.score();
    assert!(gap_cost > 0.0 && gap_cost < ScoringMatrix::long_read().gap_exist());
}

struct Counting(AtomicUsize);

impl ProgressReporter for Counting {
    fn report(&self, _processed: usize, _total: usize) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn test_batch_progress_interval() {
    let target = random_dna(500, 71);
    let mut config = SearchConfig::default();
    config.progress_interval = 2;
    let engine = engine(vec![("t", target.clone())], config);

    let queries: Vec<_> = (0..5)
        .map(|i| named(&format!("q{i}"), &target[i * 80..i * 80 + 60]))
        .collect();
    let counter = Counting(AtomicUsize::new(0));
    let results = engine.search_batch(&queries, &counter).unwrap();

    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| r.hits.len() == 1));
    assert_eq!(&*results[4].query_name, "q4");
    assert_eq!(counter.0.load(Ordering::Relaxed), 2);

    let bar = BarProgress::hidden(queries.len());
    engine.search_batch(&queries, &bar).unwrap();
    assert_eq!(bar.position(), 5);
    engine.search_batch(&[], &NoProgress).unwrap();
}
