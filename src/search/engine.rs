//! Per-query search pipeline
//!
//! For each strand of the query: collect seeds, cluster them into anchors, extend
//! each anchor, keep the significant alignments. Both strands' alignments then go
//! through the post-processing stages.

use super::progress::ProgressReporter;
use crate::align::{
    build_extender, Alignment, Anchor, Extender, PairwiseAlignment, SearchHit, Strand,
    UngappedExtension,
};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::post::{build_filter, build_pipeline, PostProcessor, SignificanceFilter};
use crate::seed::hash_index::MAX_SEQUENCES;
use crate::seed::{build_clusterer, collect_seeds, HashIndex, SeedClusterer};
use crate::sequence::{reverse_complement, NamedSequence};
use crate::utils::matrix::ScoringMatrix;
use anyhow::Result;
use rustc_hash::FxHashSet;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, trace};

/// Hits of one query from a batch
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub query_name: Arc<str>,
    pub query_length: usize,
    pub hits: Vec<SearchHit>,
}

/// Search engine over one immutable database.
///
/// The word index is built on first use and shared read-only afterwards, so one
/// engine can serve queries from several threads.
pub struct SearchEngine {
    database: Vec<NamedSequence>,
    matrix: ScoringMatrix,
    config: SearchConfig,
    index: OnceLock<HashIndex>,
    clusterer: Box<dyn SeedClusterer>,
    extender: Box<dyn Extender>,
    filter: Box<dyn SignificanceFilter>,
    pipeline: Vec<Box<dyn PostProcessor>>,
    ungapped: Option<UngappedExtension>,
}

/// Identity of an accepted alignment for de-duplication
type AlignmentKey = (u16, Strand, usize, usize, usize, usize);

impl SearchEngine {
    pub fn new(
        database: Vec<NamedSequence>,
        matrix: ScoringMatrix,
        config: SearchConfig,
    ) -> Result<Self> {
        config.validate()?;
        if database.len() > MAX_SEQUENCES {
            return Err(SearchError::TooManySequences {
                count: database.len(),
                max: MAX_SEQUENCES,
            }
            .into());
        }

        info!(
            "Search engine over {} database sequences (word size {}, {:?})",
            database.len(),
            config.hash.word_size,
            config.extension.kind
        );

        Ok(Self {
            clusterer: build_clusterer(&config.seed),
            extender: build_extender(&config.extension),
            filter: build_filter(config.minimum_score),
            pipeline: build_pipeline(&config, &matrix),
            ungapped: config.extension.ungapped.map(UngappedExtension::new),
            index: OnceLock::new(),
            database,
            matrix,
            config,
        })
    }

    pub fn database(&self) -> &[NamedSequence] {
        &self.database
    }

    pub fn matrix(&self) -> &ScoringMatrix {
        &self.matrix
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The word index, built on first call
    pub fn index(&self) -> Result<&HashIndex> {
        if let Some(index) = self.index.get() {
            return Ok(index);
        }
        let built = HashIndex::build(&self.database, &self.config.hash)?;
        Ok(self.index.get_or_init(|| built))
    }

    /// Search both strands of `query`
    pub fn search(&self, query: &NamedSequence) -> Result<Vec<SearchHit>> {
        let index = self.index()?;
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let forward = query.as_bytes();
        let reverse = reverse_complement(forward);

        let mut accepted = Vec::new();
        self.search_strand(index, query, forward, Strand::Plus, &mut accepted)?;
        self.search_strand(index, query, &reverse, Strand::Minus, &mut accepted)?;

        let before = accepted.len();
        let mut seen: FxHashSet<AlignmentKey> = FxHashSet::default();
        accepted.retain(|a: &PairwiseAlignment| {
            seen.insert((
                a.database_id(),
                a.strand(),
                a.database_start(),
                a.database_end(),
                a.query_start(),
                a.query_end(),
            ))
        });
        if accepted.len() < before {
            trace!("Dropped {} duplicate alignments", before - accepted.len());
        }

        let mut hits: Vec<SearchHit> = accepted.into_iter().map(SearchHit::Single).collect();
        for stage in &self.pipeline {
            hits = stage.process(hits);
        }

        debug!("Query {}: {} hits", query.name(), hits.len());
        Ok(hits)
    }

    fn search_strand(
        &self,
        index: &HashIndex,
        query: &NamedSequence,
        sequence: &[u8],
        strand: Strand,
        accepted: &mut Vec<PairwiseAlignment>,
    ) -> Result<()> {
        let raw = collect_seeds(sequence, index);
        let mut seeds = self.clusterer.cluster(&raw, index.geometry())?;
        seeds.sort_by_key(|s| (s.sequence_id, s.database_position, s.query_position));
        debug!(
            "Query {} ({}): {} raw seeds, {} anchors",
            query.name(),
            strand,
            raw.len(),
            seeds.len()
        );

        // (sequence id, 0-based start, exclusive end) of the last accepted alignment
        let mut previous: Option<(u16, usize, usize)> = None;

        for seed in seeds {
            if self.config.skip_overlapping_seeds
                && previous.is_some_and(|(id, start, end)| {
                    id == seed.sequence_id && (start..end).contains(&seed.database_position)
                })
            {
                continue;
            }

            let target = &self.database[seed.sequence_id as usize];
            let database = target.as_bytes();
            let anchor = Anchor::new(seed.database_position, seed.query_position);

            if let Some(ungapped) = &self.ungapped {
                if !ungapped.passes(database, sequence, &self.matrix, anchor) {
                    trace!(
                        "Anchor {}:{} failed the ungapped pre-filter",
                        seed.sequence_id,
                        seed.database_position
                    );
                    continue;
                }
            }

            let local = self
                .extender
                .extend(database, sequence, &self.matrix, anchor, strand)?;
            if local.is_empty() {
                continue;
            }

            let alignment = PairwiseAlignment::new(
                local,
                seed.sequence_id,
                target.shared_name(),
                query.shared_name(),
                strand,
            );
            if !self.filter.is_significant(&alignment) {
                continue;
            }

            previous = Some((
                seed.sequence_id,
                alignment.database_start() - 1,
                alignment.database_end(),
            ));
            accepted.push(alignment);
        }

        Ok(())
    }

    /// Search every query in order, notifying `progress` every
    /// `progress_interval` queries and once at the end
    pub fn search_batch(
        &self,
        queries: &[NamedSequence],
        progress: &dyn ProgressReporter,
    ) -> Result<Vec<QueryResult>> {
        let total = queries.len();
        let interval = self.config.progress_interval;
        let mut results = Vec::with_capacity(total);

        for (i, query) in queries.iter().enumerate() {
            results.push(QueryResult {
                query_name: query.shared_name(),
                query_length: query.len(),
                hits: self.search(query)?,
            });
            let processed = i + 1;
            if interval > 0 && processed % interval == 0 {
                progress.report(processed, total);
            }
        }

        progress.finish(total);
        Ok(results)
    }
}
