//! Anchored extension strategies
//!
//! Every strategy trusts the anchor to be a true match and bounds dynamic
//! programming to the region around it. The windowed strategies align the whole
//! query against a database window sized by [`window::database_window`]; the banded
//! ones grow the alignment outward from the anchor chunk by chunk and hand short
//! queries to their windowed counterpart.

use super::homopolymer::{self, HomopolymerModel};
use super::result::{Anchor, LocalAlignment, Strand};
use super::sw_banded::{self, ChunkModel};
use super::sw_gotoh::{self, DpMode};
use super::window;
use crate::config::{BandedConfig, ExtenderKind, ExtensionConfig, HomopolymerConfig};
use crate::utils::matrix::ScoringMatrix;
use anyhow::Result;

/// Turns an anchor into a scored local alignment
pub trait Extender: Send + Sync {
    /// Extend `anchor` into a local alignment with 1-based coordinates on the full sequences.
    ///
    /// Empty sequences give [`LocalAlignment::empty`].
    ///
    /// # Panics
    /// If the anchor lies outside either sequence.
    fn extend(
        &self,
        database: &[u8],
        query: &[u8],
        matrix: &ScoringMatrix,
        anchor: Anchor,
        strand: Strand,
    ) -> Result<LocalAlignment>;
}

/// Construct the extender selected by `config.kind`
pub fn build_extender(config: &ExtensionConfig) -> Box<dyn Extender> {
    let windowed = AnchoredSmithWatermanGotoh {
        max_window_shift: config.max_window_shift,
    };
    let homopolymer = AnchoredHomopolymerSmithWatermanGotoh {
        max_window_shift: config.max_window_shift,
        homopolymer: config.homopolymer,
    };
    match config.kind {
        ExtenderKind::SmithWatermanGotoh => Box::new(windowed),
        ExtenderKind::HomopolymerSmithWatermanGotoh => Box::new(homopolymer),
        ExtenderKind::BandedSmithWatermanGotoh => Box::new(AnchoredBandedSmithWatermanGotoh {
            banded: config.banded,
            fallback: windowed,
        }),
        ExtenderKind::BandedHomopolymerSmithWatermanGotoh => {
            Box::new(AnchoredBandedHomopolymerSmithWatermanGotoh {
                banded: config.banded,
                fallback: homopolymer,
            })
        }
    }
}

fn check_anchor(database: &[u8], query: &[u8], anchor: Anchor) {
    assert!(
        anchor.database_position < database.len() && anchor.query_position < query.len(),
        "anchor {}:{} outside sequences of length {} and {}",
        anchor.database_position,
        anchor.query_position,
        database.len(),
        query.len()
    );
}

/// Affine local alignment of the whole query against a window around the anchor
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchoredSmithWatermanGotoh {
    pub max_window_shift: Option<usize>,
}

impl Extender for AnchoredSmithWatermanGotoh {
    fn extend(
        &self,
        database: &[u8],
        query: &[u8],
        matrix: &ScoringMatrix,
        anchor: Anchor,
        _strand: Strand,
    ) -> Result<LocalAlignment> {
        if database.is_empty() || query.is_empty() {
            return Ok(LocalAlignment::empty());
        }
        check_anchor(database, query, anchor);

        let range = window::database_window(
            database.len(),
            query.len(),
            anchor,
            matrix,
            self.max_window_shift,
        );
        let start = range.start;
        let alignment = sw_gotoh::align(&database[range], query, matrix, DpMode::Local)?;
        Ok(alignment.shifted(start, 0))
    }
}

/// Windowed local alignment under the homopolymer gap model
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchoredHomopolymerSmithWatermanGotoh {
    pub max_window_shift: Option<usize>,
    pub homopolymer: HomopolymerConfig,
}

impl Extender for AnchoredHomopolymerSmithWatermanGotoh {
    fn extend(
        &self,
        database: &[u8],
        query: &[u8],
        matrix: &ScoringMatrix,
        anchor: Anchor,
        _strand: Strand,
    ) -> Result<LocalAlignment> {
        if database.is_empty() || query.is_empty() {
            return Ok(LocalAlignment::empty());
        }
        check_anchor(database, query, anchor);

        let model = HomopolymerModel::new(matrix, &self.homopolymer);
        let range = window::database_window(
            database.len(),
            query.len(),
            anchor,
            matrix,
            self.max_window_shift,
        );
        let start = range.start;
        let alignment =
            homopolymer::align(&database[range], query, matrix, &model, DpMode::Local)?;
        Ok(alignment.shifted(start, 0))
    }
}

/// Chunked extension with plain affine chunks
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchoredBandedSmithWatermanGotoh {
    pub banded: BandedConfig,
    pub fallback: AnchoredSmithWatermanGotoh,
}

impl Extender for AnchoredBandedSmithWatermanGotoh {
    fn extend(
        &self,
        database: &[u8],
        query: &[u8],
        matrix: &ScoringMatrix,
        anchor: Anchor,
        strand: Strand,
    ) -> Result<LocalAlignment> {
        if query.len() <= self.banded.activation_threshold {
            return self.fallback.extend(database, query, matrix, anchor, strand);
        }
        if database.is_empty() {
            return Ok(LocalAlignment::empty());
        }
        check_anchor(database, query, anchor);
        sw_banded::extend_with_traceback(
            database,
            query,
            matrix,
            anchor,
            ChunkModel::Gotoh,
            &self.banded,
        )
    }
}

/// Chunked extension with homopolymer-aware chunks.
///
/// On the minus strand each chunk is aligned on its reversed fragments so the
/// penalties decay from the run ends the read was actually sequenced from.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchoredBandedHomopolymerSmithWatermanGotoh {
    pub banded: BandedConfig,
    pub fallback: AnchoredHomopolymerSmithWatermanGotoh,
}

impl Extender for AnchoredBandedHomopolymerSmithWatermanGotoh {
    fn extend(
        &self,
        database: &[u8],
        query: &[u8],
        matrix: &ScoringMatrix,
        anchor: Anchor,
        strand: Strand,
    ) -> Result<LocalAlignment> {
        if query.len() <= self.banded.activation_threshold {
            return self.fallback.extend(database, query, matrix, anchor, strand);
        }
        if database.is_empty() {
            return Ok(LocalAlignment::empty());
        }
        check_anchor(database, query, anchor);

        let model = ChunkModel::Homopolymer {
            model: HomopolymerModel::new(matrix, &self.fallback.homopolymer),
            reverse: strand == Strand::Minus,
        };
        sw_banded::extend_with_traceback(database, query, matrix, anchor, model, &self.banded)
    }
}
