use std::collections::VecDeque;
use std::sync::Arc;

/// Gap symbol used in aligned sequences
pub const GAP: u8 = b'-';

/// Strand of the query an alignment was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Strand {
    #[default]
    Plus,
    /// Reverse complement of the query
    Minus,
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strand::Plus => write!(f, "+"),
            Strand::Minus => write!(f, "-"),
        }
    }
}

/// Trusted seed position an extension is centred on (0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Anchor {
    pub database_position: usize,
    pub query_position: usize,
}

impl Anchor {
    pub fn new(database_position: usize, query_position: usize) -> Self {
        Self {
            database_position,
            query_position,
        }
    }
}

/// Edit operation for traceback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    /// Match (identical residues)
    Match,
    /// Mismatch (different residues)
    Mismatch,
    /// Insertion in query (gap in database)
    Ins,
    /// Deletion from query (gap in query)
    Del,
}

/// Statistics computed from edit script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditStats {
    pub matches: usize,
    pub mismatches: usize,
    pub gap_opens: usize,
    pub alignment_len: usize,
}

/// Compute alignment statistics from edit script
pub fn compute_stats_from_edit_script(edit_script: &[EditOp]) -> EditStats {
    let mut stats = EditStats {
        alignment_len: edit_script.len(),
        ..EditStats::default()
    };
    let mut prev_op: Option<EditOp> = None;

    for &op in edit_script {
        match op {
            EditOp::Match => stats.matches += 1,
            EditOp::Mismatch => stats.mismatches += 1,
            EditOp::Ins | EditOp::Del => {
                if prev_op != Some(op) {
                    stats.gap_opens += 1;
                }
            }
        }
        prev_op = Some(op);
    }

    stats
}

/// Edit script of two gapped, equal-length aligned sequences
pub fn edit_script(database_aligned: &[u8], query_aligned: &[u8]) -> Vec<EditOp> {
    database_aligned
        .iter()
        .zip(query_aligned)
        .map(|(&d, &q)| {
            if d == GAP {
                EditOp::Ins
            } else if q == GAP {
                EditOp::Del
            } else if d.eq_ignore_ascii_case(&q) {
                EditOp::Match
            } else {
                EditOp::Mismatch
            }
        })
        .collect()
}

/// Gapped local alignment of a query against one database sequence.
///
/// Coordinates are 1-based and inclusive. The empty alignment has every
/// coordinate and the score at zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocalAlignment {
    pub database_aligned: Vec<u8>,
    pub query_aligned: Vec<u8>,
    pub score: f64,
    pub database_start: usize,
    pub database_end: usize,
    pub query_start: usize,
    pub query_end: usize,
}

impl LocalAlignment {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.database_aligned.is_empty()
    }

    /// Number of alignment columns
    pub fn len(&self) -> usize {
        self.database_aligned.len()
    }

    /// Translate coordinates computed on sub-ranges back onto the full sequences
    pub fn shifted(mut self, database_offset: usize, query_offset: usize) -> Self {
        if !self.is_empty() {
            self.database_start += database_offset;
            self.database_end += database_offset;
            self.query_start += query_offset;
            self.query_end += query_offset;
        }
        self
    }

    pub fn edit_script(&self) -> Vec<EditOp> {
        edit_script(&self.database_aligned, &self.query_aligned)
    }

    pub fn stats(&self) -> EditStats {
        compute_stats_from_edit_script(&self.edit_script())
    }

    /// Aligned columns with the database symbol first
    pub fn columns(&self) -> impl DoubleEndedIterator<Item = (u8, u8)> + '_ {
        self.database_aligned
            .iter()
            .copied()
            .zip(self.query_aligned.iter().copied())
    }
}

/// Builder for splicing alignment columns onto either end while extending outward from an anchor
#[derive(Debug, Default, Clone)]
pub struct AlignmentBuilder {
    columns: VecDeque<(u8, u8)>,
}

impl AlignmentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn append(&mut self, database: u8, query: u8) {
        self.columns.push_back((database, query));
    }

    pub fn prepend(&mut self, database: u8, query: u8) {
        self.columns.push_front((database, query));
    }

    pub fn append_columns<I: IntoIterator<Item = (u8, u8)>>(&mut self, columns: I) {
        self.columns.extend(columns);
    }

    /// Prepend columns given nearest-first (the order a 5' extension produces them)
    pub fn prepend_columns<I: IntoIterator<Item = (u8, u8)>>(&mut self, columns: I) {
        for (d, q) in columns {
            self.columns.push_front((d, q));
        }
    }

    /// Assemble the alignment; starts are 0-based positions of the first column
    pub fn build(self, score: f64, database_start: usize, query_start: usize) -> LocalAlignment {
        if self.columns.is_empty() {
            return LocalAlignment::empty();
        }
        let (database_aligned, query_aligned): (Vec<u8>, Vec<u8>) =
            self.columns.into_iter().unzip();
        let database_bases = database_aligned.iter().filter(|&&b| b != GAP).count();
        let query_bases = query_aligned.iter().filter(|&&b| b != GAP).count();
        LocalAlignment {
            score,
            database_start: database_start + 1,
            database_end: database_start + database_bases,
            query_start: query_start + 1,
            query_end: query_start + query_bases,
            database_aligned,
            query_aligned,
        }
    }
}

/// Read contract shared by single and composite hits
pub trait Alignment {
    fn score(&self) -> f64;
    fn database_id(&self) -> u16;
    fn database_name(&self) -> &str;
    fn query_name(&self) -> &str;
    fn strand(&self) -> Strand;
    fn database_start(&self) -> usize;
    fn database_end(&self) -> usize;
    fn query_start(&self) -> usize;
    fn query_end(&self) -> usize;
    fn segments(&self) -> &[PairwiseAlignment];
}

/// A local alignment bound to the sequences it was computed on.
///
/// On [`Strand::Minus`] the query coordinates refer to the reverse-complemented
/// query; [`PairwiseAlignment::query_forward_coordinates`] maps them back.
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseAlignment {
    alignment: LocalAlignment,
    database_id: u16,
    database_name: Arc<str>,
    query_name: Arc<str>,
    strand: Strand,
    stats: EditStats,
}

impl PairwiseAlignment {
    pub fn new(
        alignment: LocalAlignment,
        database_id: u16,
        database_name: Arc<str>,
        query_name: Arc<str>,
        strand: Strand,
    ) -> Self {
        let stats = alignment.stats();
        Self {
            alignment,
            database_id,
            database_name,
            query_name,
            strand,
            stats,
        }
    }

    pub fn alignment(&self) -> &LocalAlignment {
        &self.alignment
    }

    /// Same bindings, different columns
    pub fn with_alignment(&self, alignment: LocalAlignment) -> Self {
        Self::new(
            alignment,
            self.database_id,
            Arc::clone(&self.database_name),
            Arc::clone(&self.query_name),
            self.strand,
        )
    }

    pub fn database_aligned(&self) -> &[u8] {
        &self.alignment.database_aligned
    }

    pub fn query_aligned(&self) -> &[u8] {
        &self.alignment.query_aligned
    }

    pub fn matches(&self) -> usize {
        self.stats.matches
    }

    pub fn mismatches(&self) -> usize {
        self.stats.mismatches
    }

    pub fn gap_opens(&self) -> usize {
        self.stats.gap_opens
    }

    pub fn alignment_length(&self) -> usize {
        self.stats.alignment_len
    }

    /// Get the number of gaps (total gap positions, not gap openings)
    pub fn gaps(&self) -> usize {
        self.stats
            .alignment_len
            .saturating_sub(self.stats.matches + self.stats.mismatches)
    }

    /// Calculate percent identity
    pub fn identity(&self) -> f64 {
        if self.stats.alignment_len == 0 {
            return 0.0;
        }
        100.0 * (self.stats.matches as f64) / (self.stats.alignment_len as f64)
    }

    pub fn edit_script(&self) -> Vec<EditOp> {
        self.alignment.edit_script()
    }

    /// Query coordinates on the forward query (1-based, inclusive, start <= end)
    pub fn query_forward_coordinates(&self, query_len: usize) -> (usize, usize) {
        match self.strand {
            Strand::Plus => (self.alignment.query_start, self.alignment.query_end),
            Strand::Minus => (
                query_len + 1 - self.alignment.query_end,
                query_len + 1 - self.alignment.query_start,
            ),
        }
    }
}

impl Alignment for PairwiseAlignment {
    fn score(&self) -> f64 {
        self.alignment.score
    }

    fn database_id(&self) -> u16 {
        self.database_id
    }

    fn database_name(&self) -> &str {
        &self.database_name
    }

    fn query_name(&self) -> &str {
        &self.query_name
    }

    fn strand(&self) -> Strand {
        self.strand
    }

    fn database_start(&self) -> usize {
        self.alignment.database_start
    }

    fn database_end(&self) -> usize {
        self.alignment.database_end
    }

    fn query_start(&self) -> usize {
        self.alignment.query_start
    }

    fn query_end(&self) -> usize {
        self.alignment.query_end
    }

    fn segments(&self) -> &[PairwiseAlignment] {
        std::slice::from_ref(self)
    }
}

/// Collinear partial alignments forming one intron-spanning hit
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeAlignment {
    segments: Vec<PairwiseAlignment>,
}

impl CompositeAlignment {
    /// # Panics
    /// If `segments` is empty.
    pub fn new(segments: Vec<PairwiseAlignment>) -> Self {
        assert!(!segments.is_empty(), "composite alignment without segments");
        Self { segments }
    }

    fn first(&self) -> &PairwiseAlignment {
        &self.segments[0]
    }
}

impl Alignment for CompositeAlignment {
    fn score(&self) -> f64 {
        self.segments.iter().map(|s| s.score()).sum()
    }

    fn database_id(&self) -> u16 {
        self.first().database_id
    }

    fn database_name(&self) -> &str {
        self.first().database_name()
    }

    fn query_name(&self) -> &str {
        self.first().query_name()
    }

    fn strand(&self) -> Strand {
        self.first().strand
    }

    fn database_start(&self) -> usize {
        self.segments.iter().map(|s| s.database_start()).min().unwrap_or(0)
    }

    fn database_end(&self) -> usize {
        self.segments.iter().map(|s| s.database_end()).max().unwrap_or(0)
    }

    fn query_start(&self) -> usize {
        self.segments.iter().map(|s| s.query_start()).min().unwrap_or(0)
    }

    fn query_end(&self) -> usize {
        self.segments.iter().map(|s| s.query_end()).max().unwrap_or(0)
    }

    fn segments(&self) -> &[PairwiseAlignment] {
        &self.segments
    }
}

/// One reported hit: a single alignment or a composite of several
#[derive(Debug, Clone, PartialEq)]
pub enum SearchHit {
    Single(PairwiseAlignment),
    Composite(CompositeAlignment),
}

impl SearchHit {
    pub fn is_composite(&self) -> bool {
        matches!(self, SearchHit::Composite(_))
    }

    fn inner(&self) -> &dyn Alignment {
        match self {
            SearchHit::Single(a) => a,
            SearchHit::Composite(c) => c,
        }
    }
}

impl Alignment for SearchHit {
    fn score(&self) -> f64 {
        self.inner().score()
    }

    fn database_id(&self) -> u16 {
        self.inner().database_id()
    }

    fn database_name(&self) -> &str {
        self.inner().database_name()
    }

    fn query_name(&self) -> &str {
        self.inner().query_name()
    }

    fn strand(&self) -> Strand {
        self.inner().strand()
    }

    fn database_start(&self) -> usize {
        self.inner().database_start()
    }

    fn database_end(&self) -> usize {
        self.inner().database_end()
    }

    fn query_start(&self) -> usize {
        self.inner().query_start()
    }

    fn query_end(&self) -> usize {
        self.inner().query_end()
    }

    fn segments(&self) -> &[PairwiseAlignment] {
        self.inner().segments()
    }
}
