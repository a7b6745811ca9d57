//! Anchored extension of seeds into scored alignments

pub mod extender;
pub mod homopolymer;
pub mod result;
pub mod sw_banded;
pub mod sw_gotoh;
pub mod traceback;
pub mod ungapped;
pub mod window;

pub use extender::{
    build_extender, AnchoredBandedHomopolymerSmithWatermanGotoh,
    AnchoredBandedSmithWatermanGotoh, AnchoredHomopolymerSmithWatermanGotoh,
    AnchoredSmithWatermanGotoh, Extender,
};
pub use homopolymer::{GapProfile, HomopolymerModel};
pub use result::{
    Alignment, AlignmentBuilder, Anchor, CompositeAlignment, EditOp, LocalAlignment,
    PairwiseAlignment, SearchHit, Strand,
};
pub use sw_gotoh::DpMode;
pub use ungapped::UngappedExtension;
