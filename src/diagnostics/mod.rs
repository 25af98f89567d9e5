//! Serializable reports emitted by the edge extractor, the refinement
//! session and the command line tools.

pub mod edges;
pub mod refine;
pub mod timing;

pub use edges::EdgeReport;
pub use refine::{PoseOutcome, RefinementReport};
pub use timing::{elapsed_ms, StageTiming, TimingBreakdown};
