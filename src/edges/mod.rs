//! Edge extraction on depth frames.
//!
//! Two complementary detectors feed the final edge map:
//!
//! - [`curvature`]: Canny-style edges on the surface normal field (creases,
//!   folds), built from [`grad`] Sobel derivatives, [`nms`] orientation-aware
//!   suppression and [`hysteresis`] linking.
//! - [`occlusion`]: depth discontinuities, including boundaries next to
//!   missing data.
//!
//! [`DepthEdgeExtractor`] composes both with a logical OR.
//!
//! Design goals
//! - Deterministic output: every stage is a pure function of its input.
//! - Borders are explicit: the outer frame never carries NMS responses and
//!   the normal ring margin stays invalid.

pub mod curvature;
pub mod depth;
pub mod grad;
pub mod hysteresis;
pub mod nms;
pub mod occlusion;

pub use curvature::{CurvatureEdgeDetector, CurvatureParams, CurvatureResponse};
pub use depth::{DepthEdgeExtractor, DepthEdges, EdgeParams};
pub use grad::{gradient_magnitude, sobel, SobelAxis};
pub use hysteresis::trace_edges;
pub use nms::{quantize_orientations, suppress_non_maxima};
pub use occlusion::{OcclusionEdgeDetector, OcclusionParams};
