use crate::models::Crs;
use thiserror::Error;

/// Errors that abort an analysis run.
///
/// Per-feature data-quality problems (missing, irreparable, non-area or
/// out-of-boundary geometry) are not errors; they are recorded as
/// [`FeatureDrop`](crate::models::FeatureDrop) entries and the run continues.
/// The variants here signal that the run as a whole cannot produce
/// trustworthy statistics.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The city boundary is missing, empty, non-polygonal or irreparable.
    #[error("invalid boundary: {0}")]
    InvalidBoundary(String),

    /// A stage received geometry in the wrong reference frame.
    #[error("CRS mismatch: expected {expected}, found {found}")]
    CrsMismatch { expected: Crs, found: Crs },

    /// A clipped feature reached the aggregator without usable geometry,
    /// either absent or empty. The clipper guarantees non-empty geometry,
    /// so this is an upstream invariant breach, not a data-quality drop.
    #[error("feature {index} has no geometry after clipping")]
    MissingGeometry { index: usize },
}

/// Convenience alias for results using [`AnalysisError`].
pub type AnalysisResult<T> = Result<T, AnalysisError>;
