//! Land-use composition statistics for a city.
//!
//! Given a city boundary and two categorized feature collections (green
//! spaces and urban areas), this crate repairs invalid geometry,
//! reprojects everything into a single UTM zone, clips the features to
//! the boundary and aggregates the clipped areas into percentages and
//! per-feature records.
//!
//! Data acquisition, map/chart rendering, file persistence and the
//! process entry point are collaborators outside this crate; it only
//! consumes raw features and exposes [`AreaSummary`] and
//! [`CategorizedRecord`] sequences.
//!
//! ```no_run
//! use landuse_core::{analyze, Feature, FeatureCollection};
//! # fn fetch_boundary() -> Feature { unimplemented!() }
//! # fn fetch(_: &str) -> FeatureCollection { unimplemented!() }
//!
//! let boundary = fetch_boundary();
//! let green = fetch("green");
//! let urban = fetch("urban");
//! let output = analyze(boundary, green, urban)?;
//! println!(
//!     "{:.2} km² total, {:.2}% green, {:.2}% urban",
//!     output.summary.total_area_km2(),
//!     output.summary.green_percentage,
//!     output.summary.urban_percentage,
//! );
//! # Ok::<(), landuse_core::AnalysisError>(())
//! ```

// Shared data structures
pub mod models;
// Error types
pub mod error;
// Tag lookup rules per category
pub mod tags;
// Geometry sanitizer stage
pub mod sanitize;
// Planar projector stage
pub mod project;
// Boundary clipper stage
pub mod clip;
// Area aggregator stage
pub mod aggregate;
// Pipeline orchestration
pub mod pipeline;

pub use aggregate::{collection_area_m2, summarize, to_records};
pub use clip::clip_to_boundary;
pub use error::{AnalysisError, AnalysisResult};
pub use models::{
    AreaSummary, Boundary, CategorizedRecord, Crs, DropReason, Feature, FeatureCollection,
    FeatureDrop, TagMap, UtmZone,
};
pub use pipeline::{analyze, AnalysisOutput, AnalysisReport, CategoryReport};
pub use project::{project_boundary, project_collection, zone_for_boundary};
pub use sanitize::{sanitize, sanitize_boundary};
pub use tags::CategoryRules;
