// Sequential orchestration of the four pipeline stages.
//
// Each stage fully consumes its input before the next begins; there is
// no streaming and no shared state between runs. Per-feature drops are
// collected into the report so the skip-and-continue policy stays
// observable, while boundary problems and contract breaches abort the
// run instead of producing partially-wrong statistics.
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::{summarize, to_records};
use crate::clip::clip_to_boundary;
use crate::error::AnalysisResult;
use crate::models::{
    AreaSummary, Boundary, CategorizedRecord, Feature, FeatureCollection, FeatureDrop, UtmZone,
};
use crate::project::{project_boundary, project_collection, zone_for_boundary};
use crate::sanitize::{sanitize, sanitize_boundary};
use crate::tags::CategoryRules;

/// Drops recorded for one category while it moved through the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryReport {
    pub sanitize_drops: Vec<FeatureDrop>,
    pub clip_drops: Vec<FeatureDrop>,
    /// Features remaining after clipping; equals the record count.
    pub surviving: usize,
}

/// What happened during a run, alongside the statistics themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub zone: UtmZone,
    pub green: CategoryReport,
    pub urban: CategoryReport,
}

/// Complete output of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub summary: AreaSummary,
    pub green_records: Vec<CategorizedRecord>,
    pub urban_records: Vec<CategorizedRecord>,
    pub report: AnalysisReport,
}

fn run_category(
    raw: FeatureCollection,
    boundary: &Boundary,
    zone: UtmZone,
) -> AnalysisResult<(FeatureCollection, CategoryReport)> {
    let (sanitized, sanitize_drops) = sanitize(raw);
    let projected = project_collection(sanitized, zone)?;
    let (clipped, clip_drops) = clip_to_boundary(projected, boundary)?;
    let surviving = clipped.len();
    Ok((
        clipped,
        CategoryReport {
            sanitize_drops,
            clip_drops,
            surviving,
        },
    ))
}

/// Run the whole pipeline on raw geographic inputs.
///
/// `boundary` is the city outline feature; `green` and `urban` are the
/// two category collections, all in WGS84 longitude/latitude as supplied
/// by the data source. The UTM zone is derived from the boundary
/// centroid and used for every geometry in the run.
pub fn analyze(
    boundary: Feature,
    green: FeatureCollection,
    urban: FeatureCollection,
) -> AnalysisResult<AnalysisOutput> {
    let boundary = sanitize_boundary(boundary)?;
    let zone = zone_for_boundary(&boundary)?;
    info!(%zone, "analyzing city land-use composition");
    let boundary = project_boundary(boundary, zone)?;

    let (green_clipped, green_report) = run_category(green, &boundary, zone)?;
    let (urban_clipped, urban_report) = run_category(urban, &boundary, zone)?;

    let summary = summarize(&boundary, &green_clipped, &urban_clipped)?;
    let green_records = to_records(&green_clipped, &CategoryRules::green_spaces(), zone)?;
    let urban_records = to_records(&urban_clipped, &CategoryRules::urban_areas(), zone)?;

    info!(
        total_km2 = summary.total_area_km2(),
        green_pct = summary.green_percentage,
        urban_pct = summary.urban_percentage,
        degenerate = summary.is_degenerate(),
        "analysis complete"
    );

    Ok(AnalysisOutput {
        summary,
        green_records,
        urban_records,
        report: AnalysisReport {
            zone,
            green: green_report,
            urban: urban_report,
        },
    })
}
