// Area aggregator: turn clipped collections into city-wide percentages
// and one reporting record per feature.
use geo::{Area, Centroid};
use tracing::{info, warn};

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{
    AreaSummary, Boundary, CategorizedRecord, Crs, FeatureCollection, UtmZone,
};
use crate::project::utm_to_lon_lat;
use crate::tags::{first_tag_value, CategoryRules};

/// Sum of planar areas over a collection, in square meters.
///
/// Features without geometry contribute nothing; non-area geometry has
/// zero area by definition. Only meaningful for planar collections.
pub fn collection_area_m2(collection: &FeatureCollection) -> f64 {
    collection
        .features
        .iter()
        .filter_map(|feature| feature.geometry.as_ref())
        .map(|geometry| geometry.unsigned_area())
        .sum()
}

/// Compute the run's composition figures.
///
/// Both collections must already be clipped to `boundary` and share its
/// planar reference; area sums over geographic degrees are meaningless,
/// so mismatched frames are rejected here like at every other stage.
/// A zero-area boundary yields zero percentages and a summary flagged
/// degenerate via [`AreaSummary::is_degenerate`]; it never produces NaN
/// or negative values.
pub fn summarize(
    boundary: &Boundary,
    green_clipped: &FeatureCollection,
    urban_clipped: &FeatureCollection,
) -> AnalysisResult<AreaSummary> {
    if !boundary.crs.is_planar() {
        return Err(AnalysisError::InvalidBoundary(
            "boundary must be in a planar reference before summarizing".into(),
        ));
    }
    for collection in [green_clipped, urban_clipped] {
        if collection.crs != boundary.crs {
            return Err(AnalysisError::CrsMismatch {
                expected: boundary.crs,
                found: collection.crs,
            });
        }
    }

    let total = boundary.outline.unsigned_area();
    let green = collection_area_m2(green_clipped);
    let urban = collection_area_m2(urban_clipped);

    let (green_percentage, urban_percentage) = if total > 0.0 {
        (100.0 * green / total, 100.0 * urban / total)
    } else {
        warn!("boundary has zero area; reporting degenerate summary");
        (0.0, 0.0)
    };

    Ok(AreaSummary {
        total_boundary_area_m2: total,
        green_area_m2: green,
        urban_area_m2: urban,
        green_percentage,
        urban_percentage,
    })
}

/// Produce one [`CategorizedRecord`] per clipped feature, in order.
///
/// Every feature yields exactly one record, zero-area degenerates
/// included. The representative point is the planar centroid of the
/// clipped geometry, reported back in geographic coordinates. A feature
/// whose geometry is absent or empty at this stage is an upstream
/// contract breach and fails the run.
pub fn to_records(
    clipped: &FeatureCollection,
    rules: &CategoryRules,
    zone: UtmZone,
) -> AnalysisResult<Vec<CategorizedRecord>> {
    if clipped.crs != Crs::Planar(zone) {
        return Err(AnalysisError::CrsMismatch {
            expected: Crs::Planar(zone),
            found: clipped.crs,
        });
    }

    let mut records = Vec::with_capacity(clipped.len());
    for (index, feature) in clipped.features.iter().enumerate() {
        let geometry = feature
            .geometry
            .as_ref()
            .ok_or(AnalysisError::MissingGeometry { index })?;

        // The clipper never emits empty geometry, so an absent centroid
        // means the collection did not come through it.
        let centroid = geometry
            .centroid()
            .ok_or(AnalysisError::MissingGeometry { index })?;
        let (longitude, latitude) = utm_to_lon_lat(centroid.into(), zone);

        let display_name = first_tag_value(&feature.properties, rules.name_keys)
            .unwrap_or_else(|| format!("{} {}", rules.singular, index));
        let category_label = first_tag_value(&feature.properties, rules.category_keys)
            .unwrap_or_else(|| rules.fallback_category.to_string());

        records.push(CategorizedRecord {
            display_name,
            category_label,
            latitude,
            longitude,
            area_m2: geometry.unsigned_area(),
        });
    }

    info!(count = records.len(), category = rules.singular, "built records");
    Ok(records)
}
