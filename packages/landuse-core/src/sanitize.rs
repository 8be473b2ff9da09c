// Geometry sanitizer: repair invalid polygonal geometry, drop features
// whose geometry is absent or beyond repair.
//
// Repair follows the zero-distance-buffer recipe, the standard
// best-effort fix for self-intersections and ring-orientation defects.
// It carries no universal correctness guarantee, so the result is
// re-validated and the pre-repair validity is kept on the drop record.
use geo::{BooleanOps, Validation};
use geo_types::{Geometry, MultiPolygon};
use tracing::{debug, info};

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{
    area_geometry, Boundary, Crs, DropReason, Feature, FeatureCollection, FeatureDrop, TagMap,
};

/// Best-effort repair of an invalid geometry into valid polygonal form.
///
/// Returns `None` when the geometry has no polygonal content or when the
/// repaired result is still empty or invalid.
pub fn repair_geometry(geometry: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    let multi = area_geometry(geometry)?;
    // A self-union rewrites the ring graph through the overlay backend,
    // the same resolution a zero-distance buffer performs: crossings are
    // split, orientation is fixed, the covered area stays put.
    let repaired = multi.union(&multi);
    if repaired.0.is_empty() || !repaired.is_valid() {
        return None;
    }
    Some(repaired)
}

/// Drop features without geometry and repair or drop invalid polygonal
/// ones.
///
/// Surviving features keep their order, attributes and reference frame.
/// Non-area subtypes pass through untouched whether valid or not; the
/// clipper owns their classification.
/// This stage never fails: every irreparable geometry becomes a
/// [`FeatureDrop`], not an error.
pub fn sanitize(collection: FeatureCollection) -> (FeatureCollection, Vec<FeatureDrop>) {
    let crs = collection.crs;
    let mut kept = Vec::with_capacity(collection.features.len());
    let mut drops = Vec::new();

    for (index, feature) in collection.features.into_iter().enumerate() {
        let geometry = match feature.geometry {
            Some(geometry) => geometry,
            None => {
                debug!(index, "dropping feature without geometry");
                drops.push(FeatureDrop {
                    index,
                    reason: DropReason::MissingGeometry,
                    was_valid: false,
                });
                continue;
            }
        };

        // Non-area subtypes are the clipper's concern, whatever their
        // validity; classifying them here would make the drop reason
        // depend on which stage saw them first.
        if geometry.is_valid() || area_geometry(&geometry).is_none() {
            kept.push(Feature {
                geometry: Some(geometry),
                properties: feature.properties,
            });
            continue;
        }

        match repair_geometry(&geometry) {
            Some(repaired) => {
                debug!(index, "repaired invalid geometry");
                kept.push(Feature {
                    geometry: Some(Geometry::MultiPolygon(repaired)),
                    properties: feature.properties,
                });
            }
            None => {
                debug!(index, "dropping irreparable geometry");
                drops.push(FeatureDrop {
                    index,
                    reason: DropReason::Irreparable,
                    was_valid: false,
                });
            }
        }
    }

    info!(kept = kept.len(), dropped = drops.len(), "sanitized collection");
    (FeatureCollection { crs, features: kept }, drops)
}

/// Build the city boundary from a raw source feature.
///
/// The boundary is the reference geometry for every downstream area
/// figure, so unlike ordinary features it cannot be silently dropped:
/// missing, non-polygonal or irreparable outlines are errors.
pub fn sanitize_boundary(feature: Feature) -> AnalysisResult<Boundary> {
    let geometry = feature
        .geometry
        .ok_or_else(|| AnalysisError::InvalidBoundary("boundary has no geometry".into()))?;

    let outline = if geometry.is_valid() {
        area_geometry(&geometry).ok_or_else(|| {
            AnalysisError::InvalidBoundary("boundary geometry is not polygonal".into())
        })?
    } else {
        repair_geometry(&geometry).ok_or_else(|| {
            AnalysisError::InvalidBoundary("boundary geometry is irreparable".into())
        })?
    };

    Ok(Boundary {
        crs: Crs::Geographic,
        outline,
        properties: feature.properties,
    })
}

/// Boundary constructor for already-projected outlines, used by tests
/// and by callers that source planar geometry directly.
pub fn boundary_from_parts(
    crs: Crs,
    outline: MultiPolygon<f64>,
    properties: TagMap,
) -> AnalysisResult<Boundary> {
    if outline.0.is_empty() {
        return Err(AnalysisError::InvalidBoundary(
            "boundary outline is empty".into(),
        ));
    }
    if !outline.is_valid() {
        return Err(AnalysisError::InvalidBoundary(
            "boundary outline is invalid".into(),
        ));
    }
    Ok(Boundary {
        crs,
        outline,
        properties,
    })
}
