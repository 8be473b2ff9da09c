// Boundary clipper: restrict each feature to the part of the city it
// actually covers.
//
// Only polygonal geometry is clipped; points and lines carry no area
// and are filtered out first. Clipping is a set-intersection against
// the boundary outline, so a feature straddling the city edge keeps the
// inside portion and a feature entirely outside disappears.
use geo::BooleanOps;
use geo_types::Geometry;
use tracing::{debug, info};

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{
    area_geometry, Boundary, DropReason, Feature, FeatureCollection, FeatureDrop,
};

/// Intersect every feature of `collection` with the boundary outline.
///
/// The collection and the boundary must share the same planar reference;
/// clipping in geographic coordinates would poison every downstream area
/// figure. An empty input collection yields an empty output, which is a
/// legitimate result and not an error.
pub fn clip_to_boundary(
    collection: FeatureCollection,
    boundary: &Boundary,
) -> AnalysisResult<(FeatureCollection, Vec<FeatureDrop>)> {
    if !boundary.crs.is_planar() {
        return Err(AnalysisError::InvalidBoundary(
            "boundary must be in a planar reference before clipping".into(),
        ));
    }
    if collection.crs != boundary.crs {
        return Err(AnalysisError::CrsMismatch {
            expected: boundary.crs,
            found: collection.crs,
        });
    }

    let crs = collection.crs;
    let mut kept = Vec::with_capacity(collection.features.len());
    let mut drops = Vec::new();

    for (index, feature) in collection.features.into_iter().enumerate() {
        let geometry = match feature.geometry {
            Some(geometry) => geometry,
            None => {
                drops.push(FeatureDrop {
                    index,
                    reason: DropReason::MissingGeometry,
                    was_valid: false,
                });
                continue;
            }
        };

        let multi = match area_geometry(&geometry) {
            Some(multi) => multi,
            None => {
                debug!(index, "dropping non-area geometry before clipping");
                drops.push(FeatureDrop {
                    index,
                    reason: DropReason::NonArea,
                    was_valid: true,
                });
                continue;
            }
        };

        let clipped = boundary.outline.intersection(&multi);
        if clipped.0.is_empty() {
            debug!(index, "dropping feature outside the boundary");
            drops.push(FeatureDrop {
                index,
                reason: DropReason::OutsideBoundary,
                was_valid: true,
            });
            continue;
        }

        kept.push(Feature {
            geometry: Some(Geometry::MultiPolygon(clipped)),
            properties: feature.properties,
        });
    }

    info!(kept = kept.len(), dropped = drops.len(), "clipped collection");
    Ok((FeatureCollection { crs, features: kept }, drops))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Crs, UtmZone};
    use crate::sanitize::boundary_from_parts;
    use geo::{Area, Contains};
    use geo_types::{LineString, MultiPolygon, Point, Polygon};
    use std::collections::HashMap;

    fn square(x: f64, y: f64, side: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (x, y),
                (x + side, y),
                (x + side, y + side),
                (x, y + side),
                (x, y),
            ]),
            vec![],
        )
    }

    fn planar_crs() -> Crs {
        Crs::Planar(UtmZone {
            zone: 30,
            north: true,
        })
    }

    fn boundary(side: f64) -> Boundary {
        boundary_from_parts(
            planar_crs(),
            MultiPolygon::new(vec![square(0.0, 0.0, side)]),
            HashMap::new(),
        )
        .unwrap()
    }

    fn feature(geometry: Geometry<f64>) -> Feature {
        Feature::new(Some(geometry), HashMap::new())
    }

    #[test]
    fn fully_contained_feature_keeps_its_area() {
        let inner = square(10.0, 10.0, 20.0);
        let before = inner.unsigned_area();
        let collection =
            FeatureCollection::new(planar_crs(), vec![feature(Geometry::Polygon(inner))]);

        let (clipped, drops) = clip_to_boundary(collection, &boundary(100.0)).unwrap();
        assert!(drops.is_empty());
        assert_eq!(clipped.len(), 1);

        let after = clipped.features[0]
            .geometry
            .as_ref()
            .unwrap()
            .unsigned_area();
        assert!((before - after).abs() < 1e-9, "{} vs {}", before, after);
    }

    #[test]
    fn straddling_feature_is_truncated_to_the_inside() {
        // Half inside the 100x100 boundary, half outside.
        let straddling = square(50.0, -50.0, 100.0);
        let collection =
            FeatureCollection::new(planar_crs(), vec![feature(Geometry::Polygon(straddling))]);

        let (clipped, drops) = clip_to_boundary(collection, &boundary(100.0)).unwrap();
        assert!(drops.is_empty());
        let after = clipped.features[0]
            .geometry
            .as_ref()
            .unwrap()
            .unsigned_area();
        assert!((after - 2500.0).abs() < 1e-6, "clipped area {}", after);
    }

    #[test]
    fn clipped_geometry_is_contained_in_the_boundary() {
        let boundary = boundary(100.0);
        let collection = FeatureCollection::new(
            planar_crs(),
            vec![
                feature(Geometry::Polygon(square(-20.0, -20.0, 60.0))),
                feature(Geometry::Polygon(square(80.0, 80.0, 60.0))),
            ],
        );
        let (clipped, _) = clip_to_boundary(collection, &boundary).unwrap();
        // Grow the boundary marginally so exact shared edges count as inside.
        let hull = square(-1e-6, -1e-6, 100.0 + 2e-6);
        for feature in &clipped.features {
            match feature.geometry.as_ref().unwrap() {
                Geometry::MultiPolygon(multi) => {
                    for polygon in &multi.0 {
                        assert!(hull.contains(polygon), "escaped the boundary");
                    }
                }
                other => panic!("unexpected geometry {:?}", other),
            }
        }
    }

    #[test]
    fn disjoint_feature_is_dropped() {
        let outside = square(500.0, 500.0, 10.0);
        let collection =
            FeatureCollection::new(planar_crs(), vec![feature(Geometry::Polygon(outside))]);

        let (clipped, drops) = clip_to_boundary(collection, &boundary(100.0)).unwrap();
        assert!(clipped.is_empty());
        assert_eq!(drops.len(), 1);
        assert_eq!(drops[0].reason, DropReason::OutsideBoundary);
    }

    #[test]
    fn points_and_lines_are_filtered_out() {
        let collection = FeatureCollection::new(
            planar_crs(),
            vec![
                feature(Geometry::Point(Point::new(50.0, 50.0))),
                feature(Geometry::LineString(LineString::from(vec![
                    (10.0, 10.0),
                    (90.0, 90.0),
                ]))),
                feature(Geometry::Polygon(square(10.0, 10.0, 10.0))),
            ],
        );
        let (clipped, drops) = clip_to_boundary(collection, &boundary(100.0)).unwrap();
        assert_eq!(clipped.len(), 1);
        assert_eq!(drops.len(), 2);
        assert!(drops.iter().all(|d| d.reason == DropReason::NonArea));
    }

    #[test]
    fn empty_collection_clips_to_empty() {
        let collection = FeatureCollection::empty(planar_crs());
        let (clipped, drops) = clip_to_boundary(collection, &boundary(100.0)).unwrap();
        assert!(clipped.is_empty());
        assert!(drops.is_empty());
    }

    #[test]
    fn geographic_collection_is_rejected() {
        let collection = FeatureCollection::empty(Crs::Geographic);
        let err = clip_to_boundary(collection, &boundary(100.0)).unwrap_err();
        assert!(matches!(err, AnalysisError::CrsMismatch { .. }));
    }

    #[test]
    fn geographic_boundary_is_rejected() {
        let geographic = Boundary {
            crs: Crs::Geographic,
            outline: MultiPolygon::new(vec![square(0.0, 0.0, 1.0)]),
            properties: HashMap::new(),
        };
        let collection = FeatureCollection::empty(planar_crs());
        let err = clip_to_boundary(collection, &geographic).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidBoundary(_)));
    }
}
