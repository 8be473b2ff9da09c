// Shared data structures for the land-use analysis pipeline.
use std::collections::HashMap;
use std::fmt;

use geo_types::{Geometry, MultiPolygon};
use serde::{Deserialize, Serialize};

/// Free-form attribute mapping attached to a feature (OSM-style tags).
pub type TagMap = HashMap<String, serde_json::Value>;

/// A UTM zone, the planar reference used for all area computation in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmZone {
    pub zone: u8,
    pub north: bool,
}

impl UtmZone {
    /// Zone containing the given geographic coordinate.
    pub fn from_lon_lat(lon: f64, lat: f64) -> Self {
        let zone = (((lon + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u8;
        UtmZone {
            zone,
            north: lat >= 0.0,
        }
    }

    /// Central meridian of the zone in degrees.
    pub fn central_meridian_deg(&self) -> f64 {
        -183.0 + 6.0 * self.zone as f64
    }

    /// EPSG code of the matching WGS84 / UTM CRS (326xx north, 327xx south).
    pub fn epsg(&self) -> u32 {
        if self.north {
            32600 + self.zone as u32
        } else {
            32700 + self.zone as u32
        }
    }
}

impl fmt::Display for UtmZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UTM zone {}{}",
            self.zone,
            if self.north { 'N' } else { 'S' }
        )
    }
}

/// Reference frame of a collection or boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Crs {
    /// WGS84 longitude/latitude in degrees. Areas are undefined here.
    Geographic,
    /// Projected UTM coordinates in meters.
    Planar(UtmZone),
}

impl Crs {
    pub fn is_planar(&self) -> bool {
        matches!(self, Crs::Planar(_))
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Geographic => write!(f, "WGS84 geographic"),
            Crs::Planar(zone) => write!(f, "{}", zone),
        }
    }
}

/// A geometry plus its attribute tags, as returned by the data source.
///
/// The geometry is optional because the source may return tag-only
/// elements; the sanitizer drops those. Attributes are never mutated by
/// any pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub geometry: Option<Geometry<f64>>,
    #[serde(default)]
    pub properties: TagMap,
}

impl Feature {
    pub fn new(geometry: Option<Geometry<f64>>, properties: TagMap) -> Self {
        Feature {
            geometry,
            properties,
        }
    }

    pub fn tag(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }
}

/// An ordered sequence of features sharing one reference frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection {
    pub crs: Crs,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(crs: Crs, features: Vec<Feature>) -> Self {
        FeatureCollection { crs, features }
    }

    pub fn empty(crs: Crs) -> Self {
        FeatureCollection {
            crs,
            features: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// The city outline used as the reference geometry for clipping.
///
/// Construction goes through [`sanitize_boundary`](crate::sanitize::sanitize_boundary),
/// so a `Boundary` always holds a valid, non-empty multipolygon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boundary {
    pub crs: Crs,
    pub outline: MultiPolygon<f64>,
    pub properties: TagMap,
}

/// Why a feature was excluded by a pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropReason {
    /// No geometry attached to the feature.
    MissingGeometry,
    /// Invalid geometry that zero-distance buffering could not repair.
    Irreparable,
    /// Point or line geometry, which carries no area.
    NonArea,
    /// Empty intersection with the city boundary.
    OutsideBoundary,
}

/// Record of a skip-and-continue decision, so drops stay observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDrop {
    /// Position of the feature in the stage's input collection.
    pub index: usize,
    pub reason: DropReason,
    /// Whether the geometry passed validation before any repair attempt.
    pub was_valid: bool,
}

/// One reporting row per clipped feature: where it is, what it is, and
/// how much of the city it covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedRecord {
    pub display_name: String,
    pub category_label: String,
    pub latitude: f64,
    pub longitude: f64,
    pub area_m2: f64,
}

/// City-wide composition figures for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSummary {
    pub total_boundary_area_m2: f64,
    pub green_area_m2: f64,
    pub urban_area_m2: f64,
    pub green_percentage: f64,
    pub urban_percentage: f64,
}

impl AreaSummary {
    /// True when the boundary carried no area, in which case both
    /// percentages are defined as zero rather than computed.
    pub fn is_degenerate(&self) -> bool {
        self.total_boundary_area_m2 <= 0.0
    }

    /// Area of the city covered by neither category.
    pub fn other_area_m2(&self) -> f64 {
        (self.total_boundary_area_m2 - self.green_area_m2 - self.urban_area_m2).max(0.0)
    }

    pub fn total_area_km2(&self) -> f64 {
        self.total_boundary_area_m2 / 1e6
    }
}

/// Restrict a geometry to the area-bearing subtype set.
///
/// Returns the polygonal content as a multipolygon, or `None` for
/// points, lines and other non-area subtypes.
pub fn area_geometry(geometry: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(polygon) => Some(MultiPolygon::new(vec![polygon.clone()])),
        Geometry::MultiPolygon(multi) => Some(multi.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{LineString, Point, Polygon};

    fn unit_square() -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]),
            vec![],
        )
    }

    #[test]
    fn utm_zone_from_longitude() {
        // Central meridian of zone 29 is 9°W.
        let zone = UtmZone::from_lon_lat(-9.0, 35.0);
        assert_eq!(zone.zone, 29);
        assert!(zone.north);
        assert_eq!(zone.central_meridian_deg(), -9.0);
        assert_eq!(zone.epsg(), 32629);

        let south = UtmZone::from_lon_lat(151.2, -33.9);
        assert_eq!(south.zone, 56);
        assert!(!south.north);
        assert_eq!(south.epsg(), 32756);
    }

    #[test]
    fn utm_zone_clamps_at_antimeridian() {
        assert_eq!(UtmZone::from_lon_lat(-180.0, 0.0).zone, 1);
        assert_eq!(UtmZone::from_lon_lat(180.0, 0.0).zone, 60);
    }

    #[test]
    fn area_geometry_keeps_polygonal_subtypes_only() {
        assert!(area_geometry(&Geometry::Polygon(unit_square())).is_some());
        assert!(
            area_geometry(&Geometry::MultiPolygon(MultiPolygon::new(vec![unit_square()])))
                .is_some()
        );
        assert!(area_geometry(&Geometry::Point(Point::new(0.0, 0.0))).is_none());
        assert!(area_geometry(&Geometry::LineString(LineString::from(vec![
            (0.0, 0.0),
            (1.0, 1.0)
        ])))
        .is_none());
    }

    #[test]
    fn degenerate_summary_is_flagged() {
        let summary = AreaSummary {
            total_boundary_area_m2: 0.0,
            green_area_m2: 0.0,
            urban_area_m2: 0.0,
            green_percentage: 0.0,
            urban_percentage: 0.0,
        };
        assert!(summary.is_degenerate());
        assert_eq!(summary.other_area_m2(), 0.0);
    }
}
