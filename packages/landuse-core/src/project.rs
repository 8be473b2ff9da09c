// Planar projector: WGS84 geographic coordinates to a fixed UTM zone.
//
// One zone is chosen per run from the boundary centroid and every
// geometry taking part in an area computation is projected into it
// first. Areas measured in degrees are meaningless and the stage
// contracts make them unreachable through the public pipeline.
//
// The transverse Mercator series below (Snyder, "Map Projections - A
// Working Manual", eq. 8-9..8-25) is accurate to well under a meter
// inside a zone, which is far below the noise floor of the source data.
use geo::{Centroid, MapCoords};
use geo_types::Coord;
use tracing::debug;

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{Boundary, Crs, Feature, FeatureCollection, UtmZone};

// WGS84 ellipsoid.
const A: f64 = 6_378_137.0;
const F: f64 = 1.0 / 298.257_223_563;
// UTM scale factor and false origin.
const K0: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

fn e2() -> f64 {
    F * (2.0 - F)
}

fn ep2() -> f64 {
    let e2 = e2();
    e2 / (1.0 - e2)
}

/// Meridian arc length from the equator to latitude `phi` (radians).
fn meridian_arc(phi: f64) -> f64 {
    let e2 = e2();
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    A * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
        - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
        + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
        - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
}

/// Forward projection of one geographic coordinate into `zone`, in meters.
pub fn lon_lat_to_utm(lon_deg: f64, lat_deg: f64, zone: UtmZone) -> Coord<f64> {
    let e2 = e2();
    let ep2 = ep2();
    let phi = lat_deg.to_radians();
    let dlam = (lon_deg - zone.central_meridian_deg()).to_radians();

    let sin_phi = phi.sin();
    let cos_phi = phi.cos();
    let tan_phi = phi.tan();

    let n = A / (1.0 - e2 * sin_phi * sin_phi).sqrt();
    let t = tan_phi * tan_phi;
    let c = ep2 * cos_phi * cos_phi;
    let a = dlam * cos_phi;
    let m = meridian_arc(phi);

    let easting = FALSE_EASTING
        + K0 * n
            * (a + (1.0 - t + c) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0);

    let mut northing = K0
        * (m + n
            * tan_phi
            * (a * a / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));
    if !zone.north {
        northing += FALSE_NORTHING_SOUTH;
    }

    Coord {
        x: easting,
        y: northing,
    }
}

/// Inverse projection of one UTM coordinate back to (longitude, latitude)
/// in degrees. Used to report record centroids in geographic terms.
pub fn utm_to_lon_lat(coord: Coord<f64>, zone: UtmZone) -> (f64, f64) {
    let e2 = e2();
    let ep2 = ep2();
    let e4 = e2 * e2;
    let e6 = e4 * e2;

    let x = coord.x - FALSE_EASTING;
    let y = if zone.north {
        coord.y
    } else {
        coord.y - FALSE_NORTHING_SOUTH
    };

    // Footpoint latitude from the rectified arc length.
    let m = y / K0;
    let mu = m / (A * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());
    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let sin_phi1 = phi1.sin();
    let cos_phi1 = phi1.cos();
    let tan_phi1 = phi1.tan();

    let c1 = ep2 * cos_phi1 * cos_phi1;
    let t1 = tan_phi1 * tan_phi1;
    let n1 = A / (1.0 - e2 * sin_phi1 * sin_phi1).sqrt();
    let r1 = A * (1.0 - e2) / (1.0 - e2 * sin_phi1 * sin_phi1).powf(1.5);
    let d = x / (n1 * K0);

    let phi = phi1
        - (n1 * tan_phi1 / r1)
            * (d * d / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                    * d.powi(6)
                    / 720.0);
    let dlam = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
        + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d.powi(5)
            / 120.0)
        / cos_phi1;

    (
        zone.central_meridian_deg() + dlam.to_degrees(),
        phi.to_degrees(),
    )
}

/// Pick the run's UTM zone from the boundary's geographic centroid.
pub fn zone_for_boundary(boundary: &Boundary) -> AnalysisResult<UtmZone> {
    if boundary.crs != Crs::Geographic {
        return Err(AnalysisError::CrsMismatch {
            expected: Crs::Geographic,
            found: boundary.crs,
        });
    }
    let centroid = boundary
        .outline
        .centroid()
        .ok_or_else(|| AnalysisError::InvalidBoundary("boundary outline is empty".into()))?;
    Ok(UtmZone::from_lon_lat(centroid.x(), centroid.y()))
}

fn project_feature(feature: Feature, zone: UtmZone) -> Feature {
    Feature {
        geometry: feature
            .geometry
            .map(|g| g.map_coords(|c| lon_lat_to_utm(c.x, c.y, zone))),
        properties: feature.properties,
    }
}

/// Project every geometry of a geographic collection into `zone`.
///
/// Attributes are untouched; only coordinates change. Projecting a
/// collection that is already planar is a contract breach, not a no-op.
pub fn project_collection(
    collection: FeatureCollection,
    zone: UtmZone,
) -> AnalysisResult<FeatureCollection> {
    if collection.crs != Crs::Geographic {
        return Err(AnalysisError::CrsMismatch {
            expected: Crs::Geographic,
            found: collection.crs,
        });
    }
    let features = collection
        .features
        .into_iter()
        .map(|feature| project_feature(feature, zone))
        .collect::<Vec<_>>();
    debug!(count = features.len(), %zone, "projected collection");
    Ok(FeatureCollection {
        crs: Crs::Planar(zone),
        features,
    })
}

/// Project the boundary outline into `zone`.
pub fn project_boundary(boundary: Boundary, zone: UtmZone) -> AnalysisResult<Boundary> {
    if boundary.crs != Crs::Geographic {
        return Err(AnalysisError::CrsMismatch {
            expected: Crs::Geographic,
            found: boundary.crs,
        });
    }
    Ok(Boundary {
        crs: Crs::Planar(zone),
        outline: boundary
            .outline
            .map_coords(|c| lon_lat_to_utm(c.x, c.y, zone)),
        properties: boundary.properties,
    })
}
