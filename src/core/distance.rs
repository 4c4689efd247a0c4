use crate::models::BoundingBox;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree of latitude (and of longitude at the equator).
///
/// Deliberately under the true ~111.195 km (2*pi*R/360 for R = 6371.0) so the
/// box over-approximates the circle. A larger divisor would shrink the box
/// below the radius and drop candidates sitting exactly on the boundary.
const KM_PER_DEGREE: f64 = 111.0;

/// Floor for |cos(latitude)| so the longitude band stays finite near the poles
const MIN_ABS_COS_LAT: f64 = 1e-6;

/// Calculate the haversine distance between two points in kilometers
///
/// Inputs are degrees. The haversine form is numerically stable at small
/// distances, unlike the law-of-cosines variant.
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    // Identical points must be exactly 0.0
    if lat1 == lat2 && lon1 == lon2 {
        return 0.0;
    }

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Calculate a bounding box around a center point
///
/// This is much faster than haversine for pre-filtering. The box is a
/// superset of the radius: it may admit points outside the circle but never
/// rejects a point inside it.
///
/// # Arguments
/// * `lat` - Center latitude in degrees
/// * `lon` - Center longitude in degrees
/// * `radius_km` - Radius in kilometers
///
/// # Returns
/// BoundingBox with min/max lat/lon
pub fn bounding_box(lat: f64, lon: f64, radius_km: f64) -> BoundingBox {
    // 1 degree latitude is approximately 111 km
    let lat_delta = radius_km / KM_PER_DEGREE;

    // 1 degree longitude shrinks with latitude; clamp the divisor near the poles
    let lon_delta = radius_km / (KM_PER_DEGREE * lat.to_radians().cos().abs().max(MIN_ABS_COS_LAT));

    BoundingBox {
        min_lat: lat - lat_delta,
        max_lat: lat + lat_delta,
        min_lon: lon - lon_delta,
        max_lon: lon + lon_delta,
    }
}

/// Check if a point is within a bounding box
#[inline]
pub fn is_within_bounding_box(lat: f64, lon: f64, bbox: &BoundingBox) -> bool {
    lat >= bbox.min_lat
        && lat <= bbox.max_lat
        && lon >= bbox.min_lon
        && lon <= bbox.max_lon
}
