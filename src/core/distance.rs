use crate::models::Coordinates;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree used by the coarse planar approximation
pub const KM_PER_DEGREE: f64 = 111.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers. NaN inputs yield NaN.
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` past 1 for antipodal points; `f64::min` would swallow NaN
    let a = if a > 1.0 { 1.0 } else { a };

    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Haversine distance between two coordinate pairs
#[inline]
pub fn distance_between(from: &Coordinates, to: &Coordinates) -> f64 {
    haversine_distance(from.latitude, from.longitude, to.latitude, to.longitude)
}

/// Approximate planar distance used by the coarse catalog query
///
/// Treats one degree of latitude and of longitude as 111 km each. Longitude
/// degrees shrink with `cos(latitude)`, so east-west offsets are overestimated
/// away from the equator and the coarse pass can drop postings that the exact
/// haversine check would have kept.
#[inline]
pub fn planar_distance(from: &Coordinates, to: &Coordinates) -> f64 {
    let d_lat = to.latitude - from.latitude;
    let d_lon = to.longitude - from.longitude;
    KM_PER_DEGREE * (d_lat * d_lat + d_lon * d_lon).sqrt()
}
