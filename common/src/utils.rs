use crate::constants::{CHART_PALETTE, EARTH_RADIUS_KM};
use crate::types::GeoPoint;

/// Great-circle distance between two points in kilometers (haversine, mean
/// Earth radius). Pure; no rounding.
pub fn calculate_distance(point1: &GeoPoint, point2: &GeoPoint) -> f64 {
    let lat1 = point1.latitude.to_radians();
    let lat2 = point2.latitude.to_radians();
    let delta_lat = (point2.latitude - point1.latitude).to_radians();
    let delta_lon = (point2.longitude - point1.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    // rounding can push `a` a hair above 1 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Human readable distance: whole meters below one kilometer, one decimal
/// above. The unit is picked after rounding.
pub fn format_distance(km: f64) -> String {
    let meters = (km * 1000.0).round();
    if meters < 1000.0 {
        format!("{} m", meters)
    } else {
        format!("{:.1} km", km)
    }
}

/// Chart color for the bucket at `index`.
pub fn chart_color(index: usize) -> &'static str {
    CHART_PALETTE[index % CHART_PALETTE.len()]
}
