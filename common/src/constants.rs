/// Mean Earth radius used by the haversine distance, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const DEFAULT_RADIUS_KM: f64 = 50.0;
pub const MIN_RADIUS_KM: f64 = 1.0;
pub const MAX_RADIUS_KM: f64 = 200.0;

/// Label shown for a bucket whose shop cannot be resolved.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Window in which consecutive input changes collapse into one recomputation.
pub const DEBOUNCE_MILLIS: u64 = 150;
/// Feed re-read interval. Zero loads the feed once.
pub const FEED_POLL_SECONDS: u64 = 0;

pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// Pie chart palette of the market screen.
pub const CHART_PALETTE: [&str; 8] = [
    "#4CAF50", "#2196F3", "#FF9800", "#9C27B0", "#3F51B5", "#009688", "#FF5722", "#607D8B",
];
