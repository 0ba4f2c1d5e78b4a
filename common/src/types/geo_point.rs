use crate::constants::{LATITUDE_RANGE, LONGITUDE_RANGE};
use crate::errors::{MarketError, Result};
use crate::utils::calculate_distance;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A position on the Earth's surface in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Builds a point without range checks. Callers own the validity of the
    /// coordinates (see [`GeoPoint::try_new`]).
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Builds a point, rejecting non-finite or out of range coordinates.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self> {
        check_axis("latitude", latitude, LATITUDE_RANGE)?;
        check_axis("longitude", longitude, LONGITUDE_RANGE)?;
        Ok(Self::new(latitude, longitude))
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&self.latitude)
            && (LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&self.longitude)
    }

    /// Great-circle distance to `other`, in kilometers.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        calculate_distance(self, other)
    }
}

fn check_axis(field: &'static str, value: f64, (min, max): (f64, f64)) -> Result<()> {
    if !value.is_finite() {
        return Err(MarketError::InvalidNumber {
            field,
            value: value.to_string(),
        });
    }
    if !(min..=max).contains(&value) {
        return Err(MarketError::CoordinateOutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// Parses `"lat,lon"`.
impl FromStr for GeoPoint {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        let (lat, lon) = s.split_once(',').ok_or_else(|| MarketError::InvalidNumber {
            field: "location",
            value: s.to_string(),
        })?;
        let parse = |field: &'static str, raw: &str| {
            raw.trim()
                .parse::<f64>()
                .map_err(|_| MarketError::InvalidNumber {
                    field,
                    value: raw.trim().to_string(),
                })
        };
        Self::try_new(parse("latitude", lat)?, parse("longitude", lon)?)
    }
}
