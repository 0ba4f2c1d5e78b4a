use crate::constants::{DEFAULT_RADIUS_KM, MAX_RADIUS_KM, MIN_RADIUS_KM};
use crate::errors::{MarketError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive range a user-controlled radius is clamped into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusBounds {
    min_km: f64,
    max_km: f64,
}

impl RadiusBounds {
    pub fn try_new(min_km: f64, max_km: f64) -> Result<Self> {
        if !min_km.is_finite() || min_km <= 0.0 {
            return Err(MarketError::InvalidRadius(min_km));
        }
        if !max_km.is_finite() || max_km < min_km {
            return Err(MarketError::Config(format!(
                "radius bounds [{}, {}] are empty",
                min_km, max_km
            )));
        }
        Ok(Self { min_km, max_km })
    }

    pub fn min_km(&self) -> f64 {
        self.min_km
    }

    pub fn max_km(&self) -> f64 {
        self.max_km
    }

    pub fn contains(&self, km: f64) -> bool {
        (self.min_km..=self.max_km).contains(&km)
    }
}

impl Default for RadiusBounds {
    fn default() -> Self {
        Self {
            min_km: MIN_RADIUS_KM,
            max_km: MAX_RADIUS_KM,
        }
    }
}

/// Search radius in kilometers. Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SearchRadius(f64);

impl SearchRadius {
    pub fn try_new(km: f64) -> Result<Self> {
        if !km.is_finite() || km <= 0.0 {
            return Err(MarketError::InvalidRadius(km));
        }
        Ok(Self(km))
    }

    /// Maps raw slider input into `bounds`. NaN lands on the lower bound.
    pub fn clamped(km: f64, bounds: &RadiusBounds) -> Self {
        if km.is_nan() {
            return Self(bounds.min_km);
        }
        Self(km.clamp(bounds.min_km, bounds.max_km))
    }

    pub fn km(&self) -> f64 {
        self.0
    }
}

impl Default for SearchRadius {
    fn default() -> Self {
        Self(DEFAULT_RADIUS_KM)
    }
}

impl TryFrom<f64> for SearchRadius {
    type Error = MarketError;

    fn try_from(km: f64) -> Result<Self> {
        Self::try_new(km)
    }
}

impl From<SearchRadius> for f64 {
    fn from(radius: SearchRadius) -> f64 {
        radius.0
    }
}

impl fmt::Display for SearchRadius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} km", self.0)
    }
}
