use crate::constants::{
    DEBOUNCE_MILLIS, DEFAULT_RADIUS_KM, FEED_POLL_SECONDS, MAX_RADIUS_KM, MIN_RADIUS_KM,
    UNKNOWN_NAME,
};
use crate::errors::{MarketError, Result};
use crate::types::{BucketOrder, RadiusBounds, SearchRadius, ShopOrder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Runtime settings of the market view. Every field is optional in the JSON
/// file and falls back to the value in [`crate::constants`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub default_radius_km: f64,
    pub min_radius_km: f64,
    pub max_radius_km: f64,
    /// Name used for buckets and shops that cannot be resolved.
    pub fallback_name: String,
    pub debounce_ms: u64,
    /// Seconds between feed re-reads; `0` reads the feed once.
    pub feed_poll_secs: u64,
    pub bucket_order: BucketOrder,
    pub shop_order: ShopOrder,
    pub verbose: bool,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            default_radius_km: DEFAULT_RADIUS_KM,
            min_radius_km: MIN_RADIUS_KM,
            max_radius_km: MAX_RADIUS_KM,
            fallback_name: UNKNOWN_NAME.to_string(),
            debounce_ms: DEBOUNCE_MILLIS,
            feed_poll_secs: FEED_POLL_SECONDS,
            bucket_order: BucketOrder::default(),
            shop_order: ShopOrder::default(),
            verbose: false,
        }
    }
}

impl MarketConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let bounds = self.radius_bounds()?;
        if !bounds.contains(self.default_radius_km) {
            return Err(MarketError::Config(format!(
                "default radius {} km is outside [{}, {}]",
                self.default_radius_km,
                bounds.min_km(),
                bounds.max_km()
            )));
        }
        if self.fallback_name.trim().is_empty() {
            return Err(MarketError::Config("fallback_name must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn radius_bounds(&self) -> Result<RadiusBounds> {
        RadiusBounds::try_new(self.min_radius_km, self.max_radius_km)
    }

    /// The configured default radius. Assumes a validated config.
    pub fn default_radius(&self) -> SearchRadius {
        match self.radius_bounds() {
            Ok(bounds) => SearchRadius::clamped(self.default_radius_km, &bounds),
            Err(_) => SearchRadius::default(),
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn feed_poll_interval(&self) -> Option<Duration> {
        (self.feed_poll_secs > 0).then(|| Duration::from_secs(self.feed_poll_secs))
    }
}
