//! Records as they arrive from the document feed.
//!
//! The feed stores numbers loosely: a coordinate may be a JSON number, a
//! numeric string, or something else entirely, and a shop's `location` may be
//! missing or a placeholder string. Everything here is converted exactly once
//! into the typed [`ShopInfo`] / [`ProductInfo`] values the algorithms use.

use crate::errors::{MarketError, Result};
use crate::types::{GeoPoint, ProductInfo, ShopInfo};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A number that may have been stored as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
    Other(Value),
}

impl RawNumber {
    /// Coerces to a finite `f64`. Text is trimmed before parsing.
    pub fn coerce(&self, field: &'static str) -> Result<f64> {
        let value = match self {
            RawNumber::Number(value) => *value,
            RawNumber::Text(text) => {
                text.trim()
                    .parse::<f64>()
                    .map_err(|_| MarketError::InvalidNumber {
                        field,
                        value: text.clone(),
                    })?
            }
            RawNumber::Other(value) => {
                return Err(MarketError::InvalidNumber {
                    field,
                    value: value.to_string(),
                });
            }
        };
        if !value.is_finite() {
            return Err(MarketError::InvalidNumber {
                field,
                value: value.to_string(),
            });
        }
        Ok(value)
    }
}

/// A stored location: either a coordinate pair or a placeholder value such as
/// `"Unknown Location"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLocation {
    Point {
        latitude: RawNumber,
        longitude: RawNumber,
    },
    Placeholder(Value),
}

impl RawLocation {
    /// `Ok(None)` for placeholders, `Err` for a coordinate pair that cannot be
    /// used.
    pub fn to_geo_point(&self) -> Result<Option<GeoPoint>> {
        match self {
            RawLocation::Point {
                latitude,
                longitude,
            } => {
                let latitude = latitude.coerce("latitude")?;
                let longitude = longitude.coerce("longitude")?;
                GeoPoint::try_new(latitude, longitude).map(Some)
            }
            RawLocation::Placeholder(_) => Ok(None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawShop {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "farmerId")]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub location: Option<RawLocation>,
}

/// A shop whose stored coordinates were dropped during normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedLocation {
    pub entity_id: String,
    pub reason: String,
}

impl RawShop {
    /// Converts to a [`ShopInfo`]. A shop with unusable coordinates is kept,
    /// without a location, and reported in the second element.
    pub fn normalize(self, fallback_name: &str) -> (ShopInfo, Option<SkippedLocation>) {
        let (location, skipped) = match self.location.as_ref().map(RawLocation::to_geo_point) {
            None => (None, None),
            Some(Ok(point)) => (point, None),
            Some(Err(err)) => (
                None,
                Some(SkippedLocation {
                    entity_id: self.id.clone(),
                    reason: err.to_string(),
                }),
            ),
        };
        let name = self
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| fallback_name.to_string());
        let shop = ShopInfo {
            id: self.id,
            name,
            owner_id: self.owner_id.filter(|owner| !owner.is_empty()),
            location,
        };
        (shop, skipped)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<RawNumber>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub shop_id: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl RawProduct {
    /// An unreadable price becomes `None`; the product itself is kept.
    pub fn normalize(self) -> ProductInfo {
        ProductInfo {
            price: self.price.and_then(|price| price.coerce("price").ok()),
            id: self.id,
            name: self.name.unwrap_or_default(),
            unit: self.unit.unwrap_or_default(),
            shop_id: self.shop_id.unwrap_or_default(),
            image: self.image.filter(|url| !url.is_empty()),
        }
    }
}

/// A feed record that could not be read at all and was left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRecord {
    /// Position of the record in its collection.
    pub index: usize,
    /// The record's `id`, when it had a readable one.
    pub id: Option<String>,
    pub reason: String,
}

/// Full contents of the document feed. Records are kept as plain JSON values
/// so that one unreadable record does not take the whole feed down.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketFeed {
    #[serde(default)]
    pub shops: Vec<Value>,
    #[serde(default)]
    pub products: Vec<Value>,
}

/// A feed after the coercion step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedFeed {
    pub shops: Vec<ShopInfo>,
    pub products: Vec<ProductInfo>,
    pub skipped: Vec<SkippedLocation>,
    pub rejected_shops: Vec<RejectedRecord>,
    pub rejected_products: Vec<RejectedRecord>,
}

impl MarketFeed {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn normalize(self, fallback_name: &str) -> NormalizedFeed {
        let mut feed = NormalizedFeed::default();
        for raw in parse_records::<RawShop>("shop", self.shops, &mut feed.rejected_shops) {
            let (shop, dropped) = raw.normalize(fallback_name);
            feed.skipped.extend(dropped);
            feed.shops.push(shop);
        }
        feed.products =
            parse_records::<RawProduct>("product", self.products, &mut feed.rejected_products)
                .into_iter()
                .map(RawProduct::normalize)
                .collect();
        feed
    }
}

fn parse_records<T: DeserializeOwned>(
    collection: &'static str,
    values: Vec<Value>,
    rejected: &mut Vec<RejectedRecord>,
) -> Vec<T> {
    let mut records = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        let id = value.get("id").and_then(Value::as_str).map(str::to_string);
        match serde_json::from_value::<T>(value) {
            Ok(record) => records.push(record),
            Err(err) => rejected.push(RejectedRecord {
                index,
                id,
                reason: MarketError::Feed {
                    collection,
                    index,
                    reason: err.to_string(),
                }
                .to_string(),
            }),
        }
    }
    records
}
