use crate::aggregator::GroupedItem;
use serde::{Deserialize, Serialize};

/// A product listed by a shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub id: String,
    pub name: String,
    pub price: Option<f64>,
    pub unit: String,
    /// Id of the owning shop.
    pub shop_id: String,
    pub image: Option<String>,
}

impl GroupedItem for ProductInfo {
    fn group_key(&self) -> &str {
        &self.shop_id
    }
}
