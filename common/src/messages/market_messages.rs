use crate::proximity::NearbyEntry;
use crate::types::raw_records::{RejectedRecord, SkippedLocation};
use crate::types::{AggregateBucket, GeoPoint, ProductInfo, SearchRadius, ShopInfo};
use actix::Message;
use serde::{Deserialize, Serialize};

/////////////////////////////////////////////////////////////////////
// Feed updates
/////////////////////////////////////////////////////////////////////

/// Message carrying the complete current set of shops.
///
/// ## Purpose
/// Sent by the feed every time the shop collection changes. The receiver
/// replaces its shops wholesale.
///
/// ## Contents
/// - `shops`: Every shop, already normalized.
/// - `skipped`: Shops whose stored coordinates could not be used.
/// - `rejected`: Shop records that could not be read and were left out.
#[derive(Message, Debug, Clone, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct ShopsUpdated {
    pub shops: Vec<ShopInfo>,
    pub skipped: Vec<SkippedLocation>,
    pub rejected: Vec<RejectedRecord>,
}

/// Message carrying the complete current set of products.
///
/// ## Purpose
/// Sent by the feed every time the product collection changes.
///
/// ## Contents
/// - `products`: Every product, already normalized.
/// - `rejected`: Product records that could not be read and were left out.
#[derive(Message, Debug, Clone, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct ProductsUpdated {
    pub products: Vec<ProductInfo>,
    pub rejected: Vec<RejectedRecord>,
}

/////////////////////////////////////////////////////////////////////
// User controls
/////////////////////////////////////////////////////////////////////

/// Message to set or clear the searching user's position.
///
/// ## Contents
/// - `reference`: The new position, or `None` when it is unavailable. Without
///   a position no radius filtering takes place.
#[derive(Message, Debug, Clone, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct SetReferenceLocation {
    pub reference: Option<GeoPoint>,
}

/// Message to change the search radius.
///
/// ## Contents
/// - `radius_km`: Raw control value; the receiver clamps it into its bounds.
#[derive(Message, Debug, Clone, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct SetSearchRadius {
    pub radius_km: f64,
}

/////////////////////////////////////////////////////////////////////
// Results
/////////////////////////////////////////////////////////////////////

/// Message requesting a snapshot computed from the current inputs.
#[derive(Message, Debug, Clone, Serialize, Deserialize)]
#[rtype(result = "MarketSnapshot")]
pub struct GetMarketSnapshot;

/// Everything the market screen renders, computed from one consistent set of
/// inputs.
///
/// ## Contents
/// - `revision`: Input revision the snapshot was computed from. Increases
///   with every input change; consumers drop snapshots that are not newer
///   than the last one they showed.
/// - `reference` / `radius`: The inputs used for filtering.
/// - `nearby_shops`: Shops in range, in feed order, with their distance.
/// - `nearby_products`: Products whose shop is in range.
/// - `buckets`: Product count per shop over the whole product collection.
/// - `total_products`: Size of the product collection.
/// - `skipped_locations`: Shops excluded because of unreadable coordinates.
/// - `rejected_records`: Feed records (shops and products) that could not be
///   read at all.
#[derive(Message, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct MarketSnapshot {
    pub revision: u64,
    pub reference: Option<GeoPoint>,
    pub radius: SearchRadius,
    pub nearby_shops: Vec<NearbyEntry<ShopInfo>>,
    pub nearby_products: Vec<ProductInfo>,
    pub buckets: Vec<AggregateBucket>,
    pub total_products: usize,
    pub skipped_locations: usize,
    pub rejected_records: usize,
}

/////////////////////////////////////////////////////////////////////
// Owner dashboard
/////////////////////////////////////////////////////////////////////

/// Message requesting the product counts of every shop of one owner.
///
/// ## Contents
/// - `owner_id`: Id of the farmer whose shops are summarized.
#[derive(Message, Debug, Clone, Serialize, Deserialize)]
#[rtype(result = "OwnerSummary")]
pub struct GetOwnerSummary {
    pub owner_id: String,
}

/// Product count per shop of one owner.
///
/// ## Contents
/// - `owner_id`: The owner the summary was computed for.
/// - `buckets`: One bucket per shop of the owner, in feed order, including
///   shops without products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerSummary {
    pub owner_id: String,
    pub buckets: Vec<AggregateBucket>,
}
