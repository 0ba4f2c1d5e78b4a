use crate::types::{GeoPoint, LocatedEntity};
use serde::{Deserialize, Serialize};

/// A farmer's shop as seen by the market screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopInfo {
    pub id: String,
    pub name: String,
    pub owner_id: Option<String>,
    /// `None` when the shop never shared a position or its stored
    /// coordinates could not be read.
    pub location: Option<GeoPoint>,
}

impl ShopInfo {
    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id.as_deref() == Some(owner_id)
    }
}

impl LocatedEntity for ShopInfo {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> Option<&GeoPoint> {
        self.location.as_ref()
    }
}
