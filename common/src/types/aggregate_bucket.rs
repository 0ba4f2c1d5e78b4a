use serde::{Deserialize, Serialize};

/// Number of items that reference one entity, with that entity's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateBucket {
    pub key: String,
    pub name: String,
    pub count: usize,
}

/// Presentation order for a list of buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BucketOrder {
    /// Order of first appearance in the item collection.
    #[default]
    FirstSeen,
    /// Largest count first; ties by name.
    ByCountDesc,
    /// Alphabetical by name; ties by key.
    ByName,
}
