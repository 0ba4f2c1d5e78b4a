use crate::types::{AggregateBucket, BucketOrder, LocatedEntity};
use std::collections::HashMap;

/// An item that belongs to exactly one located entity.
pub trait GroupedItem {
    /// Id of the owning entity.
    fn group_key(&self) -> &str;
}

/// Counts `items` per group key.
///
/// One bucket per distinct key, in order of first appearance. The bucket name
/// comes from `name_lookup`, or `fallback` when the key cannot be resolved.
pub fn aggregate_by_group<'a, I, F>(items: &[I], name_lookup: F, fallback: &str) -> Vec<AggregateBucket>
where
    I: GroupedItem,
    F: Fn(&str) -> Option<&'a str>,
{
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<AggregateBucket> = Vec::new();

    for item in items {
        let key = item.group_key();
        match positions.get(key) {
            Some(&position) => buckets[position].count += 1,
            None => {
                positions.insert(key, buckets.len());
                buckets.push(AggregateBucket {
                    key: key.to_string(),
                    name: name_lookup(key).unwrap_or(fallback).to_string(),
                    count: 1,
                });
            }
        }
    }
    buckets
}

/// Counts `items` for each of `entities`, in entity order.
///
/// Unlike [`aggregate_by_group`] every entity gets a bucket, including those
/// no item refers to. Items of other entities are ignored.
pub fn counts_for_shops<E, I>(entities: &[E], items: &[I]) -> Vec<AggregateBucket>
where
    E: LocatedEntity,
    I: GroupedItem,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in items {
        *counts.entry(item.group_key()).or_default() += 1;
    }
    entities
        .iter()
        .map(|entity| AggregateBucket {
            key: entity.id().to_string(),
            name: entity.name().to_string(),
            count: counts.get(entity.id()).copied().unwrap_or(0),
        })
        .collect()
}

/// Id to display name index over a set of entities.
pub fn name_index<E: LocatedEntity>(entities: &[E]) -> HashMap<&str, &str> {
    entities
        .iter()
        .map(|entity| (entity.id(), entity.name()))
        .collect()
}

pub fn sort_buckets(buckets: &mut [AggregateBucket], order: BucketOrder) {
    match order {
        // first appearance is the order buckets are produced in
        BucketOrder::FirstSeen => {}
        BucketOrder::ByCountDesc => {
            buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)))
        }
        BucketOrder::ByName => {
            buckets.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.key.cmp(&b.key)))
        }
    }
}
