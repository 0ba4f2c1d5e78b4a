use crate::types::{GeoPoint, LocatedEntity, ProductInfo, SearchRadius, ShopOrder};
use crate::utils::calculate_distance;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Whether a location lies within `radius` of `reference`. The boundary is
/// inclusive; a missing location is never in range.
pub fn is_within_radius(
    reference: &GeoPoint,
    location: Option<&GeoPoint>,
    radius: SearchRadius,
) -> bool {
    location.is_some_and(|location| calculate_distance(reference, location) <= radius.km())
}

/// Returns the entities within `radius` of `reference`, in input order.
///
/// Without a reference point nothing is filtered: every entity is returned,
/// located or not.
pub fn filter_nearby<E>(entities: &[E], reference: Option<&GeoPoint>, radius: SearchRadius) -> Vec<E>
where
    E: LocatedEntity + Clone,
{
    match reference {
        None => entities.to_vec(),
        Some(reference) => entities
            .iter()
            .filter(|entity| is_within_radius(reference, entity.location(), radius))
            .cloned()
            .collect(),
    }
}

/// An entity paired with its distance from the reference point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyEntry<E> {
    pub entity: E,
    /// `None` when either the entity or the reference has no location.
    pub distance_km: Option<f64>,
}

/// Pairs every entity with its distance from `reference`, keeping order.
pub fn annotate_distances<E>(entities: &[E], reference: Option<&GeoPoint>) -> Vec<NearbyEntry<E>>
where
    E: LocatedEntity + Clone,
{
    entities
        .iter()
        .map(|entity| NearbyEntry {
            distance_km: reference
                .zip(entity.location())
                .map(|(reference, location)| reference.distance_to(location)),
            entity: entity.clone(),
        })
        .collect()
}

/// Nearest first. Entries without a distance go last, keeping their order.
pub fn sort_by_distance<E>(entries: &mut [NearbyEntry<E>]) {
    entries.sort_by(|a, b| match (a.distance_km, b.distance_km) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Puts annotated entries into the requested presentation order.
pub fn order_entries<E>(entries: &mut [NearbyEntry<E>], order: ShopOrder) {
    match order {
        ShopOrder::Feed => {}
        ShopOrder::Nearest => sort_by_distance(entries),
    }
}

/// Products whose shop appears in `shops`, in input order.
pub fn products_in_range<E: LocatedEntity>(products: &[ProductInfo], shops: &[E]) -> Vec<ProductInfo> {
    let shop_ids: HashSet<&str> = shops.iter().map(|shop| shop.id()).collect();
    products
        .iter()
        .filter(|product| shop_ids.contains(product.shop_id.as_str()))
        .cloned()
        .collect()
}
