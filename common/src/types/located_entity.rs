use crate::types::GeoPoint;

/// A record that can take part in a proximity search.
///
/// Entities whose `location` is `None` are never in range of a reference
/// point.
pub trait LocatedEntity {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn location(&self) -> Option<&GeoPoint>;
}
