pub mod aggregate_bucket;
pub mod geo_point;
pub mod located_entity;
pub mod product_info;
pub mod raw_records;
pub mod search_radius;
pub mod shop_info;
pub mod shop_order;

pub use aggregate_bucket::{AggregateBucket, BucketOrder};
pub use geo_point::GeoPoint;
pub use located_entity::LocatedEntity;
pub use product_info::ProductInfo;
pub use search_radius::{RadiusBounds, SearchRadius};
pub use shop_info::ShopInfo;
pub use shop_order::ShopOrder;
