use crate::messages::internal_messages::Subscribe;
use actix::prelude::*;
use colored::Color;
use common::aggregator::{aggregate_by_group, counts_for_shops, name_index, sort_buckets};
use common::config::MarketConfig;
use common::errors::Result;
use common::logger::Logger;
use common::messages::{
    GetMarketSnapshot, GetOwnerSummary, MarketSnapshot, OwnerSummary, ProductsUpdated,
    SetReferenceLocation, SetSearchRadius, ShopsUpdated,
};
use common::proximity::{annotate_distances, filter_nearby, order_entries, products_in_range};
use common::types::raw_records::RejectedRecord;
use common::types::{
    BucketOrder, GeoPoint, ProductInfo, RadiusBounds, SearchRadius, ShopInfo, ShopOrder,
};
use std::time::Duration;

/// The `MarketView` actor owns the inputs of the market screen and turns
/// them into [`MarketSnapshot`]s.
///
/// ## Responsibilities:
/// - Keep the latest shops, products, reference location and radius.
/// - Recompute the nearby shops and per-shop product counts whenever any of
///   them changes, always from all four current values together.
/// - Collapse bursts of changes into one recomputation (debounce).
/// - Publish every snapshot to the subscribers.
pub struct MarketView {
    pub shops: Vec<ShopInfo>,
    pub products: Vec<ProductInfo>,
    /// Shops of the current feed whose coordinates were unreadable.
    pub skipped_locations: usize,
    /// Unreadable records of the current feed, per collection.
    pub rejected_shops: usize,
    pub rejected_products: usize,
    pub reference: Option<GeoPoint>,
    pub radius: SearchRadius,
    pub bounds: RadiusBounds,
    pub fallback_name: String,
    pub bucket_order: BucketOrder,
    pub shop_order: ShopOrder,
    pub debounce: Duration,
    /// Bumped on every input change.
    pub revision: u64,
    /// Scheduled recomputation, if one is waiting for the debounce window.
    pub pending: Option<SpawnHandle>,
    /// Last published snapshot.
    pub latest: Option<MarketSnapshot>,
    pub subscribers: Vec<Recipient<MarketSnapshot>>,
    pub logger: Logger,
}

impl MarketView {
    /// Creates a new `MarketView` with no shops or products yet.
    ///
    /// ## Arguments
    /// * `config` - Radius bounds, fallback name, debounce window and bucket order.
    /// * `reference` - The user's position, if already known.
    /// * `radius` - Initial search radius, clamped into the configured bounds.
    pub fn new(
        config: &MarketConfig,
        reference: Option<GeoPoint>,
        radius: SearchRadius,
    ) -> Result<Self> {
        let bounds = config.radius_bounds()?;
        Ok(Self {
            shops: Vec::new(),
            products: Vec::new(),
            skipped_locations: 0,
            rejected_shops: 0,
            rejected_products: 0,
            reference,
            radius: SearchRadius::clamped(radius.km(), &bounds),
            bounds,
            fallback_name: config.fallback_name.clone(),
            bucket_order: config.bucket_order,
            shop_order: config.shop_order,
            debounce: config.debounce(),
            revision: 0,
            pending: None,
            latest: None,
            subscribers: Vec::new(),
            logger: Logger::new("Market View", Color::Cyan).with_verbose(config.verbose),
        })
    }

    /// Computes a snapshot from the current inputs. Pure with respect to the
    /// actor state.
    pub fn compute_snapshot(&self) -> MarketSnapshot {
        let reference = self.reference.as_ref();
        let nearby = filter_nearby(&self.shops, reference, self.radius);
        let nearby_products = products_in_range(&self.products, &nearby);

        let names = name_index(&self.shops);
        let mut buckets = aggregate_by_group(
            &self.products,
            |shop_id| names.get(shop_id).copied(),
            &self.fallback_name,
        );
        sort_buckets(&mut buckets, self.bucket_order);

        let mut nearby_shops = annotate_distances(&nearby, reference);
        order_entries(&mut nearby_shops, self.shop_order);

        MarketSnapshot {
            revision: self.revision,
            reference: self.reference,
            radius: self.radius,
            nearby_shops,
            nearby_products,
            buckets,
            total_products: self.products.len(),
            skipped_locations: self.skipped_locations,
            rejected_records: self.rejected_shops + self.rejected_products,
        }
    }

    /// Product count for every shop of `owner_id`, empty shops included.
    pub fn owner_summary(&self, owner_id: &str) -> OwnerSummary {
        let owned: Vec<ShopInfo> = self
            .shops
            .iter()
            .filter(|shop| shop.is_owned_by(owner_id))
            .cloned()
            .collect();
        OwnerSummary {
            owner_id: owner_id.to_string(),
            buckets: counts_for_shops(&owned, &self.products),
        }
    }

    fn warn_rejected(&self, rejected: &[RejectedRecord]) {
        for record in rejected {
            self.logger.warn(format!("Left out of the feed: {}", record.reason));
        }
    }

    /// Records an input change and schedules a recomputation.
    fn input_changed(&mut self, ctx: &mut Context<Self>) {
        self.revision += 1;
        if let Some(handle) = self.pending.take() {
            ctx.cancel_future(handle);
        }
        if self.debounce.is_zero() {
            self.publish();
            return;
        }
        self.pending = Some(ctx.run_later(self.debounce, |act, _ctx| {
            act.pending = None;
            act.publish();
        }));
    }

    fn publish(&mut self) {
        let snapshot = self.compute_snapshot();
        self.logger.debug(format!(
            "Revision {}: {} of {} shops in range, {} buckets",
            snapshot.revision,
            snapshot.nearby_shops.len(),
            self.shops.len(),
            snapshot.buckets.len()
        ));
        self.subscribers.retain(|subscriber| subscriber.connected());
        for subscriber in &self.subscribers {
            subscriber.do_send(snapshot.clone());
        }
        self.latest = Some(snapshot);
    }

    /// Snapshot of the current inputs, computing it now if the last published
    /// one is outdated.
    fn current_snapshot(&mut self, ctx: &mut Context<Self>) -> MarketSnapshot {
        let up_to_date = self
            .latest
            .as_ref()
            .is_some_and(|latest| latest.revision == self.revision);
        if !up_to_date {
            if let Some(handle) = self.pending.take() {
                ctx.cancel_future(handle);
            }
            self.publish();
        }
        match &self.latest {
            Some(snapshot) => snapshot.clone(),
            None => self.compute_snapshot(),
        }
    }
}

impl Actor for MarketView {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        self.logger.info(format!(
            "Market view started, radius {}, reference {}",
            self.radius,
            self.reference
                .map(|point| point.to_string())
                .unwrap_or_else(|| "unavailable".to_string())
        ));
    }
}

impl Handler<ShopsUpdated> for MarketView {
    type Result = ();

    /// Replaces the shop collection wholesale.
    fn handle(&mut self, msg: ShopsUpdated, ctx: &mut Self::Context) -> Self::Result {
        for skipped in &msg.skipped {
            self.logger.warn(format!(
                "Shop {} has unreadable coordinates and is left out of nearby results: {}",
                skipped.entity_id, skipped.reason
            ));
        }
        self.warn_rejected(&msg.rejected);
        self.logger
            .info(format!("Received {} shops from the feed.", msg.shops.len()));
        self.shops = msg.shops;
        self.skipped_locations = msg.skipped.len();
        self.rejected_shops = msg.rejected.len();
        self.input_changed(ctx);
    }
}

impl Handler<ProductsUpdated> for MarketView {
    type Result = ();

    fn handle(&mut self, msg: ProductsUpdated, ctx: &mut Self::Context) -> Self::Result {
        self.warn_rejected(&msg.rejected);
        self.logger.info(format!(
            "Received {} products from the feed.",
            msg.products.len()
        ));
        self.products = msg.products;
        self.rejected_products = msg.rejected.len();
        self.input_changed(ctx);
    }
}

impl Handler<SetReferenceLocation> for MarketView {
    type Result = ();

    fn handle(&mut self, msg: SetReferenceLocation, ctx: &mut Self::Context) -> Self::Result {
        if let Some(point) = msg.reference.filter(|point| !point.is_valid()) {
            self.logger
                .warn(format!("Ignoring invalid reference location {}", point));
            return;
        }
        if msg.reference == self.reference {
            return;
        }
        match msg.reference {
            Some(point) => self.logger.info(format!("Reference location set to {}", point)),
            None => self
                .logger
                .warn("Reference location unavailable, showing every shop."),
        }
        self.reference = msg.reference;
        self.input_changed(ctx);
    }
}

impl Handler<SetSearchRadius> for MarketView {
    type Result = ();

    fn handle(&mut self, msg: SetSearchRadius, ctx: &mut Self::Context) -> Self::Result {
        let radius = SearchRadius::clamped(msg.radius_km, &self.bounds);
        if radius == self.radius {
            return;
        }
        self.logger.info(format!("Search radius set to {}", radius));
        self.radius = radius;
        self.input_changed(ctx);
    }
}

impl Handler<Subscribe> for MarketView {
    type Result = ();

    /// Registers the subscriber and hands it the current state right away.
    fn handle(&mut self, msg: Subscribe, ctx: &mut Self::Context) -> Self::Result {
        let snapshot = self.current_snapshot(ctx);
        msg.subscriber.do_send(snapshot);
        self.subscribers.push(msg.subscriber);
    }
}

impl Handler<GetMarketSnapshot> for MarketView {
    type Result = MessageResult<GetMarketSnapshot>;

    fn handle(&mut self, _msg: GetMarketSnapshot, ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.current_snapshot(ctx))
    }
}

impl Handler<GetOwnerSummary> for MarketView {
    type Result = MessageResult<GetOwnerSummary>;

    fn handle(&mut self, msg: GetOwnerSummary, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.owner_summary(&msg.owner_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::types::AggregateBucket;
    use ntest::assert_about_eq;

    const KM_PER_DEGREE: f64 = 6371.0 * std::f64::consts::PI / 180.0;

    fn dhaka() -> GeoPoint {
        GeoPoint::new(23.8103, 90.4125)
    }

    fn shop(id: &str, name: &str, km_north: Option<f64>) -> ShopInfo {
        ShopInfo {
            id: id.to_string(),
            name: name.to_string(),
            owner_id: None,
            location: km_north
                .map(|km| GeoPoint::new(dhaka().latitude + km / KM_PER_DEGREE, dhaka().longitude)),
        }
    }

    fn product(id: &str, shop_id: &str) -> ProductInfo {
        ProductInfo {
            id: id.to_string(),
            name: format!("Product {id}"),
            price: Some(10.0),
            unit: "kg".to_string(),
            shop_id: shop_id.to_string(),
            image: None,
        }
    }

    fn config(debounce_ms: u64) -> MarketConfig {
        MarketConfig {
            debounce_ms,
            ..MarketConfig::default()
        }
    }

    fn start_view(debounce_ms: u64, reference: Option<GeoPoint>) -> Addr<MarketView> {
        MarketView::new(&config(debounce_ms), reference, SearchRadius::default())
            .unwrap()
            .start()
    }

    fn nearby_ids(snapshot: &MarketSnapshot) -> Vec<String> {
        snapshot
            .nearby_shops
            .iter()
            .map(|entry| entry.entity.id.clone())
            .collect()
    }

    fn three_shops() -> ShopsUpdated {
        ShopsUpdated {
            shops: vec![
                shop("s1", "Green Farm", Some(2.0)),
                shop("s2", "River Farm", Some(15.0)),
                shop("s3", "Hill Farm", Some(60.0)),
            ],
            skipped: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Records every snapshot it receives.
    #[derive(Default)]
    struct Collector {
        seen: Vec<MarketSnapshot>,
    }

    impl Actor for Collector {
        type Context = Context<Self>;
    }

    impl Handler<MarketSnapshot> for Collector {
        type Result = ();

        fn handle(&mut self, msg: MarketSnapshot, _ctx: &mut Self::Context) {
            self.seen.push(msg);
        }
    }

    #[derive(Message)]
    #[rtype(result = "Vec<MarketSnapshot>")]
    struct GetSeen;

    impl Handler<GetSeen> for Collector {
        type Result = MessageResult<GetSeen>;

        fn handle(&mut self, _msg: GetSeen, _ctx: &mut Self::Context) -> Self::Result {
            MessageResult(self.seen.clone())
        }
    }

    #[actix_rt::test]
    async fn filters_shops_within_default_radius() {
        let view = start_view(0, Some(dhaka()));
        view.send(three_shops()).await.unwrap();

        let snapshot = view.send(GetMarketSnapshot).await.unwrap();
        assert_eq!(nearby_ids(&snapshot), vec!["s1", "s2"]);
        assert_about_eq!(snapshot.nearby_shops[0].distance_km.unwrap(), 2.0);
        assert_about_eq!(snapshot.nearby_shops[1].distance_km.unwrap(), 15.0);
        assert_eq!(snapshot.radius.km(), 50.0);
    }

    #[actix_rt::test]
    async fn without_reference_every_shop_is_listed() {
        let view = start_view(0, None);
        view.send(ShopsUpdated {
            shops: vec![
                shop("a", "A", Some(1.0)),
                shop("b", "B", None),
                shop("c", "C", Some(500.0)),
                shop("d", "D", None),
                shop("e", "E", Some(80.0)),
            ],
            skipped: Vec::new(),
            rejected: Vec::new(),
        })
        .await
        .unwrap();

        let snapshot = view.send(GetMarketSnapshot).await.unwrap();
        assert_eq!(nearby_ids(&snapshot), vec!["a", "b", "c", "d", "e"]);
        assert!(snapshot.nearby_shops.iter().all(|e| e.distance_km.is_none()));
    }

    #[actix_rt::test]
    async fn widening_the_radius_keeps_previous_shops() {
        let view = start_view(0, Some(dhaka()));
        view.send(three_shops()).await.unwrap();

        view.send(SetSearchRadius { radius_km: 10.0 }).await.unwrap();
        let narrow = view.send(GetMarketSnapshot).await.unwrap();
        view.send(SetSearchRadius { radius_km: 100.0 }).await.unwrap();
        let wide = view.send(GetMarketSnapshot).await.unwrap();

        assert_eq!(nearby_ids(&narrow), vec!["s1"]);
        assert_eq!(nearby_ids(&wide), vec!["s1", "s2", "s3"]);
        assert!(wide.revision > narrow.revision);
    }

    #[actix_rt::test]
    async fn radius_is_clamped_to_bounds() {
        let view = start_view(0, Some(dhaka()));
        view.send(SetSearchRadius { radius_km: 5000.0 }).await.unwrap();
        let snapshot = view.send(GetMarketSnapshot).await.unwrap();
        assert_eq!(snapshot.radius.km(), 200.0);

        view.send(SetSearchRadius { radius_km: -4.0 }).await.unwrap();
        let snapshot = view.send(GetMarketSnapshot).await.unwrap();
        assert_eq!(snapshot.radius.km(), 1.0);
    }

    #[actix_rt::test]
    async fn clearing_the_reference_stops_filtering() {
        let view = start_view(0, Some(dhaka()));
        view.send(three_shops()).await.unwrap();
        view.send(SetReferenceLocation { reference: None })
            .await
            .unwrap();

        let snapshot = view.send(GetMarketSnapshot).await.unwrap();
        assert_eq!(nearby_ids(&snapshot), vec!["s1", "s2", "s3"]);

        view.send(SetReferenceLocation {
            reference: Some(GeoPoint::new(123.0, 0.0)),
        })
        .await
        .unwrap();
        let unchanged = view.send(GetMarketSnapshot).await.unwrap();
        assert_eq!(unchanged.reference, None);
        assert_eq!(unchanged.revision, snapshot.revision);
    }

    #[actix_rt::test]
    async fn counts_products_per_shop() {
        let view = start_view(0, None);
        view.send(ShopsUpdated {
            shops: vec![shop("S1", "Green Farm", Some(1.0))],
            skipped: Vec::new(),
            rejected: Vec::new(),
        })
        .await
        .unwrap();
        view.send(ProductsUpdated {
            products: vec![product("p1", "S1"), product("p2", "S1"), product("p3", "S2")],
            rejected: Vec::new(),
        })
        .await
        .unwrap();

        let snapshot = view.send(GetMarketSnapshot).await.unwrap();
        assert_eq!(
            snapshot.buckets,
            vec![
                AggregateBucket {
                    key: "S1".to_string(),
                    name: "Green Farm".to_string(),
                    count: 2,
                },
                AggregateBucket {
                    key: "S2".to_string(),
                    name: "Unknown".to_string(),
                    count: 1,
                },
            ]
        );
        assert_eq!(snapshot.total_products, 3);
        // S2 is not a known shop, so its product is not "nearby"
        assert_eq!(snapshot.nearby_products.len(), 2);
    }

    #[actix_rt::test]
    async fn reports_skipped_locations() {
        let view = start_view(0, Some(dhaka()));
        view.send(ShopsUpdated {
            shops: vec![shop("bad", "Broken Farm", None)],
            skipped: vec![common::types::raw_records::SkippedLocation {
                entity_id: "bad".to_string(),
                reason: "invalid latitude 'x'".to_string(),
            }],
            rejected: Vec::new(),
        })
        .await
        .unwrap();

        let snapshot = view.send(GetMarketSnapshot).await.unwrap();
        assert_eq!(snapshot.skipped_locations, 1);
        assert!(snapshot.nearby_shops.is_empty());
    }

    #[actix_rt::test]
    async fn counts_rejected_feed_records() {
        let view = start_view(0, None);
        let rejected = |index: usize| RejectedRecord {
            index,
            id: None,
            reason: format!("unreadable record #{index}"),
        };
        view.send(ShopsUpdated {
            shops: vec![shop("s1", "Green Farm", Some(1.0))],
            skipped: Vec::new(),
            rejected: vec![rejected(1)],
        })
        .await
        .unwrap();
        view.send(ProductsUpdated {
            products: vec![product("p1", "s1")],
            rejected: vec![rejected(3), rejected(4)],
        })
        .await
        .unwrap();

        let snapshot = view.send(GetMarketSnapshot).await.unwrap();
        assert_eq!(snapshot.rejected_records, 3);
        assert_eq!(nearby_ids(&snapshot), vec!["s1"]);
        assert_eq!(snapshot.total_products, 1);
    }

    #[actix_rt::test]
    async fn nearest_first_order_is_applied() {
        let config = MarketConfig {
            debounce_ms: 0,
            shop_order: ShopOrder::Nearest,
            ..MarketConfig::default()
        };
        let view = MarketView::new(&config, Some(dhaka()), SearchRadius::default())
            .unwrap()
            .start();
        view.send(ShopsUpdated {
            shops: vec![
                shop("s1", "Mid Farm", Some(30.0)),
                shop("s2", "Near Farm", Some(3.0)),
                shop("s3", "Far Farm", Some(45.0)),
            ],
            skipped: Vec::new(),
            rejected: Vec::new(),
        })
        .await
        .unwrap();

        let snapshot = view.send(GetMarketSnapshot).await.unwrap();
        assert_eq!(nearby_ids(&snapshot), vec!["s2", "s1", "s3"]);
    }

    #[actix_rt::test]
    async fn owner_summary_lists_every_owned_shop() {
        let view = start_view(0, None);
        let owned = |id: &str, name: &str, owner: &str| ShopInfo {
            owner_id: Some(owner.to_string()),
            ..shop(id, name, None)
        };
        view.send(ShopsUpdated {
            shops: vec![
                owned("s1", "Green Farm", "u1"),
                owned("s2", "Other Farm", "u2"),
                owned("s3", "Empty Farm", "u1"),
            ],
            skipped: Vec::new(),
            rejected: Vec::new(),
        })
        .await
        .unwrap();
        view.send(ProductsUpdated {
            products: vec![product("p1", "s1"), product("p2", "s2"), product("p3", "s1")],
            rejected: Vec::new(),
        })
        .await
        .unwrap();

        let summary = view
            .send(GetOwnerSummary {
                owner_id: "u1".to_string(),
            })
            .await
            .unwrap();
        let counts: Vec<(&str, usize)> = summary
            .buckets
            .iter()
            .map(|bucket| (bucket.name.as_str(), bucket.count))
            .collect();
        assert_eq!(counts, vec![("Green Farm", 2), ("Empty Farm", 0)]);

        let nobody = view
            .send(GetOwnerSummary {
                owner_id: "u9".to_string(),
            })
            .await
            .unwrap();
        assert!(nobody.buckets.is_empty());
    }

    #[actix_rt::test]
    async fn bursts_collapse_into_one_consistent_snapshot() {
        let view = start_view(50, Some(dhaka()));
        let collector = Collector::default().start();
        view.send(Subscribe {
            subscriber: collector.clone().recipient(),
        })
        .await
        .unwrap();

        view.send(three_shops()).await.unwrap();
        view.send(SetSearchRadius { radius_km: 10.0 }).await.unwrap();
        view.send(SetSearchRadius { radius_km: 20.0 }).await.unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;

        let seen = collector.send(GetSeen).await.unwrap();
        // initial snapshot on subscribe, then one for the whole burst
        assert_eq!(seen.len(), 2);
        let last = &seen[1];
        assert_eq!(last.revision, 3);
        assert_eq!(last.radius.km(), 20.0);
        assert_eq!(nearby_ids(last), vec!["s1", "s2"]);
    }

    #[actix_rt::test]
    async fn snapshot_request_flushes_pending_recomputation() {
        let view = start_view(10_000, Some(dhaka()));
        view.send(three_shops()).await.unwrap();

        let snapshot = view.send(GetMarketSnapshot).await.unwrap();
        assert_eq!(snapshot.revision, 1);
        assert_eq!(nearby_ids(&snapshot), vec!["s1", "s2"]);
    }
}
