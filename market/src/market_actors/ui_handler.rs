use crate::market_actors::market_view::MarketView;
use crate::messages::internal_messages::{COMMAND_HELP, ReloadFeed, UserCommand};
use actix::prelude::*;
use common::logger::Logger;
use common::messages::{
    GetOwnerSummary, MarketSnapshot, OwnerSummary, SetReferenceLocation, SetSearchRadius,
};
use common::types::{RadiusBounds, SearchRadius};
use common::utils::{chart_color, format_distance};

/// Actor UIHandler: terminal front of the market screen.
///
/// Turns typed commands into radius/location changes and renders the
/// snapshots published by the [`MarketView`]. Snapshots that are not newer
/// than the last rendered one are dropped.
pub struct UIHandler {
    pub market_view: Addr<MarketView>,
    pub feed: Recipient<ReloadFeed>,
    pub bounds: RadiusBounds,
    pub last_snapshot: Option<MarketSnapshot>,
    pub last_owner_summary: Option<OwnerSummary>,
    pub logger: Logger,
}

impl UIHandler {
    pub fn new(
        market_view: Addr<MarketView>,
        feed: Recipient<ReloadFeed>,
        bounds: RadiusBounds,
        logger: Logger,
    ) -> Self {
        UIHandler {
            market_view,
            feed,
            bounds,
            last_snapshot: None,
            last_owner_summary: None,
            logger,
        }
    }

    fn render(&self, snapshot: &MarketSnapshot) {
        for line in render_lines(snapshot) {
            self.logger.info(line);
        }
        if snapshot.skipped_locations > 0 {
            self.logger.warn(format!(
                "{} shop(s) hidden because their stored location is unreadable.",
                snapshot.skipped_locations
            ));
        }
        if snapshot.rejected_records > 0 {
            self.logger.warn(format!(
                "{} feed record(s) could not be read and were left out.",
                snapshot.rejected_records
            ));
        }
    }
}

/// Text rendering of a snapshot, one entry per line.
pub fn render_lines(snapshot: &MarketSnapshot) -> Vec<String> {
    let mut lines = Vec::new();
    match &snapshot.reference {
        Some(reference) => lines.push(format!(
            "Shops within {} of {}: {}",
            snapshot.radius,
            reference,
            snapshot.nearby_shops.len()
        )),
        None => lines.push(format!(
            "Location unavailable, showing all {} shops",
            snapshot.nearby_shops.len()
        )),
    }
    for (i, entry) in snapshot.nearby_shops.iter().enumerate() {
        let distance = entry
            .distance_km
            .map(format_distance)
            .unwrap_or_else(|| "distance unknown".to_string());
        lines.push(format!("{}: {} ({})", i + 1, entry.entity.name, distance));
    }
    lines.push(format!(
        "{} of {} products come from these shops",
        snapshot.nearby_products.len(),
        snapshot.total_products
    ));
    for (i, bucket) in snapshot.buckets.iter().enumerate() {
        lines.push(format!(
            "[{}] {} ({})",
            chart_color(i),
            bucket.name,
            bucket.count
        ));
    }
    lines
}

/// Text rendering of an owner's shops and their product counts.
pub fn render_owner_lines(summary: &OwnerSummary) -> Vec<String> {
    if summary.buckets.is_empty() {
        return vec![format!("Owner {} has no shops", summary.owner_id)];
    }
    let mut lines = vec![format!(
        "Shops of {}: {}",
        summary.owner_id,
        summary.buckets.len()
    )];
    for (i, bucket) in summary.buckets.iter().enumerate() {
        lines.push(format!(
            "[{}] {} ({})",
            chart_color(i),
            bucket.name,
            bucket.count
        ));
    }
    lines
}

impl Actor for UIHandler {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        self.logger.info("UIHandler started!");
        self.logger.info(COMMAND_HELP);
    }
}

impl Handler<MarketSnapshot> for UIHandler {
    type Result = ();

    fn handle(&mut self, msg: MarketSnapshot, _ctx: &mut Self::Context) {
        if let Some(last) = &self.last_snapshot {
            if msg.revision <= last.revision {
                self.logger.debug(format!(
                    "Dropping snapshot {} (already showing {})",
                    msg.revision, last.revision
                ));
                return;
            }
        }
        self.render(&msg);
        self.last_snapshot = Some(msg);
    }
}

impl Handler<UserCommand> for UIHandler {
    type Result = ();

    fn handle(&mut self, msg: UserCommand, ctx: &mut Self::Context) {
        match msg {
            UserCommand::Radius(km) => {
                let radius = SearchRadius::clamped(km, &self.bounds);
                if radius.km() != km {
                    self.logger.warn(format!(
                        "Radius must be between {} and {} km, using {}",
                        self.bounds.min_km(),
                        self.bounds.max_km(),
                        radius
                    ));
                }
                self.market_view.do_send(SetSearchRadius {
                    radius_km: radius.km(),
                });
            }
            UserCommand::Location(point) => {
                self.market_view.do_send(SetReferenceLocation {
                    reference: Some(point),
                });
            }
            UserCommand::LocationOff => {
                self.market_view
                    .do_send(SetReferenceLocation { reference: None });
            }
            UserCommand::Owner(owner_id) => {
                self.market_view
                    .send(GetOwnerSummary { owner_id })
                    .into_actor(self)
                    .map(|res, act, _ctx| match res {
                        Ok(summary) => {
                            for line in render_owner_lines(&summary) {
                                act.logger.info(line);
                            }
                            act.last_owner_summary = Some(summary);
                        }
                        Err(_) => act.logger.error("Error retrieving the owner summary."),
                    })
                    .wait(ctx);
            }
            UserCommand::Show => match &self.last_snapshot {
                Some(snapshot) => self.render(snapshot),
                None => self.logger.warn("Nothing to show yet."),
            },
            UserCommand::Reload => self.feed.do_send(ReloadFeed { force: true }),
            UserCommand::Help => self.logger.info(COMMAND_HELP),
            UserCommand::Quit => self.logger.info("Bye!"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colored::Color;
    use common::config::MarketConfig;
    use common::messages::{GetMarketSnapshot, ShopsUpdated};
    use common::proximity::NearbyEntry;
    use common::types::{AggregateBucket, GeoPoint, ShopInfo};

    struct NoFeed;

    impl Actor for NoFeed {
        type Context = Context<Self>;
    }

    impl Handler<ReloadFeed> for NoFeed {
        type Result = bool;

        fn handle(&mut self, _msg: ReloadFeed, _ctx: &mut Self::Context) -> bool {
            false
        }
    }

    #[derive(Message)]
    #[rtype(result = "Option<u64>")]
    struct GetShownRevision;

    impl Handler<GetShownRevision> for UIHandler {
        type Result = Option<u64>;

        fn handle(&mut self, _msg: GetShownRevision, _ctx: &mut Self::Context) -> Option<u64> {
            self.last_snapshot.as_ref().map(|snapshot| snapshot.revision)
        }
    }

    fn snapshot(revision: u64) -> MarketSnapshot {
        MarketSnapshot {
            revision,
            reference: Some(GeoPoint::new(23.8103, 90.4125)),
            radius: SearchRadius::default(),
            nearby_shops: vec![NearbyEntry {
                entity: ShopInfo {
                    id: "s1".to_string(),
                    name: "Green Farm".to_string(),
                    owner_id: None,
                    location: Some(GeoPoint::new(23.82, 90.41)),
                },
                distance_km: Some(1.2345),
            }],
            nearby_products: Vec::new(),
            buckets: vec![AggregateBucket {
                key: "s1".to_string(),
                name: "Green Farm".to_string(),
                count: 4,
            }],
            total_products: 4,
            skipped_locations: 0,
            rejected_records: 0,
        }
    }

    fn start_ui() -> (Addr<MarketView>, Addr<UIHandler>) {
        let config = MarketConfig {
            debounce_ms: 0,
            ..MarketConfig::default()
        };
        let view = MarketView::new(&config, None, SearchRadius::default())
            .unwrap()
            .start();
        let ui = UIHandler::new(
            view.clone(),
            NoFeed.start().recipient(),
            RadiusBounds::default(),
            Logger::new("Test UI", Color::Blue),
        )
        .start();
        (view, ui)
    }

    #[test]
    fn renders_shops_and_buckets() {
        let lines = render_lines(&snapshot(1));
        assert!(lines[0].starts_with("Shops within 50 km"));
        assert_eq!(lines[1], "1: Green Farm (1.2 km)");
        assert_eq!(lines[2], "0 of 4 products come from these shops");
        assert_eq!(lines[3], "[#4CAF50] Green Farm (4)");
    }

    #[test]
    fn renders_missing_location() {
        let mut without_reference = snapshot(1);
        without_reference.reference = None;
        without_reference.nearby_shops[0].distance_km = None;
        let lines = render_lines(&without_reference);
        assert_eq!(lines[0], "Location unavailable, showing all 1 shops");
        assert_eq!(lines[1], "1: Green Farm (distance unknown)");
    }

    #[test]
    fn renders_owner_summary() {
        let summary = OwnerSummary {
            owner_id: "u1".to_string(),
            buckets: vec![
                AggregateBucket {
                    key: "s1".to_string(),
                    name: "Green Farm".to_string(),
                    count: 2,
                },
                AggregateBucket {
                    key: "s3".to_string(),
                    name: "Empty Farm".to_string(),
                    count: 0,
                },
            ],
        };
        assert_eq!(
            render_owner_lines(&summary),
            vec![
                "Shops of u1: 2",
                "[#4CAF50] Green Farm (2)",
                "[#2196F3] Empty Farm (0)",
            ]
        );
        let empty = OwnerSummary {
            owner_id: "u9".to_string(),
            buckets: Vec::new(),
        };
        assert_eq!(render_owner_lines(&empty), vec!["Owner u9 has no shops"]);
    }

    #[actix_rt::test]
    async fn stale_snapshots_are_dropped() {
        let (_view, ui) = start_ui();
        ui.send(snapshot(3)).await.unwrap();
        ui.send(snapshot(2)).await.unwrap();
        assert_eq!(ui.send(GetShownRevision).await.unwrap(), Some(3));

        ui.send(snapshot(4)).await.unwrap();
        assert_eq!(ui.send(GetShownRevision).await.unwrap(), Some(4));
    }

    #[actix_rt::test]
    async fn commands_reach_the_market_view() {
        let (view, ui) = start_ui();

        ui.send(UserCommand::Radius(900.0)).await.unwrap();
        ui.send(UserCommand::Location(GeoPoint::new(23.8, 90.4)))
            .await
            .unwrap();
        let snapshot = view.send(GetMarketSnapshot).await.unwrap();
        assert_eq!(snapshot.radius.km(), 200.0);
        assert_eq!(snapshot.reference, Some(GeoPoint::new(23.8, 90.4)));

        ui.send(UserCommand::LocationOff).await.unwrap();
        let snapshot = view.send(GetMarketSnapshot).await.unwrap();
        assert_eq!(snapshot.reference, None);
    }

    #[derive(Message)]
    #[rtype(result = "Option<OwnerSummary>")]
    struct GetShownOwner;

    impl Handler<GetShownOwner> for UIHandler {
        type Result = Option<OwnerSummary>;

        fn handle(&mut self, _msg: GetShownOwner, _ctx: &mut Self::Context) -> Self::Result {
            self.last_owner_summary.clone()
        }
    }

    #[actix_rt::test]
    async fn owner_command_shows_empty_shops_too() {
        let (view, ui) = start_ui();
        let owned = |id: &str, name: &str| ShopInfo {
            id: id.to_string(),
            name: name.to_string(),
            owner_id: Some("u1".to_string()),
            location: None,
        };
        view.send(ShopsUpdated {
            shops: vec![owned("s1", "Green Farm"), owned("s2", "Empty Farm")],
            skipped: Vec::new(),
            rejected: Vec::new(),
        })
        .await
        .unwrap();

        ui.send(UserCommand::Owner("u1".to_string())).await.unwrap();
        let summary = ui.send(GetShownOwner).await.unwrap().unwrap();
        let counts: Vec<usize> = summary.buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![0, 0]);
        assert_eq!(summary.buckets[1].name, "Empty Farm");
    }
}
