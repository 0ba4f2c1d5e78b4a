use crate::market_actors::market_view::MarketView;
use crate::messages::internal_messages::ReloadFeed;
use actix::prelude::*;
use colored::Color;
use common::config::MarketConfig;
use common::errors::Result;
use common::logger::Logger;
use common::messages::{ProductsUpdated, ShopsUpdated};
use common::types::raw_records::MarketFeed;
use std::path::PathBuf;
use std::time::Duration;

/// The `FeedWatcher` actor stands in for the document database subscription.
/// It reads a JSON feed file, normalizes it and pushes the full shop and
/// product collections to the [`MarketView`].
///
/// When a poll interval is configured the file is read again periodically
/// and the collections are pushed only when its contents changed. A read or
/// parse failure keeps the previously pushed data in place.
pub struct FeedWatcher {
    pub path: PathBuf,
    pub market_view: Addr<MarketView>,
    pub poll_interval: Option<Duration>,
    pub fallback_name: String,
    /// Contents of the last successfully pushed feed.
    pub last_contents: Option<String>,
    pub logger: Logger,
}

impl FeedWatcher {
    pub fn new(path: PathBuf, market_view: Addr<MarketView>, config: &MarketConfig) -> Self {
        FeedWatcher {
            path,
            market_view,
            poll_interval: config.feed_poll_interval(),
            fallback_name: config.fallback_name.clone(),
            last_contents: None,
            logger: Logger::new("Feed Watcher", Color::Magenta).with_verbose(config.verbose),
        }
    }

    /// Reads the feed and pushes it if it changed. Returns whether data was
    /// pushed.
    fn reload(&mut self) -> Result<bool> {
        let contents = std::fs::read_to_string(&self.path)?;
        if self.last_contents.as_deref() == Some(contents.as_str()) {
            return Ok(false);
        }
        let feed = MarketFeed::from_json(&contents)?.normalize(&self.fallback_name);
        self.logger.info(format!(
            "Loaded {} shops and {} products from {} ({} unreadable records)",
            feed.shops.len(),
            feed.products.len(),
            self.path.display(),
            feed.rejected_shops.len() + feed.rejected_products.len()
        ));
        self.market_view.do_send(ShopsUpdated {
            shops: feed.shops,
            skipped: feed.skipped,
            rejected: feed.rejected_shops,
        });
        self.market_view.do_send(ProductsUpdated {
            products: feed.products,
            rejected: feed.rejected_products,
        });
        self.last_contents = Some(contents);
        Ok(true)
    }

    fn reload_or_keep(&mut self) -> bool {
        match self.reload() {
            Ok(true) => true,
            Ok(false) => {
                self.logger.debug("Feed unchanged.");
                false
            }
            Err(err) => {
                self.logger.error(format!(
                    "Could not load feed {}: {}. Keeping previous data.",
                    self.path.display(),
                    err
                ));
                false
            }
        }
    }
}

impl Actor for FeedWatcher {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.reload_or_keep();
        if let Some(interval) = self.poll_interval {
            self.logger
                .info(format!("Watching feed every {}s", interval.as_secs()));
            ctx.run_interval(interval, |act, _ctx| {
                act.reload_or_keep();
            });
        }
    }
}

impl Handler<ReloadFeed> for FeedWatcher {
    type Result = bool;

    fn handle(&mut self, msg: ReloadFeed, _ctx: &mut Self::Context) -> Self::Result {
        if msg.force {
            self.last_contents = None;
        }
        self.reload_or_keep()
    }
}
