use actix::prelude::*;
use clap::Parser;
use colored::Color;
use common::config::MarketConfig;
use common::errors::MarketError;
use common::logger::Logger;
use common::types::{GeoPoint, SearchRadius};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::ctrl_c;

mod market_actors;
mod messages;

use market_actors::feed_watcher::FeedWatcher;
use market_actors::market_view::MarketView;
use market_actors::ui_handler::UIHandler;
use messages::internal_messages::{Subscribe, UserCommand};

#[derive(Parser, Debug)]
#[command(name = "market")]
#[command(about = "Nearby farm shops and per-shop product counts", long_about = None)]
struct Cli {
    /// JSON feed with `shops` and `products`
    feed: PathBuf,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Your position as `lat,lon`; every shop is listed without it
    #[arg(long, allow_hyphen_values = true)]
    at: Option<GeoPoint>,

    /// Search radius in km (clamped to the configured bounds)
    #[arg(short, long)]
    radius: Option<f64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn into_io(err: MarketError) -> std::io::Error {
    match err {
        MarketError::Io(err) => err,
        other => std::io::Error::other(other),
    }
}

#[actix::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => MarketConfig::from_file(path).map_err(into_io)?,
        None => MarketConfig::default(),
    };
    config.verbose |= cli.verbose;
    let logger = Logger::new("Market", Color::Green).with_verbose(config.verbose);

    let bounds = config.radius_bounds().map_err(into_io)?;
    let radius = cli
        .radius
        .map(|km| SearchRadius::clamped(km, &bounds))
        .unwrap_or_else(|| config.default_radius());

    let market_view = MarketView::new(&config, cli.at, radius)
        .map_err(into_io)?
        .start();
    let feed_watcher = FeedWatcher::new(cli.feed.clone(), market_view.clone(), &config).start();
    let ui_handler = UIHandler::new(
        market_view.clone(),
        feed_watcher.clone().recipient(),
        bounds,
        logger.clone(),
    )
    .start();
    market_view.do_send(Subscribe {
        subscriber: ui_handler.clone().recipient(),
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            _ = ctrl_c() => {
                logger.info("Ctrl-C received, shutting down...");
                break;
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match line.parse::<UserCommand>() {
                    Ok(UserCommand::Quit) => break,
                    Ok(command) => ui_handler.do_send(command),
                    Err(err) => logger.warn(err.to_string()),
                },
                Ok(None) => {
                    logger.info("Input closed, press Ctrl-C to exit.");
                    stdin_open = false;
                }
                Err(err) => {
                    logger.error(format!("Error while reading input: {}", err));
                    stdin_open = false;
                }
            }
        }
    }

    System::current().stop();
    Ok(())
}
