pub mod market_messages;

pub use market_messages::*;
