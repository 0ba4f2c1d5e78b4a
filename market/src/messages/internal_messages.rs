use actix::prelude::*;
use common::messages::MarketSnapshot;
use common::types::GeoPoint;
use std::str::FromStr;
use thiserror::Error;

/// Registers a recipient for every snapshot the market view publishes.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Subscribe {
    pub subscriber: Recipient<MarketSnapshot>,
}

/// Asks the feed watcher to read its file again. Without `force` the data is
/// only pushed when the file contents changed. Resolves to whether new data
/// was pushed.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "bool")]
pub struct ReloadFeed {
    pub force: bool,
}

/// A line typed into the terminal.
#[derive(Message, Debug, Clone, PartialEq)]
#[rtype(result = "()")]
pub enum UserCommand {
    Radius(f64),
    Location(GeoPoint),
    LocationOff,
    /// Product counts for every shop of one owner.
    Owner(String),
    Show,
    Reload,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("unknown command '{0}', type 'help' for the list")]
    Unknown(String),
    #[error("'{command}' expects {expected}")]
    BadArgument {
        command: &'static str,
        expected: &'static str,
    },
}

pub const COMMAND_HELP: &str = "commands: radius <km> | location <lat> <lon> | location off | owner <id> | show | reload | help | quit";

impl FromStr for UserCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, argument)) => (command, argument.trim()),
            None => (line, ""),
        };
        match command.to_lowercase().as_str() {
            "radius" => argument
                .parse::<f64>()
                .map(UserCommand::Radius)
                .map_err(|_| CommandError::BadArgument {
                    command: "radius",
                    expected: "a number of kilometers",
                }),
            "location" if argument.eq_ignore_ascii_case("off") => Ok(UserCommand::LocationOff),
            "location" => argument
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(",")
                .parse::<GeoPoint>()
                .map(UserCommand::Location)
                .map_err(|_| CommandError::BadArgument {
                    command: "location",
                    expected: "'<lat> <lon>' or 'off'",
                }),
            "owner" if argument.is_empty() => Err(CommandError::BadArgument {
                command: "owner",
                expected: "an owner id",
            }),
            "owner" => Ok(UserCommand::Owner(argument.to_string())),
            "show" | "" => Ok(UserCommand::Show),
            "reload" => Ok(UserCommand::Reload),
            "help" | "?" => Ok(UserCommand::Help),
            "quit" | "exit" => Ok(UserCommand::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
