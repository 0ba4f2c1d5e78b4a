use chrono::Local;
use colored::*;

/// Named console logger. Each actor owns one with its own color so that
/// interleaved output stays readable.
#[derive(Debug, Clone)]
pub struct Logger {
    pub name: String,
    pub info_color: Color,
    /// Enables `debug` lines.
    pub verbose: bool,
}

impl Logger {
    pub fn new(name: impl Into<String>, info_color: Color) -> Self {
        Self {
            name: name.into().to_uppercase(),
            info_color,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn timestamp() -> String {
        Local::now().format("%H:%M:%S").to_string()
    }

    fn tag(&self, level: &str) -> String {
        format!("[{}][{}][{}]", Self::timestamp(), level, self.name)
    }

    pub fn debug(&self, msg: impl AsRef<str>) {
        if !self.verbose {
            return;
        }
        println!(
            "{} {} {}",
            self.tag("DEBUG").dimmed(),
            "→".dimmed(),
            msg.as_ref().dimmed()
        );
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        println!(
            "{} {} {}",
            self.tag("INFO").bold().color(self.info_color),
            "→".dimmed(),
            msg.as_ref()
        );
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        println!(
            "{} {} {}",
            self.tag("WARN").bold().yellow(),
            "→".dimmed(),
            msg.as_ref()
        );
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        eprintln!(
            "{} {} {}",
            self.tag("ERROR").bold().bright_red(),
            "→".dimmed(),
            msg.as_ref()
        );
    }
}
