use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Version string for the REPL.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prompt shown when no turn is open.
pub const PROMPT: &str = "cxx> ";

/// Prompt shown while a turn waits for more lines.
pub const CONTINUATION_PROMPT: &str = "...> ";

/// Interactive front end that splits C/C++ input into complete units.
#[derive(Parser, Debug)]
#[command(name = "cxxrepl")]
#[command(version = VERSION)]
#[command(about = "Collect C/C++ input line by line until it forms a complete unit", long_about = None)]
pub struct Cli {
    /// Read input from FILE instead of the terminal (batch mode)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// History file (default: ~/.cxxrepl_history)
    #[arg(long, value_name = "PATH")]
    pub history: Option<PathBuf>,

    /// Do not load or save history
    #[arg(long)]
    pub no_history: bool,

    /// Line printed after every complete unit in batch mode
    #[arg(long, default_value = "")]
    pub separator: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// History file to use, if history is enabled.
    pub fn history_path(&self) -> Option<PathBuf> {
        if self.no_history {
            return None;
        }
        self.history.clone().or_else(history_path)
    }
}

/// Default log filter for a verbosity count; `RUST_LOG` overrides it.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Return the path to the history file (~/.cxxrepl_history).
pub fn history_path() -> Option<PathBuf> {
    dirs_or_home().map(|h| h.join(".cxxrepl_history"))
}

/// Get the user's home directory from $HOME.
fn dirs_or_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
