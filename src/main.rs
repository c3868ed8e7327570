use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::process::ExitCode;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::Editor;
use tracing_subscriber::EnvFilter;

use cxxrepl::config::{self, Cli};
use cxxrepl::error::ReplError;
use cxxrepl::highlight::CxxHelper;
use cxxrepl::session::{Outcome, Session};

/// Initialize structured logging on stderr; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::log_level(verbose))),
        )
        .with_writer(io::stderr)
        .try_init();
}

/// Run the interactive REPL with rustyline (when stdin is a TTY).
///
/// Returns whether every turn was accepted.
fn run_interactive(session: &mut Session, cli: &Cli) -> Result<bool, ReplError> {
    let mut rl: Editor<CxxHelper, _> = Editor::with_config(
        rustyline::Config::builder()
            .auto_add_history(true)
            .build(),
    )?;
    rl.set_helper(Some(CxxHelper::new()));

    let history = cli.history_path();
    if let Some(path) = &history {
        if let Err(e) = rl.load_history(path) {
            tracing::debug!(path = %path.display(), error = %e, "no history loaded");
        }
    }

    println!("cxxrepl {}", config::VERSION);
    println!("Type '.quit' to quit, Ctrl-C to drop the current input, Ctrl-D for EOF");
    println!();

    loop {
        // Sync identifiers to helper for completion
        if let Some(helper) = rl.helper_mut() {
            helper.update_words(session.identifiers());
        }

        match rl.readline(session.prompt()) {
            Ok(line) => {
                if !session.is_continuing() && line.trim() == ".quit" {
                    break;
                }
                match session.feed(&line)? {
                    Outcome::Empty | Outcome::Continue => {}
                    Outcome::Ready(unit) => println!("{}", unit),
                    Outcome::Rejected(_) => eprintln!("error: unbalanced input, discarded"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C: drop the open turn, continue
                session.cancel();
                continue;
            }
            Err(ReadlineError::Eof) => {
                if session.finish().is_some() {
                    eprintln!("warning: incomplete input discarded");
                }
                println!();
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    if let Some(path) = &history {
        if let Err(e) = rl.save_history(path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to save history");
        }
    }

    Ok(session.rejected() == 0)
}

/// Run batch mode: split the input stream into complete units on stdout.
///
/// Returns whether every turn was accepted and the stream ended cleanly.
fn run_batch(session: &mut Session, input: impl BufRead, separator: &str) -> Result<bool, ReplError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut turn_start = 1;

    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        if !session.is_continuing() {
            turn_start = line_no;
        }

        match session.feed(&line)? {
            Outcome::Empty | Outcome::Continue => {}
            Outcome::Ready(unit) => {
                writeln!(out, "{}", unit)?;
                writeln!(out, "{}", separator)?;
            }
            Outcome::Rejected(_) => {
                eprintln!("error: unbalanced input at lines {}-{}, discarded", turn_start, line_no);
            }
        }
    }
    out.flush()?;

    let mut clean = session.rejected() == 0;
    if session.finish().is_some() {
        eprintln!("error: incomplete input at end of stream (from line {})", turn_start);
        clean = false;
    }
    tracing::info!(accepted = session.accepted(), rejected = session.rejected(), "batch finished");
    Ok(clean)
}

fn run(cli: &Cli) -> Result<bool, ReplError> {
    let mut session = Session::new();

    if let Some(path) = &cli.file {
        let file = File::open(path).map_err(|source| ReplError::Input {
            path: path.clone(),
            source,
        })?;
        return run_batch(&mut session, BufReader::new(file), &cli.separator);
    }

    if io::stdin().is_terminal() {
        run_interactive(&mut session, cli)
    } else {
        run_batch(&mut session, io::stdin().lock(), &cli.separator)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
