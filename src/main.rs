// LogTail - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading (platform default or --config) and CLI overrides
// 3. Logging initialisation (debug mode support)
// 4. Engine construction and request serving (single request or stdin)

pub use logtail::app;
pub use logtail::core;
pub use logtail::gateway;
pub use logtail::platform;
pub use logtail::util;

use clap::Parser;
use gateway::request::TailRequest;
use gateway::response::{to_json_line, ErrorResponse};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// LogTail - cached, concurrent tail of server-side log files.
///
/// With FILE, prints the last lines of that file as JSON. Without FILE,
/// reads one request per stdin line (`FILE [N] [FILTER...]`) and answers
/// each with a JSON line, reusing cached results between requests.
#[derive(Parser, Debug)]
#[command(name = "logtail", version, about)]
struct Cli {
    /// Log file name, relative to the base directory.
    file: Option<String>,

    /// Number of lines to return.
    #[arg(short = 'n', long = "num-entries")]
    num_entries: Option<usize>,

    /// Case-insensitive substring filter.
    #[arg(short = 'f', long = "filter")]
    filter: Option<String>,

    /// Directory containing the log files.
    #[arg(short = 'b', long = "base-dir")]
    base_dir: Option<PathBuf>,

    /// Path to config.toml (defaults to the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Maximum number of files tracked at once.
    #[arg(long = "max-watchers")]
    max_watchers: Option<usize>,

    /// Number of worker threads executing reads.
    #[arg(long = "workers")]
    workers: Option<usize>,

    /// Behaviour when the watcher limit is reached: "reject" or "lru".
    #[arg(long = "policy")]
    policy: Option<String>,

    /// Print registry statistics to stderr on exit.
    #[arg(long = "stats")]
    stats: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Config is loaded before logging exists; warnings are replayed below.
    let (mut config, warnings) = match &cli.config {
        Some(path) => match platform::config::load_config(path) {
            Ok(loaded) => loaded,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        None => {
            let paths = platform::config::PlatformPaths::resolve();
            platform::config::load_config_or_default(&paths.config_file())
        }
    };

    util::logging::init(
        cli.debug,
        config.log_level.as_deref(),
        config.log_file.as_deref(),
    );

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "LogTail starting"
    );
    for warning in &warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    // CLI overrides > config.toml > defaults
    let overrides = platform::config::ConfigOverrides {
        base_dir: cli.base_dir.clone(),
        max_watchers: cli.max_watchers,
        worker_threads: cli.workers,
        capacity_policy: cli.policy.clone(),
    };
    for warning in config.apply_overrides(&overrides) {
        tracing::warn!(warning = %warning, "Ignoring command-line override");
    }

    let engine = match app::engine::Engine::new(config.engine_config()) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start engine");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let ok = match cli.file {
        Some(ref file) => {
            let request = TailRequest::new(file.as_str(), cli.num_entries, cli.filter.as_deref());
            serve_one(&engine, &request, &mut io::stdout().lock())
        }
        None => serve_stdin(&engine, &cli),
    };

    engine.shutdown();
    if cli.stats {
        eprintln!("{}", to_json_line(&engine.stats()));
    }
    if !ok {
        std::process::exit(1);
    }
}

/// Answer one request, writing a JSON line to `out`. Returns false on failure.
fn serve_one(engine: &app::engine::Engine, request: &TailRequest, out: &mut impl Write) -> bool {
    let (line, ok) = match engine.handle(request) {
        Ok(response) => (to_json_line(&response), true),
        Err(e) => {
            tracing::error!(
                file = %request.file_name,
                status = e.status_code(),
                error = %e,
                "Error processing tail request"
            );
            (to_json_line(&ErrorResponse::from(&e)), false)
        }
    };

    if let Err(e) = writeln!(out, "{line}") {
        tracing::error!(error = %e, "Failed to write response");
        return false;
    }
    ok
}

/// Serve requests read from stdin until EOF. Returns true if the stream was
/// consumed; individual request failures are reported inline.
fn serve_stdin(engine: &app::engine::Engine, cli: &Cli) -> bool {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read request from stdin");
                return false;
            }
        };
        let Some(request) = parse_request_line(&line, cli) else {
            continue;
        };
        serve_one(engine, &request, &mut out);
    }
    true
}

/// Parse `FILE [N] [FILTER...]`. Blank lines and `#` comments are skipped.
/// A second token that is not a number starts the filter.
fn parse_request_line(line: &str, cli: &Cli) -> Option<TailRequest> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let mut tokens = line.split_whitespace();
    let file = tokens.next()?.to_string();
    let rest: Vec<&str> = tokens.collect();

    let (num_entries, filter) = match rest.split_first() {
        None => (cli.num_entries, cli.filter.clone()),
        Some((first, tail)) => match first.parse::<usize>() {
            Ok(n) if tail.is_empty() => (Some(n), cli.filter.clone()),
            Ok(n) => (Some(n), Some(tail.join(" "))),
            Err(_) => (cli.num_entries, Some(rest.join(" "))),
        },
    };

    Some(TailRequest {
        file_name: file,
        num_entries,
        filter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_line_variants() {
        let cli = Cli::parse_from(["logtail", "-n", "7"]);

        assert_eq!(parse_request_line("   ", &cli), None);
        assert_eq!(parse_request_line("# comment", &cli), None);
        assert_eq!(
            parse_request_line("app.log", &cli),
            Some(TailRequest::new("app.log", Some(7), None))
        );
        assert_eq!(
            parse_request_line("app.log 3", &cli),
            Some(TailRequest::new("app.log", Some(3), None))
        );
        assert_eq!(
            parse_request_line("app.log 3 disk  full", &cli),
            Some(TailRequest::new("app.log", Some(3), Some("disk full")))
        );
        assert_eq!(
            parse_request_line("app.log error", &cli),
            Some(TailRequest::new("app.log", Some(7), Some("error")))
        );
    }
}
