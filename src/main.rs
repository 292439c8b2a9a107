//! Spotify Stats - Main entry point
//!
//! Loads the streaming history, then renders the report selected by MODE.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use spotify_stats::{
    analytics,
    config::{Config, Overrides},
    display::{self, print_section, print_section_simple},
    error::Result,
    genres::{self, CsvGenreStore, Credentials, SpotifyClient},
    history::{self, Event},
    plot, Report,
};

#[derive(Parser)]
#[command(name = "spotify-stats")]
#[command(author, version, about = "Spotify JSON data analyser")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Report to produce: stats, listen_time_plot, top_artists, top_genre
    #[arg(default_value = "stats")]
    mode: String,

    /// Folder containing unzipped Spotify data (defaults to ./data/)
    #[arg(short = 'd', long = "dir")]
    dir: Option<PathBuf>,

    /// Number of rows to show in every top list
    #[arg(short = 'n', long = "rows")]
    rows: Option<usize>,

    /// Directory charts are written to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Genre cache file
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or edit configuration
    Config {
        /// Print current configuration
        #[arg(long)]
        show: bool,

        /// Create default configuration file
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLIENT_ID / CLIENT_SECRET may live in a .env file
    let dotenv = dotenvy::dotenv();

    let config = if let Some(ref path) = cli.config {
        Config::load_from(path)?
    } else {
        Config::load()?
    };
    let config = config.with_overrides(Overrides {
        history_dir: cli.dir,
        top_n: cli.rows,
        output_dir: cli.output,
        cache_path: cli.cache,
    });
    config.validate()?;

    // Logs go to stderr so report output stays clean
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Some(e) = dotenv_problem(dotenv) {
        warn!("Failed to load .env: {e}");
    }

    match cli.command {
        Some(Commands::Config { show, init }) => {
            if init {
                let default_config = Config::default();
                default_config.save()?;
                println!(
                    "Created default configuration at {}",
                    Config::config_path()?.display()
                );
            } else if show {
                let contents = toml::to_string_pretty(&config)?;
                println!("{contents}");
            } else {
                println!("Configuration path: {}", Config::config_path()?.display());
            }
            Ok(())
        }

        None => run_report(select_report(&cli.mode), &config),
    }
}

/// A `.env` load error worth reporting. A missing file is not one.
fn dotenv_problem<T>(result: std::result::Result<T, dotenvy::Error>) -> Option<dotenvy::Error> {
    result.err().filter(|e| !e.not_found())
}

/// Resolve MODE, printing the list of modes and using the overview when unknown.
fn select_report(mode: &str) -> Report {
    Report::from_mode(mode).unwrap_or_else(|unknown| {
        println!("{unknown}");
        Report::Stats
    })
}

fn run_report(report: Report, config: &Config) -> Result<()> {
    let history = history::load_history(&config.general.history_dir)?;
    let events = history.enrich()?;

    if events.is_empty() {
        println!(
            "No listening data found in {}.",
            config.general.history_dir.display()
        );
        println!("Unzip your Spotify extended streaming history there, or pass -d.");
        return Ok(());
    }

    let limit = config.report.top_n;
    match report {
        Report::Stats => {
            print_section("SPOTIFY STATS - OVERVIEW");
            let overview = analytics::overview(&events, limit);
            display::display_overview(&overview, limit);
            println!("\n{}\n", "=".repeat(50));
            Ok(())
        }

        Report::ListenTimePlot => {
            let years = analytics::minutes_by_year(&events);
            let path = plot::listen_time_by_year(&years, &config.report.output_dir)?;
            println!("Chart written to {}", path.display());
            Ok(())
        }

        Report::TopArtists => {
            let ranks = analytics::yearly_top_artists(&events, limit);
            print_section(&format!("TOP {limit} ARTISTS BY YEAR"));
            display::display_yearly_top_artists(&ranks);
            let path = plot::top_artists_by_year(&ranks, limit, &config.report.output_dir)?;
            println!("\nChart written to {}", path.display());
            Ok(())
        }

        Report::TopGenre => run_top_genre(&events, config),
    }
}

fn run_top_genre(events: &[Event], config: &Config) -> Result<()> {
    let store = CsvGenreStore::new(&config.genres.cache_path);

    let entries = genres::get_or_fetch(&store, || {
        warn!(
            "Genre cache {} not found. Fetching genres from Spotify, this will take a while (Ctrl-C to cancel)",
            store.path().display()
        );
        let credentials = Credentials::from_env()?;
        let client = SpotifyClient::connect(&credentials, &config.spotify)?;
        genres::resolve_genres(
            &client,
            &genres::unique_track_ids(events),
            config.genres.batch_size,
        )
    })?;

    let limit = config.report.top_n;
    let counts = analytics::genre_counts(&entries, limit);
    print_section_simple(&format!("TOP {limit} GENRES"));
    display::display_genre_counts(&counts);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_no_arguments_selects_stats() {
        let cli = parse(&["spotify-stats"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.mode, "stats");
        assert_eq!(select_report(&cli.mode), Report::Stats);
    }

    #[test]
    fn test_mode_and_overrides() {
        let cli = parse(&["spotify-stats", "top_artists", "-d", "export", "-n", "5"]);
        assert!(cli.command.is_none());
        assert_eq!(select_report(&cli.mode), Report::TopArtists);
        assert_eq!(cli.dir, Some(PathBuf::from("export")));
        assert_eq!(cli.rows, Some(5));
    }

    #[test]
    fn test_unknown_mode_falls_back_to_stats() {
        let cli = parse(&["spotify-stats", "wrapped"]);
        assert!(cli.command.is_none());
        assert_eq!(select_report(&cli.mode), Report::Stats);
    }

    #[test]
    fn test_config_subcommand() {
        let cli = parse(&["spotify-stats", "config", "--show"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                show: true,
                init: false
            })
        ));
    }

    #[test]
    fn test_global_flags_before_subcommand() {
        let cli = parse(&["spotify-stats", "-v", "config", "--show"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Config { show: true, .. })));

        let cli = parse(&["spotify-stats", "-c", "my.toml", "config", "--init"]);
        assert_eq!(cli.config, Some(PathBuf::from("my.toml")));
        assert!(matches!(cli.command, Some(Commands::Config { init: true, .. })));
    }

    #[test]
    fn test_missing_dotenv_is_not_reported() {
        let dir = tempfile::tempdir().unwrap();
        let result = dotenvy::from_path(dir.path().join(".env"));
        assert!(dotenv_problem(result).is_none());
    }

    #[test]
    fn test_malformed_dotenv_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "this is not an env file\n").unwrap();
        assert!(dotenv_problem(dotenvy::from_path(&path)).is_some());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["spotify-stats", "config", "--show", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Config { show: true, .. })));
    }
}
