use anyhow::{Context, Result};
use clap::Parser;
use livetagger::config::AppConfig;
use livetagger::musicbrainz::MusicBrainzClient;
use livetagger::run::{RunOptions, run};
use livetagger::scanner::metadata::LoftyTagStore;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "livetagger",
    version,
    about = "Find live albums via MusicBrainz and prefix their album tag with (Live)"
)]
struct Cli {
    /// Path to the music directory
    #[arg(short, long)]
    path: PathBuf,

    /// Config file (defaults to ~/.config/livetagger/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip directories whose path contains this (overrides config exclude_marker)
    #[arg(long)]
    exclude: Option<String>,

    /// Decide and log, but don't write any tags
    #[arg(long)]
    dry_run: bool,

    /// Verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };

    if cli.dry_run {
        println!("DRY RUN: no tags will be written");
    }

    let extensions = config.resolve_extensions();
    let options = RunOptions {
        root: &cli.path,
        marker_path: config.marker_path(),
        exclude_marker: cli.exclude.as_deref().unwrap_or(&config.exclude_marker),
        extensions: &extensions,
        probe: &config.probe,
        dry_run: cli.dry_run,
    };
    let client = MusicBrainzClient::new(&config.musicbrainz);
    let report = run(&options, &LoftyTagStore, &client).context("Run failed")?;

    let summary = report.summary;
    println!(
        "Tagging complete: {} albums, {} live by title, {} live by MusicBrainz, {} not live",
        summary.albums, summary.accepted_local, summary.accepted_remote, summary.rejected
    );
    println!(
        "Files: {} scanned, {} dropped, {} rewritten, {} already tagged, {} failed | {} lookup failures",
        report.files_seen,
        report.dropped,
        summary.files_rewritten,
        summary.already_tagged,
        summary.rewrite_failures,
        summary.lookup_failures
    );
    if cli.dry_run && summary.files_rewritten > 0 {
        println!("(dry run, re-run without --dry-run to write changes)");
    }

    Ok(())
}
