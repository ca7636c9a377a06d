use clap::Parser;
use std::path::PathBuf;
use zoningbot::config::{load_settings, ConfigBuilder};
use zoningbot::pipeline;

/// Monitor Chicago zoning reclassification ordinances near an area of interest
#[derive(Parser, Debug)]
#[command(name = "zoningbot")]
#[command(about = "Fetch, geocode, and report zoning reclassification ordinances")]
#[command(version)]
struct Args {
    /// SQLite store for incremental runs
    #[arg(long, default_value = "data/zoningbot.db")]
    store: PathBuf,

    /// Community-areas GeoJSON file (feature property "community")
    #[arg(long, default_value = "data/community_areas.geojson")]
    communities: PathBuf,

    /// Ward-boundaries CSV with a WKT geometry column ("the_geom")
    #[arg(long, default_value = "data/ward_boundaries.csv")]
    wards: PathBuf,

    /// Directory the CSV reports are written to
    #[arg(long, default_value = "data/out")]
    out_dir: PathBuf,

    /// Optional TOML settings file (email, area-of-interest overrides)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the fetch watermark (ISO 8601, e.g. 2025-01-01T00:00:00.000Z)
    #[arg(long)]
    since: Option<String>,

    /// Send the notification email even if the settings file disables it
    #[arg(long)]
    email: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut builder = ConfigBuilder::new(&args.store, &args.communities, &args.wards, &args.out_dir);
    if let Some(path) = &args.config {
        builder = builder.settings(load_settings(path)?);
    }
    if let Some(since) = args.since {
        builder = builder.since(since);
    }
    if args.email {
        builder = builder.email_enabled(true);
    }
    let config = builder.build()?;

    let summary = pipeline::run(&config)?;
    if summary.fetched == 0 {
        println!("Done: no changes since {}.", summary.since);
    } else {
        println!(
            "Done: {} new record(s), {} total, {} near {}.",
            summary.fetched, summary.total, summary.area_matches, config.area_of_interest
        );
    }
    Ok(())
}
