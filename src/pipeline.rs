use crate::address::AddressExtractor;
use crate::boundaries::{load_communities, load_wards, AreaOfInterestBuffer};
use crate::config::Config;
use crate::email;
use crate::error::Result;
use crate::export;
use crate::fetch::OrdinanceFetcher;
use crate::geocode::GeocodeClient;
use crate::join::{build_zoning_requests, filter_area_of_interest};
use crate::store::Store;
use chrono::Utc;
use std::fs;

/// Counts reported after a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Watermark the fetch window started from
    pub since: String,
    /// New records fetched this run
    pub fetched: usize,
    /// Ordinance rows in the store after the run
    pub total: usize,
    /// Rows in the area-of-interest report
    pub area_matches: usize,
}

impl RunSummary {
    fn no_changes(since: String) -> Self {
        Self {
            since,
            fetched: 0,
            total: 0,
            area_matches: 0,
        }
    }
}

/// Run the whole pipeline once: fetch, extract, geocode, join, filter,
/// export, optionally notify.
///
/// The store handle is acquired here and dropped at the end; nothing holds it
/// across runs.
pub fn run(config: &Config) -> Result<RunSummary> {
    let store = Store::open(&config.store_path)?;

    let since = match &config.since_override {
        Some(since) => since.clone(),
        None => store
            .last_watermark()?
            .unwrap_or_else(|| config.start_date.clone()),
    };

    println!("Fetching zoning ordinance data published after {}...", since);
    let fetcher = OrdinanceFetcher::new();
    let mut records = fetcher.fetch(&since);

    if records.is_empty() {
        println!("No new zoning reclassification records. Nothing to do.");
        return Ok(RunSummary::no_changes(since));
    }
    println!(
        "Found {} zoning reclassification records. Extracting addresses...",
        records.len()
    );

    let extractor = AddressExtractor::new();
    for record in &mut records {
        record.address = extractor.extract(&record.title);
    }
    store.upsert_ordinances(&records)?;

    let with_address: Vec<_> = records
        .iter()
        .filter(|r| r.address.is_some())
        .cloned()
        .collect();
    if with_address.is_empty() {
        println!("No extractable addresses in this batch; skipping geocoding.");
    } else {
        println!("Geocoding {} addresses...", with_address.len());
        let geocoder = GeocodeClient::new();
        // A failed batch call aborts the run before any join or export
        let results = geocoder.geocode(&with_address)?;
        store.upsert_geocodes(&results)?;
    }

    // Reports cover the full current state, not just this run's delta
    let ordinances = store.all_ordinances()?;
    let geocodes = store.all_geocodes()?;

    let communities = load_communities(&config.communities_path)?;
    let wards = load_wards(&config.wards_path)?;
    store.ensure_reference_layers(&communities, &wards)?;

    let requests = build_zoning_requests(&ordinances, &geocodes, &communities, &wards, Utc::now());
    let buffer =
        AreaOfInterestBuffer::new(&communities, &config.area_of_interest, config.buffer_meters)?;
    let area_requests =
        filter_area_of_interest(&requests, &buffer, &config.excluded_neighbor);

    fs::create_dir_all(&config.out_dir)?;
    export_report(&config.ordinance_export_path(), &ordinances)?;
    export_report(&config.zoning_requests_path(), &requests)?;
    export_report(&config.area_requests_path(), &area_requests)?;

    let label = email::area_label(&config.area_of_interest);
    if config.email.enabled {
        let recent = email::recent_changes(&area_requests, &since);
        let html = email::render_recent_changes(&recent, &label);
        email::send_zoning_update_email(&config.email, html, &label)?;
        println!(
            "Sent update email to {} recipient(s).",
            config.email.recipients.len()
        );
    } else {
        println!("Email sending disabled.");
    }

    Ok(RunSummary {
        since,
        fetched: records.len(),
        total: ordinances.len(),
        area_matches: area_requests.len(),
    })
}

fn export_report<T: serde::Serialize>(path: &std::path::Path, rows: &[T]) -> Result<()> {
    if rows.is_empty() {
        println!("No records for {}; skipping.", path.display());
        return Ok(());
    }
    export::write_csv(path, rows)?;
    println!("Saved {} records to {}", rows.len(), path.display());
    Ok(())
}
