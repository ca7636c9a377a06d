use crate::email::EmailSettings;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Chicago City Clerk eLMS matter search endpoint
pub const MATTER_API_URL: &str = "https://api.chicityclerkelms.chicago.gov/matter";
/// Public detail-page prefix; a matter id is appended
pub const MATTER_DETAIL_URL: &str = "https://chicityclerkelms.chicago.gov/matter";
/// US Census batch geocoder endpoint
pub const GEOCODER_URL: &str =
    "https://geocoding.geo.census.gov/geocoder/locations/addressbatch";

/// Full-text search keyword sent with every matter query
pub const SEARCH_QUERY: &str = "zoning";
/// Max page size allowed by the eLMS API
pub const PAGE_SIZE: u64 = 500;
/// Records are kept only when `matterCategory` equals this exactly; broader
/// matches like "ZONING RECLASSIFICATIONS | Opposition" are false positives
pub const MATTER_CATEGORY: &str = "ZONING RECLASSIFICATIONS";

/// Locality fields the geocoder payload hardcodes
pub const GEOCODE_CITY: &str = "Chicago";
pub const GEOCODE_STATE: &str = "IL";
/// Census geocoder benchmark version
pub const GEOCODE_BENCHMARK: &str = "4";

/// Days after introduction before a still-Referred matter counts as stale.
/// Known approximation: some categories legitimately take up to 360 days.
pub const STALE_AFTER_DAYS: i64 = 180;

/// Default watermark when no store exists yet
pub const DEFAULT_START_DATE: &str = "2025-01-01T00:00:00.000Z";

/// Area-of-interest defaults; all overridable from the settings file
pub const AREA_OF_INTEREST: &str = "AVONDALE";
pub const BUFFER_METERS: f64 = 300.0;
/// Community the buffer overreaches into by crossing the river; never a real
/// neighbor of the area of interest
pub const EXCLUDED_NEIGHBOR: &str = "NORTH CENTER";

/// Report file names, created under the output directory
pub const ORDINANCE_EXPORT_FILE: &str = "ordinance_export.csv";
pub const ZONING_REQUESTS_FILE: &str = "zoning_requests.csv";
pub const AREA_REQUESTS_FILE: &str = "zoning_requests_area.csv";

/// Configuration for one pipeline run
#[derive(Debug, Clone)]
pub struct Config {
    pub store_path: PathBuf,
    pub communities_path: PathBuf,
    pub wards_path: PathBuf,
    pub out_dir: PathBuf,
    /// Watermark used when the store is empty
    pub start_date: String,
    /// Forces the fetch window regardless of the stored watermark
    pub since_override: Option<String>,
    pub area_of_interest: String,
    pub buffer_meters: f64,
    pub excluded_neighbor: String,
    pub email: EmailSettings,
}

impl Config {
    pub fn ordinance_export_path(&self) -> PathBuf {
        self.out_dir.join(ORDINANCE_EXPORT_FILE)
    }

    pub fn zoning_requests_path(&self) -> PathBuf {
        self.out_dir.join(ZONING_REQUESTS_FILE)
    }

    pub fn area_requests_path(&self) -> PathBuf {
        self.out_dir.join(AREA_REQUESTS_FILE)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.area_of_interest.trim().is_empty() {
            return Err(Error::Config("area of interest must not be empty".to_string()));
        }

        if !self.buffer_meters.is_finite() || self.buffer_meters < 0.0 {
            return Err(Error::Config(format!(
                "buffer distance must be a non-negative number of meters, got {}",
                self.buffer_meters
            )));
        }

        if self.email.enabled && self.email.recipients.is_empty() {
            return Err(Error::Config(
                "email is enabled but no recipients are configured".to_string(),
            ));
        }

        Ok(())
    }
}

/// Optional TOML settings overlay (email surface, area-of-interest overrides)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub start_date: Option<String>,
    pub area_of_interest: Option<String>,
    pub buffer_meters: Option<f64>,
    pub excluded_neighbor: Option<String>,
    #[serde(default)]
    pub email: EmailSettings,
}

/// Load and parse a TOML settings file
pub fn load_settings(path: &Path) -> Result<Settings> {
    let contents = fs::read_to_string(path)?;
    toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))
}

/// Builder for creating configurations
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default settings
    pub fn new(
        store_path: impl Into<PathBuf>,
        communities_path: impl Into<PathBuf>,
        wards_path: impl Into<PathBuf>,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config: Config {
                store_path: store_path.into(),
                communities_path: communities_path.into(),
                wards_path: wards_path.into(),
                out_dir: out_dir.into(),
                start_date: DEFAULT_START_DATE.to_string(),
                since_override: None,
                area_of_interest: AREA_OF_INTEREST.to_string(),
                buffer_meters: BUFFER_METERS,
                excluded_neighbor: EXCLUDED_NEIGHBOR.to_string(),
                email: EmailSettings::default(),
            },
        }
    }

    /// Apply a settings file on top of the defaults
    pub fn settings(mut self, settings: Settings) -> Self {
        if let Some(start_date) = settings.start_date {
            self.config.start_date = start_date;
        }
        if let Some(area) = settings.area_of_interest {
            self.config.area_of_interest = area;
        }
        if let Some(buffer) = settings.buffer_meters {
            self.config.buffer_meters = buffer;
        }
        if let Some(excluded) = settings.excluded_neighbor {
            self.config.excluded_neighbor = excluded;
        }
        self.config.email = settings.email;
        self
    }

    /// Force the fetch window, ignoring the stored watermark
    pub fn since(mut self, since: impl Into<String>) -> Self {
        self.config.since_override = Some(since.into());
        self
    }

    /// Force-enable the notification email
    pub fn email_enabled(mut self, enabled: bool) -> Self {
        self.config.email.enabled = enabled;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
