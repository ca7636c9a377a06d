use serde::{Deserialize, Serialize};

/// One legislative matter, projected down to the fields the pipeline keeps.
///
/// Field names serialize in camelCase so CSV exports carry the upstream API's
/// own column names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdinanceRecord {
    /// Opaque external id; used to build the public detail-page URL
    pub matter_id: String,
    /// Stable natural key, unique across the store
    pub record_number: String,
    pub status: String,
    /// Free text; drives staleness/passage classification
    pub sub_status: String,
    pub introduction_date: String,
    pub final_action_date: Option<String>,
    /// Free text; the source of address extraction
    pub title: String,
    pub record_create_date: String,
    pub matter_category: String,
    /// Monotonic watermark used for incremental fetch
    pub last_publication_date: String,
    /// Street address or intersection extracted from `title`, if any
    #[serde(default)]
    pub address: Option<String>,
}

/// One geocoded address attempt, keyed by the ordinance's record number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResult {
    pub record_number: String,
    pub matched_address: Option<String>,
    /// "lon,lat" as returned by the geocoder; empty/absent means the batch
    /// call succeeded but the address did not match
    pub coordinates: Option<String>,
}

impl GeocodeResult {
    /// Parse the "lon,lat" coordinate string, if present and well-formed.
    pub fn lon_lat(&self) -> Option<(f64, f64)> {
        let coords = self.coordinates.as_deref()?;
        let (lon, lat) = coords.split_once(',')?;
        let lon: f64 = lon.trim().parse().ok()?;
        let lat: f64 = lat.trim().parse().ok()?;
        Some((lon, lat))
    }
}

/// The joined, denormalized reporting row.
///
/// Every ordinance appears exactly once regardless of geocode or spatial-match
/// success; the geometry-derived fields are left-join nullable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoningRequest {
    pub record_number: String,
    pub matter_id: String,
    pub status: String,
    pub sub_status: String,
    pub introduction_date: String,
    /// `finalActionDate`, aliased for reporting
    pub pass_date: Option<String>,
    pub title: String,
    pub record_create_date: String,
    pub matter_category: String,
    pub last_publication_date: String,
    /// Extracted address, aliased for reporting
    pub bill_address: Option<String>,
    pub is_stale: bool,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    pub ward: Option<String>,
    pub community: Option<String>,
    /// Public detail page built from `matter_id`
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geocode(coordinates: Option<&str>) -> GeocodeResult {
        GeocodeResult {
            record_number: "O2025-001".to_string(),
            matched_address: None,
            coordinates: coordinates.map(|s| s.to_string()),
        }
    }

    #[test]
    fn test_lon_lat_parses_coordinates() {
        let result = geocode(Some("-87.7082,41.9394"));
        let (lon, lat) = result.lon_lat().unwrap();
        assert!((lon - -87.7082).abs() < 1e-9);
        assert!((lat - 41.9394).abs() < 1e-9);
    }

    #[test]
    fn test_lon_lat_absent_or_malformed() {
        assert!(geocode(None).lon_lat().is_none());
        assert!(geocode(Some("")).lon_lat().is_none());
        assert!(geocode(Some("not,numbers")).lon_lat().is_none());
        assert!(geocode(Some("-87.7082")).lon_lat().is_none());
    }

    #[test]
    fn test_ordinance_record_csv_headers_match_api_fields() {
        let record = OrdinanceRecord {
            matter_id: "abc".to_string(),
            record_number: "O2025-001".to_string(),
            status: "Active".to_string(),
            sub_status: "Referred".to_string(),
            introduction_date: "2025-02-01T00:00:00.000Z".to_string(),
            final_action_date: None,
            title: "t".to_string(),
            record_create_date: "2025-02-01T00:00:00.000Z".to_string(),
            matter_category: "ZONING RECLASSIFICATIONS".to_string(),
            last_publication_date: "2025-02-02T00:00:00.000Z".to_string(),
            address: None,
        };
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.serialize(&record).unwrap();
        let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        let header = out.lines().next().unwrap();
        assert_eq!(
            header,
            "matterId,recordNumber,status,subStatus,introductionDate,\
             finalActionDate,title,recordCreateDate,matterCategory,\
             lastPublicationDate,address"
                .replace(' ', "")
        );
    }
}
