use crate::config;
use crate::error::{Error, Result};
use crate::types::{GeocodeResult, OrdinanceRecord};
use reqwest::blocking::multipart::{Form, Part};
use std::time::Duration;

/// Header the batch geocoder omits from its CSV response; prepended before
/// parsing so the columns have names.
const RESPONSE_HEADER: &str =
    "record,address,match_type,match_level,matched_address,coordinates,place_id,side_of_street";

/// Client for the Census batch geocoding service.
///
/// A failed batch call is fatal for the run: letting it degrade to "no match"
/// would corrupt the spatial join silently.
pub struct GeocodeClient {
    client: reqwest::blocking::Client,
    url: String,
}

impl GeocodeClient {
    pub fn new() -> Self {
        Self::with_url(config::GEOCODER_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        Self {
            client,
            url: url.into(),
        }
    }

    /// Geocode every record that carries an address, in one batch call.
    ///
    /// Rows with empty coordinates in the response are match failures, not
    /// errors; they come back with `coordinates: None`.
    pub fn geocode(&self, records: &[OrdinanceRecord]) -> Result<Vec<GeocodeResult>> {
        let payload = batch_payload(records)?;
        if payload.is_empty() {
            return Ok(Vec::new());
        }

        let file_part = Part::bytes(payload)
            .file_name("addresses.csv")
            .mime_str("text/csv")
            .map_err(|e| Error::Geocode(format!("failed to build request body: {e}")))?;
        let form = Form::new()
            .text("benchmark", config::GEOCODE_BENCHMARK)
            .part("addressFile", file_part);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .map_err(|e| Error::Geocode(format!("batch request failed: {e}")))?
            .error_for_status()
            .map_err(|e| Error::Geocode(format!("batch request rejected: {e}")))?;

        let body = response
            .text()
            .map_err(|e| Error::Geocode(format!("failed to read response: {e}")))?;
        parse_response(&body)
    }
}

impl Default for GeocodeClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the headerless CSV payload the batch endpoint expects: exactly five
/// positional fields per row (id, street, city, state, zip), city and state
/// fixed, zip blank. Records without an address are skipped.
pub(crate) fn batch_payload(records: &[OrdinanceRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    for record in records {
        let Some(address) = record.address.as_deref() else {
            continue;
        };
        if address.is_empty() {
            continue;
        }
        writer.write_record([
            record.record_number.as_str(),
            address,
            config::GEOCODE_CITY,
            config::GEOCODE_STATE,
            "",
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| Error::Geocode(format!("failed to build payload: {e}")))
}

/// Parse the schema-less response body by prepending the fixed 8-column
/// header.
pub(crate) fn parse_response(body: &str) -> Result<Vec<GeocodeResult>> {
    let with_header = format!("{RESPONSE_HEADER}\n{body}");
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(with_header.as_bytes());

    let mut results = Vec::new();
    for row in reader.records() {
        let row = row?;
        let field = |index: usize| {
            row.get(index)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let Some(record_number) = field(0) else {
            continue;
        };
        results.push(GeocodeResult {
            record_number,
            matched_address: field(4),
            coordinates: field(5),
        });
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(number: &str, address: Option<&str>) -> OrdinanceRecord {
        OrdinanceRecord {
            matter_id: format!("id-{number}"),
            record_number: number.to_string(),
            status: "Active".to_string(),
            sub_status: "Referred".to_string(),
            introduction_date: "2025-02-01T00:00:00.000Z".to_string(),
            final_action_date: None,
            title: "Zoning Reclassification".to_string(),
            record_create_date: "2025-02-01T00:00:00.000Z".to_string(),
            matter_category: "ZONING RECLASSIFICATIONS".to_string(),
            last_publication_date: "2025-02-02T00:00:00.000Z".to_string(),
            address: address.map(str::to_string),
        }
    }

    #[test]
    fn test_payload_is_headerless_with_five_fields() {
        let records = vec![
            record("O2025-001", Some("2934 N Milwaukee Ave")),
            record("O2025-002", None),
            record("O2025-003", Some("801 S Wells St")),
        ];
        let payload = String::from_utf8(batch_payload(&records).unwrap()).unwrap();
        let lines: Vec<&str> = payload.lines().collect();

        // Address-less records are skipped and no header row is written
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "O2025-001,2934 N Milwaukee Ave,Chicago,IL,");
        assert_eq!(lines[1], "O2025-003,801 S Wells St,Chicago,IL,");
    }

    #[test]
    fn test_empty_payload_for_no_addresses() {
        let records = vec![record("O2025-001", None)];
        assert!(batch_payload(&records).unwrap().is_empty());
    }

    #[test]
    fn test_parse_response_match_and_no_match() {
        let body = concat!(
            "\"O2025-001\",\"2934 N Milwaukee Ave, Chicago, IL, \",\"Match\",\"Exact\",",
            "\"2934 N MILWAUKEE AVE, CHICAGO, IL, 60618\",\"-87.7082,41.9394\",\"111\",\"L\"\n",
            "\"O2025-003\",\"801 S Nowhere St, Chicago, IL, \",\"No_Match\"\n",
        );
        let results = parse_response(body).unwrap();
        assert_eq!(results.len(), 2);

        assert_eq!(results[0].record_number, "O2025-001");
        assert_eq!(
            results[0].matched_address.as_deref(),
            Some("2934 N MILWAUKEE AVE, CHICAGO, IL, 60618")
        );
        let (lon, lat) = results[0].lon_lat().unwrap();
        assert!((lon - -87.7082).abs() < 1e-9);
        assert!((lat - 41.9394).abs() < 1e-9);

        // No-match rows are present without geometry
        assert_eq!(results[1].record_number, "O2025-003");
        assert!(results[1].coordinates.is_none());
        assert!(results[1].lon_lat().is_none());
    }

    #[test]
    fn test_parse_response_empty_body() {
        assert!(parse_response("").unwrap().is_empty());
    }
}
