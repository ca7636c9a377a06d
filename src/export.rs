use crate::error::Result;
use serde::Serialize;
use std::path::Path;

/// Write rows to a fresh CSV file with headers taken from the row type.
///
/// Each export targets its own file, so a failed write never corrupts an
/// already-written report.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ZoningRequest;

    fn request(number: &str) -> ZoningRequest {
        ZoningRequest {
            record_number: number.to_string(),
            matter_id: format!("id-{number}"),
            status: "Active".to_string(),
            sub_status: "Referred".to_string(),
            introduction_date: "2025-02-01T00:00:00.000Z".to_string(),
            pass_date: None,
            title: "Zoning Reclassification".to_string(),
            record_create_date: "2025-02-01T00:00:00.000Z".to_string(),
            matter_category: "ZONING RECLASSIFICATIONS".to_string(),
            last_publication_date: "2025-02-02T00:00:00.000Z".to_string(),
            bill_address: Some("2934 N Milwaukee Ave".to_string()),
            is_stale: false,
            lon: Some(-87.7082),
            lat: Some(41.9394),
            ward: Some("30".to_string()),
            community: Some("AVONDALE".to_string()),
            url: "https://chicityclerkelms.chicago.gov/matter/id".to_string(),
        }
    }

    #[test]
    fn test_write_csv_has_headers_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zoning_requests.csv");

        write_csv(&path, &[request("O2025-001"), request("O2025-002")]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("recordNumber,matterId,"));
        assert!(lines[1].contains("O2025-001"));
        // No geometry column in the export, only plain lon/lat
        assert!(!lines[0].contains("geometry"));
    }

    #[test]
    fn test_each_export_is_a_fresh_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zoning_requests.csv");

        write_csv(&path, &[request("O2025-001"), request("O2025-002")]).unwrap();
        write_csv(&path, &[request("O2025-003")]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.contains("O2025-003"));
        assert!(!contents.contains("O2025-001"));
    }
}
