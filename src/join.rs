use crate::boundaries::{AreaOfInterestBuffer, BoundaryLayer};
use crate::config;
use crate::types::{GeocodeResult, OrdinanceRecord, ZoningRequest};
use chrono::{DateTime, Duration, Utc};
use geo::Point;
use std::collections::HashMap;

/// Left-join ordinances to geocodes and boundary layers into reporting rows.
///
/// Every ordinance yields exactly one row; geocode and containment misses
/// leave the corresponding fields empty.
pub fn build_zoning_requests(
    ordinances: &[OrdinanceRecord],
    geocodes: &[GeocodeResult],
    communities: &BoundaryLayer,
    wards: &BoundaryLayer,
    now: DateTime<Utc>,
) -> Vec<ZoningRequest> {
    let by_record: HashMap<&str, &GeocodeResult> = geocodes
        .iter()
        .map(|g| (g.record_number.as_str(), g))
        .collect();

    ordinances
        .iter()
        .map(|ord| {
            let lon_lat = by_record
                .get(ord.record_number.as_str())
                .and_then(|g| g.lon_lat());
            let point = lon_lat.map(|(lon, lat)| Point::new(lon, lat));
            let community = point
                .as_ref()
                .and_then(|p| communities.locate(p))
                .map(str::to_string);
            let ward = point
                .as_ref()
                .and_then(|p| wards.locate(p))
                .map(str::to_string);

            ZoningRequest {
                record_number: ord.record_number.clone(),
                matter_id: ord.matter_id.clone(),
                status: ord.status.clone(),
                sub_status: ord.sub_status.clone(),
                introduction_date: ord.introduction_date.clone(),
                pass_date: ord.final_action_date.clone(),
                title: ord.title.clone(),
                record_create_date: ord.record_create_date.clone(),
                matter_category: ord.matter_category.clone(),
                last_publication_date: ord.last_publication_date.clone(),
                bill_address: ord.address.clone(),
                is_stale: is_stale(&ord.sub_status, &ord.introduction_date, now),
                lon: lon_lat.map(|(lon, _)| lon),
                lat: lon_lat.map(|(_, lat)| lat),
                ward,
                community,
                url: matter_url(&ord.matter_id),
            }
        })
        .collect()
}

/// Public detail-page URL for a matter
pub fn matter_url(matter_id: &str) -> String {
    format!("{}/{}", config::MATTER_DETAIL_URL, matter_id)
}

/// A matter is stale when it is still "Referred" more than the staleness
/// window after introduction. The 180-day window is a known approximation;
/// some categories legitimately take up to 360 days.
pub fn is_stale(sub_status: &str, introduction_date: &str, now: DateTime<Utc>) -> bool {
    if sub_status != "Referred" {
        return false;
    }
    let Ok(introduced) = DateTime::parse_from_rfc3339(introduction_date) else {
        return false;
    };
    now.signed_duration_since(introduced.with_timezone(&Utc))
        > Duration::days(config::STALE_AFTER_DAYS)
}

/// Keep rows geocoded inside the area-of-interest buffer, excluding the one
/// neighbor the buffer overreaches into across the river.
pub fn filter_area_of_interest(
    requests: &[ZoningRequest],
    buffer: &AreaOfInterestBuffer,
    excluded_neighbor: &str,
) -> Vec<ZoningRequest> {
    requests
        .iter()
        .filter(|r| {
            let (Some(lon), Some(lat)) = (r.lon, r.lat) else {
                return false;
            };
            if !buffer.contains(&Point::new(lon, lat)) {
                return false;
            }
            r.community.as_deref() != Some(excluded_neighbor)
        })
        .cloned()
        .collect()
}
