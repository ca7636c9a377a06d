use crate::config;
use crate::error::Result;
use crate::types::OrdinanceRecord;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// One page of raw matter records plus the service-reported total count
pub(crate) type Page = (Vec<Value>, u64);

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Value>,
    #[serde(default)]
    meta: Meta,
}

#[derive(Debug, Default, Deserialize)]
struct Meta {
    #[serde(default)]
    count: u64,
}

/// Fetches zoning ordinance matters from the legislative-records search API.
pub struct OrdinanceFetcher {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl OrdinanceFetcher {
    pub fn new() -> Self {
        Self::with_base_url(config::MATTER_API_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Fetch all Ordinance matters published after `since`, filtered to exact
    /// zoning-reclassification matters and projected to the kept field set.
    ///
    /// A network failure mid-pagination aborts the loop with a warning and
    /// returns whatever was accumulated; it never fails the run.
    pub fn fetch(&self, since: &str) -> Vec<OrdinanceRecord> {
        let raw = fetch_all_pages(|skip| self.fetch_page(since, skip));
        raw.iter()
            .map(project_record)
            .filter(is_zoning_reclassification)
            .collect()
    }

    fn fetch_page(&self, since: &str, skip: u64) -> Result<Page> {
        let filter = format!(
            "lastPublicationDate gt {} and type eq 'Ordinance'",
            since
        );
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("filter", filter.as_str()),
                ("search", config::SEARCH_QUERY),
                ("skip", skip.to_string().as_str()),
                ("top", config::PAGE_SIZE.to_string().as_str()),
                ("sort", "introductionDate"),
            ])
            .header("accept", "application/json; charset=utf-8")
            .send()?
            .error_for_status()?;

        let body: SearchResponse = response.json()?;
        Ok((body.data, body.meta.count))
    }
}

impl Default for OrdinanceFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Pagination loop, generic over the page source so termination and
/// partial-result behavior are testable without a server.
///
/// Pages while `skip + PAGE_SIZE < total`; a zero total is an empty result,
/// not an error.
pub(crate) fn fetch_all_pages<F>(mut fetch_page: F) -> Vec<Value>
where
    F: FnMut(u64) -> Result<Page>,
{
    let mut all_records = Vec::new();
    let mut skip = 0;

    loop {
        match fetch_page(skip) {
            Ok((records, total_count)) => {
                all_records.extend(records);
                if skip + config::PAGE_SIZE >= total_count {
                    break;
                }
                skip += config::PAGE_SIZE;
            }
            Err(e) => {
                eprintln!(
                    "warning: fetch failed at offset {}: {}; continuing with partial results",
                    skip, e
                );
                break;
            }
        }
    }

    all_records
}

/// Project a raw matter down to the kept field set; missing fields become
/// empty values rather than failing.
fn project_record(raw: &Value) -> OrdinanceRecord {
    let text = |key: &str| {
        raw.get(key)
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string()
    };
    let optional = |key: &str| {
        raw.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    OrdinanceRecord {
        matter_id: text("matterId"),
        record_number: text("recordNumber"),
        status: text("status"),
        sub_status: text("subStatus"),
        introduction_date: text("introductionDate"),
        final_action_date: optional("finalActionDate"),
        title: text("title"),
        record_create_date: text("recordCreateDate"),
        matter_category: text("matterCategory"),
        last_publication_date: text("lastPublicationDate"),
        address: None,
    }
}

/// Exact category match only. Categories with extra text (e.g. "ZONING
/// RECLASSIFICATIONS | Opposition") usually aren't reclassifications.
fn is_zoning_reclassification(record: &OrdinanceRecord) -> bool {
    record.matter_category == config::MATTER_CATEGORY
}
