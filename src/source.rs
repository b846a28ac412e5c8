use crate::models::LeadRecord;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info};

pub const DEFAULT_MAX_PAGES: u32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request for page {page} failed: {source}")]
    Transport {
        page: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("page {page} returned HTTP {status}")]
    Status { page: u32, status: StatusCode },
    #[error("page {page} could not be decoded: {message}")]
    Decode { page: u32, message: String },
    #[error("failed to read lead file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("lead file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub records: Vec<LeadRecord>,
    pub has_more: bool,
}

/// A CRM collection that can be read one page at a time. Pages are 1-based.
pub trait RecordSource {
    fn fetch_page(
        &self,
        entity: &str,
        page_size: u32,
        page: u32,
    ) -> impl Future<Output = Result<Page, FetchError>> + Send;
}

#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub records: Vec<LeadRecord>,
    pub pages: u32,
    pub error: Option<FetchError>,
}

/// Reads pages in order until a short page, `has_more == false`, the page
/// ceiling, or the first error. Records fetched before an error are kept.
pub async fn fetch_all<S>(source: &S, entity: &str, page_size: u32, max_pages: u32) -> FetchOutcome
where
    S: RecordSource,
{
    let mut outcome = FetchOutcome::default();

    for page in 1..=max_pages {
        match source.fetch_page(entity, page_size, page).await {
            Ok(batch) => {
                let received = batch.records.len();
                debug!("fetched page {page} of {entity}: {received} records");
                outcome.records.extend(batch.records);
                outcome.pages = page;
                if !batch.has_more || received < page_size as usize {
                    break;
                }
                if page == max_pages {
                    info!("stopped fetching {entity} at the {max_pages} page ceiling");
                }
            }
            Err(err) => {
                error!("failed to fetch {entity}: {err}");
                outcome.error = Some(err);
                break;
            }
        }
    }

    info!(
        "fetched {} {entity} records over {} pages",
        outcome.records.len(),
        outcome.pages
    );
    outcome
}

#[derive(Debug, Deserialize)]
struct PageBody {
    #[serde(default)]
    data: Vec<Value>,
    #[serde(default)]
    info: PageInfo,
}

#[derive(Debug, Default, Deserialize)]
struct PageInfo {
    #[serde(default)]
    more_records: Option<bool>,
}

/// Talks to a CRM REST endpoint shaped like `GET {base}/{entity}?per_page=&page=`.
#[derive(Debug, Clone)]
pub struct HttpRecordSource {
    client: Client,
    base_url: String,
}

impl HttpRecordSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl RecordSource for HttpRecordSource {
    async fn fetch_page(&self, entity: &str, page_size: u32, page: u32) -> Result<Page, FetchError> {
        let url = format!("{}/{entity}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("per_page", page_size), ("page", page)])
            .send()
            .await
            .map_err(|source| FetchError::Transport { page, source })?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(Page::default());
        }
        if !status.is_success() {
            return Err(FetchError::Status { page, status });
        }

        let body: PageBody = response.json().await.map_err(|err| FetchError::Decode {
            page,
            message: err.to_string(),
        })?;

        Ok(Page {
            records: body.data.into_iter().map(LeadRecord::from).collect(),
            // without an explicit flag only a short page ends the listing
            has_more: body.info.more_records.unwrap_or(true),
        })
    }
}

/// Serves an already-loaded record list in pages.
#[derive(Debug, Clone, Default)]
pub struct StaticRecordSource {
    records: Vec<LeadRecord>,
}

impl StaticRecordSource {
    pub fn new(records: Vec<LeadRecord>) -> Self {
        Self { records }
    }
}

impl RecordSource for StaticRecordSource {
    async fn fetch_page(&self, _entity: &str, page_size: u32, page: u32) -> Result<Page, FetchError> {
        let size = page_size.max(1) as usize;
        let start = (page.saturating_sub(1) as usize).saturating_mul(size);
        let records: Vec<LeadRecord> = self.records.iter().skip(start).take(size).cloned().collect();
        let has_more = start.saturating_add(records.len()) < self.records.len();
        Ok(Page { records, has_more })
    }
}

/// Loads leads from a JSON file holding either an array or a `{ "data": [...] }` page body.
pub async fn load_records(path: &Path) -> Result<Vec<LeadRecord>, FetchError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_slice(&bytes).map_err(|source| FetchError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    Ok(items.into_iter().map(LeadRecord::from).collect())
}

/// The source the running service reads from.
#[derive(Debug, Clone)]
pub enum LeadSource {
    Http(HttpRecordSource),
    Static(StaticRecordSource),
}

impl RecordSource for LeadSource {
    async fn fetch_page(&self, entity: &str, page_size: u32, page: u32) -> Result<Page, FetchError> {
        match self {
            LeadSource::Http(source) => source.fetch_page(entity, page_size, page).await,
            LeadSource::Static(source) => source.fetch_page(entity, page_size, page).await,
        }
    }
}
