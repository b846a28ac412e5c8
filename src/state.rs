use crate::config::{ReportConfig, SourceSetting};
use crate::errors::AppError;
use crate::source::{HttpRecordSource, LeadSource, StaticRecordSource, load_records};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ReportConfig>,
    pub source: Arc<LeadSource>,
}

impl AppState {
    pub fn new(config: ReportConfig, source: LeadSource) -> Self {
        Self {
            config: Arc::new(config),
            source: Arc::new(source),
        }
    }

    /// Builds the lead source the configuration points at. A JSON file is
    /// read once here; the CRM API is queried on every report.
    pub async fn from_config(config: ReportConfig) -> Result<Self, AppError> {
        let source = match &config.source {
            SourceSetting::Api { base_url } => {
                info!("reading leads from {base_url}");
                let source = HttpRecordSource::new(base_url.clone(), config.timeout)
                    .map_err(AppError::internal)?;
                LeadSource::Http(source)
            }
            SourceSetting::File { path } => {
                let records = load_records(path).await?;
                info!("loaded {} leads from {}", records.len(), path.display());
                LeadSource::Static(StaticRecordSource::new(records))
            }
        };
        Ok(Self::new(config, source))
    }
}
