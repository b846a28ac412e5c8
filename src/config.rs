use crate::filter::LeadFilter;
use crate::source::DEFAULT_MAX_PAGES;
use chrono::{Datelike, NaiveDate};
use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ENTITY: &str = "Leads";
pub const DEFAULT_PAGE_SIZE: u32 = 200;
pub const MAX_PAGE_SIZE: u32 = 500;
const DEFAULT_DATA_PATH: &str = "data/leads.json";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Which calendar year the report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearSetting {
    Current,
    Fixed(i32),
}

impl YearSetting {
    pub fn resolve(self, today: NaiveDate) -> i32 {
        match self {
            YearSetting::Current => today.year(),
            YearSetting::Fixed(year) => year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSetting {
    Api { base_url: String },
    File { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub port: u16,
    pub year: YearSetting,
    pub entity: String,
    pub page_size: u32,
    pub max_pages: u32,
    pub filter: LeadFilter,
    pub source: SourceSetting,
    pub timeout: Duration,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            year: YearSetting::Current,
            entity: DEFAULT_ENTITY.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            filter: LeadFilter::default(),
            source: SourceSetting::File {
                path: PathBuf::from(DEFAULT_DATA_PATH),
            },
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ReportConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(value) = get("PORT") {
            config.port = parse(&value, "PORT", "a port number")?;
        }

        if let Some(value) = get("LEAD_REPORT_YEAR") {
            config.year = if value.eq_ignore_ascii_case("current") {
                YearSetting::Current
            } else {
                let year: i32 = parse(&value, "LEAD_REPORT_YEAR", "\"current\" or a four-digit year")?;
                if !(1000..=9999).contains(&year) {
                    return Err(invalid("LEAD_REPORT_YEAR", "\"current\" or a four-digit year", &value));
                }
                YearSetting::Fixed(year)
            };
        }

        if let Some(value) = get("LEAD_REPORT_ENTITY") {
            config.entity = value;
        }

        if let Some(value) = get("LEAD_REPORT_PAGE_SIZE") {
            let size: u32 = parse(&value, "LEAD_REPORT_PAGE_SIZE", "between 1 and 500")?;
            if !(1..=MAX_PAGE_SIZE).contains(&size) {
                return Err(invalid("LEAD_REPORT_PAGE_SIZE", "between 1 and 500", &value));
            }
            config.page_size = size;
        }

        if let Some(value) = get("LEAD_REPORT_MAX_PAGES") {
            let pages: u32 = parse(&value, "LEAD_REPORT_MAX_PAGES", "a positive page count")?;
            if pages == 0 {
                return Err(invalid("LEAD_REPORT_MAX_PAGES", "a positive page count", &value));
            }
            config.max_pages = pages;
        }

        if let Some(value) = get("LEAD_REPORT_TIMEOUT_SECS") {
            let secs: u64 = parse(&value, "LEAD_REPORT_TIMEOUT_SECS", "a number of seconds")?;
            config.timeout = Duration::from_secs(secs);
        }

        let sources = get("LEAD_REPORT_SOURCES")
            .map(|value| parse_list(&value, "LEAD_REPORT_SOURCES"))
            .transpose()?;
        let services = get("LEAD_REPORT_SERVICES")
            .map(|value| parse_list(&value, "LEAD_REPORT_SERVICES"))
            .transpose()?;
        config.filter = LeadFilter::new(sources, services);

        if let Some(base_url) = get("LEAD_REPORT_API_URL") {
            config.source = SourceSetting::Api { base_url };
        } else if let Some(path) = get("LEAD_REPORT_DATA_PATH") {
            config.source = SourceSetting::File {
                path: PathBuf::from(path),
            };
        }

        Ok(config)
    }
}

/// A configured allow-list must name at least one label.
fn parse_list(value: &str, key: &'static str) -> Result<Vec<String>, ConfigError> {
    let items: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();
    if items.is_empty() {
        return Err(invalid(key, "a comma-separated list of labels", value));
    }
    Ok(items)
}

fn parse<T: std::str::FromStr>(
    value: &str,
    key: &'static str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value.parse().map_err(|_| invalid(key, expected, value))
}

fn invalid(key: &'static str, expected: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        expected,
        value: value.to_string(),
    }
}
