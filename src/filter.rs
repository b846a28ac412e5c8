use crate::models::LeadRecord;
use std::collections::BTreeSet;

pub const SOURCE_FIELDS: &[&str] = &["Lead_Source", "lead_source", "LeadSource", "Source"];
pub const SERVICE_FIELDS: &[&str] = &["Service", "Services", "service", "Service_Type"];

/// Allow-lists on the lead source and service labels. A list that is not
/// configured does not constrain anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFilter {
    pub sources: Option<BTreeSet<String>>,
    pub services: Option<BTreeSet<String>>,
}

impl LeadFilter {
    pub fn new<S, V>(sources: Option<S>, services: Option<V>) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        Self {
            sources: sources.map(normalize),
            services: services.map(normalize),
        }
    }

    pub fn is_active(&self) -> bool {
        self.sources.is_some() || self.services.is_some()
    }

    pub fn matches(&self, record: &LeadRecord) -> bool {
        allowed(self.sources.as_ref(), record, SOURCE_FIELDS)
            && allowed(self.services.as_ref(), record, SERVICE_FIELDS)
    }
}

fn allowed(list: Option<&BTreeSet<String>>, record: &LeadRecord, aliases: &[&str]) -> bool {
    match list {
        None => true,
        Some(list) => record
            .labels(aliases)
            .into_iter()
            .any(|label| list.contains(label)),
    }
}

fn normalize<I>(labels: I) -> BTreeSet<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    labels
        .into_iter()
        .map(|label| {
            let label: String = label.into();
            label.trim().to_string()
        })
        .filter(|label| !label.is_empty())
        .collect()
}
