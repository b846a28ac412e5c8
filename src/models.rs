use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub const WEEKS_PER_MONTH: usize = 4;

/// A lead exactly as the CRM returned it. Field names vary by tenant, so
/// lookups go through alias lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadRecord(pub Map<String, Value>);

impl LeadRecord {
    pub fn field(&self, aliases: &[&str]) -> Option<&Value> {
        aliases
            .iter()
            .filter_map(|name| self.0.get(*name))
            .find(|value| !value.is_null())
    }

    pub fn text(&self, aliases: &[&str]) -> Option<&str> {
        self.field(aliases).and_then(Value::as_str)
    }

    /// String labels under the first present alias. Multi-select picklists
    /// arrive as arrays, so every string element counts.
    pub fn labels(&self, aliases: &[&str]) -> Vec<&str> {
        match self.field(aliases) {
            Some(Value::String(label)) => vec![label.trim()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl From<Value> for LeadRecord {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthColumn {
    pub key: String,
    pub weeks: [u64; WEEKS_PER_MONTH],
}

impl MonthColumn {
    pub fn total(&self) -> u64 {
        self.weeks.iter().sum()
    }
}

/// Month x week counts for one year. Always carries all 12 months, Jan first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grid {
    pub year: i32,
    pub months: Vec<MonthColumn>,
}

impl Grid {
    pub fn empty(year: i32) -> Self {
        let months = MONTH_NAMES
            .iter()
            .map(|name| MonthColumn {
                key: month_key(name, year),
                weeks: [0; WEEKS_PER_MONTH],
            })
            .collect();
        Self { year, months }
    }

    /// Returns false when the key is not one of this grid's months.
    pub fn increment(&mut self, key: &str, week: u8) -> bool {
        let Some(slot) = week_slot(week) else {
            return false;
        };
        match self.months.iter_mut().find(|month| month.key == key) {
            Some(month) => {
                month.weeks[slot] = month.weeks[slot].saturating_add(1);
                true
            }
            None => false,
        }
    }

    pub fn count(&self, key: &str, week: u8) -> Option<u64> {
        let slot = week_slot(week)?;
        self.months
            .iter()
            .find(|month| month.key == key)
            .map(|month| month.weeks[slot])
    }

    pub fn month_total(&self, index: usize) -> Option<u64> {
        self.months.get(index).map(MonthColumn::total)
    }

    pub fn total(&self) -> u64 {
        self.months.iter().map(MonthColumn::total).sum()
    }

    pub fn month_keys(&self) -> Vec<String> {
        self.months.iter().map(|month| month.key.clone()).collect()
    }
}

pub fn month_key(name: &str, year: i32) -> String {
    format!("{name} {year}")
}

fn week_slot(week: u8) -> Option<usize> {
    let week = usize::from(week);
    (1..=WEEKS_PER_MONTH).contains(&week).then(|| week - 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

/// Percent change between two adjacent periods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Delta {
    /// First period of a series.
    NoBaseline,
    /// Previous period was zero and the current one is not.
    Unbounded,
    Change { percent: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub count: u64,
    pub delta: Delta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekRow {
    pub week: u8,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReportStatus {
    Ready,
    Partial { error: String },
    NoData,
    Unavailable { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    pub year: i32,
    pub fetched: usize,
    pub counted: u64,
    pub months: Vec<String>,
    pub weeks: Vec<WeekRow>,
    pub totals: Vec<Cell>,
    pub summary: String,
    pub status: ReportStatus,
}
