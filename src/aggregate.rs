use crate::models::{Grid, LeadRecord, MONTH_NAMES, WEEKS_PER_MONTH, month_key};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, warn};

pub const CREATED_TIME_FIELDS: &[&str] = &[
    "Created_Time",
    "created_time",
    "CreatedTime",
    "createdAt",
    "created_at",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStats {
    pub seen: usize,
    pub filtered_out: usize,
    pub missing_timestamp: usize,
    pub unparsable: usize,
    pub other_year: usize,
    pub counted: usize,
}

pub fn aggregate(
    records: &[LeadRecord],
    year: i32,
    filter: Option<&dyn Fn(&LeadRecord) -> bool>,
) -> Grid {
    aggregate_with_stats(records, year, filter).0
}

pub fn aggregate_with_stats(
    records: &[LeadRecord],
    year: i32,
    filter: Option<&dyn Fn(&LeadRecord) -> bool>,
) -> (Grid, AggregateStats) {
    let mut grid = Grid::empty(year);
    let mut stats = AggregateStats::default();

    for record in records {
        stats.seen += 1;

        if let Some(keep) = filter {
            if !keep(record) {
                stats.filtered_out += 1;
                continue;
            }
        }

        let Some(raw) = record.text(CREATED_TIME_FIELDS) else {
            stats.missing_timestamp += 1;
            debug!("skipping lead without a creation timestamp");
            continue;
        };

        let Some(created) = parse_created_time(raw) else {
            stats.unparsable += 1;
            debug!("skipping lead with unparsable creation timestamp {raw:?}");
            continue;
        };

        if created.year() != year {
            stats.other_year += 1;
            continue;
        }

        let name = MONTH_NAMES[created.month0() as usize];
        if grid.increment(&month_key(name, year), week_index(created.day())) {
            stats.counted += 1;
        }
    }

    if stats.unparsable > 0 {
        warn!("{} leads had unparsable creation timestamps", stats.unparsable);
    }

    (grid, stats)
}

/// Week of the month, with days 29-31 folded into week 4.
pub fn week_index(day: u32) -> u8 {
    let week = day.div_ceil(7).clamp(1, WEEKS_PER_MONTH as u32);
    week as u8
}

/// Parses the wall-clock part of a CRM timestamp, ignoring any `Z` or
/// `+hh:mm`/`-hh:mm` suffix.
pub fn parse_created_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = strip_offset(raw.trim());
    let (date_part, time_part) = match raw.find(['T', ' ']) {
        Some(idx) => (&raw[..idx], Some(raw[idx + 1..].trim())),
        None => (raw, None),
    };

    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    let time = match time_part {
        None => NaiveTime::MIN,
        Some(time) => TIME_FORMATS
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(time, format).ok())?,
    };

    Some(date.and_time(time))
}

fn strip_offset(raw: &str) -> &str {
    let raw = raw.trim_end_matches(['Z', 'z']);
    // the date itself is dash-separated, so an offset can only follow it
    let tail = raw.char_indices().nth(10).map_or(raw.len(), |(idx, _)| idx);
    match raw[tail..].find(['+', '-']) {
        Some(idx) => raw[..tail + idx].trim_end(),
        None => raw,
    }
}
