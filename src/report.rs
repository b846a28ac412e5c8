use crate::aggregate::aggregate_with_stats;
use crate::config::ReportConfig;
use crate::delta::percent_change;
use crate::models::{Cell, Grid, LeadRecord, ReportStatus, ReportView, WEEKS_PER_MONTH, WeekRow};
use crate::source::{RecordSource, fetch_all};
use chrono::NaiveDate;
use tracing::info;

pub async fn build_report<S>(source: &S, config: &ReportConfig, today: NaiveDate) -> ReportView
where
    S: RecordSource,
{
    run_report(source, config, today).await.1
}

/// One fetch -> filter -> aggregate pass.
pub async fn run_report<S>(source: &S, config: &ReportConfig, today: NaiveDate) -> (Grid, ReportView)
where
    S: RecordSource,
{
    let year = config.year.resolve(today);
    let outcome = fetch_all(source, &config.entity, config.page_size, config.max_pages).await;

    let keep = |record: &LeadRecord| config.filter.matches(record);
    let filter: Option<&dyn Fn(&LeadRecord) -> bool> = if config.filter.is_active() {
        Some(&keep)
    } else {
        None
    };
    let (grid, stats) = aggregate_with_stats(&outcome.records, year, filter);

    info!(
        "report for {year}: {} fetched, {} filtered out, {} other year, {} counted",
        stats.seen, stats.filtered_out, stats.other_year, stats.counted
    );

    let fetched = outcome.records.len();
    let status = match outcome.error {
        Some(err) if fetched == 0 => ReportStatus::Unavailable {
            error: err.to_string(),
        },
        _ if grid.total() == 0 => ReportStatus::NoData,
        Some(err) => ReportStatus::Partial {
            error: err.to_string(),
        },
        None => ReportStatus::Ready,
    };

    let view = build_view(&grid, fetched, status);
    (grid, view)
}

/// Lays the grid out as rows with week-over-week and month-over-month deltas.
pub fn build_view(grid: &Grid, fetched: usize, status: ReportStatus) -> ReportView {
    let weeks = (0..WEEKS_PER_MONTH)
        .map(|slot| WeekRow {
            week: slot as u8 + 1,
            cells: grid
                .months
                .iter()
                .map(|month| {
                    let previous = slot.checked_sub(1).map(|prev| month.weeks[prev]);
                    Cell {
                        count: month.weeks[slot],
                        delta: percent_change(month.weeks[slot], previous),
                    }
                })
                .collect(),
        })
        .collect();

    let totals = grid
        .months
        .iter()
        .enumerate()
        .map(|(idx, month)| {
            let previous = idx.checked_sub(1).and_then(|prev| grid.month_total(prev));
            Cell {
                count: month.total(),
                delta: percent_change(month.total(), previous),
            }
        })
        .collect();

    let counted = grid.total();
    ReportView {
        year: grid.year,
        fetched,
        counted,
        months: grid.month_keys(),
        weeks,
        totals,
        summary: format!(
            "Leads grouped by month and week for {}. {counted} of {fetched} fetched leads counted.",
            grid.year
        ),
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::YearSetting;
    use crate::filter::LeadFilter;
    use crate::models::Delta;
    use crate::source::{FetchError, Page, StaticRecordSource};
    use reqwest::StatusCode;
    use serde_json::json;

    fn lead(created: &str, source: &str, service: &str) -> LeadRecord {
        LeadRecord::from(json!({
            "Created_Time": created,
            "Lead_Source": source,
            "Service": service,
        }))
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn fixed_2025() -> ReportConfig {
        ReportConfig {
            year: YearSetting::Fixed(2025),
            ..ReportConfig::default()
        }
    }

    struct Failing;

    impl RecordSource for Failing {
        async fn fetch_page(&self, _entity: &str, _page_size: u32, page: u32) -> Result<Page, FetchError> {
            Err(FetchError::Status {
                page,
                status: StatusCode::UNAUTHORIZED,
            })
        }
    }

    struct FailsAfterFirstPage;

    impl RecordSource for FailsAfterFirstPage {
        async fn fetch_page(&self, _entity: &str, _page_size: u32, page: u32) -> Result<Page, FetchError> {
            match page {
                1 => Ok(Page {
                    records: vec![
                        lead("2025-03-01T08:00:00Z", "A", "X"),
                        lead("2025-03-09T08:00:00Z", "A", "X"),
                    ],
                    has_more: true,
                }),
                _ => Err(FetchError::Status {
                    page,
                    status: StatusCode::BAD_GATEWAY,
                }),
            }
        }
    }

    #[test]
    fn view_deltas_follow_weeks_and_months() {
        let mut grid = Grid::empty(2025);
        for _ in 0..2 {
            grid.increment("Jan 2025", 1);
        }
        for _ in 0..3 {
            grid.increment("Jan 2025", 2);
        }
        grid.increment("Feb 2025", 4);

        let view = build_view(&grid, 6, ReportStatus::Ready);
        assert_eq!(view.months.len(), 12);
        assert_eq!(view.weeks.len(), 4);

        let jan_week1 = &view.weeks[0].cells[0];
        assert_eq!(jan_week1.count, 2);
        assert_eq!(jan_week1.delta, Delta::NoBaseline);

        let jan_week2 = &view.weeks[1].cells[0];
        assert_eq!(jan_week2.delta, Delta::Change { percent: 50.0 });

        let feb_week4 = &view.weeks[3].cells[1];
        assert_eq!(feb_week4.delta, Delta::Unbounded);

        assert_eq!(view.totals[0].count, 5);
        assert_eq!(view.totals[0].delta, Delta::NoBaseline);
        assert_eq!(view.totals[1].delta, Delta::Change { percent: -80.0 });
        assert_eq!(view.totals[2].delta, Delta::Change { percent: -100.0 });
        assert_eq!(view.totals[3].delta, Delta::Change { percent: 0.0 });
        assert_eq!(view.counted, 6);
    }

    #[test]
    fn month_totals_match_week_sums() {
        let mut grid = Grid::empty(2025);
        grid.increment("May 2025", 1);
        grid.increment("May 2025", 3);
        grid.increment("May 2025", 4);
        let view = build_view(&grid, 3, ReportStatus::Ready);
        for (idx, total) in view.totals.iter().enumerate() {
            let sum: u64 = view.weeks.iter().map(|row| row.cells[idx].count).sum();
            assert_eq!(total.count, sum);
        }
    }

    #[tokio::test]
    async fn pipeline_filters_and_counts() {
        let source = StaticRecordSource::new(vec![
            lead("2025-01-03T09:00:00+05:30", "A", "X"),
            lead("2025-01-10T09:00:00+05:30", "A", "Y"),
            lead("2025-02-20T09:00:00Z", "B", "X"),
            lead("2024-02-20T09:00:00Z", "B", "X"),
        ]);
        let config = ReportConfig {
            filter: LeadFilter::new(Some(["A", "B"]), Some(["X"])),
            ..fixed_2025()
        };

        let view = build_report(&source, &config, today()).await;
        assert_eq!(view.status, ReportStatus::Ready);
        assert_eq!(view.fetched, 4);
        assert_eq!(view.counted, 2);
        assert_eq!(view.weeks[0].cells[0].count, 1);
        assert_eq!(view.weeks[1].cells[0].count, 0);
        assert_eq!(view.weeks[2].cells[1].count, 1);
        assert!(view.summary.contains("for 2025"));
    }

    #[tokio::test]
    async fn nothing_matching_is_no_data() {
        let source = StaticRecordSource::new(vec![lead("2024-05-05", "A", "X")]);
        let view = build_report(&source, &fixed_2025(), today()).await;
        assert_eq!(view.status, ReportStatus::NoData);
        assert_eq!(view.counted, 0);
    }

    #[tokio::test]
    async fn failure_after_some_pages_is_partial() {
        let config = ReportConfig {
            page_size: 2,
            ..fixed_2025()
        };
        let view = build_report(&FailsAfterFirstPage, &config, today()).await;

        match &view.status {
            ReportStatus::Partial { error } => assert!(error.contains("page 2")),
            other => panic!("expected partial report, got {other:?}"),
        }
        assert_eq!(view.fetched, 2);
        assert_eq!(view.counted, 2);
        assert_eq!(view.weeks[0].cells[2].count, 1);
        assert_eq!(view.weeks[1].cells[2].count, 1);
    }

    #[tokio::test]
    async fn failed_first_page_is_unavailable() {
        let view = build_report(&Failing, &fixed_2025(), today()).await;
        assert!(matches!(view.status, ReportStatus::Unavailable { .. }));
        assert_eq!(view.fetched, 0);
        assert_eq!(view.months.len(), 12);
    }

    #[tokio::test]
    async fn current_year_uses_today() {
        let source = StaticRecordSource::new(vec![lead("2026-10-01", "A", "X")]);
        let view = build_report(&source, &ReportConfig::default(), today()).await;
        assert_eq!(view.year, 2026);
        assert_eq!(view.counted, 1);
        assert_eq!(view.months[9], "Oct 2026");
    }
}
