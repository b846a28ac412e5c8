use crate::models::{Cell, Direction, ReportStatus, ReportView};
use std::fmt::Write;
use v_htmlescape::escape;

pub fn render_report(view: &ReportView) -> Result<String, std::fmt::Error> {
    let body = match &view.status {
        ReportStatus::NoData => empty_panel("No leads matched this report.", None),
        ReportStatus::Unavailable { error } => {
            empty_panel("No lead data could be retrieved.", Some(error.as_str()))
        }
        ReportStatus::Ready => render_table(view)?,
        ReportStatus::Partial { error } => {
            let mut out = String::new();
            write!(
                out,
                r#"<p class="notice" id="partialNote">Showing partial results: {}</p>"#,
                escape(error)
            )?;
            out.push_str(&render_table(view)?);
            out
        }
    };

    Ok(PAGE_HTML
        .replace("{{TITLE}}", &format!("Lead Report {}", view.year))
        .replace("{{BODY}}", &body)
        .replace("{{FOOTER}}", &escape(&view.summary).to_string()))
}

/// Fallback page shown when the report itself could not be rendered.
pub fn render_error(message: &str) -> String {
    let body = format!(
        r#"<section class="panel error" id="errorPanel">
      <h2>Something went wrong</h2>
      <p>{}</p>
      <button type="button" onclick="window.location.reload()">Reload</button>
    </section>"#,
        escape(message)
    );
    PAGE_HTML
        .replace("{{TITLE}}", "Lead Report")
        .replace("{{BODY}}", &body)
        .replace("{{FOOTER}}", "")
}

fn render_table(view: &ReportView) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    out.push_str(r#"<table id="leadsTable"><thead><tr><th>Week</th>"#);
    for month in &view.months {
        write!(out, "<th>{}</th>", escape(month))?;
    }
    out.push_str("</tr></thead><tbody>");

    for row in &view.weeks {
        write!(out, "<tr><td>Week {}</td>", row.week)?;
        for cell in &row.cells {
            write!(out, "<td>{}</td>", render_cell(cell)?)?;
        }
        out.push_str("</tr>");
    }

    out.push_str(r#"<tr class="totals"><td><strong>Total</strong></td>"#);
    for cell in &view.totals {
        write!(out, "<td><strong>{}</strong></td>", render_cell(cell)?)?;
    }
    out.push_str("</tr></tbody></table>");
    Ok(out)
}

fn render_cell(cell: &Cell) -> Result<String, std::fmt::Error> {
    let mut out = cell.count.to_string();
    if let Some(direction) = cell.delta.direction() {
        let class = match direction {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Flat => "flat",
        };
        write!(
            out,
            r#" <span class="delta {class}">({})</span>"#,
            cell.delta.label()
        )?;
    }
    Ok(out)
}

fn empty_panel(message: &str, detail: Option<&str>) -> String {
    let detail = detail
        .map(|detail| format!(r#"<p class="detail">{}</p>"#, escape(detail)))
        .unwrap_or_default();
    format!(
        r#"<section class="panel empty" id="noData"><p>{}</p>{detail}</section>"#,
        escape(message)
    )
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --bg: #f6f4ef;
      --ink: #2b2a28;
      --muted: #6b645d;
      --up: #2d7a4b;
      --down: #c63b2b;
      --flat: #8b857d;
      --card: #ffffff;
      --shadow: 0 18px 40px rgba(47, 72, 88, 0.14);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      padding: 24px;
    }

    .app {
      background: var(--card);
      border-radius: 18px;
      box-shadow: var(--shadow);
      padding: 24px;
      overflow-x: auto;
    }

    h1 {
      margin: 0 0 16px;
      font-size: 1.6rem;
    }

    table {
      border-collapse: collapse;
      width: 100%;
      font-size: 0.9rem;
    }

    th,
    td {
      border: 1px solid rgba(47, 72, 88, 0.12);
      padding: 8px 10px;
      text-align: center;
      white-space: nowrap;
    }

    th {
      background: rgba(47, 72, 88, 0.06);
    }

    .delta {
      font-size: 0.8rem;
    }

    .delta.up {
      color: var(--up);
    }

    .delta.down {
      color: var(--down);
    }

    .delta.flat {
      color: var(--flat);
    }

    .panel {
      padding: 24px;
      text-align: center;
      color: var(--muted);
    }

    .panel.error {
      color: var(--down);
    }

    .notice,
    .detail {
      color: var(--muted);
      font-size: 0.9rem;
    }

    #footerNote {
      margin: 16px 0 0;
      color: var(--muted);
    }
  </style>
</head>
<body>
  <main class="app">
    <h1>{{TITLE}}</h1>
    {{BODY}}
    <p id="footerNote">{{FOOTER}}</p>
  </main>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Grid;
    use crate::report::build_view;

    #[test]
    fn table_has_months_weeks_and_totals() {
        let mut grid = Grid::empty(2025);
        grid.increment("Jan 2025", 1);
        grid.increment("Jan 2025", 2);
        grid.increment("Jan 2025", 2);
        let html = render_report(&build_view(&grid, 3, ReportStatus::Ready)).unwrap();

        assert!(html.contains(r#"<table id="leadsTable">"#));
        assert!(html.contains("<th>Jan 2025</th>"));
        assert!(html.contains("<th>Dec 2025</th>"));
        assert!(html.contains("<td>Week 4</td>"));
        assert!(html.contains(r#"2 <span class="delta up">(+100.0%)</span>"#));
        assert!(html.contains("<strong>Total</strong>"));
        assert!(html.contains("Leads grouped by month and week for 2025."));
    }

    #[test]
    fn empty_report_shows_panel_instead_of_table() {
        let view = build_view(&Grid::empty(2025), 0, ReportStatus::NoData);
        let html = render_report(&view).unwrap();
        assert!(html.contains(r#"id="noData""#));
        assert!(!html.contains("leadsTable"));
    }

    #[test]
    fn partial_report_shows_notice_and_table() {
        let mut grid = Grid::empty(2025);
        grid.increment("Mar 2025", 1);
        let status = ReportStatus::Partial {
            error: "page 2 returned HTTP 502 <Bad Gateway>".to_string(),
        };
        let html = render_report(&build_view(&grid, 1, status)).unwrap();

        assert!(html.contains(r#"id="partialNote""#));
        assert!(html.contains("page 2 returned HTTP 502 &lt;Bad Gateway&gt;"));
        assert!(html.contains(r#"<table id="leadsTable">"#));
    }

    #[test]
    fn errors_are_escaped_and_offer_reload() {
        let html = render_error("<boom>");
        assert!(html.contains("&lt;boom&gt;"));
        assert!(html.contains("window.location.reload()"));
    }
}
