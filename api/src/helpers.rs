use latency_harness::results::{ResultRow, SortColumn, SortDirection};

/// Report pages may be served stale for a short while; a fresh run redirects back here anyway.
pub(crate) const REPORT_CACHE_CONTROL: &str =
    "public, max-age=300, stale-while-revalidate=60, stale-if-error=300";

pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn header_label(column: SortColumn) -> &'static str {
    match column {
        SortColumn::Label => "Label",
        SortColumn::Median => "Median",
        SortColumn::P10 => "p10",
        SortColumn::P25 => "p25",
        SortColumn::P75 => "p75",
        SortColumn::P90 => "p90",
        SortColumn::P95 => "p95",
        SortColumn::Count => "Count",
    }
}

/// Link target for a column header: clicking the active column flips the direction.
fn header_link(column: SortColumn, active: SortColumn, direction: SortDirection) -> String {
    let next = if column == active && direction == SortDirection::Ascending {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };
    format!(
        "/?sort_by={}&amp;sort_order={}",
        column.column_name(),
        next.as_param()
    )
}

fn ms(ns: f64) -> String {
    format!("{:.3}", ns / 1_000_000.0)
}

/// Renders the result log as a sortable HTML table (latencies in milliseconds).
pub(crate) fn render_report(
    rows: &[ResultRow],
    active: SortColumn,
    direction: SortDirection,
) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">\
         <title>Latency Simulations</title></head><body>\n\
         <h1>Database latency by network distance</h1>\n\
         <p><a href=\"/simulate\">Run simulations</a></p>\n<table>\n<tr>",
    );

    for column in SortColumn::ALL {
        let arrow = match (column == active, direction) {
            (true, SortDirection::Ascending) => " &#9650;",
            (true, SortDirection::Descending) => " &#9660;",
            _ => "",
        };
        html.push_str(&format!(
            "<th><a href=\"{}\">{}</a>{}</th>",
            header_link(column, active, direction),
            header_label(column),
            arrow
        ));
    }
    html.push_str("</tr>\n");

    if rows.is_empty() {
        html.push_str("<tr><td colspan=\"8\">No results yet.</td></tr>\n");
    }

    for row in rows {
        let s = &row.stats;
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&row.label),
            ms(s.median),
            ms(s.p10),
            ms(s.p25),
            ms(s.p75),
            ms(s.p90),
            ms(s.p95),
            s.count
        ));
    }

    html.push_str("</table>\n</body></html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use latency_harness::stats::LatencyStats;

    fn row(label: &str) -> ResultRow {
        ResultRow::new(
            label,
            LatencyStats {
                median: 2_000_000.0,
                p10: 1_000_000.0,
                p25: 1_500_000.0,
                p75: 2_500_000.0,
                p90: 3_000_000.0,
                p95: 3_500_000.0,
                count: 100,
            },
        )
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<a href='x'>&</a>"), "&lt;a href=&#39;x&#39;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn active_ascending_column_links_to_descending() {
        let link = header_link(SortColumn::P95, SortColumn::P95, SortDirection::Ascending);
        assert_eq!(link, "/?sort_by=p95_latency&amp;sort_order=desc");
        let other = header_link(SortColumn::Label, SortColumn::P95, SortDirection::Ascending);
        assert_eq!(other, "/?sort_by=label&amp;sort_order=asc");
    }

    #[test]
    fn report_renders_rows_in_milliseconds() {
        let html = render_report(
            &[row("SQLite Read1")],
            SortColumn::Label,
            SortDirection::Ascending,
        );
        assert!(html.contains("<td>SQLite Read1</td>"));
        assert!(html.contains("<td>2.000</td>"));
        assert!(html.contains("<td>100</td>"));
    }

    #[test]
    fn empty_report_has_placeholder_row() {
        let html = render_report(&[], SortColumn::Label, SortDirection::Ascending);
        assert!(html.contains("No results yet."));
    }
}
