//! Report module: prints the result log as a human-readable comparison table.

use crate::results::ResultRow;

/// Nanoseconds to milliseconds.
fn ms(ns: f64) -> f64 {
    ns / 1_000_000.0
}

/// Format rows as a fixed-width table, latencies in milliseconds.
pub fn format_report(rows: &[ResultRow]) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{}\n", "=".repeat(96)));
    out.push_str("  Database Latency by Network Distance (ms)\n");
    out.push_str(&format!("{}\n", "=".repeat(96)));
    out.push_str(&format!(
        "  {:22} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>8}\n",
        "Label", "p10", "p25", "median", "p75", "p90", "p95", "count"
    ));
    out.push_str(&format!("  {}\n", "-".repeat(92)));

    if rows.is_empty() {
        out.push_str("  (no results recorded)\n");
    }

    for row in rows {
        let s = &row.stats;
        out.push_str(&format!(
            "  {:22} {:>9.3} {:>9.3} {:>9.3} {:>9.3} {:>9.3} {:>9.3} {:>8}\n",
            row.label,
            ms(s.p10),
            ms(s.p25),
            ms(s.median),
            ms(s.p75),
            ms(s.p90),
            ms(s.p95),
            s.count
        ));
    }

    out.push_str(&format!("{}\n", "=".repeat(96)));
    out
}

pub fn print_report(rows: &[ResultRow]) {
    println!("{}", format_report(rows));
}
