use latency_harness::results::{SortColumn, SortDirection};
use serde::Deserialize;

/// Query string of the report endpoints: `?sort_by=<column>&sort_order=<asc|desc>`.
#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ReportParams {
    /// Missing or unrecognised values degrade to label ascending.
    pub fn resolve(&self) -> (SortColumn, SortDirection) {
        (
            SortColumn::parse(self.sort_by.as_deref().unwrap_or("label")),
            SortDirection::parse(self.sort_order.as_deref().unwrap_or("asc")),
        )
    }
}
