//! Summary view handler.

use crate::format::render_summary;
use crate::scan::UsageIndex;
use crate::state::TrackerState;
use crate::summary::{SummaryQuery, build_summary};
use rmcp::schemars;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Deserialize, schemars::JsonSchema)]
pub struct SummaryRequest {
    /// Usage tier filter: "high" (10+), "medium" (5-9), "low" (under 5), or empty for all
    #[serde(default)]
    pub usage_filter: Option<String>,
    /// Sort column: "module_name" (default) or "usage_count"
    #[serde(default)]
    pub orderby: Option<String>,
    /// Sort direction: "asc" (default) or "desc"
    #[serde(default)]
    pub order: Option<String>,
    /// 1-based page number (25 modules per page)
    #[serde(default)]
    pub paged: Option<usize>,
    /// Case-insensitive module name search
    #[serde(default)]
    pub search: Option<String>,
}

impl SummaryRequest {
    pub fn query(&self) -> SummaryQuery {
        SummaryQuery::from_params(
            self.usage_filter.as_deref(),
            self.orderby.as_deref(),
            self.order.as_deref(),
            self.paged,
            self.search.as_deref(),
        )
    }
}

/// Aggregation for the summary view.
///
/// A failed scan degrades to an empty table instead of an error.
pub async fn summary_index(state: &TrackerState) -> Arc<UsageIndex> {
    match state.aggregate().await {
        Ok(index) => index,
        Err(e) => {
            tracing::warn!("Module scan failed, showing an empty summary: {}", e);
            Arc::new(UsageIndex::default())
        }
    }
}

/// Render one page of the module usage summary.
pub async fn handle_summary(state: &TrackerState, request: SummaryRequest) -> String {
    let index = summary_index(state).await;
    let page = build_summary(&index, &request.query());
    render_summary(&page, Some(&state.access().nonce()))
}
