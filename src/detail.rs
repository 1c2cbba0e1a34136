//! Detail lookup: which documents use a given module.

use crate::error::DetailError;
use crate::scan::UsageIndex;
use crate::state::TrackerState;
use crate::types::{DocumentId, PageDetail, UsageRecord};
use rapidfuzz::distance::jaro_winkler;
use rmcp::schemars;
use serde::{Deserialize, Serialize};

/// Heading of the detail title block.
const DETAIL_HEADING: &str = "Widget Usage Details";

/// Minimum similarity for a registry name to be suggested.
const SUGGESTION_THRESHOLD: f64 = 0.8;

const MAX_SUGGESTIONS: usize = 3;

/// Parameters of a detail lookup.
#[derive(Debug, Clone, Default, Deserialize, schemars::JsonSchema)]
pub struct DetailRequest {
    /// Module identifier to inspect
    #[serde(default)]
    pub module: Option<String>,
    /// Session token published with the summary view
    #[serde(default)]
    pub security: Option<String>,
}

/// Successful detail lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailPayload {
    /// HTML title block carrying the usage totals
    pub title: String,
    /// Documents using the module, in first-seen order
    pub pages: Vec<PageDetail>,
    #[serde(skip_serializing)]
    pub module: String,
    #[serde(skip_serializing)]
    pub count: u64,
    #[serde(skip_serializing)]
    pub unique_pages: usize,
}

/// Wire form of a detail response: `{title, pages}` or `{error}`.
///
/// Failures for unknown modules also carry `suggestions` when any registry
/// name is close enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DetailResponse {
    Success(DetailPayload),
    Failure {
        error: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        suggestions: Vec<String>,
    },
}

impl From<Result<DetailPayload, DetailError>> for DetailResponse {
    fn from(result: Result<DetailPayload, DetailError>) -> Self {
        match result {
            Ok(payload) => Self::Success(payload),
            Err(e) => Self::Failure {
                error: e.to_string(),
                suggestions: e.suggestions().to_vec(),
            },
        }
    }
}

/// Look up the documents using `request.module`.
///
/// Checks run in order: token and capability, module parameter, then the
/// aggregation. Rejected requests never reach the document store.
pub async fn get_details(
    state: &TrackerState,
    request: DetailRequest,
) -> Result<DetailPayload, DetailError> {
    state.access().verify(request.security.as_deref())?;

    let module = request
        .module
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or(DetailError::MissingModuleParameter)?
        .to_string();

    let index = state.aggregate().await.map_err(DetailError::ScanFailed)?;

    let Some(record) = index.get(&module) else {
        tracing::debug!("Detail lookup for unknown module '{}'", module);
        return Err(DetailError::ModuleNotFound {
            suggestions: suggest_modules(&index, &module),
            module,
        });
    };

    let ids: Vec<DocumentId> = record.pages.iter().copied().collect();
    let presentation = state.presentation().clone();
    let pages = tokio::task::spawn_blocking(move || {
        ids.into_iter()
            .map(|id| presentation.page_detail(id))
            .collect::<Vec<_>>()
    })
    .await
    .map_err(|e| DetailError::ScanFailed(format!("Page resolution failed: {}", e)))?;

    Ok(build_payload(record, pages))
}

fn build_payload(record: &UsageRecord, pages: Vec<PageDetail>) -> DetailPayload {
    let title = format!(
        "<h3>{}</h3><p><strong>The \"{}\" widget is used {} times across {} unique posts:</strong></p>",
        DETAIL_HEADING,
        html_escape::encode_text(record.name.as_str()),
        record.count,
        record.page_count()
    );
    DetailPayload {
        title,
        pages,
        module: record.name.to_string(),
        count: record.count,
        unique_pages: record.page_count(),
    }
}

/// Registry names close to `module`, best first.
fn suggest_modules(index: &UsageIndex, module: &str) -> Vec<String> {
    let mut scored: Vec<(f64, &str)> = index
        .module_ids()
        .map(|id| (jaro_winkler::similarity(module.chars(), id.as_str().chars()), id.as_str()))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, name)| name.to_string())
        .collect()
}
