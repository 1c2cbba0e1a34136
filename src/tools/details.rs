//! Detail lookup handler.

use crate::detail::{DetailRequest, DetailResponse, get_details};
use crate::state::TrackerState;

/// Execute a detail lookup and serialize the wire response.
///
/// Success yields `{"title", "pages"}`; failures yield `{"error"}` on the error side.
pub async fn handle_module_details(
    state: &TrackerState,
    request: DetailRequest,
) -> Result<String, String> {
    let result = get_details(state, request).await;
    let failed = result.is_err();
    let response = DetailResponse::from(result);

    let json = serde_json::to_string(&response)
        .map_err(|e| format!("{{\"error\":\"Failed to encode response: {}\"}}", e))?;

    if failed { Err(json) } else { Ok(json) }
}
