use crate::detail::{DetailRequest, DetailResponse, get_details};
use crate::format::{render_detail_error, render_details, render_summary};
use crate::state::TrackerState;
use crate::summary::build_summary;
use crate::tools::{SummaryRequest, summary_index};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "module-usage-tracker")]
#[command(about = "Report content-block module usage across published pages and posts", long_about = None)]
pub struct Cli {
    /// Config file (defaults to ./module-tracker.toml, then the user config directory)
    #[arg(short, long, global = true, env = "MODULE_TRACKER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the summary and detail tools over MCP (stdio)
    Serve,
    /// Print one page of the usage summary
    Summary {
        /// Usage tier: high, medium or low
        #[arg(short = 'f', long = "filter")]
        usage_filter: Option<String>,
        /// Sort column: module_name or usage_count
        #[arg(long)]
        orderby: Option<String>,
        /// Sort direction: asc or desc
        #[arg(long)]
        order: Option<String>,
        #[arg(short, long)]
        page: Option<usize>,
        #[arg(short, long)]
        search: Option<String>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List the documents using a module
    Details {
        module: String,
        /// Emit the JSON wire response
        #[arg(long)]
        json: bool,
    },
    /// Print the session token expected by detail requests
    Token,
}

/// Output of `details`: the listing on success, the failure text otherwise.
///
/// Local invocations act with the process's own token.
pub async fn run_details(
    state: &TrackerState,
    module: String,
    json: bool,
) -> std::result::Result<String, String> {
    let request = DetailRequest {
        module: Some(module),
        security: Some(state.access().nonce()),
    };
    let result = get_details(state, request).await;

    if json {
        let failed = result.is_err();
        let response = serde_json::to_string(&DetailResponse::from(result))
            .map_err(|e| format!("Failed to encode response: {}", e))?;
        return if failed { Err(response) } else { Ok(response + "\n") };
    }

    result
        .map(|payload| render_details(&payload))
        .map_err(|e| render_detail_error(&e))
}

/// Output of `summary`: the markdown table, or the page as JSON.
pub async fn run_summary(
    state: &TrackerState,
    request: SummaryRequest,
    json: bool,
) -> anyhow::Result<String> {
    let index = summary_index(state).await;
    let summary = build_summary(&index, &request.query());
    if json {
        Ok(serde_json::to_string_pretty(&summary)? + "\n")
    } else {
        Ok(render_summary(&summary, None))
    }
}
