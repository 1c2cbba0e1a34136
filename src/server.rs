//! MCP server exposing the summary view and detail lookup.

use crate::detail::DetailRequest;
use crate::state::TrackerState;
use crate::tools::{SummaryRequest, handle_module_details, handle_summary};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{self, JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP Server for module usage queries
#[derive(Clone)]
pub struct TrackerServer {
    /// Shared tracker state (collaborators, scan cache, access guard)
    state: Arc<TrackerState>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for TrackerServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerServer")
            .field("state", &self.state)
            .finish()
    }
}

#[tool_router]
impl TrackerServer {
    pub fn new(state: Arc<TrackerState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    /// Get a reference to the shared TrackerState.
    pub fn state(&self) -> &Arc<TrackerState> {
        &self.state
    }

    #[tool(
        description = "List content-block modules with their total usage counts across published pages and posts. Supports filtering by usage tier, sorting by name or count, name search and pagination (25 per page). The output ends with the security token required by module_details.",
        input_schema = inline_schema_for_type::<SummaryRequest>()
    )]
    async fn module_usage_summary(
        &self,
        Parameters(request): Parameters<SummaryRequest>,
    ) -> std::result::Result<String, String> {
        Ok(handle_summary(&self.state, request).await)
    }

    #[tool(
        description = "List the pages and posts that use a given module, with titles and edit links. Requires the security token printed by module_usage_summary.",
        input_schema = inline_schema_for_type::<DetailRequest>()
    )]
    async fn module_details(
        &self,
        Parameters(request): Parameters<DetailRequest>,
    ) -> std::result::Result<String, String> {
        handle_module_details(&self.state, request).await
    }
}

#[tool_handler]
impl ServerHandler for TrackerServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "module-usage-tracker: reports how often each registered content-block module \
                 is used across published pages and posts. Start with module_usage_summary, then \
                 call module_details with a module name and the security token from the summary."
                    .to_string(),
            )
    }
}

/// Generate an inline JSON schema for MCP tools
///
/// Unlike rmcp's default `schema_for_type()`, this function sets `inline_subschemas = true`
/// so optional parameters render as plain fields rather than $ref patterns.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();
    let object = serde_json::to_value(schema).expect("failed to serialize schema");

    let json_object = match object {
        serde_json::Value::Object(object) => object,
        _ => panic!("Schema serialization produced non-object value"),
    };

    Arc::new(json_object)
}
