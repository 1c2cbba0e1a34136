use clap::Parser;
use module_usage_tracker::cli::{Cli, Commands, run_details, run_summary};
use module_usage_tracker::config::TrackerConfig;
use module_usage_tracker::server::TrackerServer;
use module_usage_tracker::state::TrackerState;
use module_usage_tracker::tools::SummaryRequest;
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    module_usage_tracker::logging::init();

    let cli = Cli::parse();
    let config = TrackerConfig::discover(cli.config.as_deref())?;
    let state = Arc::new(TrackerState::from_config(&config));

    match cli.command {
        Commands::Serve => {
            tracing::info!("Starting module-usage-tracker MCP server");

            let server = TrackerServer::new(state);
            let service = server.serve(stdio()).await.inspect_err(|e| {
                tracing::error!("Error serving MCP server: {:?}", e);
            })?;

            service.waiting().await?;
        }
        Commands::Summary {
            usage_filter,
            orderby,
            order,
            page,
            search,
            json,
        } => {
            let request = SummaryRequest {
                usage_filter,
                orderby,
                order,
                paged: page,
                search,
            };
            print!("{}", run_summary(&state, request, json).await?);
        }
        Commands::Details { module, json } => match run_details(&state, module, json).await {
            Ok(output) => print!("{}", output),
            Err(message) => {
                eprintln!("{}", message);
                std::process::exit(1);
            }
        },
        Commands::Token => println!("{}", state.access().nonce()),
    }

    Ok(())
}
