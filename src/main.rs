//! Science Cookbook
//!
//! An MCP server for recipe import, scaling and unit conversion.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use cookbook::build_info;
use cookbook::config::Config;
use cookbook::mcp::CookbookService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("cookbook=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    // Load configuration and data files
    let config = Config::from_env();
    eprintln!("Data directory: {}", config.data_dir.display());
    let data = config.load_data();

    // Create the cookbook service
    let service = CookbookService::new(&config, data);

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
