use clap::Parser;
use search_agent::adapters::discovery_client::{build_http_client, DiscoveryClient};
use search_agent::adapters::health_handler::HealthHandler;
use search_agent::adapters::metrics_handler::{MetricsCollector, MetricsHandler};
use search_agent::adapters::search_handler::AgentState;
use search_agent::adapters::token_provider::{build_auth_client, build_token_provider};
use search_agent::application::SearchAgent;
use search_agent::cli::Cli;
use search_agent::config::Settings;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("search_agent=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let settings = Arc::new(Settings::new_with_cli(&cli)?);

    info!(
        project_id = %settings.discovery.project_id,
        upstream = %settings.upstream_base_url(),
        timeout_seconds = settings.transport.timeout_seconds,
        "Starting search agent"
    );

    let metrics = Arc::new(MetricsCollector::new()?);

    let tokens = build_token_provider(&settings.auth, build_auth_client(&settings.transport)?)?;
    let discovery = DiscoveryClient::new(
        build_http_client(&settings.transport)?,
        tokens,
        &settings.discovery,
    )
    .with_metrics(metrics.clone());

    let agent = Arc::new(SearchAgent::new(Arc::new(discovery), &settings.discovery));
    let agent_state = AgentState {
        agent,
        metrics: metrics.clone(),
    };

    let health_handler = Arc::new(HealthHandler::new(settings.clone()));
    let metrics_handler = Arc::new(MetricsHandler::new(metrics));

    let app = search_agent::create_app(agent_state, health_handler, metrics_handler);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
