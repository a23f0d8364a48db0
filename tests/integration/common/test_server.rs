use search_agent::adapters::discovery_client::DiscoveryClient;
use search_agent::adapters::health_handler::HealthHandler;
use search_agent::adapters::metrics_handler::{MetricsCollector, MetricsHandler};
use search_agent::adapters::search_handler::AgentState;
use search_agent::adapters::token_provider::{StaticTokenProvider, TokenProvider};
use search_agent::application::SearchAgent;
use search_agent::config::{
    AuthSettings, DiscoverySettings, ServerSettings, Settings, TransportSettings,
};
use std::net::SocketAddr;
use std::sync::Arc;
use wiremock::MockServer;

pub const TEST_TOKEN: &str = "test-token";
pub const PROJECT_ID: &str = "test-project";
pub const ENGINE_PATH: &str =
    "/projects/test-project/locations/global/collections/default_collection/engines/e1";

pub struct TestServer {
    pub addr: SocketAddr,
    pub base_url: String,
}

impl TestServer {
    /// Search agent wired to `upstream` with a fixed bearer token
    pub async fn new(upstream: &MockServer) -> Self {
        Self::with_tokens(upstream, Arc::new(StaticTokenProvider::new(TEST_TOKEN))).await
    }

    pub async fn with_tokens(upstream: &MockServer, tokens: Arc<dyn TokenProvider>) -> Self {
        let settings = Arc::new(Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            discovery: DiscoverySettings {
                project_id: PROJECT_ID.to_string(),
                host: upstream.address().to_string(),
                scheme: "http".to_string(),
                search_prompt: "You are a helpful assistant.".to_string(),
                model_version: "gemini-2.0-flash-001/answer_gen/v1".to_string(),
            },
            transport: TransportSettings::default(),
            auth: AuthSettings::default(),
        });

        let metrics = Arc::new(MetricsCollector::new().unwrap());
        let discovery = DiscoveryClient::new(reqwest::Client::new(), tokens, &settings.discovery)
            .with_metrics(metrics.clone());
        let agent = Arc::new(SearchAgent::new(Arc::new(discovery), &settings.discovery));

        let app = search_agent::create_app(
            AgentState {
                agent,
                metrics: metrics.clone(),
            },
            Arc::new(HealthHandler::new(settings.clone())),
            Arc::new(MetricsHandler::new(metrics)),
        );

        // Start server on random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer { addr, base_url }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
