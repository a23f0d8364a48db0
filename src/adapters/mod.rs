pub mod discovery_client;
pub mod health_handler;
pub mod metrics_handler;
pub mod search_handler;
pub mod token_provider;
