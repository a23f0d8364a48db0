use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod validator;

use crate::application::request_builder::DEFAULT_MODEL_VERSION;
use crate::cli::Cli;

pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
pub const DEFAULT_METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub discovery: DiscoverySettings,
    #[serde(default)]
    pub transport: TransportSettings,
    #[serde(default)]
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Where and how to reach the Discovery Engine API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiscoverySettings {
    pub project_id: String,
    /// API host, optionally followed by a version path
    /// (e.g. "discoveryengine.googleapis.com/v1alpha")
    pub host: String,
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Preamble sent with every answer request
    #[serde(default)]
    pub search_prompt: String,
    #[serde(default = "default_model_version")]
    pub model_version: String,
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_model_version() -> String {
    DEFAULT_MODEL_VERSION.to_string()
}

/// Outbound HTTP transport
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransportSettings {
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// INSECURE: disables TLS certificate verification for upstream calls
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            insecure_skip_tls_verify: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Service account key when one is configured, metadata server otherwise
    Auto,
    ServiceAccount,
    MetadataServer,
    /// Token read from an environment variable
    Static,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    #[serde(default = "default_auth_mode")]
    pub mode: AuthMode,
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Service account JSON key; falls back to GOOGLE_APPLICATION_CREDENTIALS
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,
    /// Environment variable holding the token in `static` mode
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_metadata_url")]
    pub metadata_url: String,
    /// Reuse tokens until shortly before they expire
    #[serde(default)]
    pub cache_tokens: bool,
}

fn default_auth_mode() -> AuthMode {
    AuthMode::Auto
}

fn default_scope() -> String {
    CLOUD_PLATFORM_SCOPE.to_string()
}

fn default_token_env() -> String {
    "SEARCH_AGENT_ACCESS_TOKEN".to_string()
}

fn default_metadata_url() -> String {
    DEFAULT_METADATA_TOKEN_URL.to_string()
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            mode: default_auth_mode(),
            scope: default_scope(),
            credentials_file: None,
            token_env: default_token_env(),
            metadata_url: default_metadata_url(),
            cache_tokens: false,
        }
    }
}

impl Settings {
    /// Create settings from CLI arguments (config file, then env/CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::load(File::from(cli.config.clone()).required(false))?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_root(root: &str) -> Result<Self, anyhow::Error> {
        let config_path = std::path::Path::new(root).join("search-agent");
        let settings = Self::load(File::from(config_path).required(false))?;
        settings.validate()?;
        Ok(settings)
    }

    fn load<T>(source: T) -> Result<Self, anyhow::Error>
    where
        T: config::Source + Send + Sync + 'static,
    {
        let s = Config::builder()
            .add_source(source)
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 6080)?
            .set_default("discovery.project_id", "")?
            .set_default("discovery.host", "")?
            .build()?;

        Ok(s.try_deserialize()?)
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(project_id) = &cli.project_id {
            self.discovery.project_id = project_id.clone();
        }
        if let Some(host) = &cli.discovery_host {
            self.discovery.host = host.clone();
        }
        if let Some(prompt) = &cli.search_prompt {
            self.discovery.search_prompt = prompt.clone();
        }
        if let Some(model_version) = &cli.model_version {
            self.discovery.model_version = model_version.clone();
        }
        if let Some(timeout) = cli.upstream_timeout {
            self.transport.timeout_seconds = timeout;
        }
        if cli.insecure_skip_tls_verify {
            self.transport.insecure_skip_tls_verify = true;
        }
        if let Some(mode) = cli.auth_mode {
            self.auth.mode = mode;
        }
        if let Some(path) = &cli.credentials_file {
            self.auth.credentials_file = Some(path.clone());
        }
        if cli.cache_tokens {
            self.auth.cache_tokens = true;
        }
    }

    /// Base URL of the Discovery Engine API, without a trailing slash
    pub fn upstream_base_url(&self) -> String {
        self.discovery.base_url()
    }
}

impl DiscoverySettings {
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host.trim_end_matches('/'))
    }
}
