use clap::Parser;
use std::path::PathBuf;

use crate::config::AuthMode;

/// REST proxy for Discovery Engine search, answers and sessions
#[derive(Parser, Debug, Clone)]
#[command(name = "search-agent", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "SEARCH_AGENT_CONFIG", default_value = "search-agent.toml")]
    pub config: PathBuf,

    /// Listen address
    #[arg(long, env = "SEARCH_AGENT_HOST")]
    pub host: Option<String>,

    /// Listen port
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Google Cloud project that owns the engines
    #[arg(long, env = "PROJECT_ID")]
    pub project_id: Option<String>,

    /// Discovery Engine API host, optionally with a version path
    #[arg(long, env = "DISCOVERY_ENGINE_HOST")]
    pub discovery_host: Option<String>,

    /// Preamble sent with every answer generation request
    #[arg(long, env = "DISCOVERY_ENGINE_SEARCH_PROMPT")]
    pub search_prompt: Option<String>,

    /// Answer generation model version
    #[arg(long, env = "DISCOVERY_ENGINE_MODEL_VERSION")]
    pub model_version: Option<String>,

    /// Timeout for each upstream call, in seconds
    #[arg(long, env = "SEARCH_AGENT_UPSTREAM_TIMEOUT")]
    pub upstream_timeout: Option<u64>,

    /// INSECURE: skip TLS certificate verification on upstream calls
    #[arg(long, env = "SEARCH_AGENT_INSECURE_SKIP_TLS_VERIFY")]
    pub insecure_skip_tls_verify: bool,

    /// How to obtain upstream access tokens
    #[arg(long, value_enum, env = "SEARCH_AGENT_AUTH_MODE")]
    pub auth_mode: Option<AuthMode>,

    /// Service account JSON key file
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    pub credentials_file: Option<PathBuf>,

    /// Reuse access tokens until shortly before they expire
    #[arg(long, env = "SEARCH_AGENT_CACHE_TOKENS")]
    pub cache_tokens: bool,
}
