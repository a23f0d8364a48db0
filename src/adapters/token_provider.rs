//! OAuth2 access tokens for the Discovery Engine API.
//!
//! Credential sources: a service account JSON key (signed JWT exchanged at
//! the key's token endpoint), an authorized user file holding a refresh
//! token, the GCE/Cloud Run metadata server, and a token taken verbatim from
//! an environment variable. `auto` mode looks for a credentials file in
//! `GOOGLE_APPLICATION_CREDENTIALS`, then gcloud's well-known location, and
//! falls back to the metadata server. By default every upstream call fetches a fresh token;
//! [`CachingTokenProvider`] reuses one until shortly before it expires.

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::{AuthMode, AuthSettings, TransportSettings};
use crate::domain::AuthError;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const REFRESH_TOKEN_GRANT: &str = "refresh_token";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";
const GCLOUD_CONFIG_ENV: &str = "CLOUDSDK_CONFIG";
const WELL_KNOWN_CREDENTIALS_FILE: &str = "application_default_credentials.json";

/// A bearer token and, when the issuer reported one, its expiry
#[derive(Clone)]
pub struct AccessToken {
    secret: Arc<SecretString>,
    expires_at: Option<Instant>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_in: Option<u64>) -> Self {
        Self {
            secret: Arc::new(SecretString::from(token.into())),
            expires_at: expires_in.map(|secs| Instant::now() + Duration::from_secs(secs)),
        }
    }

    pub fn bearer(&self) -> &str {
        self.secret.expose_secret()
    }

    /// True while the token stays valid for at least `margin`. Tokens
    /// without a known expiry are never considered fresh.
    pub fn is_fresh(&self, margin: Duration) -> bool {
        self.expires_at
            .map(|at| at > Instant::now() + margin)
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<AccessToken, AuthError>;

    /// Short label for logs
    fn name(&self) -> &'static str;
}

/// Token endpoint response (both the OAuth2 endpoint and the metadata server)
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

async fn read_token_response(response: reqwest::Response) -> Result<AccessToken, AuthError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(AuthError::TokenEndpoint {
            status: status.as_u16(),
            message,
        });
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| AuthError::TokenRequest(format!("Invalid token response: {}", e)))?;
    Ok(AccessToken::new(token.access_token, token.expires_in))
}

// ============================================================================
// Credential files
// ============================================================================

/// A credentials JSON file, told apart by its `type` field
#[derive(Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialsFile {
    ServiceAccount(ServiceAccountKey),
    /// Written by `gcloud auth application-default login`
    AuthorizedUser(AuthorizedUserKey),
}

impl CredentialsFile {
    pub fn from_file(path: &Path) -> Result<Self, AuthError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AuthError::MissingCredentials(format!("Cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            AuthError::InvalidCredentials(format!(
                "{} is not a supported credentials file: {}",
                path.display(),
                e
            ))
        })
    }
}

#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Clone, Deserialize)]
pub struct AuthorizedUserKey {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

pub struct ServiceAccountTokenProvider {
    client: Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scope: String,
}

impl ServiceAccountTokenProvider {
    pub fn new(client: Client, key: ServiceAccountKey, scope: impl Into<String>) -> Result<Self, AuthError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| AuthError::InvalidCredentials(format!("Invalid private key: {}", e)))?;

        Ok(Self {
            client,
            key,
            encoding_key,
            scope: scope.into(),
        })
    }

    fn signed_assertion(&self) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidCredentials(format!("Cannot sign assertion: {}", e)))
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        let assertion = self.signed_assertion()?;
        debug!(client_email = %self.key.client_email, "Exchanging service account assertion");

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| AuthError::TokenRequest(e.to_string()))?;

        read_token_response(response).await
    }

    fn name(&self) -> &'static str {
        "service_account"
    }
}

// ============================================================================
// Authorized user (refresh token)
// ============================================================================

pub struct AuthorizedUserTokenProvider {
    client: Client,
    key: AuthorizedUserKey,
}

impl AuthorizedUserTokenProvider {
    pub fn new(client: Client, key: AuthorizedUserKey) -> Self {
        Self { client, key }
    }
}

#[async_trait]
impl TokenProvider for AuthorizedUserTokenProvider {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        debug!(client_id = %self.key.client_id, "Refreshing user access token");

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", REFRESH_TOKEN_GRANT),
                ("client_id", self.key.client_id.as_str()),
                ("client_secret", self.key.client_secret.as_str()),
                ("refresh_token", self.key.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::TokenRequest(e.to_string()))?;

        read_token_response(response).await
    }

    fn name(&self) -> &'static str {
        "authorized_user"
    }
}

// ============================================================================
// Metadata server
// ============================================================================

pub struct MetadataServerTokenProvider {
    client: Client,
    url: String,
    scope: String,
}

impl MetadataServerTokenProvider {
    pub fn new(client: Client, url: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            scope: scope.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for MetadataServerTokenProvider {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        let response = self
            .client
            .get(&self.url)
            .header("Metadata-Flavor", "Google")
            .query(&[("scopes", self.scope.as_str())])
            .send()
            .await
            .map_err(|e| AuthError::TokenRequest(format!("Metadata server unreachable: {}", e)))?;

        read_token_response(response).await
    }

    fn name(&self) -> &'static str {
        "metadata_server"
    }
}

// ============================================================================
// Static token
// ============================================================================

enum StaticSource {
    Value(AccessToken),
    Env(String),
}

/// Token supplied from outside, e.g. `gcloud auth print-access-token`
pub struct StaticTokenProvider {
    source: StaticSource,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            source: StaticSource::Value(AccessToken::new(token, None)),
        }
    }

    /// Reads the variable on every call so a rotated token is picked up
    pub fn from_env(var: impl Into<String>) -> Self {
        Self {
            source: StaticSource::Env(var.into()),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        match &self.source {
            StaticSource::Value(token) => Ok(token.clone()),
            StaticSource::Env(var) => match std::env::var(var) {
                Ok(token) if !token.trim().is_empty() => Ok(AccessToken::new(token.trim(), None)),
                _ => Err(AuthError::MissingCredentials(format!(
                    "Environment variable {} not set",
                    var
                ))),
            },
        }
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

// ============================================================================
// Caching wrapper
// ============================================================================

pub struct CachingTokenProvider {
    inner: Arc<dyn TokenProvider>,
    cache: RwLock<Option<AccessToken>>,
    margin: Duration,
}

impl CachingTokenProvider {
    pub fn new(inner: Arc<dyn TokenProvider>) -> Self {
        Self {
            inner,
            cache: RwLock::new(None),
            margin: Duration::from_secs(60),
        }
    }
}

#[async_trait]
impl TokenProvider for CachingTokenProvider {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(token) = &*cache {
                if token.is_fresh(self.margin) {
                    return Ok(token.clone());
                }
            }
        }

        let token = self.inner.access_token().await?;
        let mut cache = self.cache.write().await;
        *cache = Some(token.clone());
        Ok(token)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

// ============================================================================
// Construction
// ============================================================================

/// HTTP client for token endpoints. Always verifies TLS, regardless of the
/// upstream transport's insecure switch.
pub fn build_auth_client(transport: &TransportSettings) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(transport.timeout_seconds))
        .connect_timeout(Duration::from_secs(transport.connect_timeout_seconds))
        .build()
}

fn credentials_path(settings: &AuthSettings) -> Option<PathBuf> {
    settings
        .credentials_file
        .clone()
        .or_else(|| std::env::var_os(CREDENTIALS_ENV).map(PathBuf::from))
}

/// gcloud's application default credentials file, whether or not it exists
fn well_known_credentials_path() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(GCLOUD_CONFIG_ENV) {
        return Some(PathBuf::from(dir).join(WELL_KNOWN_CREDENTIALS_FILE));
    }

    let config_dir = if cfg!(windows) {
        std::env::var_os("APPDATA").map(|dir| PathBuf::from(dir).join("gcloud"))
    } else {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config").join("gcloud"))
    };
    config_dir.map(|dir| dir.join(WELL_KNOWN_CREDENTIALS_FILE))
}

/// An explicit path wins; the well-known file is only used when present.
fn auto_credentials_path(explicit: Option<PathBuf>, well_known: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| well_known.filter(|path| path.is_file()))
}

pub fn provider_from_file(
    client: Client,
    path: &Path,
    scope: &str,
) -> Result<Arc<dyn TokenProvider>, AuthError> {
    let provider: Arc<dyn TokenProvider> = match CredentialsFile::from_file(path)? {
        CredentialsFile::ServiceAccount(key) => {
            Arc::new(ServiceAccountTokenProvider::new(client, key, scope)?)
        }
        CredentialsFile::AuthorizedUser(key) => Arc::new(AuthorizedUserTokenProvider::new(client, key)),
    };
    debug!(path = %path.display(), provider = provider.name(), "Loaded credentials file");
    Ok(provider)
}

pub fn build_token_provider(
    settings: &AuthSettings,
    client: Client,
) -> Result<Arc<dyn TokenProvider>, AuthError> {
    let provider: Arc<dyn TokenProvider> = match settings.mode {
        AuthMode::Static => Arc::new(StaticTokenProvider::from_env(settings.token_env.clone())),
        AuthMode::MetadataServer => Arc::new(MetadataServerTokenProvider::new(
            client,
            settings.metadata_url.clone(),
            settings.scope.clone(),
        )),
        AuthMode::ServiceAccount => {
            let path = credentials_path(settings).ok_or_else(|| {
                AuthError::MissingCredentials(format!(
                    "auth.credentials_file or {} must be set",
                    CREDENTIALS_ENV
                ))
            })?;
            match CredentialsFile::from_file(&path)? {
                CredentialsFile::ServiceAccount(key) => {
                    Arc::new(ServiceAccountTokenProvider::new(client, key, settings.scope.clone())?)
                }
                CredentialsFile::AuthorizedUser(_) => {
                    return Err(AuthError::InvalidCredentials(format!(
                        "{} holds user credentials, not a service account key",
                        path.display()
                    )))
                }
            }
        }
        AuthMode::Auto => {
            match auto_credentials_path(credentials_path(settings), well_known_credentials_path()) {
                Some(path) => provider_from_file(client, &path, &settings.scope)?,
                None => Arc::new(MetadataServerTokenProvider::new(
                    client,
                    settings.metadata_url.clone(),
                    settings.scope.clone(),
                )),
            }
        }
    };

    info!(provider = provider.name(), cache_tokens = settings.cache_tokens, "Token provider ready");

    if settings.cache_tokens {
        Ok(Arc::new(CachingTokenProvider::new(provider)))
    } else {
        Ok(provider)
    }
}
