use thiserror::Error;

use crate::config::{AuthMode, AuthSettings, DiscoverySettings, ServerSettings, Settings, TransportSettings};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        errors.extend(Self::validate_server(&settings.server));
        errors.extend(Self::validate_discovery(&settings.discovery));
        errors.extend(Self::validate_transport(&settings.transport));
        errors.extend(Self::validate_auth(&settings.auth));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(server: &ServerSettings) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if server.host.is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }

        errors
    }

    fn validate_discovery(discovery: &DiscoverySettings) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if discovery.project_id.trim().is_empty() {
            errors.push(ValidationError::MissingField(
                "discovery.project_id (PROJECT_ID)".to_string(),
            ));
        }

        if discovery.host.trim().is_empty() {
            errors.push(ValidationError::MissingField(
                "discovery.host (DISCOVERY_ENGINE_HOST)".to_string(),
            ));
        } else if discovery.host.contains("://") {
            errors.push(ValidationError::InvalidValue {
                field: "discovery.host".to_string(),
                reason: "Host must not include a scheme; set discovery.scheme instead".to_string(),
            });
        }

        if discovery.scheme != "https" && discovery.scheme != "http" {
            errors.push(ValidationError::InvalidValue {
                field: "discovery.scheme".to_string(),
                reason: format!("Unsupported scheme '{}'", discovery.scheme),
            });
        }

        if discovery.model_version.is_empty() {
            errors.push(ValidationError::MissingField("discovery.model_version".to_string()));
        }

        errors
    }

    fn validate_transport(transport: &TransportSettings) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if transport.timeout_seconds == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "transport.timeout_seconds".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if transport.connect_timeout_seconds == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "transport.connect_timeout_seconds".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        errors
    }

    fn validate_auth(auth: &AuthSettings) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if auth.scope.is_empty() {
            errors.push(ValidationError::MissingField("auth.scope".to_string()));
        }

        if auth.mode == AuthMode::Static && auth.token_env.is_empty() {
            errors.push(ValidationError::MissingField("auth.token_env".to_string()));
        }

        errors
    }
}
