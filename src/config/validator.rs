use crate::config::{Settings, StoreBackend};
use crate::domain::validation::{check_http_url, ValidationError};

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_server(&settings.server) {
            errors.extend(e);
        }

        if settings.store.backend == StoreBackend::File && settings.store.path.trim().is_empty() {
            errors.push(ValidationError::MissingField("store.path".to_string()));
        }

        if let Err(reason) = check_http_url(&settings.embed.public_url) {
            errors.push(ValidationError::InvalidValue {
                field: "embed.public_url".to_string(),
                reason,
            });
        }

        if settings.webhook.timeout_seconds == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "webhook.timeout_seconds".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if let Some(rate_limit) = &settings.rate_limit {
            if rate_limit.enabled && rate_limit.requests_per_second == 0 {
                errors.push(ValidationError::InvalidValue {
                    field: "rate_limit.requests_per_second".to_string(),
                    reason: "Must be greater than 0 when rate limiting is enabled".to_string(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(server: &crate::config::ServerSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if server.host.is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }

        if server.port == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
