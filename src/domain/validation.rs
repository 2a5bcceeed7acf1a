use std::collections::HashMap;
use thiserror::Error;

use crate::domain::form::FormConfig;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

/// Checks that a form configuration is fit to be saved and rendered.
pub struct FormValidator;

impl FormValidator {
    pub fn validate(config: &FormConfig) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if config.title.trim().is_empty() {
            errors.push(ValidationError::MissingField("title".to_string()));
        }

        if let Some(url) = config.webhook_target() {
            if let Err(reason) = check_http_url(url) {
                errors.push(ValidationError::InvalidValue {
                    field: "webhookUrl".to_string(),
                    reason,
                });
            }
        }

        if let Err(e) = Self::validate_fields(config) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_fields(config: &FormConfig) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut seen_ids = HashMap::new();

        for (idx, field) in config.fields.iter().enumerate() {
            if field.id.is_empty() {
                errors.push(ValidationError::MissingField(format!("fields[{}].id", idx)));
            } else if let Some(prev_idx) = seen_ids.insert(field.id.as_str(), idx) {
                errors.push(ValidationError::Duplicate(format!(
                    "Field id '{}' appears at indices {} and {}",
                    field.id, prev_idx, idx
                )));
            }

            if field.label.trim().is_empty() {
                errors.push(ValidationError::MissingField(format!("fields[{}].label", idx)));
            }

            if field.field_type.has_options() && field.options.is_empty() {
                errors.push(ValidationError::InvalidValue {
                    field: format!("fields[{}].options", idx),
                    reason: format!("A {} field needs at least one option", field.field_type),
                });
            }

            if let Some(validation) = &field.validation {
                if let (Some(min), Some(max)) = (validation.min, validation.max) {
                    if min > max {
                        errors.push(ValidationError::InvalidValue {
                            field: format!("fields[{}].validation", idx),
                            reason: format!("min ({}) is greater than max ({})", min, max),
                        });
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Accepts absolute `http`/`https` URLs with a host.
pub fn check_http_url(url: &str) -> Result<(), String> {
    let parsed = reqwest::Url::parse(url).map_err(|e| e.to_string())?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", parsed.scheme()));
    }
    if parsed.host_str().is_none() {
        return Err("missing host".to_string());
    }
    Ok(())
}
