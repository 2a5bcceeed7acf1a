//! In-memory editing of a form configuration
//!
//! Edits only touch the draft; nothing reaches the store until [`FormBuilder::save`].

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::error::StoreError;
use crate::domain::form::{FieldDefinition, FieldType, FieldValidation, FormConfig};
use crate::domain::presets;
use crate::domain::validation::{FormValidator, ValidationError};
use crate::domain::FormStorePort;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Form configuration is invalid: {}", format_errors(.0))]
    Invalid(Vec<ValidationError>),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SaveError {
    /// Convert to HTTP status code for API responses
    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            Self::Invalid(_) => axum::http::StatusCode::BAD_REQUEST,
            Self::Store(e) => e.status_code(),
        }
    }
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Partial update of one field. Absent members are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPatch {
    #[serde(default, rename = "type")]
    pub field_type: Option<FieldType>,
    pub label: Option<String>,
    /// An empty string clears the placeholder
    pub placeholder: Option<String>,
    pub required: Option<bool>,
    pub options: Option<Vec<String>>,
    pub validation: Option<FieldValidation>,
}

/// Partial update of the form-level metadata
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSettingsPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub submit_button_text: Option<String>,
    pub success_message: Option<String>,
    /// An empty string removes the webhook
    pub webhook_url: Option<String>,
    pub primary_color: Option<String>,
    pub background_color: Option<String>,
    pub border_radius: Option<u32>,
}

fn default_options() -> Vec<String> {
    vec!["Option 1".to_string(), "Option 2".to_string()]
}

#[derive(Debug, Clone)]
pub struct FormBuilder {
    config: FormConfig,
}

impl FormBuilder {
    /// Fresh draft with a generated id and the starter field set
    pub fn new() -> Self {
        Self {
            config: presets::starter_form(),
        }
    }

    /// Reopen a saved configuration for editing
    pub fn from_config(mut config: FormConfig) -> Self {
        if config.id.is_empty() {
            config.id = presets::new_id();
        }
        Self { config }
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Append a field of the given type and return its id
    pub fn add_field(&mut self, field_type: FieldType) -> String {
        let id = presets::new_id();
        let mut field = FieldDefinition::new(id.clone(), field_type.clone(), format!("New {} field", field_type));
        if field_type.has_options() {
            field.options = default_options();
        }
        self.config.fields.push(field);
        id
    }

    pub fn update_field(&mut self, field_id: &str, patch: FieldPatch) -> bool {
        let Some(field) = self.config.field_mut(field_id) else {
            return false;
        };

        if let Some(field_type) = patch.field_type {
            if field_type.has_options() && field.options.is_empty() {
                field.options = default_options();
            }
            field.field_type = field_type;
        }
        if let Some(label) = patch.label {
            field.label = label;
        }
        if let Some(placeholder) = patch.placeholder {
            field.placeholder = if placeholder.is_empty() { None } else { Some(placeholder) };
        }
        if let Some(required) = patch.required {
            field.required = required;
        }
        if let Some(options) = patch.options {
            field.options = options;
        }
        if let Some(validation) = patch.validation {
            field.validation = if validation.is_empty() { None } else { Some(validation) };
        }
        true
    }

    pub fn remove_field(&mut self, field_id: &str) -> bool {
        let before = self.config.fields.len();
        self.config.fields.retain(|f| f.id != field_id);
        self.config.fields.len() < before
    }

    /// Move a field to `index`, clamped to the end of the list
    pub fn move_field(&mut self, field_id: &str, index: usize) -> bool {
        let Some(from) = self.config.fields.iter().position(|f| f.id == field_id) else {
            return false;
        };
        let field = self.config.fields.remove(from);
        let to = index.min(self.config.fields.len());
        self.config.fields.insert(to, field);
        true
    }

    pub fn update_settings(&mut self, patch: FormSettingsPatch) {
        let config = &mut self.config;
        if let Some(title) = patch.title {
            config.title = title;
        }
        if let Some(description) = patch.description {
            config.description = description;
        }
        if let Some(text) = patch.submit_button_text {
            config.submit_button_text = text;
        }
        if let Some(message) = patch.success_message {
            config.success_message = message;
        }
        if let Some(url) = patch.webhook_url {
            config.webhook_url = if url.trim().is_empty() { None } else { Some(url) };
        }
        if let Some(color) = patch.primary_color {
            config.primary_color = color;
        }
        if let Some(color) = patch.background_color {
            config.background_color = color;
        }
        if let Some(radius) = patch.border_radius {
            config.border_radius = radius;
        }
    }

    /// Validate and persist the draft as one snapshot.
    ///
    /// `createdAt` is kept from the first save; `updatedAt` is refreshed.
    pub async fn save(&mut self, store: &dyn FormStorePort) -> Result<FormConfig, SaveError> {
        FormValidator::validate(&self.config).map_err(SaveError::Invalid)?;

        let now = Utc::now();
        let mut snapshot = self.config.clone();
        if snapshot.created_at.is_none() {
            // A draft opened without its timestamps must not reset an existing record
            snapshot.created_at = match store.load(&snapshot.id).await {
                Ok(Some(existing)) => existing.created_at.or(Some(now)),
                _ => Some(now),
            };
        }
        snapshot.updated_at = Some(now);

        let id = store.save(&snapshot).await?;
        snapshot.id = id;
        self.config = snapshot.clone();

        tracing::info!("Saved form configuration {} ({} fields)", snapshot.id, snapshot.fields.len());
        Ok(snapshot)
    }
}

impl Default for FormBuilder {
    fn default() -> Self {
        Self::new()
    }
}
