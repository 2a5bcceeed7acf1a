//! Form renderer state machine
//!
//! One [`FormSession`] backs one mounted form. It starts in `Editing`, moves
//! to `Submitting` only when every field passes the compiled schema, and
//! ends in `Submitted`, which is terminal for the session. A webhook failure
//! does not stop the session from reaching `Submitted`.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::form::{FieldType, FieldValue, FormConfig, FormValues, SubmissionPayload};
use crate::domain::WebhookPort;
use crate::schema::{CompiledSchema, FieldErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionState {
    Editing,
    Submitting,
    Submitted,
}

#[derive(Debug, Error)]
pub enum SubmitRejection {
    #[error("{} field(s) failed validation", .0.len())]
    Invalid(FieldErrors),

    #[error("Form is {0:?}, not accepting submissions")]
    NotEditing(SubmissionState),
}

/// Result of a full submit attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; the session stays in `Editing`
    Rejected(FieldErrors),
    /// The session reached `Submitted`
    Submitted {
        success_message: String,
        /// Whether a webhook call was attempted
        dispatched: bool,
    },
    /// The session had already left `Editing`
    AlreadySubmitted,
}

/// Validated submission awaiting dispatch. Only [`FormSession::begin_submit`]
/// creates one.
#[derive(Debug)]
pub struct PendingSubmission {
    webhook_url: Option<String>,
    payload: SubmissionPayload,
}

impl PendingSubmission {
    pub fn payload(&self) -> &SubmissionPayload {
        &self.payload
    }

    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url.as_deref()
    }
}

// ============================================================================
// View model
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Email,
    Number,
    Textarea,
    Select,
    Checkbox,
    Radio,
}

impl From<&FieldType> for InputKind {
    fn from(field_type: &FieldType) -> Self {
        match field_type {
            FieldType::Email => Self::Email,
            FieldType::Number => Self::Number,
            FieldType::Textarea => Self::Textarea,
            FieldType::Select => Self::Select,
            FieldType::Checkbox => Self::Checkbox,
            FieldType::Radio => Self::Radio,
            FieldType::Text | FieldType::Other(_) => Self::Text,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionView {
    pub value: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub id: String,
    pub label: String,
    pub kind: InputKind,
    pub placeholder: Option<String>,
    pub required: bool,
    pub value: String,
    pub options: Vec<OptionView>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub form_id: String,
    pub title: String,
    pub description: String,
    pub submit_button_text: String,
    pub success_message: String,
    pub primary_color: String,
    pub background_color: String,
    pub border_radius: u32,
    pub state: SubmissionState,
    pub fields: Vec<FieldView>,
}

// ============================================================================
// Session
// ============================================================================

pub struct FormSession {
    config: FormConfig,
    schema: CompiledSchema,
    values: FormValues,
    errors: FieldErrors,
    state: SubmissionState,
    webhook: Arc<dyn WebhookPort>,
}

impl FormSession {
    pub fn new(config: FormConfig, webhook: Arc<dyn WebhookPort>) -> Self {
        let schema = CompiledSchema::compile(&config);
        let values = schema.initial_values();
        Self {
            config,
            schema,
            values,
            errors: FieldErrors::new(),
            state: SubmissionState::Editing,
            webhook,
        }
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn schema(&self) -> &CompiledSchema {
        &self.schema
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Set one field's value. Ignored for unknown fields or outside `Editing`.
    pub fn set_value(&mut self, field_id: &str, value: FieldValue) -> bool {
        if self.state != SubmissionState::Editing || self.schema.rule(field_id).is_none() {
            return false;
        }
        self.values.insert(field_id.to_string(), value);
        true
    }

    /// Replace the values of every known field present in `values`
    pub fn set_values(&mut self, values: FormValues) {
        for (field_id, value) in values {
            self.set_value(&field_id, value);
        }
    }

    /// Check or uncheck one option of a checkbox group
    pub fn toggle_option(&mut self, field_id: &str, option: &str, checked: bool) -> bool {
        if self.state != SubmissionState::Editing {
            return false;
        }
        let Some(rule) = self.schema.rule(field_id) else {
            return false;
        };
        if !rule.base.is_multi_value() {
            return false;
        }

        let mut selected = self
            .values
            .get(field_id)
            .map(|v| v.selections().to_vec())
            .unwrap_or_default();
        selected.retain(|s| s != option);
        if checked {
            selected.push(option.to_string());
        }
        self.values
            .insert(field_id.to_string(), FieldValue::Selections(selected));
        true
    }

    /// Validate the current values and, if they pass, move to `Submitting`.
    ///
    /// On failure every failing field gets its error and the session stays in
    /// `Editing`.
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, SubmitRejection> {
        if self.state != SubmissionState::Editing {
            return Err(SubmitRejection::NotEditing(self.state));
        }

        if let Err(errors) = self.schema.validate(&self.values) {
            tracing::debug!("Form {} rejected: {} invalid field(s)", self.config.id, errors.len());
            self.errors = errors.clone();
            return Err(SubmitRejection::Invalid(errors));
        }

        self.errors.clear();
        self.state = SubmissionState::Submitting;

        Ok(PendingSubmission {
            webhook_url: self.config.webhook_target().map(str::to_string),
            payload: SubmissionPayload {
                form_id: self.config.id.clone(),
                form_title: self.config.title.clone(),
                submitted_at: Utc::now(),
                data: self.values.clone(),
            },
        })
    }

    /// Dispatch a pending submission and finish in `Submitted`.
    pub async fn complete(&mut self, pending: PendingSubmission) -> SubmitOutcome {
        if self.state != SubmissionState::Submitting {
            return SubmitOutcome::AlreadySubmitted;
        }

        let dispatched = match pending.webhook_url.as_deref() {
            Some(url) => {
                match self.webhook.dispatch(url, &pending.payload).await {
                    Ok(()) => tracing::info!("Delivered submission for form {} to webhook", self.config.id),
                    Err(e) => tracing::warn!("Webhook delivery for form {} failed: {}", self.config.id, e),
                }
                true
            }
            None => false,
        };

        self.values = self.schema.initial_values();
        self.state = SubmissionState::Submitted;

        SubmitOutcome::Submitted {
            success_message: self.config.success_message.clone(),
            dispatched,
        }
    }

    /// Validate, dispatch and finish in one step
    pub async fn submit(&mut self) -> SubmitOutcome {
        match self.begin_submit() {
            Ok(pending) => self.complete(pending).await,
            Err(SubmitRejection::Invalid(errors)) => SubmitOutcome::Rejected(errors),
            Err(SubmitRejection::NotEditing(_)) => SubmitOutcome::AlreadySubmitted,
        }
    }

    pub fn view(&self) -> FormView {
        let fields = self
            .config
            .fields
            .iter()
            .map(|field| {
                let kind = InputKind::from(&field.field_type);
                let current = self.values.get(&field.id);
                let selected = current.map(|v| v.selections()).unwrap_or(&[]);
                let placeholder = match (&field.placeholder, kind) {
                    (Some(p), _) => Some(p.clone()),
                    (None, InputKind::Select) => Some(format!("Select {}", field.label)),
                    (None, _) => None,
                };
                let value = current
                    .and_then(|v| v.as_text())
                    .unwrap_or_default()
                    .to_string();
                let options = field
                    .options
                    .iter()
                    .map(|option| OptionView {
                        value: option.clone(),
                        selected: selected.contains(option) || value == *option,
                    })
                    .collect();

                FieldView {
                    id: field.id.clone(),
                    label: field.label.clone(),
                    kind,
                    placeholder,
                    required: field.required,
                    value,
                    options,
                    error: self.errors.get(&field.id).cloned(),
                }
            })
            .collect();

        FormView {
            form_id: self.config.id.clone(),
            title: self.config.title.clone(),
            description: self.config.description.clone(),
            submit_button_text: self.config.submit_button_text.clone(),
            success_message: self.config.success_message.clone(),
            primary_color: self.config.primary_color.clone(),
            background_color: self.config.background_color.clone(),
            border_radius: self.config.border_radius,
            state: self.state,
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::WebhookError;
    use crate::domain::form::FieldDefinition;
    use crate::domain::presets;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingWebhook {
        calls: Mutex<Vec<(String, SubmissionPayload)>>,
        fail: bool,
    }

    #[async_trait]
    impl WebhookPort for RecordingWebhook {
        async fn dispatch(&self, url: &str, payload: &SubmissionPayload) -> Result<(), WebhookError> {
            self.calls.lock().await.push((url.to_string(), payload.clone()));
            if self.fail {
                Err(WebhookError::Network("connection refused".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn scenario_form() -> FormConfig {
        let mut config = presets::default_form();
        config.id = "scenario".to_string();
        config.fields = vec![
            FieldDefinition::new("location", FieldType::Text, "Location").required(),
            FieldDefinition::new("propertyType", FieldType::Select, "Property Type")
                .with_options(["House", "Apartment", "Plot"])
                .required(),
        ];
        config
    }

    #[tokio::test]
    async fn test_rejected_submission_stays_editing() {
        let webhook = Arc::new(RecordingWebhook::default());
        let mut session = FormSession::new(scenario_form(), webhook.clone());

        session.set_value("location", FieldValue::from(""));
        session.set_value("propertyType", FieldValue::from("House"));

        let errors = match session.submit().await {
            SubmitOutcome::Rejected(errors) => errors,
            other => panic!("expected rejection, got {:?}", other),
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["location"], "Location is required");
        assert_eq!(session.state(), SubmissionState::Editing);
        assert_eq!(session.errors().len(), 1);
        assert_eq!(session.view().fields[0].error.as_deref(), Some("Location is required"));
        assert!(webhook.calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_valid_submission_passes_through_submitting() {
        let webhook = Arc::new(RecordingWebhook::default());
        let mut session = FormSession::new(scenario_form(), webhook.clone());
        session.set_value("location", FieldValue::from("DHA Phase 6"));
        session.set_value("propertyType", FieldValue::from("House"));

        let pending = session.begin_submit().unwrap();
        assert_eq!(session.state(), SubmissionState::Submitting);
        assert!(pending.webhook_url().is_none());
        assert_eq!(pending.payload().data["location"], FieldValue::from("DHA Phase 6"));

        let outcome = session.complete(pending).await;
        assert_eq!(
            outcome,
            SubmitOutcome::Submitted {
                success_message: "Thank you! We'll get back to you soon.".to_string(),
                dispatched: false,
            }
        );
        assert_eq!(session.state(), SubmissionState::Submitted);
        assert_eq!(session.values(), &session.schema().initial_values());
        assert!(webhook.calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_webhook_receives_payload() {
        let webhook = Arc::new(RecordingWebhook::default());
        let mut config = scenario_form();
        config.webhook_url = Some("https://hooks.example.com/lead".to_string());
        let mut session = FormSession::new(config, webhook.clone());
        session.set_value("location", FieldValue::from("Gulberg"));
        session.set_value("propertyType", FieldValue::from("Plot"));

        let outcome = session.submit().await;
        assert!(matches!(outcome, SubmitOutcome::Submitted { dispatched: true, .. }));

        let calls = webhook.calls.lock().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "https://hooks.example.com/lead");
        assert_eq!(calls[0].1.form_id, "scenario");
        assert_eq!(calls[0].1.form_title, "Property Value Estimator");
        assert_eq!(calls[0].1.data["propertyType"], FieldValue::from("Plot"));
    }

    #[tokio::test]
    async fn test_webhook_failure_still_submits() {
        let webhook = Arc::new(RecordingWebhook {
            fail: true,
            ..Default::default()
        });
        let mut config = scenario_form();
        config.webhook_url = Some("https://hooks.example.com/lead".to_string());
        let mut session = FormSession::new(config, webhook.clone());
        session.set_value("location", FieldValue::from("Gulberg"));
        session.set_value("propertyType", FieldValue::from("House"));

        assert!(matches!(session.submit().await, SubmitOutcome::Submitted { .. }));
        assert_eq!(session.state(), SubmissionState::Submitted);
        assert_eq!(webhook.calls.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_submitted_is_terminal() {
        let webhook = Arc::new(RecordingWebhook::default());
        let mut config = scenario_form();
        config.webhook_url = Some("https://hooks.example.com/lead".to_string());
        let mut session = FormSession::new(config, webhook.clone());
        session.set_value("location", FieldValue::from("Gulberg"));
        session.set_value("propertyType", FieldValue::from("House"));
        session.submit().await;

        assert!(!session.set_value("location", FieldValue::from("Again")));
        assert_eq!(session.submit().await, SubmitOutcome::AlreadySubmitted);
        assert!(matches!(session.begin_submit(), Err(SubmitRejection::NotEditing(SubmissionState::Submitted))));
        assert_eq!(webhook.calls.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_checkbox_toggle_and_view() {
        let mut config = scenario_form();
        config.fields.push(
            FieldDefinition::new("extras", FieldType::Checkbox, "Extras")
                .with_options(["Pool", "Garden", "Garage"]),
        );
        let mut session = FormSession::new(config, Arc::new(RecordingWebhook::default()));

        assert!(session.toggle_option("extras", "Pool", true));
        assert!(session.toggle_option("extras", "Garage", true));
        assert!(session.toggle_option("extras", "Pool", false));
        assert!(session.toggle_option("extras", "Garage", true));
        assert!(!session.toggle_option("location", "Pool", true));
        assert_eq!(session.values()["extras"].selections(), ["Garage".to_string()]);

        let view = session.view();
        let extras = &view.fields[2];
        assert_eq!(extras.kind, InputKind::Checkbox);
        assert!(extras.options[2].selected);
        assert!(!extras.options[0].selected);
        assert_eq!(view.fields[1].placeholder.as_deref(), Some("Select Property Type"));
    }

    #[tokio::test]
    async fn test_unknown_fields_are_ignored() {
        let mut session = FormSession::new(scenario_form(), Arc::new(RecordingWebhook::default()));
        assert!(!session.set_value("nope", FieldValue::from("x")));
        assert!(!session.values().contains_key("nope"));
    }
}
