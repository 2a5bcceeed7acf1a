use async_trait::async_trait;

pub mod builder;
pub mod error;
pub mod form;
pub mod presets;
pub mod validation;

pub use builder::{FieldPatch, FormBuilder, FormSettingsPatch, SaveError};
pub use error::{StoreError, WebhookError};
pub use form::{
    FieldDefinition, FieldType, FieldValidation, FieldValue, FormConfig, FormValues,
    SubmissionPayload,
};
pub use validation::{FormValidator, ValidationError};

/// Key-value persistence of form configurations by id.
///
/// `load` of an unknown id yields `Ok(None)`; a stored value that cannot be
/// read back yields [`StoreError::Malformed`].
#[async_trait]
pub trait FormStorePort: Send + Sync {
    async fn save(&self, config: &FormConfig) -> Result<String, StoreError>;
    async fn load(&self, id: &str) -> Result<Option<FormConfig>, StoreError>;
}

/// Outbound delivery of a submission. The receiver's response is not inspected.
#[async_trait]
pub trait WebhookPort: Send + Sync {
    async fn dispatch(&self, url: &str, payload: &SubmissionPayload) -> Result<(), WebhookError>;
}
