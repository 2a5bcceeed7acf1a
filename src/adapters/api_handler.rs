//! REST API handlers for the form builder
//!
//! Provides CRUD endpoints for stored forms and builder drafts, compiled
//! schemas, embed code, and JSON submissions.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::adapters::draft_registry::DraftRegistry;
use crate::adapters::embed_handler::EmbedPages;
use crate::adapters::metrics_handler::MetricsCollector;
use crate::application::embed::{self, EmbedCode, DYNAMIC_FORM_PATH};
use crate::application::renderer::{FormSession, SubmissionState, SubmitOutcome};
use crate::application::resolver::{FormOrigin, FormResolver};
use crate::domain::builder::{FieldPatch, FormBuilder, FormSettingsPatch, SaveError};
use crate::domain::error::StoreError;
use crate::domain::form::{FieldType, FormConfig, FormValues};
use crate::domain::{FormStorePort, WebhookPort};
use crate::schema::{CompiledSchema, FieldErrors};

/// Shared application state for API and embed handlers
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn FormStorePort>,
    pub resolver: Arc<FormResolver>,
    pub webhook: Arc<dyn WebhookPort>,
    pub drafts: DraftRegistry,
    pub metrics: Arc<MetricsCollector>,
    pub pages: Arc<EmbedPages>,
    /// Base URL written into generated embed code
    pub public_url: String,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed response that still carries a body, e.g. per-field errors
    pub fn rejected(data: T, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Some(data),
            error: Some(message.into()),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }
}

type ApiResult<T> = (StatusCode, Json<ApiResponse<T>>);

fn failure<T>(status: StatusCode, message: impl Into<String>) -> ApiResult<T> {
    (status, Json(ApiResponse::error(message)))
}

fn store_failure<T>(e: &StoreError) -> ApiResult<T> {
    tracing::error!("Form store error: {}", e);
    failure(e.status_code(), e.to_string())
}

fn save_failure<T>(e: &SaveError) -> ApiResult<T> {
    if let SaveError::Store(store_error) = e {
        tracing::error!("Failed to save form: {}", store_error);
    }
    failure(e.status_code(), e.to_string())
}

/// Stored configuration first, then the built-in presets
async fn find_form(state: &ApiState, id: &str) -> Result<(FormConfig, FormOrigin), ApiResult<()>> {
    match state.resolver.find(id).await {
        Ok(Some(found)) => Ok(found),
        Ok(None) => Err(failure(StatusCode::NOT_FOUND, "Form not found")),
        Err(e) => Err(store_failure(&e)),
    }
}

/// Swap the payload type of an error response
fn retype<T>((status, Json(body)): ApiResult<()>) -> ApiResult<T> {
    (status, Json(ApiResponse::error(body.error.unwrap_or_default())))
}

async fn save_config(state: &ApiState, builder: &mut FormBuilder) -> Result<FormConfig, SaveError> {
    let saved = builder.save(state.store.as_ref()).await?;
    state.metrics.forms_saved_total.inc();
    Ok(saved)
}

// ============================================================================
// Stored Forms
// ============================================================================

/// POST /api/forms - Save a complete configuration
pub async fn create_form(
    State(state): State<ApiState>,
    Json(config): Json<FormConfig>,
) -> impl IntoResponse {
    let mut builder = FormBuilder::from_config(config);
    match save_config(&state, &mut builder).await {
        Ok(saved) => (StatusCode::CREATED, Json(ApiResponse::success(saved))),
        Err(e) => save_failure(&e),
    }
}

/// GET /api/forms/:id
pub async fn get_form(State(state): State<ApiState>, Path(id): Path<String>) -> impl IntoResponse {
    match find_form(&state, &id).await {
        Ok((config, _)) => (StatusCode::OK, Json(ApiResponse::success(config))),
        Err(e) => retype(e),
    }
}

/// PUT /api/forms/:id - Replace a configuration
pub async fn update_form(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(mut config): Json<FormConfig>,
) -> impl IntoResponse {
    if !config.id.is_empty() && config.id != id {
        return failure(
            StatusCode::BAD_REQUEST,
            format!("Body id '{}' does not match path id '{}'", config.id, id),
        );
    }
    config.id = id;

    let mut builder = FormBuilder::from_config(config);
    match save_config(&state, &mut builder).await {
        Ok(saved) => (StatusCode::OK, Json(ApiResponse::success(saved))),
        Err(e) => save_failure(&e),
    }
}

/// GET /api/forms/:id/schema - Compiled rule descriptors
pub async fn get_form_schema(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match find_form(&state, &id).await {
        Ok((config, _)) => (
            StatusCode::OK,
            Json(ApiResponse::success(CompiledSchema::compile(&config))),
        ),
        Err(e) => retype(e),
    }
}

/// GET /api/forms/:id/embed - iframe and shortcode for a form
pub async fn get_form_embed(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match find_form(&state, &id).await {
        Ok((config, FormOrigin::Stored)) => (
            StatusCode::OK,
            Json(ApiResponse::<EmbedCode>::success(embed::generate(
                &state.public_url,
                DYNAMIC_FORM_PATH,
                Some(&config.id),
            ))),
        ),
        Ok((config, FormOrigin::Preset)) => (
            StatusCode::OK,
            Json(ApiResponse::success(embed::generate(
                &state.public_url,
                &format!("/embed/{}", config.id),
                None,
            ))),
        ),
        Err(e) => retype(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmissionRequest {
    #[serde(default)]
    pub values: FormValues,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub state: SubmissionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_message: Option<String>,
    #[serde(skip_serializing_if = "FieldErrors::is_empty")]
    pub errors: FieldErrors,
    pub webhook_dispatched: bool,
}

/// POST /api/forms/:id/submissions - Validate and submit values
pub async fn submit_form(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    request: Result<Json<SubmissionRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => return failure(rejection.status(), rejection.body_text()),
    };

    let config = match find_form(&state, &id).await {
        Ok((config, _)) => config,
        Err(e) => return retype(e),
    };

    let mut session = FormSession::new(config, state.webhook.clone());
    session.set_values(request.values);

    match session.submit().await {
        SubmitOutcome::Submitted {
            success_message,
            dispatched,
        } => {
            state.metrics.record_submission("submitted");
            (
                StatusCode::OK,
                Json(ApiResponse::success(SubmissionResult {
                    state: session.state(),
                    success_message: Some(success_message),
                    errors: FieldErrors::new(),
                    webhook_dispatched: dispatched,
                })),
            )
        }
        SubmitOutcome::Rejected(errors) => {
            state.metrics.record_submission("rejected");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::rejected(
                    SubmissionResult {
                        state: session.state(),
                        success_message: None,
                        errors,
                        webhook_dispatched: false,
                    },
                    "Submission failed validation",
                )),
            )
        }
        SubmitOutcome::AlreadySubmitted => failure(StatusCode::CONFLICT, "Form was already submitted"),
    }
}

// ============================================================================
// Drafts
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct CreateDraftRequest {
    /// Reopen this stored form instead of starting fresh
    pub from: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddFieldRequest {
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

#[derive(Debug, Deserialize)]
pub struct MoveFieldRequest {
    pub index: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldAdded {
    pub field_id: String,
    pub draft: FormConfig,
}

/// POST /api/drafts - Open a draft, fresh or from a stored form
pub async fn create_draft(
    State(state): State<ApiState>,
    request: Option<Json<CreateDraftRequest>>,
) -> impl IntoResponse {
    let request = request.map(|Json(r)| r).unwrap_or_default();

    let builder = match request.from.as_deref() {
        Some(id) => match find_form(&state, id).await {
            Ok((config, _)) => FormBuilder::from_config(config),
            Err(e) => return retype(e),
        },
        None => FormBuilder::new(),
    };

    let draft = builder.config().clone();
    state.drafts.open(builder).await;
    tracing::debug!("Opened draft {}", draft.id);
    (StatusCode::CREATED, Json(ApiResponse::success(draft)))
}

/// GET /api/drafts/:id
pub async fn get_draft(State(state): State<ApiState>, Path(id): Path<String>) -> impl IntoResponse {
    match state.drafts.get(&id).await {
        Some(draft) => (StatusCode::OK, Json(ApiResponse::success(draft.config().clone()))),
        None => failure(StatusCode::NOT_FOUND, "Draft not found"),
    }
}

/// PATCH /api/drafts/:id - Update form-level settings
pub async fn update_draft(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(patch): Json<FormSettingsPatch>,
) -> impl IntoResponse {
    let updated = state
        .drafts
        .with_draft(&id, |draft| {
            draft.update_settings(patch);
            draft.config().clone()
        })
        .await;

    match updated {
        Some(config) => (StatusCode::OK, Json(ApiResponse::success(config))),
        None => failure(StatusCode::NOT_FOUND, "Draft not found"),
    }
}

/// DELETE /api/drafts/:id - Discard a draft
pub async fn delete_draft(State(state): State<ApiState>, Path(id): Path<String>) -> impl IntoResponse {
    if state.drafts.discard(&id).await {
        (StatusCode::OK, Json(ApiResponse::ok()))
    } else {
        failure(StatusCode::NOT_FOUND, "Draft not found")
    }
}

/// POST /api/drafts/:id/fields - Append a field
pub async fn add_draft_field(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(request): Json<AddFieldRequest>,
) -> impl IntoResponse {
    let added = state
        .drafts
        .with_draft(&id, |draft| {
            let field_id = draft.add_field(request.field_type);
            FieldAdded {
                field_id,
                draft: draft.config().clone(),
            }
        })
        .await;

    match added {
        Some(added) => (StatusCode::CREATED, Json(ApiResponse::success(added))),
        None => failure(StatusCode::NOT_FOUND, "Draft not found"),
    }
}

/// Map the result of a per-field draft edit
fn field_edit_result(result: Option<Option<FormConfig>>) -> ApiResult<FormConfig> {
    match result {
        Some(Some(config)) => (StatusCode::OK, Json(ApiResponse::success(config))),
        Some(None) => failure(StatusCode::NOT_FOUND, "Field not found"),
        None => failure(StatusCode::NOT_FOUND, "Draft not found"),
    }
}

/// PATCH /api/drafts/:id/fields/:field_id
pub async fn update_draft_field(
    State(state): State<ApiState>,
    Path((id, field_id)): Path<(String, String)>,
    Json(patch): Json<FieldPatch>,
) -> impl IntoResponse {
    let result = state
        .drafts
        .with_draft(&id, |draft| {
            draft
                .update_field(&field_id, patch)
                .then(|| draft.config().clone())
        })
        .await;
    field_edit_result(result)
}

/// DELETE /api/drafts/:id/fields/:field_id
pub async fn delete_draft_field(
    State(state): State<ApiState>,
    Path((id, field_id)): Path<(String, String)>,
) -> impl IntoResponse {
    let result = state
        .drafts
        .with_draft(&id, |draft| {
            draft.remove_field(&field_id).then(|| draft.config().clone())
        })
        .await;
    field_edit_result(result)
}

/// POST /api/drafts/:id/fields/:field_id/move - Reorder a field
pub async fn move_draft_field(
    State(state): State<ApiState>,
    Path((id, field_id)): Path<(String, String)>,
    Json(request): Json<MoveFieldRequest>,
) -> impl IntoResponse {
    let result = state
        .drafts
        .with_draft(&id, |draft| {
            draft
                .move_field(&field_id, request.index)
                .then(|| draft.config().clone())
        })
        .await;
    field_edit_result(result)
}

/// POST /api/drafts/:id/save - Validate and persist a draft
pub async fn save_draft(State(state): State<ApiState>, Path(id): Path<String>) -> impl IntoResponse {
    let Some(mut draft) = state.drafts.get(&id).await else {
        return failure(StatusCode::NOT_FOUND, "Draft not found");
    };

    match save_config(&state, &mut draft).await {
        Ok(saved) => {
            // Keep editing from the saved snapshot, timestamps included
            state.drafts.open(draft).await;
            (StatusCode::OK, Json(ApiResponse::success(saved)))
        }
        Err(e) => save_failure(&e),
    }
}
