//! Embeddable HTML form pages
//!
//! Every request builds a fresh [`FormSession`]: GET renders it in `Editing`,
//! POST feeds the url-encoded body through it and renders the outcome.
//! Bodies arrive as ordered key/value pairs so repeated keys survive.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tera::{Context, Tera};

use crate::adapters::api_handler::ApiState;
use crate::application::embed::{self, DYNAMIC_FORM_PATH};
use crate::application::renderer::{FormSession, FormView, SubmitOutcome};
use crate::application::resolver::Resolution;
use crate::domain::form::{FieldValue, FormConfig, FormValues};
use crate::domain::presets;

const FORM_TEMPLATE: &str = "form.html";

pub struct EmbedPages {
    tera: Tera,
}

impl EmbedPages {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template(FORM_TEMPLATE, include_str!("templates/form.html"))?;
        Ok(Self { tera })
    }

    pub fn render_form(
        &self,
        view: &FormView,
        action: &str,
        retry_url: Option<&str>,
    ) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("form", view);
        context.insert("action", action);
        context.insert("retry_url", &retry_url);
        self.tera.render(FORM_TEMPLATE, &context)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EmbedQuery {
    pub id: Option<String>,
}

/// Values for every field of `config`. Repeated keys build checkbox sets;
/// scalar fields take the first occurrence.
pub fn form_values(config: &FormConfig, pairs: &[(String, String)]) -> FormValues {
    config
        .fields
        .iter()
        .map(|field| {
            let mut submitted = pairs
                .iter()
                .filter(|(key, _)| *key == field.id)
                .map(|(_, value)| value.clone());
            let value = if field.field_type.is_multi_value() {
                FieldValue::Selections(submitted.collect())
            } else {
                FieldValue::Text(submitted.next().unwrap_or_default())
            };
            (field.id.clone(), value)
        })
        .collect()
}

fn render(state: &ApiState, status: StatusCode, session: &FormSession, action: &str, retry_url: Option<&str>) -> Response {
    match state.pages.render_form(&session.view(), action, retry_url) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render form page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render form").into_response()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html("<!DOCTYPE html><p>Form not found</p>".to_string())).into_response()
}

async fn submit_page(
    state: &ApiState,
    config: FormConfig,
    pairs: &[(String, String)],
    action: &str,
    retry_url: Option<&str>,
) -> Response {
    let values = form_values(&config, pairs);
    let mut session = FormSession::new(config, state.webhook.clone());
    session.set_values(values);

    let status = match session.submit().await {
        SubmitOutcome::Submitted { .. } => {
            state.metrics.record_submission("submitted");
            StatusCode::OK
        }
        SubmitOutcome::Rejected(_) => {
            state.metrics.record_submission("rejected");
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SubmitOutcome::AlreadySubmitted => StatusCode::CONFLICT,
    };
    render(state, status, &session, action, retry_url)
}

async fn resolve(state: &ApiState, id: Option<&str>) -> (Resolution, String, Option<String>) {
    let resolution = state.resolver.resolve(id).await;
    state.metrics.record_resolution(resolution.source.as_str());

    // Retrying and submitting go back to the id that was asked for
    let action = embed::embed_url("", DYNAMIC_FORM_PATH, id);
    let retry_url = resolution.offers_retry().then(|| action.clone());
    (resolution, action, retry_url)
}

/// GET /embed/dynamic-form?id=
pub async fn dynamic_form_page(State(state): State<ApiState>, Query(query): Query<EmbedQuery>) -> Response {
    let (resolution, action, retry_url) = resolve(&state, query.id.as_deref()).await;
    let session = FormSession::new(resolution.config, state.webhook.clone());
    render(&state, StatusCode::OK, &session, &action, retry_url.as_deref())
}

/// POST /embed/dynamic-form?id=
pub async fn submit_dynamic_form(
    State(state): State<ApiState>,
    Query(query): Query<EmbedQuery>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let (resolution, action, retry_url) = resolve(&state, query.id.as_deref()).await;
    submit_page(&state, resolution.config, &pairs, &action, retry_url.as_deref()).await
}

/// A built-in preset, or the form stored under its name
async fn preset_config(state: &ApiState, name: &str) -> Option<FormConfig> {
    let builtin = presets::preset(name)?;
    match state.resolver.find(name).await {
        Ok(found) => found.map(|(config, _)| config),
        Err(e) => {
            tracing::warn!("Failed to load stored override of preset {}: {}", name, e);
            Some(builtin)
        }
    }
}

/// GET /embed/:preset
pub async fn preset_page(State(state): State<ApiState>, Path(name): Path<String>) -> Response {
    let Some(config) = preset_config(&state, &name).await else {
        return not_found();
    };
    let action = format!("/embed/{}", name);
    let session = FormSession::new(config, state.webhook.clone());
    render(&state, StatusCode::OK, &session, &action, None)
}

/// POST /embed/:preset
pub async fn submit_preset(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let Some(config) = preset_config(&state, &name).await else {
        return not_found();
    };
    let action = format!("/embed/{}", name);
    submit_page(&state, config, &pairs, &action, None).await
}
