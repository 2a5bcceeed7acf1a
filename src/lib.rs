//! # Leadform - Embeddable Lead Capture Forms
//!
//! Leadform stores form configurations, compiles them into validation
//! schemas, and serves them as embeddable HTML pages whose submissions are
//! forwarded to a per-form webhook.
//!
//! ## Features
//!
//! - **Form Builder**: Draft editing API with validation on save
//! - **Schema Compiler**: Per-field rules derived from each configuration
//! - **Embeds**: iframe and shortcode generation, server-rendered form pages
//! - **Webhooks**: Fire-and-forget JSON delivery of accepted submissions
//! - **Metrics**: Prometheus metrics for monitoring
//! - **Health Checks**: Kubernetes-ready health endpoints
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use leadform::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new()?;
//!     let state = leadform::build_state(&settings).await?;
//!     let app = leadform::create_app(state, &settings);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Leadform follows Hexagonal Architecture:
//! - **Domain**: Form model, builder, validation, and ports
//! - **Schema**: Configuration to validation schema compiler
//! - **Application**: Renderer state machine, resolver, embed code
//! - **Adapters**: Stores, webhook client, HTTP handlers
//! - **Config**: Configuration management

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod schema;

use crate::adapters::api_handler::{self, ApiState};
use crate::adapters::draft_registry::DraftRegistry;
use crate::adapters::embed_handler::{self, EmbedPages};
use crate::adapters::form_store::build_store;
use crate::adapters::health_handler::HealthHandler;
use crate::adapters::metrics_handler::{MetricsCollector, MetricsHandler};
use crate::adapters::rate_limit::{limiter_from_settings, rate_limit_middleware};
use crate::adapters::webhook::{HttpWebhookClient, MeteredWebhook};
use crate::application::embed::DYNAMIC_FORM_PATH;
use crate::application::resolver::FormResolver;
use crate::config::Settings;
use crate::domain::WebhookPort;
use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

/// Builds the shared handler state from settings.
///
/// Opens the configured form store and, when `store.seed_default` is set,
/// writes the built-in default form if it is not stored yet.
pub async fn build_state(settings: &Settings) -> anyhow::Result<ApiState> {
    let store = build_store(&settings.store).await?;
    let metrics = Arc::new(MetricsCollector::new()?);

    let client = HttpWebhookClient::new(&settings.webhook)?;
    let webhook: Arc<dyn WebhookPort> = Arc::new(MeteredWebhook::new(Arc::new(client), metrics.clone()));

    let resolver = Arc::new(FormResolver::new(store.clone()));
    if settings.store.seed_default {
        resolver.seed_default().await?;
    }

    Ok(ApiState {
        store,
        resolver,
        webhook,
        drafts: DraftRegistry::new(),
        metrics,
        pages: Arc::new(EmbedPages::new()?),
        public_url: settings.embed.public_url.clone(),
    })
}

/// Creates the Axum application router with all endpoints configured.
///
/// # Arguments
///
/// * `state` - Shared handler state (store, resolver, webhook, drafts, metrics)
/// * `settings` - Application settings; only `rate_limit` is read here
///
/// # Returns
///
/// Configured Axum Router
pub fn create_app(state: ApiState, settings: &Settings) -> Router {
    let health_handler = Arc::new(HealthHandler::new(state.store.clone()));
    let metrics_handler = Arc::new(MetricsHandler::new(state.metrics.clone()));

    // Operational routes
    let ops_router = Router::new()
        .route("/health", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.health().await }
            }
        }))
        .route("/health/ready", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.ready().await }
            }
        }))
        .route("/health/live", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.live().await }
            }
        }))
        .route("/metrics", get({
            let handler = metrics_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.metrics().await }
            }
        }));

    // Public form routes: embeds and submissions
    let mut public_router = Router::new()
        .route(
            DYNAMIC_FORM_PATH,
            get(embed_handler::dynamic_form_page).post(embed_handler::submit_dynamic_form),
        )
        .route(
            "/embed/:preset",
            get(embed_handler::preset_page).post(embed_handler::submit_preset),
        )
        .route("/api/forms/:id/submissions", post(api_handler::submit_form))
        .with_state(state.clone());

    if let Some(limiter) = limiter_from_settings(settings.rate_limit.as_ref()) {
        public_router = public_router.layer(axum::middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        ));
    }

    // Builder API routes
    let api_router = Router::new()
        // Stored forms
        .route("/forms", post(api_handler::create_form))
        .route("/forms/:id", get(api_handler::get_form).put(api_handler::update_form))
        .route("/forms/:id/schema", get(api_handler::get_form_schema))
        .route("/forms/:id/embed", get(api_handler::get_form_embed))
        // Drafts
        .route("/drafts", post(api_handler::create_draft))
        .route(
            "/drafts/:id",
            get(api_handler::get_draft)
                .patch(api_handler::update_draft)
                .delete(api_handler::delete_draft),
        )
        .route("/drafts/:id/fields", post(api_handler::add_draft_field))
        .route(
            "/drafts/:id/fields/:field_id",
            patch(api_handler::update_draft_field).delete(api_handler::delete_draft_field),
        )
        .route("/drafts/:id/fields/:field_id/move", post(api_handler::move_draft_field))
        .route("/drafts/:id/save", post(api_handler::save_draft))
        .with_state(state);

    let router = ops_router
        .merge(public_router)
        .nest("/api", api_router);

    router.layer(
        tower_http::cors::CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
