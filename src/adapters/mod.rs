pub mod api_handler;
pub mod draft_registry;
pub mod embed_handler;
pub mod form_store;
pub mod health_handler;
pub mod metrics_handler;
pub mod rate_limit;
pub mod webhook;
