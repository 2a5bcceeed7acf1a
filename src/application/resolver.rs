//! Embed-time configuration resolution
//!
//! `resolve` is total: whatever the store says, the caller gets a form to
//! render. The [`ResolutionSource`] tells it whether that form is the one
//! requested or the built-in fallback.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::error::StoreError;
use crate::domain::form::FormConfig;
use crate::domain::presets;
use crate::domain::FormStorePort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// The requested configuration was loaded
    Stored,
    /// Nothing (matching) is stored under the id, or no id was given
    NotFound,
    /// A value is stored but could not be read
    Malformed,
    /// The store itself failed
    Unavailable,
}

impl ResolutionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::NotFound => "not_found",
            Self::Malformed => "malformed",
            Self::Unavailable => "unavailable",
        }
    }
}

/// Where a form looked up by name comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOrigin {
    Stored,
    Preset,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub config: FormConfig,
    pub source: ResolutionSource,
}

impl Resolution {
    pub fn is_fallback(&self) -> bool {
        self.source != ResolutionSource::Stored
    }

    /// Whether the page should offer a retry. Not-found is silent.
    pub fn offers_retry(&self) -> bool {
        matches!(self.source, ResolutionSource::Malformed | ResolutionSource::Unavailable)
    }
}

pub struct FormResolver {
    store: Arc<dyn FormStorePort>,
    fallback: FormConfig,
}

impl FormResolver {
    pub fn new(store: Arc<dyn FormStorePort>) -> Self {
        Self::with_fallback(store, presets::default_form())
    }

    pub fn with_fallback(store: Arc<dyn FormStorePort>, fallback: FormConfig) -> Self {
        Self { store, fallback }
    }

    pub fn fallback(&self) -> &FormConfig {
        &self.fallback
    }

    pub async fn resolve(&self, id: Option<&str>) -> Resolution {
        let Some(id) = id.map(str::trim).filter(|id| !id.is_empty()) else {
            tracing::debug!("No form id requested, using default configuration");
            return self.fall_back(ResolutionSource::NotFound);
        };

        match self.store.load(id).await {
            Ok(Some(config)) if config.id == id => Resolution {
                config,
                source: ResolutionSource::Stored,
            },
            Ok(Some(config)) => {
                tracing::warn!("Stored form under {} carries id {}, using default", id, config.id);
                self.fall_back(ResolutionSource::NotFound)
            }
            Ok(None) => {
                tracing::warn!("Form {} not found, using default configuration", id);
                self.fall_back(ResolutionSource::NotFound)
            }
            Err(StoreError::Malformed { reason, .. }) => {
                tracing::warn!("Form {} is malformed ({}), using default configuration", id, reason);
                self.fall_back(ResolutionSource::Malformed)
            }
            Err(StoreError::InvalidId(_)) => self.fall_back(ResolutionSource::NotFound),
            Err(e) => {
                tracing::error!("Failed to load form {}: {}", id, e);
                self.fall_back(ResolutionSource::Unavailable)
            }
        }
    }

    /// Exact lookup: the stored configuration first, then a built-in preset
    /// of that name. Unlike [`resolve`](Self::resolve) this never substitutes
    /// the default form.
    pub async fn find(&self, id: &str) -> Result<Option<(FormConfig, FormOrigin)>, StoreError> {
        match self.store.load(id).await? {
            Some(config) => Ok(Some((config, FormOrigin::Stored))),
            None => Ok(presets::preset(id).map(|config| (config, FormOrigin::Preset))),
        }
    }

    /// Make the fallback configuration loadable by id. Run once at startup;
    /// returns `true` if it had to be written.
    pub async fn seed_default(&self) -> Result<bool, StoreError> {
        match self.store.load(&self.fallback.id).await {
            Ok(Some(_)) => Ok(false),
            Ok(None) | Err(StoreError::Malformed { .. }) => {
                self.store.save(&self.fallback).await?;
                tracing::info!("Seeded default form configuration {}", self.fallback.id);
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }

    fn fall_back(&self, source: ResolutionSource) -> Resolution {
        Resolution {
            config: self.fallback.clone(),
            source,
        }
    }
}
