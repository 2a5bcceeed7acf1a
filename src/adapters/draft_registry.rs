use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::builder::FormBuilder;

/// Open builder drafts keyed by form id. Drafts live only in memory; a
/// draft reaches the store through its own `save`.
#[derive(Clone, Default)]
pub struct DraftRegistry {
    drafts: Arc<RwLock<HashMap<String, FormBuilder>>>,
}

impl DraftRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a draft, replacing any open draft with the same id
    pub async fn open(&self, builder: FormBuilder) -> String {
        let id = builder.id().to_string();
        let mut drafts = self.drafts.write().await;
        drafts.insert(id.clone(), builder);
        id
    }

    pub async fn get(&self, id: &str) -> Option<FormBuilder> {
        let drafts = self.drafts.read().await;
        drafts.get(id).cloned()
    }

    /// Run `edit` against the draft under `id`. `None` if no such draft is open.
    pub async fn with_draft<R>(&self, id: &str, edit: impl FnOnce(&mut FormBuilder) -> R) -> Option<R> {
        let mut drafts = self.drafts.write().await;
        drafts.get_mut(id).map(edit)
    }

    pub async fn discard(&self, id: &str) -> bool {
        let mut drafts = self.drafts.write().await;
        drafts.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.drafts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.drafts.read().await.is_empty()
    }
}
