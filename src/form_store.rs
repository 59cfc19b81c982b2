//! Storage for forms created from successful imports.
//!
//! [`FormRepository`] is the seam the host application persists through;
//! [`InMemoryFormStore`] backs it with a map for the server and tests.

use crate::form_schema::FormSchema;
use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A persisted form record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredForm {
    pub id: String,
    pub title: String,
    pub owner: String,
    pub schema: FormSchema,
    pub created_at: DateTime<Utc>,
}

/// Durable form storage.
#[async_trait]
pub trait FormRepository: Send + Sync {
    async fn create_form(&self, title: &str, owner: &str, schema: FormSchema) -> Result<StoredForm>;
    async fn get_form(&self, id: &str) -> Option<StoredForm>;
    async fn list_forms(&self) -> Vec<StoredForm>;
}

/// In-memory form store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFormStore {
    inner: Arc<RwLock<HashMap<String, StoredForm>>>,
}

impl InMemoryFormStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FormRepository for InMemoryFormStore {
    async fn create_form(&self, title: &str, owner: &str, schema: FormSchema) -> Result<StoredForm> {
        if title.trim().is_empty() {
            bail!("Form title must not be empty");
        }

        let form = StoredForm {
            id: format!("form_{}", Uuid::new_v4().simple()),
            title: title.to_string(),
            owner: owner.to_string(),
            schema,
            created_at: Utc::now(),
        };

        self.inner.write().await.insert(form.id.clone(), form.clone());
        tracing::debug!("FormStore: stored '{}' for owner '{}'", form.id, owner);
        Ok(form)
    }

    async fn get_form(&self, id: &str) -> Option<StoredForm> {
        self.inner.read().await.get(id).cloned()
    }

    /// Newest first.
    async fn list_forms(&self) -> Vec<StoredForm> {
        let mut forms: Vec<StoredForm> = self.inner.read().await.values().cloned().collect();
        forms.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        forms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form_schema::create_default_schema;

    #[tokio::test]
    async fn test_create_and_get() {
        let store = InMemoryFormStore::new();
        let schema = create_default_schema("Survey", "");

        let form = store.create_form("Survey", "alice", schema.clone()).await.unwrap();
        assert!(form.id.starts_with("form_"));
        assert_eq!(form.owner, "alice");

        let loaded = store.get_form(&form.id).await.unwrap();
        assert_eq!(loaded.schema, schema);
        assert!(store.get_form("form_missing").await.is_none());
    }

    #[tokio::test]
    async fn test_list_forms() {
        let store = InMemoryFormStore::new();
        store.create_form("One", "a", create_default_schema("One", "")).await.unwrap();
        store.create_form("Two", "a", create_default_schema("Two", "")).await.unwrap();

        assert_eq!(store.list_forms().await.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_title_rejected() {
        let store = InMemoryFormStore::new();
        let result = store.create_form("  ", "a", create_default_schema("", "")).await;
        assert!(result.is_err());
        assert!(store.list_forms().await.is_empty());
    }
}
