use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::{
    error::Result,
    models::DeleteTarget,
    queries::{product_queries, user_queries},
    services::page_cache::PageCache,
    store::DocumentStore,
};

#[async_trait]
pub trait DeleteAction: Send + Sync {
    async fn delete(&self, target: &DeleteTarget) -> Result<()>;
}

pub struct ProductDeletion<'a> {
    pub store: &'a dyn DocumentStore,
    pub pages: &'a PageCache,
}

#[async_trait]
impl DeleteAction for ProductDeletion<'_> {
    async fn delete(&self, target: &DeleteTarget) -> Result<()> {
        product_queries::delete_product(self.store, self.pages, target).await
    }
}

/// Removes the profile record only, see `user_queries::delete_user`.
pub struct AdminUserDeletion<'a> {
    pub store: &'a dyn DocumentStore,
    pub pages: &'a PageCache,
}

#[async_trait]
impl DeleteAction for AdminUserDeletion<'_> {
    async fn delete(&self, target: &DeleteTarget) -> Result<()> {
        user_queries::delete_user(self.store, self.pages, target)
            .await
            .map(|_| ())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    fn success(message: &str) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.to_string(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// Confirmation gate in front of a destructive action. Nothing is deleted
/// until `confirm` is called on an open dialog; there is no undo.
#[derive(Debug, Clone)]
pub struct DeleteDialog {
    pub title: String,
    pub description: String,
    pub id: String,
    open: bool,
}

impl DeleteDialog {
    pub fn new(title: impl Into<String>, description: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            id: id.into(),
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn cancel(&mut self) {
        self.open = false;
    }

    /// Runs `action` against the dialog's id, or against `form` when the
    /// action expects a submitted payload. The dialog closes on success and
    /// stays open on failure.
    pub async fn confirm(
        &mut self,
        action: &dyn DeleteAction,
        form: Option<HashMap<String, String>>,
    ) -> Notification {
        if !self.open {
            return Notification::error("Failed to delete item");
        }

        let target = match form {
            Some(fields) => DeleteTarget::Form(fields),
            None => DeleteTarget::Id(self.id.clone()),
        };

        match action.delete(&target).await {
            Ok(()) => {
                self.open = false;
                Notification::success("Item deleted successfully")
            }
            Err(e) => {
                let message = e.user_message();
                if message.is_empty() {
                    Notification::error("Failed to delete item")
                } else {
                    Notification::error(message)
                }
            }
        }
    }
}
