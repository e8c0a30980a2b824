use std::{collections::BTreeSet, sync::Arc};

use parking_lot::Mutex;
use tokio::sync::broadcast;

pub const ADMIN_PRODUCTS: &str = "/admin/products";
pub const ADMIN_STATS: &str = "/admin/stats";
pub const ADMIN_USERS: &str = "/admin/users";

pub fn admin_product_page(slug: &str) -> String {
    format!("/admin/products/{}", slug)
}

pub fn product_page(slug: &str) -> String {
    format!("/products/{}", slug)
}

/// Tracks rendered pages that must be rebuilt after a mutation.
///
/// Invalidation is fire-and-forget: the mutation that triggered it has
/// already been persisted and is never rolled back.
#[derive(Clone)]
pub struct PageCache {
    stale: Arc<Mutex<BTreeSet<String>>>,
    tx: broadcast::Sender<String>,
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCache {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            stale: Arc::new(Mutex::new(BTreeSet::new())),
            tx,
        }
    }

    pub fn invalidate(&self, path: impl Into<String>) {
        let path = path.into();
        tracing::debug!("Invalidating page {}", path);
        self.stale.lock().insert(path.clone());
        // no receivers is fine
        let _ = self.tx.send(path);
    }

    pub fn invalidate_product(&self, slug: &str) {
        if slug.is_empty() {
            return;
        }
        self.invalidate(admin_product_page(slug));
        self.invalidate(product_page(slug));
    }

    pub fn invalidate_product_lists(&self) {
        self.invalidate(ADMIN_PRODUCTS);
        self.invalidate(ADMIN_STATS);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    pub fn is_stale(&self, path: &str) -> bool {
        self.stale.lock().contains(path)
    }

    /// Returns and clears the stale set, as a renderer does once it has
    /// rebuilt the pages.
    pub fn take_stale(&self) -> Vec<String> {
        std::mem::take(&mut *self.stale.lock()).into_iter().collect()
    }
}
