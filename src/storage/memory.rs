use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use super::{ObjectStore, StorageError};

/// In-process blob store. Records every upload attempt in order and can be
/// told to fail a specific attempt (1-based).
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<BTreeMap<String, Bytes>>,
    attempts: Mutex<Vec<String>>,
    fail_on_attempt: Mutex<Option<usize>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on_attempt(&self, attempt: usize) {
        *self.fail_on_attempt.lock() = Some(attempt);
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().clone()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().contains_key(path)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        let attempt = {
            let mut attempts = self.attempts.lock();
            attempts.push(path.to_string());
            attempts.len()
        };

        if *self.fail_on_attempt.lock() == Some(attempt) {
            return Err(StorageError::Upload {
                path: path.to_string(),
                reason: "simulated failure".to_string(),
            });
        }

        self.objects.lock().insert(path.to_string(), bytes);
        Ok(format!("memory://{}", path))
    }
}
