//! Shopping cart persisted through a key/value storage.
//!
//! The cart reads its storage once when constructed and writes the whole
//! item list back after every mutation. Two carts over the same storage do
//! not see each other's changes.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CART_KEY: &str = "cartItems";

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("cart storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("cart contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait CartStorage {
    fn load(&self, key: &str) -> Result<Option<Value>, CartError>;
    fn save(&self, key: &str, value: &Value) -> Result<(), CartError>;
}

/// Keeps each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl CartStorage for JsonFileStorage {
    fn load(&self, key: &str) -> Result<Option<Value>, CartError> {
        match fs::read_to_string(self.path(key)) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), CartError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), serde_json::to_string(value)?)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub image: String,
}

pub struct Cart<S: CartStorage> {
    storage: S,
    items: Vec<CartItem>,
}

impl<S: CartStorage> Cart<S> {
    /// Unreadable or malformed saved contents start an empty cart.
    pub fn load(storage: S) -> Self {
        let items = match storage.load(CART_KEY) {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::warn!("Discarding unreadable cart: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to load cart: {}", e);
                Vec::new()
            }
        };
        Self { storage, items }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adding an item already in the cart increases its quantity.
    pub fn add_item(&mut self, item: CartItem) -> Result<(), CartError> {
        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
            None => self.items.push(item),
        }
        self.persist()
    }

    /// Changes a quantity by `delta`; reaching zero removes the item.
    /// Returns the removed item in that case.
    pub fn update_quantity(&mut self, id: &str, delta: i64) -> Result<Option<CartItem>, CartError> {
        let Some(pos) = self.items.iter().position(|i| i.id == id) else {
            return Ok(None);
        };

        let quantity = (i64::from(self.items[pos].quantity) + delta).clamp(0, i64::from(u32::MAX));
        let removed = if quantity == 0 {
            Some(self.items.remove(pos))
        } else {
            self.items[pos].quantity = quantity as u32;
            None
        };

        self.persist()?;
        Ok(removed)
    }

    pub fn remove_item(&mut self, id: &str) -> Result<Option<CartItem>, CartError> {
        let removed = self
            .items
            .iter()
            .position(|i| i.id == id)
            .map(|pos| self.items.remove(pos));
        self.persist()?;
        Ok(removed)
    }

    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(|i| i.price * Decimal::from(i.quantity))
            .sum()
    }

    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Empties the cart and hands back what was in it.
    pub fn checkout(&mut self) -> Result<Vec<CartItem>, CartError> {
        let items = std::mem::take(&mut self.items);
        self.persist()?;
        Ok(items)
    }

    fn persist(&self) -> Result<(), CartError> {
        self.storage
            .save(CART_KEY, &serde_json::to_value(&self.items)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn item(id: &str, price: &str, quantity: u32) -> CartItem {
        CartItem {
            id: id.to_string(),
            name: format!("Item {}", id),
            price: Decimal::from_str(price).unwrap(),
            quantity,
            image: String::new(),
        }
    }

    #[test]
    fn totals_and_merging() {
        let dir = tempfile::tempdir().unwrap();
        let mut cart = Cart::load(JsonFileStorage::new(dir.path()));
        cart.add_item(item("a", "10.50", 1)).unwrap();
        cart.add_item(item("b", "3", 2)).unwrap();
        cart.add_item(item("a", "10.50", 2)).unwrap();

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.total(), Decimal::from_str("37.50").unwrap());
    }

    #[test]
    fn quantity_reaching_zero_removes_item() {
        let dir = tempfile::tempdir().unwrap();
        let mut cart = Cart::load(JsonFileStorage::new(dir.path()));
        cart.add_item(item("a", "1", 2)).unwrap();

        assert!(cart.update_quantity("a", -1).unwrap().is_none());
        assert_eq!(cart.items()[0].quantity, 1);
        let removed = cart.update_quantity("a", -5).unwrap();
        assert_eq!(removed.map(|i| i.id), Some("a".to_string()));
        assert!(cart.is_empty());
    }

    #[test]
    fn contents_survive_reload_until_checkout() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut cart = Cart::load(JsonFileStorage::new(dir.path()));
            cart.add_item(item("a", "2", 3)).unwrap();
        }

        let mut cart = Cart::load(JsonFileStorage::new(dir.path()));
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.checkout().unwrap().len(), 1);

        let cart = Cart::load(JsonFileStorage::new(dir.path()));
        assert!(cart.is_empty());
    }

    #[test]
    fn corrupt_contents_start_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cartItems.json"), "{not json").unwrap();
        let cart = Cart::load(JsonFileStorage::new(dir.path()));
        assert!(cart.is_empty());
    }
}
