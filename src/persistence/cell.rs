//! A value mirrored into one store slot
//!
//! The in-memory value is authoritative. The store is read exactly once,
//! when the cell is created, and written once per assignment. Store and
//! codec failures are logged and otherwise ignored.

use super::codec::{Codec, JsonCodec};
use super::store::KeyValueStore;

/// Value of type `T` persisted under `key` in store `S`
///
/// A `None` store means the execution context has no storage; the cell
/// then behaves like a plain value.
#[derive(Debug)]
pub struct PersistentCell<T, S, C = JsonCodec> {
    key: String,
    value: T,
    store: Option<S>,
    codec: C,
}

impl<T, S> PersistentCell<T, S, JsonCodec>
where
    S: KeyValueStore,
    JsonCodec: Codec<T>,
{
    /// Create a JSON-encoded cell, loading `key` or falling back
    pub fn new(store: Option<S>, key: impl Into<String>, fallback: T) -> Self {
        Self::with_codec(store, key, fallback, JsonCodec)
    }
}

impl<T, S, C> PersistentCell<T, S, C>
where
    S: KeyValueStore,
    C: Codec<T>,
{
    /// Create a cell with a custom codec, loading `key` or falling back
    pub fn with_codec(store: Option<S>, key: impl Into<String>, fallback: T, codec: C) -> Self {
        let key = key.into();
        let value = load(store.as_ref(), &key, &codec).unwrap_or(fallback);
        Self {
            key,
            value,
            store,
            codec,
        }
    }

    /// Current value; never touches the store
    #[inline]
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value, then try to persist it
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.persist();
    }

    /// Modify the value in place; persists once afterwards
    pub fn update(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.value);
        self.persist();
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether writes reach a store at all
    #[inline]
    pub fn is_backed(&self) -> bool {
        self.store.is_some()
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };

        let text = match self.codec.encode(&self.value) {
            Ok(text) => text,
            Err(err) => {
                log::warn!("Could not encode value for '{}': {}", self.key, err);
                return;
            }
        };

        if let Err(err) = store.write(&self.key, &text) {
            log::warn!("Could not save '{}': {}", self.key, err);
        }
    }
}

fn load<T, S, C>(store: Option<&S>, key: &str, codec: &C) -> Option<T>
where
    S: KeyValueStore,
    C: Codec<T>,
{
    let store = store?;

    let raw = match store.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            log::debug!("No stored value for '{}', using fallback", key);
            return None;
        }
        Err(err) => {
            log::warn!("Could not read '{}': {}, using fallback", key, err);
            return None;
        }
    };

    match codec.decode(&raw) {
        Ok(value) => {
            log::info!("Loaded '{}' from storage", key);
            Some(value)
        }
        Err(err) => {
            log::warn!("Stored value for '{}' is unreadable: {}, using fallback", key, err);
            None
        }
    }
}
