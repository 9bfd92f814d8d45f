//! Key-value text stores
//!
//! Every store is last-writer-wins per key: a write replaces the whole slot
//! and nothing coordinates writers sharing a key.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

/// Failure reported by a store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage backend rejected the request: {0}")]
    Backend(String),
}

/// A string-keyed text slot store
pub trait KeyValueStore {
    /// Raw text at `key`, or `None` if the key was never written
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the text at `key`
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }
}

/// In-process store, mainly for tests and native call sites without a disk
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys written so far
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key under a directory (native only)
///
/// Each write goes to its own temporary file which is then renamed over
/// `<name>.val`, so readers see either the old or the new text, never a
/// partial one, even with several writers on one key.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    /// Use `dir` as the store root, creating it if needed
    pub fn open(dir: impl AsRef<std::path::Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> std::path::PathBuf {
        self.dir.join(format!("{}.val", escape_key(key)))
    }
}

/// Map a key onto a file stem.
///
/// Lowercase ASCII letters, digits, `-` and `_` pass through; every other
/// byte (uppercase included) becomes `%XX`, so keys differing only in case
/// stay distinct on case-insensitive filesystems. The `kv_` prefix keeps
/// stems clear of reserved device names such as `con` or `nul`.
#[cfg(not(target_arch = "wasm32"))]
fn escape_key(key: &str) -> String {
    use std::fmt::Write;

    let mut stem = String::with_capacity(key.len() + 3);
    stem.push_str("kv_");
    for byte in key.bytes() {
        if byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-' || byte == b'_' {
            stem.push(byte as char);
        } else {
            let _ = write!(stem, "%{:02X}", byte);
        }
    }
    stem
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.slot_path(key)) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        use std::io::Write;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.persist(self.slot_path(key)).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Browser LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct BrowserStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl BrowserStore {
    pub fn new(storage: web_sys::Storage) -> Self {
        Self { storage }
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for BrowserStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage
            .get_item(key)
            .map_err(|e| StoreError::Backend(format!("{:?}", e)))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        // Throws on quota exhaustion or in private browsing modes
        self.storage
            .set_item(key, value)
            .map_err(|e| StoreError::Backend(format!("{:?}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_last_write_wins() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.read("k").unwrap(), None);

        store.write("k", "1").unwrap();
        store.write("k", "2").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some("2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_shared_handles_see_same_slots() {
        let store = Rc::new(MemoryStore::new());
        let other = Rc::clone(&store);
        other.write("shared", "x").unwrap();
        assert_eq!(store.read("shared").unwrap().as_deref(), Some("x"));

        let by_ref = &*store;
        assert_eq!(by_ref.read("shared").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_escape_key() {
        assert_eq!(escape_key("theme_v2-dark"), "kv_theme_v2-dark");
        assert_eq!(escape_key("../etc/passwd"), "kv_%2E%2E%2Fetc%2Fpasswd");
        assert_eq!(escape_key("a b"), "kv_a%20b");
        assert_eq!(escape_key(""), "kv_");
        assert_eq!(escape_key("con"), "kv_con");
    }

    #[test]
    fn test_escape_key_case_distinct() {
        let upper = escape_key("Theme");
        let lower = escape_key("theme");
        assert_eq!(upper, "kv_%54heme");
        assert_ne!(upper.to_lowercase(), lower.to_lowercase());
    }

    #[test]
    fn test_file_store_keys_differing_in_case() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.write("Theme", "dark").unwrap();
        store.write("theme", "light").unwrap();
        assert_eq!(store.read("Theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(store.read("theme").unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_file_store_concurrent_writers_never_tear() {
        const LEN: usize = 64 * 1024;

        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.write("shared", &"a".repeat(LEN)).unwrap();

        std::thread::scope(|scope| {
            for fill in ['b', 'c', 'd', 'e'] {
                let writer = store.clone();
                scope.spawn(move || {
                    let text = fill.to_string().repeat(LEN);
                    for _ in 0..25 {
                        writer.write("shared", &text).unwrap();
                    }
                });
            }

            let reader = store.clone();
            scope.spawn(move || {
                for _ in 0..200 {
                    let text = reader.read("shared").unwrap().unwrap();
                    assert_eq!(text.len(), LEN);
                    let first = text.as_bytes()[0];
                    assert!(text.bytes().all(|b| b == first));
                }
            });
        });

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["kv_shared.val".to_string()]);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested")).unwrap();

        assert_eq!(store.read("user/settings").unwrap(), None);
        store.write("user/settings", r#"{"volume":0.5}"#).unwrap();
        assert_eq!(
            store.read("user/settings").unwrap().as_deref(),
            Some(r#"{"volume":0.5}"#)
        );

        // Reopening sees earlier writes
        let reopened = FileStore::open(store.dir()).unwrap();
        assert_eq!(
            reopened.read("user/settings").unwrap().as_deref(),
            Some(r#"{"volume":0.5}"#)
        );
    }

    #[test]
    fn test_file_store_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.write("a", "1").unwrap();
        store.write("a", "2").unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["kv_a.val".to_string()]);
    }

    #[test]
    fn test_file_store_write_fails_when_dir_removed() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("gone");
        let store = FileStore::open(&root).unwrap();
        std::fs::remove_dir_all(&root).unwrap();

        assert!(matches!(store.write("k", "v"), Err(StoreError::Io(_))));
        assert_eq!(store.read("k").unwrap(), None);
    }
}
