//! Values persisted to a key-value text store
//!
//! Features:
//! - Store injected per cell (LocalStorage, a directory, or memory)
//! - Pluggable text codec (JSON by default)
//! - Read once on creation, write on every change
//! - Missing, corrupt or unavailable storage falls back to a default

pub mod cell;
pub mod codec;
pub mod store;

pub use cell::PersistentCell;
pub use codec::{Codec, CodecError, FnCodec, JsonCodec};
#[cfg(target_arch = "wasm32")]
pub use store::BrowserStore;
#[cfg(not(target_arch = "wasm32"))]
pub use store::FileStore;
pub use store::{KeyValueStore, MemoryStore, StoreError};
