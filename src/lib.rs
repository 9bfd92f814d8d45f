//! Keepsake - resilient state helpers for UI call sites
//!
//! Core modules:
//! - `retry`: Bounded retry of fallible async operations with a fixed delay
//! - `persistence`: Values backed by a key-value text store (LocalStorage on web)
//! - `fetch`: Loading/data/error tracking for a single async load
//! - `platform`: Browser/native differences (timers, storage, logging)

pub mod fetch;
pub mod persistence;
pub mod platform;
pub mod retry;

pub use fetch::{FetchState, FetchTicket};
pub use persistence::{
    Codec, CodecError, FnCodec, JsonCodec, KeyValueStore, MemoryStore, PersistentCell, StoreError,
};
pub use retry::{PolicyError, RetryConfig, RetryPolicy, retry};

/// Library defaults
pub mod consts {
    /// Total attempts a default retry policy makes
    pub const DEFAULT_ATTEMPTS: u32 = 3;
    /// Pause between failed attempts of a default retry policy (ms)
    pub const DEFAULT_DELAY_MS: u64 = 0;

    /// Environment variable naming the native store directory
    pub const STORE_DIR_ENV: &str = "KEEPSAKE_STORE_DIR";
}
