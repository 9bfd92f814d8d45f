//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Timers (retry delays)
//! - Storage availability (LocalStorage on web, a directory natively)
//! - Logger setup

pub mod storage;
pub mod time;

/// Install the logger for the current platform.
///
/// Safe to call more than once; later calls are no-ops.
#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("Logger already initialized");
    }
}

/// Install the logger for the current platform.
///
/// Level comes from `RUST_LOG`. Safe to call more than once.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    if env_logger::try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
