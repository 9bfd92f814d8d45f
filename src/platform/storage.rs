//! Store availability detection
//!
//! Returns `None` when the execution context has no usable store; cells
//! created with `None` keep their value in memory only.

/// The store backing persistent cells on this platform
#[cfg(target_arch = "wasm32")]
pub type PlatformStore = crate::persistence::BrowserStore;

/// The store backing persistent cells on this platform
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStore = crate::persistence::FileStore;

/// LocalStorage of the current window, if there is one
#[cfg(target_arch = "wasm32")]
pub fn platform_store() -> Option<PlatformStore> {
    let storage = web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten();

    if storage.is_none() {
        log::info!("LocalStorage unavailable, values stay in memory");
    }
    storage.map(crate::persistence::BrowserStore::new)
}

/// Directory store named by `KEEPSAKE_STORE_DIR`, if set and usable
#[cfg(not(target_arch = "wasm32"))]
pub fn platform_store() -> Option<PlatformStore> {
    use crate::consts::STORE_DIR_ENV;

    let Some(dir) = std::env::var_os(STORE_DIR_ENV) else {
        log::info!("{} not set, values stay in memory", STORE_DIR_ENV);
        return None;
    };

    match crate::persistence::FileStore::open(&dir) {
        Ok(store) => Some(store),
        Err(err) => {
            log::warn!("Store directory {:?} unusable: {}", dir, err);
            None
        }
    }
}
