//! Timer suspension

use std::time::Duration;

/// Suspend the current task for `duration`
///
/// Uses the tokio timer inside a tokio runtime. Under any other executor
/// a helper thread sleeps and then wakes the task.
///
/// # Panics
///
/// Inside a tokio runtime built without the time driver.
#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep(duration: Duration) {
    if tokio::runtime::Handle::try_current().is_ok() {
        tokio::time::sleep(duration).await;
        return;
    }

    let (done, wait) = tokio::sync::oneshot::channel();
    std::thread::spawn(move || {
        std::thread::sleep(duration);
        let _ = done.send(());
    });
    if wait.await.is_err() {
        log::warn!("Timer thread exited early, skipping rest of delay");
    }
}

/// Suspend the current task for `duration` using `setTimeout`
#[cfg(target_arch = "wasm32")]
pub async fn sleep(duration: Duration) {
    use wasm_bindgen::JsValue;

    let ms = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let scheduled = web_sys::window().map(|window| {
            window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
        });
        if !matches!(scheduled, Some(Ok(_))) {
            // No timer available (e.g. worker without window): resolve right away
            log::warn!("setTimeout unavailable, skipping {}ms delay", ms);
            let _ = resolve.call0(&JsValue::NULL);
        }
    });
    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
}
