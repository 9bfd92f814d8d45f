//! Keepsake demo entry point
//!
//! Bumps a persisted launch counter and runs a flaky operation through a
//! retry policy. Set `KEEPSAKE_STORE_DIR` to keep the counter across runs.

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main(flavor = "current_thread")]
async fn main() {
    use std::cell::Cell;
    use std::time::Duration;

    use keepsake::platform::{self, storage::platform_store};
    use keepsake::{PersistentCell, RetryPolicy};

    platform::init_logging();
    log::info!("Keepsake (native) starting...");

    let mut launches = PersistentCell::new(platform_store(), "keepsake_launches", 0u64);
    launches.update(|n| *n += 1);
    println!(
        "Launch #{} ({})",
        launches.get(),
        if launches.is_backed() {
            "persisted"
        } else {
            "in memory only"
        }
    );

    let policy = RetryPolicy::default().with_delay(Duration::from_millis(100));
    let succeeds_on = policy.attempts();
    let calls = Cell::new(0u32);
    let outcome: Result<&str, String> = policy
        .run(|| {
            let n = calls.get() + 1;
            calls.set(n);
            async move {
                if n < succeeds_on {
                    Err(format!("attempt {} timed out", n))
                } else {
                    Ok("connected")
                }
            }
        })
        .await;

    match outcome {
        Ok(status) => println!("Flaky operation: {} after {} attempts", status, calls.get()),
        Err(err) => println!("Flaky operation failed: {}", err),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM call sites use the library directly; this is just to satisfy the compiler
}
