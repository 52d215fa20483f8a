//! CLI command implementations

pub mod cache;
pub mod config;
pub mod deploy;
pub mod invalidate;

pub use cache::execute as cache;
pub use config::execute as config;
pub use deploy::execute as deploy;
pub use invalidate::execute as invalidate;

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Token cancelled on Ctrl-C or when the configured deadline passes
pub(crate) fn cancellation(timeout_secs: u64) -> CancellationToken {
    let token = CancellationToken::new();

    let on_signal = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = on_signal.cancelled() => {}
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                    return;
                }
                warn!("Interrupted, stopping");
                on_signal.cancel();
            }
        }
    });

    if timeout_secs > 0 {
        let on_deadline = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = on_deadline.cancelled() => {}
                _ = tokio::time::sleep(Duration::from_secs(timeout_secs)) => {
                    warn!("Exceeded {}s deadline, stopping", timeout_secs);
                    on_deadline.cancel();
                }
            }
        });
    }

    token
}
