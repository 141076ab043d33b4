use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tokio::signal;
use tracing::{error, info, warn};

/// Raises `stop` on the first Ctrl+C; a second Ctrl+C exits at once.
///
/// The signal is awaited on a helper thread running a current-thread tokio
/// runtime, so the monitor loop itself stays synchronous.
pub fn install_interrupt_handler(stop: Arc<AtomicBool>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build signal runtime")?;

    thread::Builder::new()
        .name("interrupt".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                if let Err(e) = signal::ctrl_c().await {
                    error!("Failed to listen for Ctrl+C: {}", e);
                    return;
                }
                info!("Stopping monitor after the current cycle (Ctrl+C again to quit now)");
                stop.store(true, Ordering::SeqCst);

                if signal::ctrl_c().await.is_ok() {
                    warn!("Second interrupt received, exiting immediately");
                    std::process::exit(0);
                }
            });
        })
        .context("Failed to spawn interrupt thread")?;

    Ok(())
}
