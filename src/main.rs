//! Watches one audio endpoint and logs its state as it changes.
//!
//! Usage: `audio-endpoint-rs [DEVICE_ID] [--duration-secs N]`
//!
//! Without a device id the default render endpoint is used.

use anyhow::{bail, Context, Result};
use audio_endpoint_rs::logging;
use std::time::Duration;

const DEFAULT_DURATION_SECS: u64 = 10;

#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
struct Args {
    device_id: Option<String>,
    duration: Duration,
}

fn parse_args() -> Result<Args> {
    let mut device_id = None;
    let mut duration = Duration::from_secs(DEFAULT_DURATION_SECS);

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--duration-secs" => {
                let value = args.next().context("--duration-secs needs a value")?;
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("invalid duration: {value}"))?;
                duration = Duration::from_secs(secs);
            }
            flag if flag.starts_with("--") => bail!("unknown option: {flag}"),
            id => device_id = Some(id.to_string()),
        }
    }

    Ok(Args {
        device_id,
        duration,
    })
}

fn main() -> Result<()> {
    logging::init("info");
    let args = parse_args()?;
    run(args)
}

#[cfg(target_os = "windows")]
fn run(args: Args) -> Result<()> {
    use audio_endpoint_rs::platform::wasapi::{ComGuard, DataFlow, DeviceEnumerator};
    use audio_endpoint_rs::{dispatcher, AudioDeviceEndpoint, DeviceManager, SessionRef};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Instant;
    use tracing::info;

    struct LoggingManager;

    impl DeviceManager for LoggingManager {
        fn on_session_created(&self, session: SessionRef) {
            info!(
                session_id = session.id(),
                name = %session.display_name(),
                pid = session.process_id(),
                "Session created"
            );
        }
    }

    let _com = ComGuard::new()?;
    let enumerator = DeviceEnumerator::new()?;
    let device = match &args.device_id {
        Some(id) => enumerator.device(id)?,
        None => enumerator.default_device(DataFlow::Render)?,
    };

    let manager: Arc<dyn DeviceManager> = Arc::new(LoggingManager);
    let (dispatcher, queue) = dispatcher::channel();
    let endpoint = AudioDeviceEndpoint::new(Arc::new(device), &manager, Arc::new(dispatcher))?;

    let dirty = Arc::new(AtomicBool::new(true));
    let _subscription = endpoint.subscribe_property_changed({
        let dirty = Arc::clone(&dirty);
        move |name| {
            info!(property = %name, "Property changed");
            dirty.store(true, Ordering::Relaxed);
        }
    });

    let deadline = Instant::now() + args.duration;
    while Instant::now() < deadline {
        queue.run_for(Duration::from_millis(250));

        if dirty.swap(false, Ordering::Relaxed) {
            let snapshot = endpoint.snapshot();
            info!(
                name = %snapshot.display_name,
                volume = snapshot.volume_percent(),
                muted = snapshot.is_muted,
                "Endpoint state"
            );
        }
        if let Ok(peak) = endpoint.peak_dbfs() {
            tracing::debug!(peak_dbfs = peak, "Peak");
        }
    }

    endpoint.teardown();
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn run(_args: Args) -> Result<()> {
    bail!("the Core Audio backend is only available on Windows")
}
