//! Barrier controller binary.
//!
//! Usage: `barrier-controller [config.toml]`

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use barrier_actuator::{BarrierActuator, SharedReadingSensor, TracingLamp};
use barrier_controller::{
    build_link, router, ControllerConfig, HttpAuthorityClient, HttpEventSink, RadioSignalGateway,
};
use shared_types::{BarrierEvent, BarrierId, EventSink, EventType, TriggerMethod};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = ControllerConfig::load(config_path.as_deref()).context("loading configuration")?;
    let barrier_id = BarrierId::new(&config.barrier_id);
    info!(barrier = %barrier_id, listen = %config.listen, "barrier controller starting");

    // Event reporting to the authority (disabled loudly when unconfigured).
    let events: Arc<dyn EventSink> = Arc::new(
        HttpEventSink::new(
            config.authority.event_url.clone(),
            config.authority.request_timeout,
        )
        .context("building event sink")?,
    );

    // Hardware capabilities. The ranging driver publishes through the
    // sensor handle; until it does, the actuator runs in degraded
    // no-obstacle mode and says so.
    let sensor = Arc::new(SharedReadingSensor::new());
    let _sensor_publisher = sensor.publisher();
    let lamp = Arc::new(TracingLamp);

    let actuator = match BarrierActuator::new(
        barrier_id.clone(),
        config.actuator.clone(),
        sensor,
        lamp,
        Arc::clone(&events),
    ) {
        Ok(actuator) => Arc::new(actuator),
        Err(e) => {
            // Fatal: a controller with a broken actuator must not pretend
            // to be operational.
            events
                .record(
                    BarrierEvent::failure(
                        barrier_id.clone(),
                        EventType::SystemFailure,
                        TriggerMethod::Startup,
                        None,
                        None,
                    )
                    .with_details(format!("actuator init failed: {e}")),
                )
                .await;
            return Err(anyhow::anyhow!(e).context("initializing actuator"));
        }
    };

    // Radio gateway. The transceiver driver is wired in by pushing frames
    // into `radio_tx`; the gateway owns the receive side.
    let (radio_tx, radio_rx) = mpsc::channel(16);
    let link = build_link(&config.radio, radio_rx);
    let authority = Arc::new(
        HttpAuthorityClient::new(
            config.authority.verify_url.clone(),
            config.authority.request_timeout,
        )
        .context("building authority client")?,
    );
    let gateway = RadioSignalGateway::new(
        barrier_id.clone(),
        Arc::clone(&actuator),
        authority,
        link,
    );
    tokio::spawn(gateway.run());
    let _radio_driver_handle = radio_tx;

    events
        .record(BarrierEvent::success(
            barrier_id.clone(),
            EventType::SystemStartup,
            TriggerMethod::Startup,
            None,
        ))
        .await;

    let app = router(Arc::clone(&actuator));
    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("binding {}", config.listen))?;
    info!(barrier = %barrier_id, listen = %config.listen, "barrier controller ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    // Shutdown: abort an in-progress close and report going down.
    warn!(barrier = %barrier_id, "shutting down");
    actuator.stop();
    events
        .record(BarrierEvent::success(
            barrier_id,
            EventType::SystemShutdown,
            TriggerMethod::Shutdown,
            None,
        ))
        .await;
    // Give the fire-and-forget event delivery a moment before exit.
    tokio::time::sleep(Duration::from_millis(200)).await;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(terminate) => terminate,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
