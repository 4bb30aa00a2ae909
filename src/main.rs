use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use telemetry_dashboard::clock::Clock;
use telemetry_dashboard::config::Config;
use telemetry_dashboard::console::{self, ConsoleView};
use telemetry_dashboard::dashboard::Dashboard;
use telemetry_dashboard::poll::PollLoop;
use telemetry_dashboard::runtime;
use telemetry_dashboard::source::HttpMetricsSource;
use telemetry_dashboard::static_refresh::StaticRefresh;
use telemetry_dashboard::web::{router, AppState};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    runtime::init_tracing();
    let cfg = Config::parse();
    if let Err(e) = cfg.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(2);
    }
    info!(
        "Starting dashboard: endpoint={}, refresh={}ms, capacity={}, warn={}, crit={}, mode={:?}",
        cfg.endpoint, cfg.refresh_ms, cfg.spark_capacity, cfg.warn, cfg.crit, cfg.mode
    );

    let source = match HttpMetricsSource::new(&cfg.endpoint, cfg.request_timeout()) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };
    let dashboard = match Dashboard::with_recording(&cfg.dashboard_settings()) {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to set up widgets: {}", e);
            std::process::exit(1);
        }
    };

    let cancel = CancellationToken::new();
    let clock = Clock::start();
    let refresh = Arc::new(StaticRefresh::new());

    // Host facts are loaded once at startup; later refreshes are user-triggered.
    let startup_refresh = refresh.clone();
    let startup_source = source.clone();
    tokio::spawn(async move {
        startup_refresh.trigger(startup_source.as_ref()).await;
    });

    let (poll, handle) = PollLoop::new(source.clone(), dashboard, cfg.interval());
    let poll_cancel = cancel.clone();
    let poll_handle = tokio::spawn(async move { poll.run(poll_cancel).await });

    let console_handle = if cfg.console_enabled() {
        let view = ConsoleView {
            frames: handle.frames.clone(),
            // The browser sizes the sparkline surfaces when the web view is up.
            viewport: (!cfg.web_enabled()).then(|| handle.viewport.clone()),
            refresh: refresh.clone(),
            clock,
        };
        let console_cancel = cancel.clone();
        Some(tokio::spawn(async move {
            console::run_console(view, Duration::from_secs(1), console_cancel).await;
        }))
    } else {
        None
    };

    let web_handle = if cfg.web_enabled() {
        let state = AppState {
            frames: handle.frames.clone(),
            viewport: handle.viewport.clone(),
            refresh: refresh.clone(),
            source: source.clone(),
            clock,
            shutdown: cancel.clone(),
        };
        let app = router(state);
        let addr = cfg.web_addr();
        let listener = match tokio::net::TcpListener::bind(addr).await {
            Ok(l) => l,
            Err(e) => {
                error!("Failed to bind {}: {}", addr, e);
                cancel.cancel();
                let _ = poll_handle.await;
                return;
            }
        };
        info!(
            "HTTP server listening on http://{}",
            listener.local_addr().unwrap_or(addr)
        );
        let shutdown = cancel.clone();
        Some(tokio::spawn(async move {
            let res = axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await;
            if let Err(e) = res {
                error!("Server error: {}", e);
            }
        }))
    } else {
        None
    };

    runtime::shutdown_signal().await;
    cancel.cancel();

    if let Some(h) = web_handle {
        let _ = h.await;
    }
    if let Some(h) = console_handle {
        let _ = h.await;
    }
    let _ = poll_handle.await;
}
