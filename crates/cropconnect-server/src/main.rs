// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use cropconnect_core::{ClockPort, ErrorContext, ResultExt, SystemClock};
use cropconnect_lifecycle::ContractLifecycleManager;
use cropconnect_server::{build_router, AppState, ServerConfig, SessionSigner};
use cropconnect_store::SqliteStore;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                warn!("unix signal handlers unavailable, falling back to ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn bind_listener(addr: SocketAddr) -> Result<TcpListener, ErrorContext<std::io::Error>> {
    let socket = if addr.is_ipv4() {
        tokio::net::TcpSocket::new_v4().with_context("create ipv4 socket")?
    } else {
        tokio::net::TcpSocket::new_v6().with_context("create ipv6 socket")?
    };
    socket.set_reuseaddr(true).with_context("set SO_REUSEADDR")?;
    socket.bind(addr).with_context("bind")?;
    socket.listen(1024).with_context("listen")
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let config = ServerConfig::from_env();
    init_tracing(config.log_json);
    if config.session_secret_generated {
        warn!(
            "CROPCONNECT_SESSION_SECRET is not set; sessions use an ephemeral secret and end on restart"
        );
    }

    let store = SqliteStore::open(&config.db_path)
        .map_err(|e| format!("open store {}: {e}", config.db_path.display()))?;
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);
    let manager =
        ContractLifecycleManager::new(Arc::new(store), Arc::clone(&clock), config.policy);
    let sessions = SessionSigner::new(config.session_secret.as_bytes(), config.session_ttl);
    let state = AppState::new(manager, sessions, clock, config.api.clone());
    let app = build_router(state.clone());

    let addr: SocketAddr = config
        .bind
        .parse()
        .map_err(|e| format!("invalid bind addr {}: {e}", config.bind))?;
    let listener = bind_listener(addr).map_err(|e| e.to_string())?;
    state.ready.store(true, Ordering::Relaxed);
    info!(
        bind = %config.bind,
        db_path = %config.db_path.display(),
        "cropconnect-server listening"
    );

    let ready = Arc::clone(&state.ready);
    let drain = config.shutdown_drain;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            ready.store(false, Ordering::Relaxed);
            info!(
                drain_ms = u64::try_from(drain.as_millis()).unwrap_or(u64::MAX),
                "shutdown requested, draining"
            );
            tokio::time::sleep(drain).await;
        })
        .await
        .map_err(|e| format!("server failed: {e}"))
}
