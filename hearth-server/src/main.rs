//! hearth-server - Hearth backend server
//!
//! HTTP API plus the periodic reconciliation, trigger and autosave loops.

use std::sync::Arc;

use hearth_core::bus::{EventBus, EventKind};
use hearth_core::notify::LogNotifier;
use hearth_core::orchestration::OrchestrationService;
use hearth_core::workflow::TriggerEngine;
use hearth_core::{config as core_config, persist, StateStore};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod routes;
mod services;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("hearth_server=info".parse()?))
        .init();

    info!("hearth-server v{}", env!("CARGO_PKG_VERSION"));

    let cfg = config::Config::load();
    info!(config_path = %cfg.config_path.display(), "config loaded");

    // Declarative configuration must parse at startup; afterwards a broken
    // file only skips reconcile passes.
    let hearth_config = core_config::load_config(&cfg.config_path)?;
    info!(
        piles = hearth_config.piles.len(),
        workflows = hearth_config.workflows.len(),
        "declarative configuration loaded"
    );

    // State snapshot (missing file starts empty), reconciled once before
    // anything else observes it.
    let state = persist::load_state(&cfg.state_path)?;
    let engine = TriggerEngine::new(hearth_config.workflows.clone());
    let store = Arc::new(StateStore::new(state, engine));
    store.reconcile(&hearth_config.piles).await;

    let bus = EventBus::new(cfg.bus_capacity);

    // Orchestration degrades to legacy mode when a subsystem is unreachable.
    let orchestration = match OrchestrationService::connect(
        &cfg.inventory_url,
        &cfg.task_service_url,
        cfg.client_timeout,
    )
    .await
    {
        Ok(service) => Some(Arc::new(service)),
        Err(err) => {
            warn!(error = %err, "orchestration subsystems unreachable, running in legacy mode");
            None
        }
    };

    let app_state = AppState::new(
        cfg.clone(),
        Arc::clone(&store),
        bus.clone(),
        Arc::new(LogNotifier),
        orchestration.is_some(),
    );

    // Background loops, all hooked to one shutdown channel.
    let (shutdown_tx, _) = watch::channel(false);
    let _reconciler = services::reconciler::spawn(
        Arc::clone(&store),
        cfg.config_path.clone(),
        cfg.reconcile_interval,
        shutdown_tx.subscribe(),
    );
    let _trigger = services::trigger::spawn(
        Arc::clone(&app_state),
        cfg.trigger_interval,
        shutdown_tx.subscribe(),
    );
    let _autosave = services::autosave::spawn(
        Arc::clone(&store),
        cfg.state_path.clone(),
        cfg.autosave_interval,
        shutdown_tx.subscribe(),
    );
    if let Some(service) = &orchestration {
        let events = bus
            .subscribe_all(&[
                EventKind::InventoryLevelChanged,
                EventKind::TaskCompleted,
                EventKind::ScheduleTrigger,
            ])
            .await;
        let _dispatch = tokio::spawn(Arc::clone(service).run(events, shutdown_tx.subscribe()));
    }

    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    info!(addr = %cfg.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    // Final snapshot so nothing since the last autosave is lost.
    let snapshot = store.snapshot().await;
    if let Err(err) = persist::save_state(&cfg.state_path, &snapshot) {
        error!(error = %err, "final state save failed");
    }
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutting down...");
    let _ = shutdown_tx.send(true);
}
