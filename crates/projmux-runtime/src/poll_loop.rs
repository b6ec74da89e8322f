//! Watch mode: periodic reconciliation with debounced topology output.
//!
//! The shared state sits behind a tokio mutex. Periodic ticks that would
//! overlap a still-running pass are skipped, not queued; a synchronous
//! trigger (the attach path) takes the lock and always runs a full pass.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::time::{Duration, interval};

use projmux_core::{Project, ProjectSource};
use projmux_engine::{PaneSink, Reconciler, UpdateDebouncer};
use projmux_tmux::TmuxExecutor;

use crate::cli::{Cli, WatchOpts};

/// Engine state shared between the tick loop and any foreground trigger.
pub struct EngineState {
    pub reconciler: Reconciler,
    pub debouncer: UpdateDebouncer,
    /// Last successfully loaded project set, reused when the source fails.
    pub projects: Vec<Project>,
}

impl EngineState {
    pub fn new(debounce: chrono::Duration) -> Self {
        Self {
            reconciler: Reconciler::new(),
            debouncer: UpdateDebouncer::new(debounce),
            projects: Vec::new(),
        }
    }
}

/// Build the real executor with socket targeting:
/// `--tmux-socket` > `PROJMUX_TMUX_SOCKET_PATH` > `PROJMUX_TMUX_SOCKET_NAME`.
pub fn build_executor(cli: &Cli) -> TmuxExecutor {
    let mut executor = TmuxExecutor::default();
    if let Some(ref socket) = cli.tmux_socket {
        executor = executor.with_socket_path(socket.clone());
    } else if let Ok(path) = std::env::var("PROJMUX_TMUX_SOCKET_PATH") {
        executor = executor.with_socket_path(path);
    } else if let Ok(name) = std::env::var("PROJMUX_TMUX_SOCKET_NAME") {
        executor = executor.with_socket_name(name);
    }
    executor
}

/// Run the watch loop until ctrl-c / SIGTERM.
pub async fn run_watch(
    executor: TmuxExecutor,
    source: Box<dyn ProjectSource + Send>,
    sink: Box<dyn PaneSink + Send + Sync>,
    opts: WatchOpts,
) -> anyhow::Result<()> {
    let state = Arc::new(Mutex::new(EngineState::new(chrono::Duration::milliseconds(
        opts.debounce_ms as i64,
    ))));
    let executor = Arc::new(executor);

    let tick_state = Arc::clone(&state);
    let tick_executor = Arc::clone(&executor);
    let tick_handle = tokio::spawn(async move {
        let mut ticker = interval(Duration::from_millis(opts.interval_ms.max(100)));
        loop {
            ticker.tick().await;
            // Skip, don't queue, when a previous pass is still running.
            let Ok(mut state) = tick_state.try_lock() else {
                tracing::debug!("tick skipped, previous pass still in flight");
                continue;
            };
            tick(&mut state, tick_executor.as_ref(), source.as_ref(), sink.as_ref());
        }
    });

    shutdown_signal().await;
    tick_handle.abort();
    tracing::info!("watch stopped");
    Ok(())
}

/// One periodic tick: refresh projects, reconcile, push when due.
fn tick(
    state: &mut EngineState,
    executor: &TmuxExecutor,
    source: &(dyn ProjectSource + Send),
    sink: &(dyn PaneSink + Send + Sync),
) {
    match source.list_projects() {
        Ok(projects) => state.projects = projects,
        Err(err) => {
            tracing::warn!("project source failed, keeping previous set: {err}");
        }
    }

    let now = Utc::now();
    match state.reconciler.reconcile(executor, &mut state.projects, now) {
        Ok(topology) => {
            state.debouncer.mark_dirty();
            if state.debouncer.should_emit(now) {
                sink.on_panes_updated(&topology);
            }
        }
        Err(err) => {
            // Prior state stays in place; the next tick is the retry.
            tracing::warn!("discovery pass failed: {err}");
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            Ok(sig) => sig,
            Err(err) => {
                tracing::warn!("failed to register SIGTERM handler: {err}");
                ctrl_c.await.ok();
                return;
            }
        };
        tokio::select! {
            _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
            _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        tracing::info!("received ctrl-c, shutting down");
    }
}
