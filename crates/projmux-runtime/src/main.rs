//! projmux: project/worktree-aware tmux pane navigator binary.

use anyhow::Context;
use chrono::Utc;
use clap::Parser;

use projmux_core::ProjectSource;
use projmux_engine::{AttachOutcome, EngineConfig, Reconciler};
use projmux_tmux::{attach_args, inside_tmux};

mod cli;
mod output;
mod poll_loop;
mod projects;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let filter = std::env::var("PROJMUX_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let projects_path = args
        .projects
        .clone()
        .unwrap_or_else(cli::default_projects_path);
    let source = projects::ConfigProjectSource::new(&projects_path);
    let executor = poll_loop::build_executor(&args);

    let command = args.command.unwrap_or(cli::Command::Ls(cli::LsOpts::default()));
    match command {
        cli::Command::Ls(opts) => {
            let mut projects = source
                .list_projects()
                .map_err(|e| anyhow::anyhow!(e))
                .with_context(|| format!("loading projects from {projects_path}"))?;
            let mut reconciler = Reconciler::new();
            let topology = reconciler
                .reconcile(&executor, &mut projects, Utc::now())
                .context("discovery failed")?;
            if opts.json {
                println!("{}", serde_json::to_string_pretty(&topology)?);
            } else {
                print!("{}", output::render_topology(&topology));
            }
        }
        cli::Command::Attach(opts) => {
            let mut projects = source
                .list_projects()
                .map_err(|e| anyhow::anyhow!(e))
                .with_context(|| format!("loading projects from {projects_path}"))?;
            let cfg = EngineConfig {
                layout: opts.layout,
                ..EngineConfig::default()
            };
            let mut reconciler = Reconciler::new();
            let now = Utc::now();
            let outcome = match opts.worktree {
                Some(ref worktree) => projmux_engine::handle_worktree_attachment_request(
                    &mut reconciler,
                    &executor,
                    &mut projects,
                    &opts.project,
                    worktree,
                    opts.kind,
                    &cfg,
                    inside_tmux(),
                    now,
                ),
                None => projmux_engine::handle_attachment_request(
                    &mut reconciler,
                    &executor,
                    &mut projects,
                    &opts.project,
                    opts.kind,
                    &cfg,
                    inside_tmux(),
                    now,
                ),
            };
            finish_attach(outcome)?;
        }
        cli::Command::Watch(opts) => {
            tracing::info!("projmux watch starting (interval {}ms)", opts.interval_ms);
            poll_loop::run_watch(
                executor,
                Box::new(source),
                Box::new(output::PrintSink),
                opts,
            )
            .await?;
        }
    }

    Ok(())
}

/// Act on an attachment outcome. The external path replaces this process
/// with `tmux attach-session`; in-process success needs nothing further.
fn finish_attach(outcome: AttachOutcome) -> anyhow::Result<()> {
    match outcome {
        AttachOutcome::AttachedInProcess => Ok(()),
        AttachOutcome::AttachExternally {
            session,
            window_index,
        } => exec_external_attach(&session, window_index),
        AttachOutcome::Failed { reason } => anyhow::bail!("attachment failed: {reason}"),
    }
}

#[cfg(unix)]
fn exec_external_attach(session: &str, window_index: u32) -> anyhow::Result<()> {
    use std::os::unix::process::CommandExt;
    let err = std::process::Command::new("tmux")
        .args(attach_args(session, window_index))
        .exec();
    // exec only returns on failure.
    Err(anyhow::anyhow!("exec tmux attach failed: {err}"))
}

#[cfg(not(unix))]
fn exec_external_attach(session: &str, window_index: u32) -> anyhow::Result<()> {
    let status = std::process::Command::new("tmux")
        .args(attach_args(session, window_index))
        .status()
        .context("spawning tmux attach")?;
    anyhow::ensure!(status.success(), "tmux attach exited with {status}");
    Ok(())
}
