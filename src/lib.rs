// src/lib.rs

pub mod cli;
pub mod config;
pub mod controller;
pub mod errors;
pub mod logging;
pub mod messaging;
pub mod progress;
pub mod supervisor;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
pub use crate::controller::{Controller, ControllerSettings, Disposable, DisposalSink, Subscriptions};
use crate::progress::status::{show_status, LogStatus, StatusSink, StatusText};
use crate::supervisor::{ProcessSpawner, Supervisor};
use crate::types::WorkerMode;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the `--direct` override
/// - either a dry-run report or a probe run of the worker
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    let mut settings = cfg.settings();
    if args.direct {
        settings.spawn.mode = WorkerMode::Direct;
    }

    if args.dry_run {
        print_dry_run(&settings);
        return Ok(());
    }

    probe(settings).await
}

/// Start the worker, hold its channel open, and wait until it exits or
/// Ctrl-C is pressed. Then release it.
///
/// No message client is attached, so this only exercises the supervisor:
/// spawn, stderr forwarding, failure reporting and release.
async fn probe(settings: ControllerSettings) -> Result<()> {
    let status: Arc<dyn StatusSink> = Arc::new(LogStatus);
    let text = StatusText::new(settings.progress.label.clone());
    show_status(status.as_ref(), &text.starting());

    let mut supervisor = Supervisor::new(
        settings.spawn,
        Arc::new(ProcessSpawner),
        Arc::clone(&status),
        text,
    );
    let mut worker = supervisor.obtain_channel().await?;
    let _channel = worker.take_channel();

    tokio::select! {
        exit = worker.wait() => match exit {
            Ok(Some(exit)) => info!(%exit, "worker exited"),
            Ok(None) => debug!("worker has no owned process"),
            Err(e) => warn!(error = %e, "failed to wait for worker"),
        },
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => info!("interrupt received; stopping worker"),
            Err(e) => warn!(error = %e, "failed to listen for Ctrl+C"),
        },
    }

    worker.release();
    Ok(())
}

/// Simple dry-run output: print the resolved worker invocation and the
/// client wiring.
fn print_dry_run(settings: &ControllerSettings) {
    let spec = settings.spawn.command_spec();
    let methods = settings.methods();

    println!("analysis-controller dry-run");
    println!("  worker.mode = {}", settings.spawn.mode);
    println!("  worker.command = {spec}");
    println!("  worker.cwd = {}", spec.cwd.display());
    for (key, value) in &spec.env {
        println!("  worker.env.{key} = {value}");
    }
    println!();

    println!("client ({}):", settings.client.name);
    println!("  documents: {:?}", settings.client.document_selector);
    println!(
        "  configuration_section: {}",
        settings.client.configuration_section
    );
    println!("  begin: {}", methods.begin);
    println!("  end: {}", methods.end);
    println!(
        "  spinner: {:?} every {:?}",
        settings.progress.glyphs, settings.progress.tick
    );

    debug!("dry-run complete (worker not started)");
}
