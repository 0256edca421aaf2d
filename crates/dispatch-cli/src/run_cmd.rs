//! `dispatch run`: load a task manifest and run it to completion.
//!
//! Sets up graceful double-ctrl-c cancellation, calls the core run function,
//! and maps the result onto process exit codes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};

use dispatch_core::dispatcher::{CancellationHandle, DispatchOptions, Dispatcher};
use dispatch_core::executor::InProcessExecutor;
use dispatch_core::scaler::AimdScaler;
use dispatch_core::straggler::DeadlineStraggler;
use dispatch_core::DispatchDefaults;

use crate::manifest::{build_tasks, parse_manifest, CommandOutcome};

pub struct RunArgs {
    pub manifest_path: String,
    pub straggler_deadline_secs: Option<u64>,
    pub defaults: DispatchDefaults,
}

pub async fn run(args: RunArgs) -> Result<()> {
    let raw = tokio::fs::read_to_string(&args.manifest_path)
        .await
        .with_context(|| format!("reading manifest {}", args.manifest_path))?;
    let manifest = parse_manifest(&raw)
        .with_context(|| format!("parsing manifest {}", args.manifest_path))?;
    let tasks = build_tasks(manifest, args.defaults.retry_max_attempts);

    if tasks.is_empty() {
        println!("Manifest at {} has no tasks.", args.manifest_path);
        return Ok(());
    }

    println!("Dispatching {} task(s) from {}", tasks.len(), args.manifest_path);

    let executor = InProcessExecutor::<CommandOutcome>::new();
    let cancel = CancellationHandle::new();
    let mut opts: DispatchOptions<InProcessExecutor<CommandOutcome>> =
        DispatchOptions::with_defaults(executor, tasks.len());
    opts.cancel = cancel.clone();
    opts.submit_jitter = args.defaults.submit_jitter;
    opts.scaler = Box::new(AimdScaler::new(
        args.defaults.aimd_initial,
        args.defaults.aimd_max,
        args.defaults.aimd_min,
        args.defaults.aimd_additive_increase,
        args.defaults.aimd_multiplicative_decrease,
        tasks.len(),
    ));
    if let Some(secs) = args.straggler_deadline_secs {
        opts.straggler = Some(Box::new(DeadlineStraggler::new(std::time::Duration::from_secs(
            secs,
        ))));
    }

    install_ctrl_c_handler(cancel);

    match Dispatcher::start_run(tasks, opts).await {
        Ok(results) => {
            println!("All {} task(s) completed successfully.", results.len());
            for r in &results {
                println!("  - {}: exit {}", r.name, r.exit_code);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Run did not complete: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

/// First Ctrl+C requests graceful cancellation; a second forces exit.
fn install_ctrl_c_handler(cancel: CancellationHandle) {
    let got_first_signal = Arc::new(AtomicBool::new(false));
    let got_first_clone = Arc::clone(&got_first_signal);

    tokio::spawn(async move {
        loop {
            tokio::signal::ctrl_c().await.ok();
            if got_first_clone.swap(true, Ordering::SeqCst) {
                eprintln!("\nForce exit.");
                std::process::exit(130);
            }
            eprintln!("\nShutting down gracefully (Ctrl+C again to force)...");
            cancel.cancel();
        }
    });
}
