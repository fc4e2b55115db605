//! Implementation of the `switchyard poll` command.
//!
//! Brings one inbound adapter up, polls it on its configured interval and
//! prints every delivery until the duration elapses or Ctrl-C is pressed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::output::{output, CommandOutput, ResultLine};
use crate::domain::models::RuntimeConfig;

use super::{bring_up, build_runtime};

#[derive(Debug, Serialize)]
pub struct PollSummary {
    pub adapter: String,
    pub deliveries: u64,
    pub failures: u64,
}

impl CommandOutput for PollSummary {
    fn to_human(&self) -> String {
        format!(
            "Stopped polling {}: {} deliveries, {} failures.",
            self.adapter, self.deliveries, self.failures
        )
    }
}

fn print_delivery(line: &ResultLine, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string(line).unwrap_or_default());
        return;
    }
    println!("[{}] {}", line.status_label(), line.message);
    if let Some(data) = &line.data {
        println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
    }
}

pub async fn execute(
    config: &RuntimeConfig,
    name: &str,
    duration_secs: Option<u64>,
    json_mode: bool,
) -> Result<()> {
    let runtime = build_runtime(config, name)?;
    if !runtime.config().direction.is_inbound() {
        bail!("Adapter '{name}' is outbound and cannot be polled");
    }

    let deliveries = Arc::new(AtomicU64::new(0));
    let failures = Arc::new(AtomicU64::new(0));
    {
        let deliveries = Arc::clone(&deliveries);
        let failures = Arc::clone(&failures);
        let adapter = name.to_string();
        runtime.register_data_callback(move |data, result| {
            if result.is_success() {
                deliveries.fetch_add(1, Ordering::Relaxed);
            } else {
                failures.fetch_add(1, Ordering::Relaxed);
            }
            let mut line = ResultLine::new(adapter.clone(), &result);
            line.data = data;
            print_delivery(&line, json_mode);
        });
    }

    bring_up(&runtime).await?;
    let polling = runtime.start_configured_polling();
    if !polling.is_success() {
        runtime.shutdown().await;
        bail!("Failed to start polling '{name}': {}", polling.message());
    }
    info!(adapter = name, "polling, press Ctrl-C to stop");

    match duration_secs {
        Some(secs) => {
            tokio::select! {
                () = tokio::time::sleep(Duration::from_secs(secs)) => {}
                _ = tokio::signal::ctrl_c() => {}
            }
        }
        None => {
            let _ = tokio::signal::ctrl_c().await;
        }
    }

    runtime.shutdown().await;
    output(
        &PollSummary {
            adapter: name.to_string(),
            deliveries: deliveries.load(Ordering::Relaxed),
            failures: failures.load(Ordering::Relaxed),
        },
        json_mode,
    );
    Ok(())
}
