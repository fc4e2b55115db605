//! Implementation of the `switchyard test` command.

use anyhow::{bail, Result};
use serde::Serialize;

use crate::cli::output::{list_table, output, truncate, CommandOutput, ResultLine};
use crate::domain::models::{AdapterConfig, OperationResult, RuntimeConfig};
use crate::services::AdapterRegistry;

#[derive(Debug, Serialize)]
pub struct TestOutput {
    pub results: Vec<ResultLine>,
    pub all_passed: bool,
}

impl CommandOutput for TestOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["adapter", "status", "details"]);
        for line in &self.results {
            table.add_row(vec![
                line.adapter.clone(),
                line.status_label().to_string(),
                truncate(&line.message, 120),
            ]);
        }

        let summary = if self.all_passed {
            "All connection tests passed."
        } else {
            "Some connection tests failed."
        };
        format!("{table}\n\n{summary}")
    }
}

pub async fn execute(config: &RuntimeConfig, name: Option<&str>, json_mode: bool) -> Result<()> {
    let selected: Vec<AdapterConfig> = match name {
        Some(name) => match config.adapter(name) {
            Some(adapter) => vec![adapter.clone()],
            None => bail!("No adapter named '{name}' in configuration"),
        },
        None => config.adapters.clone(),
    };
    if selected.is_empty() {
        bail!("No adapters configured");
    }

    let (registry, failures) = AdapterRegistry::from_configs(&selected);
    let mut results: Vec<ResultLine> = failures
        .iter()
        .map(|(name, err)| ResultLine::new(name, &OperationResult::failure(err.to_string())))
        .collect();

    let initialized = registry.initialize_all().await;
    for (name, init) in initialized {
        let outcome = match registry.get(&name) {
            Some(runtime) if init.is_success() => runtime.test_connection().await,
            _ => init,
        };
        results.push(ResultLine::new(name, &outcome));
    }
    registry.shutdown_all().await;

    let all_passed = results.iter().all(|line| line.success);
    output(&TestOutput { results, all_passed }, json_mode);
    if !all_passed {
        bail!("Connection test failed");
    }
    Ok(())
}
