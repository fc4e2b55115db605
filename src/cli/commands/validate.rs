//! Implementation of the `switchyard validate` command.

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{list_table, output, CommandOutput};
use crate::domain::models::{AdapterConfig, RuntimeConfig};
use crate::services::AdapterFactory;

#[derive(Debug, Serialize)]
pub struct AdapterSummary {
    pub name: String,
    pub protocol: String,
    pub direction: String,
    pub polling: Option<u64>,
    pub batching: Option<String>,
    pub built_in: bool,
}

impl AdapterSummary {
    fn from_config(config: &AdapterConfig) -> Self {
        let polling = (config.direction.is_inbound() && config.kind.requires_polling())
            .then_some(config.polling.interval_ms);
        let batching = config
            .batch
            .enabled
            .then(|| config.batch.strategy.as_str().to_string());

        Self {
            name: config.name.clone(),
            protocol: config.kind.to_string(),
            direction: config.direction.to_string(),
            polling,
            batching,
            built_in: AdapterFactory::supports(config.kind, config.direction),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ValidateOutput {
    pub valid: bool,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub adapters: Vec<AdapterSummary>,
}

impl CommandOutput for ValidateOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Configuration is valid (log level {}).",
            self.log_level
        )];
        if let Some(dir) = &self.log_dir {
            lines.push(format!("Logs are written to {dir}"));
        }
        if self.adapters.is_empty() {
            lines.push("No adapters configured.".to_string());
            return lines.join("\n");
        }

        let mut table = list_table(&["name", "protocol", "direction", "polling", "batch", "built-in"]);
        for a in &self.adapters {
            table.add_row(vec![
                a.name.clone(),
                a.protocol.clone(),
                a.direction.clone(),
                a.polling.map_or_else(|| "-".to_string(), |ms| format!("{ms} ms")),
                a.batching.clone().unwrap_or_else(|| "-".to_string()),
                if a.built_in { "yes" } else { "no" }.to_string(),
            ]);
        }
        lines.push(table.to_string());
        lines.join("\n")
    }
}

pub fn execute(config: &RuntimeConfig, json_mode: bool) -> Result<()> {
    let summary = ValidateOutput {
        valid: true,
        log_level: config.logging.level.clone(),
        log_dir: config
            .logging
            .log_dir
            .as_ref()
            .map(|dir| dir.display().to_string()),
        adapters: config.adapters.iter().map(AdapterSummary::from_config).collect(),
    };
    output(&summary, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AdapterDirection, AdapterKind, BatchSettings, BatchStrategy};

    #[test]
    fn test_summary_reports_polling_and_batching() {
        let inbound = AdapterConfig::new("in", AdapterKind::File, AdapterDirection::Inbound);
        let summary = AdapterSummary::from_config(&inbound);
        assert_eq!(summary.polling, Some(60_000));
        assert!(summary.batching.is_none());
        assert!(summary.built_in);

        let outbound = AdapterConfig::new("soap", AdapterKind::Soap, AdapterDirection::Outbound)
            .with_batch(BatchSettings {
                enabled: true,
                strategy: BatchStrategy::Mixed,
                ..BatchSettings::default()
            });
        let summary = AdapterSummary::from_config(&outbound);
        assert!(summary.polling.is_none());
        assert_eq!(summary.batching.as_deref(), Some("mixed"));
        assert!(!summary.built_in);
    }

    #[test]
    fn test_human_output_lists_adapters() {
        let output = ValidateOutput {
            valid: true,
            log_level: "info".to_string(),
            log_dir: None,
            adapters: vec![AdapterSummary::from_config(&AdapterConfig::new(
                "orders",
                AdapterKind::File,
                AdapterDirection::Outbound,
            ))],
        };
        let human = output.to_human();
        assert!(human.contains("Configuration is valid"));
        assert!(human.contains("orders"));
        assert!(human.contains("outbound"));
    }
}
