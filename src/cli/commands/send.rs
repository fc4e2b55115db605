//! Implementation of the `switchyard send` command.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput, ResultLine};
use crate::domain::models::{Payload, RuntimeConfig, SendRequest};

use super::{bring_up, build_runtime};

#[derive(Debug, Serialize)]
pub struct SendOutput {
    pub result: ResultLine,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_flush: Option<String>,
}

impl CommandOutput for SendOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "[{}] {}: {}",
            self.result.status_label(),
            self.result.adapter,
            self.result.message
        )];
        if let Some(flush) = &self.batch_flush {
            lines.push(format!("Batch flush: {flush}"));
        }
        lines.join("\n")
    }
}

pub async fn execute(
    config: &RuntimeConfig,
    name: &str,
    text: Option<String>,
    file: Option<PathBuf>,
    json_mode: bool,
) -> Result<()> {
    let payload = match (text, file) {
        (Some(text), _) => Payload::from(text),
        (None, Some(path)) => Payload::from(
            tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read payload from {}", path.display()))?,
        ),
        (None, None) => bail!("Provide a payload with --text or --file"),
    };

    let runtime = build_runtime(config, name)?;
    bring_up(&runtime).await?;

    let sent = runtime.send(&SendRequest::new(payload)).await;
    let stopped = runtime.stop().await;
    runtime.shutdown().await;

    let batch_flush = stopped
        .metadata()
        .get("batch_flush")
        .and_then(|value| value.as_str())
        .map(str::to_string);
    let success = sent.is_success();
    output(
        &SendOutput {
            result: ResultLine::new(name, &sent),
            batch_flush,
        },
        json_mode,
    );

    if !success {
        bail!("Send through '{name}' failed");
    }
    Ok(())
}
