//! File outbound adapter.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::errors::{AdapterError, AdapterResult};
use crate::domain::models::{
    AdapterConfig, AdapterDirection, AdapterKind, OperationResult, Payload, SendRequest,
};
use crate::domain::ports::{ConnectionCheck, ProtocolAdapter};

#[derive(Debug, Clone)]
struct OutboundSettings {
    directory: PathBuf,
    file_prefix: String,
    extension: String,
    create_directory: bool,
}

impl OutboundSettings {
    fn from_config(config: &AdapterConfig) -> AdapterResult<Self> {
        let directory = PathBuf::from(config.require_str("directory", "Target directory")?);
        let file_prefix = config.setting_str("file_prefix").unwrap_or("out").to_string();
        let extension = config
            .setting_str("extension")
            .unwrap_or("dat")
            .trim_start_matches('.')
            .to_string();

        for (label, value) in [("file_prefix", &file_prefix), ("extension", &extension)] {
            if value.contains(['/', '\\']) {
                return Err(AdapterError::config(format!(
                    "{label} must not contain path separators: '{value}'"
                )));
            }
        }

        Ok(Self {
            directory,
            file_prefix,
            extension,
            create_directory: config.setting_bool("create_directory").unwrap_or(true),
        })
    }

    fn file_path(&self, stem: &str) -> PathBuf {
        self.directory.join(format!("{}_{stem}.{}", self.file_prefix, self.extension))
    }
}

fn timestamp() -> String {
    Utc::now().format("%Y%m%d%H%M%S%3f").to_string()
}

/// Write to a temporary name first so readers never see a partial file.
async fn write_atomically(path: &Path, contents: &[u8]) -> AdapterResult<()> {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".part");
    let staging = PathBuf::from(staging);

    tokio::fs::write(&staging, contents).await?;
    if let Err(err) = tokio::fs::rename(&staging, path).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(err.into());
    }
    Ok(())
}

/// Writes payloads as files into a local directory.
///
/// Settings:
/// - `directory` (required): target directory.
/// - `file_prefix` (optional): defaults to `out`.
/// - `extension` (optional): defaults to `dat`.
/// - `create_directory` (optional): create the directory on initialization,
///   defaults to true.
///
/// A single send writes `<prefix>_<timestamp>_<seq>.<ext>`; a batch writes
/// every payload, newline separated, to `<prefix>_batch_<n>_<timestamp>.<ext>`.
#[derive(Debug)]
pub struct FileOutboundAdapter {
    config: AdapterConfig,
    settings: RwLock<Option<OutboundSettings>>,
    sequence: AtomicU64,
}

impl FileOutboundAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            config,
            settings: RwLock::new(None),
            sequence: AtomicU64::new(0),
        }
    }

    fn settings(&self) -> AdapterResult<OutboundSettings> {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| AdapterError::config("File outbound adapter is not initialized"))
    }
}

#[async_trait]
impl ProtocolAdapter for FileOutboundAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::File
    }

    fn direction(&self) -> AdapterDirection {
        AdapterDirection::Outbound
    }

    fn target(&self) -> String {
        self.config
            .setting_str("directory")
            .unwrap_or("<unset>")
            .to_string()
    }

    async fn perform_initialization(&self) -> AdapterResult<OperationResult> {
        let settings = OutboundSettings::from_config(&self.config)?;

        if !settings.directory.is_dir() {
            if !settings.create_directory {
                return Err(AdapterError::config(format!(
                    "Target directory does not exist: {}",
                    settings.directory.display()
                )));
            }
            tokio::fs::create_dir_all(&settings.directory).await?;
            info!(directory = %settings.directory.display(), "created target directory");
        }

        let message = format!(
            "File outbound adapter initialized for {}",
            settings.directory.display()
        );
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = Some(settings);
        Ok(OperationResult::success(message))
    }

    async fn perform_start(&self) -> AdapterResult<OperationResult> {
        self.settings()?;
        Ok(OperationResult::success("File outbound adapter started"))
    }

    async fn perform_stop(&self) -> AdapterResult<OperationResult> {
        Ok(OperationResult::success("File outbound adapter stopped"))
    }

    async fn perform_shutdown(&self) -> AdapterResult<OperationResult> {
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(OperationResult::success("File outbound adapter released"))
    }

    fn connection_checks(&self) -> Vec<ConnectionCheck<'_>> {
        vec![
            ConnectionCheck::new("directory exists", async {
                let settings = self.settings()?;
                if settings.directory.is_dir() {
                    Ok(OperationResult::success("Target directory exists"))
                } else {
                    Ok(OperationResult::failure(format!(
                        "Target directory does not exist: {}",
                        settings.directory.display()
                    )))
                }
            }),
            ConnectionCheck::new("directory writable", async {
                let settings = self.settings()?;
                let probe = settings
                    .directory
                    .join(format!(".switchyard-probe-{}", Uuid::new_v4().simple()));
                match tokio::fs::write(&probe, b"probe").await {
                    Ok(()) => {
                        tokio::fs::remove_file(&probe).await?;
                        Ok(OperationResult::success("Target directory is writable"))
                    }
                    Err(err) => Ok(OperationResult::failure(format!(
                        "Cannot write to target directory {}: {err}",
                        settings.directory.display()
                    ))),
                }
            }),
        ]
    }

    async fn send(&self, request: &SendRequest) -> AdapterResult<OperationResult> {
        let settings = self.settings()?;
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let path = settings.file_path(&format!("{}_{seq:06}", timestamp()));
        let bytes = request.payload.to_bytes();

        write_atomically(&path, &bytes).await?;
        debug!(file = %path.display(), bytes = bytes.len(), "wrote payload");

        Ok(OperationResult::success_with_data(
            format!("Wrote {} bytes to {}", bytes.len(), path.display()),
            json!({ "file": path.display().to_string(), "bytes": bytes.len() }),
        )
        .with_records_processed(1))
    }

    async fn write_batch(
        &self,
        items: Vec<Payload>,
        batch_number: u64,
    ) -> AdapterResult<OperationResult> {
        let settings = self.settings()?;
        let path = settings.file_path(&format!("batch_{batch_number}_{}", timestamp()));

        let mut contents = Vec::new();
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                contents.push(b'\n');
            }
            contents.extend_from_slice(&item.to_bytes());
        }

        write_atomically(&path, &contents).await?;
        info!(file = %path.display(), items = items.len(), batch_number, "wrote batch file");

        Ok(OperationResult::success_with_data(
            format!(
                "Wrote batch {batch_number} with {} items to {}",
                items.len(),
                path.display()
            ),
            json!({ "file": path.display().to_string(), "bytes": contents.len() }),
        )
        .with_records_processed(items.len() as u64))
    }
}
