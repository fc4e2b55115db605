//! File inbound adapter.
//!
//! Picks up files matching a pattern from a local directory. Files already
//! delivered by this instance are skipped on later fetches; with
//! `delete_after_read` they are removed instead.

use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::domain::errors::{AdapterError, AdapterResult};
use crate::domain::models::{
    AdapterConfig, AdapterDirection, AdapterKind, FetchRequest, OperationResult, Payload,
};
use crate::domain::ports::{ConnectionCheck, ProtocolAdapter};
use crate::services::processed_items::ProcessedItems;

use super::pattern::FilePattern;

const DEFAULT_PATTERN: &str = "*";
const DEFAULT_MAX_FILES: u64 = 100;

#[derive(Debug, Clone)]
struct InboundSettings {
    directory: PathBuf,
    pattern: FilePattern,
    max_files: usize,
    delete_after_read: bool,
}

impl InboundSettings {
    fn from_config(config: &AdapterConfig) -> AdapterResult<Self> {
        let directory = PathBuf::from(config.require_str("directory", "Source directory")?);
        let pattern = FilePattern::new(config.setting_str("pattern").unwrap_or(DEFAULT_PATTERN))?;
        let max_files = config.setting_u64("max_files").unwrap_or(DEFAULT_MAX_FILES);
        if max_files == 0 {
            return Err(AdapterError::config("max_files must be at least 1"));
        }

        Ok(Self {
            directory,
            pattern,
            max_files: usize::try_from(max_files).unwrap_or(usize::MAX),
            delete_after_read: config.setting_bool("delete_after_read").unwrap_or(false),
        })
    }
}

/// Reads files from a local directory.
///
/// Settings:
/// - `directory` (required): directory to read from.
/// - `pattern` (optional): file name glob, defaults to `*`.
/// - `max_files` (optional): files per fetch, defaults to 100. A fetch
///   request may lower it with a `max_files` parameter.
/// - `delete_after_read` (optional): remove files once read.
#[derive(Debug)]
pub struct FileInboundAdapter {
    config: AdapterConfig,
    settings: RwLock<Option<InboundSettings>>,
    processed: ProcessedItems,
}

impl FileInboundAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            config,
            settings: RwLock::new(None),
            processed: ProcessedItems::new(),
        }
    }

    fn settings(&self) -> AdapterResult<InboundSettings> {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| AdapterError::config("File inbound adapter is not initialized"))
    }

    async fn read_candidates(
        &self,
        settings: &InboundSettings,
        limit: usize,
    ) -> AdapterResult<Vec<(String, PathBuf)>> {
        let mut entries = tokio::fs::read_dir(&settings.directory).await?;
        let mut candidates = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !settings.pattern.matches(&name) {
                continue;
            }
            let path = entry.path();
            if self.processed.contains(&path.display().to_string()) {
                continue;
            }
            candidates.push((name, path));
        }

        candidates.sort();
        candidates.truncate(limit);
        Ok(candidates)
    }
}

#[async_trait]
impl ProtocolAdapter for FileInboundAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::File
    }

    fn direction(&self) -> AdapterDirection {
        AdapterDirection::Inbound
    }

    fn target(&self) -> String {
        self.config
            .setting_str("directory")
            .unwrap_or("<unset>")
            .to_string()
    }

    async fn perform_initialization(&self) -> AdapterResult<OperationResult> {
        let settings = InboundSettings::from_config(&self.config)?;
        if !settings.directory.is_dir() {
            warn!(
                directory = %settings.directory.display(),
                "source directory does not exist yet"
            );
        }

        let message = format!(
            "File inbound adapter initialized for {} (pattern {})",
            settings.directory.display(),
            settings.pattern.as_str()
        );
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = Some(settings);
        Ok(OperationResult::success(message))
    }

    async fn perform_start(&self) -> AdapterResult<OperationResult> {
        let settings = self.settings()?;
        Ok(OperationResult::success(format!(
            "Watching {}",
            settings.directory.display()
        )))
    }

    async fn perform_stop(&self) -> AdapterResult<OperationResult> {
        Ok(OperationResult::success("File inbound adapter stopped"))
    }

    async fn perform_shutdown(&self) -> AdapterResult<OperationResult> {
        self.processed.clear();
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(OperationResult::success("File inbound adapter released"))
    }

    fn connection_checks(&self) -> Vec<ConnectionCheck<'_>> {
        vec![
            ConnectionCheck::new("directory exists", async {
                let settings = self.settings()?;
                if settings.directory.is_dir() {
                    Ok(OperationResult::success("Source directory exists"))
                } else {
                    Ok(OperationResult::failure(format!(
                        "Source directory does not exist: {}",
                        settings.directory.display()
                    )))
                }
            }),
            ConnectionCheck::new("directory readable", async {
                let settings = self.settings()?;
                match tokio::fs::read_dir(&settings.directory).await {
                    Ok(_) => Ok(OperationResult::success("Source directory is readable")),
                    Err(err) => Ok(OperationResult::failure(format!(
                        "Cannot read source directory {}: {err}",
                        settings.directory.display()
                    ))),
                }
            }),
            ConnectionCheck::new("pattern valid", async {
                let raw = self.config.setting_str("pattern").unwrap_or(DEFAULT_PATTERN);
                FilePattern::new(raw)?;
                Ok(OperationResult::success(format!("Pattern '{raw}' is valid")))
            }),
        ]
    }

    async fn fetch(&self, request: &FetchRequest) -> AdapterResult<OperationResult> {
        let settings = self.settings()?;
        if !settings.directory.is_dir() {
            return Ok(OperationResult::failure(format!(
                "Source directory does not exist: {}",
                settings.directory.display()
            )));
        }

        let limit = request
            .param_u64("max_files")
            .and_then(|n| usize::try_from(n).ok())
            .map_or(settings.max_files, |n| n.min(settings.max_files));
        let candidates = self.read_candidates(&settings, limit).await?;
        if candidates.is_empty() {
            return Ok(OperationResult::success("No files found"));
        }

        let mut files = Vec::with_capacity(candidates.len());
        for (name, path) in candidates {
            let content = match tokio::fs::read(&path).await {
                Ok(content) => content,
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "skipping unreadable file");
                    continue;
                }
            };

            let key = path.display().to_string();
            files.push(json!({
                "name": name,
                "path": key,
                "size": content.len(),
                "content": Payload::from(content).to_json(),
            }));

            if settings.delete_after_read {
                if let Err(err) = tokio::fs::remove_file(&path).await {
                    warn!(file = %key, error = %err, "failed to delete file after read");
                    self.processed.mark(key);
                }
            } else {
                self.processed.mark(key);
            }
        }

        let count = files.len();
        debug!(directory = %settings.directory.display(), count, "fetched files");
        if count == 0 {
            return Ok(OperationResult::success("No files found"));
        }
        Ok(OperationResult::success_with_data(
            format!("Fetched {count} file(s) from {}", settings.directory.display()),
            Value::Array(files),
        )
        .with_records_processed(count as u64))
    }
}
