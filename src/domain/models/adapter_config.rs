//! Per-adapter configuration.
//!
//! The runtime reads only the universal sections (polling, batching,
//! timeouts). Everything protocol-specific lives in the free-form
//! `settings` map and is interpreted by the adapter itself.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::errors::{AdapterError, AdapterResult};
use crate::domain::models::adapter::{AdapterDirection, AdapterKind};

/// Batch timeout used when the configured value is not positive.
pub const DEFAULT_BATCH_TIMEOUT_MS: i64 = 60_000;

/// Immutable configuration for one adapter instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AdapterConfig {
    /// Unique adapter name, used in logs and lookups.
    pub name: String,

    /// Protocol family.
    pub kind: AdapterKind,

    /// Data-flow direction.
    pub direction: AdapterDirection,

    /// Polling settings (inbound adapters).
    #[serde(default)]
    pub polling: PollingSettings,

    /// Batching settings (outbound adapters).
    #[serde(default)]
    pub batch: BatchSettings,

    /// Timeouts applied to every protocol call.
    #[serde(default)]
    pub timeouts: TimeoutSettings,

    /// Protocol-private settings (host, directory, credentials, ...).
    #[serde(default)]
    pub settings: HashMap<String, Value>,
}

/// Polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PollingSettings {
    /// Fixed delay between the end of one poll and the start of the next.
    #[serde(default = "default_polling_interval_ms")]
    pub interval_ms: u64,

    /// Start polling automatically when the adapter starts.
    #[serde(default)]
    pub auto_start: bool,

    /// Parameters passed to every scheduled fetch.
    #[serde(default)]
    pub params: HashMap<String, Value>,
}

const fn default_polling_interval_ms() -> u64 {
    60_000
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_polling_interval_ms(),
            auto_start: false,
            params: HashMap::new(),
        }
    }
}

impl PollingSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// When a batch is flushed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStrategy {
    /// Flush once the buffer holds `size` items.
    #[default]
    #[serde(alias = "SIZE_BASED")]
    SizeBased,
    /// Flush once `timeout_ms` elapsed since the last flush.
    #[serde(alias = "TIME_BASED")]
    TimeBased,
    /// Flush when either condition holds.
    #[serde(alias = "MIXED")]
    Mixed,
}

impl BatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SizeBased => "size_based",
            Self::TimeBased => "time_based",
            Self::Mixed => "mixed",
        }
    }
}

/// Batching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BatchSettings {
    /// Route sends through the batch accumulator.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub strategy: BatchStrategy,

    /// Flush threshold in items. Absent means unbounded.
    #[serde(default)]
    pub size: Option<usize>,

    /// Flush threshold in milliseconds since the last flush.
    #[serde(default = "default_batch_timeout_ms")]
    pub timeout_ms: i64,
}

const fn default_batch_timeout_ms() -> i64 {
    DEFAULT_BATCH_TIMEOUT_MS
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            strategy: BatchStrategy::default(),
            size: None,
            timeout_ms: default_batch_timeout_ms(),
        }
    }
}

/// Flush policy derived from validated [`BatchSettings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicy {
    pub strategy: BatchStrategy,
    pub size: Option<usize>,
    pub timeout: Duration,
}

impl BatchSettings {
    /// The flush policy for these settings.
    ///
    /// A non-positive timeout falls back to [`DEFAULT_BATCH_TIMEOUT_MS`].
    pub fn policy(&self) -> BatchPolicy {
        let timeout_ms = if self.timeout_ms > 0 {
            self.timeout_ms
        } else {
            DEFAULT_BATCH_TIMEOUT_MS
        };
        BatchPolicy {
            strategy: self.strategy,
            size: self.size,
            timeout: Duration::from_millis(timeout_ms.unsigned_abs()),
        }
    }
}

/// Caller-controlled timeouts for protocol calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TimeoutSettings {
    /// Connection establishment timeout.
    #[serde(default = "default_connect_ms")]
    pub connect_ms: u64,

    /// Timeout for a single network read.
    #[serde(default = "default_read_ms")]
    pub read_ms: u64,

    /// Upper bound for one fetch, send or flush.
    #[serde(default = "default_operation_ms")]
    pub operation_ms: u64,

    /// How long stop/shutdown wait for in-flight work before forcing it.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

const fn default_connect_ms() -> u64 {
    10_000
}

const fn default_read_ms() -> u64 {
    30_000
}

const fn default_operation_ms() -> u64 {
    60_000
}

const fn default_shutdown_grace_ms() -> u64 {
    5_000
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_ms(),
            read_ms: default_read_ms(),
            operation_ms: default_operation_ms(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

impl TimeoutSettings {
    pub fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }

    pub fn read(&self) -> Duration {
        Duration::from_millis(self.read_ms)
    }

    pub fn operation(&self) -> Duration {
        Duration::from_millis(self.operation_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

impl AdapterConfig {
    /// Create a configuration with default runtime sections.
    pub fn new(name: impl Into<String>, kind: AdapterKind, direction: AdapterDirection) -> Self {
        Self {
            name: name.into(),
            kind,
            direction,
            polling: PollingSettings::default(),
            batch: BatchSettings::default(),
            timeouts: TimeoutSettings::default(),
            settings: HashMap::new(),
        }
    }

    /// Add a protocol setting.
    pub fn with_setting(mut self, key: impl Into<String>, value: Value) -> Self {
        self.settings.insert(key.into(), value);
        self
    }

    /// Replace the polling section.
    pub fn with_polling(mut self, polling: PollingSettings) -> Self {
        self.polling = polling;
        self
    }

    /// Replace the batching section.
    pub fn with_batch(mut self, batch: BatchSettings) -> Self {
        self.batch = batch;
        self
    }

    /// Replace the timeouts section.
    pub fn with_timeouts(mut self, timeouts: TimeoutSettings) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Read a string setting. Empty strings count as absent.
    pub fn setting_str(&self, key: &str) -> Option<&str> {
        self.settings
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Read a string setting that must be present.
    pub fn require_str(&self, key: &str, label: &str) -> AdapterResult<&str> {
        self.setting_str(key)
            .ok_or_else(|| AdapterError::config(format!("{label} is required ('{key}')")))
    }

    /// Read a boolean setting, accepting `true`/`false` strings.
    pub fn setting_bool(&self, key: &str) -> Option<bool> {
        match self.settings.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Read an unsigned integer setting, accepting numeric strings.
    pub fn setting_u64(&self, key: &str) -> Option<u64> {
        match self.settings.get(key)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Read a string-to-string map setting.
    pub fn setting_map(&self, key: &str) -> HashMap<String, String> {
        self.settings
            .get(key)
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Validate the runtime sections and return a normalised copy.
    ///
    /// A non-positive batch timeout is replaced by the default rather than
    /// rejected; every other problem is a configuration error.
    pub fn validated(mut self) -> AdapterResult<Self> {
        if self.name.trim().is_empty() {
            return Err(AdapterError::config("Adapter name is required"));
        }
        if !self
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(AdapterError::config(format!(
                "Adapter name '{}' may only contain letters, digits, '-', '_' and '.'",
                self.name
            )));
        }

        if self.polling.interval_ms == 0 {
            return Err(AdapterError::config(
                "polling.interval_ms must be greater than zero",
            ));
        }

        if self.batch.enabled {
            if self.direction.is_inbound() {
                return Err(AdapterError::config(
                    "Batching is only supported by outbound adapters",
                ));
            }
            if self.batch.size == Some(0) {
                return Err(AdapterError::config("batch.size must be at least 1"));
            }
            if self.batch.strategy == BatchStrategy::SizeBased && self.batch.size.is_none() {
                tracing::warn!(
                    adapter = %self.name,
                    "size-based batching without batch.size only flushes on stop or shutdown"
                );
            }
        }

        if self.batch.timeout_ms <= 0 {
            tracing::warn!(
                adapter = %self.name,
                configured = self.batch.timeout_ms,
                default = DEFAULT_BATCH_TIMEOUT_MS,
                "batch.timeout_ms must be positive, using default"
            );
            self.batch.timeout_ms = DEFAULT_BATCH_TIMEOUT_MS;
        }

        let timeouts = [
            ("timeouts.connect_ms", self.timeouts.connect_ms),
            ("timeouts.read_ms", self.timeouts.read_ms),
            ("timeouts.operation_ms", self.timeouts.operation_ms),
            ("timeouts.shutdown_grace_ms", self.timeouts.shutdown_grace_ms),
        ];
        if let Some((field, _)) = timeouts.iter().find(|(_, value)| *value == 0) {
            return Err(AdapterError::config(format!(
                "{field} must be greater than zero"
            )));
        }

        Ok(self)
    }
}
