//! The success/failure envelope returned by every adapter operation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::errors::AdapterError;

/// Outcome of a single adapter operation.
///
/// Constructed once per outcome and never mutated afterwards: the
/// `with_*` builders consume the value, and the fields are only exposed
/// through accessors. A successful result without data is valid (for
/// example "No files found").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    success: bool,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    records_processed: Option<u64>,
}

impl OperationResult {
    /// Create a successful result without data.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            metadata: BTreeMap::new(),
            records_processed: None,
        }
    }

    /// Create a successful result carrying a payload.
    pub fn success_with_data(message: impl Into<String>, data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::success(message)
        }
    }

    /// Create a failed result. `message` describes the cause.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::success(message)
        }
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Record how many records the operation handled.
    pub fn with_records_processed(mut self, count: u64) -> Self {
        self.records_processed = Some(count);
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Consume the result and return its payload.
    pub fn into_data(self) -> Option<Value> {
        self.data
    }

    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    pub fn records_processed(&self) -> Option<u64> {
        self.records_processed
    }

    /// Whether the result carries a non-empty payload.
    ///
    /// `null`, empty arrays, empty objects and empty strings count as empty.
    pub fn has_data(&self) -> bool {
        match &self.data {
            None | Some(Value::Null) => false,
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    /// Reduce independent check results into one.
    ///
    /// The combined result succeeds iff every child succeeded. On failure its
    /// message is the failed children's messages joined by `"; "`.
    pub fn combine(results: Vec<Self>) -> Self {
        let total = results.len();
        let failures: Vec<&str> = results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.message.as_str())
            .collect();
        let failed = failures.len();

        let combined = if failures.is_empty() {
            Self::success(format!("All {total} checks passed"))
        } else {
            Self::failure(failures.join("; "))
        };

        let children: Vec<Value> = results
            .iter()
            .map(|r| serde_json::json!({ "success": r.success, "message": r.message }))
            .collect();

        combined
            .with_metadata("checks_total", Value::from(total))
            .with_metadata("checks_failed", Value::from(failed))
            .with_metadata("checks", Value::Array(children))
    }

    /// Reduce per-item send results from one batch into a single result.
    ///
    /// A partial failure is reported as one failed result whose message
    /// carries the succeeded/failed counts; successful items are still
    /// counted in `records_processed`. A batch where every item failed is
    /// reported as a total failure instead.
    pub fn aggregate_batch(results: Vec<Self>) -> Self {
        let total = results.len();
        let succeeded = results.iter().filter(|r| r.success).count();
        let failed = total - succeeded;

        let result = if failed == 0 {
            Self::success(format!("Batch delivered: {succeeded} succeeded, 0 failed"))
        } else {
            let first_error = results
                .iter()
                .find(|r| !r.success)
                .map(|r| r.message.clone())
                .unwrap_or_default();
            let err = if succeeded == 0 {
                AdapterError::BatchFailure { failed }
            } else {
                AdapterError::PartialBatchFailure { succeeded, failed }
            };
            Self::failure(err.to_string())
                .with_metadata("error_kind", Value::from(err.kind()))
                .with_metadata("first_error", Value::String(first_error))
        };

        result
            .with_metadata("succeeded", Value::from(succeeded))
            .with_metadata("failed", Value::from(failed))
            .with_records_processed(succeeded as u64)
    }
}
