//! Per-adapter "already handled" tracking.

use dashmap::DashSet;

/// Concurrent set of item keys one adapter instance has already delivered.
#[derive(Debug, Default)]
pub struct ProcessedItems {
    keys: DashSet<String>,
}

impl ProcessedItems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key`. Returns `true` if it was not yet recorded.
    pub fn mark(&self, key: impl Into<String>) -> bool {
        self.keys.insert(key.into())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&self) {
        self.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_mark_reports_new_keys() {
        let items = ProcessedItems::new();
        assert!(items.mark("/data/in/a.csv"));
        assert!(!items.mark("/data/in/a.csv"));
        assert!(items.contains("/data/in/a.csv"));
        assert_eq!(items.len(), 1);

        items.clear();
        assert!(items.is_empty());
        assert!(!items.contains("/data/in/a.csv"));
    }

    #[tokio::test]
    async fn test_concurrent_marks_are_deduplicated() {
        let items = Arc::new(ProcessedItems::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let items = Arc::clone(&items);
            handles.push(tokio::spawn(async move {
                (0..100).filter(|i| items.mark(format!("file-{i}"))).count()
            }));
        }

        let mut inserted = 0;
        for handle in handles {
            inserted += handle.await.unwrap();
        }
        assert_eq!(inserted, 100);
        assert_eq!(items.len(), 100);
    }
}
