//! Restore configuration records into the core store.
//!
//! A run is linear: load and validate the input, resolve the strategy into an
//! importer, then feed records to it one at a time in input order. The first
//! failing record stops the run; earlier writes are kept.

pub mod errors;
pub mod importers;
pub mod input;
pub mod merge;
pub mod strategy;

use std::sync::Arc;

use tracing::{info, instrument};

use crate::record::ConfigRecord;
use crate::store::CoreStore;
use errors::RestoreError;
use strategy::{create_importer, ImportOutcome, Strategy};

pub use input::{load_records, parse_records, InputSource};

/// Tally of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    pub strategy: Strategy,
    pub processed: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl RestoreReport {
    fn new(strategy: Strategy) -> Self {
        Self { strategy, processed: 0, created: 0, updated: 0, unchanged: 0 }
    }

    fn record(&mut self, outcome: ImportOutcome) {
        self.processed += 1;
        match outcome {
            ImportOutcome::Created => self.created += 1,
            ImportOutcome::Updated => self.updated += 1,
            ImportOutcome::Unchanged => self.unchanged += 1,
        }
    }

    /// Human-readable completion message.
    pub fn summary(&self) -> String {
        format!("Successfully imported {} entries using the {} strategy.", self.processed, self.strategy)
    }
}

/// Import `records` sequentially with the named strategy.
///
/// The strategy is resolved before the first record is looked at. Each
/// `import` is awaited before the next begins, so duplicate keys in the input
/// resolve in input order.
#[instrument(skip_all, fields(strategy = %strategy, collection = store.collection(), records = records.len()))]
pub async fn restore(
    store: Arc<dyn CoreStore>,
    records: &[ConfigRecord],
    strategy: &str,
) -> Result<RestoreReport, RestoreError> {
    let importer = create_importer(strategy, store)?;
    let mut report = RestoreReport::new(importer.strategy());

    for record in records {
        let outcome = importer.import(record).await?;
        report.record(outcome);
    }

    info!(
        event = "restore_finished",
        processed = report.processed,
        created = report.created,
        updated = report.updated,
        unchanged = report.unchanged,
        "restore completed"
    );
    Ok(report)
}

/// Parse raw input and restore it. Invalid input fails before any store call.
pub async fn restore_bytes(
    store: Arc<dyn CoreStore>,
    bytes: &[u8],
    strategy: &str,
) -> Result<RestoreReport, RestoreError> {
    let records = parse_records(bytes)?;
    restore(store, &records, strategy).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mock::{RecordingStore, StoreCall};
    use serde_json::json;

    #[tokio::test]
    async fn empty_input_makes_no_store_calls() -> Result<(), anyhow::Error> {
        let store = Arc::new(RecordingStore::new());
        let report = restore_bytes(store.clone(), b"[]", "replace").await?;
        assert_eq!(report.processed, 0);
        assert_eq!(report.summary(), "Successfully imported 0 entries using the replace strategy.");
        assert!(store.calls().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn wrong_shape_fails_before_store_access() {
        let store = Arc::new(RecordingStore::new());
        let res = restore_bytes(store.clone(), br#""not an array""#, "replace").await;
        assert!(matches!(res, Err(RestoreError::InvalidInput(_))));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_strategy_fails_before_first_record() {
        let store = Arc::new(RecordingStore::new());
        let res = restore_bytes(store.clone(), br#"[{"key":"a"},{"key":"b"}]"#, "foo").await;
        assert!(matches!(res, Err(RestoreError::UnsupportedStrategy(ref s)) if s == "foo"));
        assert!(store.calls().is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn duplicate_keys_replace_last_wins() -> Result<(), anyhow::Error> {
        let store = Arc::new(RecordingStore::new());
        let input = br#"[{"key":"a","v":1},{"key":"a","v":2}]"#;
        let report = restore_bytes(store.clone(), input, "replace").await?;
        assert_eq!(store.get("a").unwrap().fields()["v"], json!(2));
        assert_eq!((report.processed, report.created, report.updated), (2, 1, 1));
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_keys_keep_first_wins() -> Result<(), anyhow::Error> {
        let store = Arc::new(RecordingStore::new());
        let input = br#"[{"key":"a","v":1},{"key":"a","v":2}]"#;
        let report = restore_bytes(store.clone(), input, "keep").await?;
        assert_eq!(store.get("a").unwrap().fields()["v"], json!(1));
        assert_eq!((report.processed, report.created, report.unchanged), (2, 1, 1));
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_keys_merge_stack_in_order() -> Result<(), anyhow::Error> {
        let store = Arc::new(RecordingStore::new());
        let input = br#"[{"key":"a","cfg":{"x":1}},{"key":"a","cfg":{"y":2}}]"#;
        restore_bytes(store.clone(), input, "merge").await?;
        assert_eq!(store.get("a").unwrap().into_value(), json!({"key":"a","cfg":{"x":1,"y":2}}));
        Ok(())
    }

    #[tokio::test]
    async fn records_are_processed_in_input_order() -> Result<(), anyhow::Error> {
        let store = Arc::new(RecordingStore::new());
        restore_bytes(store.clone(), br#"[{"key":"b"},{"key":"a"}]"#, "keep").await?;
        assert_eq!(
            store.calls(),
            vec![
                StoreCall::Count("b".into()),
                StoreCall::Create("b".into()),
                StoreCall::Count("a".into()),
                StoreCall::Create("a".into()),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn first_failure_halts_batch_and_keeps_prior_writes() {
        let store = Arc::new(RecordingStore::new());
        store.fail_on("b");
        let input = br#"[{"key":"a"},{"key":"b"},{"key":"c"}]"#;
        let res = restore_bytes(store.clone(), input, "replace").await;

        assert!(matches!(res, Err(RestoreError::Store(_))));
        assert!(store.get("a").is_some());
        assert!(store.get("c").is_none());
        assert!(!store.calls().contains(&StoreCall::Count("c".into())));
    }

    #[tokio::test]
    async fn report_counts_every_outcome() -> Result<(), anyhow::Error> {
        let existing = ConfigRecord::try_from(json!({"key": "a", "v": 0})).unwrap();
        let store = Arc::new(RecordingStore::with_entries([existing]));
        let input = br#"[{"key":"a","v":1},{"key":"b"},{"key":"c"}]"#;
        let report = restore_bytes(store.clone(), input, "merge").await?;
        assert_eq!(
            report,
            RestoreReport { strategy: Strategy::Merge, processed: 3, created: 2, updated: 1, unchanged: 0 }
        );
        assert_eq!(report.summary(), "Successfully imported 3 entries using the merge strategy.");
        Ok(())
    }
}
