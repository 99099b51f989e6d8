//! Export the whole core store as a JSON array, the input format of `restore`.

use tracing::{debug, info, instrument};

use crate::errors::ServiceError;
use crate::pagination::pages;
use crate::record::ConfigRecord;
use crate::store::CoreStore;

/// Rows fetched per store round trip.
pub const DUMP_CHUNK_SIZE: u32 = 100;

/// Read every entry, ordered by key, in chunks of `DUMP_CHUNK_SIZE`.
#[instrument(skip_all, fields(collection = store.collection()))]
pub async fn dump(store: &dyn CoreStore) -> Result<Vec<ConfigRecord>, ServiceError> {
    let total = store.count_all().await?;
    let mut out = Vec::with_capacity(total as usize);

    for page in pages(total, DUMP_CHUNK_SIZE) {
        let chunk = store.list_page(page.offset, page.limit).await?;
        debug!(offset = page.offset, rows = chunk.len(), "dump_page_fetched");
        out.extend(chunk);
    }

    info!(event = "dump_finished", entries = out.len(), "dump completed");
    Ok(out)
}

/// Serialize records as a JSON array, compact or pretty-printed.
pub fn render(records: &[ConfigRecord], pretty: bool) -> Result<String, ServiceError> {
    let res = if pretty { serde_json::to_string_pretty(records) } else { serde_json::to_string(records) };
    res.map_err(|e| ServiceError::Validation(format!("cannot serialize dump: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restore;
    use crate::store::mock::{RecordingStore, StoreCall};
    use serde_json::json;
    use std::sync::Arc;

    fn record(key: &str) -> ConfigRecord {
        ConfigRecord::try_from(json!({"key": key, "value": {"k": key}})).unwrap()
    }

    #[tokio::test]
    async fn empty_store_dumps_empty_array() -> Result<(), anyhow::Error> {
        let store = RecordingStore::new();
        let records = dump(&store).await?;
        assert_eq!(render(&records, false)?, "[]");
        assert_eq!(store.calls(), vec![StoreCall::CountAll]);
        Ok(())
    }

    #[tokio::test]
    async fn dump_pages_through_large_store() -> Result<(), anyhow::Error> {
        let store = RecordingStore::with_entries((0..250).map(|i| record(&format!("k{i:03}"))));
        let records = dump(&store).await?;
        assert_eq!(records.len(), 250);
        assert_eq!(records.first().unwrap().key(), "k000");
        assert_eq!(records.last().unwrap().key(), "k249");
        let pages: Vec<_> = store.calls().into_iter().filter(|c| matches!(c, StoreCall::ListPage { .. })).collect();
        assert_eq!(
            pages,
            vec![
                StoreCall::ListPage { offset: 0, limit: 100 },
                StoreCall::ListPage { offset: 100, limit: 100 },
                StoreCall::ListPage { offset: 200, limit: 100 },
            ]
        );
        Ok(())
    }

    #[test]
    fn pretty_rendering_is_indented() {
        let out = render(&[record("a")], true).unwrap();
        assert!(out.starts_with("[\n  {"));
        let compact = render(&[record("a")], false).unwrap();
        assert_eq!(compact, r#"[{"key":"a","value":{"k":"a"}}]"#);
    }

    #[test]
    fn dump_output_restores_into_fresh_store() {
        tokio_test::block_on(async {
            let source = RecordingStore::with_entries([record("b"), record("a")]);
            let text = render(&dump(&source).await.unwrap(), false).unwrap();

            let target = Arc::new(RecordingStore::new());
            let report = restore::restore_bytes(target.clone(), text.as_bytes(), "replace").await.unwrap();
            assert_eq!(report.processed, 2);
            assert_eq!(target.get("a"), source.get("a"));
            assert_eq!(target.get("b"), source.get("b"));
        });
    }
}
