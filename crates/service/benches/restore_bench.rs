use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use serde_json::json;
use service::record::ConfigRecord;
use service::restore::merge::deep_merge;
use service::restore::restore;
use service::store::mock::RecordingStore;

fn records(n: usize) -> Vec<ConfigRecord> {
    (0..n)
        .map(|i| {
            ConfigRecord::try_from(json!({
                "key": format!("entry_{}", i % 50),
                "value": {"enabled": i % 2 == 0, "limits": {"rps": i, "burst": i * 2}},
            }))
            .unwrap()
        })
        .collect()
}

fn bench_deep_merge(c: &mut Criterion) {
    let base = json!({"a": {"b": {"c": 1, "d": [1, 2, 3]}, "e": "x"}, "f": 2});
    let patch = json!({"a": {"b": {"c": 9}, "g": true}, "h": null});
    let (base, patch) = (base.as_object().unwrap().clone(), patch.as_object().unwrap().clone());

    c.bench_function("deep_merge_nested", |b| {
        b.iter(|| deep_merge(&base, &patch));
    });
}

fn bench_restore(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
    let input = records(500);

    for strategy in ["replace", "merge", "keep"] {
        c.bench_function(&format!("restore_500_{strategy}"), |b| {
            b.to_async(&rt).iter(|| async {
                let store = Arc::new(RecordingStore::new());
                restore(store, &input, strategy).await.unwrap();
            });
        });
    }
}

criterion_group!(benches, bench_deep_merge, bench_restore);
criterion_main!(benches);
