//! Hot-path benchmarks for the debouncer

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use projrelay_core::{NotificationPayload, NotificationSink, ProviderRegistry, RawChangeKind, SinkError};
use projrelay_watcher::{DebounceConfig, Debouncer, NotifierContext};
use std::sync::Arc;

struct NullSink;

impl NotificationSink for NullSink {
    fn emit(&self, _: &NotificationPayload) -> Result<(), SinkError> {
        Ok(())
    }
}

fn bench_on_change(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_time()
        .build()
        .unwrap();

    // Long window so every iteration after the first coalesces
    let debouncer = Debouncer::with_handle(
        NotifierContext::new(ProviderRegistry::new(), Arc::new(NullSink)),
        DebounceConfig::with_millis(60_000),
        runtime.handle().clone(),
    );

    c.bench_function("on_change_coalesced", |b| {
        b.iter(|| debouncer.on_change(black_box("src/App/App.csproj"), RawChangeKind::Changed));
    });

    let paths: Vec<String> = (0..1024).map(|i| format!("src/P{}/P{}.csproj", i, i)).collect();
    c.bench_function("on_change_distinct_keys", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % paths.len();
            debouncer.on_change(black_box(&paths[i]), RawChangeKind::Changed)
        });
    });

    c.bench_function("on_change_ignored", |b| {
        b.iter(|| debouncer.on_change(black_box("src/App/Program.cs"), RawChangeKind::Unrelated));
    });
}

criterion_group!(benches, bench_on_change);
criterion_main!(benches);
