use criterion::{criterion_group, criterion_main};

mod report;

criterion_group!(
    benches,
    report::bench_snapshot_encode,
    report::bench_ack_scan,
    report::bench_push_encode
);
criterion_main!(benches);
