use criterion::{BenchmarkId, Criterion, Throughput};
use rand::Rng;
use roomlink::notify::{MAX_PUSH_PAYLOAD_LEN, encode_push, messages};
use roomlink::report::ack;
use roomlink::report::{DeviceReportSnapshot, MAX_REPORT_LEN};
use roomlink::room::{DeviceState, RoomState};
use std::hint::black_box;

fn random_state() -> DeviceState {
    let mut rng = rand::thread_rng();
    let mut state = DeviceState {
        cleaning_required: rng.r#gen(),
        last_clean_ts_ms: rng.r#gen(),
        counters_loaded: true,
        ..DeviceState::default()
    };
    for room in state.rooms.iter_mut() {
        *room = RoomState {
            occupied: rng.r#gen(),
            use_count: rng.r#gen(),
            total_use_ms: rng.r#gen(),
            door_closed: rng.r#gen(),
        };
    }
    state
}

pub fn bench_snapshot_encode(c: &mut Criterion) {
    let state = random_state();
    let mut buf = [0u8; MAX_REPORT_LEN];
    let len = DeviceReportSnapshot::build("wc-floor2", &state, 0)
        .encode(&mut buf)
        .unwrap();

    let mut group = c.benchmark_group("snapshot");
    group.throughput(Throughput::Bytes(len as u64));
    group.bench_function("build_and_encode", |b| {
        b.iter(|| {
            let snapshot = DeviceReportSnapshot::build("wc-floor2", black_box(&state), 1_234);
            snapshot.encode(black_box(&mut buf)).unwrap()
        })
    });
    group.finish();
}

pub fn bench_ack_scan(c: &mut Criterion) {
    let padding = "x".repeat(512);
    let bodies = [
        ("leading", format!(r#"{{"ok": true, "note": "{padding}"}}"#)),
        ("trailing", format!(r#"{{"note": "{padding}", "ok": true}}"#)),
        ("nested", format!(r#"{{"data": {{"ok": true, "note": "{padding}"}}}}"#)),
    ];

    let mut group = c.benchmark_group("ack");
    for (name, body) in &bodies {
        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), body, |b, body| {
            b.iter(|| ack::acknowledges(black_box(body.as_bytes())))
        });
    }
    group.finish();
}

pub fn bench_push_encode(c: &mut Criterion) {
    let texts = [
        ("heartbeat", messages::heartbeat(true, [12, 0, 7]).as_str().to_owned()),
        ("quoted", r#"say "hi" \ to "everyone""#.repeat(8)),
    ];
    let mut buf = [0u8; MAX_PUSH_PAYLOAD_LEN];

    let mut group = c.benchmark_group("push");
    for (name, text) in &texts {
        group.bench_with_input(BenchmarkId::from_parameter(name), text, |b, text| {
            b.iter(|| encode_push("U4af4980629", black_box(text), &mut buf).unwrap())
        });
    }
    group.finish();
}
