use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mimic_api_core::DetectionSample;
use mimic_retarget_core::Engine;
use mimic_rig_core::{resolve, AliasTable, RigGraph};

fn bound_engine() -> Engine {
    let json = mimic_test_fixtures::rigs::json("rpm_avatar").unwrap();
    let graph = RigGraph::from_json(&json).unwrap();
    let rig = resolve(&graph, &AliasTable::default()).unwrap();
    let mut engine = Engine::default();
    engine.bind(rig);
    engine
}

fn bench_apply(c: &mut Criterion) {
    let samples: Vec<DetectionSample> =
        mimic_test_fixtures::samples::load("head_and_hands").unwrap();
    let mut engine = bound_engine();

    c.bench_function("retarget_apply_stream", |b| {
        b.iter(|| {
            for sample in &samples {
                black_box(engine.apply(black_box(sample)));
            }
        })
    });
}

fn bench_write_batch(c: &mut Criterion) {
    let samples: Vec<DetectionSample> =
        mimic_test_fixtures::samples::load("head_and_hands").unwrap();
    let mut engine = bound_engine();
    if let Some(last) = samples.last() {
        engine.apply(last);
    }

    c.bench_function("pose_to_write_batch", |b| {
        b.iter(|| black_box(engine.pose().to_write_batch()))
    });
}

fn bench_resolve(c: &mut Criterion) {
    let json = mimic_test_fixtures::rigs::json("rpm_avatar").unwrap();
    let graph = RigGraph::from_json(&json).unwrap();
    let table = AliasTable::default();

    c.bench_function("resolve_rpm_rig", |b| {
        b.iter(|| black_box(resolve(black_box(&graph), &table).unwrap()))
    });
}

criterion_group!(benches, bench_apply, bench_write_batch, bench_resolve);
criterion_main!(benches);
