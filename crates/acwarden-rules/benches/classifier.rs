//! Benchmarks for device classification and duration formatting.

use acwarden_rules::{classify, format_duration, DeviceFingerprint, Policy};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const PLAYER_ID: &str = "A1B2C3D4E5F6A7B8C";

fn quest() -> DeviceFingerprint {
    DeviceFingerprint {
        device_model: Some("Oculus Quest 2".into()),
        platform: Some("Android".into()),
        device_type: Some("VR".into()),
        data_path: Some("/storage/emulated/HW-123/files".into()),
        oculus_custom_id: Some("OCULUS4".into()),
        oculus_user_id: Some("987654321".into()),
        ..Default::default()
    }
}

fn vbox_desktop() -> DeviceFingerprint {
    DeviceFingerprint {
        device_model: Some("VBox Harddisk".into()),
        platform: Some("WindowsPlayer".into()),
        device_type: Some("Desktop".into()),
        custom_id: Some("OCULUS0".into()),
        ..Default::default()
    }
}

fn benchmark_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("Device Classification");
    let policy = Policy::default();

    let allowed = quest();
    group.bench_function("allowed_quest", |b| {
        b.iter(|| black_box(classify(black_box(&allowed), PLAYER_ID, &policy)))
    });

    let denied = vbox_desktop();
    group.bench_function("denied_vbox_desktop", |b| {
        b.iter(|| black_box(classify(black_box(&denied), "ABCDE", &policy)))
    });

    group.finish();
}

fn benchmark_duration(c: &mut Criterion) {
    c.bench_function("format_duration", |b| {
        b.iter(|| black_box(format_duration(black_box(337.25))))
    });
}

criterion_group!(benches, benchmark_classify, benchmark_duration);
criterion_main!(benches);
