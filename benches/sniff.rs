use avif_stream::{Dimensions, classify, resolve};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn headers() -> Vec<(&'static str, Vec<u8>)> {
    let mut avif = b"\x00\x00\x00\x1cftypavif\x00\x00\x00\x00avifmif1".to_vec();
    avif.resize(64, 0);
    let mut png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    png.resize(64, 0);
    vec![("avif", avif), ("png", png), ("unknown", vec![0x5A; 64])]
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    for (name, data) in headers() {
        group.bench_function(name, |b| b.iter(|| classify(black_box(&data))));
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let intrinsic = Dimensions::new(4032, 3024);
    c.bench_function("resolve_width_only", |b| {
        b.iter(|| resolve(black_box(intrinsic), black_box(Some(640.0)), None))
    });
}

criterion_group!(benches, bench_classify, bench_resolve);
criterion_main!(benches);
