use blocs_atlas_core::prelude::*;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

fn generate_sizes(count: usize, min_size: u32, max_size: u32) -> Vec<Size> {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let w = rng.gen_range(min_size..=max_size);
            let h = rng.gen_range(min_size..=max_size);
            Size::new(w, h)
        })
        .collect()
}

fn bench_pack_rects(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack_rects");
    let cfg = AtlasConfig::builder().size(4096).expand(1).border(2).build();

    for count in [100, 1000, 3000] {
        let sizes = generate_sizes(count, 8, 64);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &sizes, |b, sizes| {
            b.iter(|| black_box(pack_rects(sizes, &cfg).ok()));
        });
    }

    group.finish();
}

fn bench_pack_images(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack_images");
    group.sample_size(20);

    for expand in [0u32, 2] {
        let cfg = AtlasConfig::builder().size(2048).expand(expand).build();
        let inputs: Vec<PixelImage> = generate_sizes(500, 8, 48)
            .into_iter()
            .enumerate()
            .filter_map(|(i, s)| {
                PixelImage::filled(format!("tex_{}", i), s.w, s.h, [200, 100, 50, 255]).ok()
            })
            .collect();
        group.bench_with_input(BenchmarkId::new("expand", expand), &inputs, |b, inputs| {
            b.iter(|| black_box(pack_images(inputs, &cfg).ok().map(|o| o.rgba.len())));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pack_rects, bench_pack_images);
criterion_main!(benches);
