//! Benchmarks for the Augment operator catalog and batch runner.
//!
//! Run with: cargo bench -p augment-core

use std::sync::Arc;

use augment_core::pipeline::NoProgress;
use augment_core::{Augmenter, BatchOptions, Config, OperatorId, ParameterSet, Registry, SourceImage};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn test_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    })
}

fn benchmark_operators(c: &mut Criterion) {
    let img = test_image(256, 256);
    let registry = Registry::standard();
    let params = ParameterSet::default();
    let mut group = c.benchmark_group("operator_256px");

    for id in OperatorId::ALL {
        let Some(op) = registry.build(id, &params) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::from_parameter(id), &img, |b, img| {
            let mut rng = StdRng::seed_from_u64(7);
            b.iter(|| {
                let _ = op.apply(black_box(img), &mut rng);
            })
        });
    }
    group.finish();
}

fn benchmark_batch(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let augmenter = Augmenter::new(&Config::default());
    let params = ParameterSet::default();
    let options = BatchOptions {
        seed: Some(1),
        ..BatchOptions::default()
    };
    let images: Vec<SourceImage> = (0..4)
        .map(|i| SourceImage::new(format!("img{i}.png"), test_image(128, 128)))
        .collect();
    let ops = [
        OperatorId::HFlip,
        OperatorId::Rotate,
        OperatorId::Blur,
        OperatorId::HsvJitter,
    ];

    c.bench_function("batch_4x4_128px", |b| {
        b.iter(|| {
            let _ = rt.block_on(augmenter.run_decoded(
                black_box(images.clone()),
                &ops,
                &params,
                &options,
                Arc::new(NoProgress),
            ));
        })
    });
}

criterion_group!(benches, benchmark_operators, benchmark_batch);
criterion_main!(benches);
