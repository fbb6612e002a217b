mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use puma_attributes::prelude::{flatten_value_maps, AttributesValuesMap, NativeAttributeBuffers};

const SHAPE_COUNTS: [usize; 4] = [1, 16, 128, 1024];
const PER_SHAPE: usize = 12;

fn bucketing_slice_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("bucketing/from_buffers");

    for &shapes in &SHAPE_COUNTS {
        let maps = common::make_value_maps(shapes, PER_SHAPE, 0xB0C4E7);
        let flat = flatten_value_maps(&maps);
        group.throughput(common::elements_throughput(shapes * PER_SHAPE));

        group.bench_with_input(BenchmarkId::from_parameter(shapes), &shapes, |b, &n| {
            b.iter(|| {
                let maps = AttributesValuesMap::from_buffers(n, black_box(flat.buffers()));
                black_box(maps.ok());
            });
        });
    }

    group.finish();
}

fn bucketing_flatten_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("bucketing/flatten");

    for &shapes in &SHAPE_COUNTS {
        let maps = common::make_value_maps(shapes, PER_SHAPE, 0xF1A7);
        group.throughput(common::elements_throughput(shapes * PER_SHAPE));

        group.bench_with_input(BenchmarkId::from_parameter(shapes), &shapes, |b, _| {
            b.iter(|| black_box(flatten_value_maps(black_box(&maps))));
        });
    }

    group.finish();
}

fn bucketing_staging_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("bucketing/native_staging");

    for &shapes in &[16usize, 1024] {
        let flat = flatten_value_maps(&common::make_value_maps(shapes, PER_SHAPE, 0x57A9));
        group.throughput(common::elements_throughput(shapes * PER_SHAPE));

        group.bench_with_input(BenchmarkId::new("stage", shapes), &shapes, |b, _| {
            b.iter(|| black_box(NativeAttributeBuffers::from_buffers(flat.buffers()).ok()));
        });

        group.bench_with_input(BenchmarkId::new("extract", shapes), &shapes, |b, _| {
            b.iter_batched(
                || NativeAttributeBuffers::from_buffers(flat.buffers()).ok(),
                |native| black_box(native.map(|n| n.to_buffers().ok())),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = bucketing_slice_benches,
              bucketing_flatten_benches,
              bucketing_staging_benches
}
criterion_main!(benches);
