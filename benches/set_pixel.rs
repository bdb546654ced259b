// Run with:  cargo bench --bench set_pixel

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use embedded_graphics::prelude::Point;
use max72xx_matrix::{Canvas, ChainDirection, Orientation, Topology};
use std::hint::black_box;

const CHIPS: usize = 16;

fn set_pixel(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_pixel");

    for direction in [ChainDirection::Left, ChainDirection::Down] {
        let topology = Topology::new(CHIPS, direction, Orientation::default()).unwrap();
        let (width, height) = (topology.width(), topology.height());
        group.throughput(Throughput::Elements((width * height) as u64));

        group.bench_with_input(
            BenchmarkId::new("canvas", direction.as_str()),
            &topology,
            |b, topology| {
                let mut canvas = Canvas::<CHIPS>::new(topology).unwrap();

                b.iter(|| {
                    for y in 0..height {
                        for x in 0..width {
                            black_box(&mut canvas).set_pixel(
                                black_box(Point::new(x as i32, y as i32)),
                                black_box((x ^ y) & 1 == 0),
                            );
                        }
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, set_pixel);
criterion_main!(benches);
