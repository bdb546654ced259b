// Run with:  cargo bench --bench render_frame

use core::convert::Infallible;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use embassy_time::Instant;
use max72xx_matrix::command::Burst;
use max72xx_matrix::interface::ChainInterface;
use max72xx_matrix::transform::PhysicalFrame;
use max72xx_matrix::{Canvas, ChainDirection, MatrixDisplay, Orientation, Topology};
use std::hint::black_box;

const CHIPS: usize = 32;

/// Walks every packet of a burst without touching hardware.
struct NullInterface;

impl ChainInterface for NullInterface {
    type Error = Infallible;

    fn write_burst<const N: usize>(&mut self, burst: &Burst<'_, N>) -> Result<(), Infallible> {
        for latch in burst.latches() {
            for packet in latch.shift_order() {
                black_box(packet.to_bytes());
            }
        }
        Ok(())
    }
}

const ORIENTATIONS: &[(&str, Orientation)] = &[
    (
        "identity",
        Orientation {
            row_column_swapped: false,
            reverse_rows: false,
            reverse_columns: false,
        },
    ),
    (
        "all_flags",
        Orientation {
            row_column_swapped: true,
            reverse_rows: true,
            reverse_columns: true,
        },
    ),
];

fn render_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_frame");
    group.throughput(Throughput::Elements(CHIPS as u64));

    for (case, orientation) in ORIENTATIONS {
        let topology = Topology::new(CHIPS, ChainDirection::Right, *orientation).unwrap();
        let mut canvas = Canvas::<CHIPS>::new(&topology).unwrap();
        canvas.fill(true);

        group.bench_with_input(BenchmarkId::new("transform", case), &canvas, |b, canvas| {
            b.iter(|| black_box(PhysicalFrame::render(black_box(canvas))));
        });

        group.bench_with_input(BenchmarkId::new("refresh", case), &topology, |b, topology| {
            let mut display = MatrixDisplay::<_, CHIPS>::new(NullInterface, *topology).unwrap();
            display.fill(true);
            let mut now = 0;

            b.iter(|| {
                now += 1;
                black_box(display.refresh(Instant::from_millis(now)))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, render_frame);
criterion_main!(benches);
