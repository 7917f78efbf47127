//! Placement throughput benchmarks.
//!
//! Measures the cost of the measure-place-evict cycle as comment streams
//! grow, and of projecting a full engine for one frame.
//!
//! Run with: cargo bench --bench placement_benchmark

#![allow(missing_docs)] // criterion macros generate undocumented items

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use danmaku::engine::{ContainerGeometry, PlacementEngine};
use danmaku::integration::Overlay;
use danmaku::model::{Comment, CommentElement, CommentId, RawComment};
use danmaku::projector::project;
use danmaku::view::TextHeightOracle;

const CONTAINER: ContainerGeometry = ContainerGeometry {
    height: 50,
    content_offset: 1,
};

/// Deterministic pseudo-random heights between 1 and 8.
fn heights(count: usize) -> Vec<u16> {
    (0..count).map(|i| ((i * 7 + 3) % 8 + 1) as u16).collect()
}

fn comments(count: usize) -> Vec<Comment> {
    (0..count)
        .map(|i| {
            Comment::new(
                CommentId::new(format!("bench-{i}")).expect("valid id"),
                vec![CommentElement::text("benchmark comment")],
            )
        })
        .collect()
}

fn bench_engine_placement(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_placement");

    for count in [100usize, 1_000, 10_000] {
        let heights = heights(count);
        let comments = comments(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                let mut engine = PlacementEngine::new();
                for (comment, height) in comments.iter().zip(&heights) {
                    let _ = engine.offer(comment.clone());
                    let _ = black_box(engine.resolve_height(*height, CONTAINER));
                }
                engine
            });
        });
    }

    group.finish();
}

fn bench_overlay_delivery(c: &mut Criterion) {
    let texts: Vec<String> = (0..1_000)
        .map(|i| "word ".repeat(i % 30 + 1))
        .collect();

    c.bench_function("overlay_deliver_1000_wrapped", |b| {
        b.iter(|| {
            let mut overlay = Overlay::new(TextHeightOracle::new(40, 0), CONTAINER);
            for text in &texts {
                let raw = RawComment::new(vec![CommentElement::text(text.as_str())]);
                let _ = black_box(overlay.deliver(raw));
            }
            overlay.stats()
        });
    });
}

fn bench_projection(c: &mut Criterion) {
    let mut engine = PlacementEngine::new();
    for (comment, height) in comments(500).into_iter().zip(heights(500)) {
        let _ = engine.offer(comment);
        let _ = engine.resolve_height(height, CONTAINER);
    }

    c.bench_function("project_full_engine", |b| {
        b.iter(|| black_box(project(&engine, CONTAINER)));
    });
}

criterion_group!(
    benches,
    bench_engine_placement,
    bench_overlay_delivery,
    bench_projection
);
criterion_main!(benches);
