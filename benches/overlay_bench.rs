//! Benchmarks for coordinate composition, overlay building and edit collection.
//!
//! Run with: `cargo bench --bench overlay_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pdfedit::{collect_edits, DocumentLayout, ElementId, Matrix, RasterImage, TextItem, Viewport};

const LETTER: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// A page of `count` text runs laid out as lines, every tenth one blank.
fn generate_items(count: usize) -> Vec<TextItem> {
    (0..count)
        .map(|i| {
            let text = if i % 10 == 9 {
                "   ".to_string()
            } else {
                format!("Line {i} of the benchmark page")
            };
            let x = 72.0 + (i % 3) as f64 * 150.0;
            let y = 720.0 - (i / 3) as f64 * 14.0;
            TextItem::new(text, Matrix::new(12.0, 0.0, 0.0, 12.0, x, y), 140.0, 12.0)
        })
        .collect()
}

fn build_layout(viewport: &Viewport, items: &[TextItem]) -> DocumentLayout {
    let mut layout = DocumentLayout::new();
    let page = layout.push_page(viewport, RasterImage::default());
    layout.add_items(page, viewport, items);
    layout
}

fn bench_compose(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose");

    let viewport = Viewport::new(LETTER, 1.5, 0).clone_with(true).transform;
    let item = Matrix::new(12.0, 0.0, 0.0, 12.0, 72.0, 700.0);
    group.bench_function("upright", |b| {
        b.iter(|| black_box(black_box(viewport).compose(black_box(&item))));
    });

    let rotated = Viewport::new(LETTER, 1.5, 90).clone_with(true).transform;
    let skewed = Matrix::new(10.0, 2.0, -2.0, 10.0, 300.0, 400.0);
    group.bench_function("rotated_skewed", |b| {
        b.iter(|| black_box(black_box(rotated).compose(black_box(&skewed))));
    });

    group.finish();
}

fn bench_add_items(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_items");
    let viewport = Viewport::new(LETTER, 1.5, 0);

    for &count in &[10_usize, 100, 1_000] {
        let items = generate_items(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &items, |b, items| {
            b.iter(|| black_box(build_layout(&viewport, black_box(items))));
        });
    }

    group.finish();
}

fn bench_collect_edits(c: &mut Criterion) {
    let mut group = c.benchmark_group("collect_edits");
    let viewport = Viewport::new(LETTER, 1.5, 0);

    for &count in &[100_usize, 1_000, 10_000, 50_000] {
        let mut layout = build_layout(&viewport, &generate_items(count));
        // Touch every fifth element.
        let owners: Vec<ElementId> = layout.records().iter().map(|r| r.owner).step_by(5).collect();
        for id in owners {
            layout.set_text(id, "edited");
        }

        group.throughput(Throughput::Elements(layout.records().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &layout, |b, layout| {
            b.iter(|| black_box(collect_edits(layout.records(), black_box(layout))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compose, bench_add_items, bench_collect_edits);
criterion_main!(benches);
