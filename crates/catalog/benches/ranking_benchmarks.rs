use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{Duration, TimeZone, Utc};
use shopfront_catalog::{
    rank_by_affinity, rank_by_relevance, Brand, Category, PriceBand, ProductRecord,
    RelevanceSecondary, SortMode,
};
use shopfront_core::{BrandId, CategoryId, Price, ProductId};

/// Synthetic catalog with a spread of brands, categories, prices, and ratings.
fn catalog(size: usize) -> Vec<ProductRecord> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let brands: Vec<Brand> = (1..=20)
        .map(|i| Brand::new(BrandId::new(i), format!("Brand {i}")))
        .collect();
    let categories: Vec<Category> = (1..=10)
        .map(|i| Category::new(CategoryId::new(i), format!("Category {i}"), format!("category-{i}")))
        .collect();

    (0..size)
        .map(|i| {
            let mut r = ProductRecord::new(
                ProductId::new(i as i64 + 1),
                format!("Pro Device {i}"),
                Price::from_cents(1_000 + (i as u64 * 7_919) % 200_000),
                base + Duration::minutes(i as i64),
            )
            .with_brand(&brands[i % brands.len()])
            .with_category(&categories[i % categories.len()]);
            r.rating = (i % 50) as f64 / 10.0;
            r.review_count = (i % 300) as u32;
            r.featured = i % 11 == 0;
            r
        })
        .collect()
}

fn bench_sort_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_modes");
    for size in [100usize, 1_000, 10_000] {
        let rows = catalog(size);
        group.throughput(Throughput::Elements(size as u64));
        for mode in [SortMode::Featured, SortMode::PriceLow, SortMode::Rating] {
            group.bench_with_input(BenchmarkId::new(mode.as_str(), size), &rows, |b, rows| {
                b.iter(|| {
                    let mut rows = rows.clone();
                    mode.sort(&mut rows);
                    black_box(rows);
                });
            });
        }
    }
    group.finish();
}

fn bench_relevance(c: &mut Criterion) {
    let mut group = c.benchmark_group("relevance");
    for size in [100usize, 1_000, 10_000] {
        let rows = catalog(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &rows, |b, rows| {
            b.iter(|| black_box(rank_by_relevance(rows.clone(), "pro device 1", RelevanceSecondary::RatingDesc)));
        });
    }
    group.finish();
}

fn bench_affinity(c: &mut Criterion) {
    let mut group = c.benchmark_group("affinity");
    for size in [100usize, 1_000, 10_000] {
        let rows = catalog(size);
        let source = rows[0].clone();
        let band = PriceBand::around(source.price, PriceBand::RELATED_PERCENT);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &rows, |b, rows| {
            b.iter(|| black_box(rank_by_affinity(&source, &band, rows.clone(), 6)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sort_modes, bench_relevance, bench_affinity);
criterion_main!(benches);
