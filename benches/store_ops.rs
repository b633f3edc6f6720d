use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use firefly::{Catalog, CatalogConfig, InMemoryStorageArea, StorageArea, StoryDraft, StoryId};

fn catalog_with_stories(n: usize) -> (Catalog, Vec<StoryId>) {
    let area: Arc<dyn StorageArea> = Arc::new(InMemoryStorageArea::new());
    let config = CatalogConfig {
        seed_defaults: false,
        ..CatalogConfig::default()
    };
    let catalog = Catalog::new(area, config).expect("default config is valid");
    let ids = (0..n)
        .map(|i| {
            catalog
                .stories()
                .add(StoryDraft::new(format!("story {i}"), "bedtime").duration(5))
                .expect("unbounded area accepts writes")
                .id
        })
        .collect();
    (catalog, ids)
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("story_add");
    for size in [10usize, 100, 1000] {
        group.throughput(Throughput::Elements(1));
        group.bench_function(format!("into_{size}"), |b| {
            b.iter_batched(
                || catalog_with_stories(size).0,
                |catalog| {
                    catalog
                        .stories()
                        .add(StoryDraft::new("bench", "bedtime"))
                        .expect("add");
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_record_view(c: &mut Criterion) {
    let (catalog, ids) = catalog_with_stories(500);
    let target = ids[ids.len() / 2].clone();
    c.bench_function("story_record_view_500", |b| {
        b.iter(|| catalog.stories().record_view(&target).expect("present"));
    });
}

fn bench_reload(c: &mut Criterion) {
    let (catalog, _) = catalog_with_stories(500);
    c.bench_function("story_reload_500", |b| {
        b.iter(|| catalog.stories().reload().expect("reload"));
    });
}

fn bench_favorites_resolve(c: &mut Criterion) {
    let (catalog, ids) = catalog_with_stories(500);
    for id in ids.iter().step_by(5) {
        catalog.favorites().add(id).expect("favorite");
    }
    c.bench_function("favorites_resolve_100_of_500", |b| {
        b.iter(|| catalog.favorites().resolve().expect("resolve"));
    });
}

criterion_group!(benches, bench_add, bench_record_view, bench_reload, bench_favorites_resolve);
criterion_main!(benches);
