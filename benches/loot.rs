use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use loottables::{
    CatalogIndex, ContainerProfile, CumulativeTable, GroupEntry, GroupImport, ItemDefinition,
    LootConfig, LootEngine, LootEntry, LootGroup, MemoryCatalog, Range, Rarity, SlotContainer,
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

fn catalog(n: usize) -> MemoryCatalog {
    MemoryCatalog::from_items((0..n).map(|i| {
        let tier = Rarity::ALL[i % Rarity::ALL.len()];
        ItemDefinition::new(format!("item{i}"), format!("Item {i}"), tier).with_blueprint(i % 3 == 0)
    }))
}

fn config(n: usize) -> LootConfig {
    let mut rng = Pcg32::seed_from_u64(777);
    let mut group = LootGroup::default();
    for i in 0..n.min(64) {
        group.items.insert(
            format!("item{i}"),
            GroupEntry::new(0.1 + rng.random::<f64>(), Range::new(1, 3)),
        );
    }

    let mut profile = ContainerProfile {
        item_count: Range::new(4, 8),
        scrap: Range::new(5, 20),
        ..ContainerProfile::default()
    };
    for i in 0..n {
        profile
            .items
            .insert(format!("item{i}"), LootEntry::new(Range::new(1, 10)));
        if i % 3 == 0 {
            profile
                .items
                .insert(format!("item{i}.blueprint"), LootEntry::default());
        }
    }
    profile.groups.push(GroupImport::new("bench", 30.0));

    let mut cfg = LootConfig::default();
    cfg.groups.insert("bench".into(), group);
    cfg.containers.insert("crate".into(), profile);
    cfg
}

fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");
    for &n in &[8usize, 64, 256, 1024] {
        let cat = catalog(n);
        let cfg = config(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("rebuild_n={n}"), |b| {
            b.iter(|| {
                let mut idx = CatalogIndex::new();
                idx.rebuild(black_box(&cat), black_box(&cfg));
                black_box(idx)
            });
        });
    }
    group.finish();
}

fn bench_group_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("cumulative_sample");
    const DRAWS_PER_ITER: usize = 1024;

    for &n in &[2usize, 8, 64, 256, 1024] {
        let table = CumulativeTable::new((0..n).map(|_| 100.0 / n as f64));
        group.throughput(Throughput::Elements(DRAWS_PER_ITER as u64));
        group.bench_function(format!("index_for_roll_n={n}"), |b| {
            b.iter_batched_ref(
                || Pcg32::seed_from_u64(999),
                |rng| {
                    let mut s = 0usize;
                    for _ in 0..DRAWS_PER_ITER {
                        let roll = rng.random_range(0.0..100.0);
                        s ^= table.index_for_roll(roll).unwrap_or(0);
                    }
                    black_box(s)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill");
    for &n in &[8usize, 64, 1024] {
        let mut engine = LootEngine::new(catalog(n), config(n), Pcg32::seed_from_u64(1001));
        let mut container = SlotContainer::default();
        group.bench_function(format!("fill_n={n}"), |b| {
            b.iter(|| black_box(engine.fill("crate", &mut container)));
        });
    }
    group.finish();
}

criterion_group!(loot, bench_index_build, bench_group_sample, bench_fill);
criterion_main!(loot);
