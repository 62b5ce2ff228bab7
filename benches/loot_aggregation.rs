use abyssal_stats::loot::{parse_loot_text, value_loot_text};
use abyssal_stats::types::PriceLookup;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const ITEMS: &[&str] = &[
    "Compressed Arkonor*",
    "Compressed Spodumain*",
    "Tetryon Exotic Plasma",
    "Mutaplasmid Residue",
    "Small Shield Booster II",
    "Triglavian Survey Database",
];

fn create_loot_text(segments: usize) -> String {
    (0..segments)
        .map(|i| format!("{} {}", ITEMS[i % ITEMS.len()], i % 50 + 1))
        .collect::<Vec<_>>()
        .join("; ")
}

fn create_prices() -> PriceLookup {
    ITEMS
        .iter()
        .enumerate()
        .map(|(i, name)| (name.replace('*', ""), (i as f64 + 1.0) * 1_000.5))
        .collect()
}

fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("loot_parse");
    let text = create_loot_text(200);

    group.bench_function("parse_200_segments", |b| {
        b.iter(|| parse_loot_text(black_box(&text)).count());
    });

    group.finish();
}

fn benchmark_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("loot_value");
    let prices = create_prices();

    for segments in [20, 200] {
        let text = create_loot_text(segments);
        group.bench_function(format!("value_{segments}_segments"), |b| {
            b.iter(|| value_loot_text(black_box(&text), &prices));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_parse, benchmark_value);
criterion_main!(benches);
