use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{Days, NaiveDate};

use supplyline_core::{ItemId, StoreId};
use supplyline_forecast::features::engineer_features;
use supplyline_forecast::SalesObservation;
use supplyline_stock::plan_restocking;

fn sales_history(stores: u32, items: u32, days: u32) -> Vec<SalesObservation> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut observations = Vec::with_capacity((stores * items * days) as usize);
    for store in 1..=stores {
        for item in 1..=items {
            for offset in 0..days {
                observations.push(SalesObservation {
                    date: start + Days::new(u64::from(offset)),
                    store: StoreId::new(store),
                    item: ItemId::new(item),
                    // Deterministic, mildly varying quantities.
                    quantity: f64::from((store + item + offset) % 13 + 1),
                });
            }
        }
    }
    observations
}

fn bench_feature_engineering(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature_engineering");
    for days in [30u32, 60] {
        let observations = sales_history(10, 20, days);
        group.throughput(Throughput::Elements(observations.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("10_stores_20_items", days),
            &observations,
            |b, observations| b.iter(|| engineer_features(black_box(observations))),
        );
    }
    group.finish();
}

fn bench_restock_planning(c: &mut Criterion) {
    let mut group = c.benchmark_group("restock_planning");
    for keys in [100u32, 1000] {
        let forecast: Vec<(u32, f64)> = (0..keys).map(|k| (k, f64::from(k % 50) * 3.0)).collect();
        let stock: Vec<(u32, f64)> = (0..keys).map(|k| (k, f64::from(k % 70) * 2.0)).collect();
        group.throughput(Throughput::Elements(u64::from(keys)));
        group.bench_with_input(
            BenchmarkId::new("outer_join", keys),
            &(forecast, stock),
            |b, (forecast, stock)| {
                b.iter(|| plan_restocking(black_box(forecast), black_box(stock)))
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_feature_engineering, bench_restock_planning);
criterion_main!(benches);
