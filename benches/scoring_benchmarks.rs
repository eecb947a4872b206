use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use postal_screen::{Address, AddressScorer, compare};
use std::hint::black_box;

fn full_address() -> Address {
    Address::new()
        .with_line1("1234 Broadway Suite 500")
        .with_line2("Floor 5")
        .with_city("New York")
        .with_state("NY")
        .with_postal_code("10001")
        .with_country("United States")
}

fn bench_compare(c: &mut Criterion) {
    let query = full_address();
    let candidate = Address::new()
        .with_line1("1234 Broadway")
        .with_city("New York")
        .with_state("New York")
        .with_postal_code("10001-1234")
        .with_country("USA");

    c.bench_function("compare_full", |b| {
        b.iter(|| compare(black_box(&query), black_box(&candidate)))
    });

    let sparse = Address::new().with_city("Boston");
    c.bench_function("compare_single_field", |b| {
        b.iter(|| compare(black_box(&sparse), black_box(&sparse)))
    });
}

fn bench_compare_batch(c: &mut Criterion) {
    let scorer = AddressScorer::new();
    let query = full_address();
    let mut group = c.benchmark_group("compare_batch");

    for size in [10usize, 100, 1000] {
        let candidates: Vec<Address> = (0..size)
            .map(|i| {
                Address::new()
                    .with_line1(format!("{} Broadway", 1000 + i))
                    .with_city(if i % 2 == 0 { "New York" } else { "Newark" })
                    .with_country("US")
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &candidates, |b, candidates| {
            b.iter(|| scorer.compare_batch(black_box(&query), black_box(candidates)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compare, bench_compare_batch);
criterion_main!(benches);
