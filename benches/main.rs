use criterion::{criterion_group, criterion_main, Criterion};

mod ballot;
mod bfv;

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = bfv::criterion_benchmark, ballot::criterion_benchmark
}
criterion_main!(benches);
