use std::sync::Arc;

use criterion::{black_box, Bencher, BenchmarkId, Criterion};
use votecrypt::bfv::{
    encoder::BatchEncoder,
    fourier::TransformContext,
    params::{Parameters, TOY_NTT},
    poly::Polynomial,
    sampler::Sampler,
    wire::Wire,
    BfvEncryptor, Ciphertext, PublicKey,
};

// q = 1 mod 2^13, so the transform exists for every degree benchmarked here.
const MODULUS: u64 = 1_099_511_922_689;

pub fn criterion_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("bfv");

    for d in [64, 256, 1024] {
        let ctx = TransformContext::new(d, MODULUS).unwrap();
        let mut sampler = Sampler::seeded(d as u64);
        let input = sampler.sample_uniform(d, MODULUS).unwrap();
        group.bench_with_input(BenchmarkId::new("forward_ftt", d), &input, |b, input| {
            b.iter(|| ctx.forward_ftt(black_box(input)))
        });
        group.bench_with_input(BenchmarkId::new("inverse_ftt", d), &input, |b, input| {
            b.iter(|| ctx.inverse_ftt(black_box(input)))
        });

        group.bench_function(BenchmarkId::new("multiply_transform", d), |b| {
            multiply(b, d, Some(&ctx))
        });
        group.bench_function(BenchmarkId::new("multiply_schoolbook", d), |b| {
            multiply(b, d, None)
        });
    }

    group.bench_function("encode", |b| {
        let encoder = BatchEncoder::new(&TOY_NTT).unwrap();
        b.iter(|| encoder.encode(black_box(&[0, 0, 1, 0, 0, 0, 0, 0])))
    });

    let params = Parameters::new(1024, 12289, MODULUS).unwrap();
    let fast = encryptor(&params, true);
    let slow = encryptor(&params, false);
    let plaintext = BatchEncoder::new(&params)
        .unwrap()
        .encode(&[1; 1024])
        .unwrap();
    group.bench_function("encrypt_transform", |b| {
        let mut sampler = Sampler::seeded(1);
        b.iter(|| fast.encrypt_with(black_box(&plaintext), &mut sampler))
    });
    group.bench_function("encrypt_schoolbook", |b| {
        let mut sampler = Sampler::seeded(1);
        b.iter(|| slow.encrypt_with(black_box(&plaintext), &mut sampler))
    });

    let ciphertext = fast.encrypt(&plaintext).unwrap();
    group.bench_function("serialize_ciphertext_json", |b| {
        b.iter(|| black_box(&ciphertext).to_json())
    });
    group.bench_function("serialize_ciphertext_bincode", |b| {
        b.iter(|| black_box(&ciphertext).to_bytes())
    });
    let json = ciphertext.to_json().unwrap();
    group.bench_function("deserialize_ciphertext_json", |b| {
        b.iter(|| Ciphertext::from_json(black_box(&json)))
    });

    group.finish();
}

fn multiply(b: &mut Bencher, d: usize, ctx: Option<&TransformContext>) {
    let mut sampler = Sampler::seeded(7);
    let lhs = sampler.sample_polynomial_uniform(d, MODULUS).unwrap();
    let rhs: Polynomial = sampler.sample_polynomial_triangle(d);
    b.iter(|| lhs.multiply(black_box(&rhs), MODULUS, ctx))
}

fn encryptor(params: &Parameters, fast: bool) -> BfvEncryptor {
    let mut sampler = Sampler::seeded(3);
    let d = params.poly_degree();
    let q = params.coeff_modulus();
    let public_key = PublicKey::new(
        sampler.sample_polynomial_uniform(d, q).unwrap(),
        sampler.sample_polynomial_uniform(d, q).unwrap(),
    )
    .unwrap();
    if fast {
        let ctx = TransformContext::new(d, q).unwrap();
        BfvEncryptor::with_context(params, public_key, Some(Arc::new(ctx))).unwrap()
    } else {
        BfvEncryptor::with_context(params, public_key, None).unwrap()
    }
}
