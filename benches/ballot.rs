use criterion::{black_box, Criterion};
use tokio::runtime::Runtime;
use votecrypt::{
    ballot::{Ballot, Question, Questionnaire},
    bfv::{params::QUESTIONNAIRE, sampler::Sampler, PublicKey},
};

pub fn criterion_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("ballot");

    let params = QUESTIONNAIRE;
    let d = params.poly_degree();
    let q = params.coeff_modulus();
    let mut sampler = Sampler::seeded(5);
    let public_key = PublicKey::new(
        sampler.sample_polynomial_uniform(d, q).unwrap(),
        sampler.sample_polynomial_uniform(d, q).unwrap(),
    )
    .unwrap();
    let questionnaire = Questionnaire {
        link: Some("bench".to_owned()),
        id: None,
        deadline: None,
        questions: (0..32)
            .map(|i| Question {
                text: format!("Question {}", i),
                options: vec!["yes".to_owned(), "no".to_owned(), "maybe".to_owned()],
            })
            .collect(),
        public_key,
        params,
    };
    let ballot = Ballot::new(&questionnaire).unwrap();
    let answers: Vec<_> = (0..32).map(|i| i % 3).collect();

    group.bench_function("encrypt_answer", |b| {
        b.iter(|| ballot.encrypt_answer(black_box(0), black_box(1)))
    });

    group.bench_function("encrypt_answers_32", |b| {
        b.to_async(Runtime::new().unwrap())
            .iter(|| ballot.encrypt_answers(black_box(&answers)))
    });

    group.finish();
}
