use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;
use wimp_mc::{
    AcceptRejectSampler, EventSampler, MaxwellWeightedSampler, McmcSampler,
    UniformWeightedSampler,
};
use wimp_physics::PhysicsModel;

fn bench_sampler(c: &mut Criterion, name: &str, mut sampler: impl EventSampler) {
    let model = PhysicsModel::default();
    sampler.initialize(&model).unwrap();
    c.bench_function(name, |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for _ in 0..1000 {
                acc += sampler.sample().unwrap().er();
            }
            black_box(acc)
        })
    });
}

fn bench_samplers(c: &mut Criterion) {
    bench_sampler(c, "uniform_sample_1k", UniformWeightedSampler::new(StdRng::seed_from_u64(1)));
    bench_sampler(c, "maxwell_sample_1k", MaxwellWeightedSampler::new(StdRng::seed_from_u64(2)));
    bench_sampler(c, "accept_reject_sample_1k", AcceptRejectSampler::new(StdRng::seed_from_u64(3)));
    bench_sampler(c, "mcmc_sample_1k", McmcSampler::new(StdRng::seed_from_u64(4)));
}

criterion_group!(benches, bench_samplers);
criterion_main!(benches);
