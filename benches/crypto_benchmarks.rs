use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};

use dpf::{full_domain_eval_z, gen_z, Block, PrfKeySet};

#[derive(Copy, Clone, Debug)]
struct Params {
    b: usize,
    n: usize,
    m: usize,
}

impl std::fmt::Display for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "B={} n={} m={}", self.b, self.n, self.m)
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    static PARAMS: [Params; 4] = [
        Params { b: 2, n: 10, m: 1 },
        Params { b: 2, n: 16, m: 1 },
        Params { b: 3, n: 8, m: 1 },
        Params { b: 2, n: 10, m: 8 },
    ];

    let mut group = c.benchmark_group("Gen");
    for params in PARAMS.iter() {
        let domain_size = params.b.pow(params.n as u32);
        group.throughput(Throughput::Elements(domain_size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(params), params, |bencher, &params| {
            let keys = PrfKeySet::random(params.b);
            let msg = vec![Block::from_u128(0xDEAD_BEEF); params.m];
            bencher.iter(|| gen_z(&keys, params.b, params.n, domain_size / 2, &msg).unwrap())
        });
    }
    group.finish();

    let mut group = c.benchmark_group("FullDomainEval");
    for params in PARAMS.iter() {
        let domain_size = params.b.pow(params.n as u32);
        group.throughput(Throughput::Elements(domain_size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(params), params, |bencher, &params| {
            let keys = PrfKeySet::random(params.b);
            let msg = vec![Block::from_u128(0xDEAD_BEEF); params.m];
            let (k0, _) = gen_z(&keys, params.b, params.n, domain_size / 2, &msg).unwrap();
            let total = domain_size * params.m;
            bencher.iter_batched(
                || (vec![Block::ZERO; total], vec![Block::ZERO; total]),
                |(mut cache, mut output)| full_domain_eval_z(&k0, &mut cache, &mut output).unwrap(),
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
