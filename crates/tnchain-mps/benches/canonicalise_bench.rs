use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tnchain_mps::{
    svd_compress, variational_compress, CanonicaliseOptions, Mps, SvdCompressOptions,
    VariationalOptions,
};

/// Random 10-site qubit state with uniform inner bond dimension
fn random_mps(bond: usize, seed: u64) -> Mps {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Mps::random(&[2; 10], &[bond; 9], &mut rng).unwrap()
}

fn bench_left_canonise(c: &mut Criterion) {
    let mut group = c.benchmark_group("left_canonise");

    for &bond in &[4, 8, 16, 32] {
        group.bench_with_input(BenchmarkId::new("full_sweep", bond), &bond, |b, &chi| {
            b.iter_batched(
                || random_mps(chi, 42),
                |mut mps| {
                    mps.left_canonise(&CanonicaliseOptions::left()).unwrap();
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_compression(c: &mut Criterion) {
    let mut group = c.benchmark_group("compression");
    let mps = random_mps(16, 7);

    for &chi in &[2, 4, 8] {
        group.bench_with_input(BenchmarkId::new("svd", chi), &chi, |b, &chi| {
            b.iter(|| svd_compress(&mps, &SvdCompressOptions::new(chi)).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("variational", chi), &chi, |b, &chi| {
            let opts = VariationalOptions::new(chi).with_max_sweeps(2);
            b.iter(|| variational_compress(&mps, &opts).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_left_canonise, bench_compression);
criterion_main!(benches);
