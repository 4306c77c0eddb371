use criterion::{black_box, criterion_group, criterion_main, Bencher, BenchmarkId, Criterion};
use flexi_logger::Logger;
use permseq::{Sequence, TreapSeq};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use std::io::Write;
use std::sync::{LazyLock, Mutex};

#[derive(Clone, Copy, Debug)]
enum Operation {
    Sum,
    Assign,
    Add,
    Insert,
    Remove,
    NextPerm,
    PrevPerm,
}

#[derive(Clone, Copy, Debug)]
enum OperationDistribution {
    Default,
    PermutationHeavy,
}

impl OperationDistribution {
    fn get_op(&self, rng: &mut impl Rng) -> Operation {
        let weights = match self {
            Self::Default => [3, 2, 2, 1, 1, 2, 2],
            Self::PermutationHeavy => [1, 1, 1, 1, 1, 5, 5],
        };
        use Operation::*;
        *[Sum, Assign, Add, Insert, Remove, NextPerm, PrevPerm]
            .choose_weighted(rng, |&o| weights[o as usize])
            .unwrap()
    }
}

fn single_op(seq: &mut TreapSeq, rng: &mut impl Rng, op_dist: OperationDistribution) {
    let len = seq.len();
    let l = rng.gen_range(0..len);
    let r = rng.gen_range(l..len);
    use Operation::*;
    match op_dist.get_op(rng) {
        Sum => {
            black_box(seq.sum(l, r));
        }
        Assign => seq.assign(rng.gen_range(-1000..=1000), l, r),
        Add => seq.add(rng.gen_range(-1000..=1000), l, r),
        Insert => seq.insert(rng.gen_range(0..=len), rng.gen_range(-1000..=1000)),
        Remove if len > 1 => seq.remove(rng.gen_range(0..len)),
        Remove => {}
        NextPerm => seq.next_permutation(l, r),
        PrevPerm => seq.prev_permutation(l, r),
    }
}

fn ops_mix_impl(b: &mut Bencher, seed: u64, n: usize, dist: OperationDistribution) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut seq = TreapSeq::from_values((0..n).map(|_| rng.gen_range(-1000..=1000)));
    b.iter(|| single_op(&mut seq, &mut rng, dist));
}

fn ops_mix(c: &mut Criterion) {
    let _ = &*LOGGER;
    let mut g = c.benchmark_group("Per operation");
    let mut rng = rand::rngs::StdRng::seed_from_u64(4815162342);
    g.throughput(criterion::Throughput::Elements(1));
    for n in [1_000usize, 100_000] {
        for dist in [
            OperationDistribution::Default,
            OperationDistribution::PermutationHeavy,
        ] {
            let seed = rng.gen();
            log::debug!("Using seed {seed}");
            let input_str = format!("N {n} {dist:?}").to_lowercase();
            g.bench_with_input(BenchmarkId::new("treap", &input_str), &n, |b, &n| {
                ops_mix_impl(b, seed, n, dist)
            });
        }
    }
    g.finish();
}

fn permutation_steps(c: &mut Criterion) {
    let _ = &*LOGGER;
    let mut g = c.benchmark_group("Permutation steps");
    g.throughput(criterion::Throughput::Elements(1));
    for n in [1_000usize, 100_000] {
        g.bench_with_input(BenchmarkId::new("next", n), &n, |b, &n| {
            let mut seq = TreapSeq::from_values(0..n as i64);
            b.iter(|| seq.next_permutation(0, n - 1));
        });
    }
    g.finish();
}

criterion_group!(benches, ops_mix, permutation_steps);
criterion_main!(benches);

pub static LOGGER: LazyLock<Mutex<flexi_logger::LoggerHandle>> = LazyLock::new(|| {
    Mutex::new(
        Logger::try_with_env_or_str("info")
            .unwrap()
            .write_mode(flexi_logger::WriteMode::SupportCapture)
            .log_to_stdout()
            .format(|w, now, record| {
                write!(
                    w,
                    "{} [{}] {}",
                    now.format("%H:%M:%S%.3f"),
                    record.level(),
                    record.args(),
                )
            })
            .start()
            .unwrap(),
    )
});
