//! Benchmarks for the search loop and tournament play.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::Rng;

use genetic_search::{
    engine::{Search, Tournament},
    schema::{CompetitionResult, Score, SearchConfig, TournamentConfig},
};

fn count_ones(genes: &[u8]) -> usize {
    genes.iter().filter(|&&g| g == 1).count()
}

fn bench_one_max(c: &mut Criterion) {
    let mut group = c.benchmark_group("one_max");

    for length in [50, 100, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(length), &length, |b, &length| {
            let mut seed = 0;
            b.iter(|| {
                seed += 1;
                let config = SearchConfig {
                    random_seed: Some(seed),
                    ..SearchConfig::default()
                };
                Search::new(config, length, count_ones)
                    .with_gene_set(vec![0, 1])
                    .with_target_length(black_box(length))
                    .run()
            });
        });
    }

    group.finish();
}

fn bench_pool_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_size");

    for pool_size in [1, 4, 16] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_slots", pool_size)),
            &pool_size,
            |b, &pool_size| {
                let mut seed = 0;
                b.iter(|| {
                    seed += 1;
                    let config = SearchConfig {
                        pool_size,
                        max_age: Some(20),
                        random_seed: Some(seed),
                        ..SearchConfig::default()
                    };
                    Search::new(config, 100, count_ones)
                        .with_gene_set(vec![0, 1])
                        .with_target_length(100)
                        .run()
                });
            },
        );
    }

    group.finish();
}

fn bench_tournament(c: &mut Criterion) {
    let mut group = c.benchmark_group("tournament");
    group.sample_size(10);

    for num_parents in [4, 8] {
        let config = TournamentConfig {
            num_parents,
            max_generations: 5,
            random_seed: Some(1),
        };

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_parents", num_parents)),
            &config,
            |b, config| {
                b.iter(|| {
                    let mut tournament = Tournament::new(
                        config.clone(),
                        |rng| (0..16).map(|_| rng.gen_range(0..100u32)).collect(),
                        |parent, donor, rng| {
                            let split = rng.gen_range(0..parent.len());
                            parent[..split].iter().chain(&donor[split..]).copied().collect()
                        },
                        |a, b| match a.iter().sum::<u32>().cmp(&b.iter().sum()) {
                            std::cmp::Ordering::Greater => CompetitionResult::Win,
                            std::cmp::Ordering::Equal => CompetitionResult::Tie,
                            std::cmp::Ordering::Less => CompetitionResult::Loss,
                        },
                        |_, score: &Score| (score.wins, score.ties),
                    )
                    .expect("valid tournament config");
                    tournament.run()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_one_max, bench_pool_size, bench_tournament);
criterion_main!(benches);
