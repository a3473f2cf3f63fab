//! Genetic search CLI - Run demo problems from JSON configuration.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use genetic_search::{
    engine::{Benchmark, Search},
    schema::{BenchmarkConfig, Candidate, ConfigError, Fitness, SearchConfig},
};

/// Problem to solve, selected by the `type` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
enum DemoProblem {
    /// Maximize the number of 1s in a binary genome.
    OneMax { length: usize },
    /// Arrange numbers into strictly ascending order.
    SortedNumbers { length: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DemoConfig {
    problem: DemoProblem,
    #[serde(default)]
    search: SearchConfig,
    #[serde(default)]
    benchmark: BenchmarkConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            problem: DemoProblem::OneMax { length: 100 },
            search: SearchConfig::default(),
            benchmark: BenchmarkConfig::default(),
        }
    }
}

/// Ascending pairs first, then the smaller total descent.
#[derive(Debug, Clone, PartialEq)]
struct SortedFitness {
    in_order: usize,
    gap: u32,
}

impl Fitness for SortedFitness {
    fn is_better_than(&self, other: &Self) -> bool {
        if self.in_order != other.in_order {
            return self.in_order > other.in_order;
        }
        self.gap < other.gap
    }
}

impl fmt::Display for SortedFitness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in order, gap {}", self.in_order, self.gap)
    }
}

fn count_ones(genes: &[u8]) -> usize {
    genes.iter().filter(|&&g| g == 1).count()
}

fn sorted_fitness(genes: &[u32]) -> SortedFitness {
    let mut in_order = usize::from(!genes.is_empty());
    let mut gap = 0;
    for pair in genes.windows(2) {
        if pair[1] > pair[0] {
            in_order += 1;
        } else {
            gap += pair[0] - pair[1];
        }
    }
    SortedFitness { in_order, gap }
}

fn print_candidate<G: fmt::Debug, F: fmt::Debug>(candidate: &Candidate<G, F>, start: Instant) {
    println!(
        "  {:?}  fitness={:?}  strategy={}  {:.3}s",
        candidate.genes(),
        candidate.fitness(),
        candidate.strategy(),
        start.elapsed().as_secs_f64()
    );
}

fn solve(problem: &DemoProblem, config: &SearchConfig, verbose: bool) -> Result<(), ConfigError> {
    let start = Instant::now();
    match *problem {
        DemoProblem::OneMax { length } => {
            let best = Search::new(config.clone(), length, count_ones)
                .with_gene_set(vec![0, 1])
                .with_target_length(length)
                .with_display(|candidate| {
                    if verbose {
                        print_candidate(candidate, start)
                    }
                })
                .run()?;
            if verbose {
                println!();
                println!("Best: {} of {} ones", best.fitness(), length);
            }
        }
        DemoProblem::SortedNumbers { length } => {
            let optimal = SortedFitness {
                in_order: length,
                gap: 0,
            };
            let best = Search::new(config.clone(), optimal, sorted_fitness)
                .with_gene_set((0..100).collect())
                .with_target_length(length)
                .with_display(|candidate| {
                    if verbose {
                        print_candidate(candidate, start)
                    }
                })
                .run()?;
            if verbose {
                println!();
                println!("Best: {}", best.fitness());
            }
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} [--benchmark] <config.json>", args[0]);
        eprintln!();
        eprintln!("Run a genetic search demo problem from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to demo configuration file");
        eprintln!("  --benchmark  Time repeated runs instead of printing improvements");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let benchmark = args[1] == "--benchmark";
    let Some(path) = args.get(if benchmark { 2 } else { 1 }) else {
        eprintln!("Missing config file after --benchmark");
        std::process::exit(1);
    };
    let config_path = PathBuf::from(path);

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: DemoConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    println!("Genetic Search");
    println!("==============");
    println!("Problem: {:?}", config.problem);
    println!("Pool size: {}", config.search.pool_size);
    if let Some(max_age) = config.search.max_age {
        println!("Max age: {}", max_age);
    }
    if let Some(max_seconds) = config.search.max_seconds {
        println!("Time limit: {}s", max_seconds);
    }
    println!();

    let result = if benchmark {
        Benchmark::new(config.benchmark.clone()).and_then(|harness| {
            let mut failure = None;
            let stats = harness.run(|| {
                if let Err(e) = solve(&config.problem, &config.search, false)
                    && failure.is_none()
                {
                    failure = Some(e);
                }
            });
            println!();
            println!("Mean: {:.3}s  Stdev: {:.3}s", stats.mean, stats.stdev);
            failure.map_or(Ok(()), Err)
        })
    } else {
        solve(&config.problem, &config.search, true)
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_example_config() {
    let config = DemoConfig {
        search: SearchConfig {
            pool_size: 1,
            max_age: Some(50),
            max_seconds: Some(10.0),
            random_seed: None,
        },
        ..DemoConfig::default()
    };

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing example config: {}", e),
    }
}
