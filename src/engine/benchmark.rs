//! Timing harness for repeated runs.

use std::time::Instant;

use log::LevelFilter;

use crate::schema::{BenchmarkConfig, ConfigError};

/// Restores the global log level when dropped.
struct LogLevelGuard {
    previous: LevelFilter,
}

impl Drop for LogLevelGuard {
    fn drop(&mut self) {
        log::set_max_level(self.previous);
    }
}

/// Run `f` with all log output switched off, restoring the previous level
/// afterwards (also on panic).
pub fn with_log_suppressed<T>(f: impl FnOnce() -> T) -> T {
    let _guard = LogLevelGuard {
        previous: log::max_level(),
    };
    log::set_max_level(LevelFilter::Off);
    f()
}

/// Running statistics reported after a timed run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkRow {
    /// 1-based number of the run just completed.
    pub run: usize,
    /// Mean duration in seconds over all runs so far.
    pub mean: f64,
    /// Sample standard deviation in seconds; 0 until three runs are in.
    pub stdev: f64,
}

/// Final timings of a benchmark.
#[derive(Debug, Clone)]
pub struct BenchmarkStats {
    /// Duration of each run in seconds.
    pub timings: Vec<f64>,
    pub mean: f64,
    pub stdev: f64,
}

/// Runs a closure repeatedly and reports wall-clock statistics.
pub struct Benchmark {
    config: BenchmarkConfig,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Time `function` and print a `run mean stdev` row after each of the
    /// first ten runs and every tenth run after that.
    pub fn run<R>(&self, function: impl FnMut() -> R) -> BenchmarkStats {
        self.run_with_callback(function, |row| {
            println!("{} {:3.2} {:3.2}", row.run, row.mean, row.stdev)
        })
    }

    /// Like [`Benchmark::run`], delivering rows to `callback` instead of
    /// stdout.
    pub fn run_with_callback<R>(
        &self,
        mut function: impl FnMut() -> R,
        mut callback: impl FnMut(&BenchmarkRow),
    ) -> BenchmarkStats {
        let mut timings = Vec::with_capacity(self.config.runs);

        for i in 0..self.config.runs {
            let start = Instant::now();
            with_log_suppressed(&mut function);
            timings.push(start.elapsed().as_secs_f64());

            if i < 10 || i % 10 == 9 {
                let mean = mean(&timings);
                let stdev = if timings.len() > 2 {
                    sample_stdev(&timings, mean)
                } else {
                    0.0
                };
                callback(&BenchmarkRow {
                    run: i + 1,
                    mean,
                    stdev,
                });
            }
        }

        let mean = mean(&timings);
        let stdev = sample_stdev(&timings, mean);
        BenchmarkStats {
            timings,
            mean,
            stdev,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_stdev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (squares / (values.len() - 1) as f64).sqrt()
}

/// Serializes tests that change the global log level.
#[cfg(test)]
pub(crate) fn lock_log_level() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
