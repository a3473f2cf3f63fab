//! Candidate and scoring types shared by the search engine and its callers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordering capability for fitness values.
///
/// Fitness is compared, never subtracted: a problem may score candidates with
/// a lexicographic aggregate (wins, then ties, then rule count, ...) that has
/// no meaningful difference. Two values are equal for the engine's purposes
/// exactly when neither is better than the other.
pub trait Fitness: Clone + fmt::Debug {
    /// Returns `true` if `self` is strictly better than `other`.
    fn is_better_than(&self, other: &Self) -> bool;
}

macro_rules! impl_fitness_for_numeric {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Fitness for $ty {
                #[inline]
                fn is_better_than(&self, other: &Self) -> bool {
                    self > other
                }
            }
        )*
    };
}

impl_fitness_for_numeric!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

/// Reproduction method that produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Generated from scratch.
    Create,
    /// Copy of a parent with an in-place edit.
    Mutate,
    /// Combination of a parent and a donor from the pool.
    Crossover,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Create => "create",
            Strategy::Mutate => "mutate",
            Strategy::Crossover => "crossover",
        };
        f.write_str(name)
    }
}

/// A gene sequence with its evaluated fitness.
///
/// Genes and fitness are fixed at construction. Only the search loop touches
/// `age`.
#[derive(Debug, Clone)]
pub struct Candidate<G, F> {
    genes: Vec<G>,
    fitness: F,
    age: usize,
    strategy: Strategy,
}

impl<G, F> Candidate<G, F> {
    /// Create a fresh candidate with age 0.
    pub fn new(genes: Vec<G>, fitness: F, strategy: Strategy) -> Self {
        Self {
            genes,
            fitness,
            age: 0,
            strategy,
        }
    }

    pub fn genes(&self) -> &[G] {
        &self.genes
    }

    pub fn fitness(&self) -> &F {
        &self.fitness
    }

    /// Number of consecutive rounds this candidate has held its slot without
    /// producing a better child.
    pub fn age(&self) -> usize {
        self.age
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn into_genes(self) -> Vec<G> {
        self.genes
    }

    pub(crate) fn set_age(&mut self, age: usize) {
        self.age = age;
    }

    pub(crate) fn increment_age(&mut self) {
        self.age += 1;
    }
}

/// Outcome of a single match, from the first player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompetitionResult {
    Loss,
    Tie,
    Win,
}

impl CompetitionResult {
    /// The same outcome seen from the opponent's side.
    pub fn mirrored(self) -> Self {
        match self {
            CompetitionResult::Loss => CompetitionResult::Win,
            CompetitionResult::Tie => CompetitionResult::Tie,
            CompetitionResult::Win => CompetitionResult::Loss,
        }
    }
}

/// Accumulated match results for one tournament contestant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub wins: usize,
    pub ties: usize,
    pub losses: usize,
}

impl Score {
    /// Record one match outcome.
    pub fn record(&mut self, result: CompetitionResult) {
        match result {
            CompetitionResult::Win => self.wins += 1,
            CompetitionResult::Tie => self.ties += 1,
            CompetitionResult::Loss => self.losses += 1,
        }
    }

    /// Total matches played.
    pub fn games(&self) -> usize {
        self.wins + self.ties + self.losses
    }
}

/// A tournament entry: genes plus the score earned in the current generation.
#[derive(Debug, Clone)]
pub struct Contestant<G> {
    pub genes: Vec<G>,
    pub score: Score,
}

impl<G> Contestant<G> {
    /// Create a contestant with a zero score.
    pub fn new(genes: Vec<G>) -> Self {
        Self {
            genes,
            score: Score::default(),
        }
    }
}
