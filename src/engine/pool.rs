//! Population pool and the record of historical bests.

use rand::Rng;
use rand_distr::Exp1;

use crate::schema::{Candidate, Fitness};

use super::genome::GeneRng;

/// Fixed-size working set of candidates, visited round-robin.
#[derive(Debug, Clone)]
pub struct Pool<G, F> {
    slots: Vec<Candidate<G, F>>,
    capacity: usize,
    cursor: usize,
}

impl<G, F> Pool<G, F> {
    /// Create an empty pool that will hold `capacity` candidates once seeded.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            // The first advance lands on slot 0.
            cursor: 1,
        }
    }

    /// Add a seed candidate. Only valid until the pool is full.
    pub fn push(&mut self, candidate: Candidate<G, F>) {
        debug_assert!(!self.is_full(), "pool already seeded");
        self.slots.push(candidate);
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Move the cursor to the next slot and return its index.
    ///
    /// Visits `0, len-1, len-2, ..., 0, len-1, ...`.
    pub fn advance(&mut self) -> usize {
        self.cursor = if self.cursor > 0 {
            self.cursor - 1
        } else {
            self.slots.len().saturating_sub(1)
        };
        self.cursor
    }

    pub fn get(&self, index: usize) -> &Candidate<G, F> {
        &self.slots[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Candidate<G, F> {
        &mut self.slots[index]
    }

    /// Put `candidate` in slot `index`, returning the previous occupant.
    pub fn replace(&mut self, index: usize, candidate: Candidate<G, F>) -> Candidate<G, F> {
        std::mem::replace(&mut self.slots[index], candidate)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate<G, F>> {
        self.slots.iter()
    }
}

/// Every fitness that has ever been the pool-wide best, in ascending order.
#[derive(Debug, Clone)]
pub struct HistoricalFitness<F> {
    values: Vec<F>,
}

impl<F: Fitness> HistoricalFitness<F> {
    /// Start the record with the first best.
    pub fn new(initial: F) -> Self {
        Self {
            values: vec![initial],
        }
    }

    /// Append a new best. Must not be worse than the last one.
    pub fn push(&mut self, fitness: F) {
        debug_assert!(
            self.values
                .last()
                .is_none_or(|last| !last.is_better_than(&fitness)),
            "historical fitness must be non-decreasing"
        );
        self.values.push(fitness);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[F] {
        &self.values
    }

    /// Position `fitness` would take in the record: the number of historical
    /// bests it is strictly better than.
    pub fn rank(&self, fitness: &F) -> usize {
        self.values.partition_point(|h| fitness.is_better_than(h))
    }

    /// Fraction of historical bests that `fitness` does not beat, in `[0, 1]`.
    pub fn trailing_proportion(&self, fitness: &F) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let len = self.values.len();
        (len - self.rank(fitness)) as f64 / len as f64
    }

    /// Decide whether a worse child survives: true with probability
    /// `exp(-trailing_proportion)`.
    pub fn accepts(&self, fitness: &F, rng: &mut GeneRng) -> bool {
        let proportion = self.trailing_proportion(fitness);
        // P(X > p) = e^-p for X ~ Exp(1)
        let draw: f64 = rng.sample(Exp1);
        draw > proportion
    }
}
