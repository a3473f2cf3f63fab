//! Strategy dispatch: producing a new candidate by create, mutate or crossover.

use log::trace;

use crate::schema::{Candidate, Strategy};

use super::genome::GeneRng;
use super::pool::Pool;

/// Fitness evaluation over a gene sequence.
pub type FitnessFn<'a, G, F> = Box<dyn FnMut(&[G]) -> F + 'a>;
/// Builds a complete gene sequence from scratch.
pub type CreateFn<'a, G> = Box<dyn FnMut(&mut GeneRng) -> Vec<G> + 'a>;
/// Edits a copied gene sequence in place.
pub type MutateFn<'a, G> = Box<dyn FnMut(&mut Vec<G>, &mut GeneRng) + 'a>;
/// Combines parent and donor genes. `None` means the two are indistinguishable.
pub type CrossoverFn<'a, G> = Box<dyn FnMut(&[G], &[G], &mut GeneRng) -> Option<Vec<G>> + 'a>;

/// Maps each [`Strategy`] to the operator that implements it.
pub struct Dispatcher<'a, G, F> {
    fitness: FitnessFn<'a, G, F>,
    create: CreateFn<'a, G>,
    mutate: MutateFn<'a, G>,
    crossover: Option<CrossoverFn<'a, G>>,
}

impl<'a, G: Clone, F> Dispatcher<'a, G, F> {
    pub fn new(
        fitness: FitnessFn<'a, G, F>,
        create: CreateFn<'a, G>,
        mutate: MutateFn<'a, G>,
        crossover: Option<CrossoverFn<'a, G>>,
    ) -> Self {
        Self {
            fitness,
            create,
            mutate,
            crossover,
        }
    }

    /// Whether crossover takes part in reproduction.
    pub fn has_crossover(&self) -> bool {
        self.crossover.is_some()
    }

    /// Produce a child for the parent in slot `index`.
    ///
    /// With crossover configured, mutate and crossover are picked with equal
    /// probability; otherwise every child is a mutation.
    pub fn produce(
        &mut self,
        index: usize,
        pool: &mut Pool<G, F>,
        rng: &mut GeneRng,
    ) -> Candidate<G, F> {
        let strategy = if self.has_crossover() && rng.coin_flip() {
            Strategy::Crossover
        } else {
            Strategy::Mutate
        };
        self.apply(strategy, index, pool, rng)
    }

    /// Run a specific strategy against slot `index`.
    pub fn apply(
        &mut self,
        strategy: Strategy,
        index: usize,
        pool: &mut Pool<G, F>,
        rng: &mut GeneRng,
    ) -> Candidate<G, F> {
        match strategy {
            Strategy::Create => self.create(rng),
            Strategy::Mutate => self.mutate(pool.get(index), rng),
            Strategy::Crossover => self.crossover(index, pool, rng),
        }
    }

    /// Generate and evaluate a fresh candidate.
    pub fn create(&mut self, rng: &mut GeneRng) -> Candidate<G, F> {
        let genes = (self.create)(rng);
        let fitness = (self.fitness)(&genes);
        Candidate::new(genes, fitness, Strategy::Create)
    }

    /// Copy `parent`'s genes, mutate the copy and evaluate it.
    pub fn mutate(&mut self, parent: &Candidate<G, F>, rng: &mut GeneRng) -> Candidate<G, F> {
        let mut genes = parent.genes().to_vec();
        (self.mutate)(&mut genes, rng);
        let fitness = (self.fitness)(&genes);
        Candidate::new(genes, fitness, Strategy::Mutate)
    }

    /// Cross slot `index` with a random donor.
    ///
    /// When the operator reports indistinguishable parents, the donor slot is
    /// regenerated and the parent is mutated instead.
    fn crossover(
        &mut self,
        index: usize,
        pool: &mut Pool<G, F>,
        rng: &mut GeneRng,
    ) -> Candidate<G, F> {
        let Some(crossover) = self.crossover.as_mut() else {
            return self.mutate(pool.get(index), rng);
        };

        let mut donor = rng.index(pool.len());
        if donor == index {
            donor = (donor + 1) % pool.len();
        }

        match crossover(pool.get(index).genes(), pool.get(donor).genes(), rng) {
            Some(genes) => {
                let fitness = (self.fitness)(&genes);
                Candidate::new(genes, fitness, Strategy::Crossover)
            }
            None => {
                trace!("crossover of slots {index} and {donor} gave no child, regenerating donor");
                let replacement = self.create(rng);
                pool.replace(donor, replacement);
                self.mutate(pool.get(index), rng)
            }
        }
    }
}
