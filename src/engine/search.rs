//! The search loop: a rotating pool of candidates advanced until the target
//! fitness is reached or the time budget runs out.
//!
//! [`Search`] collects the caller's operators and settings. It can either be
//! driven to completion with [`Search::run`], or turned into a lazy stream of
//! [`SearchEvent`]s with [`Search::improvements`] and pulled one improvement
//! at a time.

use std::time::{Duration, Instant};

use log::{debug, info, trace};

use crate::schema::{Candidate, ConfigError, Fitness, SearchConfig};

use super::genome::GeneRng;
use super::pool::{HistoricalFitness, Pool};
use super::strategy::{CreateFn, CrossoverFn, Dispatcher, FitnessFn, MutateFn};

/// Callback invoked with each reported candidate.
pub type DisplayFn<'a, G, F> = Box<dyn FnMut(&Candidate<G, F>) + 'a>;

/// One item of the improvement stream.
#[derive(Debug, Clone)]
pub enum SearchEvent<G, F> {
    /// A candidate better than every candidate emitted before it. The first
    /// event of every stream is the initial candidate.
    Improvement(Candidate<G, F>),
    /// The time budget ran out; carries the best candidate found. Always the
    /// last event of a stream.
    Timeout(Candidate<G, F>),
}

impl<G, F> SearchEvent<G, F> {
    pub fn candidate(&self) -> &Candidate<G, F> {
        match self {
            SearchEvent::Improvement(candidate) | SearchEvent::Timeout(candidate) => candidate,
        }
    }

    pub fn into_candidate(self) -> Candidate<G, F> {
        match self {
            SearchEvent::Improvement(candidate) | SearchEvent::Timeout(candidate) => candidate,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SearchEvent::Timeout(_))
    }
}

/// Search configuration and problem operators.
pub struct Search<'a, G, F> {
    config: SearchConfig,
    optimal_fitness: F,
    fitness: FitnessFn<'a, G, F>,
    gene_set: Option<Vec<G>>,
    target_length: Option<usize>,
    default_mutate: Option<MutateFn<'a, G>>,
    create: Option<CreateFn<'a, G>>,
    mutate: Option<MutateFn<'a, G>>,
    crossover: Option<CrossoverFn<'a, G>>,
    display: DisplayFn<'a, G, F>,
}

impl<'a, G: Clone + 'a, F: Fitness + 'a> Search<'a, G, F> {
    /// Create a search that stops once a candidate is not worse than
    /// `optimal_fitness`.
    pub fn new(
        config: SearchConfig,
        optimal_fitness: F,
        fitness: impl FnMut(&[G]) -> F + 'a,
    ) -> Self {
        Self {
            config,
            optimal_fitness,
            fitness: Box::new(fitness),
            gene_set: None,
            target_length: None,
            default_mutate: None,
            create: None,
            mutate: None,
            crossover: None,
            display: Box::new(|_| {}),
        }
    }

    /// Alphabet used by the default generator and the default mutation.
    pub fn with_gene_set(mut self, gene_set: Vec<G>) -> Self
    where
        G: PartialEq,
    {
        let alphabet = gene_set.clone();
        self.default_mutate = Some(Box::new(move |genes: &mut Vec<G>, rng: &mut GeneRng| {
            rng.mutate_gene(genes, &alphabet)
        }));
        self.gene_set = Some(gene_set);
        self
    }

    /// Genome length produced by the default generator.
    pub fn with_target_length(mut self, length: usize) -> Self {
        self.target_length = Some(length);
        self
    }

    /// Replace the default generator.
    pub fn with_create(mut self, create: impl FnMut(&mut GeneRng) -> Vec<G> + 'a) -> Self {
        self.create = Some(Box::new(create));
        self
    }

    /// Replace the default single-position mutation.
    pub fn with_mutate(mut self, mutate: impl FnMut(&mut Vec<G>, &mut GeneRng) + 'a) -> Self {
        self.mutate = Some(Box::new(mutate));
        self
    }

    /// Enable crossover. Returning `None` signals that parent and donor are
    /// indistinguishable.
    pub fn with_crossover(
        mut self,
        crossover: impl FnMut(&[G], &[G], &mut GeneRng) -> Option<Vec<G>> + 'a,
    ) -> Self {
        self.crossover = Some(Box::new(crossover));
        self
    }

    /// Called with the initial candidate, each improvement and the timeout
    /// candidate.
    pub fn with_display(mut self, display: impl FnMut(&Candidate<G, F>) + 'a) -> Self {
        self.display = Box::new(display);
        self
    }

    /// Validate the setup and start the improvement stream.
    pub fn improvements(self) -> Result<Improvements<'a, G, F>, ConfigError> {
        self.into_parts().map(|(stream, _, _)| stream)
    }

    /// Run until a candidate meets the optimal fitness or the time budget
    /// runs out, reporting every improvement to the display callback.
    pub fn run(self) -> Result<Candidate<G, F>, ConfigError> {
        let (mut stream, optimal_fitness, mut display) = self.into_parts()?;

        while let Some(event) = stream.next() {
            match event {
                SearchEvent::Timeout(best) => {
                    display(&best);
                    return Ok(best);
                }
                SearchEvent::Improvement(candidate) => {
                    display(&candidate);
                    if !optimal_fitness.is_better_than(candidate.fitness()) {
                        info!(
                            "reached optimal fitness {:?} after {:.3}s",
                            candidate.fitness(),
                            stream.elapsed().as_secs_f64()
                        );
                        return Ok(candidate);
                    }
                }
            }
        }

        Ok(stream.into_best())
    }

    #[allow(clippy::type_complexity)]
    fn into_parts(self) -> Result<(Improvements<'a, G, F>, F, DisplayFn<'a, G, F>), ConfigError> {
        self.config.validate()?;

        let create: CreateFn<'a, G> = match (self.create, self.gene_set.clone()) {
            (Some(create), _) => create,
            (None, Some(gene_set)) => {
                if gene_set.is_empty() {
                    return Err(ConfigError::EmptyGeneSet);
                }
                let length = match self.target_length {
                    Some(length) if length > 0 => length,
                    _ => return Err(ConfigError::ZeroLength),
                };
                Box::new(move |rng: &mut GeneRng| rng.sample_genes(&gene_set, length))
            }
            (None, None) => return Err(ConfigError::MissingGenerator),
        };

        let mutate = match (self.mutate, self.default_mutate) {
            (Some(mutate), _) => mutate,
            (None, Some(default_mutate)) => {
                let available = self.gene_set.as_ref().map_or(0, Vec::len);
                if available < 2 {
                    return Err(ConfigError::GeneSetTooSmall(available));
                }
                default_mutate
            }
            (None, None) => return Err(ConfigError::MissingMutator),
        };

        let dispatcher = Dispatcher::new(self.fitness, create, mutate, self.crossover);
        let stream = Improvements::start(dispatcher, &self.config);
        Ok((stream, self.optimal_fitness, self.display))
    }
}

/// Lazy stream of improvements produced by one search invocation.
///
/// Owns its pool, historical record and random source. Each pull advances
/// the pool until the next improvement or until the time budget is spent.
/// Without a time budget the stream never ends on its own.
pub struct Improvements<'a, G, F> {
    dispatcher: Dispatcher<'a, G, F>,
    pool: Pool<G, F>,
    history: HistoricalFitness<F>,
    best: Candidate<G, F>,
    rng: GeneRng,
    max_age: Option<usize>,
    time_limit: Option<Duration>,
    start: Instant,
    pending: Option<SearchEvent<G, F>>,
    finished: bool,
}

impl<'a, G: Clone, F: Fitness> Improvements<'a, G, F> {
    fn start(mut dispatcher: Dispatcher<'a, G, F>, config: &SearchConfig) -> Self {
        let start = Instant::now();
        let mut rng = GeneRng::from_seed_option(config.random_seed);

        let first = dispatcher.create(&mut rng);
        let mut pool = Pool::with_capacity(config.pool_size);
        pool.push(first.clone());

        let mut stream = Self {
            dispatcher,
            pool,
            history: HistoricalFitness::new(first.fitness().clone()),
            best: first.clone(),
            rng,
            max_age: config.max_age,
            time_limit: config.time_limit(),
            start,
            pending: None,
            finished: false,
        };
        stream.pending = Some(if stream.expired() {
            SearchEvent::Timeout(first)
        } else {
            SearchEvent::Improvement(first)
        });
        stream
    }

    /// Best candidate found so far.
    pub fn best(&self) -> &Candidate<G, F> {
        &self.best
    }

    pub fn into_best(self) -> Candidate<G, F> {
        self.best
    }

    pub fn history(&self) -> &HistoricalFitness<F> {
        &self.history
    }

    pub fn pool(&self) -> &Pool<G, F> {
        &self.pool
    }

    /// Time since the stream started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn expired(&self) -> bool {
        self.time_limit
            .is_some_and(|limit| self.start.elapsed() > limit)
    }

    /// One unit of work: a timeout check followed by either seeding one pool
    /// slot or one reproduction step.
    fn tick(&mut self) -> Option<SearchEvent<G, F>> {
        if self.expired() {
            self.finished = true;
            info!(
                "time budget exhausted after {:.3}s, best fitness {:?}",
                self.elapsed().as_secs_f64(),
                self.best.fitness()
            );
            return Some(SearchEvent::Timeout(self.best.clone()));
        }
        if self.pool.is_full() {
            self.step()
        } else {
            self.seed()
        }
    }

    fn seed(&mut self) -> Option<SearchEvent<G, F>> {
        let candidate = self.dispatcher.create(&mut self.rng);
        let improved = candidate.fitness().is_better_than(self.best.fitness());
        self.pool.push(candidate.clone());
        improved.then(|| self.promote(candidate))
    }

    fn step(&mut self) -> Option<SearchEvent<G, F>> {
        let index = self.pool.advance();
        let mut child = self.dispatcher.produce(index, &mut self.pool, &mut self.rng);
        let parent = self.pool.get_mut(index);

        if parent.fitness().is_better_than(child.fitness()) {
            let Some(max_age) = self.max_age else {
                return None;
            };
            parent.increment_age();
            if parent.age() < max_age {
                return None;
            }
            if self.history.accepts(child.fitness(), &mut self.rng) {
                trace!("slot {index}: accepting worse child {:?}", child.fitness());
                *parent = child;
            } else {
                trace!("slot {index}: resetting to best {:?}", self.best.fitness());
                let mut reset = self.best.clone();
                reset.set_age(0);
                *parent = reset;
            }
            return None;
        }

        if !child.fitness().is_better_than(parent.fitness()) {
            child.set_age(parent.age() + 1);
            *parent = child;
            return None;
        }

        if !child.fitness().is_better_than(self.best.fitness()) {
            *parent = child;
            return None;
        }
        *parent = child.clone();
        Some(self.promote(child))
    }

    fn promote(&mut self, candidate: Candidate<G, F>) -> SearchEvent<G, F> {
        debug!(
            "improvement via {}: {:?} after {:.3}s",
            candidate.strategy(),
            candidate.fitness(),
            self.elapsed().as_secs_f64()
        );
        self.history.push(candidate.fitness().clone());
        self.best = candidate.clone();
        SearchEvent::Improvement(candidate)
    }
}

impl<G: Clone, F: Fitness> Iterator for Improvements<'_, G, F> {
    type Item = SearchEvent<G, F>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(event) = self.pending.take() {
            self.finished = event.is_timeout();
            return Some(event);
        }
        while !self.finished {
            if let Some(event) = self.tick() {
                return Some(event);
            }
        }
        None
    }
}
