//! Hill climbing over a structural search parameter.
//!
//! Some problems have a knob that is not part of the fitness itself, such as
//! the maximum genome length of a circuit. The climber repeatedly runs a full
//! search with a parameter value derived from the best result so far, keeping
//! a new result only when the caller judges it an improvement.

use std::fmt;

use log::debug;

use crate::schema::{Candidate, ConfigError};

use super::benchmark::with_log_suppressed;

type RunFn<'a, G, F, P> = Box<dyn FnMut(P) -> Result<Candidate<G, F>, ConfigError> + 'a>;
type CompareFn<'a, G, F> = Box<dyn FnMut(&Candidate<G, F>, &Candidate<G, F>) -> bool + 'a>;
type PredicateFn<'a, G, F> = Box<dyn FnMut(&Candidate<G, F>) -> bool + 'a>;
type ParameterFn<'a, G, F, P> = Box<dyn FnMut(&Candidate<G, F>) -> P + 'a>;

/// Meta-search over a scalar parameter of the search itself.
pub struct HillClimber<'a, G, F, P> {
    run: RunFn<'a, G, F, P>,
    is_improvement: CompareFn<'a, G, F>,
    is_optimal: PredicateFn<'a, G, F>,
    next_parameter: ParameterFn<'a, G, F, P>,
    runs: usize,
}

impl<'a, G, F, P: Clone + fmt::Debug> HillClimber<'a, G, F, P> {
    /// * `run` performs one complete search for a parameter value.
    /// * `is_improvement(best, child)` decides whether `child` replaces `best`.
    /// * `is_optimal(best)` ends the climb.
    /// * `next_parameter(best)` picks the parameter for the next run.
    pub fn new(
        run: impl FnMut(P) -> Result<Candidate<G, F>, ConfigError> + 'a,
        is_improvement: impl FnMut(&Candidate<G, F>, &Candidate<G, F>) -> bool + 'a,
        is_optimal: impl FnMut(&Candidate<G, F>) -> bool + 'a,
        next_parameter: impl FnMut(&Candidate<G, F>) -> P + 'a,
    ) -> Self {
        Self {
            run: Box::new(run),
            is_improvement: Box::new(is_improvement),
            is_optimal: Box::new(is_optimal),
            next_parameter: Box::new(next_parameter),
            runs: 0,
        }
    }

    /// Number of nested searches performed by the last climb.
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Climb from `initial` until the best result is optimal.
    pub fn climb(&mut self, initial: P) -> Result<Candidate<G, F>, ConfigError> {
        self.climb_with_callback(initial, |_, _| {})
    }

    /// Climb from `initial`, calling `display(best, parameter)` each time a
    /// nested run improves on the best.
    ///
    /// Log output of nested runs after the first one is suppressed, so only
    /// improving runs are visible to the caller.
    pub fn climb_with_callback(
        &mut self,
        initial: P,
        mut display: impl FnMut(&Candidate<G, F>, &P),
    ) -> Result<Candidate<G, F>, ConfigError> {
        self.runs = 1;
        let mut best = (self.run)(initial)?;

        while !(self.is_optimal)(&best) {
            let parameter = (self.next_parameter)(&best);
            let run = &mut self.run;
            let child = with_log_suppressed(|| run(parameter.clone()))?;
            self.runs += 1;

            if (self.is_improvement)(&best, &child) {
                debug!("run {} with parameter {parameter:?} improved", self.runs);
                best = child;
                display(&best, &parameter);
            }
        }

        Ok(best)
    }
}
