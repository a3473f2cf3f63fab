//! Round-robin tournament for problems scored by pairwise play.

use std::cmp::Ordering;

use log::debug;
use rayon::prelude::*;

use crate::schema::{CompetitionResult, ConfigError, Contestant, Score, TournamentConfig};

use super::genome::GeneRng;

type GenerateFn<'a, G> = Box<dyn FnMut(&mut GeneRng) -> Vec<G> + 'a>;
type BreedFn<'a, G> = Box<dyn FnMut(&[G], &[G], &mut GeneRng) -> Vec<G> + 'a>;
type CompeteFn<'a, G> = Box<dyn Fn(&[G], &[G]) -> CompetitionResult + Sync + 'a>;
type SortKeyFn<'a, G, K> = Box<dyn Fn(&[G], &Score) -> K + 'a>;

/// Evolves a population whose fitness only emerges from matches against
/// each other.
pub struct Tournament<'a, G, K> {
    config: TournamentConfig,
    generate: GenerateFn<'a, G>,
    crossover: BreedFn<'a, G>,
    compete: CompeteFn<'a, G>,
    sort_key: SortKeyFn<'a, G, K>,
}

impl<'a, G: Clone + Sync, K: PartialOrd> Tournament<'a, G, K> {
    /// * `generate` builds a fresh contestant.
    /// * `crossover(parent, donor)` breeds a child; any mutation happens
    ///   inside it.
    /// * `compete(a, b)` plays one match and reports it from `a`'s side.
    /// * `sort_key(genes, score)` ranks contestants, higher is better.
    pub fn new(
        config: TournamentConfig,
        generate: impl FnMut(&mut GeneRng) -> Vec<G> + 'a,
        crossover: impl FnMut(&[G], &[G], &mut GeneRng) -> Vec<G> + 'a,
        compete: impl Fn(&[G], &[G]) -> CompetitionResult + Sync + 'a,
        sort_key: impl Fn(&[G], &Score) -> K + 'a,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            generate: Box::new(generate),
            crossover: Box::new(crossover),
            compete: Box::new(compete),
            sort_key: Box::new(sort_key),
        })
    }

    /// Play all generations and return the best contestant seen.
    pub fn run(&mut self) -> Contestant<G> {
        self.run_with_callback(|_, _| {})
    }

    /// Play all generations, calling `display(best, generation)` whenever
    /// the top contestant of a generation beats the best so far.
    pub fn run_with_callback(
        &mut self,
        mut display: impl FnMut(&Contestant<G>, usize),
    ) -> Contestant<G> {
        let mut rng = GeneRng::from_seed_option(self.config.random_seed);
        let num_parents = self.config.num_parents;

        let mut population: Vec<Contestant<G>> = (0..self.config.population_size())
            .map(|_| Contestant::new((self.generate)(&mut rng)))
            .collect();
        let mut best = population[0].clone();
        let mut best_key = (self.sort_key)(&best.genes, &best.score);

        for generation in 1..=self.config.max_generations {
            play_round(&mut population, &*self.compete);

            let mut ranked: Vec<(K, Contestant<G>)> = population
                .into_iter()
                .map(|contestant| {
                    let key = (self.sort_key)(&contestant.genes, &contestant.score);
                    (key, contestant)
                })
                .collect();
            ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

            if let Some((top_key, top)) = ranked.first()
                && *top_key > best_key
            {
                best = top.clone();
                best_key = (self.sort_key)(&best.genes, &best.score);
                debug!(
                    "generation {generation}: new best with {} wins, {} ties, {} losses",
                    best.score.wins, best.score.ties, best.score.losses
                );
                display(&best, generation);
            }

            let parents: Vec<Vec<G>> = ranked
                .into_iter()
                .take(num_parents)
                .map(|(_, contestant)| contestant.genes)
                .collect();
            population = self.breed(&parents, &mut rng);
        }

        best
    }

    /// Next generation: every ordered pair of distinct parents crossed, the
    /// parents themselves and one fresh contestant, all with zero scores.
    fn breed(&mut self, parents: &[Vec<G>], rng: &mut GeneRng) -> Vec<Contestant<G>> {
        let mut next = Vec::with_capacity(self.config.population_size());
        for (i, parent) in parents.iter().enumerate() {
            for (j, donor) in parents.iter().enumerate() {
                if i != j {
                    next.push(Contestant::new((self.crossover)(parent, donor, rng)));
                }
            }
        }
        next.extend(parents.iter().cloned().map(Contestant::new));
        next.push(Contestant::new((self.generate)(rng)));
        next
    }
}

/// Play every ordered pair once and add the outcomes to both scores.
///
/// Matches run in parallel; scores are tallied afterwards in pair order.
fn play_round<G: Sync>(
    population: &mut [Contestant<G>],
    compete: &(dyn Fn(&[G], &[G]) -> CompetitionResult + Sync),
) {
    let n = population.len();
    let players: &[Contestant<G>] = population;
    let results: Vec<(usize, usize, CompetitionResult)> = (0..n)
        .into_par_iter()
        .flat_map_iter(|i| {
            (0..n)
                .filter(move |&j| j != i)
                .map(move |j| (i, j, compete(&players[i].genes, &players[j].genes)))
        })
        .collect();

    for (i, j, result) in results {
        population[i].score.record(result);
        population[j].score.record(result.mirrored());
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use rand::Rng;

    use super::*;

    fn higher_wins(a: &[u32], b: &[u32]) -> CompetitionResult {
        match a[0].cmp(&b[0]) {
            Ordering::Greater => CompetitionResult::Win,
            Ordering::Equal => CompetitionResult::Tie,
            Ordering::Less => CompetitionResult::Loss,
        }
    }

    #[test]
    fn test_play_round_scores_are_mirrored() {
        let mut population: Vec<Contestant<u32>> =
            [3, 1, 2, 2].iter().map(|&v| Contestant::new(vec![v])).collect();
        play_round(&mut population, &higher_wins);

        let total_wins: usize = population.iter().map(|c| c.score.wins).sum();
        let total_losses: usize = population.iter().map(|c| c.score.losses).sum();
        assert_eq!(total_wins, total_losses);
        assert!(population.iter().all(|c| c.score.games() == 6));

        assert_eq!(population[0].score, Score { wins: 6, ties: 0, losses: 0 });
        assert_eq!(population[1].score, Score { wins: 0, ties: 0, losses: 6 });
        assert_eq!(population[2].score, Score { wins: 2, ties: 2, losses: 2 });
    }

    #[test]
    fn test_always_first_player_wins() {
        let config = TournamentConfig {
            num_parents: 3,
            max_generations: 4,
            random_seed: Some(1),
        };
        let size = config.population_size();
        let counter = Cell::new(0u32);
        let improvements = RefCell::new(Vec::new());

        let mut tournament = Tournament::new(
            config,
            |_| {
                counter.set(counter.get() + 1);
                vec![counter.get()]
            },
            |parent, _, _| parent.to_vec(),
            |_, _| CompetitionResult::Win,
            |_, score: &Score| (score.wins, score.ties),
        )
        .unwrap();

        let best = tournament.run_with_callback(|contestant, generation| {
            improvements.borrow_mut().push((contestant.score, generation));
        });

        // Every contestant wins each match it starts and loses each it answers,
        // so only the first generation beats the zero-score initial best.
        let improvements = improvements.into_inner();
        assert_eq!(improvements.len(), 1);
        assert_eq!(improvements[0].1, 1);
        assert_eq!(
            best.score,
            Score {
                wins: size - 1,
                ties: 0,
                losses: size - 1
            }
        );
    }

    #[test]
    fn test_parents_won_every_match_they_started() {
        let config = TournamentConfig {
            num_parents: 3,
            max_generations: 1,
            random_seed: Some(2),
        };
        let size = config.population_size();
        let counter = Cell::new(0u32);
        let scored = RefCell::new(Vec::new());
        let bred = RefCell::new(Vec::new());

        let mut tournament = Tournament::new(
            config,
            |_| {
                counter.set(counter.get() + 1);
                vec![counter.get()]
            },
            |parent, donor, _| {
                bred.borrow_mut().push((parent[0], donor[0]));
                parent.to_vec()
            },
            |_, _| CompetitionResult::Win,
            |genes, score: &Score| {
                scored.borrow_mut().push((genes[0], *score));
                (score.wins, score.ties)
            },
        )
        .unwrap();
        tournament.run();
        drop(tournament);

        let bred = bred.into_inner();
        assert_eq!(bred.len(), 3 * 2);
        let mut parents: Vec<u32> = bred.iter().flat_map(|&(a, b)| [a, b]).collect();
        parents.sort_unstable();
        parents.dedup();
        // Equal keys keep generation order.
        assert_eq!(parents, vec![1, 2, 3]);

        let perfect = Score {
            wins: size - 1,
            ties: 0,
            losses: size - 1,
        };
        let scored = scored.into_inner();
        for parent in parents {
            let played: Vec<Score> = scored
                .iter()
                .filter(|(id, score)| *id == parent && score.games() > 0)
                .map(|(_, score)| *score)
                .collect();
            assert!(!played.is_empty());
            assert!(played.iter().all(|score| *score == perfect));
        }
    }

    #[test]
    fn test_strongest_contestant_wins_first_generation() {
        let config = TournamentConfig {
            num_parents: 4,
            max_generations: 1,
            random_seed: None,
        };
        let size = config.population_size();
        let next_value = Cell::new(0u32);

        let mut tournament = Tournament::new(
            config,
            |_| {
                next_value.set(next_value.get() + 1);
                vec![next_value.get()]
            },
            |parent, donor, _| vec![parent[0].max(donor[0])],
            higher_wins,
            |_, score: &Score| score.wins as i64 - score.losses as i64,
        )
        .unwrap();

        let best = tournament.run();
        assert_eq!(best.genes, vec![size as u32]);
        assert_eq!(best.score.wins, 2 * (size - 1));
        assert_eq!(best.score.losses, 0);
    }

    #[test]
    fn test_improvements_are_reported_in_generation_order() {
        let config = TournamentConfig {
            num_parents: 3,
            max_generations: 6,
            random_seed: Some(5),
        };
        let reported = RefCell::new(Vec::new());

        let mut tournament = Tournament::new(
            config,
            |rng| vec![rng.gen_range(0..100u32)],
            |parent, donor, rng| vec![(parent[0] + donor[0]) / 2 + rng.gen_range(0..3)],
            higher_wins,
            |genes, score: &Score| (score.wins, genes[0]),
        )
        .unwrap();

        let best = tournament.run_with_callback(|contestant, generation| {
            reported
                .borrow_mut()
                .push(((contestant.score.wins, contestant.genes[0]), generation));
        });

        let reported = reported.into_inner();
        assert!(!reported.is_empty());
        assert!(reported.windows(2).all(|pair| pair[1].0 > pair[0].0 && pair[1].1 > pair[0].1));
        assert_eq!(reported.last().map(|r| r.0), Some((best.score.wins, best.genes[0])));
    }

    #[test]
    fn test_zero_parents_rejected() {
        let config = TournamentConfig {
            num_parents: 0,
            ..Default::default()
        };
        let result = Tournament::new(
            config,
            |_| vec![0u32],
            |parent, _, _| parent.to_vec(),
            higher_wins,
            |_, score: &Score| score.wins,
        );
        assert!(matches!(result, Err(ConfigError::NoParents)));
    }
}
