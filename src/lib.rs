//! Genetic search - generic local-search and evolutionary optimization.
//!
//! The caller supplies a fitness function over gene sequences and a target
//! fitness. The engine keeps a small pool of candidates, breeds children by
//! mutation or crossover, and reports every strict improvement until the
//! target is reached or the time budget runs out. Stagnating candidates age
//! and are probabilistically reset to the best known solution.
//!
//! # Architecture
//!
//! - `schema`: Candidates, fitness ordering, scores and configuration
//! - `engine`: The search loop and the drivers built on it (hill climbing,
//!   tournaments, benchmarking)
//!
//! # Example
//!
//! ```rust
//! use genetic_search::{
//!     engine::Search,
//!     schema::SearchConfig,
//! };
//!
//! let target = 20;
//! let best = Search::new(SearchConfig::default(), target, |genes: &[u8]| {
//!     genes.iter().filter(|&&g| g == 1).count()
//! })
//! .with_gene_set(vec![0, 1])
//! .with_target_length(target)
//! .run()
//! .unwrap();
//!
//! assert_eq!(*best.fitness(), target);
//! ```

pub mod engine;
pub mod schema;

// Re-export commonly used types
pub use engine::{GeneRng, Search, SearchEvent, Tournament};
pub use schema::{Candidate, ConfigError, Fitness, SearchConfig, Strategy};
