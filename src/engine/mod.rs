//! Engine module - Search loop, operators, pool and the drivers built on top of it.

mod benchmark;
mod climb;
mod genome;
mod pool;
mod search;
mod strategy;
mod tournament;

pub use benchmark::*;
pub use climb::*;
pub use genome::*;
pub use pool::*;
pub use search::*;
pub use strategy::*;
pub use tournament::*;
