//! Training system evolving action sequences with a genetic algorithm.
//!
//! An individual is a fixed-length list of `(Action, duration)` genes. Each
//! individual is played once through a game [`Environment`](runevo_engine::Environment)
//! and scored by how far and how long it survived. The best sequences are
//! bred into the next generation.
//!
//! # How Training Works
//!
//! 1. **Population** - Create individuals with randomly generated genes
//! 2. **Evaluation** - Each individual plays one episode and receives a fitness
//! 3. **Selection** - Tournament winners survive into the next generation
//! 4. **Reproduction** - Survivors are crossed and the children mutated
//! 5. **Repeat** - Continue for a fixed number of generations
//!
//! # Architecture
//!
//! ```text
//! Genetic Algorithm (genetic)
//!     ↓ evolves
//! Individuals: action sequences (individual)
//!     ↓ played on
//! Environment (runevo-engine)
//!     ↓ scored by
//! Episode Evaluator (evaluator)
//!     ↓ produces
//! Fitness
//!     ↓ guides
//! Selection, Crossover & Mutation (operators)
//! ```
//!
//! # Errors
//!
//! Invalid parameters are reported as [`ConfigurationError`] before any
//! generation runs. Environment failures abort the run and are returned
//! unchanged inside [`EvolutionError::Environment`].

use runevo_engine::EnvironmentError;

pub use self::{evaluator::*, genetic::*, individual::*, operators::*, stats::*};

pub mod evaluator;
pub mod genetic;
pub mod individual;
pub mod operators;
pub mod stats;

/// Parameters that cannot drive a run.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigurationError {
    #[display("population size must be at least 2, got {size}")]
    PopulationTooSmall { size: usize },
    #[display("selection pool size must be at least 2, got {size}")]
    SelectionTooSmall { size: usize },
    #[display(
        "selection pool size {selection_size} exceeds population size {population_size}"
    )]
    SelectionExceedsPopulation {
        selection_size: usize,
        population_size: usize,
    },
    #[display("tournament size must be positive")]
    ZeroTournamentSize,
    #[display("action count must be positive")]
    ZeroActionCount,
    #[display("generation count must be positive")]
    ZeroGenerations,
    #[display("mutation rate must be within [0, 1], got {rate}")]
    InvalidMutationRate { rate: f64 },
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From, derive_more::IsVariant)]
pub enum EvolutionError {
    #[display("invalid configuration: {_0}")]
    Configuration(ConfigurationError),
    #[display("environment error: {_0}")]
    Environment(EnvironmentError),
}
