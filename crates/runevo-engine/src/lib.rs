//! Game environments driven by held button inputs.
//!
//! This crate defines the contract between the training system and a game:
//! the [`Environment`] trait, the [`Action`] set an agent can hold, and the
//! [`StepOutcome`] reported after each held input. It also ships
//! [`CourseEnvironment`], a deterministic side-scrolling course used to train
//! and replay action sequences without an emulator.
//!
//! # Example
//!
//! ```
//! use runevo_engine::{Action, CourseEnvironment, CourseSeed, Environment, Progress};
//! use rand::Rng as _;
//!
//! let seed: CourseSeed = rand::rng().random();
//! let mut env = CourseEnvironment::new(seed);
//! env.reset().unwrap();
//!
//! let outcome = env.step(Action::MoveRight, 10).unwrap();
//! assert!(matches!(outcome.progress, Progress::InProgress(_)));
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Failure raised by an environment backend.
///
/// Environments are not expected to recover from these; the training loop
/// aborts the run when one is returned.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum EnvironmentError {
    #[display("environment failed to reset: {reason}")]
    Reset { reason: String },
    #[display("environment failed to step: {reason}")]
    Step { reason: String },
}
