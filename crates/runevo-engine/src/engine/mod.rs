//! Environment contract and the built-in course simulation.
//!
//! - [`Environment`] - What the training system needs from a game
//! - [`StepOutcome`] / [`Progress`] - Feedback from one held action
//! - [`CourseEnvironment`] - Deterministic side-scrolling course
//! - [`Runner`] - Pixel physics of the controlled character
//!
//! # Episode Flow
//!
//! 1. [`Environment::reset`] starts a fresh episode
//! 2. [`Environment::step`] holds one action for a number of ticks, then releases it
//! 3. Repeat until the action sequence is exhausted or the step reports
//!    [`Progress::GameOver`]

pub use self::{course_env::*, environment::*, runner::*};

mod course_env;
mod environment;
mod runner;
