pub mod runner_model;
