use std::path::Path;

use chrono::{DateTime, Utc};
use runevo_engine::CourseSeed;
use runevo_training::{Gene, Individual};
use serde::{Deserialize, Serialize};

use crate::util;

/// A trained action sequence together with the course it was trained on.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RunnerModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub course_seed: CourseSeed,
    pub final_fitness: f32,
    pub actions: Vec<Gene>,
}

impl RunnerModel {
    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        util::read_json_file("runner model", path)
    }

    pub fn to_individual(&self) -> Individual {
        let mut individual = Individual::from_actions(self.actions.clone());
        individual.set_fitness(self.final_fitness);
        individual
    }
}
