use rand::{Rng, SeedableRng as _};
use rand_distr::Geometric;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::seed::CourseSeed;

/// Horizontal length of a generated course in pixels.
pub const COURSE_LENGTH: u32 = 2048;

const FIRST_OBSTACLE_X: u32 = 64;
const MIN_GAP: u32 = 24;
const MAX_EXTRA_GAP: u64 = 96;
const EXTRA_GAP_PROBABILITY: f64 = 0.04;

const PIT_WIDTH: (u32, u32) = (4, 12);
const WALL_WIDTH: (u32, u32) = (8, 24);
const WALL_HEIGHT: (u32, u32) = (4, 14);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// A gap in the ground. Touching its bottom costs a life.
    Pit,
    /// A solid block the runner must jump over or land on.
    Wall { height: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub start: u32,
    pub width: u32,
}

impl Obstacle {
    #[must_use]
    pub const fn end(&self) -> u32 {
        self.start + self.width
    }

    #[must_use]
    pub const fn contains(&self, x: u32) -> bool {
        self.start <= x && x < self.end()
    }
}

/// What lies under a horizontal position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Surface {
    /// Solid footing at the given height.
    Ground(u32),
    Pit,
}

/// The static shape of a course: its length and obstacles sorted by position.
///
/// Obstacles never overlap. Positions are measured in pixels from the start
/// line; the goal is at [`CourseLayout::length`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseLayout {
    length: u32,
    obstacles: Vec<Obstacle>,
}

impl CourseLayout {
    /// Builds a layout from explicit obstacles.
    ///
    /// # Panics
    ///
    /// Panics if obstacles overlap or extend past the goal.
    #[must_use]
    pub fn new(length: u32, mut obstacles: Vec<Obstacle>) -> Self {
        obstacles.sort_by_key(|o| o.start);
        assert!(
            obstacles.windows(2).all(|w| w[0].end() <= w[1].start),
            "obstacles must not overlap"
        );
        assert!(
            obstacles.last().is_none_or(|o| o.end() <= length),
            "obstacles must end before the goal"
        );
        Self { length, obstacles }
    }

    /// Generates a course from a seed.
    ///
    /// Pits and walls alternate randomly, separated by at least `MIN_GAP`
    /// pixels plus a geometrically distributed extra distance.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn generate(seed: CourseSeed) -> Self {
        let mut rng = Pcg32::from_seed(seed.to_bytes());
        let extra_gap = Geometric::new(EXTRA_GAP_PROBABILITY).expect("probability is in (0, 1]");

        let mut obstacles = vec![];
        let mut x = FIRST_OBSTACLE_X;
        loop {
            let (kind, width) = if rng.random_bool(0.5) {
                (ObstacleKind::Pit, rng.random_range(PIT_WIDTH.0..=PIT_WIDTH.1))
            } else {
                let height = rng.random_range(WALL_HEIGHT.0..=WALL_HEIGHT.1);
                let width = rng.random_range(WALL_WIDTH.0..=WALL_WIDTH.1);
                (ObstacleKind::Wall { height }, width)
            };
            if x + width + MIN_GAP >= COURSE_LENGTH {
                break;
            }
            obstacles.push(Obstacle {
                kind,
                start: x,
                width,
            });
            let extra = rng.sample(extra_gap).min(MAX_EXTRA_GAP) as u32;
            x += width + MIN_GAP + extra;
        }

        Self {
            length: COURSE_LENGTH,
            obstacles,
        }
    }

    #[must_use]
    pub fn length(&self) -> u32 {
        self.length
    }

    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Returns the obstacle covering `x` together with its index.
    #[must_use]
    pub fn obstacle_at(&self, x: u32) -> Option<(usize, &Obstacle)> {
        let idx = self.obstacles.partition_point(|o| o.end() <= x);
        self.obstacles
            .get(idx)
            .filter(|o| o.contains(x))
            .map(|o| (idx, o))
    }

    #[must_use]
    pub fn surface_at(&self, x: u32) -> Surface {
        match self.obstacle_at(x).map(|(_, o)| o.kind) {
            Some(ObstacleKind::Pit) => Surface::Pit,
            Some(ObstacleKind::Wall { height }) => Surface::Ground(height),
            None => Surface::Ground(0),
        }
    }

    /// Returns obstacles starting in `(x, x + distance]`.
    pub fn obstacles_ahead(&self, x: u32, distance: u32) -> impl Iterator<Item = &Obstacle> + '_ {
        let idx = self.obstacles.partition_point(|o| o.start <= x);
        self.obstacles[idx..]
            .iter()
            .take_while(move |o| o.start <= x.saturating_add(distance))
    }
}
