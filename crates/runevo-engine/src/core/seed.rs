use std::{fmt, str::FromStr};

use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Seed for deterministic course generation.
///
/// A 128-bit seed that initializes the course generator. The same seed always
/// produces the same [`CourseLayout`](crate::CourseLayout), which makes
/// training runs reproducible and lets a saved model be replayed on the course
/// it was trained on.
///
/// Seeds are written as 32-character big-endian hex strings.
///
/// # Example
///
/// ```
/// use runevo_engine::{CourseLayout, CourseSeed};
/// use rand::Rng as _;
///
/// let seed: CourseSeed = rand::rng().random();
/// assert_eq!(CourseLayout::generate(seed), CourseLayout::generate(seed));
///
/// let parsed: CourseSeed = seed.to_string().parse().unwrap();
/// assert_eq!(parsed, seed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CourseSeed([u8; 16]);

impl CourseSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid hex: {reason}")]
pub struct ParseCourseSeedError {
    reason: String,
}

impl fmt::Display for CourseSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for CourseSeed {
    type Err = ParseCourseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(ParseCourseSeedError {
                reason: format!("expected 32 characters, got {}", s.len()),
            });
        }
        let num = u128::from_str_radix(s, 16).map_err(|e| ParseCourseSeedError {
            reason: format!("{s} ({e})"),
        })?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for CourseSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CourseSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `CourseSeed` values with `rng.random()`.
impl Distribution<CourseSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> CourseSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        CourseSeed(seed)
    }
}
