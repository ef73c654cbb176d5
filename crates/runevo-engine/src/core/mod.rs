pub use self::{action::*, course::*, seed::*};

pub(crate) mod action;
pub(crate) mod course;
pub(crate) mod seed;
