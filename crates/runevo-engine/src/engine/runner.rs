use serde::{Deserialize, Serialize};

use crate::{Action, CourseLayout, Surface};

/// Number of ticks the runner keeps rising while the jump button is held.
pub const JUMP_BUDGET: u32 = 16;

/// Result of advancing the runner by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub(crate) enum TickEvent {
    Moved,
    /// The runner reached the bottom of a pit.
    Fell,
}

/// Position and jump state of the controlled character.
///
/// Physics are pixel-based: one pixel of horizontal movement per tick while a
/// direction is held, one pixel of rise per tick while the jump button is held
/// (up to [`JUMP_BUDGET`] ticks), and one pixel of fall per tick otherwise.
/// The jump budget is only refilled by standing on solid ground with the jump
/// button released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runner {
    x: u32,
    altitude: u32,
    jump_budget: u32,
}

impl Runner {
    #[must_use]
    pub const fn new(x: u32) -> Self {
        Self {
            x,
            altitude: 0,
            jump_budget: JUMP_BUDGET,
        }
    }

    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    #[must_use]
    pub const fn altitude(&self) -> u32 {
        self.altitude
    }

    pub(crate) fn tick(&mut self, layout: &CourseLayout, input: Action) -> TickEvent {
        self.move_horizontally(layout, input);
        self.move_vertically(layout, input)
    }

    fn move_horizontally(&mut self, layout: &CourseLayout, input: Action) {
        let target = match input {
            Action::MoveLeft => self.x.checked_sub(1),
            Action::MoveRight if self.x < layout.length() => Some(self.x + 1),
            _ => None,
        };
        let Some(target) = target else {
            return;
        };
        // walls taller than the current altitude block movement
        if let Surface::Ground(height) = layout.surface_at(target)
            && height > self.altitude
        {
            return;
        }
        self.x = target;
    }

    fn move_vertically(&mut self, layout: &CourseLayout, input: Action) -> TickEvent {
        let floor = match layout.surface_at(self.x) {
            Surface::Ground(height) => Some(height),
            Surface::Pit => None,
        };
        // respawning at a wall puts the runner on top of it
        if let Some(height) = floor
            && height > self.altitude
        {
            self.altitude = height;
        }

        if input.is_activate_a() && self.jump_budget > 0 {
            self.altitude += 1;
            self.jump_budget -= 1;
            return TickEvent::Moved;
        }

        let on_floor = floor == Some(self.altitude);
        if !input.is_activate_a() {
            self.jump_budget = if on_floor { JUMP_BUDGET } else { 0 };
        }
        if on_floor {
            return TickEvent::Moved;
        }

        match floor {
            Some(_) => self.altitude -= 1,
            None if self.altitude <= 1 => {
                self.altitude = 0;
                return TickEvent::Fell;
            }
            None => self.altitude -= 1,
        }
        TickEvent::Moved
    }
}
