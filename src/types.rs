use bevy::prelude::*;
use chrono::NaiveDateTime;

/// One matchstick on a panel. Endpoints are layout constants; only the progress moves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchSlot {
    pub start: Vec2,
    pub end: Vec2,
    pub burn_progress: f32,
}

impl MatchSlot {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self {
            start,
            end,
            burn_progress: 0.0,
        }
    }

    /// Where the flame currently sits: the far end of the charred segment
    pub fn flame_base(&self) -> Vec2 {
        self.start.lerp(self.end, self.burn_progress)
    }

    #[cfg(test)]
    pub fn is_partially_burned(&self) -> bool {
        self.burn_progress > 0.0 && self.burn_progress < 1.0
    }
}

/// Which part of its lifecycle a panel is in this frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BurnPhase {
    Unburned,
    Burning { active_index: usize, progress: f32 },
    Burned,
}

impl BurnPhase {
    /// Burn progress of slot `index` under this phase
    pub fn slot_progress(&self, index: usize) -> f32 {
        match *self {
            BurnPhase::Unburned => 0.0,
            BurnPhase::Burned => 1.0,
            BurnPhase::Burning { active_index, progress } => {
                if index < active_index {
                    1.0
                } else if index == active_index {
                    progress
                } else {
                    0.0
                }
            }
        }
    }

    pub fn active_index(&self) -> Option<usize> {
        match *self {
            BurnPhase::Burning { active_index, .. } => Some(active_index),
            _ => None,
        }
    }
}

/// Host-provided time for one frame
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    pub now_secs: f64,              // Monotonic seconds since startup
    pub frame: u32,                 // Frames rendered so far
    pub local_time: NaiveDateTime,  // Wall clock, local timezone
}

impl FrameClock {
    /// Frame counter as a noise-seed coordinate. f32 would merge neighbouring
    /// frames after 2^24 (a few days at 60 Hz).
    pub fn frame_f64(&self) -> f64 {
        self.frame as f64
    }
}
