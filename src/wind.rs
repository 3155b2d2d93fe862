// Wind model: pointer motion + device tilt folded into one bounded force

use bevy::prelude::*;

use crate::constants::*;
use crate::input::InputSignals;

/// Pure wind service. Holds only tuning values, so all panels can share one.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct WindModel {
    pub radius: f32,
    pub strength: f32,
    pub accelerometer_sensitivity: f32,
}

impl Default for WindModel {
    fn default() -> Self {
        Self {
            radius: WIND_RADIUS,
            strength: WIND_STRENGTH,
            accelerometer_sensitivity: ACCELEROMETER_SENSITIVITY,
        }
    }
}

impl WindModel {
    /// Contribution of pointer motion alone at `point`.
    /// Zero beyond `radius` or when the pointer is still; otherwise points along the
    /// pointer velocity with a magnitude falling linearly from `strength` to 0.
    pub fn pointer_term(&self, point: Vec2, pointer_pos: Vec2, pointer_velocity: Vec2) -> Vec2 {
        let distance = point.distance(pointer_pos);
        if distance > self.radius || pointer_velocity == Vec2::ZERO {
            return Vec2::ZERO;
        }
        let falloff = 1.0 - distance / self.radius;
        pointer_velocity.normalize_or_zero() * (self.strength * falloff)
    }

    /// Contribution of device acceleration alone
    pub fn device_term(&self, device_acceleration: Vec2) -> Vec2 {
        device_acceleration * self.accelerometer_sensitivity * self.strength
    }

    /// Combined wind at `point`. Both terms are summed first and the sum is then
    /// hard-capped at `strength`.
    pub fn influence(
        &self,
        point: Vec2,
        pointer_pos: Option<Vec2>,
        pointer_velocity: Vec2,
        device_acceleration: Vec2,
    ) -> Vec2 {
        let mut wind = self.device_term(device_acceleration);
        if let Some(pointer_pos) = pointer_pos {
            wind += self.pointer_term(point, pointer_pos, pointer_velocity);
        }

        if wind.length() > self.strength {
            wind = wind.normalize() * self.strength;
        }
        wind
    }

    /// Wind at `point` given the frame's input snapshot, with the pointer already
    /// mapped into the same space as `point`
    pub fn at(&self, point: Vec2, pointer_pos: Option<Vec2>, signals: &InputSignals) -> Vec2 {
        self.influence(
            point,
            pointer_pos,
            signals.pointer_velocity,
            signals.device_acceleration,
        )
    }
}
