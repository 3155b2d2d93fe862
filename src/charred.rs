// Matchstick bodies: the pale unburned wood, the blackened burned segment with its
// flecks, and the pulsing ember where the flame sits.

use bevy::prelude::*;
use rand::Rng;

use crate::canvas::{rgba, Canvas};
use crate::constants::{FLECKS_PER_MATCH, WIGGLE_AMPLITUDE};
use crate::math_utils::{map_range, point_along};
use crate::noise_field::NoiseField;
use crate::types::MatchSlot;

const HEAD_LENGTH: f32 = 2.2;   // Match head size, in match widths
const HEAD_WIDTH: f32 = 1.5;
const EMBER_SIZE: f32 = 1.8;    // Ember diameter, in match widths
const EMBER_MIN_PROGRESS: f32 = 0.01;

fn wood_color() -> Color {
    rgba(222.0, 184.0, 135.0, 255.0)
}

fn head_color() -> Color {
    rgba(170.0, 30.0, 25.0, 255.0)
}

fn char_color() -> Color {
    rgba(30.0, 30.0, 30.0, 220.0)
}

pub struct CharredMatchRenderer<'a> {
    noise: &'a NoiseField,
    match_width: f32,
}

impl<'a> CharredMatchRenderer<'a> {
    pub fn new(noise: &'a NoiseField, match_width: f32) -> Self {
        Self { noise, match_width }
    }

    /// Lateral wobble of the charred segment, stable for a given (index, frame)
    pub fn wiggle(&self, index: usize, frame: f64) -> f32 {
        self.noise.centered(index as f64 * 1000.0 + frame * 0.015) * WIGGLE_AMPLITUDE
    }

    /// Unburned wood from the flame base to the end; the head survives until ignition
    pub fn render_fresh(&self, canvas: &mut impl Canvas, slot: &MatchSlot) {
        if slot.burn_progress >= 1.0 {
            return;
        }
        canvas.line(slot.flame_base(), slot.end, self.match_width, wood_color());

        if slot.burn_progress <= 0.0 {
            canvas.ellipse(
                slot.start,
                Vec2::new(self.match_width * HEAD_WIDTH, self.match_width * HEAD_LENGTH),
                head_color(),
            );
        }
    }

    /// Blackened segment up to the current progress. `is_active` marks the match
    /// that is burning right now and gets the ember glow.
    pub fn render(
        &self,
        canvas: &mut impl Canvas,
        slot: &MatchSlot,
        index: usize,
        is_active: bool,
        frame: f64,
        rng: &mut impl Rng,
    ) {
        let progress = slot.burn_progress;
        if progress <= 0.0 {
            return;
        }

        let wiggle = Vec2::new(self.wiggle(index, frame), 0.0);
        let char_end = slot.flame_base();
        canvas.line(slot.start + wiggle, char_end + wiggle, self.match_width, char_color());

        let flecks = (FLECKS_PER_MATCH * progress).ceil() as usize;
        let max_size = (self.match_width * 0.8).max(1.0);
        for _ in 0..flecks {
            let t = rng.gen_range(0.0..=progress);
            let jitter = Vec2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
            let at = point_along(slot.start, slot.end, t) + wiggle + jitter;
            let size = rng.gen_range(1.0..=max_size);
            let color = rgba(
                15.0 + rng.gen_range(0.0..15.0),
                15.0 + rng.gen_range(0.0..15.0),
                15.0 + rng.gen_range(0.0..15.0),
                rng.gen_range(100.0..200.0),
            );
            canvas.ellipse(at, Vec2::splat(size), color);
        }

        if is_active && progress > EMBER_MIN_PROGRESS && progress < 1.0 {
            let pulse = (frame * 0.1 + index as f64 * 5.0).sin() as f32;
            let alpha = map_range(pulse, -1.0, 1.0, 30.0, 80.0);
            canvas.ellipse(
                char_end + wiggle,
                Vec2::splat(self.match_width * EMBER_SIZE),
                rgba(255.0, 100.0, 0.0, alpha),
            );
        }
    }
}
