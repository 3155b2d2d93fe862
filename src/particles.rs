// Ash, smoke and spark particles
// CPU-simulated, one frame per update, pushed around by the same wind as the flames.

use bevy::prelude::*;
use rand::Rng;

use crate::canvas::{rgba, Canvas};
use crate::constants::*;
use crate::math_utils::{limit_length, map_range};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleKind {
    Ash,
    Smoke,
    Spark,
}

impl ParticleKind {
    fn decay(self) -> f32 {
        match self {
            ParticleKind::Ash => ASH_DECAY,
            ParticleKind::Smoke => SMOKE_DECAY,
            ParticleKind::Spark => SPARK_DECAY,
        }
    }

    fn max_speed(self) -> f32 {
        match self {
            ParticleKind::Ash => ASH_MAX_SPEED,
            ParticleKind::Smoke => SMOKE_MAX_SPEED,
            ParticleKind::Spark => SPARK_MAX_SPEED,
        }
    }

    fn wind_coupling(self) -> f32 {
        match self {
            ParticleKind::Ash => ASH_WIND_COUPLING,
            ParticleKind::Smoke => SMOKE_WIND_COUPLING,
            ParticleKind::Spark => SPARK_WIND_COUPLING,
        }
    }

    /// Constant body force: buoyant lift for ash and smoke, gravity for sparks
    fn body_force(self) -> Vec2 {
        match self {
            ParticleKind::Ash => Vec2::new(0.0, ASH_LIFT),
            ParticleKind::Smoke => Vec2::new(0.0, SMOKE_LIFT),
            ParticleKind::Spark => Vec2::new(0.0, SPARK_GRAVITY),
        }
    }

    /// Life value the particle's fade and shrink are measured against
    fn full_life(self) -> f32 {
        match self {
            ParticleKind::Ash => ASH_LIFE,
            ParticleKind::Smoke => SMOKE_MAX_LIFE,
            ParticleKind::Spark => SPARK_LIFE,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub kind: ParticleKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub life: f32,
    pub size: f32,
    pub initial_size: f32,
    pub shade: f32,     // Grey level for ash and smoke
}

impl Particle {
    /// Flake shed from the charred stick just below the flame
    pub fn ash(at: Vec2, rng: &mut impl Rng) -> Self {
        let size = rng.gen_range(1.5..3.5);
        Self {
            kind: ParticleKind::Ash,
            position: at,
            velocity: Vec2::new(rng.gen_range(-0.4..0.4), rng.gen_range(-0.8..-0.2)),
            acceleration: Vec2::ZERO,
            life: ASH_LIFE,
            size,
            initial_size: size,
            shade: rng.gen_range(30.0..60.0),
        }
    }

    /// Puff released around the flame tip
    pub fn smoke(at: Vec2, rng: &mut impl Rng) -> Self {
        let size = rng.gen_range(4.0..8.0);
        Self {
            kind: ParticleKind::Smoke,
            position: at + Vec2::new(rng.gen_range(-5.0..5.0), rng.gen_range(-10.0..0.0)),
            velocity: Vec2::new(rng.gen_range(-0.3..0.3), rng.gen_range(-1.5..-0.8)),
            acceleration: Vec2::ZERO,
            life: rng.gen_range(SMOKE_MIN_LIFE..SMOKE_MAX_LIFE),
            size,
            initial_size: size,
            shade: rng.gen_range(150.0..200.0),
        }
    }

    /// Fast, short-lived spark thrown up when a match head ignites
    pub fn spark(at: Vec2, rng: &mut impl Rng) -> Self {
        let size = rng.gen_range(1.0..2.2);
        Self {
            kind: ParticleKind::Spark,
            position: at,
            velocity: Vec2::new(rng.gen_range(-2.0..2.0), rng.gen_range(-4.0..-1.5)),
            acceleration: Vec2::ZERO,
            life: SPARK_LIFE,
            size,
            initial_size: size,
            shade: 0.0,
        }
    }

    pub fn life_ratio(&self) -> f32 {
        self.life / self.kind.full_life()
    }

    pub fn is_dead(&self) -> bool {
        self.life < 0.0
    }

    /// Advance one frame. Acceleration is rebuilt from scratch every call, so
    /// forces never carry over between frames.
    pub fn update(&mut self, wind: Vec2, device_acceleration: Vec2) {
        self.acceleration = self.kind.body_force() + wind * self.kind.wind_coupling();
        if self.kind == ParticleKind::Smoke {
            // Smoke leans with the device tilt
            self.acceleration += Vec2::new(device_acceleration.x, -device_acceleration.y) * SMOKE_DRIFT;
        }

        self.velocity = limit_length(self.velocity + self.acceleration, self.kind.max_speed());
        self.position += self.velocity;
        self.life -= self.kind.decay();

        if self.kind == ParticleKind::Smoke {
            self.size = smoke_size(self.initial_size, self.life_ratio());
        }
    }

    pub fn color(&self) -> Color {
        match self.kind {
            ParticleKind::Ash => rgba(self.shade, self.shade, self.shade, self.life),
            ParticleKind::Smoke => {
                let alpha = map_range(self.life, 0.0, SMOKE_MAX_LIFE, 0.0, 80.0);
                rgba(self.shade, self.shade, self.shade, alpha)
            }
            ParticleKind::Spark => {
                // Yellow-white when fresh, cooling to orange
                let heat = self.life_ratio().clamp(0.0, 1.0);
                rgba(
                    255.0,
                    140.0 + 110.0 * heat,
                    30.0 + 190.0 * heat,
                    self.life,
                )
            }
        }
    }

    pub fn draw(&self, canvas: &mut impl Canvas) {
        canvas.ellipse(self.position, Vec2::splat(self.size), self.color());
    }
}

/// Smoke swells as it ages, then shrinks over the last half of its life. Below
/// ratio 0.5 the factor runs linearly from 1 down to 0 rather than stopping at a
/// 0.5 floor, so the size stays under 1.5x the initial size and reaches 0 at death.
pub fn smoke_size(initial_size: f32, life_ratio: f32) -> f32 {
    let mut size = initial_size * (1.0 + (1.0 - life_ratio) * 0.5);
    if life_ratio < 0.5 {
        size *= map_range(life_ratio, 0.5, 0.0, 1.0, 0.0).max(0.0);
    }
    size
}

/// Everything needed to decide what the burning match sheds this frame
#[derive(Clone, Copy, Debug)]
pub struct SpawnSite {
    pub base: Vec2,          // Flame base on the stick
    pub tip: Vec2,           // Flame tip, where smoke starts
    pub match_width: f32,
    pub ignition_age: f32,   // Seconds since this match caught
    pub spark_duration: f32,
}

/// Live particles of one panel, kept per kind
#[derive(Default, Debug, Clone)]
pub struct ParticleSystem {
    ash: Vec<Particle>,
    smoke: Vec<Particle>,
    sparks: Vec<Particle>,
}

impl ParticleSystem {
    pub fn spawn(&mut self, particle: Particle) {
        match particle.kind {
            ParticleKind::Ash => self.ash.push(particle),
            ParticleKind::Smoke => self.smoke.push(particle),
            ParticleKind::Spark => self.sparks.push(particle),
        }
    }

    /// Roll this frame's spawns for the burning match: a spark burst right after
    /// ignition, ash and smoke afterwards
    pub fn spawn_from_flame(&mut self, site: &SpawnSite, rng: &mut impl Rng) {
        if site.ignition_age < site.spark_duration {
            if rng.gen::<f32>() < SPARK_SPAWN_PROBABILITY {
                for _ in 0..SPARKS_PER_BURST {
                    self.spawn(Particle::spark(site.base, rng));
                }
            }
            return;
        }

        if rng.gen::<f32>() < ASH_SPAWN_PROBABILITY {
            let half = site.match_width * 0.5;
            let at = site.base + Vec2::new(rng.gen_range(-half..half), 5.0);
            self.spawn(Particle::ash(at, rng));
        }
        if rng.gen::<f32>() < SMOKE_SPAWN_PROBABILITY {
            self.spawn(Particle::smoke(site.tip, rng));
        }
    }

    /// Advance, draw and prune every collection in one pass each
    pub fn update_and_draw(
        &mut self,
        wind_at: impl Fn(Vec2) -> Vec2,
        device_acceleration: Vec2,
        canvas: &mut impl Canvas,
    ) {
        for list in [&mut self.ash, &mut self.smoke, &mut self.sparks] {
            // Reverse order so removals never skip a neighbour
            for i in (0..list.len()).rev() {
                let particle = &mut list[i];
                particle.update(wind_at(particle.position), device_acceleration);
                if particle.is_dead() {
                    list.remove(i);
                } else {
                    particle.draw(canvas);
                }
            }
        }
    }

    /// Hard reset at a cycle restart
    pub fn clear(&mut self) {
        self.ash.clear();
        self.smoke.clear();
        self.sparks.clear();
    }

    #[cfg(test)]
    pub fn count(&self, kind: ParticleKind) -> usize {
        match kind {
            ParticleKind::Ash => self.ash.len(),
            ParticleKind::Smoke => self.smoke.len(),
            ParticleKind::Spark => self.sparks.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.ash.len() + self.smoke.len() + self.sparks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.ash.iter().chain(self.smoke.iter()).chain(self.sparks.iter())
    }
}
