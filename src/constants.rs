use bevy::prelude::Vec2;

// Matchstick layout (panel pixel space, y grows downward)
pub const MATCH_COUNT: usize = 10;
pub const MATCH_WIDTH: f32 = 5.0;
pub const PANEL_WIDTH: f32 = 220.0;
pub const PANEL_HEIGHT: f32 = 75.0;
pub const PANEL_SCALE: f32 = 3.0;   // Window pixels per panel pixel
pub const PANEL_GAP: f32 = 24.0;    // Window pixels between stacked panels

/// Ignition points, one per match. Two tally groups of five, the fifth crossing the other four.
pub const START_POINTS: [Vec2; MATCH_COUNT] = [
    // Left group
    Vec2::new(20.0, 60.0),
    Vec2::new(35.0, 60.0),
    Vec2::new(49.0, 60.0),
    Vec2::new(64.0, 60.0),
    Vec2::new(80.0, 50.0),
    // Right group
    Vec2::new(140.0, 60.0),
    Vec2::new(155.0, 60.0),
    Vec2::new(169.0, 60.0),
    Vec2::new(184.0, 60.0),
    Vec2::new(200.0, 50.0),
];

/// Where the flame ends up once a match is fully burned.
pub const END_POINTS: [Vec2; MATCH_COUNT] = [
    // Left group
    Vec2::new(20.0, 10.0),
    Vec2::new(35.0, 10.0),
    Vec2::new(49.0, 10.0),
    Vec2::new(64.0, 10.0),
    Vec2::new(10.0, 20.0),
    // Right group
    Vec2::new(140.0, 10.0),
    Vec2::new(155.0, 10.0),
    Vec2::new(169.0, 10.0),
    Vec2::new(184.0, 10.0),
    Vec2::new(130.0, 20.0),
];

// Wind settings
pub const WIND_RADIUS: f32 = 150.0;               // Pointer influence radius (panel pixels)
pub const WIND_STRENGTH: f32 = 10.0;              // Hard cap on combined wind magnitude
pub const ACCELEROMETER_SENSITIVITY: f32 = 0.5;   // Device acceleration -> wind scale
pub const POINTER_DAMPING: f32 = 0.5;             // Pointer delta -> velocity scale
pub const KEYBOARD_TILT: f32 = 1.5;               // Synthetic acceleration per arrow key

// Timing
pub const FLICKER_DURATION: f32 = 1.0;            // Seconds of flicker after an orientation change
pub const SPARK_DURATION: f32 = 0.5;              // Spark burst window after a match ignites
pub const PER_MATCH_DURATION: f32 = 10.0;         // Seconds per match in timer mode
pub const SECONDS_PER_DAY: f64 = 86_400.0;

// Spawn probabilities (per frame, active match only)
pub const ASH_SPAWN_PROBABILITY: f32 = 0.15;
pub const SMOKE_SPAWN_PROBABILITY: f32 = 0.4;
pub const SPARK_SPAWN_PROBABILITY: f32 = 0.6;
pub const SPARKS_PER_BURST: usize = 3;            // Sparks per successful spawn roll

// Particle lifecycles (life units, 255 = fully opaque)
pub const ASH_LIFE: f32 = 255.0;
pub const ASH_DECAY: f32 = 1.5;
pub const ASH_MAX_SPEED: f32 = 1.5;
pub const ASH_LIFT: f32 = -0.01;
pub const ASH_WIND_COUPLING: f32 = 0.5;

pub const SMOKE_MIN_LIFE: f32 = 150.0;
pub const SMOKE_MAX_LIFE: f32 = 220.0;
pub const SMOKE_DECAY: f32 = 2.5;
pub const SMOKE_MAX_SPEED: f32 = 2.5;
pub const SMOKE_LIFT: f32 = -0.02;
pub const SMOKE_WIND_COUPLING: f32 = 0.3;
pub const SMOKE_DRIFT: f32 = 0.01;                // Device-acceleration drift per unit of tilt

pub const SPARK_LIFE: f32 = 255.0;
pub const SPARK_DECAY: f32 = 10.0;
pub const SPARK_GRAVITY: f32 = 0.15;
pub const SPARK_MAX_SPEED: f32 = 6.0;
pub const SPARK_WIND_COUPLING: f32 = 0.2;

// Charred match texture
pub const FLECKS_PER_MATCH: f32 = 5.0;
pub const WIGGLE_AMPLITUDE: f32 = 2.5;
