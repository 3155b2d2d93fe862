// Input signal boundary
// Sensor-style inputs (pointer, device motion, orientation) are folded into one
// InputSignals snapshot at the start of each frame. Simulation code only reads it.

use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

use crate::constants::*;

/// Per-frame snapshot of every external signal the simulation consumes
#[derive(Resource, Default, Debug, Clone)]
pub struct InputSignals {
    pub pointer: Option<Vec2>,             // Window pixels, origin top-left
    pub pointer_velocity: Vec2,            // Damped per-frame pointer delta
    pub device_acceleration: Vec2,         // Raw tilt, zero when motion is unavailable
    pub orientation_angle: f32,            // Degrees
    pub orientation_changed_at: Option<f64>,
    last_pointer: Option<Vec2>,
}

impl InputSignals {
    /// Feed a new pointer sample. Velocity is the damped delta from the previous sample.
    pub fn observe_pointer(&mut self, position: Option<Vec2>) {
        self.pointer_velocity = match (position, self.last_pointer) {
            (Some(now), Some(before)) => (now - before) * POINTER_DAMPING,
            _ => Vec2::ZERO,
        };
        self.pointer = position;
        self.last_pointer = position;
    }

    /// Record an orientation angle. Returns true when it differs from the last one.
    pub fn observe_orientation(&mut self, angle: f32, now: f64) -> bool {
        if angle == self.orientation_angle {
            return false;
        }
        self.orientation_angle = angle;
        self.orientation_changed_at = Some(now);
        true
    }
}

/// Whether device motion may be read. Denial degrades wind to pointer-only.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MotionPermission {
    #[default]
    Granted,
    Denied,
}

/// Accelerometer reading from the platform (or the keyboard tilt fallback)
#[derive(Event, Clone, Copy, Debug)]
pub struct DeviceMotion {
    pub acceleration: Vec2,
}

/// Screen orientation changed to `angle` degrees
#[derive(Event, Clone, Copy, Debug)]
pub struct OrientationChanged {
    pub angle: f32,
}

// ===== SYSTEMS =====

/// System: sample the cursor and derive pointer velocity
pub fn track_pointer(
    window_query: Query<&Window, With<PrimaryWindow>>,
    mut signals: ResMut<InputSignals>,
) {
    let Ok(window) = window_query.single() else { return };
    signals.observe_pointer(window.cursor_position());
}

/// System: arrow keys stand in for an accelerometer on desktop
pub fn keyboard_tilt(
    keys: Res<ButtonInput<KeyCode>>,
    mut motion_events: EventWriter<DeviceMotion>,
) {
    let mut tilt = Vec2::ZERO;
    if keys.pressed(KeyCode::ArrowLeft) {
        tilt.x -= KEYBOARD_TILT;
    }
    if keys.pressed(KeyCode::ArrowRight) {
        tilt.x += KEYBOARD_TILT;
    }
    if keys.pressed(KeyCode::ArrowUp) {
        tilt.y -= KEYBOARD_TILT;
    }
    if keys.pressed(KeyCode::ArrowDown) {
        tilt.y += KEYBOARD_TILT;
    }

    let released = keys.any_just_released([
        KeyCode::ArrowLeft,
        KeyCode::ArrowRight,
        KeyCode::ArrowUp,
        KeyCode::ArrowDown,
    ]);
    if tilt != Vec2::ZERO || released {
        motion_events.write(DeviceMotion { acceleration: tilt });
    }
}

/// System: latest motion reading wins; denied permission pins acceleration to zero
pub fn read_device_motion(
    permission: Res<MotionPermission>,
    mut motion_events: EventReader<DeviceMotion>,
    mut signals: ResMut<InputSignals>,
) {
    let latest = motion_events.read().last().copied();
    if *permission == MotionPermission::Denied {
        signals.device_acceleration = Vec2::ZERO;
        return;
    }
    if let Some(motion) = latest {
        signals.device_acceleration = motion.acceleration;
    }
}

/// System: treat a portrait/landscape flip of the window as an orientation change
pub fn detect_orientation_change(
    mut resize_events: EventReader<WindowResized>,
    mut orientation_events: EventWriter<OrientationChanged>,
    mut last_angle: Local<Option<f32>>,
) {
    let Some(resized) = resize_events.read().last() else { return };
    let angle = if resized.height > resized.width { 90.0 } else { 0.0 };

    match *last_angle {
        // First size we see is the starting orientation, not a change
        None => *last_angle = Some(angle),
        Some(previous) if previous != angle => {
            *last_angle = Some(angle);
            orientation_events.write(OrientationChanged { angle });
        }
        Some(_) => {}
    }
}

/// System: stamp orientation changes with the current time
pub fn record_orientation_change(
    time: Res<Time>,
    mut orientation_events: EventReader<OrientationChanged>,
    mut signals: ResMut<InputSignals>,
) {
    let now = time.elapsed_secs_f64();
    for event in orientation_events.read() {
        if signals.observe_orientation(event.angle, now) {
            debug!("Orientation changed to {}°, flickering flames", event.angle);
        }
    }
}
