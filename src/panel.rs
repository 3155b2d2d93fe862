// Matchstick panels
// Each panel is an entity owning its slots, progression, particles and flicker timer.
// Panels share only the pure NoiseField and WindModel resources.

use bevy::diagnostic::FrameCount;
use bevy::input::InputSystem;
use bevy::prelude::*;
use bevy::render::view::NoFrustumCulling;
use bevy::sprite::AlphaMode2d;
use bevy::window::PrimaryWindow;
use rand::Rng;

use crate::canvas::{Canvas, CanvasTransform, MeshCanvas};
use crate::charred::CharredMatchRenderer;
use crate::config::{ConfigError, PanelConfig};
use crate::constants::{PANEL_GAP, PANEL_HEIGHT, PANEL_SCALE, PANEL_WIDTH};
use crate::flame::{FlameParams, FlameRenderer, FlickerState};
use crate::input::{
    detect_orientation_change, keyboard_tilt, read_device_motion, record_orientation_change,
    track_pointer, DeviceMotion, InputSignals, MotionPermission, OrientationChanged,
};
use crate::noise_field::NoiseField;
use crate::particles::{ParticleSystem, SpawnSite};
use crate::progression::{apply_phase, MatchProgression};
use crate::types::{BurnPhase, FrameClock, MatchSlot};
use crate::wind::WindModel;

pub struct MatchstickPlugin {
    pub panels: Vec<PanelConfig>,
}

impl Plugin for MatchstickPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(PanelLayout {
            panels: self.panels.clone(),
        })
        .init_resource::<NoiseField>()
        .init_resource::<WindModel>()
        .init_resource::<InputSignals>()
        .init_resource::<MotionPermission>()
        .add_event::<DeviceMotion>()
        .add_event::<OrientationChanged>()
        .add_systems(Startup, spawn_panels)
        .add_systems(
            PreUpdate,
            (
                track_pointer,
                keyboard_tilt,
                read_device_motion,
                detect_orientation_change,
                record_orientation_change,
            )
                .chain()
                .after(InputSystem),
        )
        .add_systems(Update, tick_panels);
    }
}

/// Panel configurations waiting to be spawned, top to bottom
#[derive(Resource, Clone, Debug, Default)]
pub struct PanelLayout {
    pub panels: Vec<PanelConfig>,
}

/// Window placement of the panel at `position` in the vertical stack
pub fn panel_transform(position: usize) -> CanvasTransform {
    let stride = PANEL_HEIGHT * PANEL_SCALE + PANEL_GAP;
    CanvasTransform {
        origin: Vec2::new(PANEL_GAP, PANEL_GAP + position as f32 * stride),
        scale: PANEL_SCALE,
    }
}

/// Window size that fits `count` stacked panels with a gap all around
pub fn window_size_for(count: usize) -> Vec2 {
    let count = count.max(1) as f32;
    Vec2::new(
        PANEL_WIDTH * PANEL_SCALE + PANEL_GAP * 2.0,
        PANEL_HEIGHT * PANEL_SCALE * count + PANEL_GAP * (count + 1.0),
    )
}

/// Shared, read-only inputs for one panel tick
pub struct FrameContext<'a> {
    pub clock: FrameClock,
    pub signals: &'a InputSignals,
    pub wind: &'a WindModel,
    pub noise: &'a NoiseField,
    pub transform: CanvasTransform,
}

#[derive(Component)]
pub struct MatchPanel {
    pub config: PanelConfig,
    pub slots: Vec<MatchSlot>,
    progression: MatchProgression,
    particles: ParticleSystem,
    flicker: FlickerState,
}

impl MatchPanel {
    pub fn new(config: PanelConfig, now_secs: f64) -> Result<Self, ConfigError> {
        config.validate()?;

        let slots = config
            .start_points
            .iter()
            .zip(&config.end_points)
            .map(|(&start, &end)| MatchSlot::new(start, end))
            .collect::<Vec<_>>();
        let progression = MatchProgression::new(config.mode, slots.len(), now_secs);

        Ok(Self {
            config,
            slots,
            progression,
            particles: ParticleSystem::default(),
            flicker: FlickerState::default(),
        })
    }

    #[cfg(test)]
    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn progression(&self) -> &MatchProgression {
        &self.progression
    }

    /// One frame: progression, stick bodies, flame, spawning, then particles
    pub fn tick(&mut self, ctx: &FrameContext, canvas: &mut impl Canvas, rng: &mut impl Rng) {
        let step = self.progression.advance(&ctx.clock);
        if step.restarted {
            info!(
                "Panel '{}': all matches spent, relighting at {:.1}s",
                self.config.name,
                self.progression.state().cycle_start
            );
            if !self.particles.is_empty() {
                debug!("Panel '{}': cleared {} particles", self.config.name, self.particles.len());
            }
            self.particles.clear();
        }
        apply_phase(&step.phase, &mut self.slots);

        let frame = ctx.clock.frame_f64();
        let active = step.phase.active_index();

        let sticks = CharredMatchRenderer::new(ctx.noise, self.config.match_width);
        for (i, slot) in self.slots.iter().enumerate() {
            sticks.render_fresh(canvas, slot);
            sticks.render(canvas, slot, i, active == Some(i), frame, rng);
        }

        // Pointer in this panel's pixel space
        let pointer = ctx.signals.pointer.map(|p| ctx.transform.from_window(p));
        self.flicker.observe(ctx.signals.orientation_changed_at);

        if let BurnPhase::Burning { active_index, progress } = step.phase {
            if progress > 0.0 {
                let flame = FlameRenderer::new(&self.config.flame, ctx.noise);
                let base = self.slots[active_index].flame_base();
                let wind = ctx.wind.at(flame.wind_sample_point(base, progress), pointer, ctx.signals);
                let opacity = self.flicker.opacity(
                    ctx.clock.now_secs,
                    self.config.flicker_duration,
                    ctx.noise,
                    frame * 0.1 + active_index as f64,
                );

                let tip = flame.render_flame(
                    canvas,
                    &FlameParams {
                        base,
                        index: active_index,
                        progress,
                        wind,
                        frame,
                        opacity,
                    },
                );

                self.particles.spawn_from_flame(
                    &SpawnSite {
                        base,
                        tip,
                        match_width: self.config.match_width,
                        ignition_age: step.ignition_age,
                        spark_duration: self.config.spark_duration,
                    },
                    rng,
                );
            }
        }

        self.particles.update_and_draw(
            |at| ctx.wind.at(at, pointer, ctx.signals),
            ctx.signals.device_acceleration,
            canvas,
        );
    }
}

// ===== SYSTEMS =====

/// Startup: build a panel entity per valid config; invalid ones are logged and skipped
fn spawn_panels(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    layout: Res<PanelLayout>,
    permission: Res<MotionPermission>,
    time: Res<Time>,
) {
    debug!("Device motion permission: {:?}", *permission);
    let now = time.elapsed_secs_f64();

    // Colours live in the vertices; the material only has to blend them
    let material = materials.add(ColorMaterial {
        alpha_mode: AlphaMode2d::Blend,
        ..default()
    });

    for (position, config) in layout.panels.iter().enumerate() {
        match MatchPanel::new(config.clone(), now) {
            Ok(panel) => {
                let progression = panel.progression();
                match progression.cycle_duration() {
                    Some(secs) => info!(
                        "Spawned panel '{}' with {} matches, {:.0}s per cycle",
                        panel.config.name,
                        panel.config.match_count(),
                        secs
                    ),
                    None => info!(
                        "Spawned panel '{}' with {} matches ({:?}, slot {})",
                        panel.config.name,
                        panel.config.match_count(),
                        progression.mode(),
                        progression.state().active_index
                    ),
                }
                commands.spawn((
                    panel,
                    panel_transform(position),
                    Mesh2d(meshes.add(MeshCanvas::blank_mesh())),
                    MeshMaterial2d(material.clone()),
                    // Vertices move every frame; the blank mesh's bounds would cull them
                    NoFrustumCulling,
                ));
            }
            Err(err) => error!("Skipping panel: {}", err),
        }
    }
}

/// Update: tick every panel and rebuild its mesh from what it drew
fn tick_panels(
    mut meshes: ResMut<Assets<Mesh>>,
    time: Res<Time>,
    frames: Res<FrameCount>,
    signals: Res<InputSignals>,
    wind: Res<WindModel>,
    noise: Res<NoiseField>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    mut panels: Query<(&mut MatchPanel, &CanvasTransform, &Mesh2d)>,
) {
    let Ok(window) = window_query.single() else { return };
    let window_size = window.size();

    let clock = FrameClock {
        now_secs: time.elapsed_secs_f64(),
        frame: frames.0,
        local_time: chrono::Local::now().naive_local(),
    };
    let mut rng = rand::thread_rng();

    for (mut panel, transform, mesh2d) in &mut panels {
        let ctx = FrameContext {
            clock,
            signals: &signals,
            wind: &wind,
            noise: &noise,
            transform: *transform,
        };
        let mut canvas = MeshCanvas::new(*transform, window_size);
        panel.tick(&ctx, &mut canvas, &mut rng);
        if let Some(mesh) = meshes.get_mut(&mesh2d.0) {
            canvas.write_to(mesh);
        }
    }
}
