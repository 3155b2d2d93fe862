// Procedural match flame
// Three nested noise-driven silhouettes (outer, mid, inner) plus a faint heat haze,
// rebuilt from scratch every frame and bent by the wind.

use bevy::prelude::*;

use crate::canvas::{rgba, Canvas};
use crate::config::FlameStyle;
use crate::curve::{tessellate, CURVE_STEPS};
use crate::math_utils::map_range;
use crate::noise_field::NoiseField;

const HAZE_STRANDS: usize = 3;
const HAZE_SEGMENTS: usize = 5;
const HAZE_WIDTH: f32 = 1.5;
const BASE_CONTROL_OFFSET: f32 = 3.0;   // Rounds the bottom of each layer
const BASE_ELLIPSE_HEIGHT: f32 = 5.0;

/// One sampled point up the centre line of a layer, relative to the flame base
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerPoint {
    pub center: Vec2,
    pub width: f32,
}

/// Which of the three nested silhouettes to build
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
    Outer,
    Mid,
    Inner,
}

impl LayerKind {
    pub const ALL: [LayerKind; 3] = [LayerKind::Outer, LayerKind::Mid, LayerKind::Inner];

    /// (height scale, width scale, taper scale)
    fn proportions(self) -> (f32, f32, f32) {
        match self {
            LayerKind::Outer => (1.0, 1.0, 1.0),
            LayerKind::Mid => (0.85, 0.7, 0.8),
            LayerKind::Inner => (0.5, 0.4, 0.5),
        }
    }

    fn seed_offset(self) -> f64 {
        match self {
            LayerKind::Outer => 0.0,
            LayerKind::Mid => 100.0,
            LayerKind::Inner => 200.0,
        }
    }

    /// Deep orange outside, amber in the middle, near-white core; each channel flickers
    fn color(self, noise: &NoiseField, time_noise: f64, alpha_scale: f32) -> Color {
        match self {
            LayerKind::Outer => rgba(
                255.0,
                100.0 + noise.sample(time_noise + 10.0) * 120.0,
                0.0,
                180.0 * alpha_scale,
            ),
            LayerKind::Mid => rgba(
                255.0,
                200.0 + noise.sample(time_noise + 20.0) * 55.0,
                50.0,
                210.0 * alpha_scale,
            ),
            LayerKind::Inner => rgba(
                255.0,
                255.0,
                200.0 + noise.sample(time_noise + 30.0) * 55.0,
                240.0 * alpha_scale,
            ),
        }
    }
}

/// Timed opacity flicker after a screen-orientation change.
/// A newer change restarts the timer instead of stacking.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlickerState {
    last_change: Option<f64>,
    active_since: Option<f64>,
}

impl FlickerState {
    /// Pick up the latest orientation-change timestamp from the input snapshot
    pub fn observe(&mut self, changed_at: Option<f64>) {
        if changed_at.is_some() && changed_at != self.last_change {
            self.last_change = changed_at;
            self.active_since = changed_at;
        }
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active_since.is_some()
    }

    /// Opacity multiplier for this frame: 1.0 when calm, 0.7-1.0 while flickering
    pub fn opacity(&mut self, now: f64, duration: f32, noise: &NoiseField, seed: f64) -> f32 {
        let Some(start) = self.active_since else {
            return 1.0;
        };
        if now - start >= duration as f64 {
            self.active_since = None;
            return 1.0;
        }
        0.7 + 0.3 * noise.sample(seed)
    }
}

/// Per-frame inputs for one flame
#[derive(Clone, Copy, Debug)]
pub struct FlameParams {
    pub base: Vec2,
    pub index: usize,
    pub progress: f32,
    pub wind: Vec2,
    pub frame: f64,
    pub opacity: f32,
}

pub struct FlameRenderer<'a> {
    pub style: &'a FlameStyle,
    pub noise: &'a NoiseField,
}

impl<'a> FlameRenderer<'a> {
    pub fn new(style: &'a FlameStyle, noise: &'a NoiseField) -> Self {
        Self { style, noise }
    }

    /// Front-loaded growth: rises quickly after ignition, then levels off
    pub fn growth(&self, progress: f32) -> f32 {
        progress.clamp(0.0, 1.0).powf(self.style.growth_exponent)
    }

    /// (width, height) of the outer layer at this progress
    pub fn dimensions(&self, progress: f32) -> (f32, f32) {
        let g = self.growth(progress);
        (
            self.style.min_width + self.style.width_growth * g,
            self.style.min_height + self.style.height_growth * g,
        )
    }

    /// Point where the wind should be sampled for this flame: halfway up its body
    pub fn wind_sample_point(&self, base: Vec2, progress: f32) -> Vec2 {
        let (_, height) = self.dimensions(progress);
        base - Vec2::new(0.0, height * 0.5)
    }

    fn time_noise(frame: f64, index: usize) -> f64 {
        frame * 0.08 + index as f64 * 10.0
    }

    fn shape_seed(index: usize) -> f64 {
        index as f64 * 500.0
    }

    /// Sample the centre line of one layer, base first, tip last
    pub fn layer_points(&self, kind: LayerKind, params: &FlameParams) -> Vec<LayerPoint> {
        let (width, height) = self.dimensions(params.progress);
        let (h_scale, w_scale, taper_scale) = kind.proportions();
        let (width, height) = (width * w_scale, height * h_scale);
        let time_noise = Self::time_noise(params.frame, params.index);
        let seed = Self::shape_seed(params.index) + kind.seed_offset();

        let segments = self.style.segments.max(1);
        (0..=segments)
            .map(|i| {
                let t = i as f32 / segments as f32;
                let n = (i + 1) as f32;
                let w = width * (1.0 - t.powf(self.style.taper_exponent)) * taper_scale * (n / n.sqrt());

                let jitter_x = self.noise.centered(time_noise + i as f64 * 0.3 + seed)
                    * w
                    * self.style.jitter
                    * (1.0 + t);
                let jitter_y = self.noise.centered(time_noise * 1.1 + i as f64 * 0.3 + seed + 50.0) * 5.0 * t;
                let bend_x = params.wind.x * t.powf(self.style.wind_x_exponent) * self.style.wind_coupling;
                let bend_y = params.wind.y * t.powf(self.style.wind_y_exponent);

                LayerPoint {
                    center: Vec2::new(jitter_x + bend_x, -height * t + jitter_y + bend_y),
                    width: w,
                }
            })
            .collect()
    }

    /// Closed outline through both flanks of a layer, as curve control points
    pub fn layer_outline(points: &[LayerPoint]) -> Vec<Vec2> {
        let Some((first, rest)) = points.split_first() else {
            return Vec::new();
        };
        let tip = points[points.len() - 1].center;
        let half = |p: &LayerPoint| Vec2::new(p.width * 0.5, 0.0);
        let bottom = first.center + Vec2::new(0.0, BASE_CONTROL_OFFSET);

        let mut controls = Vec::with_capacity(points.len() * 2 + 6);
        controls.push(bottom);
        controls.push(first.center - half(first));
        controls.push(first.center + half(first));
        controls.extend(rest.iter().map(|p| p.center + half(p)));
        controls.extend([tip, tip, tip]);
        controls.extend(rest.iter().rev().map(|p| p.center - half(p)));
        controls.push(first.center - half(first));
        controls.push(bottom);
        controls
    }

    /// Draw the whole flame and return its tip, where smoke should rise from
    pub fn render_flame(&self, canvas: &mut impl Canvas, params: &FlameParams) -> Vec2 {
        let (width, height) = self.dimensions(params.progress);
        let time_noise = Self::time_noise(params.frame, params.index);

        self.draw_haze(canvas, params);

        for kind in LayerKind::ALL {
            let points = self.layer_points(kind, params);
            let color = kind.color(self.noise, time_noise, params.opacity);

            let outline: Vec<Vec2> = tessellate(&Self::layer_outline(&points), CURVE_STEPS)
                .into_iter()
                .map(|p| p + params.base)
                .collect();
            canvas.fill_polygon(&outline, color);

            let root = points[0];
            canvas.ellipse(
                params.base + root.center,
                Vec2::new(root.width * 0.8, BASE_ELLIPSE_HEIGHT),
                color,
            );
        }

        let segments = self.style.segments as f64;
        let tip_jitter = self.noise.centered(time_noise + segments * 0.3 + 300.0) * width * 0.8;
        params.base
            + Vec2::new(
                tip_jitter + params.wind.x * self.style.wind_coupling,
                -height + params.wind.y,
            )
    }

    /// Three wavering, unfilled strands of shimmering air behind the flame
    fn draw_haze(&self, canvas: &mut impl Canvas, params: &FlameParams) {
        let growth = self.growth(params.progress);
        let (_, height) = self.dimensions(params.progress);
        let haze_height = height * 1.2;
        let max_offset = 5.0 + 10.0 * growth;
        let time_noise = Self::time_noise(params.frame, params.index);

        for strand in 0..HAZE_STRANDS {
            let k = strand as f32;
            let seed = time_noise * 0.5 + strand as f64 * 100.0 + Self::shape_seed(params.index) + 50.0;
            let alpha = map_range(growth, 0.0, 1.0, 0.0, 30.0) * params.opacity * (1.0 - k * 0.2);
            let wind = params.wind * (0.5 + k * 0.2);

            let root = Vec2::new(wind.x, 0.0);
            let crown = Vec2::new(wind.x * 1.5, -haze_height + wind.y);

            let mut controls = Vec::with_capacity(HAZE_SEGMENTS + 5);
            controls.extend([root, root]);
            for j in 0..=HAZE_SEGMENTS {
                let t = j as f32 / HAZE_SEGMENTS as f32;
                let drift_x = self.noise.centered(seed + j as f64 * 0.5) * max_offset * t;
                let drift_y = self.noise.centered(seed + j as f64 * 0.5 + 10.0) * 5.0 * t;
                controls.push(Vec2::new(
                    drift_x + wind.x * t * 1.5,
                    -haze_height * t + drift_y + wind.y * t,
                ));
            }
            controls.extend([crown, crown]);

            let strand_points: Vec<Vec2> = tessellate(&controls, CURVE_STEPS)
                .into_iter()
                .map(|p| p + params.base)
                .collect();
            canvas.polyline(&strand_points, HAZE_WIDTH, rgba(200.0, 200.0, 255.0, alpha));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;

    fn params(progress: f32, wind: Vec2) -> FlameParams {
        FlameParams {
            base: Vec2::new(50.0, 40.0),
            index: 3,
            progress,
            wind,
            frame: 120.0,
            opacity: 1.0,
        }
    }

    #[test]
    fn growth_is_front_loaded() {
        let style = FlameStyle::default();
        let noise = NoiseField::default();
        let flame = FlameRenderer::new(&style, &noise);
        assert_eq!(flame.growth(0.0), 0.0);
        assert!((flame.growth(0.25) - 0.5).abs() < 1e-6);
        assert_eq!(flame.growth(1.0), 1.0);
        assert!(flame.growth(0.1) > 0.1);
    }

    #[test]
    fn dimensions_scale_from_minimums() {
        let style = FlameStyle::default();
        let noise = NoiseField::default();
        let flame = FlameRenderer::new(&style, &noise);
        assert_eq!(flame.dimensions(0.0), (4.0, 15.0));
        assert_eq!(flame.dimensions(1.0), (12.0, 45.0));
        assert_eq!(flame.wind_sample_point(Vec2::new(10.0, 60.0), 1.0), Vec2::new(10.0, 37.5));
    }

    #[test]
    fn layers_taper_to_a_point() {
        let style = FlameStyle::default();
        let noise = NoiseField::default();
        let flame = FlameRenderer::new(&style, &noise);
        for kind in LayerKind::ALL {
            let points = flame.layer_points(kind, &params(0.6, Vec2::ZERO));
            assert_eq!(points.len(), style.segments + 1);
            assert!(points[0].width > 0.0);
            assert!(points[style.segments].width.abs() < 1e-5);
            assert!(points.iter().all(|p| p.width >= 0.0));
        }
    }

    #[test]
    fn inner_layers_are_smaller() {
        let style = FlameStyle::default();
        let noise = NoiseField::default();
        let flame = FlameRenderer::new(&style, &noise);
        let p = params(1.0, Vec2::ZERO);
        let top = |kind| -flame.layer_points(kind, &p)[style.segments].center.y;
        let root = |kind| flame.layer_points(kind, &p)[0].width;
        assert!(top(LayerKind::Outer) > top(LayerKind::Mid));
        assert!(top(LayerKind::Mid) > top(LayerKind::Inner));
        assert!(root(LayerKind::Outer) > root(LayerKind::Mid));
        assert!(root(LayerKind::Mid) > root(LayerKind::Inner));
    }

    #[test]
    fn wind_bends_the_tip_more_than_the_base() {
        let style = FlameStyle::default();
        let noise = NoiseField::default();
        let flame = FlameRenderer::new(&style, &noise);
        let calm = flame.layer_points(LayerKind::Outer, &params(0.8, Vec2::ZERO));
        let windy = flame.layer_points(LayerKind::Outer, &params(0.8, Vec2::new(8.0, 0.0)));

        let shift: Vec<f32> = calm
            .iter()
            .zip(&windy)
            .map(|(c, w)| w.center.x - c.center.x)
            .collect();
        assert!(shift[0].abs() < 1e-5);
        assert!((shift[style.segments] - 8.0 * style.wind_coupling).abs() < 1e-4);
        assert!(shift.windows(2).all(|w| w[1] > w[0]));

        // Bend is curved, not a straight shear
        let mid = shift[style.segments / 2];
        assert!(mid < shift[style.segments] * 0.5);
    }

    #[test]
    fn render_draws_haze_behind_three_layers() {
        let style = FlameStyle::default();
        let noise = NoiseField::default();
        let flame = FlameRenderer::new(&style, &noise);
        let mut canvas = RecordingCanvas::default();
        flame.render_flame(&mut canvas, &params(0.5, Vec2::ZERO));

        assert_eq!(canvas.polylines().count(), HAZE_STRANDS);
        assert_eq!(canvas.polygons().count(), 3);
        assert_eq!(canvas.ellipses().count(), 3);

        // Haze strands come first so the flame covers them
        let first_polygon = canvas
            .calls
            .iter()
            .position(|c| matches!(c, crate::canvas::DrawCall::Polygon { .. }))
            .unwrap();
        assert_eq!(first_polygon, HAZE_STRANDS);
    }

    #[test]
    fn layer_colors_run_orange_to_white() {
        let style = FlameStyle::default();
        let noise = NoiseField::default();
        let flame = FlameRenderer::new(&style, &noise);
        let mut canvas = RecordingCanvas::default();
        flame.render_flame(&mut canvas, &params(0.5, Vec2::ZERO));

        let colors: Vec<_> = canvas.polygons().map(|(_, c)| c.to_srgba()).collect();
        assert_eq!(colors[0].blue, 0.0);
        assert!(colors[0].green <= 220.0 / 255.0 + 1e-6);
        assert!(colors[1].green >= 200.0 / 255.0 - 1e-6);
        assert!(colors[1].blue < colors[2].blue);
        assert_eq!(colors[2].green, 1.0);
        assert!(colors[0].alpha < colors[1].alpha && colors[1].alpha < colors[2].alpha);
    }

    #[test]
    fn tip_sits_above_base_and_follows_wind() {
        let style = FlameStyle::default();
        let noise = NoiseField::default();
        let flame = FlameRenderer::new(&style, &noise);
        let mut canvas = RecordingCanvas::default();

        let calm = flame.render_flame(&mut canvas, &params(1.0, Vec2::ZERO));
        let windy = flame.render_flame(&mut canvas, &params(1.0, Vec2::new(-6.0, 2.0)));
        let base = params(1.0, Vec2::ZERO).base;

        assert!((calm.y - (base.y - 45.0)).abs() < 1e-4);
        assert!((calm.x - base.x).abs() <= 12.0 * 0.4);
        assert!((windy.x - calm.x - (-6.0 * 1.5)).abs() < 1e-4);
        assert!((windy.y - calm.y - 2.0).abs() < 1e-4);
    }

    #[test]
    fn identical_inputs_draw_identical_flames() {
        let style = FlameStyle::default();
        let noise = NoiseField::default();
        let flame = FlameRenderer::new(&style, &noise);
        let mut a = RecordingCanvas::default();
        let mut b = RecordingCanvas::default();
        flame.render_flame(&mut a, &params(0.3, Vec2::new(1.0, 0.0)));
        flame.render_flame(&mut b, &params(0.3, Vec2::new(1.0, 0.0)));
        assert_eq!(a.calls, b.calls);
    }

    #[test]
    fn consecutive_frames_still_move_after_days_of_running() {
        let style = FlameStyle::default();
        let noise = NoiseField::default();
        let flame = FlameRenderer::new(&style, &noise);
        let start = (1u32 << 24) as f64;

        let mut distinct = 0;
        for k in 0..60 {
            let a = FlameParams { frame: start + k as f64, ..params(0.5, Vec2::ZERO) };
            let b = FlameParams { frame: start + k as f64 + 1.0, ..params(0.5, Vec2::ZERO) };
            if flame.layer_points(LayerKind::Outer, &a) != flame.layer_points(LayerKind::Outer, &b) {
                distinct += 1;
            }
        }
        assert_eq!(distinct, 60);
    }

    #[test]
    fn flicker_runs_for_its_duration() {
        let noise = NoiseField::default();
        let mut flicker = FlickerState::default();
        assert_eq!(flicker.opacity(0.0, 1.0, &noise, 0.0), 1.0);

        flicker.observe(Some(2.0));
        assert!(flicker.is_active());
        let dimmed = flicker.opacity(2.5, 1.0, &noise, 12.3);
        assert!((0.7..=1.0).contains(&dimmed));

        assert_eq!(flicker.opacity(3.0, 1.0, &noise, 12.3), 1.0);
        assert!(!flicker.is_active());

        // Seeing the same change again does not re-arm it
        flicker.observe(Some(2.0));
        assert!(!flicker.is_active());
    }

    #[test]
    fn new_orientation_change_restarts_flicker() {
        let noise = NoiseField::default();
        let mut flicker = FlickerState::default();
        flicker.observe(Some(1.0));
        flicker.opacity(1.5, 1.0, &noise, 0.0);
        flicker.observe(Some(1.8));

        // Would have ended at 2.0 under the first change; still going under the second
        flicker.opacity(2.5, 1.0, &noise, 0.0);
        assert!(flicker.is_active());
        assert_eq!(flicker.opacity(2.8, 1.0, &noise, 0.0), 1.0);
    }
}
