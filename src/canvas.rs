// 2D drawing surface
// Simulation code draws in panel pixel space (origin top-left, y down) through the
// Canvas trait. MeshCanvas turns those calls into a procedural triangle mesh using
// an explicit, immutable per-panel transform.

use bevy::asset::RenderAssetUsages;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use std::f32::consts::TAU;

/// Drawing primitives the simulation needs
pub trait Canvas {
    /// Straight stroke of the given width
    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);
    /// Open stroked path
    fn polyline(&mut self, points: &[Vec2], width: f32, color: Color);
    /// Filled polygon; the last point connects back to the first
    fn fill_polygon(&mut self, points: &[Vec2], color: Color);
    /// Filled ellipse with full width/height `size`
    fn ellipse(&mut self, center: Vec2, size: Vec2, color: Color);
}

/// Colour from 0-255 channels, the way the artwork was tuned. Out-of-range values clamp.
pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Color {
    Color::srgba(
        (r / 255.0).clamp(0.0, 1.0),
        (g / 255.0).clamp(0.0, 1.0),
        (b / 255.0).clamp(0.0, 1.0),
        (a / 255.0).clamp(0.0, 1.0),
    )
}

/// Where a panel sits in the window. Never mutated while drawing.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct CanvasTransform {
    pub origin: Vec2,   // Window pixel of the panel's top-left corner
    pub scale: f32,     // Window pixels per panel pixel
}

impl CanvasTransform {
    pub fn to_window(&self, p: Vec2) -> Vec2 {
        self.origin + p * self.scale
    }

    pub fn from_window(&self, w: Vec2) -> Vec2 {
        (w - self.origin) / self.scale
    }

    /// Panel pixel -> 2D world position for a centred, y-up camera
    pub fn to_world(&self, p: Vec2, window_size: Vec2) -> Vec2 {
        let w = self.to_window(p);
        Vec2::new(w.x - window_size.x * 0.5, window_size.y * 0.5 - w.y)
    }
}

// ===== MESH BACKEND =====

const ELLIPSE_MIN_SEGMENTS: usize = 10;
const ELLIPSE_MAX_SEGMENTS: usize = 48;

/// Canvas that batches every draw call of a frame into one vertex-coloured
/// triangle list. Triangles keep submission order, so later calls paint over
/// earlier ones.
pub struct MeshCanvas {
    transform: CanvasTransform,
    window_size: Vec2,
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 4]>,
    indices: Vec<u32>,
}

impl MeshCanvas {
    pub fn new(transform: CanvasTransform, window_size: Vec2) -> Self {
        Self {
            transform,
            window_size,
            positions: Vec::new(),
            colors: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Mesh to spawn a panel with before its first frame is drawn
    pub fn blank_mesh() -> Mesh {
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
        MeshCanvas::new(CanvasTransform { origin: Vec2::ZERO, scale: 1.0 }, Vec2::ZERO).write_to(&mut mesh);
        mesh
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn world(&self, p: Vec2) -> Vec2 {
        self.transform.to_world(p, self.window_size)
    }

    fn push_vertex(&mut self, p: Vec2, color: [f32; 4]) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push([p.x, p.y, 0.0]);
        self.colors.push(color);
        index
    }

    /// Quad a-b-c-d as two triangles (world space)
    fn push_quad(&mut self, corners: [Vec2; 4], color: [f32; 4]) {
        let base = self.positions.len() as u32;
        for corner in corners {
            self.push_vertex(corner, color);
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Stroke a world-space segment as a quad, never thinner than one pixel
    fn push_segment(&mut self, a: Vec2, b: Vec2, width: f32, color: [f32; 4]) {
        let normal = (b - a).perp().normalize_or_zero() * width.max(1.0) * 0.5;
        if normal == Vec2::ZERO {
            return;
        }
        self.push_quad([a + normal, b + normal, b - normal, a - normal], color);
    }

    /// Replace the mesh's geometry with everything drawn so far
    pub fn write_to(self, mesh: &mut Mesh) {
        let MeshCanvas {
            mut positions,
            mut colors,
            mut indices,
            ..
        } = self;
        // The vertex buffer must never be empty; one degenerate triangle draws nothing
        if indices.is_empty() {
            positions = vec![[0.0; 3]; 3];
            colors = vec![[0.0; 4]; 3];
            indices = vec![0, 1, 2];
        }
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colors);
        mesh.insert_indices(Indices::U32(indices));
    }
}

/// Linear RGBA, the layout mesh vertex colours expect
fn vertex_color(color: Color) -> [f32; 4] {
    let c = color.to_linear();
    [c.red, c.green, c.blue, c.alpha]
}

impl Canvas for MeshCanvas {
    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        let (a, b) = (self.world(from), self.world(to));
        let w = width * self.transform.scale;
        self.push_segment(a, b, w, vertex_color(color));
    }

    fn polyline(&mut self, points: &[Vec2], width: f32, color: Color) {
        let w = width * self.transform.scale;
        let color = vertex_color(color);
        let world: Vec<Vec2> = points.iter().map(|&p| self.world(p)).collect();
        for pair in world.windows(2) {
            self.push_segment(pair[0], pair[1], w, color);
        }
    }

    /// Even-odd fill: each scanline span becomes a one-pixel-tall quad, so
    /// concave and self-touching outlines fill without overlapping triangles
    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        let color = vertex_color(color);
        let world: Vec<Vec2> = points.iter().map(|&p| self.world(p)).collect();
        for (y, x0, x1) in polygon_spans(&world, 1.0) {
            self.push_quad(
                [
                    Vec2::new(x0, y - 0.5),
                    Vec2::new(x1, y - 0.5),
                    Vec2::new(x1, y + 0.5),
                    Vec2::new(x0, y + 0.5),
                ],
                color,
            );
        }
    }

    /// Triangle fan around the centre
    fn ellipse(&mut self, center: Vec2, size: Vec2, color: Color) {
        let c = self.world(center);
        let half = (size * 0.5 * self.transform.scale).max(Vec2::splat(0.5));
        let color = vertex_color(color);
        let segments = ((half.max_element() * 2.0) as usize).clamp(ELLIPSE_MIN_SEGMENTS, ELLIPSE_MAX_SEGMENTS);

        let hub = self.push_vertex(c, color);
        for k in 0..segments {
            let angle = k as f32 / segments as f32 * TAU;
            self.push_vertex(c + Vec2::new(angle.cos() * half.x, angle.sin() * half.y), color);
        }
        for k in 0..segments as u32 {
            let next = (k + 1) % segments as u32;
            self.indices.extend_from_slice(&[hub, hub + 1 + k, hub + 1 + next]);
        }
    }
}

/// Horizontal spans `(y, x_start, x_end)` covering a polygon, using even-odd filling.
/// Scanlines are sampled at half-step offsets so they never hit a vertex exactly.
pub fn polygon_spans(points: &[Vec2], step: f32) -> Vec<(f32, f32, f32)> {
    let mut spans = Vec::new();
    if points.len() < 3 || step <= 0.0 {
        return spans;
    }

    let (min_y, max_y) = points
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));

    let mut crossings: Vec<f32> = Vec::with_capacity(8);
    let mut y = min_y + step * 0.5;
    while y < max_y {
        crossings.clear();
        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            if (a.y <= y && b.y > y) || (b.y <= y && a.y > y) {
                let t = (y - a.y) / (b.y - a.y);
                crossings.push(a.x + t * (b.x - a.x));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));
        for pair in crossings.chunks_exact(2) {
            spans.push((y, pair[0], pair[1]));
        }
        y += step;
    }
    spans
}

// ===== TEST BACKEND =====

#[cfg(test)]
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Line { from: Vec2, to: Vec2, width: f32, color: Color },
    Polyline { points: Vec<Vec2>, width: f32, color: Color },
    Polygon { points: Vec<Vec2>, color: Color },
    Ellipse { center: Vec2, size: Vec2, color: Color },
}

/// Captures draw calls so tests can inspect what was rendered
#[cfg(test)]
#[derive(Default)]
pub struct RecordingCanvas {
    pub calls: Vec<DrawCall>,
}

#[cfg(test)]
impl RecordingCanvas {
    pub fn ellipses(&self) -> impl Iterator<Item = (Vec2, Vec2, Color)> + '_ {
        self.calls.iter().filter_map(|c| match c {
            DrawCall::Ellipse { center, size, color } => Some((*center, *size, *color)),
            _ => None,
        })
    }

    pub fn polygons(&self) -> impl Iterator<Item = (&[Vec2], Color)> + '_ {
        self.calls.iter().filter_map(|c| match c {
            DrawCall::Polygon { points, color } => Some((points.as_slice(), *color)),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = (Vec2, Vec2, f32, Color)> + '_ {
        self.calls.iter().filter_map(|c| match c {
            DrawCall::Line { from, to, width, color } => Some((*from, *to, *width, *color)),
            _ => None,
        })
    }

    pub fn polylines(&self) -> impl Iterator<Item = (&[Vec2], Color)> + '_ {
        self.calls.iter().filter_map(|c| match c {
            DrawCall::Polyline { points, color, .. } => Some((points.as_slice(), *color)),
            _ => None,
        })
    }
}

#[cfg(test)]
impl Canvas for RecordingCanvas {
    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.calls.push(DrawCall::Line { from, to, width, color });
    }

    fn polyline(&mut self, points: &[Vec2], width: f32, color: Color) {
        self.calls.push(DrawCall::Polyline {
            points: points.to_vec(),
            width,
            color,
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        self.calls.push(DrawCall::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn ellipse(&mut self, center: Vec2, size: Vec2, color: Color) {
        self.calls.push(DrawCall::Ellipse { center, size, color });
    }
}
