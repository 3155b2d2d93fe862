use bevy::prelude::*;

/// Linearly re-map `value` from `[in_start, in_end]` onto `[out_start, out_end]`.
/// Does not clamp; either range may be descending.
#[inline]
pub fn map_range(value: f32, in_start: f32, in_end: f32, out_start: f32, out_end: f32) -> f32 {
    let span = in_end - in_start;
    if span == 0.0 {
        return out_start;
    }
    out_start + (value - in_start) / span * (out_end - out_start)
}

/// Scale `v` down so its length is at most `max`. Shorter vectors pass through untouched.
#[inline]
pub fn limit_length(v: Vec2, max: f32) -> Vec2 {
    let len_sq = v.length_squared();
    if len_sq > max * max {
        v * (max / len_sq.sqrt())
    } else {
        v
    }
}

/// Point at fraction `t` along the segment `start -> end`
#[inline]
pub fn point_along(start: Vec2, end: Vec2, t: f32) -> Vec2 {
    start.lerp(end, t)
}
