//! Interpolation and easing curves
//!
//! All curves take a normalized progress `t` and clamp it to [0, 1], so the
//! endpoints are exact no matter how far a tick overshoots.

/// Linear interpolation with the factor clamped to [0, 1]
#[inline]
pub fn lerp(start: f32, end: f32, factor: f32) -> f32 {
    if factor <= 0.0 {
        return start;
    }
    if factor >= 1.0 {
        return end;
    }
    start + (end - start) * factor
}

/// Quartic ease-out: fast start, gentle arrival
#[inline]
pub fn ease_out_quart(t: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let inv = 1.0 - t;
    1.0 - inv * inv * inv * inv
}

/// Quartic ease-in: gentle start, fast arrival
#[inline]
pub fn ease_in_quart(t: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    t * t * t * t
}

/// Cubic ease-out (block entrance)
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

/// Height multiplier of a jump arc at progress `t`.
///
/// Rises with ease-out over the first half and falls with ease-in over the
/// second, so the arc is 0 at both ends and 1 at the apex.
#[inline]
pub fn jump_arc(t: f32) -> f32 {
    let doubled = t.clamp(0.0, 1.0) * 2.0;
    if doubled <= 1.0 {
        ease_out_quart(doubled)
    } else {
        1.0 - ease_in_quart(doubled - 1.0)
    }
}
