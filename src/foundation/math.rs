/// Clamped linear interpolation.
///
/// Returns `a` for `t < 0`, `b` for `t > 1`, otherwise `a + (b - a) * t`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    if t < 0.0 {
        return a;
    }
    if t > 1.0 {
        return b;
    }
    a + (b - a) * t
}

/// Store a float as an 8-bit channel: round half to even, then clamp to `[0, 255]`.
///
/// NaN maps to 0.
pub(crate) fn to_channel(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round_ties_even().clamp(0.0, 255.0) as u8
}

/// Scale an 8-bit channel by `m` and store it back as a channel.
pub(crate) fn scale_channel(c: u8, m: f64) -> u8 {
    to_channel(f64::from(c) * m)
}

/// `round(x * y / 255)` in integer arithmetic.
pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
