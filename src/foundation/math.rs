use glam::{DQuat, DVec3};
use kurbo::Vec2;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }

    /// Fold the 64-bit state into 32 bits, keeping entropy from both halves.
    pub(crate) fn finish_u32(self) -> u32 {
        ((self.0 >> 32) ^ self.0) as u32
    }
}

/// Interpolate with the form that is exact at both endpoints.
pub fn lerp_stable(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Interpolation contract for blendable value types.
pub trait Lerp: Sized {
    /// Interpolate from `a` to `b` with normalized factor `t` in `[0, 1]`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for bool {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        if t >= 0.5 { *b } else { *a }
    }
}

impl Lerp for i32 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        lerp_stable(f64::from(*a), f64::from(*b), t).round() as i32
    }
}

impl Lerp for f32 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        lerp_stable(f64::from(*a), f64::from(*b), t) as f32
    }
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        lerp_stable(*a, *b, t)
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(lerp_stable(a.x, b.x, t), lerp_stable(a.y, b.y, t))
    }
}

impl Lerp for DVec3 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        *a * (1.0 - t) + *b * t
    }
}

impl Lerp for DQuat {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        if t <= 0.0 {
            return *a;
        }
        if t >= 1.0 {
            return *b;
        }
        a.slerp(*b, t).normalize()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
