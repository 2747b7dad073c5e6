//! Object transform matrices.
//!
//! Matrices are stored column-major (`m[col * 4 + row]`), matching what the
//! visualization server and WebGL-side interactors exchange on the wire.

use super::precision::{canonical_f64, normalize_degrees};

/// Starting orientation of a transformable scene object.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransformAngles {
    /// Rotation about the Y axis, in degrees.
    pub twist_deg: f64,
    /// Rotation about the X axis, in degrees.
    pub tilt_deg: f64,
    /// Uniform scale factor (> 0).
    pub scale: f64,
}

impl Default for TransformAngles {
    fn default() -> Self {
        Self {
            twist_deg: 0.0,
            tilt_deg: 0.0,
            scale: 1.0,
        }
    }
}

/// Column-major 4x4 matrix.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4(pub [f64; 16]);

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat4 {
    pub fn identity() -> Self {
        let mut m = [0.0; 16];
        m[0] = 1.0;
        m[5] = 1.0;
        m[10] = 1.0;
        m[15] = 1.0;
        Self(m)
    }

    /// Builds `Ry(twist) * Rx(tilt) * S(scale)`: scale first, then tilt, then twist.
    pub fn from_angles(angles: TransformAngles) -> Self {
        let (sin_tw, cos_tw) = angles.twist_deg.to_radians().sin_cos();
        let (sin_ti, cos_ti) = angles.tilt_deg.to_radians().sin_cos();
        let k = angles.scale;

        let mut m = Self::identity();
        m.set(0, 0, k * cos_tw);
        m.set(0, 1, k * sin_tw * sin_ti);
        m.set(0, 2, k * sin_tw * cos_ti);
        m.set(1, 0, 0.0);
        m.set(1, 1, k * cos_ti);
        m.set(1, 2, -k * sin_ti);
        m.set(2, 0, -k * sin_tw);
        m.set(2, 1, k * cos_tw * sin_ti);
        m.set(2, 2, k * cos_tw * cos_ti);

        for v in m.0.iter_mut() {
            *v = canonical_f64(*v);
        }
        m
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0[col * 4 + row]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, v: f64) {
        self.0[col * 4 + row] = v;
    }

    pub fn with_translation(mut self, tx: f64, ty: f64, tz: f64) -> Self {
        self.set(0, 3, tx);
        self.set(1, 3, ty);
        self.set(2, 3, tz);
        self
    }

    pub fn translation(&self) -> [f64; 3] {
        [self.get(0, 3), self.get(1, 3), self.get(2, 3)]
    }

    pub fn to_array(self) -> [f64; 16] {
        self.0
    }

    /// Recovers twist/tilt/scale from a matrix built by [`Mat4::from_angles`].
    ///
    /// Returns `None` for a degenerate (zero-scale) upper 3x3 block. Angles are
    /// returned in `[0, 360)`.
    pub fn decompose(&self) -> Option<TransformAngles> {
        let c0 = [self.get(0, 0), self.get(1, 0), self.get(2, 0)];
        let scale = (c0[0] * c0[0] + c0[1] * c0[1] + c0[2] * c0[2]).sqrt();
        if !(scale > 0.0) || !scale.is_finite() {
            return None;
        }

        let twist = (-self.get(2, 0)).atan2(self.get(0, 0));
        let tilt = (-self.get(1, 2)).atan2(self.get(1, 1));

        Some(TransformAngles {
            twist_deg: normalize_degrees(twist.to_degrees()),
            tilt_deg: normalize_degrees(tilt.to_degrees()),
            scale,
        })
    }
}

impl From<Mat4> for [f64; 16] {
    fn from(m: Mat4) -> Self {
        m.0
    }
}
