//! Pose arithmetic for callers that feed move commands.
//!
//! Controllers report and accept Cartesian poses as XYZWPR: a position in
//! millimetres followed by three orientation angles in degrees. Vision and
//! calibration code usually works with 4x4 homogeneous matrices or
//! quaternions instead; this module converts between them.
//!
//! # Example
//!
//! ```
//! use mappdk::transform::{homogeneous_to_xyzwpr, xyzwpr_to_homogeneous};
//!
//! let pose = [350.0, 0.0, 280.0, 10.0, -20.0, 30.0];
//! let h = xyzwpr_to_homogeneous(&pose);
//! let back = homogeneous_to_xyzwpr(&h);
//! for (a, b) in pose.iter().zip(back.iter()) {
//!     assert!((a - b).abs() < 1e-9);
//! }
//! ```

use nalgebra::{Matrix3, Matrix4, Rotation3, Vector3};

/// Cartesian pose `[x, y, z, w, p, r]`, angles in degrees.
pub type Xyzwpr = [f64; 6];

/// Builds a homogeneous transform from a rotation matrix and a translation.
pub fn rt_to_homogeneous(rotation: &Matrix3<f64>, translation: &Vector3<f64>) -> Matrix4<f64> {
    let mut h = Matrix4::identity();
    h.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation);
    h.fixed_view_mut::<3, 1>(0, 3).copy_from(translation);
    h
}

/// Splits a homogeneous transform into its rotation matrix and translation.
pub fn homogeneous_to_rt(h: &Matrix4<f64>) -> (Matrix3<f64>, Vector3<f64>) {
    (
        h.fixed_view::<3, 3>(0, 0).into_owned(),
        h.fixed_view::<3, 1>(0, 3).into_owned(),
    )
}

/// Converts an XYZWPR pose to a homogeneous transform.
///
/// The three angles rotate about the fixed x, y and z axes, in that order.
pub fn xyzwpr_to_homogeneous(pose: &Xyzwpr) -> Matrix4<f64> {
    let rotation = Rotation3::from_euler_angles(
        pose[3].to_radians(),
        pose[4].to_radians(),
        pose[5].to_radians(),
    );
    rt_to_homogeneous(
        rotation.matrix(),
        &Vector3::new(pose[0], pose[1], pose[2]),
    )
}

/// Converts a homogeneous transform to an XYZWPR pose.
///
/// Inverse of [`xyzwpr_to_homogeneous`]. The rotation block is
/// re-orthonormalized first, so slightly noisy estimates are accepted.
pub fn homogeneous_to_xyzwpr(h: &Matrix4<f64>) -> Xyzwpr {
    let (rotation, translation) = homogeneous_to_rt(h);
    let (a, b, c) = Rotation3::from_matrix(&rotation).euler_angles();
    [
        translation.x,
        translation.y,
        translation.z,
        a.to_degrees(),
        b.to_degrees(),
        c.to_degrees(),
    ]
}

/// Orientation angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Wpr {
    /// Yaw-like angle.
    pub w: f64,
    /// Pitch-like angle.
    pub p: f64,
    /// Roll-like angle.
    pub r: f64,
}

/// Orientation angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WprRadians {
    /// Yaw-like angle.
    pub w: f64,
    /// Pitch-like angle.
    pub p: f64,
    /// Roll-like angle.
    pub r: f64,
}

/// Unit quaternion `(x, y, z, w)`, `w` being the scalar part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    /// i component.
    pub x: f64,
    /// j component.
    pub y: f64,
    /// k component.
    pub z: f64,
    /// Scalar part.
    pub w: f64,
}

impl Quaternion {
    /// No rotation.
    pub const IDENTITY: Self = Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Converts to WPR angles in radians.
    pub fn to_wpr_radians(self) -> WprRadians {
        let Quaternion { x, y, z, w } = self;
        WprRadians {
            w: (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z)),
            // Clamp so rounding noise near gimbal lock stays inside asin's domain.
            p: (2.0 * (w * y - z * x)).clamp(-1.0, 1.0).asin(),
            r: (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y)),
        }
    }

    /// Converts to WPR angles in degrees.
    pub fn to_wpr(self) -> Wpr {
        self.to_wpr_radians().to_degrees()
    }
}

impl Wpr {
    /// Creates angles from degrees.
    pub fn new(w: f64, p: f64, r: f64) -> Self {
        Self { w, p, r }
    }

    /// Converts to radians.
    pub fn to_radians(self) -> WprRadians {
        WprRadians {
            w: self.w.to_radians(),
            p: self.p.to_radians(),
            r: self.r.to_radians(),
        }
    }

    /// Converts to a quaternion.
    pub fn to_quaternion(self) -> Quaternion {
        self.to_radians().to_quaternion()
    }
}

impl WprRadians {
    /// Converts to degrees.
    pub fn to_degrees(self) -> Wpr {
        Wpr {
            w: self.w.to_degrees(),
            p: self.p.to_degrees(),
            r: self.r.to_degrees(),
        }
    }

    /// Converts to a quaternion, treating W as yaw, P as pitch and R as roll.
    pub fn to_quaternion(self) -> Quaternion {
        let (sr, cr) = (self.r / 2.0).sin_cos();
        let (sp, cp) = (self.p / 2.0).sin_cos();
        let (sw, cw) = (self.w / 2.0).sin_cos();

        Quaternion {
            x: sr * cp * cw - cr * sp * sw,
            y: cr * sp * cw + sr * cp * sw,
            z: cr * cp * sw - sr * sp * cw,
            w: cr * cp * cw + sr * sp * sw,
        }
    }
}
