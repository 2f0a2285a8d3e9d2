//! Math utilities and types
//!
//! World coordinates are Y-up and right-handed. The forward axis of every
//! object is +Z, so a yaw of zero looks down +Z and positive yaw turns
//! toward +X.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Rotation3, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f64>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f64>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f64>;

/// Quaternion type for orientations
pub type Quat = Unit<Quaternion<f64>>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f64 = std::f64::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f64 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f64 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Mat4, Point3, Quat, Unit, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f64) -> f64 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f64) -> f64 {
        radians * constants::RAD_TO_DEG
    }

    /// Heading of a vector around +Y in degrees, measured from +Z toward +X.
    pub fn yaw_of(v: &Vec3) -> f64 {
        if v.x == 0.0 && v.z == 0.0 {
            return 0.0;
        }
        rad_to_deg(v.x.atan2(v.z))
    }

    /// Build an orientation from pitch (X), yaw (Y) and roll (Z) angles in degrees.
    ///
    /// Applied yaw first, then pitch, then roll, which matches how vehicle
    /// headings are usually read off an instrument panel.
    pub fn quat_from_euler_deg(pitch: f64, yaw: f64, roll: f64) -> Quat {
        let yaw_q = Quat::from_axis_angle(&Vec3::y_axis(), deg_to_rad(yaw));
        let pitch_q = Quat::from_axis_angle(&Vec3::x_axis(), deg_to_rad(pitch));
        let roll_q = Quat::from_axis_angle(&Vec3::z_axis(), deg_to_rad(roll));
        yaw_q * pitch_q * roll_q
    }

    /// Transform a point by a homogeneous matrix.
    pub fn transform_point(matrix: &Mat4, point: &Vec3) -> Vec3 {
        matrix.transform_point(&Point3::from(*point)).coords
    }

    /// Rotation matrix about `axis` (need not be normalized) by `degrees`,
    /// pivoting around `center`.
    pub fn rotation_about(axis: &Vec3, degrees: f64, center: &Vec3) -> Mat4 {
        let Some(unit_axis) = Unit::try_new(*axis, 1.0e-12) else {
            return Mat4::identity();
        };
        let rotation = Mat4::from_axis_angle(&unit_axis, deg_to_rad(degrees));
        Mat4::new_translation(center) * rotation * Mat4::new_translation(&-center)
    }
}
