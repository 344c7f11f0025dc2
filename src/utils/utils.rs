//! Helper functions

use nalgebra::{Isometry3, UnitQuaternion};

/// Convert joint values in degrees to radians.
pub fn joints_from_degrees(degrees: &[f64]) -> Vec<f64> {
    degrees.iter().map(|d| d.to_radians()).collect()
}

/// Single line textual form of a pose, translation and quaternion.
pub fn format_pose(isometry: &Isometry3<f64>) -> String {
    let translation = isometry.translation.vector;
    let rotation: UnitQuaternion<f64> = isometry.rotation;
    format!(
        "x: {:.5}, y: {:.5}, z: {:.5},  quat: {:.5},{:.5},{:.5},{:.5}",
        translation.x, translation.y, translation.z, rotation.i, rotation.j, rotation.k, rotation.w
    )
}

/// Compare two isometries with separate tolerances.
/// - `trans_tol_m`: max allowed Euclidean distance in meters
/// - `rot_tol_rad`: max allowed rotation angle difference in radians
pub fn are_isometries_close(a: &Isometry3<f64>, b: &Isometry3<f64>, trans_tol_m: f64, rot_tol_rad: f64) -> bool {
    let tdiff = (a.translation.vector - b.translation.vector).norm();
    if tdiff > trans_tol_m {
        return false;
    }
    let mut angle = (a.rotation.inverse() * b.rotation).angle();
    if angle.is_nan() {
        angle = 0.0;
    }
    angle <= rot_tol_rad
}
