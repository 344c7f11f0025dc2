//! Common types and traits shared by the chain walker, the marker projector and
//! the collaborators they talk to.

extern crate nalgebra as na;

use na::Isometry3;
use crate::chain::JointSpec;
use crate::markers::LinkVisual;

/// Pose is a rigid transform of a link or frame. It contains both Cartesian position and
/// rotation quaternion.
/// ```
/// extern crate nalgebra as na;
/// use na::{Isometry3, Translation3, UnitQuaternion, Vector3};
///
/// type Pose = Isometry3<f64>;
///
/// let translation = Translation3::new(1.0, 0.0, 0.0);
/// // The quaternion should be normalized to represent a valid rotation.
/// let rotation = UnitQuaternion::from_quaternion(na::Quaternion::new(1.0, 0.0, 0.0, 1.0).normalize());
/// let transform = Pose::from_parts(translation, rotation);
/// ```
pub type Pose = Isometry3<f64>;

/// Joint positions of a chain, in radians, in the chain order.
pub type JointValues = Vec<f64>;

/// Numeric identifier of a marker element. Must be unique within one display batch.
pub type MarkerId = u32;

/// Source of the static robot description: joints keyed by joint name and optional
/// visual geometry keyed by link name. The description is loaded once and is read-only
/// for the chain walker and the marker projector.
pub trait RobotDescription {
    /// Static description of the joint, or None if there is no such joint.
    fn joint(&self, name: &str) -> Option<&JointSpec>;

    /// Visual geometry of the link, or None if the link has nothing to display.
    /// A link without visual is valid.
    fn link_visual(&self, link: &str) -> Option<&LinkVisual>;
}
