//! Walks a kinematic chain: given the static joint descriptions, joint values and the
//! transform from the root frame to the first joint, computes the accumulated pose of
//! every link in the chain.
//!
//! The walker is a pure function of its inputs. It owns no shared state, so it can be
//! called concurrently from multiple threads.
//!
//! ```
//! use nalgebra::{Isometry3, Vector3};
//! use rs_teleop_markers::chain::{walk, JointSpec};
//!
//! let shoulder = JointSpec::new("shoulder", "base_link", "upper_arm",
//!                               Vector3::z(), Isometry3::identity());
//! let poses = walk(&Isometry3::identity(), &[(&shoulder, std::f64::consts::FRAC_PI_2)])
//!     .expect("valid chain");
//! assert_eq!(poses.end_link.as_deref(), Some("upper_arm"));
//! ```

extern crate nalgebra as na;

use na::{Isometry3, Translation3, Unit, UnitQuaternion, Vector3};
use crate::kinematic_traits::{Pose, RobotDescription};
use crate::teleop_error::TeleopError;

/// Static description of a single revolute joint. Created once when the robot
/// description is loaded and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct JointSpec {
    /// Unique name of the joint within the chain.
    pub name: String,
    pub parent_link: String,
    pub child_link: String,

    /// Rotation axis in the local frame of the joint. Expected to be unit length,
    /// it is normalized anyway. Zero axis is an error.
    pub axis: Vector3<f64>,

    /// Fixed transform from the parent link frame to the joint frame.
    pub origin: Pose,
}

impl JointSpec {
    pub fn new(name: &str, parent_link: &str, child_link: &str,
               axis: Vector3<f64>, origin: Pose) -> Self {
        JointSpec {
            name: name.to_string(),
            parent_link: parent_link.to_string(),
            child_link: child_link.to_string(),
            axis,
            origin,
        }
    }
}

/// Accumulated pose of one link, relative to the root frame of the walk.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkPose {
    pub link: String,
    pub pose: Pose,
}

/// Output of the chain walk: accumulated poses of all links in chain order, and the
/// final accumulated pose with the name of the last link. Callers that attach further
/// offsets (end effectors, tools) continue from `end_pose`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainPoses {
    pub links: Vec<LinkPose>,
    pub end_pose: Pose,
    /// Name of the last link, None for the empty chain.
    pub end_link: Option<String>,
}

/// Rotation of `value` radians about `axis`. The sign of the axis components needs no
/// special handling: rotation about `-axis` by `value` is the rotation about `axis`
/// by `-value`.
pub fn joint_rotation(joint: &JointSpec, value: f64) -> Result<UnitQuaternion<f64>, TeleopError> {
    let norm = joint.axis.norm();
    if norm == 0.0 || !norm.is_finite() {
        return Err(TeleopError::InvalidJointAxis(joint.name.clone()));
    }
    let axis = Unit::new_normalize(joint.axis);
    Ok(UnitQuaternion::from_axis_angle(&axis, value))
}

/// Walks the chain, joint by joint. The order of `joints` is the parent to child
/// order of the chain and is significant.
///
/// For each joint, `accumulated = accumulated * origin * joint_rotation` and the child
/// link is recorded with the new accumulated pose. The rotation part is renormalized
/// after each step so that long chains do not drift.
///
/// # Arguments
///
/// * `root` - transform from the root frame to the parent link of the first joint.
/// * `joints` - ordered pairs of joint description and joint value (radians).
///
/// # Returns
///
/// Per-link poses, or `InvalidJointAxis` if any joint has zero axis. No partial
/// output is returned on error.
pub fn walk(root: &Pose, joints: &[(&JointSpec, f64)]) -> Result<ChainPoses, TeleopError> {
    let mut accumulated = *root;
    let mut links = Vec::with_capacity(joints.len());

    for (spec, value) in joints {
        let rotation = joint_rotation(spec, *value)?;
        let joint_transform = Isometry3::from_parts(Translation3::identity(), rotation);

        accumulated = accumulated * spec.origin * joint_transform;
        accumulated.rotation.renormalize();

        links.push(LinkPose {
            link: spec.child_link.clone(),
            pose: accumulated,
        });
    }

    let end_link = links.last().map(|l| l.link.clone());
    Ok(ChainPoses {
        links,
        end_pose: accumulated,
        end_link,
    })
}

/// Ephemeral state of one walk: ordered joints with their values and the root transform.
/// Constructed per call, discarded after producing the output.
#[derive(Debug, Clone)]
pub struct ChainState<'a> {
    pub root: Pose,
    pub steps: Vec<(&'a JointSpec, f64)>,
}

impl<'a> ChainState<'a> {
    /// Resolves joint names against the robot description.
    ///
    /// Fails with `ArityMismatch` if the number of names and values differ (checked first,
    /// before anything else), or with `UnknownJoint` for the first name that is not in
    /// the description.
    pub fn resolve<D: RobotDescription + ?Sized>(description: &'a D, root: Pose,
                                                 names: &[String], values: &[f64])
                                                 -> Result<Self, TeleopError> {
        if names.len() != values.len() {
            return Err(TeleopError::ArityMismatch {
                names: names.len(),
                values: values.len(),
            });
        }

        let steps = names.iter().zip(values.iter())
            .map(|(name, value)| {
                description.joint(name)
                    .map(|spec| (spec, *value))
                    .ok_or_else(|| TeleopError::UnknownJoint(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ChainState { root, steps })
    }

    /// Parent link of the first joint, where the root transform ends.
    pub fn base_link(&self) -> Option<&str> {
        self.steps.first().map(|(spec, _)| spec.parent_link.as_str())
    }

    pub fn walk(&self) -> Result<ChainPoses, TeleopError> {
        walk(&self.root, &self.steps)
    }
}
