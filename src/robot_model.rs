//! In-memory robot description: joints keyed by joint name, visuals keyed by link name.
//! The description is built once (for instance from data extracted elsewhere) and is
//! read-only afterwards.

use std::collections::HashMap;
use crate::chain::JointSpec;
use crate::kinematic_traits::RobotDescription;
use crate::markers::LinkVisual;
use crate::teleop_error::TeleopError;

#[derive(Debug, Clone, Default)]
pub struct RobotModel {
    pub name: String,
    joints: HashMap<String, JointSpec>,
    visuals: HashMap<String, LinkVisual>,
}

impl RobotModel {
    pub fn new(name: &str) -> Self {
        RobotModel {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds the joint. The same joint may be added more than once (multiple robots in
    /// the same cell may share a description), but a different joint under an existing
    /// name is an error.
    pub fn add_joint(&mut self, joint: JointSpec) -> Result<(), TeleopError> {
        if let Some(existing) = self.joints.get(&joint.name) {
            if existing != &joint {
                return Err(TeleopError::DuplicateJoint(joint.name));
            }
        } else {
            self.joints.insert(joint.name.clone(), joint);
        }
        Ok(())
    }

    /// Sets the visual of the link, replacing the previous one if any.
    pub fn add_link_visual(&mut self, link: &str, visual: LinkVisual) {
        self.visuals.insert(link.to_string(), visual);
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }
}

impl RobotDescription for RobotModel {
    fn joint(&self, name: &str) -> Option<&JointSpec> {
        self.joints.get(name)
    }

    fn link_visual(&self, link: &str) -> Option<&LinkVisual> {
        self.visuals.get(link)
    }
}
