//! Display of an end effector (hand, gripper) placed at an arbitrary pose, typically
//! the tip of a planned arm path. This is much like a tool attached to the last link of
//! the arm, only that the tool may have its own joints.

use crate::chain::{walk, ChainState};
use crate::groups::{GroupContext, GroupKind};
use crate::kinematic_traits::{JointValues, MarkerId, Pose, RobotDescription};
use crate::markers::{project, project_chain, MarkerElement, Rgba};
use crate::teleop_error::TeleopError;

#[derive(Debug, Clone, PartialEq)]
pub struct EndEffector {
    /// Name of the end effector group.
    pub group: String,
    /// Link the end effector is attached to. Its joints start here.
    pub root_link: String,
    pub joints: Vec<String>,
    /// Joint positions the end effector is shown with.
    pub positions: JointValues,
}

impl EndEffector {
    /// End effector of the given group, shown at the given joint positions.
    pub fn from_group(group: &GroupContext, positions: &[f64]) -> Result<Self, TeleopError> {
        if group.spec.kind != GroupKind::EndEffector {
            return Err(TeleopError::NotAnEndEffector(group.spec.name.clone()));
        }
        if group.spec.joints.len() != positions.len() {
            return Err(TeleopError::ArityMismatch {
                names: group.spec.joints.len(),
                values: positions.len(),
            });
        }
        Ok(EndEffector {
            group: group.spec.name.clone(),
            root_link: group.control_frame().to_string(),
            joints: group.spec.joints.clone(),
            positions: positions.to_vec(),
        })
    }

    /// Markers of the end effector with its root link at `offset`. The root link is
    /// projected first, then the links of the end effector joints.
    ///
    /// # Arguments
    ///
    /// * `offset` - pose of the root link in the display frame.
    /// * `id_offset`, `counter` - identifier numbering continues from the caller.
    pub fn markers<D: RobotDescription + ?Sized>(&self, offset: &Pose, description: &D,
                                                 id_offset: MarkerId, counter: &mut MarkerId,
                                                 color: Rgba) -> Result<Vec<MarkerElement>, TeleopError> {
        let chain = ChainState::resolve(description, *offset, &self.joints, &self.positions)?;
        let poses = walk(&chain.root, &chain.steps)?;

        let mut elements = Vec::with_capacity(poses.links.len() + 1);
        if let Some(root) = project(&self.root_link, offset, description.link_visual(&self.root_link),
                                    id_offset + *counter, color) {
            *counter += 1;
            elements.push(root);
        }
        elements.extend(project_chain(&poses, description, id_offset, counter, color));
        Ok(elements)
    }
}
