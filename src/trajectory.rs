//! Display of planned joint trajectories as marker batches.
//!
//! Every displayed waypoint is walked through the chain of the group and the links
//! with visuals are projected into markers. If the group is a manipulator with an end
//! effector, the end effector is drawn at the tip of each displayed waypoint.
//!
//! The root transform (planning frame to the base of the chain) and the offset from
//! the last link to the end effector root are looked up once per trajectory, with the
//! timeout from the display settings.

use std::time::Duration;
use tracing::{debug, info};
use crate::chain::{ChainPoses, ChainState};
use crate::display::DisplaySink;
use crate::end_effector::EndEffector;
use crate::frames::FrameLookup;
use crate::groups::{GroupContext, GroupKind};
use crate::kinematic_traits::{JointValues, Pose, RobotDescription};
use crate::markers::{delete_markers, project_chain, MarkerElement, Rgba, PLAN_COLOR};
use crate::teleop_error::TeleopError;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Planned path of a group: joint names in chain order and joint positions of
/// each waypoint, in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointTrajectory {
    pub joint_names: Vec<String>,
    pub points: Vec<JointValues>,
}

impl JointTrajectory {
    pub fn new(joint_names: &[String], points: Vec<JointValues>) -> Self {
        JointTrajectory {
            joint_names: joint_names.to_vec(),
            points,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Only the final waypoint.
    LastPoint,
    /// Every `path_increment`-th waypoint, and the final one.
    AllPoints,
}

impl std::str::FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last_point" => Ok(DisplayMode::LastPoint),
            "all_points" => Ok(DisplayMode::AllPoints),
            _ => Err(format!("Unknown display mode {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    /// Namespace of all trajectory markers.
    pub robot_name: String,
    pub plan_color: Rgba,
    pub path_increment: usize,
    pub display_mode: DisplayMode,
    pub frame_timeout: Duration,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            robot_name: "robot".to_string(),
            plan_color: PLAN_COLOR,
            path_increment: 2,
            display_mode: DisplayMode::LastPoint,
            frame_timeout: Duration::from_secs(5),
        }
    }
}

/// Indices of the waypoints to display, out of `n`. The first waypoint is the start
/// state and is skipped in `AllPoints` mode, unless it is the only one. The goal is
/// always included.
pub fn waypoint_indices(n: usize, mode: DisplayMode, increment: usize) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    match mode {
        DisplayMode::LastPoint => vec![n - 1],
        DisplayMode::AllPoints => {
            let mut indices: Vec<usize> = (1..n - 1).step_by(increment.max(1)).collect();
            indices.push(n - 1);
            indices
        }
    }
}

pub struct TrajectoryDisplay<'a, D: ?Sized, F: ?Sized> {
    pub description: &'a D,
    pub frames: &'a F,
    pub settings: &'a DisplaySettings,
}

impl<'a, D, F> TrajectoryDisplay<'a, D, F>
where
    D: RobotDescription + Sync + ?Sized,
    F: FrameLookup + ?Sized,
{
    pub fn new(description: &'a D, frames: &'a F, settings: &'a DisplaySettings) -> Self {
        TrajectoryDisplay { description, frames, settings }
    }

    /// Marker batch of the planned path.
    ///
    /// # Arguments
    ///
    /// * `group` - group the plan is for; gives planning frame, identifier offset and
    ///   display mode, if the group has its own.
    /// * `end_effector` - end effector to draw at the tip of each waypoint. Only used
    ///   for manipulator groups.
    /// * `plan` - the planned path.
    ///
    /// # Returns
    ///
    /// Markers framed in the planning frame of the group, namespaced with the robot
    /// name and numbered `group.id_offset + 0, 1, 2, ...`. Empty plan gives empty batch.
    pub fn markers(&self, group: &GroupContext, end_effector: Option<&EndEffector>,
                   plan: &JointTrajectory) -> Result<Vec<MarkerElement>, TeleopError> {
        let indices = waypoint_indices(plan.points.len(),
                                       group.display_mode(self.settings.display_mode),
                                       self.settings.path_increment);
        if indices.is_empty() || plan.joint_names.is_empty() {
            return Ok(Vec::new());
        }
        for &i in &indices {
            if plan.points[i].len() != plan.joint_names.len() {
                return Err(TeleopError::ArityMismatch {
                    names: plan.joint_names.len(),
                    values: plan.points[i].len(),
                });
            }
        }

        let root = self.root_transform(group, &plan.joint_names)?;
        let walked = self.walk_waypoints(root, plan, &indices)?;

        let end_effector = end_effector.filter(|_| group.spec.kind == GroupKind::Manipulator);
        let ee_offset = match (end_effector, walked.first().and_then(|p| p.end_link.as_deref())) {
            (Some(ee), Some(end_link)) if end_link != ee.root_link =>
                self.frames.lookup_transform(end_link, &ee.root_link, self.settings.frame_timeout)?,
            _ => Pose::identity(),
        };

        let color = self.settings.plan_color;
        let mut counter = 0;
        let mut markers = Vec::new();
        for poses in &walked {
            markers.extend(project_chain(poses, self.description, group.id_offset, &mut counter, color));
            if let Some(ee) = end_effector {
                let offset = poses.end_pose * ee_offset;
                markers.extend(ee.markers(&offset, self.description, group.id_offset, &mut counter, color)?);
            }
        }

        debug!("{} markers for {} waypoints of group {}", markers.len(), walked.len(), group.name());
        Ok(markers.into_iter()
            .map(|m| m.in_frame(&group.spec.planning_frame).in_namespace(&self.settings.robot_name))
            .collect())
    }

    /// Markers of a single joint configuration, as a one point plan.
    pub fn state_markers(&self, group: &GroupContext, end_effector: Option<&EndEffector>,
                         positions: &[f64]) -> Result<Vec<MarkerElement>, TeleopError> {
        let plan = JointTrajectory::new(&group.spec.joints, vec![positions.to_vec()]);
        self.markers(group, end_effector, &plan)
    }

    /// Replaces the previously published path of the group with this one: the old batch is
    /// cleared, the new one published and remembered in the group. Returns the number of
    /// published markers.
    pub fn publish<S: DisplaySink + ?Sized>(&self, group: &mut GroupContext,
                                            end_effector: Option<&EndEffector>,
                                            plan: &JointTrajectory, sink: &S) -> Result<usize, TeleopError> {
        let markers = self.markers(group, end_effector, plan)?;
        clear_published(group, sink);
        sink.publish(&markers);
        info!("Published {} path markers for group {}", markers.len(), group.name());
        let count = markers.len();
        group.published = markers;
        Ok(count)
    }

    /// Transform from the planning frame to the parent link of the first joint.
    fn root_transform(&self, group: &GroupContext, joint_names: &[String]) -> Result<Pose, TeleopError> {
        let first = &joint_names[0];
        let base = &self.description.joint(first)
            .ok_or_else(|| TeleopError::UnknownJoint(first.clone()))?
            .parent_link;
        self.frames.lookup_transform(&group.spec.planning_frame, base, self.settings.frame_timeout)
    }

    #[cfg(feature = "parallel")]
    fn walk_waypoints(&self, root: Pose, plan: &JointTrajectory, indices: &[usize])
                      -> Result<Vec<ChainPoses>, TeleopError> {
        let description = self.description;
        indices.par_iter()
            .map(|&i| ChainState::resolve(description, root, &plan.joint_names, &plan.points[i])?.walk())
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn walk_waypoints(&self, root: Pose, plan: &JointTrajectory, indices: &[usize])
                      -> Result<Vec<ChainPoses>, TeleopError> {
        indices.iter()
            .map(|&i| ChainState::resolve(self.description, root, &plan.joint_names, &plan.points[i])?.walk())
            .collect()
    }
}

/// Removes the previously published batch of the group from the display.
pub fn clear_published<S: DisplaySink + ?Sized>(group: &mut GroupContext, sink: &S) {
    if !group.published.is_empty() {
        sink.clear(&delete_markers(&group.published));
        group.published.clear();
    }
}
