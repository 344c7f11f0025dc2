//! Teleop groups: named chains of joints that are controlled and displayed together.
//!
//! All state that belongs to a group lives in its [`GroupContext`], which is owned by
//! the caller and passed explicitly to every call that needs it.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;
use rand::Rng;
use tracing::info;
use crate::frames::FrameLookup;
use crate::id_offsets::OffsetAllocator;
use crate::kinematic_traits::{MarkerId, Pose, RobotDescription};
use crate::markers::{project, MarkerElement, Rgba};
use crate::teleop_error::TeleopError;
use crate::trajectory::DisplayMode;

/// Scale factor of the control marker so that it encloses the link it shows.
pub const CONTROL_MARKER_SCALE: f64 = 1.02;

/// Alpha of the control marker.
pub const CONTROL_MARKER_ALPHA: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// Arm type chain, controlled through a 6 DOF pose of its control frame.
    Manipulator,
    /// Chain controlled joint by joint (head, waist).
    Joint,
    /// Hand or gripper attached to the control frame of a manipulator.
    EndEffector,
}

impl FromStr for GroupKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manipulator" => Ok(GroupKind::Manipulator),
            "joint" => Ok(GroupKind::Joint),
            "endeffector" => Ok(GroupKind::EndEffector),
            _ => Err(format!("Unknown group type {}", s)),
        }
    }
}

/// Static description of a group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSpec {
    pub name: String,
    pub kind: GroupKind,
    /// Frame the group plans and displays in.
    pub planning_frame: String,
    /// Joints in chain order, from the root to the tip.
    pub joints: Vec<String>,
    /// Link the group is controlled at. For end effectors, this is the link they are
    /// attached to (their root).
    pub control_frame: Option<String>,
    /// Name of the end effector group attached to this group, if any.
    pub end_effector: Option<String>,
    /// Stored joint positions by name.
    pub states: BTreeMap<String, Vec<f64>>,
    /// How plans of this group are shown. None uses the display settings.
    pub display_mode: Option<DisplayMode>,
}

impl GroupSpec {
    pub fn new(name: &str, kind: GroupKind, planning_frame: &str, joints: &[&str]) -> Self {
        GroupSpec {
            name: name.to_string(),
            kind,
            planning_frame: planning_frame.to_string(),
            joints: joints.iter().map(|j| j.to_string()).collect(),
            control_frame: None,
            end_effector: None,
            states: BTreeMap::new(),
            display_mode: None,
        }
    }
}

/// Live state of a group: its description, its marker identifier offset and the
/// identifiers it has last published.
#[derive(Debug, Clone)]
pub struct GroupContext {
    pub spec: GroupSpec,
    pub id_offset: MarkerId,
    /// Elements of the last published batch, deleted before the next one is shown.
    pub published: Vec<MarkerElement>,
}

impl GroupContext {
    /// Sets the group up, allocating its identifier offset.
    pub fn new<R: Rng + ?Sized>(spec: GroupSpec, allocator: &mut OffsetAllocator, rng: &mut R) -> Self {
        let id_offset = allocator.allocate(&spec.name, rng);
        info!("Group {} ({:?}, {} joints) set up with id offset {}",
              spec.name, spec.kind, spec.joints.len(), id_offset);
        GroupContext {
            spec,
            id_offset,
            published: Vec::new(),
        }
    }

    /// Tears the group down, returning its identifier offset to the allocator.
    pub fn release(self, allocator: &mut OffsetAllocator) {
        allocator.release(&self.spec.name);
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Joint values of the stored state.
    pub fn stored_state(&self, state: &str) -> Result<&[f64], TeleopError> {
        self.spec.states.get(state)
            .map(Vec::as_slice)
            .ok_or_else(|| TeleopError::UnknownGroupState {
                group: self.spec.name.clone(),
                state: state.to_string(),
            })
    }

    /// Display mode of the group, `default` if it has none of its own.
    pub fn display_mode(&self, default: DisplayMode) -> DisplayMode {
        self.spec.display_mode.unwrap_or(default)
    }

    /// Changes how the next plans of this group are shown.
    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        info!("Group {} display mode set to {:?}", self.spec.name, mode);
        self.spec.display_mode = Some(mode);
    }

    /// Control frame, falling back to the planning frame if the group has none.
    pub fn control_frame(&self) -> &str {
        self.spec.control_frame.as_deref().unwrap_or(&self.spec.planning_frame)
    }

    /// Current pose of the control frame in the planning frame. This is an on-demand
    /// lookup; it blocks at most `timeout`.
    pub fn control_pose<F: FrameLookup + ?Sized>(&self, frames: &F, timeout: Duration)
                                                 -> Result<Pose, TeleopError> {
        frames.lookup_transform(&self.spec.planning_frame, self.control_frame(), timeout)
    }
}

/// Groups set up for one robot, by name.
#[derive(Debug, Clone, Default)]
pub struct GroupSet {
    groups: Vec<GroupContext>,
}

impl GroupSet {
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets up all groups, failing on the first duplicate name.
    pub fn from_specs<R: Rng + ?Sized>(specs: Vec<GroupSpec>, allocator: &mut OffsetAllocator,
                                       rng: &mut R) -> Result<Self, TeleopError> {
        let mut set = GroupSet::new();
        for spec in specs {
            set.add(spec, allocator, rng)?;
        }
        Ok(set)
    }

    pub fn add<R: Rng + ?Sized>(&mut self, spec: GroupSpec, allocator: &mut OffsetAllocator,
                                rng: &mut R) -> Result<&mut GroupContext, TeleopError> {
        if self.groups.iter().any(|g| g.spec.name == spec.name) {
            return Err(TeleopError::DuplicateGroup(spec.name));
        }
        self.groups.push(GroupContext::new(spec, allocator, rng));
        let index = self.groups.len() - 1;
        Ok(&mut self.groups[index])
    }

    /// Removes the group, returning its identifier offset to the allocator.
    pub fn remove(&mut self, name: &str, allocator: &mut OffsetAllocator) -> Result<(), TeleopError> {
        let index = self.index_of(name)?;
        self.groups.remove(index).release(allocator);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&GroupContext, TeleopError> {
        let index = self.index_of(name)?;
        Ok(&self.groups[index])
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut GroupContext, TeleopError> {
        let index = self.index_of(name)?;
        Ok(&mut self.groups[index])
    }

    /// End effector group attached to the named group, if it has one.
    pub fn end_effector_of(&self, name: &str) -> Result<Option<&GroupContext>, TeleopError> {
        match &self.get(name)?.spec.end_effector {
            Some(ee) => self.get(ee).map(Some),
            None => Ok(None),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn index_of(&self, name: &str) -> Result<usize, TeleopError> {
        self.groups.iter()
            .position(|g| g.spec.name == name)
            .ok_or_else(|| TeleopError::UnknownGroup(name.to_string()))
    }
}

/// Translucent, slightly enlarged marker of the control link at its current pose,
/// or None if the control link has nothing to display.
pub fn control_marker<D, F>(group: &GroupContext, description: &D, frames: &F,
                            color: Rgba, timeout: Duration)
                            -> Result<Option<MarkerElement>, TeleopError>
where
    D: RobotDescription + ?Sized,
    F: FrameLookup + ?Sized,
{
    let link = group.control_frame();
    let Some(visual) = description.link_visual(link) else {
        return Ok(None);
    };
    let pose = group.control_pose(frames, timeout)?;
    Ok(project(link, &pose, Some(visual), group.id_offset,
               color.with_alpha(CONTROL_MARKER_ALPHA))
        .map(|m| m.scaled(CONTROL_MARKER_SCALE)
            .in_frame(&group.spec.planning_frame)
            .in_namespace(&group.spec.name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Isometry3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use crate::frames::FrameBuffer;
    use crate::markers::PLAN_COLOR;
    use crate::robot_model::RobotModel;

    fn arm() -> GroupContext {
        let mut allocator = OffsetAllocator::new();
        let mut rng = StdRng::seed_from_u64(1);
        let spec = GroupSpec::demo_arm_groups().remove(0);
        GroupContext::new(spec, &mut allocator, &mut rng)
    }

    #[test]
    fn test_group_kind_from_str() {
        assert_eq!("endeffector".parse::<GroupKind>(), Ok(GroupKind::EndEffector));
        assert!("gripper".parse::<GroupKind>().is_err());
    }

    #[test]
    fn test_stored_state() {
        let group = arm();
        assert_eq!(group.stored_state("home").unwrap(), &[0.0; 4]);
        assert_eq!(group.stored_state("dance"), Err(TeleopError::UnknownGroupState {
            group: "arm".into(),
            state: "dance".into(),
        }));
    }

    #[test]
    fn test_control_marker() {
        let group = arm();
        let robot = RobotModel::demo_arm().unwrap();
        let frames = FrameBuffer::new();
        frames.set_transform("world", "palm", Isometry3::translation(0.0, 0.0, 1.15));

        let marker = control_marker(&group, &robot, &frames, PLAN_COLOR, Duration::from_millis(10))
            .unwrap()
            .expect("palm has a visual");
        assert_eq!(marker.id, group.id_offset);
        assert_eq!(marker.color.a, CONTROL_MARKER_ALPHA);
        assert_eq!(marker.scale.x, CONTROL_MARKER_SCALE);
        assert_eq!(marker.frame_id, "world");
        assert!((marker.pose.translation.z - 1.15).abs() < 1e-12);
    }

    #[test]
    fn test_group_set() {
        let mut allocator = OffsetAllocator::new();
        let mut rng = StdRng::seed_from_u64(3);
        let mut groups = GroupSet::from_specs(GroupSpec::demo_arm_groups(), &mut allocator, &mut rng)
            .unwrap();
        assert_eq!(groups.names(), ["arm", "gripper"]);
        assert_eq!(allocator.len(), 2);

        let ee = groups.end_effector_of("arm").unwrap().expect("arm has a gripper");
        assert_eq!(ee.name(), "gripper");
        assert!(groups.end_effector_of("gripper").unwrap().is_none());
        assert_eq!(groups.get("head").err(), Some(TeleopError::UnknownGroup("head".into())));

        let duplicate = GroupSpec::new("arm", GroupKind::Joint, "world", &["elbow"]);
        assert_eq!(groups.add(duplicate, &mut allocator, &mut rng).err(),
                   Some(TeleopError::DuplicateGroup("arm".into())));

        groups.remove("gripper", &mut allocator).unwrap();
        assert_eq!(allocator.len(), 1);
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_display_mode_per_group() {
        let mut group = arm();
        assert_eq!(group.display_mode(DisplayMode::AllPoints), DisplayMode::AllPoints);
        group.set_display_mode(DisplayMode::LastPoint);
        assert_eq!(group.display_mode(DisplayMode::AllPoints), DisplayMode::LastPoint);
    }

    #[test]
    fn test_control_marker_times_out() {
        let group = arm();
        let robot = RobotModel::demo_arm().unwrap();
        let frames = FrameBuffer::new();
        let result = control_marker(&group, &robot, &frames, PLAN_COLOR, Duration::from_millis(5));
        assert!(matches!(result, Err(TeleopError::FrameLookupTimeout { .. })));
    }
}
