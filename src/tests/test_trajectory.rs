use std::collections::HashSet;
use std::f64::consts::FRAC_PI_4;
use std::time::Duration;
use nalgebra::{Isometry3, Vector3};
use crate::chain::ChainState;
use crate::display::{RecordingSink, SinkCall};
use crate::end_effector::EndEffector;
use crate::frames::FrameBuffer;
use crate::groups::{GroupKind, GroupSpec};
use crate::kinematic_traits::MarkerId;
use crate::markers::{project_chain, MarkerAction};
use crate::teleop_error::TeleopError;
use crate::tests::test_utils::{demo_setup, SMALL};
use crate::trajectory::{clear_published, DisplayMode, DisplaySettings, JointTrajectory, TrajectoryDisplay};

fn settings(mode: DisplayMode) -> DisplaySettings {
    DisplaySettings {
        display_mode: mode,
        frame_timeout: Duration::from_millis(20),
        ..Default::default()
    }
}

/// Plan of `n` waypoints, the shoulder lifting a bit more at each.
fn lifting_plan(n: usize) -> JointTrajectory {
    let joints: Vec<String> = ["shoulder_pan", "shoulder_lift", "elbow", "wrist_roll"]
        .iter().map(|j| j.to_string()).collect();
    let points = (0..n).map(|i| vec![0.0, 0.1 * i as f64, 0.0, 0.0]).collect();
    JointTrajectory::new(&joints, points)
}

fn ids(markers: &[crate::markers::MarkerElement]) -> Vec<MarkerId> {
    markers.iter().map(|m| m.id).collect()
}

#[test]
fn test_last_point_with_gripper() {
    let setup = demo_setup();
    let settings = settings(DisplayMode::LastPoint);
    let display = TrajectoryDisplay::new(&setup.robot, &setup.frames, &settings);
    let arm = setup.groups.get("arm").unwrap();
    let gripper = EndEffector::from_group(setup.groups.get("gripper").unwrap(), &[0.0, 0.0]).unwrap();

    let markers = display.state_markers(arm, Some(&gripper), arm.stored_state("home").unwrap()).unwrap();

    let labels: Vec<&str> = markers.iter().map(|m| m.label.as_str()).collect();
    assert_eq!(labels, ["upper_arm", "forearm", "palm", "palm", "finger_left_link", "finger_right_link"]);
    let expected_ids: Vec<MarkerId> = (0..6).map(|i| arm.id_offset + i).collect();
    assert_eq!(ids(&markers), expected_ids);
    for m in &markers {
        assert_eq!(m.frame_id, "world");
        assert_eq!(m.namespace, "robot");
        assert_eq!(m.color, settings.plan_color);
        assert_eq!(m.action, MarkerAction::Add);
    }

    // Gripper root sits where the arm ends
    assert!((markers[3].pose.translation.vector - markers[2].pose.translation.vector).norm() < SMALL);
    let left = markers[4].pose.translation.vector;
    assert!((left - Vector3::new(0.0, 0.03, 1.15 + 0.08 + 0.025)).norm() < SMALL);
}

#[test]
fn test_all_points_every_second_and_last() {
    let setup = demo_setup();
    let settings = settings(DisplayMode::AllPoints);
    let display = TrajectoryDisplay::new(&setup.robot, &setup.frames, &settings);
    let arm = setup.groups.get("arm").unwrap();
    let plan = lifting_plan(7);

    let markers = display.markers(arm, None, &plan).unwrap();

    // Waypoints 1, 3, 5 and 6, three arm links with visuals each. Waypoint 0 is the
    // start state and is skipped, the goal is always drawn
    assert_eq!(markers.len(), 12);
    let unique: HashSet<MarkerId> = ids(&markers).into_iter().collect();
    assert_eq!(unique.len(), 12);
    assert_eq!(ids(&markers), (0..12).map(|i| arm.id_offset + i).collect::<Vec<_>>());

    // Output is in waypoint order, same as walking the waypoints one by one
    let mut counter = 0;
    let mut expected = Vec::new();
    for i in [1, 3, 5, 6] {
        let poses = ChainState::resolve(&setup.robot, Isometry3::identity(), &plan.joint_names, &plan.points[i])
            .and_then(|c| c.walk())
            .unwrap();
        expected.extend(project_chain(&poses, &setup.robot, arm.id_offset, &mut counter, settings.plan_color));
    }
    for (m, e) in markers.iter().zip(&expected) {
        assert_eq!(m.id, e.id);
        assert_eq!(m.label, e.label);
        assert!((m.pose.translation.vector - e.pose.translation.vector).norm() < SMALL);
    }
}

#[test]
fn test_group_display_mode_overrides_settings() {
    let mut setup = demo_setup();
    let settings = settings(DisplayMode::AllPoints);
    let plan = lifting_plan(7);

    setup.groups.get_mut("arm").unwrap().set_display_mode(DisplayMode::LastPoint);
    let display = TrajectoryDisplay::new(&setup.robot, &setup.frames, &settings);
    let arm = setup.groups.get("arm").unwrap();
    let markers = display.markers(arm, None, &plan).unwrap();
    assert_eq!(markers.len(), 3);
    let last = ChainState::resolve(&setup.robot, Isometry3::identity(), &plan.joint_names, &plan.points[6])
        .and_then(|c| c.walk())
        .unwrap();
    assert!((markers[2].pose.translation.vector - last.end_pose.translation.vector).norm() < SMALL);

    // Other groups still follow the settings
    let spec = GroupSpec::new("arm_copy", GroupKind::Manipulator, "world",
                              &["shoulder_pan", "shoulder_lift", "elbow", "wrist_roll"]);
    let mut rng = rand::thread_rng();
    setup.groups.add(spec, &mut setup.allocator, &mut rng).unwrap();
    let copy = setup.groups.get("arm_copy").unwrap();
    assert_eq!(display.markers(copy, None, &plan).unwrap().len(), 12);
}

#[test]
fn test_empty_plan_gives_empty_batch() {
    let setup = demo_setup();
    let settings = settings(DisplayMode::AllPoints);
    let display = TrajectoryDisplay::new(&setup.robot, &setup.frames, &settings);
    let arm = setup.groups.get("arm").unwrap();
    assert!(display.markers(arm, None, &lifting_plan(0)).unwrap().is_empty());
}

#[test]
fn test_end_effector_ignored_for_joint_groups() {
    let mut setup = demo_setup();
    let settings = settings(DisplayMode::LastPoint);
    let gripper = EndEffector::from_group(setup.groups.get("gripper").unwrap(), &[0.3, 0.3]).unwrap();
    let spec = GroupSpec::new("pan", GroupKind::Joint, "world", &["shoulder_pan"]);
    let mut rng = rand::thread_rng();
    setup.groups.add(spec, &mut setup.allocator, &mut rng).unwrap();

    let display = TrajectoryDisplay::new(&setup.robot, &setup.frames, &settings);
    let pan = setup.groups.get("pan").unwrap();
    let markers = display.state_markers(pan, Some(&gripper), &[FRAC_PI_4]).unwrap();
    // shoulder_link has no visual, and the gripper is not drawn
    assert!(markers.is_empty());
}

#[test]
fn test_end_effector_offset_looked_up() {
    let mut setup = demo_setup();
    let settings = settings(DisplayMode::LastPoint);
    setup.frames.set_transform("forearm", "palm", Isometry3::translation(0.0, 0.0, 0.35));
    let gripper = EndEffector::from_group(setup.groups.get("gripper").unwrap(), &[0.0, 0.0]).unwrap();

    let mut spec = GroupSpec::new("short_arm", GroupKind::Manipulator, "world",
                                  &["shoulder_pan", "shoulder_lift", "elbow"]);
    spec.end_effector = Some("gripper".to_string());
    let mut rng = rand::thread_rng();
    setup.groups.add(spec, &mut setup.allocator, &mut rng).unwrap();

    let display = TrajectoryDisplay::new(&setup.robot, &setup.frames, &settings);
    let short_arm = setup.groups.get("short_arm").unwrap();
    let markers = display.state_markers(short_arm, Some(&gripper), &[0.0, 0.0, 0.0]).unwrap();

    let labels: Vec<&str> = markers.iter().map(|m| m.label.as_str()).collect();
    assert_eq!(labels, ["upper_arm", "forearm", "palm", "finger_left_link", "finger_right_link"]);
    assert!((markers[2].pose.translation.vector - Vector3::new(0.0, 0.0, 1.15)).norm() < SMALL);
}

#[test]
fn test_publish_clears_previous_batch() {
    let mut setup = demo_setup();
    let settings = settings(DisplayMode::LastPoint);
    let sink = RecordingSink::new();
    let display = TrajectoryDisplay::new(&setup.robot, &setup.frames, &settings);
    let arm = setup.groups.get_mut("arm").unwrap();

    assert_eq!(display.publish(arm, None, &lifting_plan(3), &sink).unwrap(), 3);
    let first = sink.last_published();
    assert_eq!(display.publish(arm, None, &lifting_plan(5), &sink).unwrap(), 3);

    let calls = sink.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], SinkCall::Publish(first.clone()));
    assert_eq!(calls[1], SinkCall::Clear(ids(&first)));
    assert!(matches!(&calls[2], SinkCall::Publish(batch) if batch.len() == 3));
    assert_eq!(arm.published, sink.last_published());

    clear_published(arm, &sink);
    assert!(arm.published.is_empty());
    assert_eq!(sink.calls().len(), 4);
    // Nothing left to clear
    clear_published(arm, &sink);
    assert_eq!(sink.calls().len(), 4);
}

#[test]
fn test_root_lookup_timeout_propagates() {
    let mut setup = demo_setup();
    let settings = settings(DisplayMode::LastPoint);
    let frames = FrameBuffer::new();
    let sink = RecordingSink::new();
    let display = TrajectoryDisplay::new(&setup.robot, &frames, &settings);
    let arm = setup.groups.get_mut("arm").unwrap();

    let result = display.publish(arm, None, &lifting_plan(2), &sink);
    assert_eq!(result, Err(TeleopError::FrameLookupTimeout {
        from: "world".into(),
        to: "base_link".into(),
        timeout: settings.frame_timeout,
    }));
    assert!(sink.calls().is_empty());
    assert!(arm.published.is_empty());
}

#[test]
fn test_arity_mismatch_publishes_nothing() {
    let mut setup = demo_setup();
    let settings = settings(DisplayMode::AllPoints);
    let sink = RecordingSink::new();
    let display = TrajectoryDisplay::new(&setup.robot, &setup.frames, &settings);
    let arm = setup.groups.get_mut("arm").unwrap();

    let mut plan = lifting_plan(4);
    plan.points[3].pop();
    assert_eq!(display.publish(arm, None, &plan, &sink),
               Err(TeleopError::ArityMismatch { names: 4, values: 3 }));
    assert!(sink.calls().is_empty());
}

#[test]
fn test_groups_release_offsets() {
    let mut setup = demo_setup();
    let offset = setup.groups.get("gripper").unwrap().id_offset;
    assert_eq!(setup.allocator.offset("gripper"), Some(offset));
    setup.groups.remove("gripper", &mut setup.allocator).unwrap();
    assert_eq!(setup.allocator.offset("gripper"), None);
}
