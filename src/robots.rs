//! Hardcoded description of a small demo arm with a two finger gripper, and the
//! teleop groups that go with it.

use std::f64::consts::FRAC_PI_4;
use nalgebra::{Isometry3, Vector3};
use crate::chain::JointSpec;
use crate::groups::{GroupKind, GroupSpec};
use crate::markers::LinkVisual;
use crate::robot_model::RobotModel;
use crate::teleop_error::TeleopError;

const MESHES: &str = "package://demo_arm/meshes";

fn mesh(link: &str) -> String {
    format!("{}/{}.dae", MESHES, link)
}

impl RobotModel {
    /// Four joint arm standing on `base_link` with a gripper on `palm`:
    ///
    /// ```text
    /// base_link -shoulder_pan-> shoulder_link -shoulder_lift-> upper_arm
    ///   -elbow-> forearm -wrist_roll-> palm -finger_left/finger_right-> fingers
    /// ```
    /// All links stand straight up at zero joint positions. `shoulder_link` has no visual.
    pub fn demo_arm() -> Result<Self, TeleopError> {
        let mut robot = RobotModel::new("demo_arm");

        let joints = [
            ("shoulder_pan", "base_link", "shoulder_link", Vector3::z(), Isometry3::translation(0.0, 0.0, 0.3)),
            ("shoulder_lift", "shoulder_link", "upper_arm", Vector3::y(), Isometry3::translation(0.0, 0.0, 0.1)),
            ("elbow", "upper_arm", "forearm", Vector3::y(), Isometry3::translation(0.0, 0.0, 0.4)),
            ("wrist_roll", "forearm", "palm", Vector3::z(), Isometry3::translation(0.0, 0.0, 0.35)),
            ("finger_left", "palm", "finger_left_link", Vector3::x(), Isometry3::translation(0.0, 0.03, 0.08)),
            ("finger_right", "palm", "finger_right_link", -Vector3::x(), Isometry3::translation(0.0, -0.03, 0.08)),
        ];
        for (name, parent, child, axis, origin) in joints {
            robot.add_joint(JointSpec::new(name, parent, child, axis, origin))?;
        }

        for (link, origin) in [
            ("base_link", Isometry3::identity()),
            ("upper_arm", Isometry3::translation(0.0, 0.0, 0.2)),
            ("forearm", Isometry3::translation(0.0, 0.0, 0.175)),
            ("palm", Isometry3::identity()),
            ("finger_left_link", Isometry3::translation(0.0, 0.0, 0.025)),
            ("finger_right_link", Isometry3::translation(0.0, 0.0, 0.025)),
        ] {
            robot.add_link_visual(link, LinkVisual::new(&mesh(link), origin));
        }
        Ok(robot)
    }
}

impl GroupSpec {
    /// Groups of the demo arm: the `arm` manipulator controlled at `palm`, with the
    /// `gripper` end effector attached there.
    pub fn demo_arm_groups() -> Vec<GroupSpec> {
        let mut arm = GroupSpec::new("arm", GroupKind::Manipulator, "world",
                                     &["shoulder_pan", "shoulder_lift", "elbow", "wrist_roll"]);
        arm.control_frame = Some("palm".to_string());
        arm.end_effector = Some("gripper".to_string());
        arm.states.insert("home".to_string(), vec![0.0; 4]);
        arm.states.insert("ready".to_string(), vec![0.0, FRAC_PI_4, -2.0 * FRAC_PI_4, 0.0]);

        let mut gripper = GroupSpec::new("gripper", GroupKind::EndEffector, "world",
                                         &["finger_left", "finger_right"]);
        gripper.control_frame = Some("palm".to_string());
        gripper.states.insert("open".to_string(), vec![0.3, 0.3]);
        gripper.states.insert("closed".to_string(), vec![0.0, 0.0]);

        vec![arm, gripper]
    }
}
