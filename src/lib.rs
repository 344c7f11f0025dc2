//! Forward kinematics of robot joint chains and display markers for teleoperation front-ends.
//!
//! A teleoperation front-end shows the operator where the robot would go before it moves there.
//! This crate computes the pose of every link of a joint chain from the joint positions
//! (forward kinematics by walking the chain) and turns the links that have visual geometry into
//! renderable marker elements, ready to be sent to whatever display surface the front-end uses.
//!
//! # Features
//!
//! - Chain walking: starting from a root pose, each joint contributes its fixed origin transform
//!   followed by the rotation about its axis by the joint value. The accumulated rotation is
//!   renormalized after each step so that long chains do not drift.
//! - Marker projection: links with a mesh are placed at `link pose * visual origin`, links
//!   without visuals are skipped.
//! - Identifier offsets: each chain gets a random, collision-free identifier offset so that
//!   markers of several chains can share one display without overwriting each other.
//! - Planned path display: the last waypoint or every n-th waypoint of a planned joint
//!   trajectory, optionally with the end effector (gripper, hand) drawn at each tip.
//! - Frame lookups are timeout-gated and go through the [`frames::FrameLookup`] trait; an
//!   in-memory [`frames::FrameBuffer`] is provided.
//! - Teleop groups, their stored states and display settings can be read from a YAML file
//!   (feature `allow_filesystem`).
//! - Waypoints are walked in parallel (feature `parallel`). The output does not depend on it.
//!
//! # Robot description
//!
//! Parsing of robot description files is not part of this crate. The kinematic tree is provided
//! through the [`kinematic_traits::RobotDescription`] trait; [`robot_model::RobotModel`] is a simple
//! in-memory implementation, and `RobotModel::demo_arm()` builds a small arm with a two finger
//! gripper that is used by the `teleop-markers` tool and the tests.
//!
//! ## Example
//!
//! ```
//! use std::f64::consts::PI;
//! use nalgebra::Isometry3;
//! use rs_teleop_markers::chain::ChainState;
//! use rs_teleop_markers::markers::{project_chain, PLAN_COLOR};
//! use rs_teleop_markers::robot_model::RobotModel;
//!
//! let robot = RobotModel::demo_arm().unwrap();
//! let joints: Vec<String> = ["shoulder_pan", "shoulder_lift", "elbow", "wrist_roll"]
//!     .iter().map(|j| j.to_string()).collect();
//! let chain = ChainState::resolve(&robot, Isometry3::identity(), &joints,
//!                                 &[0.0, PI / 4.0, -PI / 2.0, 0.0]).unwrap();
//! let poses = chain.walk().unwrap();
//!
//! let mut counter = 0;
//! let markers = project_chain(&poses, &robot, 1000, &mut counter, PLAN_COLOR);
//! assert_eq!(markers.len(), 3); // upper_arm, forearm and palm have visuals
//! ```

pub mod kinematic_traits;
pub mod teleop_error;

pub mod chain;
pub mod markers;

pub mod robot_model;
pub mod robots;

pub mod frames;
pub mod id_offsets;

pub mod groups;
pub mod end_effector;
pub mod display;
pub mod trajectory;
pub mod obstacles;

#[path = "utils/utils.rs"]
pub mod utils;

#[cfg(feature = "allow_filesystem")]
pub mod config;
#[cfg(feature = "allow_filesystem")]
pub mod config_error;

#[cfg(test)]
mod tests;
