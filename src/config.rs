//! Reads display settings and group definitions from a YAML teleop configuration.

use std::path::Path;
use std::time::Duration;
use regex::Regex;
use yaml_rust2::{Yaml, YamlLoader};

use crate::config_error::ConfigError;
use crate::groups::{GroupKind, GroupSpec};
use crate::markers::Rgba;
use crate::trajectory::DisplaySettings;

#[derive(Debug, Clone, PartialEq)]
pub struct TeleopConfig {
    pub settings: DisplaySettings,
    /// Groups in the order they appear in the file.
    pub groups: Vec<GroupSpec>,
}

impl TeleopConfig {
    /// Read the teleop configuration from YAML file. YAML file like this is supported:
    /// ```yaml
    /// robot: r2
    /// plan_color: [0.5, 0.1, 0.75, 0.5]
    /// path_increment: 2
    /// display_mode: all_points
    /// frame_timeout: 5.0
    /// groups:
    ///   right_arm:
    ///     type: manipulator
    ///     planning_frame: world
    ///     control_frame: right_palm
    ///     end_effector: right_hand
    ///     display_mode: last_point
    ///     joints: [shoulder, elbow, wrist]
    ///     states:
    ///       home: [0.0, deg(45), deg(-30)]
    /// ```
    /// All top level keys are optional. A group without `display_mode` uses the top
    /// level one. Joint positions are in radians unless written
    /// as deg(angle).
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let docs = YamlLoader::load_from_str(contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        let doc = match docs.first() {
            Some(doc) => doc,
            None => return Ok(TeleopConfig { settings: DisplaySettings::default(), groups: Vec::new() }),
        };

        let defaults = DisplaySettings::default();
        let settings = DisplaySettings {
            robot_name: optional_str(doc, "robot")?
                .map(str::to_string)
                .unwrap_or(defaults.robot_name),
            plan_color: match present(&doc["plan_color"]) {
                Some(color) => parse_color(color)?,
                None => defaults.plan_color,
            },
            path_increment: match present(&doc["path_increment"]) {
                Some(increment) => increment.as_i64()
                    .filter(|&i| i > 0)
                    .map(|i| i as usize)
                    .ok_or_else(|| ConfigError::ParseError(
                        format!("path_increment must be a positive integer, got {:?}", increment)))?,
                None => defaults.path_increment,
            },
            display_mode: match optional_str(doc, "display_mode")? {
                Some(mode) => mode.parse().map_err(ConfigError::ParseError)?,
                None => defaults.display_mode,
            },
            frame_timeout: match present(&doc["frame_timeout"]) {
                Some(timeout) => {
                    let seconds = as_number(timeout)
                        .ok_or_else(|| ConfigError::ParseError(
                            format!("frame_timeout must be a number, got {:?}", timeout)))?;
                    Duration::try_from_secs_f64(seconds)
                        .map_err(|e| ConfigError::ParseError(format!("frame_timeout {}: {}", seconds, e)))?
                }
                None => defaults.frame_timeout,
            },
        };

        let mut groups = Vec::new();
        if let Some(node) = present(&doc["groups"]) {
            let entries = node.as_hash()
                .ok_or_else(|| ConfigError::ParseError("groups must be a mapping".into()))?;
            for (name, group) in entries {
                let name = name.as_str()
                    .ok_or_else(|| ConfigError::ParseError(format!("Bad group name {:?}", name)))?;
                groups.push(parse_group(name, group)?);
            }
        }

        Ok(TeleopConfig { settings, groups })
    }
}

fn parse_group(name: &str, node: &Yaml) -> Result<GroupSpec, ConfigError> {
    let kind = match optional_str(node, "type")? {
        Some(kind) => kind.parse::<GroupKind>().map_err(ConfigError::ParseError)?,
        None => GroupKind::Manipulator,
    };
    let planning_frame = optional_str(node, "planning_frame")?.unwrap_or("world");

    let joints = present(&node["joints"])
        .ok_or_else(|| ConfigError::MissingField(format!("joints of group {}", name)))?
        .as_vec()
        .ok_or_else(|| ConfigError::ParseError(format!("joints of group {} must be a list", name)))?
        .iter()
        .map(|j| j.as_str().ok_or_else(|| ConfigError::ParseError(
            format!("Bad joint name {:?} in group {}", j, name))))
        .collect::<Result<Vec<&str>, ConfigError>>()?;

    let mut spec = GroupSpec::new(name, kind, planning_frame, &joints);
    spec.control_frame = optional_str(node, "control_frame")?.map(str::to_string);
    spec.end_effector = optional_str(node, "end_effector")?.map(str::to_string);
    spec.display_mode = optional_str(node, "display_mode")?
        .map(|mode| mode.parse().map_err(ConfigError::ParseError))
        .transpose()?;

    if let Some(states) = present(&node["states"]) {
        let states = states.as_hash()
            .ok_or_else(|| ConfigError::ParseError(format!("states of group {} must be a mapping", name)))?;
        for (state, values) in states {
            let state = state.as_str()
                .ok_or_else(|| ConfigError::ParseError(format!("Bad state name {:?} in group {}", state, name)))?;
            let values = parse_angles(values)?;
            if values.len() != spec.joints.len() {
                return Err(ConfigError::InvalidLength { expected: spec.joints.len(), found: values.len() });
            }
            spec.states.insert(state.to_string(), values);
        }
    }
    Ok(spec)
}

fn present(node: &Yaml) -> Option<&Yaml> {
    match node {
        Yaml::BadValue | Yaml::Null => None,
        _ => Some(node),
    }
}

fn optional_str<'a>(node: &'a Yaml, key: &str) -> Result<Option<&'a str>, ConfigError> {
    match present(&node[key]) {
        Some(value) => value.as_str()
            .map(Some)
            .ok_or_else(|| ConfigError::ParseError(format!("{} must be a string, got {:?}", key, value))),
        None => Ok(None),
    }
}

fn as_number(node: &Yaml) -> Option<f64> {
    match node {
        Yaml::Real(_) => node.as_f64(),
        Yaml::Integer(i) => Some(*i as f64),
        _ => None,
    }
}

fn parse_color(node: &Yaml) -> Result<Rgba, ConfigError> {
    let components = node.as_vec()
        .ok_or_else(|| ConfigError::ParseError("plan_color must be a list".into()))?
        .iter()
        .map(|c| as_number(c)
            .ok_or_else(|| ConfigError::ParseError(format!("Bad color component {:?}", c))))
        .collect::<Result<Vec<f64>, ConfigError>>()?;
    match components.as_slice() {
        &[r, g, b, a] => Ok(Rgba::new(r as f32, g as f32, b as f32, a as f32)),
        _ => Err(ConfigError::InvalidLength { expected: 4, found: components.len() }),
    }
}

fn parse_angles(node: &Yaml) -> Result<Vec<f64>, ConfigError> {
    let re = Regex::new(r"^deg\((-?\d+(\.\d+)?)\)$")
        .map_err(|_| ConfigError::ParseError("Invalid regex pattern".to_string()))?;
    node.as_vec()
        .ok_or_else(|| ConfigError::ParseError(format!("Joint positions must be a list, got {:?}", node)))?
        .iter()
        .map(|value| parse_angle(&re, value))
        .collect()
}

/// Plain numbers are radians, deg(x) is converted from degrees.
fn parse_angle(re: &Regex, node: &Yaml) -> Result<f64, ConfigError> {
    if let Some(radians) = as_number(node) {
        return Ok(radians);
    }
    let text = node.as_str()
        .ok_or_else(|| ConfigError::WrongAngle(format!("{:?}", node)))?
        .trim();
    let caps = re.captures(text)
        .ok_or_else(|| ConfigError::WrongAngle(text.to_string()))?;
    let degrees: f64 = caps.get(1)
        .ok_or_else(|| ConfigError::WrongAngle(text.to_string()))?
        .as_str()
        .parse()
        .map_err(|_| ConfigError::WrongAngle(text.to_string()))?;
    Ok(degrees.to_radians())
}
