use std::path::PathBuf;

use anyhow::{Context, Result};
use nalgebra::Isometry3;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rs_teleop_markers::config::TeleopConfig;
use rs_teleop_markers::display::TracingSink;
use rs_teleop_markers::end_effector::EndEffector;
use rs_teleop_markers::frames::FrameBuffer;
use rs_teleop_markers::groups::{GroupSet, GroupSpec};
use rs_teleop_markers::id_offsets::OffsetAllocator;
use rs_teleop_markers::robot_model::RobotModel;
use rs_teleop_markers::trajectory::{DisplayMode, DisplaySettings, JointTrajectory, TrajectoryDisplay};
use rs_teleop_markers::utils::joints_from_degrees;

/// Walks a group of the bundled demo arm to the given joint positions and prints the
/// markers that would be displayed.
#[derive(Debug, clap::Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// YAML teleop configuration. Without it, the demo arm groups are used.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Group to display.
    #[clap(long, default_value = "arm")]
    group: String,

    /// Stored state of the group to display.
    #[clap(long, conflicts_with = "joints")]
    state: Option<String>,

    /// Joint positions in degrees, comma separated.
    #[clap(long, value_delimiter = ',', allow_hyphen_values = true)]
    joints: Vec<f64>,

    /// Number of waypoints from zero position to the target.
    #[clap(long, default_value_t = 1)]
    steps: usize,

    /// last_point or all_points, overrides the configuration.
    #[clap(long)]
    mode: Option<DisplayMode>,
}

fn main() -> Result<()> {
    // Log to stdout, info level unless RUST_LOG says otherwise.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    use clap::Parser as _;
    let args = Args::parse();

    let (mut settings, specs) = match &args.config {
        Some(path) => {
            let config = TeleopConfig::from_yaml_file(path)
                .with_context(|| format!("Failed to read teleop configuration {}", path.display()))?;
            (config.settings, config.groups)
        }
        None => (DisplaySettings::default(), GroupSpec::demo_arm_groups()),
    };
    if let Some(mode) = args.mode {
        settings.display_mode = mode;
    }

    let robot = RobotModel::demo_arm().context("Failed to build the demo arm")?;
    let frames = FrameBuffer::new();
    frames.set_transform("world", "base_link", Isometry3::identity());

    let mut allocator = OffsetAllocator::new();
    let mut rng = rand::thread_rng();
    let mut groups = GroupSet::from_specs(specs, &mut allocator, &mut rng)?;

    let target = {
        let group = groups.get(&args.group)?;
        if !args.joints.is_empty() {
            joints_from_degrees(&args.joints)
        } else if let Some(state) = &args.state {
            group.stored_state(state)?.to_vec()
        } else {
            vec![0.0; group.spec.joints.len()]
        }
    };

    let end_effector = match groups.end_effector_of(&args.group)? {
        Some(ee) => {
            let positions = ee.spec.states.values().next().cloned()
                .unwrap_or_else(|| vec![0.0; ee.spec.joints.len()]);
            Some(EndEffector::from_group(ee, &positions)?)
        }
        None => None,
    };

    let steps = args.steps.max(1);
    let points: Vec<Vec<f64>> = (1..=steps)
        .map(|i| {
            let s = i as f64 / steps as f64;
            target.iter().map(|t| t * s).collect()
        })
        .collect();

    let group = groups.get_mut(&args.group)?;
    if let Some(mode) = args.mode {
        group.set_display_mode(mode);
    }
    let plan = JointTrajectory::new(&group.spec.joints, points);
    let display = TrajectoryDisplay::new(&robot, &frames, &settings);
    let published = display.publish(group, end_effector.as_ref(), &plan, &TracingSink)
        .with_context(|| format!("Failed to display group {}", args.group))?;

    info!("Done, {} markers for group {}", published, args.group);
    Ok(())
}
