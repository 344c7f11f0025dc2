//! Collision obstacles shown as boxes next to the robot.

use nalgebra::Vector3;
use tracing::info;
use crate::display::DisplaySink;
use crate::kinematic_traits::Pose;
use crate::markers::{MarkerAction, MarkerElement, MarkerShape, OBSTACLE_COLOR};

#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub name: String,
    pub pose: Pose,
    /// Edge lengths of the box along its local x, y, z.
    pub size: Vector3<f64>,
    pub frame_id: String,
}

impl Obstacle {
    /// Green translucent cube. Obstacles are told apart by namespace, so all have id 0.
    pub fn marker(&self) -> MarkerElement {
        MarkerElement {
            id: 0,
            pose: self.pose,
            shape: MarkerShape::Cube,
            color: OBSTACLE_COLOR,
            label: self.name.clone(),
            namespace: self.name.clone(),
            frame_id: self.frame_id.clone(),
            scale: self.size,
            action: MarkerAction::Add,
        }
    }
}

/// All obstacles added so far. The display receives the complete set each time
/// one is added.
#[derive(Debug, Clone, Default)]
pub struct ObstacleSet {
    obstacles: Vec<Obstacle>,
}

impl ObstacleSet {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds the obstacle and republishes the set. An obstacle with the same name
    /// is replaced.
    pub fn add<S: DisplaySink + ?Sized>(&mut self, name: &str, pose: Pose, size: Vector3<f64>,
                                        frame_id: &str, sink: &S) {
        let obstacle = Obstacle {
            name: name.to_string(),
            pose,
            size,
            frame_id: frame_id.to_string(),
        };
        match self.obstacles.iter_mut().find(|o| o.name == name) {
            Some(existing) => *existing = obstacle,
            None => self.obstacles.push(obstacle),
        }
        info!("Obstacle {} added in {}, {} obstacles total", name, frame_id, self.obstacles.len());
        sink.publish(&self.markers());
    }

    pub fn markers(&self) -> Vec<MarkerElement> {
        self.obstacles.iter().map(Obstacle::marker).collect()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Isometry3;
    use crate::display::{RecordingSink, SinkCall};

    #[test]
    fn test_whole_set_republished() {
        let sink = RecordingSink::new();
        let mut obstacles = ObstacleSet::new();
        obstacles.add("table", Isometry3::translation(0.8, 0.0, 0.4),
                      Vector3::new(1.0, 1.5, 0.05), "world", &sink);
        obstacles.add("shelf", Isometry3::translation(-0.5, 0.6, 1.0),
                      Vector3::new(0.3, 0.8, 0.02), "world", &sink);

        let calls = sink.calls();
        assert_eq!(calls.len(), 2);
        match &calls[1] {
            SinkCall::Publish(batch) => {
                let names: Vec<&str> = batch.iter().map(|m| m.namespace.as_str()).collect();
                assert_eq!(names, ["table", "shelf"]);
            }
            other => panic!("Unexpected call {:?}", other),
        }

        let table = &sink.last_published()[0];
        assert_eq!(table.shape, MarkerShape::Cube);
        assert_eq!(table.color, OBSTACLE_COLOR);
        assert_eq!(table.label, "table");
        assert_eq!(table.scale, Vector3::new(1.0, 1.5, 0.05));
        assert_eq!(table.frame_id, "world");
    }

    #[test]
    fn test_same_name_replaced() {
        let sink = RecordingSink::new();
        let mut obstacles = ObstacleSet::new();
        obstacles.add("box", Isometry3::identity(), Vector3::repeat(0.1), "world", &sink);
        obstacles.add("box", Isometry3::translation(0.0, 0.0, 1.0), Vector3::repeat(0.2), "world", &sink);
        assert_eq!(obstacles.len(), 1);
        assert_eq!(sink.last_published()[0].scale, Vector3::repeat(0.2));
    }
}
