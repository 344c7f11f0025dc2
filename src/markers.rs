//! Converts accumulated link poses into renderable marker elements.
//!
//! Links without visual geometry are skipped silently, this is not an error.
//! Identifiers must be unique across one display batch even if the batch spans
//! several chains. Each chain gets a random offset once at setup (see
//! [`crate::id_offsets::OffsetAllocator`]) and adds a counter that increases by one
//! for every emitted element.

extern crate nalgebra as na;

use na::Vector3;
use crate::chain::ChainPoses;
use crate::kinematic_traits::{MarkerId, Pose, RobotDescription};

/// Visual geometry of a link: opaque mesh resource identifier and the offset from the
/// link frame to the local frame of the mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkVisual {
    pub mesh: String,
    pub origin: Pose,
}

impl LinkVisual {
    pub fn new(mesh: &str, origin: Pose) -> Self {
        LinkVisual { mesh: mesh.to_string(), origin }
    }
}

/// Color with alpha, components in 0 .. 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Rgba { r, g, b, a }
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: f32) -> Self {
        Rgba { a, ..self }
    }
}

/// Translucent purple used to display planned paths.
pub const PLAN_COLOR: Rgba = Rgba::new(0.5, 0.1, 0.75, 0.5);

/// Color of collision obstacles.
pub const OBSTACLE_COLOR: Rgba = Rgba::new(0.0, 1.0, 0.0, 0.8);

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerShape {
    /// Mesh resource, displayed with its embedded materials.
    Mesh(String),
    /// Box, size is given by the marker scale.
    Cube,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerAction {
    Add,
    Delete,
}

/// Renderable unit sent to the display surface. Produced fresh on each call, the
/// ownership goes to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerElement {
    pub id: MarkerId,
    pub pose: Pose,
    pub shape: MarkerShape,
    pub color: Rgba,
    /// Label shown next to the marker. Name of the link for projected links.
    pub label: String,
    pub namespace: String,
    /// Frame the pose is expressed in. Empty if not yet assigned.
    pub frame_id: String,
    pub scale: Vector3<f64>,
    pub action: MarkerAction,
}

impl MarkerElement {
    /// Mesh resource of this element, None for primitive shapes.
    pub fn mesh(&self) -> Option<&str> {
        match &self.shape {
            MarkerShape::Mesh(resource) => Some(resource.as_str()),
            MarkerShape::Cube => None,
        }
    }

    pub fn in_frame(mut self, frame_id: &str) -> Self {
        self.frame_id = frame_id.to_string();
        self
    }

    pub fn in_namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    pub fn scaled(mut self, scale: f64) -> Self {
        self.scale = Vector3::repeat(scale);
        self
    }
}

/// Projects a single link. Returns None if the link has no visual, otherwise the
/// mesh marker at `pose * visual.origin`.
pub fn project(link: &str, pose: &Pose, visual: Option<&LinkVisual>,
               id: MarkerId, color: Rgba) -> Option<MarkerElement> {
    let visual = visual?;
    Some(MarkerElement {
        id,
        pose: pose * visual.origin,
        shape: MarkerShape::Mesh(visual.mesh.clone()),
        color,
        label: link.to_string(),
        namespace: String::new(),
        frame_id: String::new(),
        scale: Vector3::repeat(1.0),
        action: MarkerAction::Add,
    })
}

/// Projects all links of the walked chain that have visuals, in chain order.
/// Identifiers are `id_offset + counter`; the counter is advanced for each emitted
/// element so that the caller can continue numbering with other elements of the
/// same batch.
pub fn project_chain<D: RobotDescription + ?Sized>(poses: &ChainPoses, description: &D,
                                                   id_offset: MarkerId, counter: &mut MarkerId,
                                                   color: Rgba) -> Vec<MarkerElement> {
    let mut elements = Vec::new();
    for link in &poses.links {
        if let Some(element) = project(&link.link, &link.pose,
                                       description.link_visual(&link.link),
                                       id_offset + *counter, color) {
            *counter += 1;
            elements.push(element);
        }
    }
    elements
}

/// Turns the batch into delete actions for the same identifiers, for clearing
/// the previous batch on the display.
pub fn delete_markers(batch: &[MarkerElement]) -> Vec<MarkerElement> {
    batch.iter()
        .map(|m| MarkerElement {
            action: MarkerAction::Delete,
            ..m.clone()
        })
        .collect()
}
