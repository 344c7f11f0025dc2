//! Frame lookup: resolves the pose of one coordinate frame in another.
//!
//! Lookups are blocking calls gated by a caller supplied timeout. The lookup never
//! retries on its own, on timeout the caller decides whether to retry or give up.
//!
//! [`FrameBuffer`] is a thread safe in-memory frame tree. Transforms are published by
//! any thread with `set_transform`; a lookup waits until the two frames are connected
//! or the timeout elapses.
//!
//! ```
//! use std::time::Duration;
//! use nalgebra::Isometry3;
//! use rs_teleop_markers::frames::{FrameBuffer, FrameLookup};
//!
//! let frames = FrameBuffer::new();
//! frames.set_transform("world", "base_link", Isometry3::translation(0.0, 0.0, 0.5));
//! let pose = frames.lookup_transform("world", "base_link", Duration::from_millis(10))
//!     .expect("connected frames");
//! assert_eq!(pose.translation.z, 0.5);
//! ```

use std::collections::HashMap;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use nalgebra::Isometry3;
use tracing::{debug, warn};
use crate::kinematic_traits::Pose;
use crate::teleop_error::TeleopError;

/// Narrow synchronous query interface to the frame lookup service.
pub trait FrameLookup {
    /// Pose of frame `to` expressed in frame `from`. Blocks at most `timeout`.
    /// Fails with `FrameLookupTimeout` if the frames did not get connected in time,
    /// or with `FrameLookupUnavailable` if the service is gone.
    fn lookup_transform(&self, from: &str, to: &str, timeout: Duration) -> Result<Pose, TeleopError>;
}

#[derive(Default)]
struct FrameTree {
    /// child -> (parent, pose of the child in the parent)
    parents: HashMap<String, (String, Pose)>,
    closed: bool,
}

impl FrameTree {
    /// Walks up from the frame to the top of its tree. Returns the name of the top frame
    /// and the pose of `frame` in it, or None if the parents of `frame` form a cycle.
    fn to_top(&self, frame: &str) -> Option<(String, Pose)> {
        let mut pose = Isometry3::identity();
        let mut current = frame;
        // A walk without cycle visits each child at most once
        for _ in 0..=self.parents.len() {
            match self.parents.get(current) {
                Some((parent, local)) => {
                    pose = local * pose;
                    current = parent.as_str();
                }
                None => return Some((current.to_string(), pose)),
            }
        }
        None
    }

    fn resolve(&self, from: &str, to: &str) -> Option<Pose> {
        if from == to {
            return Some(Isometry3::identity());
        }
        let (from_top, top_from) = self.to_top(from)?;
        let (to_top, top_to) = self.to_top(to)?;
        let known = |frame: &str| self.parents.contains_key(frame)
            || self.parents.values().any(|(parent, _)| parent == frame);
        if from_top != to_top || !known(from) || !known(to) {
            return None;
        }
        let mut pose = top_from.inverse() * top_to;
        pose.rotation.renormalize();
        Some(pose)
    }
}

/// In-memory frame tree, shared between threads.
#[derive(Default)]
pub struct FrameBuffer {
    tree: Mutex<FrameTree>,
    changed: Condvar,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Default::default()
    }

    fn lock(&self) -> MutexGuard<'_, FrameTree> {
        // Transforms stay consistent even if a publishing thread panicked
        self.tree.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Publishes the pose of `child` in `parent`, replacing any earlier parent of `child`.
    pub fn set_transform(&self, parent: &str, child: &str, pose: Pose) {
        let mut tree = self.lock();
        tree.parents.insert(child.to_string(), (parent.to_string(), pose));
        drop(tree);
        self.changed.notify_all();
    }

    /// Shuts the buffer down. Pending and future lookups fail with `FrameLookupUnavailable`.
    pub fn close(&self) {
        self.lock().closed = true;
        self.changed.notify_all();
    }
}

impl FrameLookup for FrameBuffer {
    fn lookup_transform(&self, from: &str, to: &str, timeout: Duration) -> Result<Pose, TeleopError> {
        // No deadline if the timeout reaches past what Instant can represent
        let deadline = Instant::now().checked_add(timeout);
        let mut tree = self.lock();
        loop {
            if tree.closed {
                return Err(TeleopError::FrameLookupUnavailable {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
            if let Some(pose) = tree.resolve(from, to) {
                return Ok(pose);
            }
            debug!("Waiting for transform from {} to {}", from, to);
            tree = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        warn!("No transform from {} to {} within {:?}", from, to, timeout);
                        return Err(TeleopError::FrameLookupTimeout {
                            from: from.to_string(),
                            to: to.to_string(),
                            timeout,
                        });
                    }
                    self.changed.wait_timeout(tree, deadline - now)
                        .map(|(guard, _)| guard)
                        .unwrap_or_else(|poisoned| poisoned.into_inner().0)
                }
                None => self.changed.wait(tree)
                    .unwrap_or_else(|poisoned| poisoned.into_inner()),
            };
        }
    }
}
