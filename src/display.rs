//! Display sinks accept batches of marker elements. Publishing is fire-and-forget: the
//! sink does not report back.

use std::sync::Mutex;
use tracing::info;
use crate::kinematic_traits::MarkerId;
use crate::markers::{MarkerElement, MarkerShape};
use crate::utils::format_pose;

pub trait DisplaySink {
    /// Shows the batch, adding or replacing elements by identifier.
    fn publish(&self, batch: &[MarkerElement]);

    /// Removes previously shown elements, given as a batch of delete actions.
    fn clear(&self, batch: &[MarkerElement]);
}

/// What a [`RecordingSink`] has been asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Publish(Vec<MarkerElement>),
    Clear(Vec<MarkerId>),
}

/// Sink that keeps every call in memory. Useful for tests and for tools that post-process
/// the output.
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Default::default()
    }

    /// All calls received so far, oldest first.
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    /// Elements of the last published batch, empty if nothing has been published.
    pub fn last_published(&self) -> Vec<MarkerElement> {
        self.calls().into_iter().rev()
            .find_map(|call| match call {
                SinkCall::Publish(batch) => Some(batch),
                SinkCall::Clear(_) => None,
            })
            .unwrap_or_default()
    }

    fn record(&self, call: SinkCall) {
        // Each call is one push, so a poisoned list holds no partial call
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).push(call);
    }
}

impl DisplaySink for RecordingSink {
    fn publish(&self, batch: &[MarkerElement]) {
        self.record(SinkCall::Publish(batch.to_vec()));
    }

    fn clear(&self, batch: &[MarkerElement]) {
        self.record(SinkCall::Clear(batch.iter().map(|m| m.id).collect()));
    }
}

/// Sink that logs every element.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DisplaySink for TracingSink {
    fn publish(&self, batch: &[MarkerElement]) {
        info!("Publishing {} markers", batch.len());
        for m in batch {
            let shape = match &m.shape {
                MarkerShape::Mesh(resource) => resource.as_str(),
                MarkerShape::Cube => "cube",
            };
            info!("  [{}] {}/{} {} in {}: {}", m.id, m.namespace, m.label, shape, m.frame_id,
                  format_pose(&m.pose));
        }
    }

    fn clear(&self, batch: &[MarkerElement]) {
        if !batch.is_empty() {
            info!("Clearing {} markers", batch.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Isometry3;
    use crate::markers::{delete_markers, project, LinkVisual, PLAN_COLOR};

    #[test]
    fn test_recording_sink() {
        let visual = LinkVisual::new("package://demo_arm/meshes/palm.dae", Isometry3::identity());
        let batch: Vec<MarkerElement> = (0..3)
            .filter_map(|i| project("palm", &Isometry3::translation(i as f64, 0.0, 0.0),
                                    Some(&visual), 10 + i, PLAN_COLOR))
            .collect();

        let sink = RecordingSink::new();
        assert!(sink.last_published().is_empty());
        sink.publish(&batch);
        sink.clear(&delete_markers(&batch));

        assert_eq!(sink.calls(), vec![SinkCall::Publish(batch.clone()), SinkCall::Clear(vec![10, 11, 12])]);
        assert_eq!(sink.last_published(), batch);
    }

    #[test]
    fn test_recording_sink_survives_poisoning() {
        let sink = std::sync::Arc::new(RecordingSink::new());
        let panicking = {
            let sink = sink.clone();
            std::thread::spawn(move || {
                let _calls = sink.calls.lock().unwrap();
                panic!("panic while holding the recording");
            })
        };
        assert!(panicking.join().is_err());
        assert!(sink.calls.is_poisoned());

        let batch = vec![project("palm", &Isometry3::identity(),
                                 Some(&LinkVisual::new("palm.dae", Isometry3::identity())), 4, PLAN_COLOR)
            .expect("palm has a visual")];
        sink.publish(&batch);
        sink.clear(&delete_markers(&batch));
        assert_eq!(sink.calls(), vec![SinkCall::Publish(batch.clone()), SinkCall::Clear(vec![4])]);
        assert_eq!(sink.last_published(), batch);
    }
}
