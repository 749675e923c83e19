//! Core data types flowing through the augmentation pipeline.

use image::RgbaImage;
use serde::Serialize;

use crate::ops::OperatorId;

/// An encoded input image, as read from disk or received from a caller.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Original file name, used verbatim in output names
    pub name: String,

    /// Encoded bytes in any format the `image` crate can sniff
    pub bytes: Vec<u8>,
}

impl ImageInput {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// A decoded source image. Never mutated once created.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Original file name
    pub name: String,

    /// 8-bit RGBA pixels, row-major
    pub pixels: RgbaImage,
}

impl SourceImage {
    pub fn new(name: impl Into<String>, pixels: RgbaImage) -> Self {
        Self {
            name: name.into(),
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// How a task settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TaskOutcome {
    /// The transform ran and its output was kept
    Completed,

    /// The transform failed; the entry holds an unmodified copy of the source
    Degraded { reason: String },
}

impl TaskOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// One produced image, tagged with the operator that was requested for it.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    /// Name of the source image
    pub original_name: String,

    /// Operator requested for this task (kept even when degraded)
    pub operator_id: OperatorId,

    /// Output pixels, same dimensions as the source
    pub image: RgbaImage,

    /// Whether the transform ran or fell back to passthrough
    pub outcome: TaskOutcome,
}

impl BatchEntry {
    /// Archive entry name: `{operatorId}_{originalName}`.
    pub fn output_name(&self) -> String {
        format!("{}_{}", self.operator_id, self.original_name)
    }
}

/// An input that could not be decoded; its tasks were skipped.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedImage {
    pub name: String,
    pub reason: String,
}

/// Everything a batch produced, in image × operator-selection order.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub entries: Vec<BatchEntry>,

    /// Inputs that failed to decode
    pub skipped: Vec<SkippedImage>,

    /// Tasks scheduled, including those of skipped images
    pub total_tasks: usize,
}

impl BatchResult {
    /// Tasks whose transform ran successfully.
    pub fn completed(&self) -> usize {
        self.entries.iter().filter(|e| !e.outcome.is_degraded()).count()
    }

    /// Tasks that fell back to a passthrough copy.
    pub fn degraded(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_degraded()).count()
    }

    /// Tasks never run because their image failed to decode.
    pub fn skipped_tasks(&self) -> usize {
        self.total_tasks - self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> BatchStats {
        BatchStats {
            total_tasks: self.total_tasks,
            completed: self.completed(),
            degraded: self.degraded(),
            skipped_tasks: self.skipped_tasks(),
            skipped_images: self.skipped.len(),
        }
    }
}

/// Summary counts for a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub total_tasks: usize,
    pub completed: usize,
    pub degraded: usize,
    pub skipped_tasks: usize,
    pub skipped_images: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(op: OperatorId, outcome: TaskOutcome) -> BatchEntry {
        BatchEntry {
            original_name: "cat.png".to_string(),
            operator_id: op,
            image: RgbaImage::new(1, 1),
            outcome,
        }
    }

    #[test]
    fn test_output_name() {
        let e = entry(OperatorId::ColorJitter, TaskOutcome::Completed);
        assert_eq!(e.output_name(), "colorJitter_cat.png");
    }

    #[test]
    fn test_batch_counts() {
        let result = BatchResult {
            entries: vec![
                entry(OperatorId::HFlip, TaskOutcome::Completed),
                entry(
                    OperatorId::PatchShuffle,
                    TaskOutcome::Degraded {
                        reason: "grid".to_string(),
                    },
                ),
            ],
            skipped: vec![SkippedImage {
                name: "bad.jpg".to_string(),
                reason: "corrupt".to_string(),
            }],
            total_tasks: 4,
        };

        let stats = result.stats();
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.degraded, 1);
        assert_eq!(stats.skipped_tasks, 2);
        assert_eq!(stats.skipped_images, 1);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(TaskOutcome::Degraded {
            reason: "nan".to_string(),
        })
        .unwrap();
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["reason"], "nan");
    }
}
