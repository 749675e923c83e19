//! Batch runner: decodes inputs, fans out image × operator tasks, and settles
//! each task as completed or degraded.
//!
//! Images are decoded in input order; an image's tasks are scheduled as soon
//! as it decodes, so later decodes overlap earlier transforms. Transforms run
//! on the blocking pool, bounded by a semaphore. Every task owns a private
//! generator seeded from the batch generator, which keeps seeded batches
//! reproducible regardless of scheduling.

use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::ops::{Operator, OperatorId, Registry};
use crate::params::ParameterSet;
use crate::types::{BatchEntry, BatchResult, ImageInput, SkippedImage, SourceImage, TaskOutcome};

use super::cancel::CancelToken;
use super::decode::ImageDecoder;
use super::progress::{ProgressSink, ProgressTracker};

/// Per-batch overrides.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Seed for the batch generator; falls back to `processing.seed`, then entropy
    pub seed: Option<u64>,
    /// Concurrent transforms; falls back to `processing.parallel_workers`
    pub parallel_workers: Option<usize>,
    /// Checked before each task is scheduled
    pub cancel: CancelToken,
}

/// Runs augmentation batches.
pub struct Augmenter {
    decoder: ImageDecoder,
    registry: Arc<Registry>,
    parallel_workers: usize,
    seed: Option<u64>,
}

enum Pending {
    Encoded(ImageInput),
    Decoded(SourceImage),
}

impl Augmenter {
    /// Create a runner with the standard operator catalog.
    pub fn new(config: &Config) -> Self {
        Self {
            decoder: ImageDecoder::new(config.limits.clone()),
            registry: Arc::new(Registry::standard()),
            parallel_workers: config.processing.parallel_workers,
            seed: config.processing.seed,
        }
    }

    /// Replace the operator registry.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Decode `inputs` and apply every selected operator to each of them.
    ///
    /// Entries come back in input order, then selection order. An input that
    /// fails to decode contributes no entries; its tasks still count toward
    /// progress. Only an empty selection or cancellation fails the batch.
    pub async fn run(
        &self,
        inputs: Vec<ImageInput>,
        operators: &[OperatorId],
        params: &ParameterSet,
        options: &BatchOptions,
        progress: Arc<dyn ProgressSink>,
    ) -> PipelineResult<BatchResult> {
        let pending = inputs.into_iter().map(Pending::Encoded).collect();
        self.execute(pending, operators, params, options, progress)
            .await
    }

    /// Same as [`Augmenter::run`] for images that are already decoded.
    pub async fn run_decoded(
        &self,
        images: Vec<SourceImage>,
        operators: &[OperatorId],
        params: &ParameterSet,
        options: &BatchOptions,
        progress: Arc<dyn ProgressSink>,
    ) -> PipelineResult<BatchResult> {
        let pending = images.into_iter().map(Pending::Decoded).collect();
        self.execute(pending, operators, params, options, progress)
            .await
    }

    async fn execute(
        &self,
        inputs: Vec<Pending>,
        operators: &[OperatorId],
        params: &ParameterSet,
        options: &BatchOptions,
        progress: Arc<dyn ProgressSink>,
    ) -> PipelineResult<BatchResult> {
        if inputs.is_empty() || operators.is_empty() {
            return Err(PipelineError::EmptyBatch {
                images: inputs.len(),
                operators: operators.len(),
            });
        }

        let start = Instant::now();
        let total = inputs.len() * operators.len();
        let workers = options
            .parallel_workers
            .unwrap_or(self.parallel_workers)
            .max(1);
        let mut batch_rng = match options.seed.or(self.seed) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let built: Vec<(OperatorId, Option<Arc<dyn Operator>>)> = operators
            .iter()
            .map(|&id| (id, self.registry.build(id, params)))
            .collect();

        tracing::info!(
            "Starting batch: {} image(s) x {} operator(s) = {} task(s), {} worker(s)",
            inputs.len(),
            operators.len(),
            total,
            workers
        );

        let semaphore = Arc::new(Semaphore::new(workers));
        let tracker = Arc::new(ProgressTracker::new(total, progress));
        let mut handles: Vec<(Arc<SourceImage>, OperatorId, JoinHandle<BatchEntry>)> =
            Vec::with_capacity(total);
        let mut skipped = Vec::new();
        let mut cancelled = false;

        'images: for input in inputs {
            if options.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let source = match input {
                Pending::Decoded(source) => source,
                Pending::Encoded(encoded) => {
                    let name = encoded.name.clone();
                    match self.decoder.decode(encoded).await {
                        Ok(source) => source,
                        Err(e) => {
                            tracing::warn!("Skipping {}: {}", name, e);
                            skipped.push(SkippedImage {
                                name,
                                reason: e.to_string(),
                            });
                            tracker.advance(built.len());
                            continue;
                        }
                    }
                }
            };
            let source = Arc::new(source);

            for (id, op) in &built {
                let Ok(permit) = semaphore.clone().acquire_owned().await else {
                    tracing::warn!("Worker semaphore closed unexpectedly, stopping batch");
                    cancelled = true;
                    break 'images;
                };
                if options.cancel.is_cancelled() {
                    cancelled = true;
                    break 'images;
                }

                let task = Task {
                    source: source.clone(),
                    operator_id: *id,
                    operator: op.clone(),
                    seed: batch_rng.gen(),
                };
                let handle = tokio::spawn(task.run(tracker.clone(), permit));
                handles.push((source.clone(), *id, handle));
            }
        }

        let mut entries = Vec::with_capacity(handles.len());
        for (source, id, handle) in handles {
            match handle.await {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::error!("Task {} on {} aborted: {}", id, source.name, e);
                    tracker.advance(1);
                    entries.push(passthrough(&source, id, format!("task aborted: {e}")));
                }
            }
        }

        if cancelled {
            let completed = tracker.settled();
            tracing::info!("Batch cancelled after {}/{} task(s)", completed, total);
            return Err(PipelineError::Cancelled { completed, total });
        }

        let result = BatchResult {
            entries,
            skipped,
            total_tasks: total,
        };
        let stats = result.stats();
        tracing::info!(
            "Batch finished in {:?}: {} completed, {} degraded, {} skipped",
            start.elapsed(),
            stats.completed,
            stats.degraded,
            stats.skipped_tasks
        );
        Ok(result)
    }
}

/// One (image, operator) unit of work.
struct Task {
    source: Arc<SourceImage>,
    operator_id: OperatorId,
    operator: Option<Arc<dyn Operator>>,
    seed: u64,
}

impl Task {
    async fn run(self, tracker: Arc<ProgressTracker>, permit: OwnedSemaphorePermit) -> BatchEntry {
        let Task {
            source,
            operator_id,
            operator,
            seed,
        } = self;
        let started = Instant::now();

        let outcome = match operator {
            None => Err(format!("operator {operator_id} is not registered")),
            Some(op) => {
                let input = source.clone();
                let applied = tokio::task::spawn_blocking(move || {
                    let mut rng = StdRng::seed_from_u64(seed);
                    op.apply(&input.pixels, &mut rng)
                })
                .await;

                match applied {
                    Ok(Ok(image)) if image.dimensions() == source.pixels.dimensions() => Ok(image),
                    Ok(Ok(image)) => Err(format!(
                        "output is {}x{}, expected {}x{}",
                        image.width(),
                        image.height(),
                        source.width(),
                        source.height()
                    )),
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(e) if e.is_panic() => Err("transform panicked".to_string()),
                    Err(e) => Err(format!("transform did not finish: {e}")),
                }
            }
        };

        let entry = match outcome {
            Ok(image) => {
                tracing::debug!(
                    "{} on {} completed in {:?}",
                    operator_id,
                    source.name,
                    started.elapsed()
                );
                BatchEntry {
                    original_name: source.name.clone(),
                    operator_id,
                    image,
                    outcome: TaskOutcome::Completed,
                }
            }
            Err(reason) => {
                tracing::warn!(
                    "{} on {} degraded to passthrough: {}",
                    operator_id,
                    source.name,
                    reason
                );
                passthrough(&source, operator_id, reason)
            }
        };

        // Settle before releasing the slot so the scheduler sees a
        // cancellation raised from the progress sink.
        tracker.advance(1);
        drop(permit);
        entry
    }
}

/// Unmodified copy of the source, tagged with the requested operator.
fn passthrough(source: &SourceImage, operator_id: OperatorId, reason: String) -> BatchEntry {
    BatchEntry {
        original_name: source.name.clone(),
        operator_id,
        image: source.pixels.clone(),
        outcome: TaskOutcome::Degraded { reason },
    }
}
