//! Pipeline progress animation
//!
//! A timed walk through the pipeline stages that gives the user a sense of
//! motion after a job result is already in hand. It is not wired to real job
//! progress. The walk runs as a tokio task owned by an [`AnimationHandle`].
//! Each callback runs under a gate that [`AnimationHandle::stop`] also takes,
//! so once `stop` returns no callback is running and none will start.
//! The synchronous [`AnimationHandle::cancel`] (also run on drop) cannot wait
//! for the gate: a callback already past its check may still complete.

use crate::config::DEFAULT_STAGE_INTERVAL_MS;
use crate::types::PipelineStage;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Receives animation updates
///
/// - CLI implementations redraw a spinner
/// - the orchestrator uses it to track the highlighted stage
#[async_trait]
pub trait AnimationCallback: Send + Sync {
    /// Called once when the animation starts, with the first stage highlighted
    async fn on_started(&self) {}

    /// Called each time the highlighted stage advances
    async fn on_stage(&self, index: usize, stage: PipelineStage);

    /// Called once, after the final stage has been shown for the settle delay
    async fn on_finished(&self);
}

/// Callback that ignores every update
pub struct NoopAnimation;

#[async_trait]
impl AnimationCallback for NoopAnimation {
    async fn on_stage(&self, _index: usize, _stage: PipelineStage) {}
    async fn on_finished(&self) {}
}

/// Observable animation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimationStatus {
    /// Highlighted stage
    pub stage_index: usize,
    /// Whether the terminal notification has been delivered
    pub finished: bool,
}

/// Timed stage sequence
#[derive(Debug, Clone)]
pub struct ProgressAnimator {
    stages: Vec<PipelineStage>,
    interval: Duration,
    settle_delay: Duration,
}

impl Default for ProgressAnimator {
    fn default() -> Self {
        Self::standard()
    }
}

impl ProgressAnimator {
    /// Animate `stages`, advancing every `interval`
    pub fn new(stages: Vec<PipelineStage>, interval: Duration) -> Self {
        Self {
            stages,
            interval,
            settle_delay: interval,
        }
    }

    /// The four pipeline stages at the standard 1500 ms cadence
    pub fn standard() -> Self {
        Self::with_interval(Duration::from_millis(DEFAULT_STAGE_INTERVAL_MS))
    }

    /// The four pipeline stages at a custom cadence
    pub fn with_interval(interval: Duration) -> Self {
        Self::new(PipelineStage::ALL.to_vec(), interval)
    }

    /// Delay between showing the final stage and finishing
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Stages in display order
    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    /// Step interval
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Start from stage 0 on the current tokio runtime
    pub fn start(&self, callback: Arc<dyn AnimationCallback>) -> AnimationHandle {
        let (tx, rx) = watch::channel(AnimationStatus::default());
        let cancelled = Arc::new(AtomicBool::new(false));
        let gate = Arc::new(Mutex::new(()));
        let task = tokio::spawn(run(
            self.clone(),
            callback,
            tx,
            Gate {
                cancelled: Arc::clone(&cancelled),
                lock: Arc::clone(&gate),
            },
        ));

        debug!(
            stages = self.stages.len(),
            interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX),
            "progress animation started"
        );

        AnimationHandle {
            task: Some(task),
            status: rx,
            cancelled,
            gate,
        }
    }
}

struct Gate {
    cancelled: Arc<AtomicBool>,
    lock: Arc<Mutex<()>>,
}

impl Gate {
    /// Hold the gate unless the animation was cancelled
    async fn enter(&self) -> Option<MutexGuard<'_, ()>> {
        let guard = self.lock.lock().await;
        (!self.cancelled.load(Ordering::SeqCst)).then_some(guard)
    }
}

async fn run(
    animator: ProgressAnimator,
    callback: Arc<dyn AnimationCallback>,
    tx: watch::Sender<AnimationStatus>,
    gate: Gate,
) {
    let last = animator.stages.len().saturating_sub(1);
    let mut index = 0;

    {
        let Some(_guard) = gate.enter().await else {
            return;
        };
        callback.on_started().await;
    }

    while index < last {
        tokio::time::sleep(animator.interval).await;
        let Some(_guard) = gate.enter().await else {
            return;
        };
        index += 1;
        tx.send_modify(|s| s.stage_index = index);
        trace!(index, stage = %animator.stages[index], "stage advanced");
        callback.on_stage(index, animator.stages[index]).await;
    }

    tokio::time::sleep(animator.settle_delay).await;
    let Some(_guard) = gate.enter().await else {
        return;
    };
    callback.on_finished().await;
    tx.send_modify(|s| s.finished = true);
    debug!("progress animation finished");
}

/// Owner of a running animation
///
/// Cancels the animation when dropped.
pub struct AnimationHandle {
    task: Option<JoinHandle<()>>,
    status: watch::Receiver<AnimationStatus>,
    cancelled: Arc<AtomicBool>,
    gate: Arc<Mutex<()>>,
}

impl AnimationHandle {
    /// Current state
    pub fn status(&self) -> AnimationStatus {
        *self.status.borrow()
    }

    /// Whether the terminal notification has been delivered
    pub fn is_finished(&self) -> bool {
        self.status().finished
    }

    /// Wait for the animation to end
    ///
    /// Returns `true` if it finished, `false` if it was cancelled first.
    pub async fn finished(&self) -> bool {
        let mut rx = self.status.clone();
        loop {
            if rx.borrow_and_update().finished {
                return true;
            }
            if rx.changed().await.is_err() {
                return rx.borrow().finished;
            }
        }
    }

    /// Stop the animation and wait out any callback in progress
    ///
    /// After this returns no callback is running and none will fire.
    pub async fn stop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let gate = Arc::clone(&self.gate);
        let _guard = gate.lock().await;
        self.cancel();
    }

    /// Stop the animation without waiting
    ///
    /// No new callback starts once the task observes the flag; one already
    /// running on another worker may still complete.
    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                debug!("progress animation cancelled");
            }
            task.abort();
        }
    }
}

impl Drop for AnimationHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        stages: Mutex<Vec<usize>>,
        finished: Mutex<u32>,
    }

    #[async_trait]
    impl AnimationCallback for Recorder {
        async fn on_stage(&self, index: usize, _stage: PipelineStage) {
            self.stages.lock().unwrap().push(index);
        }

        async fn on_finished(&self) {
            *self.finished.lock().unwrap() += 1;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_stage_goes_straight_to_finish() {
        let recorder = Arc::new(Recorder::default());
        let animator = ProgressAnimator::new(vec![PipelineStage::Analyze], Duration::from_millis(100));
        let handle = animator.start(recorder.clone());

        assert!(handle.finished().await);
        assert!(recorder.stages.lock().unwrap().is_empty());
        assert_eq!(*recorder.finished.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_stage_list_still_finishes() {
        let recorder = Arc::new(Recorder::default());
        let handle = ProgressAnimator::new(vec![], Duration::from_millis(100)).start(recorder.clone());

        assert!(handle.finished().await);
        assert_eq!(*recorder.finished.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_tracks_stage() {
        let handle = ProgressAnimator::with_interval(Duration::from_millis(100))
            .start(Arc::new(NoopAnimation));
        assert_eq!(handle.status(), AnimationStatus::default());

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(handle.status().stage_index, 2);
        assert!(!handle.is_finished());
    }
}
