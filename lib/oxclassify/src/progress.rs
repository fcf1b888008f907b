use std::fmt;
use std::sync::Arc;

/// The number of steps of a classification run.
pub const TOTAL_STEPS: u8 = 4;

/// A progress notification of a [`ClassificationPipeline`](crate::ClassificationPipeline) run.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ProgressUpdate {
    /// The current step, from 1 to `total_steps`
    pub step: u8,
    pub total_steps: u8,
    /// Completion of the current step
    pub percent: u8,
}

impl fmt::Display for ProgressUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {}/{} ({}%)",
            self.step, self.total_steps, self.percent
        )
    }
}

/// Forwards progress to a listener.
///
/// Item progress is only forwarded every `interval` items to bound the overhead of reporting from hot loops.
#[derive(Clone)]
pub struct ProgressTracker {
    listener: Option<Arc<dyn Fn(ProgressUpdate) + Send + Sync>>,
    interval: usize,
}

impl ProgressTracker {
    pub fn new(listener: impl Fn(ProgressUpdate) + Send + Sync + 'static, interval: usize) -> Self {
        Self {
            listener: Some(Arc::new(listener)),
            interval: interval.max(1),
        }
    }

    /// A tracker reporting to nobody.
    pub fn silent() -> Self {
        Self {
            listener: None,
            interval: usize::MAX,
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: usize) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Reports the start of a step.
    pub fn step(&self, step: u8) {
        self.report(step, 0);
    }

    /// Reports the end of a step.
    pub fn step_done(&self, step: u8) {
        self.report(step, 100);
    }

    /// Reports that `processed` items out of `total` are done in `step`.
    pub fn items(&self, step: u8, processed: usize, total: usize) {
        if processed.is_multiple_of(self.interval) || processed == total {
            self.report(step, percent(processed, total));
        }
    }

    fn report(&self, step: u8, percent: u8) {
        if let Some(listener) = &self.listener {
            listener(ProgressUpdate {
                step,
                total_steps: TOTAL_STEPS,
                percent,
            });
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::silent()
    }
}

impl fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("listener", &self.listener.is_some())
            .field("interval", &self.interval)
            .finish()
    }
}

fn percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    u8::try_from(processed.min(total) * 100 / total).unwrap_or(100)
}
