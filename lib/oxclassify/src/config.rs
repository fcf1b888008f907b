use crate::backend::BackendKind;
use oxel::ReasonerConfig;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

/// The default number of extracted definitions between two progress notifications.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 100;

/// Configuration of an [`IncrementalClassifier`](crate::IncrementalClassifier) and of the
/// [`ClassificationPipeline`](crate::ClassificationPipeline) driving it.
///
/// ```
/// use oxclassify::{BackendKind, ClassifierConfig};
///
/// let config = ClassifierConfig::new()
///     .with_backend(BackendKind::Formal)
///     .with_worker_threads(2);
/// assert_eq!(config.backend, BackendKind::Formal);
/// ```
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub backend: BackendKind,
    /// Size of the extraction thread pool, the number of available cores if not set
    pub worker_threads: Option<usize>,
    pub progress_interval: usize,
    /// Used by the [formal backend](BackendKind::Formal)
    pub reasoner: ReasonerConfig,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            worker_threads: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            reasoner: ReasonerConfig::default(),
        }
    }
}

impl ClassifierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    #[must_use]
    pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = Some(worker_threads);
        self
    }

    #[must_use]
    pub fn with_progress_interval(mut self, progress_interval: usize) -> Self {
        self.progress_interval = progress_interval;
        self
    }

    #[must_use]
    pub fn with_reasoner(mut self, reasoner: ReasonerConfig) -> Self {
        self.reasoner = reasoner;
        self
    }

    /// Builds the thread pool extraction fans out on.
    pub fn build_thread_pool(&self) -> Result<ThreadPool, ThreadPoolBuildError> {
        let mut builder =
            ThreadPoolBuilder::new().thread_name(|i| format!("oxclassify worker {i}"));
        if let Some(worker_threads) = self.worker_threads {
            builder = builder.num_threads(worker_threads);
        }
        builder.build()
    }
}
