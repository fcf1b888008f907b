use crate::backend::{ReasonerBackend, RunContext, RunSummary};
use crate::classifier::IncrementalClassifier;
use crate::config::ClassifierConfig;
use crate::error::{ClassifierError, PipelineError, Stage};
use crate::progress::{ProgressTracker, ProgressUpdate};
use crate::source::DefinitionSource;
use oxel::CancellationToken;
use oxlogic::{ConceptId, LogicalDefinition};
use rayon::ThreadPool;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::spawn_blocking;
use tracing::{info, warn};

/// The position of a concept in the classified taxonomy.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct TaxonomyEntry {
    pub equivalents: BTreeSet<ConceptId>,
    pub parents: BTreeSet<ConceptId>,
    pub children: BTreeSet<ConceptId>,
}

/// Everything a classification run produces.
#[derive(Debug, Clone, Default)]
pub struct ClassificationResults {
    pub summary: RunSummary,
    pub taxonomy: BTreeMap<ConceptId, TaxonomyEntry>,
    /// The necessary normal forms, to be stored as inferred definitions
    pub inferred: Vec<LogicalDefinition>,
}

impl ClassificationResults {
    fn collect(backend: &dyn ReasonerBackend) -> Self {
        let summary = backend.summary();
        let taxonomy = summary
            .concept_ids
            .iter()
            .filter_map(|id| {
                Some((
                    *id,
                    TaxonomyEntry {
                        equivalents: backend.equivalents(*id)?,
                        parents: backend.parents(*id)?,
                        children: backend.children(*id)?,
                    },
                ))
            })
            .collect();
        let inferred = summary
            .concept_ids
            .iter()
            .filter_map(|id| backend.necessary_normal_form(*id))
            .collect();
        Self {
            summary,
            taxonomy,
            inferred,
        }
    }

    pub fn parents(&self, concept: ConceptId) -> Option<&BTreeSet<ConceptId>> {
        Some(&self.taxonomy.get(&concept)?.parents)
    }

    pub fn children(&self, concept: ConceptId) -> Option<&BTreeSet<ConceptId>> {
        Some(&self.taxonomy.get(&concept)?.children)
    }

    pub fn equivalents(&self, concept: ConceptId) -> Option<&BTreeSet<ConceptId>> {
        Some(&self.taxonomy.get(&concept)?.equivalents)
    }
}

type Consumer = Box<dyn FnMut(&ClassificationResults) + Send>;

/// Runs classifications as a sequence of asynchronous steps:
/// 1. extraction and compilation of the definitions,
/// 2. loading and classification,
/// 3. post-processing into necessary normal forms and a taxonomy snapshot,
/// 4. delivery of the results to the consumer.
///
/// The blocking steps run on the tokio blocking pool, extraction fans out on a shared rayon thread pool.
/// Each step only starts once the previous one is done.
///
/// ```
/// use oxclassify::{ClassificationPipeline, ClassifierConfig};
/// use oxlogic::{ConceptId, LogicNode, LogicalDefinition};
///
/// # tokio::runtime::Builder::new_current_thread().build()?.block_on(async {
/// let mut pipeline = ClassificationPipeline::new(ClassifierConfig::new().with_worker_threads(1))?;
/// let results = pipeline
///     .run(&vec![LogicalDefinition::necessary(
///         ConceptId::new(1),
///         LogicNode::concept(ConceptId::new(2)),
///     )])
///     .await?;
/// assert_eq!(results.parents(ConceptId::new(1)), Some(&[ConceptId::new(2)].into()));
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// # })?;
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub struct ClassificationPipeline {
    config: ClassifierConfig,
    classifier: Option<IncrementalClassifier>,
    pool: Arc<ThreadPool>,
    progress: ProgressTracker,
    cancellation_token: CancellationToken,
    consumer: Option<Consumer>,
}

impl ClassificationPipeline {
    pub fn new(config: ClassifierConfig) -> Result<Self, PipelineError> {
        let pool = Arc::new(config.build_thread_pool()?);
        Ok(Self {
            classifier: Some(IncrementalClassifier::new(config.clone())),
            config,
            pool,
            progress: ProgressTracker::silent(),
            cancellation_token: CancellationToken::new(),
            consumer: None,
        })
    }

    #[must_use]
    pub fn with_progress_listener(
        mut self,
        listener: impl Fn(ProgressUpdate) + Send + Sync + 'static,
    ) -> Self {
        self.progress = ProgressTracker::new(listener, self.config.progress_interval);
        self
    }

    #[must_use]
    pub fn with_cancellation_token(mut self, cancellation_token: CancellationToken) -> Self {
        self.cancellation_token = cancellation_token;
        self
    }

    /// Sets a callback receiving the results of each successful run.
    #[must_use]
    pub fn with_consumer(
        mut self,
        consumer: impl FnMut(&ClassificationResults) + Send + 'static,
    ) -> Self {
        self.consumer = Some(Box::new(consumer));
        self
    }

    /// The token cancelling the runs of this pipeline.
    #[inline]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation_token
    }

    /// The live classifier, absent only while a step is running.
    #[inline]
    pub fn classifier(&self) -> Option<&IncrementalClassifier> {
        self.classifier.as_ref()
    }

    /// Classifies all the definitions of `source` from scratch.
    pub async fn run(
        &mut self,
        source: &dyn DefinitionSource,
    ) -> Result<ClassificationResults, PipelineError> {
        let start = Instant::now();
        let context = self.context();
        let mut definitions = Vec::with_capacity(source.size_hint().unwrap_or_default());
        definitions.extend(source.definitions());
        let definitions = Arc::<[LogicalDefinition]>::from(definitions);
        info!(definitions = definitions.len(), "classification started");

        self.progress.step(1);
        self.blocking_step(Stage::Extraction, &context, move |classifier, context| {
            classifier.extract(&definitions, context)
        })
        .await?;
        self.progress.step_done(1);

        self.progress.step(2);
        self.blocking_step(Stage::Classification, &context, |classifier, context| {
            classifier.classify(context)
        })
        .await?;
        self.progress.step_done(2);

        let results = self.post_process(&context).await?;
        self.deliver(&results);
        info!(
            concepts = results.taxonomy.len(),
            inferred = results.inferred.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "classification finished"
        );
        Ok(results)
    }

    /// Applies a batch of changes to the last classification.
    ///
    /// Falls back to a full [`run`](Self::run) on `source` when the changes can not be applied incrementally
    /// or when there is no previous classification to update.
    /// `source` must then enumerate the definitions with the changes applied.
    pub async fn run_incremental(
        &mut self,
        deleted: Vec<ConceptId>,
        updated: Vec<LogicalDefinition>,
        source: &dyn DefinitionSource,
    ) -> Result<ClassificationResults, PipelineError> {
        let context = self.context();
        info!(
            deleted = deleted.len(),
            updated = updated.len(),
            "incremental classification started"
        );
        // no extraction step
        self.progress.step_done(1);
        self.progress.step(2);
        let outcome = self
            .blocking_step(Stage::IncrementalUpdate, &context, move |classifier, context| {
                classifier.apply_changes(&deleted, &updated, context)
            })
            .await;
        match outcome {
            Ok(()) => (),
            Err(PipelineError::Stage {
                source: ClassifierError::IncrementalUnsupported(reason),
                ..
            }) => {
                warn!(%reason, "falling back to a full classification");
                return self.run(source).await;
            }
            Err(PipelineError::Stage {
                source: e @ ClassifierError::InvalidState { .. },
                ..
            }) => {
                warn!(error = %e, "no classification to update, falling back to a full classification");
                return self.run(source).await;
            }
            Err(e) => return Err(e),
        }
        self.progress.step_done(2);

        let results = self.post_process(&context).await?;
        self.deliver(&results);
        Ok(results)
    }

    fn context(&self) -> RunContext {
        RunContext::new(Arc::clone(&self.pool))
            .with_cancellation_token(self.cancellation_token.clone())
            .with_progress(self.progress.clone())
    }

    /// Step 3
    async fn post_process(
        &mut self,
        context: &RunContext,
    ) -> Result<ClassificationResults, PipelineError> {
        self.progress.step(3);
        self.blocking_step(Stage::PostProcessing, context, |classifier, context| {
            classifier.build_normal_forms(context)
        })
        .await?;
        let results = self
            .classifier
            .as_ref()
            .map(|classifier| ClassificationResults::collect(classifier.backend()))
            .unwrap_or_default();
        self.progress.step_done(3);
        Ok(results)
    }

    /// Step 4
    fn deliver(&mut self, results: &ClassificationResults) {
        self.progress.step(4);
        if let Some(consumer) = &mut self.consumer {
            consumer(results);
        }
        self.progress.step_done(4);
    }

    /// Moves the classifier to the blocking pool for `f` and gets it back.
    ///
    /// If the task does not complete, the classifier is replaced by a fresh one.
    async fn blocking_step(
        &mut self,
        stage: Stage,
        context: &RunContext,
        f: impl FnOnce(&mut IncrementalClassifier, &RunContext) -> Result<(), ClassifierError>
        + Send
        + 'static,
    ) -> Result<(), PipelineError> {
        let mut classifier = self
            .classifier
            .take()
            .unwrap_or_else(|| IncrementalClassifier::new(self.config.clone()));
        let context = context.clone();
        let task = spawn_blocking(move || {
            let result = f(&mut classifier, &context);
            (classifier, result)
        });
        match task.await {
            Ok((classifier, result)) => {
                self.classifier = Some(classifier);
                result.map_err(PipelineError::stage(stage))
            }
            Err(e) => {
                self.classifier = Some(IncrementalClassifier::new(self.config.clone()));
                Err(e.into())
            }
        }
    }
}
