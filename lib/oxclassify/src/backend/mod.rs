//! Subsumption reasoning behind a common contract.
//!
//! Two implementations exist:
//! * [`NativeBackend`] translates the native model straight into the [`oxel::Engine`].
//! * [`FormalBackend`] emits formal EL++ axioms and streams them to the [`oxel::ElReasoner`].

mod formal;
mod native;

pub use crate::backend::formal::FormalBackend;
pub use crate::backend::native::NativeBackend;
use crate::compiler::{AxiomCompiler, CompiledDefinition};
use crate::config::ClassifierConfig;
use crate::error::ClassifierError;
use crate::linker::RoleHierarchyLinker;
use crate::model::{AxiomData, Ontology};
use crate::normal_form::NormalFormExtractor;
use crate::progress::ProgressTracker;
use oxel::{CancellationToken, Taxonomy};
use oxlogic::{ConceptId, LogicalDefinition};
use rayon::ThreadPool;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// The reasoning capabilities the [`IncrementalClassifier`](crate::IncrementalClassifier) relies on.
pub trait ReasonerBackend: Send {
    /// Compiles the definitions into the backend model, replacing the previous one.
    fn extract_data(
        &mut self,
        definitions: &[LogicalDefinition],
        context: &RunContext,
    ) -> Result<(), ClassifierError>;

    /// Hands the extracted model to the reasoner and classifies it.
    fn load_data(&mut self, context: &RunContext) -> Result<(), ClassifierError>;

    /// Classifies the loaded model. Does nothing if loading already classified it.
    fn compute_inferences(&mut self, context: &RunContext) -> Result<(), ClassifierError>;

    /// Returns true if [`process_incremental`](Self::process_incremental) can be called.
    fn is_incremental_ready(&self) -> bool;

    /// Removes the `deleted` entries, replaces the `updated` ones and reclassifies.
    ///
    /// Fails with [`ClassifierError::IncrementalUnsupported`] if the result can not be guaranteed correct.
    /// The backend must then be discarded.
    fn process_incremental(
        &mut self,
        deleted: &[ConceptId],
        updated: Vec<CompiledDefinition>,
        context: &RunContext,
    ) -> Result<(), ClassifierError>;

    /// Computes the necessary normal form of every classified concept.
    fn build_necessary_normal_form(&mut self, context: &RunContext)
    -> Result<(), ClassifierError>;

    fn concept_count(&self) -> usize;

    fn equivalents(&self, concept: ConceptId) -> Option<BTreeSet<ConceptId>>;

    fn parents(&self, concept: ConceptId) -> Option<BTreeSet<ConceptId>>;

    fn children(&self, concept: ConceptId) -> Option<BTreeSet<ConceptId>>;

    /// The necessary normal form of `concept`, if it has a non-empty one.
    fn necessary_normal_form(&self, concept: ConceptId) -> Option<LogicalDefinition>;

    fn summary(&self) -> RunSummary;
}

/// The available [`ReasonerBackend`] implementations.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Default)]
pub enum BackendKind {
    /// [`NativeBackend`]
    #[default]
    Native,
    /// [`FormalBackend`]
    Formal,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Native => "native",
            Self::Formal => "formal",
        })
    }
}

/// Builds the backend selected in the configuration.
pub fn create_backend(config: &ClassifierConfig) -> Box<dyn ReasonerBackend> {
    match config.backend {
        BackendKind::Native => Box::new(NativeBackend::new()),
        BackendKind::Formal => Box::new(FormalBackend::new(config.reasoner.clone())),
    }
}

/// Run-level figures.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of definitions compiled
    pub processed: usize,
    /// Ids of the concepts included in the classification
    pub concept_ids: BTreeSet<ConceptId>,
    /// Some inferences may be missing, the taxonomy is still usable
    pub incomplete: bool,
}

/// What a backend operation may use while running.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub cancellation_token: CancellationToken,
    pub progress: ProgressTracker,
    pub pool: Arc<ThreadPool>,
}

impl RunContext {
    pub fn new(pool: Arc<ThreadPool>) -> Self {
        Self {
            cancellation_token: CancellationToken::new(),
            progress: ProgressTracker::silent(),
            pool,
        }
    }

    #[must_use]
    pub fn with_cancellation_token(mut self, cancellation_token: CancellationToken) -> Self {
        self.cancellation_token = cancellation_token;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressTracker) -> Self {
        self.progress = progress;
        self
    }

    pub(crate) fn check_cancelled(&self) -> Result<(), ClassifierError> {
        if self.cancellation_token.is_cancelled() {
            Err(ClassifierError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// The native model and the classification results shared by both backends.
#[derive(Default)]
pub(crate) struct ClassifiedModel {
    pub ontology: Ontology,
    pub data: AxiomData,
    pub taxonomy: Option<Taxonomy<ConceptId>>,
    pub normal_forms: BTreeMap<ConceptId, LogicalDefinition>,
}

impl ClassifiedModel {
    /// Compiles all definitions in parallel then merges them sequentially into a fresh model.
    pub fn extract(
        definitions: &[LogicalDefinition],
        context: &RunContext,
    ) -> Result<Self, ClassifierError> {
        let mut model = Self::default();
        let total = definitions.len();
        let data = &model.data;
        let compiled = context.pool.install(|| {
            definitions
                .par_iter()
                .map(|definition| -> Result<_, ClassifierError> {
                    context.check_cancelled()?;
                    let compiled = AxiomCompiler::compile(definition)?;
                    context.progress.items(1, data.increment_processed(), total);
                    Ok(compiled)
                })
                .collect::<Result<Vec<_>, ClassifierError>>()
        })?;
        for compiled in compiled {
            model.ontology.absorb(compiled);
        }
        let linked = RoleHierarchyLinker::link(&mut model.ontology);
        model.data.concept_ids = model.ontology.concept_ids();
        info!(
            definitions = total,
            concepts = model.data.concept_ids.len(),
            role_types = linked,
            "definitions extracted"
        );
        Ok(model)
    }

    /// Applies an incremental batch to the native model and drops the classification results.
    pub fn apply(&mut self, deleted: &[ConceptId], updated: Vec<CompiledDefinition>) {
        for id in deleted {
            if !self.ontology.remove(*id) {
                debug!(concept = %id, "deleted concept was not in the ontology");
            }
        }
        for compiled in updated {
            self.ontology.absorb(compiled);
        }
        self.ontology.prune();
        for id in RoleHierarchyLinker::linkable_ids(&self.ontology) {
            RoleHierarchyLinker::link_one(&mut self.ontology, id);
        }
        self.data.concept_ids = self.ontology.concept_ids();
        self.taxonomy = None;
        self.normal_forms.clear();
    }

    pub fn build_normal_forms(&mut self, context: &RunContext) -> Result<(), ClassifierError> {
        let Some(taxonomy) = &self.taxonomy else {
            return Ok(());
        };
        let extractor = NormalFormExtractor::new(&self.ontology, taxonomy);
        let concept_ids = self.data.concept_ids.iter().copied().collect::<Vec<_>>();
        self.normal_forms = context.pool.install(|| {
            concept_ids
                .par_iter()
                .map(|id| -> Result<_, ClassifierError> {
                    context.check_cancelled()?;
                    Ok(extractor.logical_definition(*id).map(|nnf| (*id, nnf)))
                })
                .filter_map(Result::transpose)
                .collect::<Result<BTreeMap<_, _>, ClassifierError>>()
        })?;
        debug!(
            normal_forms = self.normal_forms.len(),
            "necessary normal forms built"
        );
        Ok(())
    }

    pub fn equivalents(&self, concept: ConceptId) -> Option<BTreeSet<ConceptId>> {
        self.taxonomy.as_ref()?.equivalents(&concept).cloned()
    }

    pub fn parents(&self, concept: ConceptId) -> Option<BTreeSet<ConceptId>> {
        self.taxonomy.as_ref()?.parents(&concept).cloned()
    }

    pub fn children(&self, concept: ConceptId) -> Option<BTreeSet<ConceptId>> {
        self.taxonomy.as_ref()?.children(&concept).cloned()
    }

    pub fn necessary_normal_form(&self, concept: ConceptId) -> Option<LogicalDefinition> {
        self.normal_forms.get(&concept).cloned()
    }

    pub fn summary(&self, incomplete: bool) -> RunSummary {
        RunSummary {
            processed: self.data.processed(),
            concept_ids: self.data.concept_ids.clone(),
            incomplete,
        }
    }
}
