use crate::backend::{ReasonerBackend, RunContext, create_backend};
use crate::compiler::AxiomCompiler;
use crate::config::ClassifierConfig;
use crate::error::ClassifierError;
use oxlogic::{ConceptId, LogicalDefinition};
use rayon::prelude::*;
use std::fmt;
use tracing::{info, warn};

/// The lifecycle of an [`IncrementalClassifier`].
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ClassifierState {
    Uninitialized,
    /// The definitions are compiled
    Extracted,
    /// The taxonomy is available
    Classified,
    /// The necessary normal forms are available too
    Ready,
}

impl fmt::Display for ClassifierState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uninitialized => "uninitialized",
            Self::Extracted => "extracted",
            Self::Classified => "classified",
            Self::Ready => "ready",
        })
    }
}

/// Drives a [`ReasonerBackend`] through full and incremental classifications.
///
/// A full classification goes through [`extract`](Self::extract), [`classify`](Self::classify) and
/// [`build_normal_forms`](Self::build_normal_forms).
/// Once ready, batches of changes are applied with [`apply_changes`](Self::apply_changes).
/// If a batch can not be applied incrementally the backend is discarded and a full classification is required.
///
/// ```
/// use oxclassify::{ClassifierConfig, ClassifierState, IncrementalClassifier, RunContext};
/// use oxlogic::{ConceptId, LogicNode, LogicalDefinition};
/// use std::sync::Arc;
///
/// let config = ClassifierConfig::new().with_worker_threads(1);
/// let context = RunContext::new(Arc::new(config.build_thread_pool()?));
/// let mut classifier = IncrementalClassifier::new(config);
/// classifier.extract(
///     &[LogicalDefinition::necessary(ConceptId::new(1), LogicNode::concept(ConceptId::new(2)))],
///     &context,
/// )?;
/// classifier.classify(&context)?;
/// classifier.build_normal_forms(&context)?;
/// assert_eq!(classifier.state(), ClassifierState::Ready);
/// assert_eq!(
///     classifier.backend().parents(ConceptId::new(1)),
///     Some([ConceptId::new(2)].into())
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub struct IncrementalClassifier {
    config: ClassifierConfig,
    backend: Box<dyn ReasonerBackend>,
    state: ClassifierState,
}

impl IncrementalClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        let backend = create_backend(&config);
        Self {
            config,
            backend,
            state: ClassifierState::Uninitialized,
        }
    }

    #[inline]
    pub fn state(&self) -> ClassifierState {
        self.state
    }

    #[inline]
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// The backend, to query the classification results.
    #[inline]
    pub fn backend(&self) -> &dyn ReasonerBackend {
        self.backend.as_ref()
    }

    /// Compiles the stated definitions into a fresh backend.
    pub fn extract(
        &mut self,
        definitions: &[LogicalDefinition],
        context: &RunContext,
    ) -> Result<(), ClassifierError> {
        if self.state != ClassifierState::Uninitialized {
            self.reset();
        }
        self.backend.extract_data(definitions, context)?;
        self.state = ClassifierState::Extracted;
        Ok(())
    }

    /// Loads the extracted model into the reasoner and classifies it.
    pub fn classify(&mut self, context: &RunContext) -> Result<(), ClassifierError> {
        self.expect_state(ClassifierState::Extracted)?;
        self.backend.load_data(context)?;
        self.backend.compute_inferences(context)?;
        let summary = self.backend.summary();
        if summary.incomplete {
            warn!("the classification may be incomplete, the results are still usable");
        }
        info!(
            concepts = self.backend.concept_count(),
            "classification done"
        );
        self.state = ClassifierState::Classified;
        Ok(())
    }

    pub fn build_normal_forms(&mut self, context: &RunContext) -> Result<(), ClassifierError> {
        self.expect_state(ClassifierState::Classified)?;
        self.backend.build_necessary_normal_form(context)?;
        self.state = ClassifierState::Ready;
        Ok(())
    }

    /// Applies a batch of changes: the `deleted` entries are removed, then the `updated` definitions replace
    /// the current ones.
    ///
    /// All the updates are compiled first: a compilation error leaves the classifier untouched.
    /// Any other failure discards the backend and moves the classifier back to
    /// [`ClassifierState::Uninitialized`].
    /// On success the classifier is [`ClassifierState::Classified`].
    pub fn apply_changes(
        &mut self,
        deleted: &[ConceptId],
        updated: &[LogicalDefinition],
        context: &RunContext,
    ) -> Result<(), ClassifierError> {
        self.expect_state(ClassifierState::Ready)?;
        let compiled = context.pool.install(|| {
            updated
                .par_iter()
                .map(AxiomCompiler::compile)
                .collect::<Result<Vec<_>, _>>()
        })?;
        if !self.backend.is_incremental_ready() {
            self.reset();
            return Err(ClassifierError::IncrementalUnsupported(
                "the backend is not ready for incremental changes".into(),
            ));
        }
        if let Err(e) = self.backend.process_incremental(deleted, compiled, context) {
            warn!(error = %e, "incremental changes failed, the backend is discarded");
            self.reset();
            return Err(e);
        }
        info!(
            deleted = deleted.len(),
            updated = updated.len(),
            "incremental changes applied"
        );
        self.state = ClassifierState::Classified;
        Ok(())
    }

    /// Discards the backend and starts from scratch.
    pub fn reset(&mut self) {
        self.backend = create_backend(&self.config);
        self.state = ClassifierState::Uninitialized;
    }

    fn expect_state(&self, expected: ClassifierState) -> Result<(), ClassifierError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ClassifierError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }
}
