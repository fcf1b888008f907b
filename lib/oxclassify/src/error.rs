use crate::classifier::ClassifierState;
use oxel::{ElError, LoadingError};
use oxlogic::ConceptId;
use std::fmt;

/// A logical definition that can not be compiled.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum CompileError {
    /// The definition tree is malformed.
    #[error("Malformed definition of concept {concept}: {message} in {subtree}")]
    Structure {
        concept: ConceptId,
        message: String,
        subtree: String,
    },
    /// The definition uses a construct outside of EL++.
    #[error("Unsupported {construct} in the definition of concept {concept}: {subtree}")]
    Unsupported {
        concept: ConceptId,
        construct: String,
        subtree: String,
    },
}

impl CompileError {
    /// The concept whose definition failed to compile.
    pub fn concept(&self) -> ConceptId {
        match self {
            Self::Structure { concept, .. } | Self::Unsupported { concept, .. } => *concept,
        }
    }
}

/// An error raised by the [`IncrementalClassifier`](crate::IncrementalClassifier) or a reasoner backend.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ClassifierError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    /// The changes can not be applied incrementally. A full extraction and classification is required.
    #[error("Incremental classification is not possible: {0}")]
    IncrementalUnsupported(String),
    #[error(transparent)]
    Loading(#[from] LoadingError),
    #[error("The classification has been cancelled")]
    Cancelled,
    #[error("The classifier is {actual} but this operation requires it to be {expected}")]
    InvalidState {
        expected: ClassifierState,
        actual: ClassifierState,
    },
    #[error(transparent)]
    Reasoner(ElError),
}

impl ClassifierError {
    /// The concept the error originates from, if any.
    pub fn concept(&self) -> Option<ConceptId> {
        if let Self::Compile(e) = self {
            Some(e.concept())
        } else {
            None
        }
    }
}

impl From<ElError> for ClassifierError {
    fn from(error: ElError) -> Self {
        match error {
            ElError::Loading(e) => Self::Loading(e),
            ElError::IncrementalUnsupported(reason) => Self::IncrementalUnsupported(reason),
            ElError::Cancelled => Self::Cancelled,
            e => Self::Reasoner(e),
        }
    }
}

/// A step of the [`ClassificationPipeline`](crate::ClassificationPipeline).
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Stage {
    Extraction,
    Classification,
    PostProcessing,
    IncrementalUpdate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Extraction => "extraction",
            Self::Classification => "classification",
            Self::PostProcessing => "post-processing",
            Self::IncrementalUpdate => "incremental update",
        })
    }
}

/// A failed [`ClassificationPipeline`](crate::ClassificationPipeline) run.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PipelineError {
    #[error("The {stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: ClassifierError,
    },
    /// A stage task panicked or was aborted.
    #[error("A pipeline task did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("Unable to build the worker thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl PipelineError {
    pub(crate) fn stage(stage: Stage) -> impl FnOnce(ClassifierError) -> Self {
        move |source| Self::Stage { stage, source }
    }

    /// The concept the failure originates from, if any.
    pub fn concept(&self) -> Option<ConceptId> {
        if let Self::Stage { source, .. } = self {
            source.concept()
        } else {
            None
        }
    }

    /// The stage that failed, if any.
    pub fn failed_stage(&self) -> Option<Stage> {
        if let Self::Stage { stage, .. } = self {
            Some(*stage)
        } else {
            None
        }
    }

    /// Returns true if the run has been stopped by its cancellation token.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::Stage {
                source: ClassifierError::Cancelled | ClassifierError::Loading(LoadingError::Interrupted),
                ..
            }
        )
    }
}
