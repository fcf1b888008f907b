#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod backend;
mod classifier;
mod compiler;
mod config;
mod error;
mod inverse;
mod linker;
pub mod model;
mod normal_form;
mod pipeline;
mod progress;
mod source;

pub use crate::backend::{
    BackendKind, FormalBackend, NativeBackend, ReasonerBackend, RunContext, RunSummary,
    create_backend,
};
pub use crate::classifier::{ClassifierState, IncrementalClassifier};
pub use crate::compiler::{AxiomCompiler, CompiledConcept, CompiledDefinition};
pub use crate::config::{ClassifierConfig, DEFAULT_PROGRESS_INTERVAL};
pub use crate::error::{ClassifierError, CompileError, PipelineError, Stage};
pub use crate::inverse::InverseCompiler;
pub use crate::linker::RoleHierarchyLinker;
pub use crate::normal_form::NormalFormExtractor;
pub use crate::pipeline::{ClassificationPipeline, ClassificationResults, TaxonomyEntry};
pub use crate::progress::{ProgressTracker, ProgressUpdate, TOTAL_STEPS};
pub use crate::source::DefinitionSource;
pub use oxel::{CancellationToken, ReasonerConfig};
