use std::error::Error;

/// An error raised by the [`ElReasoner`](crate::ElReasoner).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ElError {
    #[error(transparent)]
    Loading(#[from] LoadingError),
    /// The pending changes can not be applied without reloading the ontology.
    #[error("The pending changes can not be applied incrementally: {0}")]
    IncrementalUnsupported(String),
    #[error("The classification has been cancelled")]
    Cancelled,
}

/// An error raised while pulling axioms from an [`AxiomLoader`](crate::AxiomLoader).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LoadingError {
    /// The loading has been stopped by a [`CancellationToken`](crate::CancellationToken).
    #[error("The axiom loading has been interrupted")]
    Interrupted,
    /// The axiom is not well-formed.
    #[error("Invalid axiom {axiom}: {message}")]
    InvalidAxiom { axiom: String, message: String },
    /// The axiom source failed.
    #[error(transparent)]
    Source(Box<dyn Error + Send + Sync>),
}
