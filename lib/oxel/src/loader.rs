use crate::axiom::Axiom;
use crate::cancellation::CancellationToken;
use crate::error::LoadingError;

/// A source of axioms pulled by [`ElReasoner::load`](crate::ElReasoner::load).
///
/// The reasoner calls [`load`](Self::load) until [`is_loading_finished`](Self::is_loading_finished) returns `true`.
/// Each call may push any number of axioms to the sink.
pub trait AxiomLoader {
    /// Pushes the next batch of axioms to `sink`.
    ///
    /// Implementations should return [`LoadingError::Interrupted`] as soon as `cancellation_token` is cancelled.
    fn load(
        &mut self,
        sink: &mut dyn FnMut(Axiom),
        cancellation_token: &CancellationToken,
    ) -> Result<(), LoadingError>;

    fn is_loading_finished(&self) -> bool;
}

const DEFAULT_BATCH_SIZE: usize = 1024;

/// An [`AxiomLoader`] over an in-memory sequence of axioms.
pub struct IterAxiomLoader<I> {
    iter: I,
    batch_size: usize,
    finished: bool,
}

impl<I: Iterator<Item = Axiom>> IterAxiomLoader<I> {
    pub fn new(axioms: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            iter: axioms.into_iter(),
            batch_size: DEFAULT_BATCH_SIZE,
            finished: false,
        }
    }

    /// Sets the number of axioms pushed by each [`load`](AxiomLoader::load) call.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

impl<I: Iterator<Item = Axiom>> AxiomLoader for IterAxiomLoader<I> {
    fn load(
        &mut self,
        sink: &mut dyn FnMut(Axiom),
        cancellation_token: &CancellationToken,
    ) -> Result<(), LoadingError> {
        if cancellation_token.is_cancelled() {
            return Err(LoadingError::Interrupted);
        }
        for _ in 0..self.batch_size {
            let Some(axiom) = self.iter.next() else {
                self.finished = true;
                return Ok(());
            };
            sink(axiom);
        }
        Ok(())
    }

    fn is_loading_finished(&self) -> bool {
        self.finished
    }
}
