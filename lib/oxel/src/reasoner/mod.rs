//! OWL 2 EL classification on top of the saturation [`Engine`].

mod index;

use crate::axiom::Axiom;
use crate::cancellation::CancellationToken;
use crate::engine::Engine;
use crate::entity::OwlClass;
use crate::error::{ElError, LoadingError};
use crate::loader::AxiomLoader;
use crate::reasoner::index::EntityIndex;
use crate::taxonomy::Taxonomy;
use rustc_hash::FxHashSet;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Configuration for the reasoner.
#[derive(Debug, Clone)]
pub struct ReasonerConfig {
    /// Whether [`ElReasoner::flush`] may apply changes on top of the current state.
    pub incremental: bool,
    /// Whether [`ElReasoner::flush`] accepts axiom removals.
    ///
    /// Removals are applied by rebuilding the saturation from the remaining axioms.
    pub allow_incremental_removals: bool,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            incremental: true,
            allow_incremental_removals: false,
        }
    }
}

/// An OWL 2 EL classifier.
///
/// Axioms are pulled from an [`AxiomLoader`] by [`load`](Self::load), then [`classify`](Self::classify)
/// computes the [`Taxonomy`] of all the classes they mention.
/// Changes registered with [`register_addition`](Self::register_addition) and
/// [`register_removal`](Self::register_removal) are applied by [`flush`](Self::flush).
#[derive(Debug)]
pub struct ElReasoner {
    config: ReasonerConfig,
    engine: Engine,
    index: EntityIndex,
    /// The currently asserted axioms
    axioms: FxHashSet<Axiom>,
    pending_additions: Vec<Axiom>,
    pending_removals: Vec<Axiom>,
    taxonomy: Option<Taxonomy<OwlClass>>,
}

impl Default for ElReasoner {
    fn default() -> Self {
        Self::new()
    }
}

impl ElReasoner {
    pub fn new() -> Self {
        Self::with_config(ReasonerConfig::default())
    }

    pub fn with_config(config: ReasonerConfig) -> Self {
        Self {
            config,
            engine: Engine::new(),
            index: EntityIndex::default(),
            axioms: FxHashSet::default(),
            pending_additions: Vec::new(),
            pending_removals: Vec::new(),
            taxonomy: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &ReasonerConfig {
        &self.config
    }

    /// Pulls all the axioms of `loader`.
    ///
    /// Returns the number of newly asserted axioms.
    pub fn load(
        &mut self,
        loader: &mut dyn AxiomLoader,
        cancellation_token: &CancellationToken,
    ) -> Result<usize, LoadingError> {
        let start = Instant::now();
        let mut batch = Vec::new();
        let mut count = 0;
        while !loader.is_loading_finished() {
            if cancellation_token.is_cancelled() {
                return Err(LoadingError::Interrupted);
            }
            loader.load(&mut |axiom| batch.push(axiom), cancellation_token)?;
            for axiom in batch.drain(..) {
                if self.insert(axiom)? {
                    count += 1;
                }
            }
        }
        info!(
            axioms = count,
            classes = self.index.class_count(),
            elapsed_ms = start.elapsed().as_millis(),
            "axioms loaded"
        );
        Ok(count)
    }

    /// Computes the taxonomy of all known classes.
    pub fn classify(
        &mut self,
        cancellation_token: &CancellationToken,
    ) -> Result<&Taxonomy<OwlClass>, ElError> {
        let start = Instant::now();
        let statistics = self
            .engine
            .saturate(cancellation_token)
            .map_err(|_| ElError::Cancelled)?;
        let engine = &self.engine;
        let index = &self.index;
        let taxonomy = Taxonomy::from_subsumers(index.classes().map(|(class, atom)| {
            (
                class.clone(),
                engine
                    .subsumers(atom)
                    .filter_map(|subsumer| index.class_of(subsumer).cloned())
                    .collect::<Vec<_>>(),
            )
        }));
        if self.index.is_incomplete() {
            warn!("restricted data ranges are not reasoned about, the classification may be incomplete");
        }
        info!(
            classes = taxonomy.len(),
            subsumptions = statistics.subsumptions,
            links = statistics.links,
            elapsed_ms = start.elapsed().as_millis(),
            "classification finished"
        );
        Ok(self.taxonomy.insert(taxonomy))
    }

    /// The result of the last [`classify`](Self::classify) call.
    #[inline]
    pub fn taxonomy(&self) -> Option<&Taxonomy<OwlClass>> {
        self.taxonomy.as_ref()
    }

    /// Returns true if some axioms use constructs only partially reasoned about.
    #[inline]
    pub fn is_incomplete(&self) -> bool {
        self.index.is_incomplete()
    }

    #[inline]
    pub fn axiom_count(&self) -> usize {
        self.axioms.len()
    }

    #[inline]
    pub fn contains(&self, axiom: &Axiom) -> bool {
        self.axioms.contains(axiom)
    }

    /// Queues an axiom to be asserted by the next [`flush`](Self::flush).
    pub fn register_addition(&mut self, axiom: Axiom) {
        self.pending_additions.push(axiom);
    }

    /// Queues an axiom to be retracted by the next [`flush`](Self::flush).
    pub fn register_removal(&mut self, axiom: Axiom) {
        self.pending_removals.push(axiom);
    }

    /// Returns true if some changes have been registered since the last [`flush`](Self::flush).
    #[inline]
    pub fn has_pending_changes(&self) -> bool {
        !self.pending_additions.is_empty() || !self.pending_removals.is_empty()
    }

    /// Applies the registered changes and classifies again.
    ///
    /// An axiom both added and removed is left untouched.
    /// The pending changes are dropped even if the flush fails.
    pub fn flush(&mut self, cancellation_token: &CancellationToken) -> Result<(), ElError> {
        let additions = std::mem::take(&mut self.pending_additions);
        let removals = std::mem::take(&mut self.pending_removals);
        if !self.config.incremental {
            return Err(ElError::IncrementalUnsupported(
                "the reasoner is not configured for incremental changes".into(),
            ));
        }
        let added = additions.iter().collect::<FxHashSet<_>>();
        let removed = removals.iter().collect::<FxHashSet<_>>();
        let removals = removals
            .iter()
            .filter(|axiom| !added.contains(axiom) && self.axioms.contains(*axiom))
            .collect::<FxHashSet<_>>();
        let additions = additions
            .into_iter()
            .filter(|axiom| !removed.contains(axiom))
            .collect::<Vec<_>>();
        debug!(
            additions = additions.len(),
            removals = removals.len(),
            "flushing changes"
        );

        if !removals.is_empty() {
            if !self.config.allow_incremental_removals {
                return Err(ElError::IncrementalUnsupported(format!(
                    "{} axiom(s) would be removed",
                    removals.len()
                )));
            }
            self.axioms.retain(|axiom| !removals.contains(axiom));
            self.rebuild()?;
        }
        for axiom in additions {
            self.insert(axiom)?;
        }
        self.classify(cancellation_token)?;
        Ok(())
    }

    /// Asserts an axiom, returns false if it was already asserted.
    fn insert(&mut self, axiom: Axiom) -> Result<bool, LoadingError> {
        if self.axioms.contains(&axiom) {
            return Ok(false);
        }
        self.index.add_axiom(&mut self.engine, &axiom)?;
        self.axioms.insert(axiom);
        Ok(true)
    }

    fn rebuild(&mut self) -> Result<(), LoadingError> {
        self.engine = Engine::new();
        self.index = EntityIndex::default();
        self.taxonomy = None;
        for axiom in &self.axioms {
            self.index.add_axiom(&mut self.engine, axiom)?;
        }
        Ok(())
    }
}
