use crate::cancellation::CancellationToken;
use crate::engine::{AtomId, Cancelled, Engine, RoleId, SaturationStatistics, TOP};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Number of processed inferences between two cancellation checks.
const CANCELLATION_CHECK_INTERVAL: usize = 4096;

enum Inference {
    /// The second atom subsumes the first one
    Subsumer(AtomId, AtomId),
    /// The first atom is linked to the second one through the role
    Link(AtomId, RoleId, AtomId),
}

/// Closure of the completion rules over the axioms of an [`Engine`].
#[derive(Debug)]
pub(super) struct Saturation {
    subsumers: Vec<FxHashSet<AtomId>>,
    links: FxHashSet<(AtomId, RoleId, AtomId)>,
    /// `(r, D)` for each link `(C, r, D)`, indexed by `C`
    successors: Vec<Vec<(RoleId, AtomId)>>,
    /// `(r, C)` for each link `(C, r, D)`, indexed by `D`
    predecessors: Vec<Vec<(RoleId, AtomId)>>,
    roles: usize,
    steps: usize,
}

impl Saturation {
    pub(super) fn compute(
        engine: &Engine,
        cancellation_token: &CancellationToken,
    ) -> Result<Self, Cancelled> {
        let atom_count = engine.atom_count();
        let mut saturation = Self {
            subsumers: vec![FxHashSet::default(); atom_count],
            links: FxHashSet::default(),
            successors: vec![Vec::new(); atom_count],
            predecessors: vec![Vec::new(); atom_count],
            roles: engine.role_count(),
            steps: 0,
        };
        let mut queue = VecDeque::new();
        for atom in (0..atom_count).map(AtomId) {
            queue.push_back(Inference::Subsumer(atom, atom));
            queue.push_back(Inference::Subsumer(atom, TOP));
            for role in &engine.reflexive {
                queue.push_back(Inference::Link(atom, *role, atom));
            }
        }
        while let Some(inference) = queue.pop_front() {
            saturation.steps += 1;
            if saturation.steps.is_multiple_of(CANCELLATION_CHECK_INTERVAL)
                && cancellation_token.is_cancelled()
            {
                return Err(Cancelled);
            }
            match inference {
                Inference::Subsumer(atom, subsumer) => {
                    saturation.add_subsumer(engine, &mut queue, atom, subsumer)
                }
                Inference::Link(source, role, target) => {
                    saturation.add_link(engine, &mut queue, source, role, target)
                }
            }
        }
        Ok(saturation)
    }

    fn add_subsumer(
        &mut self,
        engine: &Engine,
        queue: &mut VecDeque<Inference>,
        atom: AtomId,
        subsumer: AtomId,
    ) {
        if !self.subsumers[atom.index()].insert(subsumer) {
            return;
        }
        // A ⊑ B
        for sup in &engine.told_subsumers[subsumer.index()] {
            queue.push_back(Inference::Subsumer(atom, *sup));
        }
        // A1 ⊓ A2 ⊑ B
        for (other, sup) in &engine.conjunctions[subsumer.index()] {
            if self.subsumers[atom.index()].contains(other) {
                queue.push_back(Inference::Subsumer(atom, *sup));
            }
        }
        // A ⊑ ∃r.B
        for (role, filler) in &engine.existentials[subsumer.index()] {
            queue.push_back(Inference::Link(atom, *role, *filler));
        }
        // ∃r.A ⊑ B with an existing link to the context
        for (role, predecessor) in &self.predecessors[atom.index()] {
            if let Some(sups) = engine.existential_triggers.get(&(*role, subsumer)) {
                for sup in sups {
                    queue.push_back(Inference::Subsumer(*predecessor, *sup));
                }
            }
        }
    }

    fn add_link(
        &mut self,
        engine: &Engine,
        queue: &mut VecDeque<Inference>,
        source: AtomId,
        role: RoleId,
        target: AtomId,
    ) {
        if !self.links.insert((source, role, target)) {
            return;
        }
        self.successors[source.index()].push((role, target));
        self.predecessors[target.index()].push((role, source));
        // r ⊑ s
        for sup in &engine.told_role_supers[role.index()] {
            queue.push_back(Inference::Link(source, *sup, target));
        }
        // ∃r.A ⊑ B
        for filler in &self.subsumers[target.index()] {
            if let Some(sups) = engine.existential_triggers.get(&(role, *filler)) {
                for sup in sups {
                    queue.push_back(Inference::Subsumer(source, *sup));
                }
            }
        }
        if engine.chains.is_empty() {
            return;
        }
        // r ∘ s ⊑ t with the link as first element
        for (next_role, next_target) in &self.successors[target.index()] {
            if let Some(sups) = engine.chains.get(&(role, *next_role)) {
                for sup in sups {
                    queue.push_back(Inference::Link(source, *sup, *next_target));
                }
            }
        }
        // r ∘ s ⊑ t with the link as second element
        for (previous_role, previous_source) in &self.predecessors[source.index()] {
            if let Some(sups) = engine.chains.get(&(*previous_role, role)) {
                for sup in sups {
                    queue.push_back(Inference::Link(*previous_source, *sup, target));
                }
            }
        }
    }

    pub(super) fn subsumers(&self, atom: AtomId) -> Option<&FxHashSet<AtomId>> {
        self.subsumers.get(atom.index())
    }

    pub(super) fn statistics(&self) -> SaturationStatistics {
        SaturationStatistics {
            atoms: self.subsumers.len(),
            roles: self.roles,
            subsumptions: self.subsumers.iter().map(FxHashSet::len).sum(),
            links: self.links.len(),
            steps: self.steps,
        }
    }
}
