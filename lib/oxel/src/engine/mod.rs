//! EL++ completion rule engine over plain integer identifiers.
//!
//! Axioms are normalized on insertion into the forms
//! `A ⊑ B`, `A1 ⊓ A2 ⊑ B`, `A ⊑ ∃r.B`, `∃r.A ⊑ B`, `r ⊑ s`, `r ∘ s ⊑ t` and `reflexive(r)`,
//! introducing fresh atoms for nested expressions.
//! [`Engine::saturate`] then computes for every atom the set of all its subsumers.

mod saturation;

use crate::cancellation::CancellationToken;
use crate::engine::saturation::Saturation;
use rustc_hash::FxHashMap;
use std::time::Instant;
use tracing::debug;

/// An atomic concept of the [`Engine`].
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Copy, Hash)]
pub struct AtomId(usize);

impl AtomId {
    #[inline]
    fn index(self) -> usize {
        self.0
    }
}

/// A role of the [`Engine`].
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Copy, Hash)]
pub struct RoleId(usize);

impl RoleId {
    #[inline]
    fn index(self) -> usize {
        self.0
    }
}

/// The top concept, subsumer of every atom.
pub const TOP: AtomId = AtomId(0);

/// A concept expression built from atoms.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Expr {
    Top,
    Atom(AtomId),
    And(Vec<Expr>),
    Exists(RoleId, Box<Expr>),
}

impl Expr {
    #[inline]
    pub fn exists(role: RoleId, filler: Expr) -> Self {
        Self::Exists(role, Box::new(filler))
    }
}

impl From<AtomId> for Expr {
    #[inline]
    fn from(atom: AtomId) -> Self {
        Self::Atom(atom)
    }
}

/// The saturation was interrupted by its [`CancellationToken`].
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("The saturation has been cancelled")]
pub struct Cancelled;

/// Figures about the last saturation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaturationStatistics {
    pub atoms: usize,
    pub roles: usize,
    pub subsumptions: usize,
    pub links: usize,
    pub steps: usize,
}

/// EL++ saturation engine.
///
/// ```
/// use oxel::{CancellationToken, Engine, Expr};
///
/// let mut engine = Engine::new();
/// let heart = engine.new_atom();
/// let organ = engine.new_atom();
/// let heart_disease = engine.new_atom();
/// let disease = engine.new_atom();
/// let organ_disease = engine.new_atom();
/// let site = engine.new_role();
/// engine.add_subsumption(&heart.into(), &organ.into());
/// engine.add_subsumption(&heart_disease.into(), &Expr::And(vec![disease.into(), Expr::exists(site, heart.into())]));
/// engine.add_equivalence(&organ_disease.into(), &Expr::And(vec![disease.into(), Expr::exists(site, organ.into())]));
/// engine.saturate(&CancellationToken::new())?;
/// assert!(engine.is_subsumed_by(heart_disease, organ_disease));
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug)]
pub struct Engine {
    /// Told `A ⊑ B`, indexed by `A`
    told_subsumers: Vec<Vec<AtomId>>,
    /// Told `A ⊓ A2 ⊑ B` stored as `(A2, B)`, indexed by both conjuncts
    conjunctions: Vec<Vec<(AtomId, AtomId)>>,
    /// Told `A ⊑ ∃r.B` stored as `(r, B)`, indexed by `A`
    existentials: Vec<Vec<(RoleId, AtomId)>>,
    /// Told `∃r.A ⊑ B`
    existential_triggers: FxHashMap<(RoleId, AtomId), Vec<AtomId>>,
    /// Told role inclusions, indexed by the sub role
    told_role_supers: Vec<Vec<RoleId>>,
    /// Told `r ∘ s ⊑ t`
    chains: FxHashMap<(RoleId, RoleId), Vec<RoleId>>,
    reflexive: Vec<RoleId>,
    lhs_cache: FxHashMap<Expr, AtomId>,
    rhs_cache: FxHashMap<Expr, AtomId>,
    saturation: Option<Saturation>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            told_subsumers: vec![Vec::new()],
            conjunctions: vec![Vec::new()],
            existentials: vec![Vec::new()],
            existential_triggers: FxHashMap::default(),
            told_role_supers: Vec::new(),
            chains: FxHashMap::default(),
            reflexive: Vec::new(),
            lhs_cache: FxHashMap::default(),
            rhs_cache: FxHashMap::default(),
            saturation: None,
        }
    }

    pub fn new_atom(&mut self) -> AtomId {
        let atom = AtomId(self.told_subsumers.len());
        self.told_subsumers.push(Vec::new());
        self.conjunctions.push(Vec::new());
        self.existentials.push(Vec::new());
        self.saturation = None;
        atom
    }

    pub fn new_role(&mut self) -> RoleId {
        let role = RoleId(self.told_role_supers.len());
        self.told_role_supers.push(Vec::new());
        self.saturation = None;
        role
    }

    /// Number of atoms, including [`TOP`] and the fresh atoms introduced by normalization.
    #[inline]
    pub fn atom_count(&self) -> usize {
        self.told_subsumers.len()
    }

    #[inline]
    pub fn role_count(&self) -> usize {
        self.told_role_supers.len()
    }

    /// Adds `sub ⊑ sup`.
    pub fn add_subsumption(&mut self, sub: &Expr, sup: &Expr) {
        let sub = self.lhs_atom(sub);
        self.add_rhs(sub, sup);
        self.saturation = None;
    }

    /// Adds `first ≡ second`.
    pub fn add_equivalence(&mut self, first: &Expr, second: &Expr) {
        self.add_subsumption(first, second);
        self.add_subsumption(second, first);
    }

    /// Adds `sub ⊑ sup` between roles.
    pub fn add_sub_role(&mut self, sub: RoleId, sup: RoleId) {
        if sub != sup && !self.told_role_supers[sub.index()].contains(&sup) {
            self.told_role_supers[sub.index()].push(sup);
            self.saturation = None;
        }
    }

    /// Adds `r1 ∘ ... ∘ rn ⊑ sup`.
    ///
    /// Chains longer than two are split using fresh roles.
    /// A chain of one role is a role inclusion and an empty chain is ignored.
    pub fn add_role_chain(&mut self, chain: &[RoleId], sup: RoleId) {
        match chain {
            [] => (),
            [role] => self.add_sub_role(*role, sup),
            [first, second] => {
                let implied = self.chains.entry((*first, *second)).or_default();
                if !implied.contains(&sup) {
                    implied.push(sup);
                    self.saturation = None;
                }
            }
            [prefix @ .., last] => {
                let fresh = self.new_role();
                self.add_role_chain(prefix, fresh);
                self.add_role_chain(&[fresh, *last], sup);
            }
        }
    }

    /// Adds `r ∘ r ⊑ r`.
    pub fn add_transitive(&mut self, role: RoleId) {
        self.add_role_chain(&[role, role], role);
    }

    /// Makes every atom `r`-linked to itself.
    pub fn add_reflexive(&mut self, role: RoleId) {
        if !self.reflexive.contains(&role) {
            self.reflexive.push(role);
            self.saturation = None;
        }
    }

    /// Returns true if [`subsumers`](Self::subsumers) reflects all the added axioms.
    #[inline]
    pub fn is_saturated(&self) -> bool {
        self.saturation.is_some()
    }

    /// Computes all subsumers of all atoms.
    ///
    /// Does nothing if no axiom has been added since the last successful saturation.
    pub fn saturate(
        &mut self,
        cancellation_token: &CancellationToken,
    ) -> Result<SaturationStatistics, Cancelled> {
        if let Some(saturation) = &self.saturation {
            return Ok(saturation.statistics());
        }
        let start = Instant::now();
        let saturation = Saturation::compute(self, cancellation_token)?;
        let statistics = saturation.statistics();
        debug!(
            atoms = statistics.atoms,
            links = statistics.links,
            steps = statistics.steps,
            elapsed_ms = start.elapsed().as_millis(),
            "saturation finished"
        );
        self.saturation = Some(saturation);
        Ok(statistics)
    }

    /// All subsumers of `atom`, including itself and [`TOP`].
    ///
    /// Empty if the engine is not [saturated](Self::is_saturated).
    pub fn subsumers(&self, atom: AtomId) -> impl Iterator<Item = AtomId> + '_ {
        self.saturation
            .iter()
            .filter_map(move |saturation| saturation.subsumers(atom))
            .flatten()
            .copied()
    }

    pub fn is_subsumed_by(&self, sub: AtomId, sup: AtomId) -> bool {
        self.saturation
            .as_ref()
            .and_then(|saturation| saturation.subsumers(sub))
            .is_some_and(|subsumers| subsumers.contains(&sup))
    }

    fn lhs_atom(&mut self, expr: &Expr) -> AtomId {
        match expr {
            Expr::Top => TOP,
            Expr::Atom(atom) => *atom,
            Expr::And(conjuncts) => {
                if let Some(atom) = self.lhs_cache.get(expr) {
                    return *atom;
                }
                let mut atoms = conjuncts
                    .iter()
                    .map(|conjunct| self.lhs_atom(conjunct))
                    .filter(|atom| *atom != TOP)
                    .collect::<Vec<_>>();
                atoms.sort_unstable();
                atoms.dedup();
                let mut atoms = atoms.into_iter();
                let Some(mut current) = atoms.next() else {
                    return TOP;
                };
                for next in atoms {
                    let fresh = self.new_atom();
                    self.conjunctions[current.index()].push((next, fresh));
                    self.conjunctions[next.index()].push((current, fresh));
                    current = fresh;
                }
                self.lhs_cache.insert(expr.clone(), current);
                current
            }
            Expr::Exists(role, filler) => {
                if let Some(atom) = self.lhs_cache.get(expr) {
                    return *atom;
                }
                let filler = self.lhs_atom(filler);
                let fresh = self.new_atom();
                self.existential_triggers
                    .entry((*role, filler))
                    .or_default()
                    .push(fresh);
                self.lhs_cache.insert(expr.clone(), fresh);
                fresh
            }
        }
    }

    fn rhs_atom(&mut self, expr: &Expr) -> AtomId {
        match expr {
            Expr::Top => TOP,
            Expr::Atom(atom) => *atom,
            Expr::And(_) | Expr::Exists(..) => {
                if let Some(atom) = self.rhs_cache.get(expr) {
                    return *atom;
                }
                let fresh = self.new_atom();
                self.add_rhs(fresh, expr);
                self.rhs_cache.insert(expr.clone(), fresh);
                fresh
            }
        }
    }

    fn add_rhs(&mut self, sub: AtomId, sup: &Expr) {
        match sup {
            Expr::Top => (),
            Expr::Atom(atom) => {
                if *atom != sub && !self.told_subsumers[sub.index()].contains(atom) {
                    self.told_subsumers[sub.index()].push(*atom);
                }
            }
            Expr::And(conjuncts) => {
                for conjunct in conjuncts {
                    self.add_rhs(sub, conjunct);
                }
            }
            Expr::Exists(role, filler) => {
                let filler = self.rhs_atom(filler);
                self.existentials[sub.index()].push((*role, filler));
            }
        }
    }
}
