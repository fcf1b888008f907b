//! Native concept and role model the logical definitions are compiled into.
//!
//! Everything is stored in an [`Ontology`] arena keyed by [`ConceptId`] and refers to other entries by id,
//! so a role type used from many concepts is always the same entry.

use crate::compiler::{CompiledConcept, CompiledDefinition};
use oxel::Axiom;
use oxlogic::{ConceptId, ConcreteOperator, vocab};
use oxrdf::vocab::xsd;
use oxrdf::{Literal, NamedNodeRef};
use oxsdatatypes::{Decimal, Double, Float, Integer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Copy, Hash)]
pub enum DefinitionType {
    /// The concept is subsumed by the definition.
    SubConcept,
    /// The concept is equivalent to the definition.
    EquivalentConcept,
}

/// A conjunction of super concepts and relationships.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Definition {
    pub definition_type: DefinitionType,
    pub supers: BTreeSet<ConceptId>,
    pub roles: Vec<Role>,
    pub concrete_roles: Vec<ConcreteRole>,
    pub role_groups: Vec<RoleGroup>,
}

impl Definition {
    pub fn new(definition_type: DefinitionType) -> Self {
        Self {
            definition_type,
            supers: BTreeSet::new(),
            roles: Vec::new(),
            concrete_roles: Vec::new(),
            role_groups: Vec::new(),
        }
    }

    /// A [`DefinitionType::SubConcept`] definition with only super concepts.
    pub fn sub_concept_of(supers: impl IntoIterator<Item = ConceptId>) -> Self {
        Self {
            supers: supers.into_iter().collect(),
            ..Self::new(DefinitionType::SubConcept)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.supers.is_empty()
            && self.roles.is_empty()
            && self.concrete_roles.is_empty()
            && self.role_groups.is_empty()
    }

    /// All the ids this definition points to.
    pub fn references(&self) -> impl Iterator<Item = ConceptId> + '_ {
        self.supers
            .iter()
            .copied()
            .chain(self.roles.iter().flat_map(Role::references))
            .chain(self.concrete_roles.iter().map(|role| role.role_type))
            .chain(self.role_groups.iter().flat_map(|group| {
                group
                    .roles
                    .iter()
                    .flat_map(Role::references)
                    .chain(group.concrete_roles.iter().map(|role| role.role_type))
            }))
    }
}

/// An existential restriction `∃role_type.filler`.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Copy, Hash)]
pub struct Role {
    pub role_type: ConceptId,
    pub filler: ConceptId,
}

impl Role {
    #[inline]
    pub fn new(role_type: ConceptId, filler: ConceptId) -> Self {
        Self { role_type, filler }
    }

    fn references(&self) -> [ConceptId; 2] {
        [self.role_type, self.filler]
    }
}

/// A restriction on a concrete role: `∃role_type.value`.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub struct ConcreteRole {
    pub role_type: ConceptId,
    pub value: ConcreteValue,
}

#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub enum ConcreteValue {
    Value {
        operator: ConcreteOperator,
        literal: TypedValue,
    },
    Interval(Interval),
}

#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub struct Interval {
    pub lower: Option<IntervalBound>,
    pub upper: Option<IntervalBound>,
}

#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub struct IntervalBound {
    pub value: TypedValue,
    pub inclusive: bool,
}

/// The kinds of values concrete roles can hold.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Copy, Hash)]
pub enum ValueType {
    Decimal,
    Double,
    Float,
    Integer,
    String,
    Long,
}

impl ValueType {
    /// The XSD datatype values of this type are written with.
    pub fn datatype(self) -> NamedNodeRef<'static> {
        match self {
            Self::Decimal => xsd::DECIMAL,
            Self::Double => xsd::DOUBLE,
            Self::Float => xsd::FLOAT,
            Self::Integer => xsd::INTEGER,
            Self::String => xsd::STRING,
            Self::Long => xsd::LONG,
        }
    }

    pub fn from_datatype(datatype: NamedNodeRef<'_>) -> Option<Self> {
        Some(match datatype {
            xsd::DECIMAL => Self::Decimal,
            xsd::DOUBLE => Self::Double,
            xsd::FLOAT => Self::Float,
            xsd::INTEGER | xsd::INT => Self::Integer,
            xsd::STRING => Self::String,
            xsd::LONG => Self::Long,
            _ => return None,
        })
    }
}

/// A typed value in its canonical lexical form.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub struct TypedValue {
    value_type: ValueType,
    lexical: String,
}

/// A literal that can not be turned into a [`TypedValue`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum TypedValueError {
    #[error("Unsupported datatype {0}")]
    UnsupportedDatatype(String),
    #[error("Invalid lexical form {lexical:?} for {value_type:?}: {message}")]
    InvalidLexicalForm {
        value_type: ValueType,
        lexical: String,
        message: String,
    },
}

impl TypedValue {
    /// Parses and canonicalizes a lexical form.
    pub fn parse(value_type: ValueType, lexical: &str) -> Result<Self, TypedValueError> {
        let invalid = |message: String| TypedValueError::InvalidLexicalForm {
            value_type,
            lexical: lexical.into(),
            message,
        };
        let lexical = match value_type {
            ValueType::Decimal => Decimal::from_str(lexical)
                .map_err(|e| invalid(e.to_string()))?
                .to_string(),
            ValueType::Double => Double::from_str(lexical)
                .map_err(|e| invalid(e.to_string()))?
                .to_string(),
            ValueType::Float => Float::from_str(lexical)
                .map_err(|e| invalid(e.to_string()))?
                .to_string(),
            ValueType::Integer => Integer::from_str(lexical)
                .map_err(|e| invalid(e.to_string()))?
                .to_string(),
            ValueType::Long => i64::from_str(lexical)
                .map_err(|e| invalid(e.to_string()))?
                .to_string(),
            ValueType::String => lexical.to_owned(),
        };
        Ok(Self {
            value_type,
            lexical,
        })
    }

    pub fn from_literal(literal: &Literal) -> Result<Self, TypedValueError> {
        let value_type = ValueType::from_datatype(literal.datatype())
            .ok_or_else(|| TypedValueError::UnsupportedDatatype(literal.datatype().to_string()))?;
        Self::parse(value_type, literal.value())
    }

    #[inline]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    #[inline]
    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    pub fn to_literal(&self) -> Literal {
        Literal::new_typed_literal(self.lexical.as_str(), self.value_type.datatype())
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_literal().fmt(f)
    }
}

/// Roles and concrete roles that must hold through one common filler.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash, Default)]
pub struct RoleGroup {
    pub roles: BTreeSet<Role>,
    pub concrete_roles: BTreeSet<ConcreteRole>,
}

impl RoleGroup {
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.concrete_roles.is_empty()
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Concept {
    id: ConceptId,
    pub definitions: Vec<Definition>,
    /// Definitions `D` stating `D ⊑ concept`
    pub gci_definitions: Vec<Definition>,
}

impl Concept {
    pub fn new(id: ConceptId) -> Self {
        Self {
            id,
            definitions: Vec::new(),
            gci_definitions: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> ConceptId {
        self.id
    }

    fn references(&self) -> impl Iterator<Item = ConceptId> + '_ {
        self.definitions
            .iter()
            .chain(&self.gci_definitions)
            .flat_map(Definition::references)
    }
}

/// `id ∘ successor ⊑ implies`
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct RoleChain {
    pub successor: ConceptId,
    pub implies: ConceptId,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoleType {
    id: ConceptId,
    pub transitive: bool,
    pub reflexive: bool,
    pub chain: Option<RoleChain>,
    pub supers: BTreeSet<ConceptId>,
}

impl RoleType {
    pub fn new(id: ConceptId) -> Self {
        Self {
            id,
            transitive: false,
            reflexive: false,
            chain: None,
            supers: BTreeSet::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> ConceptId {
        self.id
    }

    fn references(&self) -> impl Iterator<Item = ConceptId> + '_ {
        self.supers.iter().copied().chain(
            self.chain
                .iter()
                .flat_map(|chain| [chain.successor, chain.implies]),
        )
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ConcreteRoleType {
    id: ConceptId,
    pub supers: BTreeSet<ConceptId>,
    /// Values are intervals rather than single literals
    pub interval: bool,
}

impl ConcreteRoleType {
    pub fn new(id: ConceptId) -> Self {
        Self {
            id,
            supers: BTreeSet::new(),
            interval: false,
        }
    }

    #[inline]
    pub fn id(&self) -> ConceptId {
        self.id
    }
}

/// Arena of concepts, role types and concrete role types keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Ontology {
    concepts: BTreeMap<ConceptId, Concept>,
    role_types: BTreeMap<ConceptId, RoleType>,
    concrete_role_types: BTreeMap<ConceptId, ConcreteRoleType>,
    /// Ids that got a stated definition
    stated: BTreeSet<ConceptId>,
}

impl Ontology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn concept(&self, id: ConceptId) -> Option<&Concept> {
        self.concepts.get(&id)
    }

    pub fn role_type(&self, id: ConceptId) -> Option<&RoleType> {
        self.role_types.get(&id)
    }

    pub fn concrete_role_type(&self, id: ConceptId) -> Option<&ConcreteRoleType> {
        self.concrete_role_types.get(&id)
    }

    /// Returns the concept with the given id, creating it if needed.
    pub fn concept_mut(&mut self, id: ConceptId) -> &mut Concept {
        self.concepts.entry(id).or_insert_with(|| Concept::new(id))
    }

    pub fn role_type_mut(&mut self, id: ConceptId) -> &mut RoleType {
        self.role_types
            .entry(id)
            .or_insert_with(|| RoleType::new(id))
    }

    pub fn concrete_role_type_mut(&mut self, id: ConceptId) -> &mut ConcreteRoleType {
        self.concrete_role_types
            .entry(id)
            .or_insert_with(|| ConcreteRoleType::new(id))
    }

    pub fn concepts(&self) -> impl Iterator<Item = &Concept> {
        self.concepts.values()
    }

    pub fn role_types(&self) -> impl Iterator<Item = &RoleType> {
        self.role_types.values()
    }

    pub fn concrete_role_types(&self) -> impl Iterator<Item = &ConcreteRoleType> {
        self.concrete_role_types.values()
    }

    /// Sorted ids of all concepts, including the ones synthesized for role types.
    pub fn concept_ids(&self) -> BTreeSet<ConceptId> {
        self.concepts.keys().copied().collect()
    }

    #[inline]
    pub fn concept_count(&self) -> usize {
        self.concepts.len()
    }

    /// Merges a compiled definition into the arena.
    ///
    /// The stated content of the defined entry is replaced wholesale, whatever its previous kind,
    /// and every referenced entry is created if missing.
    pub fn absorb(&mut self, compiled: CompiledDefinition) {
        let id = compiled.id();
        if self.stated.contains(&id) {
            self.remove(id);
        }
        match compiled {
            CompiledDefinition::Concept(CompiledConcept {
                id,
                definitions,
                gci_definitions,
            }) => {
                let concept = self.concept_mut(id);
                concept.definitions = definitions;
                concept.gci_definitions = gci_definitions;
                self.stated.insert(id);
            }
            CompiledDefinition::RoleType(role_type) => {
                self.stated.insert(role_type.id);
                self.role_types.insert(role_type.id, role_type);
            }
            CompiledDefinition::ConcreteRoleType(concrete_role_type) => {
                self.stated.insert(concrete_role_type.id);
                self.concrete_role_types
                    .insert(concrete_role_type.id, concrete_role_type);
            }
        }
        self.create_references(id);
    }

    /// Removes every entry with the given id. Returns false if there was none.
    pub fn remove(&mut self, id: ConceptId) -> bool {
        let concept = self.concepts.remove(&id).is_some();
        let role_type = self.role_types.remove(&id).is_some();
        let concrete_role_type = self.concrete_role_types.remove(&id).is_some();
        self.stated.remove(&id);
        concept || role_type || concrete_role_type
    }

    /// Drops the entries that are neither stated nor referenced from a stated entry
    /// and recreates the referenced entries that have been removed.
    ///
    /// Synthesized role concepts are kept as long as their role type is.
    pub fn prune(&mut self) {
        let mut reachable = self.stated.clone();
        for id in &self.stated {
            if let Some(concept) = self.concepts.get(id) {
                reachable.extend(concept.references());
            }
            if let Some(role_type) = self.role_types.get(id) {
                reachable.extend(role_type.references());
            }
            if let Some(concrete_role_type) = self.concrete_role_types.get(id) {
                reachable.extend(concrete_role_type.supers.iter().copied());
            }
        }
        // super role types of referenced role types
        let mut queue = reachable.iter().copied().collect::<Vec<_>>();
        while let Some(id) = queue.pop() {
            let supers = self
                .role_types
                .get(&id)
                .map(|role_type| role_type.references().collect::<Vec<_>>())
                .into_iter()
                .flatten()
                .chain(
                    self.concrete_role_types
                        .get(&id)
                        .into_iter()
                        .flat_map(|role_type| role_type.supers.iter().copied()),
                );
            for sup in supers.collect::<Vec<_>>() {
                if reachable.insert(sup) {
                    queue.push(sup);
                }
            }
        }
        self.concepts.retain(|id, _| reachable.contains(id));
        self.role_types.retain(|id, _| reachable.contains(id));
        self.concrete_role_types.retain(|id, _| reachable.contains(id));
        for id in self.stated.clone() {
            self.create_references(id);
        }
    }

    fn create_references(&mut self, id: ConceptId) {
        let mut concepts = BTreeSet::new();
        let mut role_types = BTreeSet::new();
        let mut concrete_role_types = BTreeSet::new();
        if let Some(concept) = self.concepts.get(&id) {
            for definition in concept.definitions.iter().chain(&concept.gci_definitions) {
                concepts.extend(definition.supers.iter().copied());
                let roles = definition
                    .roles
                    .iter()
                    .chain(definition.role_groups.iter().flat_map(|group| &group.roles));
                for role in roles {
                    role_types.insert(role.role_type);
                    concepts.insert(role.filler);
                }
                let concrete_roles = definition.concrete_roles.iter().chain(
                    definition
                        .role_groups
                        .iter()
                        .flat_map(|group| &group.concrete_roles),
                );
                for concrete_role in concrete_roles {
                    concrete_role_types.insert(concrete_role.role_type);
                }
            }
        }
        if let Some(role_type) = self.role_types.get(&id) {
            role_types.extend(role_type.references());
        }
        if let Some(concrete_role_type) = self.concrete_role_types.get(&id) {
            concrete_role_types.extend(concrete_role_type.supers.iter().copied());
        }
        role_types.remove(&vocab::ROLE_GROUP);
        for id in concepts {
            self.concept_mut(id);
        }
        for id in role_types {
            self.role_type_mut(id);
        }
        for id in concrete_role_types {
            self.concrete_role_type_mut(id);
        }
    }
}

/// The aggregate of one extraction run.
#[derive(Debug, Default)]
pub struct AxiomData {
    /// Formal axioms emitted for each defined id
    pub by_definition: BTreeMap<ConceptId, Vec<Axiom>>,
    /// Sorted ids of the concepts included in the run
    pub concept_ids: BTreeSet<ConceptId>,
    processed: AtomicUsize,
}

impl AxiomData {
    pub fn axioms(&self) -> impl Iterator<Item = &Axiom> {
        self.by_definition.values().flatten()
    }

    pub fn axiom_count(&self) -> usize {
        self.by_definition.values().map(Vec::len).sum()
    }

    /// Counts one more processed item and returns the new count.
    #[inline]
    pub fn increment_processed(&self) -> usize {
        self.processed.fetch_add(1, Ordering::Relaxed) + 1
    }

    #[inline]
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_lexical_forms() {
        assert_eq!(
            TypedValue::parse(ValueType::Integer, "007").unwrap().lexical(),
            "7"
        );
        assert_eq!(
            TypedValue::parse(ValueType::Decimal, "1.50").unwrap().lexical(),
            "1.5"
        );
        assert_eq!(
            TypedValue::parse(ValueType::Long, "+42").unwrap().lexical(),
            "42"
        );
        assert!(TypedValue::parse(ValueType::Integer, "seven").is_err());
        assert_eq!(
            TypedValue::from_literal(&Literal::new_typed_literal("5", xsd::INT))
                .unwrap()
                .value_type(),
            ValueType::Integer
        );
        assert!(matches!(
            TypedValue::from_literal(&Literal::new_typed_literal("5", xsd::SHORT)),
            Err(TypedValueError::UnsupportedDatatype(_))
        ));
    }

    #[test]
    fn absorb_creates_references() {
        let mut ontology = Ontology::new();
        let mut definition = Definition::sub_concept_of([ConceptId::new(2)]);
        definition
            .roles
            .push(Role::new(ConceptId::new(10), ConceptId::new(3)));
        ontology.absorb(CompiledDefinition::Concept(CompiledConcept {
            id: ConceptId::new(1),
            definitions: vec![definition],
            gci_definitions: Vec::new(),
        }));
        assert_eq!(
            ontology.concept_ids(),
            BTreeSet::from([1, 2, 3].map(ConceptId::new))
        );
        assert!(ontology.role_type(ConceptId::new(10)).is_some());
        assert!(ontology.concept(ConceptId::new(10)).is_none());
    }

    #[test]
    fn absorb_replaces_a_stated_role_type() {
        let mut ontology = Ontology::new();
        let mut role_type = RoleType::new(ConceptId::new(10));
        role_type.supers.insert(ConceptId::new(11));
        ontology.absorb(CompiledDefinition::RoleType(role_type));
        ontology.absorb(CompiledDefinition::Concept(CompiledConcept {
            id: ConceptId::new(10),
            definitions: vec![Definition::sub_concept_of([ConceptId::new(12)])],
            gci_definitions: Vec::new(),
        }));
        assert!(ontology.role_type(ConceptId::new(10)).is_none());
        assert!(
            ontology
                .concept(ConceptId::new(10))
                .is_some_and(|concept| concept.definitions.len() == 1)
        );
    }

    #[test]
    fn prune_drops_unreferenced_entries() {
        let mut ontology = Ontology::new();
        ontology.absorb(CompiledDefinition::Concept(CompiledConcept {
            id: ConceptId::new(1),
            definitions: vec![Definition::sub_concept_of([ConceptId::new(2)])],
            gci_definitions: Vec::new(),
        }));
        ontology.absorb(CompiledDefinition::Concept(CompiledConcept {
            id: ConceptId::new(3),
            definitions: vec![Definition::sub_concept_of([ConceptId::new(2)])],
            gci_definitions: Vec::new(),
        }));
        ontology.remove(ConceptId::new(1));
        ontology.prune();
        assert_eq!(
            ontology.concept_ids(),
            BTreeSet::from([2, 3].map(ConceptId::new))
        );
        ontology.remove(ConceptId::new(3));
        ontology.prune();
        assert!(ontology.concept_ids().is_empty());
    }

    #[test]
    fn prune_recreates_removed_references() {
        let mut ontology = Ontology::new();
        for (id, sup) in [(1, 2), (2, 3)] {
            ontology.absorb(CompiledDefinition::Concept(CompiledConcept {
                id: ConceptId::new(id),
                definitions: vec![Definition::sub_concept_of([ConceptId::new(sup)])],
                gci_definitions: Vec::new(),
            }));
        }
        ontology.remove(ConceptId::new(2));
        ontology.prune();
        assert!(
            ontology
                .concept(ConceptId::new(2))
                .is_some_and(|concept| concept.definitions.is_empty())
        );
        assert!(ontology.concept(ConceptId::new(3)).is_none());
    }
}
