//! Necessary normal forms of classified concepts.

use crate::inverse::InverseCompiler;
use crate::model::{ConcreteRole, Definition, DefinitionType, Ontology, Role, RoleGroup};
use oxel::Taxonomy;
use oxlogic::{ConceptId, LogicalDefinition};
use std::collections::BTreeSet;

/// Computes the necessary normal form of classified concepts.
///
/// The normal form of a concept is a sub concept definition made of its direct parents and of the relationships
/// stated on the concept itself or on any of its ancestors, minus the ones implied by another relationship of the set.
/// General concept inclusions do not contribute.
pub struct NormalFormExtractor<'a> {
    ontology: &'a Ontology,
    taxonomy: &'a Taxonomy<ConceptId>,
}

impl<'a> NormalFormExtractor<'a> {
    pub fn new(ontology: &'a Ontology, taxonomy: &'a Taxonomy<ConceptId>) -> Self {
        Self { ontology, taxonomy }
    }

    /// The necessary normal form of `concept`.
    ///
    /// Returns `None` for unclassified concepts, for role type concepts and when the normal form would be empty.
    pub fn necessary_normal_form(&self, concept: ConceptId) -> Option<Definition> {
        if self.ontology.role_type(concept).is_some()
            || self.ontology.concrete_role_type(concept).is_some()
        {
            return None;
        }
        let node = self.taxonomy.node(&concept)?;
        let mut roles = BTreeSet::new();
        let mut concrete_roles = BTreeSet::new();
        let mut role_groups = BTreeSet::new();
        for id in [concept].iter().chain(node.ancestors()) {
            let Some(stated) = self.ontology.concept(*id) else {
                continue;
            };
            for definition in &stated.definitions {
                roles.extend(definition.roles.iter().copied());
                concrete_roles.extend(definition.concrete_roles.iter().cloned());
                role_groups.extend(definition.role_groups.iter().cloned());
            }
        }

        let definition = Definition {
            definition_type: DefinitionType::SubConcept,
            supers: node.parents().clone(),
            roles: prune(&roles, |a, b| self.role_implies(a, b)),
            concrete_roles: prune(&concrete_roles, |a, b| self.concrete_role_implies(a, b)),
            role_groups: prune(&role_groups, |a, b| self.group_implies(a, b)),
        };
        (!definition.is_empty()).then_some(definition)
    }

    /// The necessary normal form of `concept` as a logical definition.
    pub fn logical_definition(&self, concept: ConceptId) -> Option<LogicalDefinition> {
        Some(InverseCompiler::definition(
            concept,
            &self.necessary_normal_form(concept)?,
        ))
    }

    /// `first` holds through a sub role type and a subsumed filler of `second`
    fn role_implies(&self, first: &Role, second: &Role) -> bool {
        self.is_subsumed_by(first.role_type, second.role_type)
            && self.is_subsumed_by(first.filler, second.filler)
    }

    fn concrete_role_implies(&self, first: &ConcreteRole, second: &ConcreteRole) -> bool {
        first.value == second.value && self.is_subsumed_by(first.role_type, second.role_type)
    }

    /// Every member of `second` is implied by a member of `first`
    fn group_implies(&self, first: &RoleGroup, second: &RoleGroup) -> bool {
        second.roles.iter().all(|role| {
            first
                .roles
                .iter()
                .any(|other| self.role_implies(other, role))
        }) && second.concrete_roles.iter().all(|concrete_role| {
            first
                .concrete_roles
                .iter()
                .any(|other| self.concrete_role_implies(other, concrete_role))
        })
    }

    fn is_subsumed_by(&self, sub: ConceptId, sup: ConceptId) -> bool {
        self.taxonomy.is_subsumed_by(&sub, &sup)
    }
}

/// Keeps the elements no other element implies.
///
/// Among elements implying each other, the smallest one is kept.
fn prune<T: Ord + Clone>(elements: &BTreeSet<T>, implies: impl Fn(&T, &T) -> bool) -> Vec<T> {
    elements
        .iter()
        .filter(|element| {
            !elements.iter().any(|other| {
                other != *element
                    && implies(other, element)
                    && (!implies(element, other) || other < *element)
            })
        })
        .cloned()
        .collect()
}
