use crate::model::{ConcreteValue, Definition, Ontology};
use oxlogic::{ConceptId, vocab};
use tracing::{error, warn};

/// Folds the role type hierarchies into the concept hierarchy.
///
/// Each role type and concrete role type, except the two hierarchy roots, gets a concept with the same id
/// carrying a single sub concept definition made of its super types.
pub struct RoleHierarchyLinker;

impl RoleHierarchyLinker {
    /// Links every role type of the ontology.
    ///
    /// Returns the number of linked role types.
    pub fn link(ontology: &mut Ontology) -> usize {
        let ids = Self::linkable_ids(ontology);
        for id in &ids {
            if let Some(concept) = ontology.concept(*id) {
                if !concept.definitions.is_empty() || !concept.gci_definitions.is_empty() {
                    error!(
                        concept = %id,
                        "the concept of a role type already has definitions, they are replaced"
                    );
                }
            }
            Self::link_one(ontology, *id);
        }
        Self::check_interval_usage(ontology);
        ids.len()
    }

    /// Replaces the synthesized concept of a single role type.
    ///
    /// Does nothing if `id` is not a linkable role type.
    pub fn link_one(ontology: &mut Ontology, id: ConceptId) {
        if id == vocab::OBJECT_ROLE_ROOT || id == vocab::DATA_ROLE_ROOT {
            return;
        }
        let supers = match (ontology.role_type(id), ontology.concrete_role_type(id)) {
            (None, None) => return,
            (role_type, concrete_role_type) => role_type
                .into_iter()
                .flat_map(|role_type| role_type.supers.iter().copied())
                .chain(
                    concrete_role_type
                        .into_iter()
                        .flat_map(|concrete_role_type| concrete_role_type.supers.iter().copied()),
                )
                .collect::<Vec<_>>(),
        };
        for sup in &supers {
            ontology.concept_mut(*sup);
        }
        let concept = ontology.concept_mut(id);
        concept.gci_definitions.clear();
        concept.definitions = vec![Definition::sub_concept_of(supers)];
    }

    /// Ids of the role types that get a concept.
    pub fn linkable_ids(ontology: &Ontology) -> Vec<ConceptId> {
        let mut ids = ontology
            .role_types()
            .map(|role_type| role_type.id())
            .chain(ontology.concrete_role_types().map(|role_type| role_type.id()))
            .filter(|id| *id != vocab::OBJECT_ROLE_ROOT && *id != vocab::DATA_ROLE_ROOT)
            .collect::<Vec<_>>();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    fn check_interval_usage(ontology: &Ontology) {
        for concept in ontology.concepts() {
            let concrete_roles = concept
                .definitions
                .iter()
                .chain(&concept.gci_definitions)
                .flat_map(|definition| {
                    definition.concrete_roles.iter().chain(
                        definition
                            .role_groups
                            .iter()
                            .flat_map(|group| &group.concrete_roles),
                    )
                });
            for concrete_role in concrete_roles {
                let is_interval = matches!(concrete_role.value, ConcreteValue::Interval(_));
                let declared_interval = ontology
                    .concrete_role_type(concrete_role.role_type)
                    .is_some_and(|role_type| role_type.interval);
                if is_interval && !declared_interval {
                    warn!(
                        concept = %concept.id(),
                        role_type = %concrete_role.role_type,
                        "interval value on a concrete role type not declared interval-valued"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{AxiomCompiler, CompiledDefinition};
    use crate::model::{DefinitionType, RoleType};
    use oxlogic::{LogicNode, LogicalDefinition};

    fn id(id: u64) -> ConceptId {
        ConceptId::new(id)
    }

    fn absorb(ontology: &mut Ontology, definition: LogicalDefinition) {
        ontology.absorb(AxiomCompiler::compile(&definition).unwrap());
    }

    #[test]
    fn role_types_become_concepts() {
        let mut ontology = Ontology::new();
        absorb(
            &mut ontology,
            LogicalDefinition::property(
                id(10),
                LogicNode::and([LogicNode::concept(id(11))]),
            ),
        );
        absorb(
            &mut ontology,
            LogicalDefinition::property(
                id(11),
                LogicNode::and([LogicNode::concept(vocab::OBJECT_ROLE_ROOT)]),
            ),
        );
        assert_eq!(RoleHierarchyLinker::link(&mut ontology), 2);
        let concept = ontology.concept(id(10)).unwrap();
        assert_eq!(concept.definitions.len(), 1);
        assert_eq!(
            concept.definitions[0].definition_type,
            DefinitionType::SubConcept
        );
        assert!(concept.definitions[0].supers.contains(&id(11)));
        assert!(ontology.concept(vocab::OBJECT_ROLE_ROOT).is_some());
        assert!(
            ontology
                .concept(vocab::OBJECT_ROLE_ROOT)
                .unwrap()
                .definitions
                .is_empty()
        );
    }

    #[test]
    fn double_linking_replaces_definitions() {
        let mut ontology = Ontology::new();
        absorb(
            &mut ontology,
            LogicalDefinition::property(id(10), LogicNode::and([LogicNode::concept(id(11))])),
        );
        RoleHierarchyLinker::link(&mut ontology);
        RoleHierarchyLinker::link(&mut ontology);
        assert_eq!(ontology.concept(id(10)).unwrap().definitions.len(), 1);
    }

    #[test]
    fn concept_definition_of_a_role_type_is_replaced() {
        let mut ontology = Ontology::new();
        absorb(
            &mut ontology,
            LogicalDefinition::necessary(id(10), LogicNode::concept(id(99))),
        );
        ontology.absorb(CompiledDefinition::RoleType(RoleType::new(id(10))));
        RoleHierarchyLinker::link(&mut ontology);
        assert!(ontology.concept(id(10)).unwrap().definitions[0].supers.is_empty());
    }
}
