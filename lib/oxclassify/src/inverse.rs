//! Conversion of the native model back into [`LogicalDefinition`] trees.
//!
//! This mirrors the [`AxiomCompiler`](crate::AxiomCompiler): compiling the produced trees gives back the same model.

use crate::model::{
    ConcreteRole, ConcreteRoleType, ConcreteValue, Definition, DefinitionType, IntervalBound,
    Role, RoleGroup, RoleType,
};
use oxlogic::{Bound, ConceptId, LogicNode, LogicalDefinition, vocab};

pub struct InverseCompiler;

impl InverseCompiler {
    /// `DefinitionRoot(NecessarySet(And(..)))` or `DefinitionRoot(SufficientSet(And(..)))`
    pub fn definition(concept: ConceptId, definition: &Definition) -> LogicalDefinition {
        let set = match definition.definition_type {
            DefinitionType::SubConcept => LogicNode::necessary_set,
            DefinitionType::EquivalentConcept => LogicNode::sufficient_set,
        };
        LogicalDefinition::new(
            concept,
            LogicNode::definition_root([set(Self::conjunction(definition))]),
        )
    }

    /// All the definitions of a concept in a single tree.
    pub fn concept(
        concept: ConceptId,
        definitions: &[Definition],
        gci_definitions: &[Definition],
    ) -> LogicalDefinition {
        let sets = definitions
            .iter()
            .map(|definition| match definition.definition_type {
                DefinitionType::SubConcept => {
                    LogicNode::necessary_set(Self::conjunction(definition))
                }
                DefinitionType::EquivalentConcept => {
                    LogicNode::sufficient_set(Self::conjunction(definition))
                }
            })
            .chain(
                gci_definitions
                    .iter()
                    .map(|definition| LogicNode::inclusion_set(Self::conjunction(definition))),
            );
        LogicalDefinition::new(concept, LogicNode::definition_root(sets))
    }

    /// `DefinitionRoot(PropertySet(And(supers, markers, chain)))`
    pub fn role_type(role_type: &RoleType) -> LogicalDefinition {
        let mut elements = role_type
            .supers
            .iter()
            .map(|sup| LogicNode::concept(*sup))
            .collect::<Vec<_>>();
        if role_type.transitive {
            elements.push(LogicNode::concept(vocab::TRANSITIVE_PROPERTY));
        }
        if role_type.reflexive {
            elements.push(LogicNode::concept(vocab::REFLEXIVE_PROPERTY));
        }
        if let Some(chain) = &role_type.chain {
            elements.push(LogicNode::property_sequence_implication(
                [role_type.id(), chain.successor],
                chain.implies,
            ));
        }
        LogicalDefinition::property(role_type.id(), LogicNode::and(elements))
    }

    /// `DefinitionRoot(DataPropertySet(And(supers)))`, or an interval property set for interval-valued types
    pub fn concrete_role_type(concrete_role_type: &ConcreteRoleType) -> LogicalDefinition {
        let supers = LogicNode::and(
            concrete_role_type
                .supers
                .iter()
                .map(|sup| LogicNode::concept(*sup)),
        );
        let set = if concrete_role_type.interval {
            LogicNode::interval_property_set(supers)
        } else {
            LogicNode::data_property_set(supers)
        };
        LogicalDefinition::new(
            concrete_role_type.id(),
            LogicNode::definition_root([set]),
        )
    }

    fn conjunction(definition: &Definition) -> LogicNode {
        LogicNode::and(
            definition
                .supers
                .iter()
                .map(|sup| LogicNode::concept(*sup))
                .chain(definition.roles.iter().map(Self::role))
                .chain(definition.concrete_roles.iter().map(Self::concrete_role))
                .chain(definition.role_groups.iter().map(Self::role_group)),
        )
    }

    fn role(role: &Role) -> LogicNode {
        LogicNode::role(role.role_type, LogicNode::concept(role.filler))
    }

    fn role_group(group: &RoleGroup) -> LogicNode {
        LogicNode::role_group(LogicNode::and(
            group
                .roles
                .iter()
                .map(Self::role)
                .chain(group.concrete_roles.iter().map(Self::concrete_role)),
        ))
    }

    fn concrete_role(concrete_role: &ConcreteRole) -> LogicNode {
        match &concrete_role.value {
            ConcreteValue::Value { operator, literal } => {
                LogicNode::feature(concrete_role.role_type, *operator, literal.to_literal())
            }
            ConcreteValue::Interval(interval) => LogicNode::interval_role(
                concrete_role.role_type,
                interval.lower.as_ref().map(Self::bound),
                interval.upper.as_ref().map(Self::bound),
            ),
        }
    }

    fn bound(bound: &IntervalBound) -> Bound {
        Bound {
            value: bound.value.to_literal(),
            inclusive: bound.inclusive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{AxiomCompiler, CompiledDefinition};
    use crate::model::{RoleChain, TypedValue, ValueType};
    use oxlogic::ConcreteOperator;

    fn id(id: u64) -> ConceptId {
        ConceptId::new(id)
    }

    #[test]
    fn role_type_flags_round_trip() {
        let mut role_type = RoleType::new(id(10));
        role_type.transitive = true;
        role_type.reflexive = true;
        role_type.supers.insert(vocab::OBJECT_ROLE_ROOT);
        role_type.chain = Some(RoleChain {
            successor: id(11),
            implies: id(10),
        });
        let definition = InverseCompiler::role_type(&role_type);
        assert_eq!(
            AxiomCompiler::compile(&definition).unwrap(),
            CompiledDefinition::RoleType(role_type)
        );
    }

    #[test]
    fn definition_round_trip() {
        let mut definition = Definition::sub_concept_of([id(2), id(3)]);
        definition.roles.push(Role::new(id(10), id(4)));
        definition.concrete_roles.push(ConcreteRole {
            role_type: id(20),
            value: ConcreteValue::Value {
                operator: ConcreteOperator::GreaterThanOrEqual,
                literal: TypedValue::parse(ValueType::Decimal, "2.5").unwrap(),
            },
        });
        definition.role_groups.push(RoleGroup {
            roles: [Role::new(id(11), id(5))].into(),
            concrete_roles: [ConcreteRole {
                role_type: id(21),
                value: ConcreteValue::Interval(crate::model::Interval {
                    lower: Some(IntervalBound {
                        value: TypedValue::parse(ValueType::Long, "1").unwrap(),
                        inclusive: true,
                    }),
                    upper: None,
                }),
            }]
            .into(),
        });
        let logical = InverseCompiler::definition(id(1), &definition);
        let CompiledDefinition::Concept(concept) = AxiomCompiler::compile(&logical).unwrap() else {
            panic!("expected a concept");
        };
        assert_eq!(concept.definitions, [definition]);
    }

    #[test]
    fn concept_round_trip() {
        let necessary = Definition::sub_concept_of([id(2)]);
        let mut sufficient = Definition::new(DefinitionType::EquivalentConcept);
        sufficient.supers.insert(id(3));
        sufficient.roles.push(Role::new(id(10), id(4)));
        let gci = Definition::sub_concept_of([id(5), id(6)]);
        let logical = InverseCompiler::concept(
            id(1),
            &[necessary.clone(), sufficient.clone()],
            std::slice::from_ref(&gci),
        );
        assert_eq!(
            AxiomCompiler::compile(&logical).unwrap(),
            CompiledDefinition::Concept(crate::compiler::CompiledConcept {
                id: id(1),
                definitions: vec![necessary, sufficient],
                gci_definitions: vec![gci],
            })
        );
    }

    #[test]
    fn concrete_role_type_round_trip() {
        let mut concrete_role_type = ConcreteRoleType::new(id(20));
        concrete_role_type.interval = true;
        concrete_role_type.supers.insert(vocab::DATA_ROLE_ROOT);
        assert_eq!(
            AxiomCompiler::compile(&InverseCompiler::concrete_role_type(&concrete_role_type))
                .unwrap(),
            CompiledDefinition::ConcreteRoleType(concrete_role_type)
        );
    }
}
