//! Compilation of [`LogicalDefinition`] trees into the native [`model`](crate::model).

use crate::error::CompileError;
use crate::model::{
    ConcreteRole, ConcreteRoleType, ConcreteValue, Definition, DefinitionType, Interval,
    IntervalBound, Role, RoleChain, RoleGroup, RoleType, TypedValue, TypedValueError,
};
use oxlogic::{Bound, ConceptId, LogicNode, LogicalDefinition, NodeKind, RoleOperator, vocab};
use oxrdf::Literal;

/// The result of compiling one [`LogicalDefinition`].
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum CompiledDefinition {
    /// From sufficient, necessary and inclusion sets
    Concept(CompiledConcept),
    /// From property sets
    RoleType(RoleType),
    /// From data property and interval property sets
    ConcreteRoleType(ConcreteRoleType),
}

impl CompiledDefinition {
    /// The id of the defined entry.
    pub fn id(&self) -> ConceptId {
        match self {
            Self::Concept(concept) => concept.id,
            Self::RoleType(role_type) => role_type.id(),
            Self::ConcreteRoleType(concrete_role_type) => concrete_role_type.id(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CompiledConcept {
    pub id: ConceptId,
    pub definitions: Vec<Definition>,
    pub gci_definitions: Vec<Definition>,
}

/// Compiles logical definitions into the native model.
///
/// Compilation only reads its input and can run concurrently on many definitions.
///
/// ```
/// use oxclassify::{AxiomCompiler, CompiledDefinition};
/// use oxlogic::{ConceptId, LogicNode, LogicalDefinition};
///
/// let definition = LogicalDefinition::necessary(
///     ConceptId::new(1),
///     LogicNode::and([LogicNode::concept(ConceptId::new(2))]),
/// );
/// let CompiledDefinition::Concept(concept) = AxiomCompiler::compile(&definition)? else {
///     unreachable!()
/// };
/// assert!(concept.definitions[0].supers.contains(&ConceptId::new(2)));
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub struct AxiomCompiler;

impl AxiomCompiler {
    pub fn compile(definition: &LogicalDefinition) -> Result<CompiledDefinition, CompileError> {
        DefinitionCompiler {
            concept: definition.concept(),
        }
        .compile_root(definition.root())
    }
}

/// Compilation state of one definition, used to build errors.
struct DefinitionCompiler {
    concept: ConceptId,
}

#[derive(Eq, PartialEq, Clone, Copy)]
enum SetFamily {
    Concept,
    Property,
    DataProperty,
}

impl DefinitionCompiler {
    fn compile_root(&self, root: &LogicNode) -> Result<CompiledDefinition, CompileError> {
        if !matches!(root.kind(), NodeKind::DefinitionRoot) {
            return Err(self.structure("the root must be a DefinitionRoot", root));
        }
        let mut family: Option<SetFamily> = None;
        for set in root.children() {
            let set_family = match set.kind() {
                NodeKind::SufficientSet | NodeKind::NecessarySet | NodeKind::InclusionSet => {
                    SetFamily::Concept
                }
                NodeKind::PropertySet => SetFamily::Property,
                NodeKind::DataPropertySet | NodeKind::IntervalPropertySet => {
                    SetFamily::DataProperty
                }
                _ => return Err(self.structure("expected a definition set", set)),
            };
            if family.is_some_and(|family| family != set_family) {
                return Err(self.structure(
                    "concept sets, property sets and data property sets can not be mixed",
                    root,
                ));
            }
            family = Some(set_family);
        }
        match family {
            None => Err(self.structure("the root has no definition set", root)),
            Some(SetFamily::Concept) => self.compile_concept(root).map(CompiledDefinition::Concept),
            Some(SetFamily::Property) => {
                self.compile_role_type(root).map(CompiledDefinition::RoleType)
            }
            Some(SetFamily::DataProperty) => self
                .compile_concrete_role_type(root)
                .map(CompiledDefinition::ConcreteRoleType),
        }
    }

    fn compile_concept(&self, root: &LogicNode) -> Result<CompiledConcept, CompileError> {
        let mut concept = CompiledConcept {
            id: self.concept,
            definitions: Vec::new(),
            gci_definitions: Vec::new(),
        };
        for set in root.children() {
            let (definition_type, is_gci) = match set.kind() {
                NodeKind::SufficientSet => (DefinitionType::EquivalentConcept, false),
                NodeKind::NecessarySet => (DefinitionType::SubConcept, false),
                _ => (DefinitionType::SubConcept, true),
            };
            let definition = self.compile_definition(set, definition_type)?;
            if is_gci {
                concept.gci_definitions.push(definition);
            } else {
                concept.definitions.push(definition);
            }
        }
        Ok(concept)
    }

    fn compile_definition(
        &self,
        set: &LogicNode,
        definition_type: DefinitionType,
    ) -> Result<Definition, CompileError> {
        let child = self.single_child(set)?;
        let mut definition = Definition::new(definition_type);
        match child.kind() {
            NodeKind::ConceptReference(id) => {
                definition.supers.insert(*id);
            }
            NodeKind::And => {
                if child.children().is_empty() {
                    return Err(self.structure("empty conjunction", set));
                }
                for element in child.children() {
                    self.compile_element(element, &mut definition)?;
                }
            }
            NodeKind::Or => return Err(self.unsupported("disjunction", child)),
            NodeKind::Feature { .. } | NodeKind::IntervalRole { .. } => {
                return Err(self.unsupported("concrete role outside of a conjunction", child));
            }
            _ => {
                return Err(self.structure("expected a single And or concept reference child", set));
            }
        }
        Ok(definition)
    }

    fn compile_element(
        &self,
        element: &LogicNode,
        definition: &mut Definition,
    ) -> Result<(), CompileError> {
        match element.kind() {
            NodeKind::ConceptReference(id) => {
                definition.supers.insert(*id);
            }
            NodeKind::Role { role_type, .. } if *role_type == vocab::ROLE_GROUP => {
                definition.role_groups.push(self.compile_role_group(element)?);
            }
            NodeKind::Role { .. } => definition.roles.push(self.compile_role(element)?),
            NodeKind::Feature { .. } | NodeKind::IntervalRole { .. } => {
                definition
                    .concrete_roles
                    .push(self.compile_concrete_role(element)?);
            }
            NodeKind::Or => return Err(self.unsupported("disjunction", element)),
            NodeKind::And => return Err(self.structure("nested conjunction", element)),
            _ => return Err(self.structure("unexpected node in a conjunction", element)),
        }
        Ok(())
    }

    fn compile_role(&self, node: &LogicNode) -> Result<Role, CompileError> {
        let NodeKind::Role {
            role_type,
            operator,
        } = node.kind()
        else {
            return Err(self.structure("expected a role", node));
        };
        if *operator != RoleOperator::Existential {
            return Err(self.unsupported("universal restriction", node));
        }
        let filler = self.single_child(node)?;
        match filler.kind() {
            NodeKind::ConceptReference(filler) => Ok(Role::new(*role_type, *filler)),
            NodeKind::Or => Err(self.unsupported("disjunction", filler)),
            NodeKind::Role { .. } | NodeKind::And => {
                Err(self.unsupported("nested role filler", node))
            }
            _ => Err(self.structure("a role filler must be a concept reference", node)),
        }
    }

    fn compile_role_group(&self, node: &LogicNode) -> Result<RoleGroup, CompileError> {
        if let NodeKind::Role {
            operator: RoleOperator::Universal,
            ..
        } = node.kind()
        {
            return Err(self.unsupported("universal restriction", node));
        }
        let child = self.single_child(node)?;
        let members = if matches!(child.kind(), NodeKind::And) {
            child.children()
        } else {
            std::slice::from_ref(child)
        };
        let mut group = RoleGroup::default();
        for member in members {
            match member.kind() {
                NodeKind::Role { role_type, .. } if *role_type == vocab::ROLE_GROUP => {
                    return Err(self.structure("nested role group", member));
                }
                NodeKind::Role { .. } => {
                    group.roles.insert(self.compile_role(member)?);
                }
                NodeKind::Feature { .. } | NodeKind::IntervalRole { .. } => {
                    group
                        .concrete_roles
                        .insert(self.compile_concrete_role(member)?);
                }
                NodeKind::Or => return Err(self.unsupported("disjunction", member)),
                _ => {
                    return Err(self.structure(
                        "a role group may only contain roles, features and interval roles",
                        member,
                    ));
                }
            }
        }
        if group.is_empty() {
            return Err(self.structure("empty role group", node));
        }
        Ok(group)
    }

    fn compile_concrete_role(&self, node: &LogicNode) -> Result<ConcreteRole, CompileError> {
        if !node.children().is_empty() {
            return Err(self.structure("a concrete role has no children", node));
        }
        match node.kind() {
            NodeKind::Feature {
                role_type,
                operator,
                literal,
            } => {
                if *role_type == vocab::ROLE_GROUP {
                    return Err(self.structure("a feature can not use the role group type", node));
                }
                Ok(ConcreteRole {
                    role_type: *role_type,
                    value: ConcreteValue::Value {
                        operator: *operator,
                        literal: self.typed_value(literal, node)?,
                    },
                })
            }
            NodeKind::IntervalRole {
                role_type,
                lower,
                upper,
            } => {
                if lower.is_none() && upper.is_none() {
                    return Err(self.structure("an interval needs at least one bound", node));
                }
                let lower = lower
                    .as_ref()
                    .map(|bound| self.interval_bound(bound, node))
                    .transpose()?;
                let upper = upper
                    .as_ref()
                    .map(|bound| self.interval_bound(bound, node))
                    .transpose()?;
                if let (Some(lower), Some(upper)) = (&lower, &upper) {
                    if lower.value.value_type() != upper.value.value_type() {
                        return Err(self.structure("interval bounds of different types", node));
                    }
                }
                Ok(ConcreteRole {
                    role_type: *role_type,
                    value: ConcreteValue::Interval(Interval { lower, upper }),
                })
            }
            _ => Err(self.structure("expected a feature or an interval role", node)),
        }
    }

    fn interval_bound(
        &self,
        bound: &Bound,
        node: &LogicNode,
    ) -> Result<IntervalBound, CompileError> {
        Ok(IntervalBound {
            value: self.typed_value(&bound.value, node)?,
            inclusive: bound.inclusive,
        })
    }

    fn typed_value(
        &self,
        literal: &Literal,
        node: &LogicNode,
    ) -> Result<TypedValue, CompileError> {
        TypedValue::from_literal(literal).map_err(|e| match e {
            TypedValueError::UnsupportedDatatype(datatype) => {
                self.unsupported(&format!("datatype {datatype}"), node)
            }
            e @ TypedValueError::InvalidLexicalForm { .. } => self.structure(&e.to_string(), node),
        })
    }

    fn compile_role_type(&self, root: &LogicNode) -> Result<RoleType, CompileError> {
        let mut role_type = RoleType::new(self.concept);
        for set in root.children() {
            for element in self.property_set_elements(set)? {
                match element.kind() {
                    NodeKind::ConceptReference(id) if *id == vocab::TRANSITIVE_PROPERTY => {
                        role_type.transitive = true;
                    }
                    NodeKind::ConceptReference(id) if *id == vocab::REFLEXIVE_PROPERTY => {
                        role_type.reflexive = true;
                    }
                    NodeKind::ConceptReference(id) => {
                        role_type.supers.insert(*id);
                    }
                    NodeKind::PropertySequenceImplication { chain, implies } => {
                        let [first, successor] = chain.as_slice() else {
                            return Err(self.structure(
                                "malformed chain: a chain must have exactly two elements",
                                element,
                            ));
                        };
                        if *first != self.concept {
                            return Err(self.structure(
                                "malformed chain: the chain must start with the defined role type",
                                element,
                            ));
                        }
                        if role_type.chain.is_some() {
                            return Err(self.structure(
                                "malformed chain: a role type can only start one chain",
                                element,
                            ));
                        }
                        role_type.chain = Some(RoleChain {
                            successor: *successor,
                            implies: *implies,
                        });
                    }
                    NodeKind::Or => return Err(self.unsupported("disjunction", element)),
                    NodeKind::Feature { .. } | NodeKind::IntervalRole { .. } => {
                        return Err(self.unsupported("concrete role in a property set", element));
                    }
                    _ => return Err(self.structure("unexpected node in a property set", element)),
                }
            }
        }
        Ok(role_type)
    }

    fn compile_concrete_role_type(
        &self,
        root: &LogicNode,
    ) -> Result<ConcreteRoleType, CompileError> {
        let mut concrete_role_type = ConcreteRoleType::new(self.concept);
        for set in root.children() {
            if matches!(set.kind(), NodeKind::IntervalPropertySet) {
                concrete_role_type.interval = true;
            }
            for element in self.property_set_elements(set)? {
                match element.kind() {
                    NodeKind::ConceptReference(id) => {
                        concrete_role_type.supers.insert(*id);
                    }
                    NodeKind::Or => return Err(self.unsupported("disjunction", element)),
                    _ => {
                        return Err(self.structure(
                            "a data property set may only reference super concrete role types",
                            element,
                        ));
                    }
                }
            }
        }
        Ok(concrete_role_type)
    }

    fn property_set_elements<'a>(
        &self,
        set: &'a LogicNode,
    ) -> Result<&'a [LogicNode], CompileError> {
        let child = self.single_child(set)?;
        match child.kind() {
            NodeKind::And => Ok(child.children()),
            NodeKind::Or => Err(self.unsupported("disjunction", child)),
            _ => Err(self.structure("expected a single And child", set)),
        }
    }

    fn single_child<'a>(&self, node: &'a LogicNode) -> Result<&'a LogicNode, CompileError> {
        match node.children() {
            [child] => Ok(child),
            [] => Err(self.structure("missing child", node)),
            _ => Err(self.structure(
                &format!("expected a single child, found {}", node.children().len()),
                node,
            )),
        }
    }

    fn structure(&self, message: &str, subtree: &LogicNode) -> CompileError {
        CompileError::Structure {
            concept: self.concept,
            message: message.into(),
            subtree: subtree.to_string(),
        }
    }

    fn unsupported(&self, construct: &str, subtree: &LogicNode) -> CompileError {
        CompileError::Unsupported {
            concept: self.concept,
            construct: construct.into(),
            subtree: subtree.to_string(),
        }
    }
}
