use crate::ConceptId;
use oxrdf::Literal;
use std::fmt;

/// Operator of a [`NodeKind::Role`] node.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum RoleOperator {
    /// `some`: there exists a filler related through the role.
    Existential,
    /// `all`: every filler related through the role. Not part of EL++.
    Universal,
}

impl fmt::Display for RoleOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Existential => "some",
            Self::Universal => "all",
        })
    }
}

/// Comparison operator of a [`NodeKind::Feature`] node.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Copy, Hash)]
pub enum ConcreteOperator {
    Equal,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl ConcreteOperator {
    #[inline]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "=" => Self::Equal,
            "<" => Self::LessThan,
            "<=" => Self::LessThanOrEqual,
            ">" => Self::GreaterThan,
            ">=" => Self::GreaterThanOrEqual,
            _ => return None,
        })
    }
}

impl fmt::Display for ConcreteOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A bound of an [`NodeKind::IntervalRole`] node.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Bound {
    pub value: Literal,
    pub inclusive: bool,
}

impl Bound {
    #[inline]
    pub fn inclusive(value: impl Into<Literal>) -> Self {
        Self {
            value: value.into(),
            inclusive: true,
        }
    }

    #[inline]
    pub fn exclusive(value: impl Into<Literal>) -> Self {
        Self {
            value: value.into(),
            inclusive: false,
        }
    }
}

/// The kind of a [`LogicNode`] with the data attached to it.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum NodeKind {
    /// Root of every logical definition. Its children are the typed sets.
    DefinitionRoot,
    /// The concept is equivalent to the conjunction below.
    SufficientSet,
    /// The concept is subsumed by the conjunction below.
    NecessarySet,
    /// The conjunction below is subsumed by the concept (general concept inclusion).
    InclusionSet,
    /// Role type axioms of the concept.
    PropertySet,
    /// Concrete role type axioms of the concept.
    DataPropertySet,
    /// Concrete role type axioms of an interval valued concrete role type.
    IntervalPropertySet,
    And,
    /// Disjunction, only present to be rejected: EL++ has no disjunction.
    Or,
    ConceptReference(ConceptId),
    /// A restriction on a role type. Its single child is the filler.
    Role {
        role_type: ConceptId,
        operator: RoleOperator,
    },
    /// A concrete role with a literal value.
    Feature {
        role_type: ConceptId,
        operator: ConcreteOperator,
        literal: Literal,
    },
    /// A concrete role whose value is in the given interval.
    IntervalRole {
        role_type: ConceptId,
        lower: Option<Bound>,
        upper: Option<Bound>,
    },
    /// The role chain `chain[0] o chain[1] o ...` implies `implies`.
    PropertySequenceImplication {
        chain: Vec<ConceptId>,
        implies: ConceptId,
    },
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DefinitionRoot => "DefinitionRoot",
            Self::SufficientSet => "SufficientSet",
            Self::NecessarySet => "NecessarySet",
            Self::InclusionSet => "InclusionSet",
            Self::PropertySet => "PropertySet",
            Self::DataPropertySet => "DataPropertySet",
            Self::IntervalPropertySet => "IntervalPropertySet",
            Self::And => "And",
            Self::Or => "Or",
            Self::ConceptReference(_) => "Concept",
            Self::Role { .. } => "Role",
            Self::Feature { .. } => "Feature",
            Self::IntervalRole { .. } => "IntervalRole",
            Self::PropertySequenceImplication { .. } => "PropertySequenceImplication",
        }
    }
}

/// A node of a logical definition tree.
///
/// The tree shape is not checked on construction: malformed trees coming from a knowledge store
/// have to be representable so that consumers can reject them with a precise error.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct LogicNode {
    kind: NodeKind,
    children: Vec<LogicNode>,
}

impl LogicNode {
    #[inline]
    pub fn new(kind: NodeKind, children: impl IntoIterator<Item = LogicNode>) -> Self {
        Self {
            kind,
            children: children.into_iter().collect(),
        }
    }

    #[inline]
    pub fn leaf(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[inline]
    pub fn children(&self) -> &[LogicNode] {
        &self.children
    }

    /// The only child of the node if it has exactly one.
    #[inline]
    pub fn single_child(&self) -> Option<&LogicNode> {
        match self.children.as_slice() {
            [child] => Some(child),
            _ => None,
        }
    }

    pub fn definition_root(sets: impl IntoIterator<Item = LogicNode>) -> Self {
        Self::new(NodeKind::DefinitionRoot, sets)
    }

    pub fn sufficient_set(child: LogicNode) -> Self {
        Self::new(NodeKind::SufficientSet, [child])
    }

    pub fn necessary_set(child: LogicNode) -> Self {
        Self::new(NodeKind::NecessarySet, [child])
    }

    pub fn inclusion_set(child: LogicNode) -> Self {
        Self::new(NodeKind::InclusionSet, [child])
    }

    pub fn property_set(child: LogicNode) -> Self {
        Self::new(NodeKind::PropertySet, [child])
    }

    pub fn data_property_set(child: LogicNode) -> Self {
        Self::new(NodeKind::DataPropertySet, [child])
    }

    pub fn interval_property_set(child: LogicNode) -> Self {
        Self::new(NodeKind::IntervalPropertySet, [child])
    }

    pub fn and(children: impl IntoIterator<Item = LogicNode>) -> Self {
        Self::new(NodeKind::And, children)
    }

    pub fn or(children: impl IntoIterator<Item = LogicNode>) -> Self {
        Self::new(NodeKind::Or, children)
    }

    pub fn concept(id: ConceptId) -> Self {
        Self::leaf(NodeKind::ConceptReference(id))
    }

    /// An existential restriction `some role_type.filler`.
    pub fn role(role_type: ConceptId, filler: LogicNode) -> Self {
        Self::new(
            NodeKind::Role {
                role_type,
                operator: RoleOperator::Existential,
            },
            [filler],
        )
    }

    /// A role group holding the roles and features of `child` (a role, a feature or an `And` of them).
    pub fn role_group(child: LogicNode) -> Self {
        Self::role(crate::vocab::ROLE_GROUP, child)
    }

    pub fn feature(role_type: ConceptId, operator: ConcreteOperator, literal: Literal) -> Self {
        Self::leaf(NodeKind::Feature {
            role_type,
            operator,
            literal,
        })
    }

    pub fn interval_role(role_type: ConceptId, lower: Option<Bound>, upper: Option<Bound>) -> Self {
        Self::leaf(NodeKind::IntervalRole {
            role_type,
            lower,
            upper,
        })
    }

    pub fn property_sequence_implication(
        chain: impl IntoIterator<Item = ConceptId>,
        implies: ConceptId,
    ) -> Self {
        Self::leaf(NodeKind::PropertySequenceImplication {
            chain: chain.into_iter().collect(),
            implies,
        })
    }
}

impl fmt::Display for LogicNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.name())?;
        match &self.kind {
            NodeKind::ConceptReference(id) => return write!(f, "({id})"),
            NodeKind::Role {
                role_type,
                operator,
            } => write!(f, "[{operator} {role_type}]")?,
            NodeKind::Feature {
                role_type,
                operator,
                literal,
            } => write!(f, "[{role_type} {operator} {literal}]")?,
            NodeKind::IntervalRole {
                role_type,
                lower,
                upper,
            } => {
                write!(f, "[{role_type} ")?;
                match lower {
                    Some(Bound {
                        value,
                        inclusive: true,
                    }) => write!(f, "[{value}")?,
                    Some(Bound {
                        value,
                        inclusive: false,
                    }) => write!(f, "({value}")?,
                    None => f.write_str("(*")?,
                }
                f.write_str(", ")?;
                match upper {
                    Some(Bound {
                        value,
                        inclusive: true,
                    }) => write!(f, "{value}]")?,
                    Some(Bound {
                        value,
                        inclusive: false,
                    }) => write!(f, "{value})")?,
                    None => f.write_str("*)")?,
                }
                f.write_str("]")?;
            }
            NodeKind::PropertySequenceImplication { chain, implies } => {
                f.write_str("[")?;
                for (i, role_type) in chain.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" o ")?;
                    }
                    write!(f, "{role_type}")?;
                }
                write!(f, " -> {implies}]")?;
            }
            NodeKind::DefinitionRoot
            | NodeKind::SufficientSet
            | NodeKind::NecessarySet
            | NodeKind::InclusionSet
            | NodeKind::PropertySet
            | NodeKind::DataPropertySet
            | NodeKind::IntervalPropertySet
            | NodeKind::And
            | NodeKind::Or => (),
        }
        if !self.children.is_empty() {
            f.write_str("(")?;
            for (i, child) in self.children.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{child}")?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::vocab::xsd;

    #[test]
    fn display_nested_tree() {
        let node = LogicNode::definition_root([LogicNode::sufficient_set(LogicNode::and([
            LogicNode::concept(ConceptId::new(1)),
            LogicNode::role_group(LogicNode::and([
                LogicNode::role(ConceptId::new(2), LogicNode::concept(ConceptId::new(3))),
                LogicNode::feature(
                    ConceptId::new(4),
                    ConcreteOperator::GreaterThan,
                    Literal::new_typed_literal("5", xsd::INTEGER),
                ),
            ])),
        ]))]);
        assert_eq!(
            node.to_string(),
            format!(
                "DefinitionRoot(SufficientSet(And(Concept(1), Role[some {}](And(Role[some 2](Concept(3)), Feature[4 > \"5\"^^<http://www.w3.org/2001/XMLSchema#integer>])))))",
                crate::vocab::ROLE_GROUP
            )
        );
    }

    #[test]
    fn display_interval_and_chain() {
        let interval = LogicNode::interval_role(
            ConceptId::new(7),
            Some(Bound::inclusive(Literal::new_typed_literal("1", xsd::INTEGER))),
            None,
        );
        assert_eq!(
            interval.to_string(),
            "IntervalRole[7 [\"1\"^^<http://www.w3.org/2001/XMLSchema#integer>, *)]"
        );
        let chain = LogicNode::property_sequence_implication(
            [ConceptId::new(1), ConceptId::new(2)],
            ConceptId::new(1),
        );
        assert_eq!(chain.to_string(), "PropertySequenceImplication[1 o 2 -> 1]");
    }

    #[test]
    fn operator_symbols_round_trip() {
        for operator in [
            ConcreteOperator::Equal,
            ConcreteOperator::LessThan,
            ConcreteOperator::LessThanOrEqual,
            ConcreteOperator::GreaterThan,
            ConcreteOperator::GreaterThanOrEqual,
        ] {
            assert_eq!(ConcreteOperator::from_symbol(operator.symbol()), Some(operator));
        }
        assert_eq!(ConcreteOperator::from_symbol("!="), None);
    }

    #[test]
    fn single_child() {
        let one = LogicNode::necessary_set(LogicNode::and(Vec::new()));
        assert!(one.single_child().is_some());
        let none = LogicNode::and(Vec::new());
        assert!(none.single_child().is_none());
    }
}
