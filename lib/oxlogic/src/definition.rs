use crate::{ConceptId, LogicNode};
use std::fmt;

/// The logical definition of one concept: a [`DefinitionRoot`](crate::NodeKind::DefinitionRoot) tree.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct LogicalDefinition {
    concept: ConceptId,
    root: LogicNode,
}

impl LogicalDefinition {
    #[inline]
    pub fn new(concept: ConceptId, root: LogicNode) -> Self {
        Self { concept, root }
    }

    /// `DefinitionRoot(NecessarySet(child))`
    pub fn necessary(concept: ConceptId, child: LogicNode) -> Self {
        Self::new(
            concept,
            LogicNode::definition_root([LogicNode::necessary_set(child)]),
        )
    }

    /// `DefinitionRoot(SufficientSet(child))`
    pub fn sufficient(concept: ConceptId, child: LogicNode) -> Self {
        Self::new(
            concept,
            LogicNode::definition_root([LogicNode::sufficient_set(child)]),
        )
    }

    /// `DefinitionRoot(PropertySet(child))`
    pub fn property(concept: ConceptId, child: LogicNode) -> Self {
        Self::new(
            concept,
            LogicNode::definition_root([LogicNode::property_set(child)]),
        )
    }

    /// The concept this definition is about.
    #[inline]
    pub fn concept(&self) -> ConceptId {
        self.concept
    }

    #[inline]
    pub fn root(&self) -> &LogicNode {
        &self.root
    }

    #[inline]
    pub fn into_root(self) -> LogicNode {
        self.root
    }
}

impl fmt::Display for LogicalDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.concept, self.root)
    }
}
