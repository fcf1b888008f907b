//! JSON encoding of logical definitions and classification results.
//!
//! Nodes are objects tagged by their `node` kind:
//! `{"node": "Role", "role_type": 12, "children": [{"node": "ConceptReference", "concept": 34}]}`.
//! Reserved concepts may be written with their name, e.g. `"transitive"` or `"role-group"`.

use anyhow::{Context, bail};
use oxclassify::ClassificationResults;
use oxlogic::{
    Bound, ConceptId, ConcreteOperator, LogicNode, LogicalDefinition, NodeKind, RoleOperator,
    vocab,
};
use oxrdf::vocab::xsd;
use oxrdf::{Literal, NamedNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A concept id, written as a number or as the name of a reserved concept.
#[derive(Serialize, Deserialize, Clone, Copy)]
#[serde(try_from = "RawConceptId", into = "RawConceptId")]
pub struct JsonConceptId(ConceptId);

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawConceptId {
    Id(u64),
    Name(String),
}

impl TryFrom<RawConceptId> for JsonConceptId {
    type Error = String;

    fn try_from(raw: RawConceptId) -> Result<Self, String> {
        match raw {
            RawConceptId::Id(id) => Ok(Self(ConceptId::new(id))),
            RawConceptId::Name(name) => vocab::from_reserved_name(&name)
                .map(Self)
                .ok_or_else(|| format!("{name} is not the name of a reserved concept")),
        }
    }
}

impl From<JsonConceptId> for RawConceptId {
    fn from(id: JsonConceptId) -> Self {
        if let Some(name) = vocab::reserved_name(id.0) {
            Self::Name(name.into())
        } else {
            Self::Id(id.0.get())
        }
    }
}

impl From<ConceptId> for JsonConceptId {
    #[inline]
    fn from(id: ConceptId) -> Self {
        Self(id)
    }
}

impl From<JsonConceptId> for ConceptId {
    #[inline]
    fn from(id: JsonConceptId) -> Self {
        id.0
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum JsonRoleOperator {
    #[default]
    Some,
    All,
}

#[derive(Serialize, Deserialize)]
pub struct JsonBound {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    pub inclusive: bool,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "node")]
pub enum JsonNode {
    DefinitionRoot {
        #[serde(default)]
        children: Vec<JsonNode>,
    },
    SufficientSet {
        #[serde(default)]
        children: Vec<JsonNode>,
    },
    NecessarySet {
        #[serde(default)]
        children: Vec<JsonNode>,
    },
    InclusionSet {
        #[serde(default)]
        children: Vec<JsonNode>,
    },
    PropertySet {
        #[serde(default)]
        children: Vec<JsonNode>,
    },
    DataPropertySet {
        #[serde(default)]
        children: Vec<JsonNode>,
    },
    IntervalPropertySet {
        #[serde(default)]
        children: Vec<JsonNode>,
    },
    And {
        #[serde(default)]
        children: Vec<JsonNode>,
    },
    Or {
        #[serde(default)]
        children: Vec<JsonNode>,
    },
    ConceptReference {
        concept: JsonConceptId,
    },
    Role {
        role_type: JsonConceptId,
        #[serde(default)]
        operator: JsonRoleOperator,
        #[serde(default)]
        children: Vec<JsonNode>,
    },
    Feature {
        role_type: JsonConceptId,
        /// `=`, `<`, `<=`, `>` or `>=`, `=` if missing
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operator: Option<String>,
        value: String,
        /// `xsd:string` if missing
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
    },
    IntervalRole {
        role_type: JsonConceptId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lower: Option<JsonBound>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        upper: Option<JsonBound>,
    },
    PropertySequenceImplication {
        chain: Vec<JsonConceptId>,
        implies: JsonConceptId,
    },
}

impl TryFrom<JsonNode> for LogicNode {
    type Error = anyhow::Error;

    fn try_from(node: JsonNode) -> anyhow::Result<Self> {
        Ok(match node {
            JsonNode::DefinitionRoot { children } => branch(NodeKind::DefinitionRoot, children)?,
            JsonNode::SufficientSet { children } => branch(NodeKind::SufficientSet, children)?,
            JsonNode::NecessarySet { children } => branch(NodeKind::NecessarySet, children)?,
            JsonNode::InclusionSet { children } => branch(NodeKind::InclusionSet, children)?,
            JsonNode::PropertySet { children } => branch(NodeKind::PropertySet, children)?,
            JsonNode::DataPropertySet { children } => branch(NodeKind::DataPropertySet, children)?,
            JsonNode::IntervalPropertySet { children } => {
                branch(NodeKind::IntervalPropertySet, children)?
            }
            JsonNode::And { children } => branch(NodeKind::And, children)?,
            JsonNode::Or { children } => branch(NodeKind::Or, children)?,
            JsonNode::ConceptReference { concept } => LogicNode::concept(concept.into()),
            JsonNode::Role {
                role_type,
                operator,
                children,
            } => branch(
                NodeKind::Role {
                    role_type: role_type.into(),
                    operator: match operator {
                        JsonRoleOperator::Some => RoleOperator::Existential,
                        JsonRoleOperator::All => RoleOperator::Universal,
                    },
                },
                children,
            )?,
            JsonNode::Feature {
                role_type,
                operator,
                value,
                datatype,
            } => {
                let operator = match operator {
                    Some(symbol) => ConcreteOperator::from_symbol(&symbol)
                        .with_context(|| format!("{symbol} is not a comparison operator"))?,
                    None => ConcreteOperator::Equal,
                };
                LogicNode::feature(role_type.into(), operator, literal(value, datatype)?)
            }
            JsonNode::IntervalRole {
                role_type,
                lower,
                upper,
            } => LogicNode::interval_role(
                role_type.into(),
                lower.map(bound).transpose()?,
                upper.map(bound).transpose()?,
            ),
            JsonNode::PropertySequenceImplication { chain, implies } => {
                LogicNode::property_sequence_implication(
                    chain.into_iter().map(ConceptId::from),
                    implies.into(),
                )
            }
        })
    }
}

impl From<&LogicNode> for JsonNode {
    fn from(node: &LogicNode) -> Self {
        let children = || node.children().iter().map(Self::from).collect();
        match node.kind() {
            NodeKind::DefinitionRoot => Self::DefinitionRoot {
                children: children(),
            },
            NodeKind::SufficientSet => Self::SufficientSet {
                children: children(),
            },
            NodeKind::NecessarySet => Self::NecessarySet {
                children: children(),
            },
            NodeKind::InclusionSet => Self::InclusionSet {
                children: children(),
            },
            NodeKind::PropertySet => Self::PropertySet {
                children: children(),
            },
            NodeKind::DataPropertySet => Self::DataPropertySet {
                children: children(),
            },
            NodeKind::IntervalPropertySet => Self::IntervalPropertySet {
                children: children(),
            },
            NodeKind::And => Self::And {
                children: children(),
            },
            NodeKind::Or => Self::Or {
                children: children(),
            },
            NodeKind::ConceptReference(concept) => Self::ConceptReference {
                concept: (*concept).into(),
            },
            NodeKind::Role {
                role_type,
                operator,
            } => Self::Role {
                role_type: (*role_type).into(),
                operator: match operator {
                    RoleOperator::Existential => JsonRoleOperator::Some,
                    RoleOperator::Universal => JsonRoleOperator::All,
                },
                children: children(),
            },
            NodeKind::Feature {
                role_type,
                operator,
                literal,
            } => {
                let (value, datatype) = lexical(literal);
                Self::Feature {
                    role_type: (*role_type).into(),
                    operator: Some(operator.symbol().into()),
                    value,
                    datatype,
                }
            }
            NodeKind::IntervalRole {
                role_type,
                lower,
                upper,
            } => Self::IntervalRole {
                role_type: (*role_type).into(),
                lower: lower.as_ref().map(JsonBound::from),
                upper: upper.as_ref().map(JsonBound::from),
            },
            NodeKind::PropertySequenceImplication { chain, implies } => {
                Self::PropertySequenceImplication {
                    chain: chain.iter().copied().map(JsonConceptId::from).collect(),
                    implies: (*implies).into(),
                }
            }
        }
    }
}

impl From<&Bound> for JsonBound {
    fn from(bound: &Bound) -> Self {
        let (value, datatype) = lexical(&bound.value);
        Self {
            value,
            datatype,
            inclusive: bound.inclusive,
        }
    }
}

fn branch(kind: NodeKind, children: Vec<JsonNode>) -> anyhow::Result<LogicNode> {
    Ok(LogicNode::new(
        kind,
        children
            .into_iter()
            .map(LogicNode::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?,
    ))
}

fn bound(bound: JsonBound) -> anyhow::Result<Bound> {
    Ok(Bound {
        value: literal(bound.value, bound.datatype)?,
        inclusive: bound.inclusive,
    })
}

fn literal(value: String, datatype: Option<String>) -> anyhow::Result<Literal> {
    let Some(datatype) = datatype else {
        return Ok(Literal::new_simple_literal(value));
    };
    let datatype = NamedNode::new(&datatype)
        .with_context(|| format!("{datatype} is not a valid datatype IRI"))?;
    Ok(Literal::new_typed_literal(value, datatype))
}

fn lexical(literal: &Literal) -> (String, Option<String>) {
    let datatype = literal.datatype();
    (
        literal.value().into(),
        (datatype != xsd::STRING).then(|| datatype.as_str().into()),
    )
}

#[derive(Serialize, Deserialize)]
pub struct JsonDefinition {
    pub concept: JsonConceptId,
    pub root: JsonNode,
}

impl TryFrom<JsonDefinition> for LogicalDefinition {
    type Error = anyhow::Error;

    fn try_from(definition: JsonDefinition) -> anyhow::Result<Self> {
        let concept = ConceptId::from(definition.concept);
        let root = LogicNode::try_from(definition.root)
            .with_context(|| format!("Invalid definition of concept {concept}"))?;
        if !matches!(root.kind(), NodeKind::DefinitionRoot) {
            bail!("The definition of concept {concept} must start with a DefinitionRoot node");
        }
        Ok(Self::new(concept, root))
    }
}

impl From<&LogicalDefinition> for JsonDefinition {
    fn from(definition: &LogicalDefinition) -> Self {
        Self {
            concept: definition.concept().into(),
            root: definition.root().into(),
        }
    }
}

pub fn definitions(definitions: Vec<JsonDefinition>) -> anyhow::Result<Vec<LogicalDefinition>> {
    definitions
        .into_iter()
        .map(LogicalDefinition::try_from)
        .collect()
}

/// A batch of incremental changes.
#[derive(Serialize, Deserialize, Default)]
pub struct JsonChanges {
    #[serde(default)]
    pub deleted: Vec<JsonConceptId>,
    #[serde(default)]
    pub updated: Vec<JsonDefinition>,
}

#[derive(Serialize)]
pub struct JsonResults {
    pub summary: JsonSummary,
    pub taxonomy: Vec<JsonTaxonomyEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inferred: Option<Vec<JsonDefinition>>,
}

#[derive(Serialize)]
pub struct JsonSummary {
    pub processed: usize,
    pub concepts: usize,
    pub incomplete: bool,
}

#[derive(Serialize)]
pub struct JsonTaxonomyEntry {
    pub concept: JsonConceptId,
    pub equivalents: Vec<JsonConceptId>,
    pub parents: Vec<JsonConceptId>,
    pub children: Vec<JsonConceptId>,
}

impl JsonResults {
    pub fn new(results: &ClassificationResults, with_inferred: bool) -> Self {
        let ids = |ids: &BTreeSet<ConceptId>| {
            ids.iter().copied().map(JsonConceptId::from).collect()
        };
        Self {
            summary: JsonSummary {
                processed: results.summary.processed,
                concepts: results.summary.concept_ids.len(),
                incomplete: results.summary.incomplete,
            },
            taxonomy: results
                .taxonomy
                .iter()
                .map(|(concept, entry)| JsonTaxonomyEntry {
                    concept: (*concept).into(),
                    equivalents: ids(&entry.equivalents),
                    parents: ids(&entry.parents),
                    children: ids(&entry.children),
                })
                .collect(),
            inferred: with_inferred
                .then(|| results.inferred.iter().map(JsonDefinition::from).collect()),
        }
    }
}
