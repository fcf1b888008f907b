#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod concept_id;
mod definition;
mod node;
pub mod vocab;

pub use crate::concept_id::ConceptId;
pub use crate::definition::LogicalDefinition;
pub use crate::node::{Bound, ConcreteOperator, LogicNode, NodeKind, RoleOperator};
