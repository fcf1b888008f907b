#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod axiom;
mod cancellation;
mod engine;
mod entity;
mod error;
mod expression;
mod loader;
mod reasoner;
mod taxonomy;

pub use crate::axiom::Axiom;
pub use crate::cancellation::CancellationToken;
pub use crate::engine::{AtomId, Cancelled, Engine, Expr, RoleId, SaturationStatistics, TOP};
pub use crate::entity::{DataProperty, OWL_THING, ObjectProperty, OwlClass};
pub use crate::error::{ElError, LoadingError};
pub use crate::expression::{ClassExpression, DataRange};
pub use crate::loader::{AxiomLoader, IterAxiomLoader};
pub use crate::reasoner::{ElReasoner, ReasonerConfig};
pub use crate::taxonomy::{Taxonomy, TaxonomyNode};
