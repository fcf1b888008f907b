//! OWL 2 entity types usable in EL axioms.

use oxrdf::{NamedNode, NamedNodeRef};
use std::fmt;

/// IRI of `owl:Thing`, the class of all individuals.
pub const OWL_THING: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Thing");

macro_rules! named_entity {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(NamedNode);

        impl $name {
            #[inline]
            pub fn new(iri: NamedNode) -> Self {
                Self(iri)
            }

            /// Returns the IRI of this entity.
            #[inline]
            pub fn iri(&self) -> &NamedNode {
                &self.0
            }

            #[inline]
            pub fn into_inner(self) -> NamedNode {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<NamedNode> for $name {
            #[inline]
            fn from(node: NamedNode) -> Self {
                Self(node)
            }
        }

        impl From<NamedNodeRef<'_>> for $name {
            #[inline]
            fn from(node: NamedNodeRef<'_>) -> Self {
                Self(node.into_owned())
            }
        }

        impl From<$name> for NamedNode {
            #[inline]
            fn from(entity: $name) -> Self {
                entity.0
            }
        }
    };
}

named_entity!(
    /// An OWL class (`owl:Class`).
    ///
    /// Every class is a subclass of [`owl:Thing`](OwlClass::thing).
    OwlClass
);

named_entity!(
    /// An OWL object property (`owl:ObjectProperty`), relating individuals to individuals.
    ObjectProperty
);

named_entity!(
    /// An OWL data property (`owl:DatatypeProperty`), relating individuals to literals.
    DataProperty
);

impl OwlClass {
    /// `owl:Thing`
    #[inline]
    pub fn thing() -> Self {
        Self(OWL_THING.into_owned())
    }

    #[inline]
    pub fn is_thing(&self) -> bool {
        self.0.as_ref() == OWL_THING
    }
}
