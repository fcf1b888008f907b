//! OWL 2 EL axiom types.

use crate::entity::{DataProperty, ObjectProperty, OwlClass};
use crate::expression::ClassExpression;
use std::fmt;

/// An axiom of the EL profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Axiom {
    /// SubClassOf(sub, super)
    SubClassOf {
        sub_class: ClassExpression,
        super_class: ClassExpression,
    },

    /// EquivalentClasses(C1, C2, ...)
    EquivalentClasses(Vec<ClassExpression>),

    /// SubObjectPropertyOf(sub, super)
    SubObjectPropertyOf {
        sub_property: ObjectProperty,
        super_property: ObjectProperty,
    },

    /// SubObjectPropertyOf(ObjectPropertyChain(P1 ... Pn), P)
    SubPropertyChainOf {
        property_chain: Vec<ObjectProperty>,
        super_property: ObjectProperty,
    },

    /// TransitiveObjectProperty(P)
    TransitiveObjectProperty(ObjectProperty),

    /// ReflexiveObjectProperty(P)
    ReflexiveObjectProperty(ObjectProperty),

    /// SubDataPropertyOf(sub, super)
    SubDataPropertyOf {
        sub_property: DataProperty,
        super_property: DataProperty,
    },

    /// Declaration(Class(C))
    ///
    /// Makes sure the class is part of the taxonomy even if no other axiom mentions it.
    DeclareClass(OwlClass),

    /// Declaration(ObjectProperty(P))
    DeclareObjectProperty(ObjectProperty),

    /// Declaration(DataProperty(P))
    DeclareDataProperty(DataProperty),
}

impl Axiom {
    pub fn subclass_of(
        sub_class: impl Into<ClassExpression>,
        super_class: impl Into<ClassExpression>,
    ) -> Self {
        Self::SubClassOf {
            sub_class: sub_class.into(),
            super_class: super_class.into(),
        }
    }

    pub fn equivalent_classes(
        first: impl Into<ClassExpression>,
        second: impl Into<ClassExpression>,
    ) -> Self {
        Self::EquivalentClasses(vec![first.into(), second.into()])
    }

    pub fn sub_object_property_of(
        sub_property: impl Into<ObjectProperty>,
        super_property: impl Into<ObjectProperty>,
    ) -> Self {
        Self::SubObjectPropertyOf {
            sub_property: sub_property.into(),
            super_property: super_property.into(),
        }
    }

    pub fn sub_data_property_of(
        sub_property: impl Into<DataProperty>,
        super_property: impl Into<DataProperty>,
    ) -> Self {
        Self::SubDataPropertyOf {
            sub_property: sub_property.into(),
            super_property: super_property.into(),
        }
    }
}

impl fmt::Display for Axiom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubClassOf {
                sub_class,
                super_class,
            } => write!(f, "SubClassOf({sub_class} {super_class})"),
            Self::EquivalentClasses(classes) => {
                f.write_str("EquivalentClasses(")?;
                for (i, class) in classes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    class.fmt(f)?;
                }
                f.write_str(")")
            }
            Self::SubObjectPropertyOf {
                sub_property,
                super_property,
            } => write!(f, "SubObjectPropertyOf({sub_property} {super_property})"),
            Self::SubPropertyChainOf {
                property_chain,
                super_property,
            } => {
                f.write_str("SubObjectPropertyOf(ObjectPropertyChain(")?;
                for (i, property) in property_chain.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    property.fmt(f)?;
                }
                write!(f, ") {super_property})")
            }
            Self::TransitiveObjectProperty(property) => {
                write!(f, "TransitiveObjectProperty({property})")
            }
            Self::ReflexiveObjectProperty(property) => {
                write!(f, "ReflexiveObjectProperty({property})")
            }
            Self::SubDataPropertyOf {
                sub_property,
                super_property,
            } => write!(f, "SubDataPropertyOf({sub_property} {super_property})"),
            Self::DeclareClass(class) => write!(f, "Declaration(Class({class}))"),
            Self::DeclareObjectProperty(property) => {
                write!(f, "Declaration(ObjectProperty({property}))")
            }
            Self::DeclareDataProperty(property) => {
                write!(f, "Declaration(DataProperty({property}))")
            }
        }
    }
}
