//! OWL 2 EL class expressions and data ranges.

use crate::entity::{DataProperty, ObjectProperty, OwlClass};
use oxrdf::{Literal, NamedNode};
use std::fmt;

/// A class expression of the EL profile.
///
/// Only the constructors the EL saturation supports are representable:
/// there is no union, complement or universal restriction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassExpression {
    /// A named class.
    Class(OwlClass),

    /// ObjectIntersectionOf(C1, ..., Cn)
    ObjectIntersectionOf(Vec<ClassExpression>),

    /// ObjectSomeValuesFrom(P, C)
    ObjectSomeValuesFrom {
        property: ObjectProperty,
        filler: Box<ClassExpression>,
    },

    /// DataHasValue(P, v)
    DataHasValue {
        property: DataProperty,
        value: Literal,
    },

    /// DataSomeValuesFrom(P, D)
    DataSomeValuesFrom {
        property: DataProperty,
        filler: DataRange,
    },
}

impl ClassExpression {
    #[inline]
    pub fn class(class: impl Into<OwlClass>) -> Self {
        Self::Class(class.into())
    }

    /// `owl:Thing`
    #[inline]
    pub fn thing() -> Self {
        Self::Class(OwlClass::thing())
    }

    #[inline]
    pub fn intersection(operands: impl IntoIterator<Item = ClassExpression>) -> Self {
        Self::ObjectIntersectionOf(operands.into_iter().collect())
    }

    #[inline]
    pub fn some_values_from(property: impl Into<ObjectProperty>, filler: ClassExpression) -> Self {
        Self::ObjectSomeValuesFrom {
            property: property.into(),
            filler: Box::new(filler),
        }
    }

    #[inline]
    pub fn has_value(property: impl Into<DataProperty>, value: impl Into<Literal>) -> Self {
        Self::DataHasValue {
            property: property.into(),
            value: value.into(),
        }
    }

    #[inline]
    pub fn data_some_values_from(property: impl Into<DataProperty>, filler: DataRange) -> Self {
        Self::DataSomeValuesFrom {
            property: property.into(),
            filler,
        }
    }

    /// Returns true if this is a named class.
    #[inline]
    pub fn is_named(&self) -> bool {
        matches!(self, Self::Class(_))
    }

    #[inline]
    pub fn as_class(&self) -> Option<&OwlClass> {
        if let Self::Class(class) = self {
            Some(class)
        } else {
            None
        }
    }
}

impl From<OwlClass> for ClassExpression {
    #[inline]
    fn from(class: OwlClass) -> Self {
        Self::Class(class)
    }
}

impl fmt::Display for ClassExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(class) => class.fmt(f),
            Self::ObjectIntersectionOf(operands) => {
                f.write_str("ObjectIntersectionOf(")?;
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    operand.fmt(f)?;
                }
                f.write_str(")")
            }
            Self::ObjectSomeValuesFrom { property, filler } => {
                write!(f, "ObjectSomeValuesFrom({property} {filler})")
            }
            Self::DataHasValue { property, value } => {
                write!(f, "DataHasValue({property} {value})")
            }
            Self::DataSomeValuesFrom { property, filler } => {
                write!(f, "DataSomeValuesFrom({property} {filler})")
            }
        }
    }
}

/// A data range: a datatype, possibly restricted by facets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataRange {
    /// A named datatype like `xsd:integer`.
    Datatype(NamedNode),

    /// DatatypeRestriction(DT, F1 v1, ..., Fn vn)
    DatatypeRestriction {
        datatype: NamedNode,
        facets: Vec<(NamedNode, Literal)>,
    },
}

impl DataRange {
    #[inline]
    pub fn datatype(datatype: impl Into<NamedNode>) -> Self {
        Self::Datatype(datatype.into())
    }

    /// The restricted datatype.
    #[inline]
    pub fn base_datatype(&self) -> &NamedNode {
        match self {
            Self::Datatype(datatype) | Self::DatatypeRestriction { datatype, .. } => datatype,
        }
    }

    /// Returns true if the range is restricted by facets.
    #[inline]
    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::DatatypeRestriction { facets, .. } if !facets.is_empty())
    }
}

impl From<NamedNode> for DataRange {
    #[inline]
    fn from(datatype: NamedNode) -> Self {
        Self::Datatype(datatype)
    }
}

impl fmt::Display for DataRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Datatype(datatype) => datatype.fmt(f),
            Self::DatatypeRestriction { datatype, facets } => {
                write!(f, "DatatypeRestriction({datatype}")?;
                for (facet, value) in facets {
                    write!(f, " {facet} {value}")?;
                }
                f.write_str(")")
            }
        }
    }
}
