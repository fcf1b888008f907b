//! Reserved concepts with a fixed meaning inside logical definitions.
//!
//! They are allocated at the top of the identifier space so they never collide with terminology content.

use crate::ConceptId;

/// Role type of role group nodes.
///
/// `Role[some ROLE_GROUP](And(...))` requires all the grouped roles to hold through a single common filler.
pub const ROLE_GROUP: ConceptId = ConceptId::new(u64::MAX);

/// Marker referenced from a property set to declare the defined role type transitive.
pub const TRANSITIVE_PROPERTY: ConceptId = ConceptId::new(u64::MAX - 1);

/// Marker referenced from a property set to declare the defined role type reflexive.
pub const REFLEXIVE_PROPERTY: ConceptId = ConceptId::new(u64::MAX - 2);

/// Root of the role type hierarchy.
pub const OBJECT_ROLE_ROOT: ConceptId = ConceptId::new(u64::MAX - 3);

/// Root of the concrete role type hierarchy.
pub const DATA_ROLE_ROOT: ConceptId = ConceptId::new(u64::MAX - 4);

/// Checks if the identifier is one of the reserved concepts of this module.
#[inline]
pub fn is_reserved(id: ConceptId) -> bool {
    id.get() >= DATA_ROLE_ROOT.get()
}

/// Human readable name of a reserved concept.
pub fn reserved_name(id: ConceptId) -> Option<&'static str> {
    Some(match id {
        ROLE_GROUP => "role-group",
        TRANSITIVE_PROPERTY => "transitive",
        REFLEXIVE_PROPERTY => "reflexive",
        OBJECT_ROLE_ROOT => "object-role-root",
        DATA_ROLE_ROOT => "data-role-root",
        _ => return None,
    })
}

/// Reserved concept with the given [`reserved_name`].
pub fn from_reserved_name(name: &str) -> Option<ConceptId> {
    Some(match name {
        "role-group" => ROLE_GROUP,
        "transitive" => TRANSITIVE_PROPERTY,
        "reflexive" => REFLEXIVE_PROPERTY,
        "object-role-root" => OBJECT_ROLE_ROOT,
        "data-role-root" => DATA_ROLE_ROOT,
        _ => return None,
    })
}
