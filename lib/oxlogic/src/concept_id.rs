use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// The stable numeric identifier of a concept.
///
/// Role types and concrete role types live in the same identifier space as concepts:
/// the role type `42` and the concept `42` are the same terminology entry.
///
/// ```
/// use oxlogic::ConceptId;
///
/// let id: ConceptId = "42".parse()?;
/// assert_eq!(id, ConceptId::new(42));
/// assert_eq!(id.to_string(), "42");
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Copy, Hash)]
pub struct ConceptId(u64);

impl ConceptId {
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConceptId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for ConceptId {
    #[inline]
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ConceptId> for u64 {
    #[inline]
    fn from(id: ConceptId) -> Self {
        id.0
    }
}

impl FromStr for ConceptId {
    type Err = ParseIntError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, ParseIntError> {
        Ok(Self(s.parse()?))
    }
}
