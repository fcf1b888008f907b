use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use std::hash::Hash;

/// The position of one element inside a [`Taxonomy`].
#[derive(Debug, Clone)]
pub struct TaxonomyNode<T> {
    equivalents: BTreeSet<T>,
    parents: BTreeSet<T>,
    children: BTreeSet<T>,
    ancestors: BTreeSet<T>,
}

impl<T> TaxonomyNode<T> {
    /// Elements mutually subsuming this one, itself excluded.
    #[inline]
    pub fn equivalents(&self) -> &BTreeSet<T> {
        &self.equivalents
    }

    /// Direct proper subsumers.
    #[inline]
    pub fn parents(&self) -> &BTreeSet<T> {
        &self.parents
    }

    /// Direct proper subsumees.
    #[inline]
    pub fn children(&self) -> &BTreeSet<T> {
        &self.children
    }

    /// All subsumers, itself excluded.
    #[inline]
    pub fn ancestors(&self) -> &BTreeSet<T> {
        &self.ancestors
    }
}

/// Classification results: the subsumption hierarchy between named elements.
///
/// ```
/// use oxel::Taxonomy;
///
/// let taxonomy = Taxonomy::from_subsumers([
///     ("animal", vec!["animal"]),
///     ("dog", vec!["dog", "animal", "canine"]),
///     ("canine", vec!["canine", "dog", "animal"]),
///     ("puppy", vec!["puppy", "dog", "canine", "animal"]),
/// ]);
/// assert_eq!(taxonomy.equivalents(&"dog").unwrap().iter().collect::<Vec<_>>(), [&"canine"]);
/// assert_eq!(taxonomy.parents(&"puppy").unwrap().iter().collect::<Vec<_>>(), [&"canine", &"dog"]);
/// assert_eq!(taxonomy.children(&"animal").unwrap().iter().collect::<Vec<_>>(), [&"canine", &"dog"]);
/// ```
#[derive(Debug, Clone)]
pub struct Taxonomy<T> {
    nodes: FxHashMap<T, TaxonomyNode<T>>,
}

impl<T: Eq + Hash + Ord + Clone> Taxonomy<T> {
    /// Builds the taxonomy from the full subsumer set of each element.
    ///
    /// Subsumers that are not themselves keys of the input are ignored.
    pub fn from_subsumers<S: IntoIterator<Item = T>>(
        subsumers: impl IntoIterator<Item = (T, S)>,
    ) -> Self {
        let mut subsumers = subsumers
            .into_iter()
            .map(|(element, sups)| (element, sups.into_iter().collect::<FxHashSet<_>>()))
            .collect::<FxHashMap<_, _>>();
        let keys = subsumers.keys().cloned().collect::<FxHashSet<_>>();
        for (element, sups) in &mut subsumers {
            sups.retain(|sup| sup != element && keys.contains(sup));
        }

        let mut nodes = FxHashMap::default();
        for (element, sups) in &subsumers {
            let (equivalents, proper): (BTreeSet<_>, BTreeSet<_>) = sups
                .iter()
                .cloned()
                .partition(|sup| subsumers.get(sup).is_some_and(|s| s.contains(element)));
            let parents = proper
                .iter()
                .filter(|candidate| {
                    !proper.iter().any(|other| {
                        other != *candidate
                            && !equivalents_of(&subsumers, other, candidate)
                            && subsumers.get(other).is_some_and(|s| s.contains(*candidate))
                    })
                })
                .cloned()
                .collect();
            nodes.insert(
                element.clone(),
                TaxonomyNode {
                    equivalents,
                    parents,
                    children: BTreeSet::new(),
                    ancestors: sups.iter().cloned().collect(),
                },
            );
        }

        let edges = nodes
            .iter()
            .flat_map(|(child, node)| {
                node.parents
                    .iter()
                    .map(move |parent| (parent.clone(), child.clone()))
            })
            .collect::<Vec<_>>();
        for (parent, child) in edges {
            if let Some(node) = nodes.get_mut(&parent) {
                node.children.insert(child);
            }
        }
        Self { nodes }
    }

    #[inline]
    pub fn contains(&self, element: &T) -> bool {
        self.nodes.contains_key(element)
    }

    #[inline]
    pub fn node(&self, element: &T) -> Option<&TaxonomyNode<T>> {
        self.nodes.get(element)
    }

    #[inline]
    pub fn equivalents(&self, element: &T) -> Option<&BTreeSet<T>> {
        Some(&self.nodes.get(element)?.equivalents)
    }

    #[inline]
    pub fn parents(&self, element: &T) -> Option<&BTreeSet<T>> {
        Some(&self.nodes.get(element)?.parents)
    }

    #[inline]
    pub fn children(&self, element: &T) -> Option<&BTreeSet<T>> {
        Some(&self.nodes.get(element)?.children)
    }

    #[inline]
    pub fn ancestors(&self, element: &T) -> Option<&BTreeSet<T>> {
        Some(&self.nodes.get(element)?.ancestors)
    }

    /// Checks if `sub` is subsumed by `sup`. Every element subsumes itself.
    pub fn is_subsumed_by(&self, sub: &T, sup: &T) -> bool {
        sub == sup
            || self
                .nodes
                .get(sub)
                .is_some_and(|node| node.ancestors.contains(sup))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, &TaxonomyNode<T>)> {
        self.nodes.iter()
    }

    /// Maps the elements to another type, dropping the ones `f` returns `None` for.
    pub fn filter_map<U: Eq + Hash + Ord + Clone>(
        &self,
        mut f: impl FnMut(&T) -> Option<U>,
    ) -> Taxonomy<U> {
        let mut mapping = FxHashMap::default();
        for element in self.nodes.keys() {
            if let Some(mapped) = f(element) {
                mapping.insert(element, mapped);
            }
        }
        let map_set = |set: &BTreeSet<T>| {
            set.iter()
                .filter_map(|element| mapping.get(element).cloned())
                .collect::<BTreeSet<_>>()
        };
        let nodes = self
            .nodes
            .iter()
            .filter_map(|(element, node)| {
                Some((
                    mapping.get(element)?.clone(),
                    TaxonomyNode {
                        equivalents: map_set(&node.equivalents),
                        parents: map_set(&node.parents),
                        children: map_set(&node.children),
                        ancestors: map_set(&node.ancestors),
                    },
                ))
            })
            .collect();
        Taxonomy { nodes }
    }
}

fn equivalents_of<T: Eq + Hash>(
    subsumers: &FxHashMap<T, FxHashSet<T>>,
    first: &T,
    second: &T,
) -> bool {
    subsumers.get(first).is_some_and(|s| s.contains(second))
        && subsumers.get(second).is_some_and(|s| s.contains(first))
}
