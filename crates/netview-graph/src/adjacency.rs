use netview_core::EdgeId;
use std::collections::HashSet;

/// Edges incident to a node. Handles only; the scene owns the edges.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    edges: HashSet<EdgeId>,
}

impl Adjacency {
    /// Returns `false` if the edge was already attached.
    pub fn attach(&mut self, edge: EdgeId) -> bool {
        self.edges.insert(edge)
    }

    /// Returns `false` if the edge was not attached.
    pub fn detach(&mut self, edge: EdgeId) -> bool {
        self.edges.remove(&edge)
    }

    pub fn contains(&self, edge: EdgeId) -> bool {
        self.edges.contains(&edge)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Unordered snapshot.
    pub fn snapshot(&self) -> Vec<EdgeId> {
        self.edges.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_is_idempotent() {
        let mut adjacency = Adjacency::default();
        assert!(adjacency.attach(EdgeId(1)));
        assert!(!adjacency.attach(EdgeId(1)));
        assert_eq!(adjacency.len(), 1);
    }

    #[test]
    fn test_detach_absent_is_noop() {
        let mut adjacency = Adjacency::default();
        adjacency.attach(EdgeId(1));
        assert!(!adjacency.detach(EdgeId(2)));
        assert_eq!(adjacency.snapshot(), vec![EdgeId(1)]);
        assert!(adjacency.detach(EdgeId(1)));
        assert!(adjacency.is_empty());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_matches_set_semantics(ops in proptest::collection::vec((any::<bool>(), 0i64..8), 0..64)) {
                let mut adjacency = Adjacency::default();
                let mut model = HashSet::new();
                for (attach, id) in ops {
                    if attach {
                        prop_assert_eq!(adjacency.attach(EdgeId(id)), model.insert(EdgeId(id)));
                    } else {
                        prop_assert_eq!(adjacency.detach(EdgeId(id)), model.remove(&EdgeId(id)));
                    }
                }
                let mut snapshot = adjacency.snapshot();
                snapshot.sort();
                let mut expected: Vec<_> = model.into_iter().collect();
                expected.sort();
                prop_assert_eq!(snapshot, expected);
            }
        }
    }
}
