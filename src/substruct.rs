//! Substructure matching used by the functional-group phase of bond order
//! perception.
//!
//! Embeddings come from petgraph's VF2 subgraph isomorphism search run on
//! index-weighted copies of both graphs, so the predicates can look at
//! per-run state by index. Matching is induced: two mapped target atoms
//! are bonded exactly when their query atoms are. The functional-group
//! library only holds stars and chains ending in terminal atoms, where
//! this makes no difference.

use petgraph::algo::subgraph_isomorphisms_iter;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};

use crate::mol::Mol;

/// Query-to-target atom pairs.
pub type AtomMapping = Vec<(NodeIndex, NodeIndex)>;

/// One embedding of a query in a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstructMatch {
    /// `(query atom, target atom)` pairs, sorted by query atom.
    pub atoms: AtomMapping,
    /// `(query bond, target bond)` pairs, sorted by query bond.
    pub bonds: Vec<(EdgeIndex, EdgeIndex)>,
}

impl SubstructMatch {
    pub fn target_atom(&self, query_atom: NodeIndex) -> Option<NodeIndex> {
        self.atoms
            .iter()
            .find(|(q, _)| *q == query_atom)
            .map(|&(_, t)| t)
    }

    pub fn target_bond(&self, query_bond: EdgeIndex) -> Option<EdgeIndex> {
        self.bonds
            .iter()
            .find(|(q, _)| *q == query_bond)
            .map(|&(_, t)| t)
    }
}

/// Source of query embeddings.
///
/// Predicates receive indices rather than atom and bond values so callers
/// can consult per-run state (working bond orders, perceived geometries)
/// while matching. Implementations must be pure: the same inputs always
/// produce the same matches in the same order.
pub trait SubstructurePatternOracle {
    fn find_matches<A1, B1, A2, B2>(
        &self,
        target: &Mol<A1, B1>,
        query: &Mol<A2, B2>,
        atom_match: &dyn Fn(NodeIndex, NodeIndex) -> bool,
        bond_match: &dyn Fn(EdgeIndex, EdgeIndex) -> bool,
    ) -> Vec<SubstructMatch>;
}

/// Default oracle backed by petgraph's VF2 matcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vf2Oracle {
    /// Stop after this many matches; `0` means no limit.
    pub max_matches: usize,
}

impl SubstructurePatternOracle for Vf2Oracle {
    fn find_matches<A1, B1, A2, B2>(
        &self,
        target: &Mol<A1, B1>,
        query: &Mol<A2, B2>,
        atom_match: &dyn Fn(NodeIndex, NodeIndex) -> bool,
        bond_match: &dyn Fn(EdgeIndex, EdgeIndex) -> bool,
    ) -> Vec<SubstructMatch> {
        if query.atom_count() == 0 {
            return vec![SubstructMatch {
                atoms: Vec::new(),
                bonds: Vec::new(),
            }];
        }
        let query_view: UnGraph<NodeIndex, EdgeIndex> = query.graph().map(|n, _| n, |e, _| e);
        let target_view: UnGraph<NodeIndex, EdgeIndex> = target.graph().map(|n, _| n, |e, _| e);
        let (q, t) = (&query_view, &target_view);
        let mut node_match = |qa: &NodeIndex, ta: &NodeIndex| atom_match(*ta, *qa);
        let mut edge_match = |qb: &EdgeIndex, tb: &EdgeIndex| bond_match(*tb, *qb);
        let mappings = match subgraph_isomorphisms_iter(&q, &t, &mut node_match, &mut edge_match) {
            Some(iter) => iter,
            None => return Vec::new(),
        };
        let limit = if self.max_matches == 0 { usize::MAX } else { self.max_matches };
        mappings
            .filter_map(|mapping| embedding(target, query, &mapping))
            .take(limit)
            .collect()
    }
}

/// All embeddings of `query` in `target` under value-level predicates.
pub fn get_substruct_matches_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(&A1, &A2) -> bool,
    bond_match: impl Fn(&B1, &B2) -> bool,
) -> Vec<SubstructMatch> {
    let am = |t: NodeIndex, q: NodeIndex| atom_match(target.atom(t), query.atom(q));
    let bm = |t: EdgeIndex, q: EdgeIndex| bond_match(target.bond(t), query.bond(q));
    Vf2Oracle::default().find_matches(target, query, &am, &bm)
}

pub fn has_substruct_match_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(&A1, &A2) -> bool,
    bond_match: impl Fn(&B1, &B2) -> bool,
) -> bool {
    let am = |t: NodeIndex, q: NodeIndex| atom_match(target.atom(t), query.atom(q));
    let bm = |t: EdgeIndex, q: EdgeIndex| bond_match(target.bond(t), query.bond(q));
    !Vf2Oracle { max_matches: 1 }
        .find_matches(target, query, &am, &bm)
        .is_empty()
}

/// Match for a VF2 mapping, where `mapping[q]` is the target atom of query
/// atom `q`.
fn embedding<A1, B1, A2, B2>(target: &Mol<A1, B1>, query: &Mol<A2, B2>, mapping: &[usize]) -> Option<SubstructMatch> {
    let atoms: AtomMapping = mapping
        .iter()
        .enumerate()
        .map(|(q, &t)| (NodeIndex::new(q), NodeIndex::new(t)))
        .collect();
    let bonds = query
        .bonds()
        .map(|qb| {
            let (qa, qc) = query.endpoints(qb);
            let ta = NodeIndex::new(*mapping.get(qa.index())?);
            let tc = NodeIndex::new(*mapping.get(qc.index())?);
            target.bond_between(ta, tc).map(|tb| (qb, tb))
        })
        .collect::<Option<Vec<_>>>()?;
    Some(SubstructMatch { atoms, bonds })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::build;
    use crate::{Atom, Bond};

    fn same_element(t: &Atom, q: &Atom) -> bool {
        t.atomic_num == q.atomic_num
    }

    fn same_order(t: &Bond, q: &Bond) -> bool {
        t.order == q.order
    }

    fn any_bond(_t: &Bond, _q: &Bond) -> bool {
        true
    }

    fn propane() -> Mol<Atom, Bond> {
        build(&[(6, 0, 3), (6, 0, 2), (6, 0, 3)], &[(0, 1, 1), (1, 2, 1)])
    }

    fn ethane_query() -> Mol<Atom, Bond> {
        build(&[(6, 0, 0), (6, 0, 0)], &[(0, 1, 1)])
    }

    fn cyclohexane() -> Mol<Atom, Bond> {
        let bonds: Vec<(usize, usize, u8)> = (0..6).map(|i| (i, (i + 1) % 6, 1)).collect();
        build(&[(6, 0, 2); 6], &bonds)
    }

    #[test]
    fn propane_cc_matches() {
        let matches = get_substruct_matches_with(&propane(), &ethane_query(), same_element, same_order);
        assert_eq!(matches.len(), 4);
    }

    #[test]
    fn cyclohexane_cc_matches_cover_all_edges() {
        let target = cyclohexane();
        let matches = get_substruct_matches_with(&target, &ethane_query(), same_element, same_order);
        assert_eq!(matches.len(), 12);
        for m in &matches {
            let t0 = m.target_atom(NodeIndex::new(0)).unwrap();
            let t1 = m.target_atom(NodeIndex::new(1)).unwrap();
            let tb = m.target_bond(EdgeIndex::new(0)).unwrap();
            assert_eq!(target.bond_between(t0, t1), Some(tb));
        }
    }

    #[test]
    fn ring_automorphisms_are_distinct() {
        let target = cyclohexane();
        let matches = get_substruct_matches_with(&target, &target, same_element, same_order);
        assert_eq!(matches.len(), 12);
        for (i, a) in matches.iter().enumerate() {
            for b in matches.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert!(matches.iter().all(|m| m.bonds.len() == 6));
    }

    #[test]
    fn bond_order_mismatch_rejects() {
        let target = build(&[(6, 0, 2), (6, 0, 2)], &[(0, 1, 2)]);
        assert!(!has_substruct_match_with(&target, &ethane_query(), same_element, same_order));
        assert!(has_substruct_match_with(&target, &ethane_query(), same_element, any_bond));
    }

    #[test]
    fn empty_query_matches_once() {
        let query = Mol::<Atom, Bond>::new();
        let matches = get_substruct_matches_with(&propane(), &query, same_element, same_order);
        assert_eq!(matches.len(), 1);
        assert!(matches[0].atoms.is_empty());
    }

    #[test]
    fn query_larger_than_target_no_match() {
        let target = build(&[(6, 0, 4)], &[]);
        assert!(!has_substruct_match_with(&target, &propane(), same_element, same_order));
    }

    #[test]
    fn disconnected_query_components() {
        let target = build(&[(11, 1, 0), (17, -1, 0)], &[]);
        let query = build(&[(17, 0, 0), (11, 0, 0)], &[]);
        let matches = get_substruct_matches_with(&target, &query, same_element, any_bond);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].target_atom(NodeIndex::new(0)), Some(NodeIndex::new(1)));
    }

    #[test]
    fn index_predicates_see_run_state() {
        // Only target atom 2 is allowed for the terminal query carbon.
        let target = propane();
        let query = ethane_query();
        let allowed = [false, true, true];
        let am = |t: NodeIndex, q: NodeIndex| q.index() == 0 || allowed[t.index()];
        let bm = |_t: EdgeIndex, _q: EdgeIndex| true;
        let matches = Vf2Oracle::default().find_matches(&target, &query, &am, &bm);
        assert_eq!(matches.len(), 3);
        assert_eq!(Vf2Oracle { max_matches: 1 }.find_matches(&target, &query, &am, &bm).len(), 1);
    }

    #[test]
    fn matching_is_induced() {
        let cyclopropane = build(&[(6, 0, 2); 3], &[(0, 1, 1), (1, 2, 1), (2, 0, 1)]);
        assert!(!has_substruct_match_with(&cyclopropane, &propane(), same_element, same_order));
        assert!(has_substruct_match_with(&propane(), &propane(), same_element, same_order));
    }
}
