//! Maximal one-to-one alignments between two entity sets.
//!
//! Every compatible pair `(i, j)` of a first and a second entity becomes a
//! node of a compatibility graph; two pairs are joined when they map
//! distinct entities and are consistent with each other. Alignments are
//! the maximal cliques of that graph.

use petgraph::graph::{NodeIndex, UnGraph};
use tracing::debug;

use crate::clique::BronKerbosch;
use crate::mol::Mol;
use crate::traits::{HasAtomicNum, HasBondOrder};

type EntityMatch<'a, E> = Box<dyn Fn(&E, &E) -> bool + 'a>;
type EntityPairMatch<'a, E> = Box<dyn Fn(&E, &E, &E, &E) -> bool + 'a>;

pub struct TopologicalEntityAligner<'a, E> {
    first: Vec<E>,
    second: Vec<E>,
    entity_match: Option<EntityMatch<'a, E>>,
    pair_match: Option<EntityPairMatch<'a, E>>,
    min_alignment_size: usize,
    pairs: Vec<(usize, usize)>,
    cliques: BronKerbosch,
    clique: Vec<NodeIndex>,
    dirty: bool,
}

impl<E> Default for TopologicalEntityAligner<'_, E> {
    fn default() -> Self {
        Self {
            first: Vec::new(),
            second: Vec::new(),
            entity_match: None,
            pair_match: None,
            min_alignment_size: 1,
            pairs: Vec::new(),
            cliques: BronKerbosch::new(),
            clique: Vec::new(),
            dirty: true,
        }
    }
}

impl<'a, E> TopologicalEntityAligner<'a, E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_first_entity(&mut self, entity: E) {
        self.first.push(entity);
        self.dirty = true;
    }

    pub fn add_second_entity(&mut self, entity: E) {
        self.second.push(entity);
        self.dirty = true;
    }

    pub fn first_entities(&self) -> &[E] {
        &self.first
    }

    pub fn second_entities(&self) -> &[E] {
        &self.second
    }

    pub fn clear_entities(&mut self, first: bool, second: bool) {
        if first {
            self.first.clear();
        }
        if second {
            self.second.clear();
        }
        self.dirty = true;
    }

    /// Predicate deciding whether a first entity may map onto a second one.
    /// Without one every pair is compatible.
    pub fn set_entity_match_function(&mut self, f: impl Fn(&E, &E) -> bool + 'a) {
        self.entity_match = Some(Box::new(f));
        self.dirty = true;
    }

    /// Predicate `(a1, b1, a2, b2)` deciding whether the mappings `a1 -> b1`
    /// and `a2 -> b2` may appear in the same alignment.
    pub fn set_entity_pair_match_function(&mut self, f: impl Fn(&E, &E, &E, &E) -> bool + 'a) {
        self.pair_match = Some(Box::new(f));
        self.dirty = true;
    }

    pub fn set_min_alignment_size(&mut self, size: usize) {
        self.min_alignment_size = size;
    }

    pub fn min_alignment_size(&self) -> usize {
        self.min_alignment_size
    }

    /// Build the compatibility graph and restart the enumeration.
    pub fn init(&mut self) {
        self.pairs.clear();
        for (i, a) in self.first.iter().enumerate() {
            for (j, b) in self.second.iter().enumerate() {
                if self.entity_match.as_ref().map_or(true, |f| f(a, b)) {
                    self.pairs.push((i, j));
                }
            }
        }

        let mut graph = UnGraph::<(), ()>::with_capacity(self.pairs.len(), 0);
        let nodes: Vec<NodeIndex> = self.pairs.iter().map(|_| graph.add_node(())).collect();
        for (x, &(i1, j1)) in self.pairs.iter().enumerate() {
            for (y, &(i2, j2)) in self.pairs.iter().enumerate().skip(x + 1) {
                if i1 == i2 || j1 == j2 {
                    continue;
                }
                let consistent = self.pair_match.as_ref().map_or(true, |f| {
                    f(&self.first[i1], &self.second[j1], &self.first[i2], &self.second[j2])
                });
                if consistent {
                    graph.add_edge(nodes[x], nodes[y], ());
                }
            }
        }
        debug!(pairs = self.pairs.len(), edges = graph.edge_count(), "compatibility graph");
        self.cliques.init(&graph);
        self.dirty = false;
    }

    /// Write the next alignment as `(first, second)` index pairs. Returns
    /// `false` when none is left. Re-initialises after entity changes.
    pub fn next_alignment(&mut self, alignment: &mut Vec<(usize, usize)>) -> bool {
        if self.dirty {
            self.init();
        }
        while self.cliques.next_clique(&mut self.clique) {
            if self.clique.len() < self.min_alignment_size {
                continue;
            }
            alignment.clear();
            alignment.extend(self.clique.iter().map(|n| self.pairs[n.index()]));
            alignment.sort();
            return true;
        }
        false
    }
}

/// Aligner over the atoms of two molecules: atoms map onto atoms of the
/// same element, and two mappings are consistent when the atoms are bonded
/// in both molecules with the same order or bonded in neither.
pub fn topological_atom_aligner<'a, A, B>(
    first: &'a Mol<A, B>,
    second: &'a Mol<A, B>,
) -> TopologicalEntityAligner<'a, NodeIndex>
where
    A: HasAtomicNum,
    B: HasBondOrder,
{
    let mut aligner = TopologicalEntityAligner::new();
    for atom in first.atoms() {
        aligner.add_first_entity(atom);
    }
    for atom in second.atoms() {
        aligner.add_second_entity(atom);
    }
    aligner.set_entity_match_function(move |&a, &b| first.atom(a).atomic_num() == second.atom(b).atomic_num());
    aligner.set_entity_pair_match_function(move |&a1, &b1, &a2, &b2| {
        let order = |mol: &Mol<A, B>, x, y| mol.bond_between(x, y).map(|e| mol.bond(e).bond_order());
        order(first, a1, a2) == order(second, b1, b2)
    });
    aligner
}
