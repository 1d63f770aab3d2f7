use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::traits::HasHydrogenCount;

/// Tetrahedral configuration of a stereocenter relative to its reference
/// atoms: looking from `refs[0]` towards the center, `refs[1..4]` appear
/// clockwise or counterclockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AtomConfiguration {
    #[default]
    None,
    Clockwise,
    CounterClockwise,
    /// Stereogenic but unspecified; drawn with a wavy bond.
    Either,
}

impl AtomConfiguration {
    pub fn inverted(self) -> Self {
        match self {
            Self::Clockwise => Self::CounterClockwise,
            Self::CounterClockwise => Self::Clockwise,
            other => other,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Self::Clockwise | Self::CounterClockwise)
    }
}

/// Configuration of a double bond relative to its two reference atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BondConfiguration {
    #[default]
    None,
    Cis,
    Trans,
    /// Stereogenic but unspecified.
    Either,
}

impl BondConfiguration {
    pub fn inverted(self) -> Self {
        match self {
            Self::Cis => Self::Trans,
            Self::Trans => Self::Cis,
            other => other,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Self::Cis | Self::Trans)
    }
}

/// Declared configuration of a stereocenter atom.
///
/// A `None` reference slot stands for an implicit hydrogen or a lone pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AtomStereoDescriptor {
    pub center: NodeIndex,
    pub refs: [Option<NodeIndex>; 4],
    pub config: AtomConfiguration,
}

impl AtomStereoDescriptor {
    /// Configuration of the same center expressed relative to `refs`.
    ///
    /// Returns `None` if `refs` is not a permutation of the descriptor's
    /// own reference slots.
    pub fn config_for(&self, refs: &[Option<NodeIndex>; 4]) -> Option<AtomConfiguration> {
        if !self.config.is_defined() {
            return Some(self.config);
        }
        let mut own = self.refs.to_vec();
        let mut other = refs.to_vec();
        own.sort();
        other.sort();
        if own != other {
            return None;
        }
        if permutation_parity(&self.refs, refs) {
            Some(self.config)
        } else {
            Some(self.config.inverted())
        }
    }
}

/// Declared configuration of a double bond `refs[1] = refs[2]` with the
/// reference substituents `refs[0]` (on `refs[1]`) and `refs[3]` (on
/// `refs[2]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BondStereoDescriptor {
    pub bond: EdgeIndex,
    pub refs: [NodeIndex; 4],
    pub config: BondConfiguration,
}

pub struct Mol<A, B> {
    graph: UnGraph<A, B>,
    atom_stereo: Vec<AtomStereoDescriptor>,
    bond_stereo: Vec<BondStereoDescriptor>,
}

impl<A, B> Mol<A, B> {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
            atom_stereo: Vec::new(),
            bond_stereo: Vec::new(),
        }
    }

    pub fn graph(&self) -> &UnGraph<A, B> {
        &self.graph
    }

    pub fn atom(&self, idx: NodeIndex) -> &A {
        &self.graph[idx]
    }

    pub fn atom_mut(&mut self, idx: NodeIndex) -> &mut A {
        &mut self.graph[idx]
    }

    pub fn bond(&self, idx: EdgeIndex) -> &B {
        &self.graph[idx]
    }

    pub fn bond_mut(&mut self, idx: EdgeIndex) -> &mut B {
        &mut self.graph[idx]
    }

    pub fn add_atom(&mut self, atom: A) -> NodeIndex {
        self.graph.add_node(atom)
    }

    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: B) -> EdgeIndex {
        self.graph.add_edge(a, b, bond)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges(idx).map(|e| e.id())
    }

    /// Incident bonds of `idx` paired with the atom on their other side.
    pub fn bonded_neighbors(
        &self,
        idx: NodeIndex,
    ) -> impl Iterator<Item = (EdgeIndex, NodeIndex)> + '_ {
        self.graph.edges(idx).map(move |e| {
            let other = if e.source() == idx {
                e.target()
            } else {
                e.source()
            };
            (e.id(), other)
        })
    }

    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges(idx).count()
    }

    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    pub fn bond_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    /// Begin and end atom of a bond, in storage order.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not a bond of this molecule, like [`bond`](Self::bond).
    pub fn endpoints(&self, idx: EdgeIndex) -> (NodeIndex, NodeIndex) {
        let edge = &self.graph.raw_edges()[idx.index()];
        (edge.source(), edge.target())
    }

    /// The atom of `bond` that is not `atom`.
    pub fn other_atom(&self, bond: EdgeIndex, atom: NodeIndex) -> NodeIndex {
        let (a, b) = self.endpoints(bond);
        if a == atom {
            b
        } else {
            a
        }
    }

    pub fn atom_stereo(&self) -> &[AtomStereoDescriptor] {
        &self.atom_stereo
    }

    pub fn set_atom_stereo(&mut self, stereo: Vec<AtomStereoDescriptor>) {
        self.atom_stereo = stereo;
    }

    pub fn atom_stereo_for(&self, center: NodeIndex) -> Option<&AtomStereoDescriptor> {
        self.atom_stereo.iter().find(|s| s.center == center)
    }

    pub fn add_atom_stereo(&mut self, stereo: AtomStereoDescriptor) {
        self.atom_stereo.retain(|s| s.center != stereo.center);
        self.atom_stereo.push(stereo);
    }

    pub fn bond_stereo(&self) -> &[BondStereoDescriptor] {
        &self.bond_stereo
    }

    pub fn set_bond_stereo(&mut self, stereo: Vec<BondStereoDescriptor>) {
        self.bond_stereo = stereo;
    }

    pub fn bond_stereo_for(&self, bond: EdgeIndex) -> Option<&BondStereoDescriptor> {
        self.bond_stereo.iter().find(|s| s.bond == bond)
    }

    pub fn add_bond_stereo(&mut self, stereo: BondStereoDescriptor) {
        self.bond_stereo.retain(|s| s.bond != stereo.bond);
        self.bond_stereo.push(stereo);
    }
}

impl<A: HasHydrogenCount, B> Mol<A, B> {
    /// Explicit neighbours plus implicit hydrogens.
    pub fn total_degree(&self, idx: NodeIndex) -> usize {
        self.degree(idx) + self.atom(idx).hydrogen_count() as usize
    }
}

impl<A: Clone, B: Clone> Clone for Mol<A, B> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            atom_stereo: self.atom_stereo.clone(),
            bond_stereo: self.bond_stereo.clone(),
        }
    }
}

impl<A, B> Default for Mol<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: std::fmt::Debug, B: std::fmt::Debug> std::fmt::Debug for Mol<A, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mol")
            .field("atom_count", &self.atom_count())
            .field("bond_count", &self.bond_count())
            .field("atom_stereo", &self.atom_stereo)
            .field("bond_stereo", &self.bond_stereo)
            .finish()
    }
}

/// `true` if `to` is an even permutation of `from`.
pub(crate) fn permutation_parity<T: Eq>(from: &[T], to: &[T]) -> bool {
    let n = from.len();
    if n != to.len() {
        return true;
    }
    let perm: Vec<usize> = from
        .iter()
        .map(|f| to.iter().position(|t| t == f).unwrap_or(0))
        .collect();
    let mut visited = vec![false; n];
    let mut swaps = 0usize;
    for i in 0..n {
        if visited[i] {
            continue;
        }
        let mut cycle_len = 0;
        let mut j = i;
        while !visited[j] {
            visited[j] = true;
            j = perm[j];
            cycle_len += 1;
        }
        swaps += cycle_len - 1;
    }
    swaps % 2 == 0
}
