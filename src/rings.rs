//! Smallest set of smallest rings.
//!
//! Candidate cycles are generated Horton-style (one cycle per bond and
//! apex atom from shortest paths) and then selected greedily by size into
//! a cycle basis over GF(2), with edge bitvectors as basis rows. Each ring
//! is stored both as an atom cycle and as the list of its bonds, because
//! the perception algorithms mostly ask bond questions.

use std::collections::VecDeque;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::mol::Mol;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ring {
    /// Atoms in cycle order, starting at the lowest index.
    pub atoms: Vec<NodeIndex>,
    /// Bonds in cycle order: `bonds[i]` joins `atoms[i]` and `atoms[i + 1]`.
    pub bonds: Vec<EdgeIndex>,
}

impl Ring {
    pub fn size(&self) -> usize {
        self.atoms.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RingInfo {
    rings: Vec<Ring>,
    bond_rings: Vec<Vec<usize>>,
    atom_rings: Vec<Vec<usize>>,
}

impl RingInfo {
    pub fn sssr<A, B>(mol: &Mol<A, B>) -> Self {
        let mut info = Self {
            rings: Vec::new(),
            bond_rings: vec![Vec::new(); mol.bond_count()],
            atom_rings: vec![Vec::new(); mol.atom_count()],
        };
        let num_expected = Self::expected_ring_count(mol);
        if num_expected == 0 {
            return info;
        }

        let words = mol.bond_count().div_ceil(64);
        let mut basis: Vec<Vec<u64>> = Vec::with_capacity(num_expected);

        for cycle in horton_candidates(mol) {
            if info.rings.len() >= num_expected {
                break;
            }
            let ring = match ring_from_cycle(mol, &cycle) {
                Some(r) => r,
                None => continue,
            };
            let mut bv = vec![0u64; words];
            for e in &ring.bonds {
                bv[e.index() / 64] |= 1u64 << (e.index() % 64);
            }
            if try_add_to_basis(&mut basis, bv) {
                info.rings.push(ring);
            }
        }

        info.rings
            .sort_by(|a, b| a.size().cmp(&b.size()).then_with(|| a.atoms.cmp(&b.atoms)));
        for (ri, ring) in info.rings.iter().enumerate() {
            for e in &ring.bonds {
                info.bond_rings[e.index()].push(ri);
            }
            for a in &ring.atoms {
                info.atom_rings[a.index()].push(ri);
            }
        }
        info
    }

    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn is_ring_atom(&self, atom: NodeIndex) -> bool {
        self.atom_rings
            .get(atom.index())
            .is_some_and(|r| !r.is_empty())
    }

    pub fn is_ring_bond(&self, bond: EdgeIndex) -> bool {
        self.bond_rings
            .get(bond.index())
            .is_some_and(|r| !r.is_empty())
    }

    /// Rings of the SSSR that contain `bond`.
    pub fn bond_rings(&self, bond: EdgeIndex) -> impl Iterator<Item = &Ring> + '_ {
        self.bond_rings
            .get(bond.index())
            .into_iter()
            .flatten()
            .map(move |&ri| &self.rings[ri])
    }

    pub fn atom_rings(&self, atom: NodeIndex) -> impl Iterator<Item = &Ring> + '_ {
        self.atom_rings
            .get(atom.index())
            .into_iter()
            .flatten()
            .map(move |&ri| &self.rings[ri])
    }

    pub fn smallest_atom_ring_size(&self, atom: NodeIndex) -> Option<usize> {
        self.atom_rings(atom).map(Ring::size).min()
    }

    pub fn smallest_bond_ring_size(&self, bond: EdgeIndex) -> Option<usize> {
        self.bond_rings(bond).map(Ring::size).min()
    }

    /// Cyclomatic number `E - V + C`.
    pub fn expected_ring_count<A, B>(mol: &Mol<A, B>) -> usize {
        let v = mol.atom_count();
        let e = mol.bond_count();
        let c = petgraph::algo::connected_components(mol.graph());
        (e + c).saturating_sub(v)
    }
}

fn horton_candidates<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>> {
    let n = mol.atom_count();
    let trees: Vec<ShortestPathTree> = (0..n)
        .map(|i| ShortestPathTree::new(mol, NodeIndex::new(i)))
        .collect();

    let mut candidates: Vec<Vec<NodeIndex>> = Vec::new();
    for edge in mol.bonds() {
        let (u, v) = mol.endpoints(edge);
        for tree in &trees {
            let (du, dv) = match (tree.dist[u.index()], tree.dist[v.index()]) {
                (Some(du), Some(dv)) => (du, dv),
                _ => continue,
            };
            if du + dv + 1 < 3 {
                continue;
            }
            let path_u = tree.path_to(u);
            let path_v = tree.path_to(v);
            if path_u[1..].iter().any(|a| path_v[1..].contains(a)) {
                continue;
            }
            let mut cycle = path_u;
            cycle.extend(path_v[1..].iter().rev());
            candidates.push(normalize_cycle(&cycle));
        }
    }

    candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    candidates.dedup();
    candidates
}

struct ShortestPathTree {
    root: NodeIndex,
    dist: Vec<Option<usize>>,
    pred: Vec<Option<NodeIndex>>,
}

impl ShortestPathTree {
    fn new<A, B>(mol: &Mol<A, B>, root: NodeIndex) -> Self {
        let n = mol.atom_count();
        let mut dist = vec![None; n];
        let mut pred = vec![None; n];
        dist[root.index()] = Some(0);
        let mut queue = VecDeque::from([root]);
        while let Some(cur) = queue.pop_front() {
            let d = dist[cur.index()].unwrap_or(0);
            let mut nbrs: Vec<NodeIndex> = mol.neighbors(cur).collect();
            nbrs.sort();
            for nb in nbrs {
                if dist[nb.index()].is_none() {
                    dist[nb.index()] = Some(d + 1);
                    pred[nb.index()] = Some(cur);
                    queue.push_back(nb);
                }
            }
        }
        Self { root, dist, pred }
    }

    /// Path from the root to `target`, both included.
    fn path_to(&self, target: NodeIndex) -> Vec<NodeIndex> {
        let mut path = vec![target];
        let mut cur = target;
        while cur != self.root {
            match self.pred[cur.index()] {
                Some(p) => {
                    path.push(p);
                    cur = p;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }
}

fn ring_from_cycle<A, B>(mol: &Mol<A, B>, cycle: &[NodeIndex]) -> Option<Ring> {
    let len = cycle.len();
    let bonds = (0..len)
        .map(|i| mol.bond_between(cycle[i], cycle[(i + 1) % len]))
        .collect::<Option<Vec<_>>>()?;
    Some(Ring {
        atoms: cycle.to_vec(),
        bonds,
    })
}

fn try_add_to_basis(basis: &mut Vec<Vec<u64>>, candidate: Vec<u64>) -> bool {
    let mut v = candidate;
    for row in basis.iter() {
        if let Some(p) = lowest_bit(row) {
            if v[p / 64] & (1u64 << (p % 64)) != 0 {
                for (vw, rw) in v.iter_mut().zip(row) {
                    *vw ^= *rw;
                }
            }
        }
    }
    if v.iter().all(|&w| w == 0) {
        return false;
    }
    // Keep rows reduced against each other so the pivot test above stays exact.
    let pivot = lowest_bit(&v);
    if let Some(p) = pivot {
        for row in basis.iter_mut() {
            if row[p / 64] & (1u64 << (p % 64)) != 0 {
                for (rw, vw) in row.iter_mut().zip(&v) {
                    *rw ^= *vw;
                }
            }
        }
    }
    basis.push(v);
    true
}

fn lowest_bit(bv: &[u64]) -> Option<usize> {
    bv.iter()
        .enumerate()
        .find(|(_, &w)| w != 0)
        .map(|(i, &w)| i * 64 + w.trailing_zeros() as usize)
}

fn normalize_cycle(cycle: &[NodeIndex]) -> Vec<NodeIndex> {
    let len = cycle.len();
    let min_pos = match cycle.iter().enumerate().min_by_key(|&(_, a)| a) {
        Some((i, _)) => i,
        None => return Vec::new(),
    };
    let mut out: Vec<NodeIndex> = (0..len).map(|i| cycle[(min_pos + i) % len]).collect();
    if len > 2 && out[1] > out[len - 1] {
        out[1..].reverse();
    }
    out
}
