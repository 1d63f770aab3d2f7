//! Atom symmetry classes and canonical numbering.
//!
//! Both start from per-atom invariants and refine them Morgan-style with
//! the sorted `(neighbour rank, bond order)` multiset of every atom until
//! the number of distinct ranks stops growing. Bond orders come from a
//! working assignment so the functions can run in the middle of a
//! perception pass.

use std::hash::{Hash, Hasher};

use petgraph::graph::NodeIndex;

use crate::error::{check_len, PerceptionError};
use crate::mol::Mol;
use crate::traits::{HasAtomicNum, HasFormalCharge, HasHydrogenCount, HasIsotope};

struct Fnv1aHasher(u64);

impl Fnv1aHasher {
    fn new() -> Self {
        Self(0xcbf29ce484222325)
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(0x100000001b3);
        }
    }
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct AtomInvariant {
    atomic_num: u8,
    degree: u8,
    hydrogen_count: u8,
    formal_charge: i8,
    isotope: u16,
    /// Incident bonds per order: undefined, single, double, triple.
    order_counts: [u8; 4],
}

fn atom_invariant<A, B>(mol: &Mol<A, B>, idx: NodeIndex, orders: &[u8]) -> AtomInvariant
where
    A: HasAtomicNum + HasFormalCharge + HasIsotope + HasHydrogenCount,
{
    let atom = mol.atom(idx);
    let mut order_counts = [0u8; 4];
    for e in mol.bonds_of(idx) {
        let slot = (orders[e.index()] as usize).min(3);
        order_counts[slot] += 1;
    }
    AtomInvariant {
        atomic_num: atom.atomic_num(),
        degree: mol.degree(idx) as u8,
        hydrogen_count: atom.hydrogen_count(),
        formal_charge: atom.formal_charge(),
        isotope: atom.isotope(),
        order_counts,
    }
}

fn hash_invariant(inv: &AtomInvariant) -> u64 {
    let mut h = Fnv1aHasher::new();
    inv.hash(&mut h);
    h.finish()
}

fn ranks_from_values(values: &[u64]) -> Vec<usize> {
    let n = values.len();
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by_key(|&i| values[i]);
    let mut ranks = vec![0usize; n];
    for i in 1..n {
        ranks[indices[i]] = if values[indices[i]] == values[indices[i - 1]] {
            ranks[indices[i - 1]]
        } else {
            i
        };
    }
    ranks
}

fn count_distinct(ranks: &[usize]) -> usize {
    let mut sorted: Vec<usize> = ranks.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

fn neighbor_signature<A, B>(
    mol: &Mol<A, B>,
    node: NodeIndex,
    orders: &[u8],
    ranks: &[usize],
) -> Vec<(usize, u8)> {
    let mut sig: Vec<(usize, u8)> = mol
        .bonded_neighbors(node)
        .map(|(e, nb)| (ranks[nb.index()], orders[e.index()]))
        .collect();
    sig.sort_unstable();
    sig
}

fn morgan_refine<A, B>(mol: &Mol<A, B>, orders: &[u8], ranks: &mut Vec<usize>) {
    let n = mol.atom_count();
    let mut prev_distinct = count_distinct(ranks);

    loop {
        let mut new_values = vec![0u64; n];
        for node in mol.atoms() {
            let i = node.index();
            let mut h = Fnv1aHasher::new();
            ranks[i].hash(&mut h);
            neighbor_signature(mol, node, orders, ranks).hash(&mut h);
            new_values[i] = h.finish();
        }
        let new_ranks = ranks_from_values(&new_values);
        let distinct = count_distinct(&new_ranks);
        if distinct <= prev_distinct {
            return;
        }
        *ranks = new_ranks;
        prev_distinct = distinct;
    }
}

fn initial_ranks<A, B>(mol: &Mol<A, B>, orders: &[u8]) -> (Vec<AtomInvariant>, Vec<usize>)
where
    A: HasAtomicNum + HasFormalCharge + HasIsotope + HasHydrogenCount,
{
    let invariants: Vec<AtomInvariant> = mol
        .atoms()
        .map(|i| atom_invariant(mol, i, orders))
        .collect();
    let values: Vec<u64> = invariants.iter().map(hash_invariant).collect();
    (invariants, ranks_from_values(&values))
}

/// Topological symmetry class of every atom.
///
/// Atoms with equal values are indistinguishable by element, charge,
/// isotope, hydrogen count and bonding pattern. Class values are ranks:
/// they are comparable but not contiguous.
pub fn symmetry_classes<A, B>(mol: &Mol<A, B>, orders: &[u8]) -> Result<Vec<usize>, PerceptionError>
where
    A: HasAtomicNum + HasFormalCharge + HasIsotope + HasHydrogenCount,
{
    check_len(mol.bond_count(), orders.len())?;
    let (_, mut ranks) = initial_ranks(mol, orders);
    morgan_refine(mol, orders, &mut ranks);
    Ok(ranks)
}

/// Canonical number of every atom, a permutation of `0..atom_count`.
///
/// `numbering` is resized to the atom count; it is left untouched on
/// error.
pub fn calc_canonical_numbering<A, B>(
    mol: &Mol<A, B>,
    orders: &[u8],
    numbering: &mut Vec<usize>,
) -> Result<(), PerceptionError>
where
    A: HasAtomicNum + HasFormalCharge + HasIsotope + HasHydrogenCount,
{
    check_len(mol.bond_count(), orders.len())?;
    let n = mol.atom_count();
    let (invariants, mut ranks) = initial_ranks(mol, orders);
    morgan_refine(mol, orders, &mut ranks);
    if count_distinct(&ranks) < n {
        break_ties(mol, orders, &mut ranks, &invariants);
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by_key(|&i| ranks[i]);
    numbering.clear();
    numbering.resize(n, 0);
    for (rank, &atom_idx) in indices.iter().enumerate() {
        numbering[atom_idx] = rank;
    }
    Ok(())
}

fn break_ties<A, B>(
    mol: &Mol<A, B>,
    orders: &[u8],
    ranks: &mut Vec<usize>,
    invariants: &[AtomInvariant],
) {
    let n = ranks.len();

    while count_distinct(ranks) < n {
        let min_tied_rank = match lowest_tied_rank(ranks) {
            Some(r) => r,
            None => return,
        };
        let tied_atoms: Vec<usize> = (0..n).filter(|&i| ranks[i] == min_tied_rank).collect();
        let max_rank = ranks.iter().copied().max().unwrap_or(0);

        // Promote each tied atom in turn and keep the refinement whose
        // invariant trace is lexicographically smallest; the choice does
        // not depend on input numbering.
        let mut best: Option<(Vec<u64>, Vec<usize>)> = None;
        for &candidate in &tied_atoms {
            let mut trial = ranks.clone();
            trial[candidate] = max_rank + 1;
            morgan_refine(mol, orders, &mut trial);

            let mut indexed: Vec<(usize, usize)> = trial.iter().copied().enumerate().collect();
            indexed.sort_by_key(|&(_, r)| r);
            let trace: Vec<u64> = indexed
                .iter()
                .map(|&(atom_i, _)| {
                    let mut h = Fnv1aHasher::new();
                    invariants[atom_i].hash(&mut h);
                    neighbor_signature(mol, NodeIndex::new(atom_i), orders, &trial).hash(&mut h);
                    h.finish()
                })
                .collect();
            if best.as_ref().is_none_or(|(t, _)| trace < *t) {
                best = Some((trace, trial));
            }
        }

        match best {
            Some((_, trial)) => *ranks = trial,
            None => return,
        }
    }
}

fn lowest_tied_rank(ranks: &[usize]) -> Option<usize> {
    let mut sorted = ranks.to_vec();
    sorted.sort_unstable();
    sorted.windows(2).find(|w| w[0] == w[1]).map(|w| w[0])
}
