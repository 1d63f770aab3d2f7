//! Resonance structure enumeration.
//!
//! Starting from a fully defined structure, single electron shifts are
//! applied until no new structure appears. A shift changes the order of
//! one bond by one and moves one unit of formal charge between its two
//! atoms: forming a bond turns a lone pair of the donor into a bonding
//! pair, breaking one leaves both electrons on one atom. A shift is legal
//! when both atoms end up in a valid valence state. The closure is
//! computed breadth first; the output is then filtered by octet
//! violations and charge count.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};

use petgraph::graph::{EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::conjugation::assign_conjugation;
use crate::element::{outer_shell_electrons, period};
use crate::error::PerceptionError;
use crate::mol::Mol;
use crate::traits::{HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};
use crate::valence::{allowed_valences, bond_order_sum, octet_electron_count, total_valence};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResonanceOptions {
    /// Charge pairs an intermediate structure may carry beyond those of
    /// the input.
    pub max_extra_charge_pairs: usize,
    /// Output structures may have at most this many more charged atoms
    /// than the least charged one.
    pub charge_count_window: usize,
    /// Keep only structures with the fewest octet violations among
    /// second-period atoms.
    pub minimize_octet_violations: bool,
    /// Output limit; 0 = unlimited.
    pub max_num_structures: usize,
}

impl Default for ResonanceOptions {
    fn default() -> Self {
        Self {
            max_extra_charge_pairs: 2,
            charge_count_window: 2,
            minimize_octet_violations: true,
            max_num_structures: 0,
        }
    }
}

/// One resonance structure: a formal charge per atom and an order per bond.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResonanceStructure {
    pub atom_charges: Vec<i8>,
    pub bond_orders: Vec<u8>,
}

impl ResonanceStructure {
    fn charged_atoms(&self) -> usize {
        self.atom_charges.iter().filter(|&&q| q != 0).count()
    }

    fn charge_separation(&self) -> usize {
        self.atom_charges.iter().map(|q| q.unsigned_abs() as usize).sum()
    }
}

fn key_of(charges: &[i8], orders: &[u8]) -> u64 {
    let mut h = DefaultHasher::new();
    charges.hash(&mut h);
    orders.hash(&mut h);
    h.finish()
}

/// Enumerates resonance structures and keeps them between calls.
///
/// Structures live in an arena that is recycled through a free list by
/// the next call to [`generate`](Self::generate).
#[derive(Debug, Clone, Default)]
pub struct ResonanceStructureGenerator {
    options: ResonanceOptions,
    arena: Vec<ResonanceStructure>,
    free: Vec<usize>,
    generated: Vec<usize>,
    output: Vec<usize>,
}

impl ResonanceStructureGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ResonanceOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &ResonanceOptions {
        &self.options
    }

    pub fn set_minimize_octet_violations(&mut self, minimize: bool) {
        self.options.minimize_octet_violations = minimize;
    }

    pub fn set_charge_count_window(&mut self, window: usize) {
        self.options.charge_count_window = window;
    }

    pub fn set_max_num_structures(&mut self, max: usize) {
        self.options.max_num_structures = max;
    }

    pub fn num_structures(&self) -> usize {
        self.output.len()
    }

    pub fn structure(&self, idx: usize) -> Option<&ResonanceStructure> {
        self.output.get(idx).map(|&i| &self.arena[i])
    }

    pub fn structures(&self) -> impl Iterator<Item = &ResonanceStructure> + '_ {
        self.output.iter().map(|&i| &self.arena[i])
    }

    fn recycle(&mut self) {
        self.free.append(&mut self.generated);
        self.output.clear();
    }

    fn alloc(&mut self, charges: &[i8], orders: &[u8]) -> usize {
        let idx = match self.free.pop() {
            Some(i) => {
                let s = &mut self.arena[i];
                s.atom_charges.clear();
                s.atom_charges.extend_from_slice(charges);
                s.bond_orders.clear();
                s.bond_orders.extend_from_slice(orders);
                i
            }
            None => {
                self.arena.push(ResonanceStructure {
                    atom_charges: charges.to_vec(),
                    bond_orders: orders.to_vec(),
                });
                self.arena.len() - 1
            }
        };
        self.generated.push(idx);
        idx
    }

    /// Enumerate the resonance structures of `mol` and return how many
    /// passed the output filters. Every bond order must be defined.
    pub fn generate<A, B>(&mut self, mol: &Mol<A, B>) -> Result<usize, PerceptionError>
    where
        A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
        B: HasBondOrder,
    {
        let mut orders = Vec::with_capacity(mol.bond_count());
        for e in mol.bonds() {
            match mol.bond(e).bond_order() {
                Some(o) => orders.push(o.as_u8()),
                None => return Err(PerceptionError::UndefinedBondOrder(e)),
            }
        }
        let charges: Vec<i8> = mol.atoms().map(|a| mol.atom(a).formal_charge()).collect();

        self.recycle();
        let active = resonance_bonds(mol, &orders, &charges);
        let input = self.alloc(&charges, &orders);
        let limit = self.arena[input].charge_separation() + 2 * self.options.max_extra_charge_pairs;

        let mut index: HashMap<u64, Vec<usize>> = HashMap::new();
        index.entry(key_of(&charges, &orders)).or_default().push(input);
        let mut queue = VecDeque::from([input]);
        let mut scratch = ResonanceStructure::default();

        while let Some(current) = queue.pop_front() {
            for &(bond, a, b) in &active {
                for delta in [1i8, -1] {
                    for (plus, minus) in [(a, b), (b, a)] {
                        scratch.clone_from(&self.arena[current]);
                        if !shift_electrons(mol, &mut scratch, bond, delta, plus, minus)
                            || scratch.charge_separation() > limit
                        {
                            continue;
                        }
                        let key = key_of(&scratch.atom_charges, &scratch.bond_orders);
                        let bucket = index.entry(key).or_default();
                        if bucket.iter().any(|&i| self.arena[i] == scratch) {
                            continue;
                        }
                        let idx = self.alloc(&scratch.atom_charges, &scratch.bond_orders);
                        bucket.push(idx);
                        queue.push_back(idx);
                    }
                }
            }
        }
        trace!(generated = self.generated.len(), bonds = active.len(), "resonance closure");

        self.select_output(mol);
        debug!(structures = self.output.len(), generated = self.generated.len(), "resonance structures");
        Ok(self.output.len())
    }

    fn select_output<A, B>(&mut self, mol: &Mol<A, B>)
    where
        A: HasAtomicNum + HasHydrogenCount,
    {
        let mut candidates: Vec<usize> = self.generated.clone();
        if self.options.minimize_octet_violations {
            let violations: Vec<usize> = candidates
                .iter()
                .map(|&i| octet_violations(mol, &self.arena[i]))
                .collect();
            let min = violations.iter().copied().min().unwrap_or(0);
            candidates = candidates
                .into_iter()
                .zip(violations)
                .filter(|&(_, v)| v == min)
                .map(|(i, _)| i)
                .collect();
        }
        let min_charged = candidates
            .iter()
            .map(|&i| self.arena[i].charged_atoms())
            .min()
            .unwrap_or(0);
        let window = self.options.charge_count_window;
        candidates.retain(|&i| self.arena[i].charged_atoms() <= min_charged + window);

        let max = self.options.max_num_structures;
        if max > 0 && candidates.len() > max {
            warn!(found = candidates.len(), max, "resonance structure limit reached");
            candidates.truncate(max);
        }
        self.output = candidates;
    }
}

/// Bonds that can take part in an electron shift, with their end atoms.
/// Both atoms need a valence model and a pi bond, a lone pair, a charge
/// or a conjugated bond.
fn resonance_bonds<A, B>(mol: &Mol<A, B>, orders: &[u8], charges: &[i8]) -> Vec<(EdgeIndex, NodeIndex, NodeIndex)>
where
    A: HasAtomicNum + HasHydrogenCount,
{
    let conjugated = assign_conjugation(mol, orders, charges);
    let can_shift: Vec<bool> = mol
        .atoms()
        .map(|atom| {
            let z = mol.atom(atom).atomic_num();
            let q = charges[atom.index()];
            if z == 1 || allowed_valences(z, q).is_empty() {
                return false;
            }
            let multiple = mol.bonds_of(atom).any(|e| orders[e.index()] > 1);
            let lone_pair = outer_shell_electrons(z) as i16 - q as i16 - total_valence(mol, atom, orders) as i16 >= 2;
            q != 0 || multiple || lone_pair || mol.bonds_of(atom).any(|e| conjugated[e.index()])
        })
        .collect();

    mol.bonds()
        .filter_map(|e| {
            let (a, b) = mol.endpoints(e);
            (can_shift[a.index()] && can_shift[b.index()]).then_some((e, a, b))
        })
        .collect()
}

/// Apply one shift in place: `bond` changes by `delta`, `plus` gains one
/// unit of charge and `minus` loses one. Returns `false` if the result is
/// not a valid structure.
fn shift_electrons<A, B>(
    mol: &Mol<A, B>,
    s: &mut ResonanceStructure,
    bond: EdgeIndex,
    delta: i8,
    plus: NodeIndex,
    minus: NodeIndex,
) -> bool
where
    A: HasAtomicNum + HasHydrogenCount,
{
    let order = s.bond_orders[bond.index()] as i8 + delta;
    if !(1..=3).contains(&order) {
        return false;
    }
    s.bond_orders[bond.index()] = order as u8;
    s.atom_charges[plus.index()] += 1;
    s.atom_charges[minus.index()] -= 1;
    [plus, minus].into_iter().all(|atom| {
        let z = mol.atom(atom).atomic_num();
        let allowed = allowed_valences(z, s.atom_charges[atom.index()]);
        let used = total_valence(mol, atom, &s.bond_orders);
        allowed.contains(&used)
    })
}

/// Second-period heavy atoms without a full octet.
fn octet_violations<A, B>(mol: &Mol<A, B>, s: &ResonanceStructure) -> usize
where
    A: HasAtomicNum + HasHydrogenCount,
{
    mol.atoms()
        .filter(|&atom| {
            let a = mol.atom(atom);
            let z = a.atomic_num();
            if period(z) != 2 || z < 5 {
                return false;
            }
            let (bond_sum, _) = bond_order_sum(mol, atom, &s.bond_orders);
            octet_electron_count(z, s.atom_charges[atom.index()], bond_sum, a.hydrogen_count()) != 8
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::build;

    fn benzene() -> Mol<crate::Atom, crate::Bond> {
        let bonds: Vec<(usize, usize, u8)> = (0..6).map(|i| (i, (i + 1) % 6, if i % 2 == 0 { 2 } else { 1 })).collect();
        build(&[(6, 0, 1); 6], &bonds)
    }

    fn acetate() -> Mol<crate::Atom, crate::Bond> {
        build(&[(6, 0, 3), (6, 0, 0), (8, 0, 0), (8, -1, 0)], &[(0, 1, 1), (1, 2, 2), (1, 3, 1)])
    }

    #[test]
    fn benzene_has_two_kekule_structures() {
        let mol = benzene();
        let mut generator = ResonanceStructureGenerator::new();
        assert_eq!(generator.generate(&mol).unwrap(), 2);
        let first = generator.structure(0).unwrap();
        assert_eq!(first.bond_orders, vec![2, 1, 2, 1, 2, 1]);
        assert_eq!(generator.structure(1).unwrap().bond_orders, vec![1, 2, 1, 2, 1, 2]);
        assert!(generator.structures().all(|s| s.atom_charges == vec![0; 6]));
    }

    #[test]
    fn carboxylate_charge_moves_between_oxygens() {
        let mut generator = ResonanceStructureGenerator::new();
        assert_eq!(generator.generate(&acetate()).unwrap(), 2);
        let other = generator.structure(1).unwrap();
        assert_eq!(other.atom_charges, vec![0, 0, -1, 0]);
        assert_eq!(other.bond_orders, vec![1, 1, 2]);
    }

    #[test]
    fn nitro_group() {
        let mol = build(
            &[(7, 1, 0), (8, 0, 0), (8, -1, 0), (6, 0, 3)],
            &[(0, 1, 2), (0, 2, 1), (0, 3, 1)],
        );
        let mut generator = ResonanceStructureGenerator::new();
        assert_eq!(generator.generate(&mol).unwrap(), 2);
        assert!(generator.structures().all(|s| s.atom_charges[0] == 1));
    }

    #[test]
    fn isolated_double_bond_has_one_structure() {
        let mol = build(&[(6, 0, 2), (6, 0, 2)], &[(0, 1, 2)]);
        let mut generator = ResonanceStructureGenerator::new();
        assert_eq!(generator.generate(&mol).unwrap(), 1);
    }

    #[test]
    fn octet_filter_can_be_disabled() {
        let mut generator = ResonanceStructureGenerator::new();
        generator.set_minimize_octet_violations(false);
        generator.set_charge_count_window(0);
        assert_eq!(generator.generate(&benzene()).unwrap(), 2);
        generator.set_charge_count_window(2);
        assert!(generator.generate(&benzene()).unwrap() > 2);
    }

    #[test]
    fn structure_limit() {
        let mut generator = ResonanceStructureGenerator::with_options(ResonanceOptions {
            max_num_structures: 1,
            ..ResonanceOptions::default()
        });
        assert_eq!(generator.generate(&benzene()).unwrap(), 1);
        assert!(generator.structure(1).is_none());
    }

    #[test]
    fn reruns_are_identical() {
        let mut generator = ResonanceStructureGenerator::new();
        generator.generate(&acetate()).unwrap();
        let first: Vec<ResonanceStructure> = generator.structures().cloned().collect();
        generator.generate(&benzene()).unwrap();
        generator.generate(&acetate()).unwrap();
        let second: Vec<ResonanceStructure> = generator.structures().cloned().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn undefined_bonds_are_rejected() {
        let mol = build(&[(6, 0, 2), (6, 0, 2)], &[(0, 1, 0)]);
        let mut generator = ResonanceStructureGenerator::new();
        assert_eq!(
            generator.generate(&mol),
            Err(PerceptionError::UndefinedBondOrder(EdgeIndex::new(0)))
        );
    }
}
