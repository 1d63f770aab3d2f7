use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::element::{element_data, outer_shell_electrons};
use crate::mol::Mol;
use crate::traits::{HasAtomicNum, HasHydrogenCount};
use crate::valence::total_valence;

/// Electrons an atom can contribute to a pi system: unused bonding
/// capacity plus lone pair electrons, or `-1` if the atom cannot take part.
pub(crate) fn count_atom_elec<A, B>(mol: &Mol<A, B>, idx: NodeIndex, charge: i8) -> i16
where
    A: HasAtomicNum + HasHydrogenCount,
{
    let atom = mol.atom(idx);
    let anum = atom.atomic_num();
    let default_val = match element_data(anum).and_then(|e| e.valences.first()) {
        Some(&v) if v > 1 => v,
        _ => return -1,
    };

    let degree = mol.total_degree(idx);
    if degree > 3 {
        return -1;
    }

    let nouter = outer_shell_electrons(anum);
    let nlp = (nouter as i16 - default_val as i16 - charge as i16).max(0);
    (default_val as i16 - degree as i16) + nlp
}

/// `true` if the atom can take part in a conjugated system: it has a pi
/// bond, a lone pair or an empty orbital and is not hypervalent.
pub fn is_conj_candidate<A, B>(mol: &Mol<A, B>, idx: NodeIndex, orders: &[u8], charge: i8) -> bool
where
    A: HasAtomicNum + HasHydrogenCount,
{
    let anum = mol.atom(idx).atomic_num();
    let default_val = match element_data(anum).and_then(|e| e.valences.first()) {
        Some(&v) if v > 1 => v,
        _ => return false,
    };

    if charge == 0 && total_valence(mol, idx, orders) > default_val {
        return false;
    }

    let nouter = outer_shell_electrons(anum);
    let total_degree = mol.total_degree(idx);
    let row_check = anum <= 10 || (nouter != 5 && nouter != 6) || (nouter == 6 && total_degree < 2);

    row_check && count_atom_elec(mol, idx, charge) > 0
}

/// Mark bonds that are part of a conjugated system under the working
/// assignment `orders`: a double or triple bond between two candidates
/// plus any bond from one of its atoms to a further candidate.
///
/// `charges` overrides the stored formal charges (one entry per atom).
pub fn assign_conjugation<A, B>(mol: &Mol<A, B>, orders: &[u8], charges: &[i8]) -> Vec<bool>
where
    A: HasAtomicNum + HasHydrogenCount,
{
    let mut conjugated = vec![false; mol.bond_count()];
    let candidate: Vec<bool> = mol
        .atoms()
        .map(|a| is_conj_candidate(mol, a, orders, charges[a.index()]))
        .collect();

    for atom_idx in mol.atoms() {
        if !candidate[atom_idx.index()] {
            continue;
        }
        let sbo = mol.total_degree(atom_idx);
        if !(2..=3).contains(&sbo) {
            continue;
        }

        let bonds: Vec<(EdgeIndex, NodeIndex)> = mol.bonded_neighbors(atom_idx).collect();
        for &(bnd1, other1) in &bonds {
            if orders[bnd1.index()] < 2 || !candidate[other1.index()] {
                continue;
            }
            for &(bnd2, at2) in &bonds {
                if bnd1 == bnd2 || mol.total_degree(at2) > 3 {
                    continue;
                }
                if candidate[at2.index()] {
                    conjugated[bnd1.index()] = true;
                    conjugated[bnd2.index()] = true;
                }
            }
        }
    }

    conjugated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{build, orders_of};

    fn conj(atoms: &[(u8, i8, u8)], bonds: &[(usize, usize, u8)]) -> Vec<bool> {
        let mol = build(atoms, bonds);
        let charges: Vec<i8> = atoms.iter().map(|a| a.1).collect();
        assign_conjugation(&mol, &orders_of(&mol), &charges)
    }

    #[test]
    fn ethene_not_conjugated() {
        assert_eq!(conj(&[(6, 0, 2), (6, 0, 2)], &[(0, 1, 2)]), vec![false]);
    }

    #[test]
    fn butadiene_all_conjugated() {
        let c = conj(
            &[(6, 0, 2), (6, 0, 1), (6, 0, 1), (6, 0, 2)],
            &[(0, 1, 2), (1, 2, 1), (2, 3, 2)],
        );
        assert_eq!(c, vec![true, true, true]);
    }

    #[test]
    fn propene_not_conjugated() {
        let c = conj(&[(6, 0, 3), (6, 0, 1), (6, 0, 2)], &[(0, 1, 1), (1, 2, 2)]);
        assert_eq!(c, vec![false, false]);
    }

    #[test]
    fn acetic_acid_carbonyl_and_hydroxyl() {
        let c = conj(
            &[(6, 0, 3), (6, 0, 0), (8, 0, 0), (8, 0, 1)],
            &[(0, 1, 1), (1, 2, 2), (1, 3, 1)],
        );
        assert!(!c[0]);
        assert!(c[1]);
        assert!(c[2]);
    }

    #[test]
    fn carboxylate_oxygen_is_candidate() {
        let mol = build(
            &[(6, 0, 3), (6, 0, 0), (8, 0, 0), (8, -1, 0)],
            &[(0, 1, 1), (1, 2, 2), (1, 3, 1)],
        );
        let orders = orders_of(&mol);
        assert!(is_conj_candidate(&mol, NodeIndex::new(3), &orders, -1));
        assert!(!is_conj_candidate(&mol, NodeIndex::new(0), &orders, 0));
    }

    #[test]
    fn cyclohexane_not_conjugated() {
        let bonds: Vec<(usize, usize, u8)> = (0..6).map(|i| (i, (i + 1) % 6, 1)).collect();
        assert!(conj(&[(6, 0, 2); 6], &bonds).iter().all(|&x| !x));
    }
}
