use petgraph::graph::{EdgeIndex, NodeIndex};

use super::geometry::AtomGeometry;
use super::Workspace;
use crate::bond::UNDEFINED_ORDER;
use crate::geometry::dihedral_angle;
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::traits::{HasAtomicNum, HasHydrogenCount};

/// Largest deviation (degrees) from a cis or trans torsion across a
/// planar pi bond.
const MAX_PI_TORSION: f64 = 20.0;

fn is_planar(geometry: AtomGeometry) -> bool {
    matches!(geometry, AtomGeometry::TrigonalPlanar | AtomGeometry::Linear)
}

fn has_pi_capacity<A, B>(mol: &Mol<A, B>, ws: &Workspace, atom: NodeIndex) -> bool
where
    A: HasAtomicNum + HasHydrogenCount,
{
    ws.gap(mol, atom).is_some_and(|g| g > 0)
}

fn pi_candidate<A, B>(mol: &Mol<A, B>, ws: &Workspace, atom: NodeIndex) -> bool
where
    A: HasAtomicNum + HasHydrogenCount,
{
    is_planar(ws.geometries[atom.index()]) && has_pi_capacity(mol, ws, atom)
}

/// Substituents on both sides of the bond lie in one plane.
fn substituents_coplanar<A, B>(mol: &Mol<A, B>, ws: &Workspace, bond: EdgeIndex) -> bool {
    let (a, b) = mol.endpoints(bond);
    let p = |n: NodeIndex| &ws.positions[n.index()];
    for na in mol.neighbors(a).filter(|&n| n != b) {
        for nb in mol.neighbors(b).filter(|&n| n != a) {
            if let Some(t) = dihedral_angle(p(na), p(a), p(b), p(nb)) {
                let t = t.abs();
                if t.min(180.0 - t) > MAX_PI_TORSION {
                    return false;
                }
            }
        }
    }
    true
}

/// Undefined bonds between two planar atoms with spare valence and
/// coplanar substituents.
pub(crate) fn mark_planar_pi_bonds<A, B>(mol: &Mol<A, B>, ws: &Workspace) -> Vec<bool>
where
    A: HasAtomicNum + HasHydrogenCount,
{
    let mut marked = vec![false; mol.bond_count()];
    for bond in mol.bonds() {
        if ws.orders[bond.index()] != UNDEFINED_ORDER {
            continue;
        }
        let (a, b) = mol.endpoints(bond);
        if pi_candidate(mol, ws, a) && pi_candidate(mol, ws, b) && substituents_coplanar(mol, ws, bond) {
            marked[bond.index()] = true;
        }
    }
    marked
}

/// Undefined bonds of rings whose atoms are all planar.
pub(crate) fn mark_conj_ring_bonds<A, B>(mol: &Mol<A, B>, ws: &Workspace, rings: &RingInfo) -> Vec<bool>
where
    A: HasAtomicNum + HasHydrogenCount,
{
    let mut marked = vec![false; mol.bond_count()];
    for ring in rings.rings() {
        if !ring.atoms.iter().all(|a| is_planar(ws.geometries[a.index()])) {
            continue;
        }
        for &bond in &ring.bonds {
            let (a, b) = mol.endpoints(bond);
            if ws.orders[bond.index()] == UNDEFINED_ORDER
                && has_pi_capacity(mol, ws, a)
                && has_pi_capacity(mol, ws, b)
            {
                marked[bond.index()] = true;
            }
        }
    }
    marked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{build, hexagon};

    fn workspace(n_atoms: usize, positions: Vec<[f64; 3]>, orders: Vec<u8>, geometry: AtomGeometry) -> Workspace {
        Workspace {
            positions,
            orders,
            charges: vec![0; n_atoms],
            geometries: vec![geometry; n_atoms],
            consumed: vec![false; n_atoms],
        }
    }

    #[test]
    fn planar_ring_bonds_are_marked() {
        let bonds: Vec<(usize, usize, u8)> = (0..6).map(|i| (i, (i + 1) % 6, 0)).collect();
        let mol = build(&[(6, 0, 1); 6], &bonds);
        let ws = workspace(6, hexagon(1.39), vec![0; 6], AtomGeometry::TrigonalPlanar);
        assert!(mark_conj_ring_bonds(&mol, &ws, &RingInfo::sssr(&mol)).iter().all(|&m| m));
        assert!(mark_planar_pi_bonds(&mol, &ws).iter().all(|&m| m));

        let ws = workspace(6, hexagon(1.39), vec![0; 6], AtomGeometry::Tetrahedral);
        assert!(mark_conj_ring_bonds(&mol, &ws, &RingInfo::sssr(&mol)).iter().all(|&m| !m));
    }

    #[test]
    fn twisted_bond_is_not_planar() {
        // H3C-CH=CH-CH3 skeleton with the terminal carbons rotated 90°.
        let mol = build(
            &[(6, 0, 3), (6, 0, 1), (6, 0, 1), (6, 0, 3)],
            &[(0, 1, 1), (1, 2, 0), (2, 3, 1)],
        );
        let positions = vec![
            [-0.75, 1.3, 0.0],
            [0.0, 0.0, 0.0],
            [1.34, 0.0, 0.0],
            [2.09, 0.0, 1.3],
        ];
        let ws = workspace(4, positions.clone(), vec![1, 0, 1], AtomGeometry::TrigonalPlanar);
        assert_eq!(mark_planar_pi_bonds(&mol, &ws), vec![false, false, false]);

        let mut flat = positions;
        flat[3] = [2.09, -1.3, 0.0];
        let ws = workspace(4, flat, vec![1, 0, 1], AtomGeometry::TrigonalPlanar);
        assert_eq!(mark_planar_pi_bonds(&mol, &ws), vec![false, true, false]);
    }

    #[test]
    fn saturated_atoms_block_marking() {
        let mol = build(&[(6, 0, 3), (6, 0, 3)], &[(0, 1, 0)]);
        let ws = workspace(2, vec![[0.0; 3], [1.5, 0.0, 0.0]], vec![0], AtomGeometry::TrigonalPlanar);
        assert_eq!(mark_planar_pi_bonds(&mol, &ws), vec![false]);
    }
}
