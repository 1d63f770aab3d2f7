//! Per-atom geometry classification for bond order perception.
//!
//! Atoms are classified from the angles between their explicit neighbours.
//! When the coordinates are degenerate (coincident or collinear points
//! where a plane is needed) the classification falls back to what the
//! valence model allows. Ring atoms of flat five- and six-membered rings
//! are forced to trigonal planar afterwards, since small-ring angles say
//! little about hybridization.

use serde::{Deserialize, Serialize};

use petgraph::graph::NodeIndex;

use crate::geometry::{bond_angle, dihedral_angle, distance, plane_deviation, Point3};
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::traits::{HasAtomicNum, HasHydrogenCount};
use crate::valence::{bond_order_sum, free_valence_with_charge};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AtomGeometry {
    /// No explicit neighbours.
    #[default]
    Undefined,
    /// Exactly one explicit neighbour.
    Terminal,
    Linear,
    TrigonalPlanar,
    Tetrahedral,
}

/// Average bond angle above which a two-coordinate atom is linear.
const LINEAR_ANGLE: f64 = 155.0;
/// Average bond angle above which an atom is trigonal planar.
const PLANAR_ANGLE: f64 = 115.0;
/// Maximum out-of-plane distance (Å) of a trigonal planar center.
const MAX_PLANE_DEVIATION: f64 = 0.25;
/// Mean absolute ring torsion (degrees) below which a ring is flat.
const FLAT_RING_TORSION: f64 = 7.5;
const MIN_BOND_LENGTH: f64 = 0.01;

pub(crate) fn perceive_geometries<A, B>(
    mol: &Mol<A, B>,
    positions: &[Point3],
    orders: &[u8],
    charges: &[i8],
) -> Vec<AtomGeometry>
where
    A: HasAtomicNum + HasHydrogenCount,
{
    mol.atoms()
        .map(|atom| {
            let nbrs: Vec<Point3> = mol.neighbors(atom).map(|n| positions[n.index()]).collect();
            match nbrs.len() {
                0 => AtomGeometry::Undefined,
                1 => AtomGeometry::Terminal,
                _ => classify_from_coords(&positions[atom.index()], &nbrs).unwrap_or_else(|| {
                    classify_from_valence(mol, atom, orders, charges[atom.index()])
                }),
            }
        })
        .collect()
}

/// Geometry from neighbour positions; `None` if they are degenerate.
fn classify_from_coords(center: &Point3, nbrs: &[Point3]) -> Option<AtomGeometry> {
    if nbrs.iter().any(|p| distance(center, p) < MIN_BOND_LENGTH) {
        return None;
    }
    match nbrs {
        [a, b] => {
            let angle = bond_angle(a, center, b)?;
            Some(if angle > LINEAR_ANGLE {
                AtomGeometry::Linear
            } else if angle > PLANAR_ANGLE {
                AtomGeometry::TrigonalPlanar
            } else {
                AtomGeometry::Tetrahedral
            })
        }
        [a, b, c] => {
            let avg = (bond_angle(a, center, b)? + bond_angle(a, center, c)? + bond_angle(b, center, c)?) / 3.0;
            let deviation = plane_deviation(center, a, b, c)?;
            Some(if avg > PLANAR_ANGLE && deviation < MAX_PLANE_DEVIATION {
                AtomGeometry::TrigonalPlanar
            } else {
                AtomGeometry::Tetrahedral
            })
        }
        _ => Some(AtomGeometry::Tetrahedral),
    }
}

/// Geometry implied by the number of multiple bonds the atom still needs.
pub(crate) fn classify_from_valence<A, B>(
    mol: &Mol<A, B>,
    atom: NodeIndex,
    orders: &[u8],
    charge: i8,
) -> AtomGeometry
where
    A: HasAtomicNum + HasHydrogenCount,
{
    let total_degree = mol.total_degree(atom);
    if total_degree >= 4 {
        return AtomGeometry::Tetrahedral;
    }
    let (_, undefined) = bond_order_sum(mol, atom, orders);
    let gap = match free_valence_with_charge(mol, atom, orders, charge) {
        Some(free) => free - undefined as i16,
        None => return AtomGeometry::Tetrahedral,
    };
    match gap {
        g if g <= 0 => AtomGeometry::Tetrahedral,
        1 => AtomGeometry::TrigonalPlanar,
        _ if total_degree <= 2 => AtomGeometry::Linear,
        _ => AtomGeometry::TrigonalPlanar,
    }
}

/// Mean absolute torsion angle along a ring, or `None` if any torsion is
/// undefined.
fn mean_ring_torsion(ring: &[NodeIndex], positions: &[Point3]) -> Option<f64> {
    let len = ring.len();
    let mut sum = 0.0;
    for i in 0..len {
        let p = |k: usize| &positions[ring[(i + k) % len].index()];
        sum += dihedral_angle(p(0), p(1), p(2), p(3))?.abs();
    }
    Some(sum / len as f64)
}

pub(crate) fn fix_ring_atom_geometries<A, B>(
    mol: &Mol<A, B>,
    rings: &RingInfo,
    positions: &[Point3],
    geometries: &mut [AtomGeometry],
) where
    A: HasHydrogenCount,
{
    for ring in rings.rings() {
        if !(5..=6).contains(&ring.size()) {
            continue;
        }
        match mean_ring_torsion(&ring.atoms, positions) {
            Some(t) if t < FLAT_RING_TORSION => {}
            _ => continue,
        }
        for &atom in &ring.atoms {
            let geom = &mut geometries[atom.index()];
            if matches!(geom, AtomGeometry::Tetrahedral | AtomGeometry::TrigonalPlanar)
                && mol.total_degree(atom) <= 3
            {
                *geom = AtomGeometry::TrigonalPlanar;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{build, build_3d};
    use crate::traits::HasPosition3D;

    fn positions<A: HasPosition3D, B>(mol: &Mol<A, B>) -> Vec<Point3> {
        mol.atoms()
            .map(|a| mol.atom(a).position_3d().unwrap_or([0.0; 3]))
            .collect()
    }

    #[test]
    fn two_coordinate_angles() {
        let c = [0.0, 0.0, 0.0];
        let lin = classify_from_coords(&c, &[[1.2, 0.0, 0.0], [-1.2, 0.0, 0.0]]);
        assert_eq!(lin, Some(AtomGeometry::Linear));
        let t = 120f64.to_radians();
        let trig = classify_from_coords(&c, &[[1.3, 0.0, 0.0], [1.3 * t.cos(), 1.3 * t.sin(), 0.0]]);
        assert_eq!(trig, Some(AtomGeometry::TrigonalPlanar));
        let t = 109.5f64.to_radians();
        let tet = classify_from_coords(&c, &[[1.5, 0.0, 0.0], [1.5 * t.cos(), 1.5 * t.sin(), 0.0]]);
        assert_eq!(tet, Some(AtomGeometry::Tetrahedral));
    }

    #[test]
    fn three_coordinate_planarity() {
        let c = [0.0, 0.0, 0.0];
        let planar: Vec<Point3> = (0..3)
            .map(|i| {
                let t = (120.0 * i as f64).to_radians();
                [1.4 * t.cos(), 1.4 * t.sin(), 0.0]
            })
            .collect();
        assert_eq!(classify_from_coords(&c, &planar), Some(AtomGeometry::TrigonalPlanar));
        let pyramidal: Vec<Point3> = planar.iter().map(|p| [p[0] * 0.7, p[1] * 0.7, -0.5]).collect();
        assert_eq!(classify_from_coords(&c, &pyramidal), Some(AtomGeometry::Tetrahedral));
    }

    #[test]
    fn degenerate_coordinates_have_no_classification() {
        let c = [0.0, 0.0, 0.0];
        assert_eq!(classify_from_coords(&c, &[c, [1.0, 0.0, 0.0]]), None);
    }

    #[test]
    fn valence_fallback() {
        // H2C-C-N with undefined bonds: the middle carbon needs two extra
        // bond orders and has two neighbours.
        let mol = build(&[(6, 0, 3), (6, 0, 0), (7, 0, 0)], &[(0, 1, 1), (1, 2, 0)]);
        let orders = [1, 0];
        assert_eq!(classify_from_valence(&mol, NodeIndex::new(1), &orders, 0), AtomGeometry::Linear);
        let methane = build(&[(6, 0, 4)], &[]);
        assert_eq!(classify_from_valence(&methane, NodeIndex::new(0), &[], 0), AtomGeometry::Tetrahedral);
    }

    #[test]
    fn degenerate_atoms_use_valence() {
        let mol = build_3d(
            &[
                (6, 0, 3, [0.0, 0.0, 0.0]),
                (6, 0, 0, [0.0, 0.0, 0.0]),
                (7, 0, 0, [2.6, 0.0, 0.0]),
            ],
            &[(0, 1, 1), (1, 2, 0)],
        );
        let geoms = perceive_geometries(&mol, &positions(&mol), &[1, 0], &[0, 0, 0]);
        assert_eq!(geoms, vec![AtomGeometry::Terminal, AtomGeometry::Linear, AtomGeometry::Terminal]);
    }

    #[test]
    fn flat_five_ring_becomes_planar() {
        let coords: Vec<Point3> = (0..5)
            .map(|i| {
                let t = (72.0 * i as f64).to_radians();
                [1.2 * t.cos(), 1.2 * t.sin(), 0.0]
            })
            .collect();
        let atoms: Vec<(u8, i8, u8, Point3)> = coords.iter().map(|&p| (6, 0, 1, p)).collect();
        let bonds: Vec<(usize, usize, u8)> = (0..5).map(|i| (i, (i + 1) % 5, 0)).collect();
        let mol = build_3d(&atoms, &bonds);
        let pos = positions(&mol);
        let orders = vec![0; 5];
        let mut geoms = perceive_geometries(&mol, &pos, &orders, &[0; 5]);
        assert!(geoms.iter().all(|&g| g == AtomGeometry::Tetrahedral));
        fix_ring_atom_geometries(&mol, &RingInfo::sssr(&mol), &pos, &mut geoms);
        assert!(geoms.iter().all(|&g| g == AtomGeometry::TrigonalPlanar));
    }
}
