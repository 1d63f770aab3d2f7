//! Configurations from positions and from stereo markers.
//!
//! Both kinds of reconstruction reduce to two primitives: the torsion
//! across a double bond and the signed volume of a center's four reference
//! points. A `None` reference of a center is placed opposite the sum of
//! the directions to its explicit neighbours.

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::bond::{BondDirection, BondStereoFlag};
use crate::geometry::{add, dihedral_angle, distance, lift_2d, normalize, signed_volume, sub, Point3};
use crate::mol::{AtomConfiguration, BondConfiguration, Mol};

/// Smallest signed volume (Å³) treated as a defined handedness.
const MIN_VOLUME: f64 = 1e-4;

fn tetrahedral_config(points: &[Point3; 4]) -> AtomConfiguration {
    let v = signed_volume(&points[0], &points[1], &points[2], &points[3]);
    if v > MIN_VOLUME {
        AtomConfiguration::Clockwise
    } else if v < -MIN_VOLUME {
        AtomConfiguration::CounterClockwise
    } else {
        AtomConfiguration::None
    }
}

/// Reference points of a center, with implicit references placed opposite
/// the explicit ones.
fn reference_points(
    center: Point3,
    refs: &[Option<NodeIndex>; 4],
    position: impl Fn(NodeIndex) -> Option<Point3>,
) -> Option<[Point3; 4]> {
    let mut explicit = [None; 4];
    let mut sum = [0.0; 3];
    for (slot, r) in explicit.iter_mut().zip(refs) {
        if let Some(n) = r {
            let p = position(*n)?;
            sum = add(&sum, &normalize(&sub(&p, &center))?);
            *slot = Some(p);
        }
    }
    let implicit = normalize(&sum).map(|d| sub(&center, &d));
    let mut points = [[0.0; 3]; 4];
    for (p, e) in points.iter_mut().zip(explicit) {
        *p = match e {
            Some(e) => e,
            None => implicit?,
        };
    }
    Some(points)
}

/// Configuration of the double bond `refs[1] = refs[2]` from the torsion
/// `refs[0]-refs[1]-refs[2]-refs[3]`.
pub fn bond_configuration_from_coords<A, B>(
    mol: &Mol<A, B>,
    bond: EdgeIndex,
    refs: [NodeIndex; 4],
    coords: &dyn Fn(NodeIndex) -> Option<Point3>,
) -> BondConfiguration {
    if mol.bond_endpoints(bond).is_none() {
        return BondConfiguration::None;
    }
    let points: Option<Vec<Point3>> = refs.iter().map(|&r| coords(r)).collect();
    let torsion = points.and_then(|p| dihedral_angle(&p[0], &p[1], &p[2], &p[3]));
    match torsion {
        Some(t) if t.abs() < 90.0 => BondConfiguration::Cis,
        Some(_) => BondConfiguration::Trans,
        None => BondConfiguration::None,
    }
}

/// Configuration of a tetrahedral center from atom positions. Every
/// explicit reference must be a neighbour of `center`.
pub fn atom_configuration_from_coords<A, B>(
    mol: &Mol<A, B>,
    center: NodeIndex,
    refs: [Option<NodeIndex>; 4],
    coords: &dyn Fn(NodeIndex) -> Option<Point3>,
) -> AtomConfiguration {
    if !refs.iter().flatten().all(|&r| mol.bond_between(center, r).is_some()) {
        return AtomConfiguration::None;
    }
    let c = match coords(center) {
        Some(c) => c,
        None => return AtomConfiguration::None,
    };
    match reference_points(c, &refs, coords) {
        Some(points) => tetrahedral_config(&points),
        None => AtomConfiguration::None,
    }
}

/// Side (+1 or -1) of `reference` relative to the double bond, from the
/// directions of the other bonds of `atom`. `None` without a directed bond
/// or with contradicting ones.
fn reference_side<A, B>(
    mol: &Mol<A, B>,
    double_bond: EdgeIndex,
    atom: NodeIndex,
    reference: NodeIndex,
    dirs: &[BondDirection],
) -> Option<i8> {
    let mut side = None;
    for (e, n) in mol.bonded_neighbors(atom) {
        if e == double_bond {
            continue;
        }
        let sign = match dirs.get(e.index()) {
            Some(BondDirection::Up) => 1,
            Some(BondDirection::Down) => -1,
            _ => continue,
        };
        let s = if mol.endpoints(e).0 == atom { sign } else { -sign };
        let s = if n == reference { s } else { -s };
        match side {
            None => side = Some(s),
            Some(prev) if prev != s => return None,
            Some(_) => {}
        }
    }
    side
}

/// Configuration encoded by single bond directions around a double bond
/// with reference atoms `refs = [r1, a1, a2, r2]`.
pub fn perceive_bond_configuration<A, B>(
    mol: &Mol<A, B>,
    bond: EdgeIndex,
    refs: [NodeIndex; 4],
    dirs: &[BondDirection],
) -> BondConfiguration {
    let s1 = reference_side(mol, bond, refs[1], refs[0], dirs);
    let s2 = reference_side(mol, bond, refs[2], refs[3], dirs);
    match (s1, s2) {
        (Some(a), Some(b)) if a == b => BondConfiguration::Cis,
        (Some(_), Some(_)) => BondConfiguration::Trans,
        _ => BondConfiguration::None,
    }
}

/// Configuration encoded by wedge/hash flags at a center drawn in 2D.
///
/// Only flags whose narrow end sits at `center` count. Any wavy flag there
/// makes the center `Either`.
pub fn perceive_atom_configuration_2d<A, B>(
    mol: &Mol<A, B>,
    center: NodeIndex,
    refs: [Option<NodeIndex>; 4],
    coords: &dyn Fn(NodeIndex) -> Option<[f64; 2]>,
    flags: &[BondStereoFlag],
) -> AtomConfiguration {
    let flag_at_center = |e: EdgeIndex| {
        let flag = flags.get(e.index()).copied().unwrap_or_default();
        let at_begin = mol.endpoints(e).0 == center;
        match flag.narrow_end_at_begin() {
            Some(b) if b == at_begin => flag,
            _ => BondStereoFlag::Plain,
        }
    };
    if mol.bonds_of(center).any(|e| flag_at_center(e).is_either()) {
        return AtomConfiguration::Either;
    }

    let c = match coords(center) {
        Some(c) => lift_2d(c),
        None => return AtomConfiguration::None,
    };
    let position = |n: NodeIndex| {
        let p = lift_2d(coords(n)?);
        let z = mol
            .bond_between(center, n)
            .map_or(0, |e| flag_at_center(e).z_sign());
        Some([p[0], p[1], z as f64 * distance(&c, &p)])
    };
    match reference_points(c, &refs, position) {
        Some(points) => tetrahedral_config(&points),
        None => AtomConfiguration::None,
    }
}
