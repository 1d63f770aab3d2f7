//! Stereo perception: configurations from coordinates and minimal marker
//! sets (single bond directions for double bonds, wedge/hash flags for
//! tetrahedral centers) that encode them.
//!
//! The two marker generators share one local-search core and differ only
//! in what a marker is, which bonds may carry one and how a center's
//! configuration is read back.

pub mod descriptor;
pub mod direction;
pub mod flags;
mod search;

use petgraph::graph::{EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use descriptor::{
    atom_configuration_from_coords, bond_configuration_from_coords, perceive_atom_configuration_2d,
    perceive_bond_configuration,
};
pub use direction::{calc_bond_directions, BondDirectionGenerator};
pub use flags::{calc_bond_stereo_flags, BondStereoFlagGenerator};

use crate::bond::BondOrder;
use crate::canonical::symmetry_classes;
use crate::error::PerceptionError;
use crate::geometry::Point3;
use crate::mol::{AtomStereoDescriptor, BondConfiguration, BondStereoDescriptor, Mol};
use crate::rings::RingInfo;
use crate::traits::{HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount, HasIsotope};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StereoOptions {
    /// Treat ring double bonds as stereogenic (subject to `ring_size_limit`).
    pub include_ring_bonds: bool,
    /// Double bonds whose smallest ring is smaller than this are never
    /// stereogenic.
    pub ring_size_limit: usize,
    /// Local search moves allowed per run.
    pub max_search_steps: usize,
}

impl Default for StereoOptions {
    fn default() -> Self {
        Self {
            include_ring_bonds: true,
            ring_size_limit: 8,
            max_search_steps: 20_000,
        }
    }
}

/// Result of a marker generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerSummary {
    /// Stereocenters whose configuration the markers do not reproduce.
    pub num_mismatches: usize,
    /// Bonds carrying a marker, pre-existing ones included.
    pub num_marked_bonds: usize,
}

impl From<search::SearchOutcome> for MarkerSummary {
    fn from(outcome: search::SearchOutcome) -> Self {
        Self {
            num_mismatches: outcome.num_mismatches,
            num_marked_bonds: outcome.num_marked,
        }
    }
}

/// Ring filter for double bond stereo.
pub(crate) fn passes_ring_filter(rings: &RingInfo, bond: EdgeIndex, options: &StereoOptions) -> bool {
    match rings.smallest_bond_ring_size(bond) {
        None => true,
        Some(size) => options.include_ring_bonds && size >= options.ring_size_limit,
    }
}

fn order_of<A, B: HasBondOrder>(mol: &Mol<A, B>, bond: EdgeIndex) -> Option<BondOrder> {
    mol.bond(bond).bond_order()
}

/// Reference atoms `[r1, a1, a2, r2]` of a stereogenic double bond: each
/// end carries one or two explicit substituents that are topologically
/// distinct, and the one with the higher symmetry class is the reference.
fn stereo_bond_refs<A, B>(mol: &Mol<A, B>, bond: EdgeIndex, classes: &[usize]) -> Option<[NodeIndex; 4]>
where
    A: HasHydrogenCount,
    B: HasBondOrder,
{
    if order_of(mol, bond) != Some(BondOrder::Double) {
        return None;
    }
    let (a1, a2) = mol.endpoints(bond);
    let reference = |atom: NodeIndex, other: NodeIndex| -> Option<NodeIndex> {
        if mol.bonds_of(atom).any(|e| e != bond && order_of(mol, e) != Some(BondOrder::Single)) {
            return None;
        }
        let subs: Vec<NodeIndex> = mol.neighbors(atom).filter(|&n| n != other).collect();
        let h = mol.atom(atom).hydrogen_count() as usize;
        match (subs.as_slice(), h) {
            ([s], 0 | 1) => Some(*s),
            ([s, t], 0) if classes[s.index()] != classes[t.index()] => {
                Some(if classes[s.index()] > classes[t.index()] { *s } else { *t })
            }
            _ => None,
        }
    };
    Some([reference(a1, a2)?, a1, a2, reference(a2, a1)?])
}

/// Reference slots of a tetrahedral stereocenter: explicit neighbours in
/// index order, then `None` for an implicit hydrogen or lone pair.
fn stereo_center_refs<A, B>(mol: &Mol<A, B>, atom: NodeIndex, classes: &[usize]) -> Option<[Option<NodeIndex>; 4]>
where
    A: HasAtomicNum + HasHydrogenCount,
    B: HasBondOrder,
{
    let a = mol.atom(atom);
    let h = a.hydrogen_count() as usize;
    let mut nbrs: Vec<NodeIndex> = mol.neighbors(atom).collect();
    nbrs.sort();
    let lone_pair_center = matches!(a.atomic_num(), 15 | 16 | 33 | 34);
    let stereogenic_count = match nbrs.len() + h {
        4 => h <= 1,
        3 => h == 0 && lone_pair_center,
        _ => false,
    };
    if !stereogenic_count || mol.bonds_of(atom).any(|e| order_of(mol, e) != Some(BondOrder::Single)) {
        return None;
    }
    let mut seen: Vec<usize> = nbrs.iter().map(|n| classes[n.index()]).collect();
    seen.sort_unstable();
    seen.dedup();
    if seen.len() != nbrs.len() {
        return None;
    }
    if h == 1 && nbrs.iter().any(|&n| mol.atom(n).atomic_num() == 1 && mol.degree(n) == 1) {
        return None;
    }
    let mut refs = [None; 4];
    for (slot, n) in refs.iter_mut().zip(nbrs) {
        *slot = Some(n);
    }
    Some(refs)
}

/// Stereo descriptors of every stereogenic center and double bond, with
/// configurations taken from `coords`. Elements whose coordinates are
/// missing or degenerate are skipped.
pub fn perceive_stereo_descriptors<A, B>(
    mol: &Mol<A, B>,
    coords: &dyn Fn(NodeIndex) -> Option<Point3>,
    options: &StereoOptions,
) -> Result<(Vec<AtomStereoDescriptor>, Vec<BondStereoDescriptor>), PerceptionError>
where
    A: HasAtomicNum + HasFormalCharge + HasIsotope + HasHydrogenCount,
    B: HasBondOrder,
{
    let orders: Vec<u8> = mol
        .bonds()
        .map(|e| order_of(mol, e).map_or(0, BondOrder::as_u8))
        .collect();
    let classes = symmetry_classes(mol, &orders)?;
    let rings = RingInfo::sssr(mol);

    let mut atoms = Vec::new();
    for center in mol.atoms() {
        if let Some(refs) = stereo_center_refs(mol, center, &classes) {
            let config = atom_configuration_from_coords(mol, center, refs, coords);
            if config.is_defined() {
                atoms.push(AtomStereoDescriptor { center, refs, config });
            }
        }
    }

    let mut bonds = Vec::new();
    for bond in mol.bonds() {
        if !passes_ring_filter(&rings, bond, options) {
            continue;
        }
        if let Some(refs) = stereo_bond_refs(mol, bond, &classes) {
            let config = bond_configuration_from_coords(mol, bond, refs, coords);
            if config != BondConfiguration::None {
                bonds.push(BondStereoDescriptor { bond, refs, config });
            }
        }
    }
    debug!(centers = atoms.len(), bonds = bonds.len(), "stereo descriptors perceived");
    Ok((atoms, bonds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::build;

    pub(crate) fn trans_butene_coords() -> [[f64; 3]; 4] {
        [[-0.75, 1.3, 0.0], [0.0; 3], [1.34, 0.0, 0.0], [2.09, -1.3, 0.0]]
    }

    #[test]
    fn chiral_center_from_coords() {
        let mol = build(&[(6, 0, 1), (9, 0, 0), (17, 0, 0), (35, 0, 0)], &[(0, 1, 1), (0, 2, 1), (0, 3, 1)]);
        let pos = [[0.0; 3], [1.0, 1.0, 1.0], [1.0, -1.0, -1.0], [-1.0, 1.0, -1.0]];
        let coords = |i: NodeIndex| Some(pos[i.index()]);
        let (atoms, bonds) = perceive_stereo_descriptors(&mol, &coords, &StereoOptions::default()).unwrap();
        assert!(bonds.is_empty());
        assert_eq!(atoms.len(), 1);
        assert_eq!(atoms[0].center, NodeIndex::new(0));
        assert_eq!(atoms[0].refs[3], None);

        let mirror = pos.map(|p| [p[0], p[1], -p[2]]);
        let coords = |i: NodeIndex| Some(mirror[i.index()]);
        let (mirrored, _) = perceive_stereo_descriptors(&mol, &coords, &StereoOptions::default()).unwrap();
        assert_eq!(mirrored[0].config, atoms[0].config.inverted());
    }

    #[test]
    fn equivalent_substituents_are_not_stereogenic() {
        // CHF2Cl
        let mol = build(&[(6, 0, 1), (9, 0, 0), (9, 0, 0), (17, 0, 0)], &[(0, 1, 1), (0, 2, 1), (0, 3, 1)]);
        let pos = [[0.0; 3], [1.0, 1.0, 1.0], [1.0, -1.0, -1.0], [-1.0, 1.0, -1.0]];
        let coords = |i: NodeIndex| Some(pos[i.index()]);
        let (atoms, _) = perceive_stereo_descriptors(&mol, &coords, &StereoOptions::default()).unwrap();
        assert!(atoms.is_empty());
    }

    #[test]
    fn double_bonds_from_coords() {
        let butene = build(&[(6, 0, 3), (6, 0, 1), (6, 0, 1), (6, 0, 3)], &[(0, 1, 1), (1, 2, 2), (2, 3, 1)]);
        let pos = trans_butene_coords();
        let coords = |i: NodeIndex| Some(pos[i.index()]);
        let (_, bonds) = perceive_stereo_descriptors(&butene, &coords, &StereoOptions::default()).unwrap();
        assert_eq!(bonds.len(), 1);
        assert_eq!(bonds[0].config, BondConfiguration::Trans);
        assert_eq!(bonds[0].refs, [0, 1, 2, 3].map(NodeIndex::new));

        // Propene: the terminal CH2 makes the bond non-stereogenic.
        let propene = build(&[(6, 0, 3), (6, 0, 1), (6, 0, 2)], &[(0, 1, 1), (1, 2, 2)]);
        let (_, bonds) = perceive_stereo_descriptors(&propene, &coords, &StereoOptions::default()).unwrap();
        assert!(bonds.is_empty());
    }

    #[test]
    fn ring_filter() {
        let rings_of = |size: usize| {
            let bonds: Vec<(usize, usize, u8)> = (0..size).map(|i| (i, (i + 1) % size, 1)).collect();
            let mol = build(&vec![(6, 0, 2); size], &bonds);
            RingInfo::sssr(&mol)
        };
        let options = StereoOptions::default();
        assert!(!passes_ring_filter(&rings_of(6), EdgeIndex::new(0), &options));
        assert!(passes_ring_filter(&rings_of(8), EdgeIndex::new(0), &options));
        let no_rings = StereoOptions {
            include_ring_bonds: false,
            ..StereoOptions::default()
        };
        assert!(!passes_ring_filter(&rings_of(8), EdgeIndex::new(0), &no_rings));
    }

    #[test]
    fn options_from_json() {
        let options: StereoOptions = serde_json::from_str(r#"{"ring_size_limit": 12}"#).unwrap();
        assert_eq!(options.ring_size_limit, 12);
        assert!(options.include_ring_bonds);
    }
}
