//! Wedge, hash and wavy flags for tetrahedral centers in a 2D depiction.

use petgraph::graph::{EdgeIndex, NodeIndex};
use tracing::{debug, warn};

use super::descriptor::perceive_atom_configuration_2d;
use super::search::{solve, MarkerProblem};
use super::{MarkerSummary, StereoOptions};
use crate::bond::{BondOrder, BondStereoFlag};
use crate::error::PerceptionError;
use crate::mol::{AtomConfiguration, AtomStereoDescriptor, Mol};
use crate::rings::RingInfo;
use crate::traits::{HasBondOrder, HasPosition2D};

struct FlagProblem<'a, A, B> {
    mol: &'a Mol<A, B>,
    coords: &'a dyn Fn(NodeIndex) -> Option<[f64; 2]>,
    centers: Vec<AtomStereoDescriptor>,
    candidates: Vec<Vec<EdgeIndex>>,
}

impl<'a, A, B: HasBondOrder> FlagProblem<'a, A, B> {
    fn new(
        mol: &'a Mol<A, B>,
        coords: &'a dyn Fn(NodeIndex) -> Option<[f64; 2]>,
        centers: Vec<AtomStereoDescriptor>,
    ) -> Self {
        let rings = RingInfo::sssr(mol);
        let is_center = |atom: NodeIndex| centers.iter().any(|d| d.center == atom);
        // Flags go preferably to bonds leading away from other centers and
        // out of rings.
        let candidates = centers
            .iter()
            .map(|d| {
                let mut bonds: Vec<(bool, bool, EdgeIndex)> = mol
                    .bonded_neighbors(d.center)
                    .filter(|&(e, _)| mol.bond(e).bond_order() == Some(BondOrder::Single))
                    .map(|(e, n)| (is_center(n), rings.is_ring_bond(e), e))
                    .collect();
                bonds.sort();
                bonds.into_iter().map(|(_, _, e)| e).collect()
            })
            .collect();
        Self {
            mol,
            coords,
            centers,
            candidates,
        }
    }
}

impl<A, B> MarkerProblem for FlagProblem<'_, A, B> {
    type Marker = BondStereoFlag;

    fn num_centers(&self) -> usize {
        self.centers.len()
    }

    fn candidates(&self, center: usize) -> &[EdgeIndex] {
        &self.candidates[center]
    }

    fn choices(&self, center: usize, bond: EdgeIndex) -> [BondStereoFlag; 2] {
        let d = &self.centers[center];
        let at_begin = self.mol.endpoints(bond).0 == d.center;
        if d.config == AtomConfiguration::Either {
            [BondStereoFlag::either(at_begin); 2]
        } else {
            [BondStereoFlag::wedge(at_begin, true), BondStereoFlag::wedge(at_begin, false)]
        }
    }

    fn is_unspecified(&self, center: usize) -> bool {
        self.centers[center].config == AtomConfiguration::Either
    }

    fn is_satisfied(&self, center: usize, markers: &[BondStereoFlag]) -> bool {
        let d = &self.centers[center];
        perceive_atom_configuration_2d(self.mol, d.center, d.refs, self.coords, markers) == d.config
    }
}

/// Generates stereo flags for the tetrahedral centers stored in a molecule.
#[derive(Debug, Clone, Default)]
pub struct BondStereoFlagGenerator {
    options: StereoOptions,
    summary: MarkerSummary,
}

impl BondStereoFlagGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: StereoOptions) -> Self {
        Self {
            options,
            summary: MarkerSummary::default(),
        }
    }

    pub fn options(&self) -> &StereoOptions {
        &self.options
    }

    pub fn num_mismatches(&self) -> usize {
        self.summary.num_mismatches
    }

    pub fn num_marked_bonds(&self) -> usize {
        self.summary.num_marked_bonds
    }

    /// Flags reproducing every defined or `Either` center of `mol` from its
    /// 2D positions. Fails if an atom has no 2D position.
    pub fn generate<A, B>(
        &mut self,
        mol: &Mol<A, B>,
        flags: &mut Vec<BondStereoFlag>,
    ) -> Result<MarkerSummary, PerceptionError>
    where
        A: HasPosition2D,
        B: HasBondOrder,
    {
        if let Some(atom) = mol.atoms().find(|&a| mol.atom(a).position_2d().is_none()) {
            return Err(PerceptionError::MissingCoordinates(atom));
        }
        let coords = |n: NodeIndex| mol.atom(n).position_2d();
        Ok(self.generate_with_coords(mol, &coords, flags))
    }

    /// Like [`generate`](Self::generate) with positions from `coords`.
    ///
    /// `flags` is resized to the bond count; if it already has one entry
    /// per bond, the flags it holds are kept.
    pub fn generate_with_coords<A, B: HasBondOrder>(
        &mut self,
        mol: &Mol<A, B>,
        coords: &dyn Fn(NodeIndex) -> Option<[f64; 2]>,
        flags: &mut Vec<BondStereoFlag>,
    ) -> MarkerSummary {
        if flags.len() != mol.bond_count() {
            flags.clear();
            flags.resize(mol.bond_count(), BondStereoFlag::Plain);
        }
        let centers: Vec<AtomStereoDescriptor> = mol
            .atom_stereo()
            .iter()
            .filter(|d| is_valid_descriptor(mol, d))
            .copied()
            .collect();
        let num_centers = centers.len();
        let fixed: Vec<bool> = flags.iter().map(|&f| f != BondStereoFlag::Plain).collect();
        let problem = FlagProblem::new(mol, coords, centers);
        self.summary = solve(&problem, flags, &fixed, self.options.max_search_steps).into();
        if self.summary.num_mismatches > 0 {
            warn!(mismatches = self.summary.num_mismatches, "stereocenters not encodable");
        }
        debug!(centers = num_centers, marked = self.summary.num_marked_bonds, "stereo flags generated");
        self.summary
    }
}

fn is_valid_descriptor<A, B>(mol: &Mol<A, B>, d: &AtomStereoDescriptor) -> bool {
    (d.config.is_defined() || d.config == AtomConfiguration::Either)
        && d.center.index() < mol.atom_count()
        && d.refs.iter().flatten().all(|&r| mol.bond_between(d.center, r).is_some())
}

/// Stateless [`BondStereoFlagGenerator::generate`] with default options.
pub fn calc_bond_stereo_flags<A, B>(
    mol: &Mol<A, B>,
    flags: &mut Vec<BondStereoFlag>,
) -> Result<MarkerSummary, PerceptionError>
where
    A: HasPosition2D,
    B: HasBondOrder,
{
    BondStereoFlagGenerator::new().generate(mol, flags)
}
