//! Single bond directions (`/` and `\` in SMILES terms) for stereogenic
//! double bonds.

use petgraph::graph::{EdgeIndex, NodeIndex};
use tracing::{debug, warn};

use super::descriptor::perceive_bond_configuration;
use super::search::{solve, MarkerProblem};
use super::{passes_ring_filter, perceive_stereo_descriptors, MarkerSummary, StereoOptions};
use crate::bond::{BondDirection, BondOrder};
use crate::error::PerceptionError;
use crate::geometry::Point3;
use crate::mol::{BondConfiguration, BondStereoDescriptor, Mol};
use crate::rings::RingInfo;
use crate::traits::{HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount, HasIsotope};

struct DirectionProblem<'a, A, B> {
    mol: &'a Mol<A, B>,
    centers: Vec<BondStereoDescriptor>,
    candidates: Vec<Vec<EdgeIndex>>,
}

impl<'a, A, B: HasBondOrder> DirectionProblem<'a, A, B> {
    fn new(mol: &'a Mol<A, B>, centers: Vec<BondStereoDescriptor>) -> Self {
        let candidates = centers
            .iter()
            .map(|d| {
                let mut bonds: Vec<(bool, EdgeIndex)> = [(d.refs[1], d.refs[0]), (d.refs[2], d.refs[3])]
                    .into_iter()
                    .flat_map(|(atom, reference)| {
                        mol.bonded_neighbors(atom)
                            .filter(|&(e, _)| e != d.bond && mol.bond(e).bond_order() == Some(BondOrder::Single))
                            .map(move |(e, n)| (n != reference, e))
                    })
                    .collect();
                bonds.sort();
                bonds.into_iter().map(|(_, e)| e).collect()
            })
            .collect();
        Self {
            mol,
            centers,
            candidates,
        }
    }
}

impl<A, B> MarkerProblem for DirectionProblem<'_, A, B> {
    type Marker = BondDirection;

    fn num_centers(&self) -> usize {
        self.centers.len()
    }

    fn candidates(&self, center: usize) -> &[EdgeIndex] {
        &self.candidates[center]
    }

    fn choices(&self, _center: usize, _bond: EdgeIndex) -> [BondDirection; 2] {
        [BondDirection::Up, BondDirection::Down]
    }

    fn is_unspecified(&self, center: usize) -> bool {
        self.centers[center].config == BondConfiguration::Either
    }

    fn is_satisfied(&self, center: usize, markers: &[BondDirection]) -> bool {
        let d = &self.centers[center];
        let encoded = perceive_bond_configuration(self.mol, d.bond, d.refs, markers);
        match d.config {
            BondConfiguration::Either => !encoded.is_defined(),
            wanted => encoded == wanted,
        }
    }
}

/// Generates bond directions for the declared (or perceived) double bond
/// configurations and keeps the summary of its last run.
#[derive(Debug, Clone, Default)]
pub struct BondDirectionGenerator {
    options: StereoOptions,
    summary: MarkerSummary,
}

impl BondDirectionGenerator {
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

    pub fn set_include_ring_bonds(&mut self, include: bool) {
        self.options.include_ring_bonds = include;
    }

    pub fn set_ring_size_limit(&mut self, limit: usize) {
        self.options.ring_size_limit = limit;
    }

    pub fn num_mismatches(&self) -> usize {
        self.summary.num_mismatches
    }

    pub fn num_marked_bonds(&self) -> usize {
        self.summary.num_marked_bonds
    }

    /// Directions encoding the double bond descriptors stored in `mol`.
    ///
    /// `dirs` is resized to the bond count; if it already has one entry per
    /// bond, its directions are kept and seed the search.
    pub fn generate<A, B: HasBondOrder>(&mut self, mol: &Mol<A, B>, dirs: &mut Vec<BondDirection>) -> MarkerSummary {
        let rings = RingInfo::sssr(mol);
        let centers: Vec<BondStereoDescriptor> = mol
            .bond_stereo()
            .iter()
            .filter(|d| is_valid_descriptor(mol, d) && passes_ring_filter(&rings, d.bond, &self.options))
            .copied()
            .collect();
        self.run(mol, centers, dirs)
    }

    /// Directions encoding the double bond configurations found in `coords`.
    pub fn generate_with_coords<A, B>(
        &mut self,
        mol: &Mol<A, B>,
        coords: &dyn Fn(NodeIndex) -> Option<Point3>,
        dirs: &mut Vec<BondDirection>,
    ) -> Result<MarkerSummary, PerceptionError>
    where
        A: HasAtomicNum + HasFormalCharge + HasIsotope + HasHydrogenCount,
        B: HasBondOrder,
    {
        let (_, centers) = perceive_stereo_descriptors(mol, coords, &self.options)?;
        Ok(self.run(mol, centers, dirs))
    }

    fn run<A, B: HasBondOrder>(
        &mut self,
        mol: &Mol<A, B>,
        centers: Vec<BondStereoDescriptor>,
        dirs: &mut Vec<BondDirection>,
    ) -> MarkerSummary {
        if dirs.len() != mol.bond_count() {
            dirs.clear();
            dirs.resize(mol.bond_count(), BondDirection::None);
        }
        let fixed: Vec<bool> = dirs.iter().map(|&d| d != BondDirection::None).collect();
        let num_centers = centers.len();
        let problem = DirectionProblem::new(mol, centers);
        self.summary = solve(&problem, dirs, &fixed, self.options.max_search_steps).into();
        if self.summary.num_mismatches > 0 {
            warn!(mismatches = self.summary.num_mismatches, "double bond configurations not encodable");
        }
        debug!(bonds = num_centers, marked = self.summary.num_marked_bonds, "bond directions generated");
        self.summary
    }
}

fn is_valid_descriptor<A, B>(mol: &Mol<A, B>, d: &BondStereoDescriptor) -> bool {
    if d.config == BondConfiguration::None {
        return false;
    }
    match mol.bond_endpoints(d.bond) {
        Some((a, b)) => (a, b) == (d.refs[1], d.refs[2]) || (b, a) == (d.refs[1], d.refs[2]),
        None => false,
    }
}

/// Stateless [`BondDirectionGenerator::generate`] with default options.
pub fn calc_bond_directions<A, B: HasBondOrder>(mol: &Mol<A, B>, dirs: &mut Vec<BondDirection>) -> MarkerSummary {
    BondDirectionGenerator::new().generate(mol, dirs)
}
