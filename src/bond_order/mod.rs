//! Bond order perception from 3D coordinates and connectivity.
//!
//! Undefined bonds are resolved in fixed phases, each touching only the
//! bonds the previous phases left undefined:
//!
//! 1. free valences from the valence model,
//! 2. atom geometries from bond angles, with a flat-ring correction,
//! 3. single bonds around tetrahedral atoms,
//! 4. functional-group patterns that fix orders and charges, followed by
//!    single bonds around saturated atoms,
//! 5. a branch-and-bound search over every connected fragment of the
//!    remaining undefined bonds,
//! 6. a Kekulé pass for whatever is still undefined.
//!
//! ```
//! use chemcrab_perceive::{calc_bond_orders, Atom, Bond, Mol, WithPosition3D};
//!
//! let mut mol = Mol::new();
//! let a = mol.add_atom(WithPosition3D::new(Atom::with_hydrogens(6, 2), 0.0, 0.0, 0.0));
//! let b = mol.add_atom(WithPosition3D::new(Atom::with_hydrogens(6, 2), 1.33, 0.0, 0.0));
//! mol.add_bond(a, b, Bond::undefined());
//!
//! let mut orders = Vec::new();
//! let report = calc_bond_orders(&mol, &mut orders).unwrap();
//! assert_eq!(orders, vec![2]);
//! assert!(report.unresolved_atoms.is_empty());
//! ```

mod conjugation;
pub mod geometry;
pub mod patterns;
mod search;

use petgraph::graph::{EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use geometry::AtomGeometry;
pub use patterns::{functional_group, AtomMatchExpr, FunctionalGroup, FUNCTIONAL_GROUPS};

use crate::bond::{BondOrder, UNDEFINED_ORDER};
use crate::element::element_data;
use crate::error::PerceptionError;
use crate::geometry::Point3;
use crate::kekule::kekulize_undefined;
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::substruct::{SubstructurePatternOracle, Vf2Oracle};
use crate::traits::{HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount, HasPosition3D};
use crate::valence::{allowed_valences, bond_order_sum, check_valence_state, free_valence_with_charge};

/// Heuristic that selects the undefined bonds rewarded for becoming part
/// of a conjugated system during the fragment search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConjugationDetector {
    /// Bonds between planar atoms whose substituents are coplanar.
    PlanarPiBonds,
    /// Bonds of flat rings made of planar atoms.
    #[default]
    ConjugatedRingBonds,
}

/// Tunable constants of the mapping and assignment scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Score of a bond whose length matches the covalent-radius estimate.
    pub bond_length: f64,
    /// Length deviation (Å) at which the bond length score drops to zero.
    pub length_tolerance: f64,
    /// Double bond length relative to the single bond radius sum.
    pub double_bond_factor: f64,
    /// Triple bond length relative to the single bond radius sum.
    pub triple_bond_factor: f64,
    /// Score of a bond end whose order fits the atom geometry.
    pub geometry: f64,
    /// Bonus for a multiple bond on a bond marked as conjugated.
    pub conjugation_bonus: f64,
    /// Penalty per bond order unit an atom takes beyond its lowest valence.
    pub expanded_valence: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            bond_length: 1.0,
            length_tolerance: 0.25,
            double_bond_factor: 0.87,
            triple_bond_factor: 0.78,
            geometry: 1.0,
            conjugation_bonus: 0.5,
            expanded_valence: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BondOrderOptions {
    /// Keep bond orders that are already defined.
    pub undefined_only: bool,
    pub conjugation_detector: ConjugationDetector,
    /// Fail on elements without valence data and unknown group names
    /// instead of skipping them.
    pub strict: bool,
    /// Search steps allowed per fragment in the branch-and-bound phase.
    pub max_search_steps: usize,
    /// Names of the functional groups to apply; `None` applies the whole
    /// library.
    pub functional_groups: Option<Vec<String>>,
    pub weights: ScoringWeights,
}

impl Default for BondOrderOptions {
    fn default() -> Self {
        Self {
            undefined_only: true,
            conjugation_detector: ConjugationDetector::default(),
            strict: false,
            max_search_steps: 250_000,
            functional_groups: None,
            weights: ScoringWeights::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BondOrderReport {
    /// Formal charge of every atom: the input charge, or the charge a
    /// matched functional group assigns.
    pub formal_charges: Vec<i8>,
    pub geometries: Vec<AtomGeometry>,
    /// Committed functional groups with their atoms in pattern order.
    pub pattern_matches: Vec<(&'static str, Vec<NodeIndex>)>,
    /// Bonds that were still undefined after the fragment search.
    pub kekule_fallback_bonds: Vec<EdgeIndex>,
    /// Atoms left in an invalid valence state.
    pub unresolved_atoms: Vec<NodeIndex>,
}

/// Per-run state shared by the phases.
pub(crate) struct Workspace {
    pub(crate) positions: Vec<Point3>,
    pub(crate) orders: Vec<u8>,
    pub(crate) charges: Vec<i8>,
    pub(crate) geometries: Vec<AtomGeometry>,
    /// Atoms claimed by a committed functional group.
    pub(crate) consumed: Vec<bool>,
}

impl Workspace {
    fn gap<A, B>(&self, mol: &Mol<A, B>, atom: NodeIndex) -> Option<i16>
    where
        A: HasAtomicNum + HasHydrogenCount,
    {
        let free = free_valence_with_charge(mol, atom, &self.orders, self.charges[atom.index()])?;
        let (_, undefined) = bond_order_sum(mol, atom, &self.orders);
        Some(free - undefined as i16)
    }

    fn set_undefined_single<A, B>(&mut self, mol: &Mol<A, B>, atom: NodeIndex) -> usize {
        let mut count = 0;
        for e in mol.bonds_of(atom) {
            if self.orders[e.index()] == UNDEFINED_ORDER {
                self.orders[e.index()] = 1;
                count += 1;
            }
        }
        count
    }
}

/// Bond order perception with a reusable workspace and the result of the
/// last run.
#[derive(Debug, Clone, Default)]
pub struct BondOrderGenerator<O = Vf2Oracle> {
    options: BondOrderOptions,
    oracle: O,
    report: BondOrderReport,
}

impl BondOrderGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: BondOrderOptions) -> Self {
        Self::with_oracle(options, Vf2Oracle::default())
    }
}

impl<O: SubstructurePatternOracle> BondOrderGenerator<O> {
    pub fn with_oracle(options: BondOrderOptions, oracle: O) -> Self {
        Self {
            options,
            oracle,
            report: BondOrderReport::default(),
        }
    }

    pub fn options(&self) -> &BondOrderOptions {
        &self.options
    }

    pub fn set_undefined_only(&mut self, undefined_only: bool) {
        self.options.undefined_only = undefined_only;
    }

    pub fn set_conjugation_detector(&mut self, detector: ConjugationDetector) {
        self.options.conjugation_detector = detector;
    }

    pub fn set_strict(&mut self, strict: bool) {
        self.options.strict = strict;
    }

    pub fn report(&self) -> &BondOrderReport {
        &self.report
    }

    pub fn geometries(&self) -> &[AtomGeometry] {
        &self.report.geometries
    }

    /// Perceive the orders of all undefined bonds of `mol`.
    ///
    /// `orders` is resized to the bond count. When `undefined_only` is set,
    /// its non-zero entries (if it already has one entry per bond) and the
    /// stored orders of the bonds are kept. On error `orders` and the
    /// previous report are left untouched.
    pub fn generate<A, B>(
        &mut self,
        mol: &Mol<A, B>,
        orders: &mut Vec<u8>,
    ) -> Result<&BondOrderReport, PerceptionError>
    where
        A: HasAtomicNum + HasFormalCharge + HasHydrogenCount + HasPosition3D,
        B: HasBondOrder,
    {
        let positions = collect_positions(mol)?;
        if self.options.strict {
            check_elements(mol)?;
        }
        let groups = self.resolve_groups()?;

        let mut ws = Workspace {
            positions,
            orders: initial_orders(mol, orders, self.options.undefined_only),
            charges: mol.atoms().map(|a| mol.atom(a).formal_charge()).collect(),
            geometries: Vec::new(),
            consumed: vec![false; mol.atom_count()],
        };

        let open = mol.atoms().filter(|&a| ws.gap(mol, a).is_some_and(|g| g > 0)).count();
        debug!(atoms = mol.atom_count(), open, "free valences computed");

        ws.geometries = geometry::perceive_geometries(mol, &ws.positions, &ws.orders, &ws.charges);
        let rings = RingInfo::sssr(mol);
        geometry::fix_ring_atom_geometries(mol, &rings, &ws.positions, &mut ws.geometries);
        debug!(rings = rings.num_rings(), "atom geometries perceived");

        let fixed = assign_tetrahedral_atom_bonds(mol, &mut ws);
        debug!(bonds = fixed, "tetrahedral atom bonds assigned");

        let pattern_matches =
            patterns::assign_functional_group_bonds(mol, &mut ws, &self.oracle, &groups, &self.options.weights);
        let fixed = assign_saturated_atom_bonds(mol, &mut ws);
        debug!(groups = pattern_matches.len(), saturated = fixed, "functional groups assigned");

        let marked = match self.options.conjugation_detector {
            ConjugationDetector::PlanarPiBonds => conjugation::mark_planar_pi_bonds(mol, &ws),
            ConjugationDetector::ConjugatedRingBonds => conjugation::mark_conj_ring_bonds(mol, &ws, &rings),
        };
        search::assign_fragment_bond_orders(
            mol,
            &mut ws,
            &marked,
            &self.options.weights,
            self.options.max_search_steps,
        );

        let kekule_fallback_bonds: Vec<EdgeIndex> = mol
            .bonds()
            .filter(|e| ws.orders[e.index()] == UNDEFINED_ORDER)
            .collect();
        let mut unresolved_atoms = Vec::new();
        if !kekule_fallback_bonds.is_empty() {
            debug!(bonds = kekule_fallback_bonds.len(), "kekule fallback");
            let kekule = kekulize_undefined(mol, &mut ws.orders, &ws.charges);
            unresolved_atoms.extend(kekule.unmatched_atoms);
        }
        for atom in mol.atoms() {
            let a = mol.atom(atom);
            let total: u8 = mol
                .bonds_of(atom)
                .map(|e| ws.orders[e.index()])
                .fold(a.hydrogen_count(), u8::saturating_add);
            if !check_valence_state(a.atomic_num(), ws.charges[atom.index()], total) {
                unresolved_atoms.push(atom);
            }
        }
        unresolved_atoms.sort();
        unresolved_atoms.dedup();
        if !unresolved_atoms.is_empty() {
            warn!(atoms = unresolved_atoms.len(), "bond orders leave atoms in invalid valence states");
        }

        orders.clear();
        orders.extend_from_slice(&ws.orders);
        self.report = BondOrderReport {
            formal_charges: ws.charges,
            geometries: ws.geometries,
            pattern_matches,
            kekule_fallback_bonds,
            unresolved_atoms,
        };
        Ok(&self.report)
    }

    fn resolve_groups(&self) -> Result<Vec<&'static FunctionalGroup>, PerceptionError> {
        let names = match &self.options.functional_groups {
            None => return Ok(FUNCTIONAL_GROUPS.iter().collect()),
            Some(names) => names,
        };
        let mut groups = Vec::with_capacity(names.len());
        for name in names {
            match functional_group(name) {
                Some(g) => groups.push(g),
                None if self.options.strict => return Err(PerceptionError::PatternLookup(name.clone())),
                None => warn!(name = name.as_str(), "unknown functional group skipped"),
            }
        }
        Ok(groups)
    }
}

/// Stateless bond order perception using planar pi bond marking.
pub fn calc_bond_orders<A, B>(mol: &Mol<A, B>, orders: &mut Vec<u8>) -> Result<BondOrderReport, PerceptionError>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount + HasPosition3D,
    B: HasBondOrder,
{
    let mut generator = BondOrderGenerator::with_options(BondOrderOptions {
        conjugation_detector: ConjugationDetector::PlanarPiBonds,
        ..BondOrderOptions::default()
    });
    generator.generate(mol, orders)?;
    Ok(generator.report)
}

fn collect_positions<A: HasPosition3D, B>(mol: &Mol<A, B>) -> Result<Vec<Point3>, PerceptionError> {
    mol.atoms()
        .map(|a| {
            mol.atom(a)
                .position_3d()
                .ok_or(PerceptionError::MissingCoordinates(a))
        })
        .collect()
}

fn check_elements<A: HasAtomicNum, B>(mol: &Mol<A, B>) -> Result<(), PerceptionError> {
    for atom in mol.atoms() {
        let atomic_num = mol.atom(atom).atomic_num();
        if element_data(atomic_num).is_none() {
            return Err(PerceptionError::UnknownElement { atom, atomic_num });
        }
    }
    Ok(())
}

fn initial_orders<A, B: HasBondOrder>(mol: &Mol<A, B>, orders: &[u8], undefined_only: bool) -> Vec<u8> {
    if !undefined_only {
        return vec![UNDEFINED_ORDER; mol.bond_count()];
    }
    let sized = orders.len() == mol.bond_count();
    mol.bonds()
        .map(|e| match orders.get(e.index()) {
            Some(&o) if sized && o != UNDEFINED_ORDER => o,
            _ => mol.bond(e).bond_order().map_or(UNDEFINED_ORDER, BondOrder::as_u8),
        })
        .collect()
}

/// Tetrahedral atoms without an expanded octet, and atoms outside the
/// valence model, only bear single bonds.
fn assign_tetrahedral_atom_bonds<A, B>(mol: &Mol<A, B>, ws: &mut Workspace) -> usize
where
    A: HasAtomicNum + HasHydrogenCount,
{
    let mut count = 0;
    for atom in mol.atoms() {
        let allowed = allowed_valences(mol.atom(atom).atomic_num(), ws.charges[atom.index()]);
        let octet_only = allowed.last().is_some_and(|&v| v <= 4);
        if allowed.is_empty() || (octet_only && ws.geometries[atom.index()] == AtomGeometry::Tetrahedral) {
            count += ws.set_undefined_single(mol, atom);
        }
    }
    count
}

/// Atoms without room for a multiple bond only bear single bonds.
fn assign_saturated_atom_bonds<A, B>(mol: &Mol<A, B>, ws: &mut Workspace) -> usize
where
    A: HasAtomicNum + HasHydrogenCount,
{
    let mut count = 0;
    for atom in mol.atoms() {
        if ws.gap(mol, atom).is_some_and(|g| g <= 0) {
            count += ws.set_undefined_single(mol, atom);
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{build_3d, hexagon};
    use crate::valence::check_valence;
    use crate::{Atom, Bond, WithPosition3D};

    type Mol3 = Mol<WithPosition3D<Atom>, Bond>;

    fn ethylene() -> Mol3 {
        build_3d(
            &[(6, 0, 2, [0.0, 0.0, 0.0]), (6, 0, 2, [1.34, 0.0, 0.0])],
            &[(0, 1, 0)],
        )
    }

    fn benzene() -> Mol3 {
        let atoms: Vec<(u8, i8, u8, Point3)> = hexagon(1.39).into_iter().map(|p| (6, 0, 1, p)).collect();
        let bonds: Vec<(usize, usize, u8)> = (0..6).map(|i| (i, (i + 1) % 6, 0)).collect();
        build_3d(&atoms, &bonds)
    }

    pub(crate) fn nitromethane() -> Mol3 {
        build_3d(
            &[
                (7, 0, 0, [0.0, 0.0, 0.0]),
                (8, 0, 0, [0.61, 1.06, 0.0]),
                (8, 0, 0, [0.61, -1.06, 0.0]),
                (6, 0, 3, [-1.47, 0.0, 0.0]),
            ],
            &[(0, 1, 0), (0, 2, 0), (0, 3, 0)],
        )
    }

    fn acetate() -> Mol3 {
        build_3d(
            &[
                (6, 0, 3, [-1.52, 0.0, 0.0]),
                (6, 0, 0, [0.0, 0.0, 0.0]),
                (8, 0, 0, [0.63, 1.08, 0.0]),
                (8, 0, 0, [0.63, -1.08, 0.0]),
            ],
            &[(0, 1, 0), (1, 2, 0), (1, 3, 0)],
        )
    }

    #[test]
    fn ethylene_and_acetylene() {
        let mut orders = Vec::new();
        calc_bond_orders(&ethylene(), &mut orders).unwrap();
        assert_eq!(orders, vec![2]);

        let acetylene = build_3d(
            &[(6, 0, 1, [0.0, 0.0, 0.0]), (6, 0, 1, [1.20, 0.0, 0.0])],
            &[(0, 1, 0)],
        );
        let mut orders = Vec::new();
        calc_bond_orders(&acetylene, &mut orders).unwrap();
        assert_eq!(orders, vec![3]);
    }

    #[test]
    fn benzene_gets_three_alternating_double_bonds() {
        let mol = benzene();
        let mut generator = BondOrderGenerator::new();
        let mut orders = Vec::new();
        let report = generator.generate(&mol, &mut orders).unwrap();
        assert!(report.kekule_fallback_bonds.is_empty());
        assert!(report.unresolved_atoms.is_empty());
        assert!(report.geometries.iter().all(|&g| g == AtomGeometry::TrigonalPlanar));
        assert_eq!(orders.iter().filter(|&&o| o == 2).count(), 3);
        for i in 0..6 {
            assert_ne!(orders[i], orders[(i + 1) % 6]);
        }
    }

    #[test]
    fn detectors_agree_on_benzene() {
        let mol = benzene();
        let mut ring_orders = Vec::new();
        BondOrderGenerator::new().generate(&mol, &mut ring_orders).unwrap();
        let mut pi_orders = Vec::new();
        calc_bond_orders(&mol, &mut pi_orders).unwrap();
        assert_eq!(ring_orders.iter().sum::<u8>(), pi_orders.iter().sum::<u8>());
    }

    #[test]
    fn nitro_group_gets_charges() {
        let mol = nitromethane();
        let mut orders = Vec::new();
        let report = calc_bond_orders(&mol, &mut orders).unwrap();
        assert_eq!(report.pattern_matches.len(), 1);
        assert_eq!(report.pattern_matches[0].0, "nitro");

        let no_orders = [orders[0], orders[1]];
        assert!(no_orders.contains(&1) && no_orders.contains(&2));
        assert_eq!(orders[2], 1);
        assert_eq!(report.formal_charges[0], 1);
        let single_o = if orders[0] == 1 { 1 } else { 2 };
        assert_eq!(report.formal_charges[single_o], -1);
        assert_eq!(report.formal_charges[3 - single_o], 0);
        assert!(check_valence(&mol, &orders, Some(&report.formal_charges)).is_ok());
    }

    #[test]
    fn carboxylate_from_uncharged_input() {
        let mol = acetate();
        let mut orders = Vec::new();
        let report = calc_bond_orders(&mol, &mut orders).unwrap();
        assert_eq!(report.pattern_matches[0].0, "carboxylate");
        assert_eq!(orders[0], 1);
        assert_eq!(orders[1] + orders[2], 3);
        assert_eq!(report.formal_charges.iter().map(|&c| c as i32).sum::<i32>(), -1);
    }

    /// Central atom at the origin with four terminal oxygens at `length`
    /// along the tetrahedral directions.
    fn tetrahedral_oxyanion(center: u8, length: f64) -> Mol3 {
        let d = length / 3f64.sqrt();
        build_3d(
            &[
                (center, 0, 0, [0.0, 0.0, 0.0]),
                (8, 0, 0, [d, d, d]),
                (8, 0, 0, [-d, -d, d]),
                (8, 0, 0, [-d, d, -d]),
                (8, 0, 0, [d, -d, -d]),
            ],
            &[(0, 1, 0), (0, 2, 0), (0, 3, 0), (0, 4, 0)],
        )
    }

    #[test]
    fn phosphate_and_sulfate_ions() {
        for (center, length, name, doubles, charge) in [(15, 1.52, "phosphate_ion", 1, -3), (16, 1.49, "sulfate", 2, -2)] {
            let mol = tetrahedral_oxyanion(center, length);
            let mut orders = Vec::new();
            let report = calc_bond_orders(&mol, &mut orders).unwrap();
            assert_eq!(report.pattern_matches.len(), 1, "{name}");
            assert_eq!(report.pattern_matches[0].0, name);
            assert_eq!(orders.iter().filter(|&&o| o == 2).count(), doubles, "{name}");
            assert!(!orders.contains(&3));
            assert_eq!(report.formal_charges.iter().map(|&c| c as i32).sum::<i32>(), charge, "{name}");
            for (bond, &order) in orders.iter().enumerate() {
                let expected = if order == 2 { 0 } else { -1 };
                assert_eq!(report.formal_charges[bond + 1], expected, "{name}");
            }
            assert!(report.unresolved_atoms.is_empty(), "{name}");
            assert!(check_valence(&mol, &orders, Some(&report.formal_charges)).is_ok());
        }
    }

    #[test]
    fn exhausted_search_falls_back_to_kekule() {
        let options = BondOrderOptions {
            max_search_steps: 3,
            ..BondOrderOptions::default()
        };
        let mut generator = BondOrderGenerator::with_options(options);
        let mut orders = Vec::new();
        let report = generator.generate(&benzene(), &mut orders).unwrap();
        let all: Vec<EdgeIndex> = (0..6).map(EdgeIndex::new).collect();
        assert_eq!(report.kekule_fallback_bonds, all);
        assert!(report.unresolved_atoms.is_empty());
        assert_eq!(orders.iter().filter(|&&o| o == 2).count(), 3);
    }

    #[test]
    fn rerun_is_a_fixed_point() {
        let mol = benzene();
        let mut orders = Vec::new();
        let mut generator = BondOrderGenerator::new();
        generator.generate(&mol, &mut orders).unwrap();
        let first = orders.clone();
        generator.generate(&mol, &mut orders).unwrap();
        assert_eq!(orders, first);
    }

    #[test]
    fn undefined_only_keeps_existing_orders() {
        let mol = ethylene();
        let mut orders = vec![1];
        let report = calc_bond_orders(&mol, &mut orders).unwrap();
        assert_eq!(orders, vec![1]);
        assert_eq!(report.unresolved_atoms.len(), 2);

        let mut generator = BondOrderGenerator::new();
        generator.set_undefined_only(false);
        let mut orders = vec![1];
        generator.generate(&mol, &mut orders).unwrap();
        assert_eq!(orders, vec![2]);
    }

    #[test]
    fn missing_coordinates_is_fatal() {
        let mut mol = ethylene();
        mol.atom_mut(NodeIndex::new(1)).position_3d = None;
        let mut orders = vec![7, 7];
        let err = calc_bond_orders(&mol, &mut orders).unwrap_err();
        assert_eq!(err, PerceptionError::MissingCoordinates(NodeIndex::new(1)));
        assert_eq!(orders, vec![7, 7]);
    }

    #[test]
    fn strict_mode_lookups() {
        let mut options = BondOrderOptions {
            strict: true,
            functional_groups: Some(vec!["nitro".into(), "peroxide".into()]),
            ..BondOrderOptions::default()
        };
        let mut orders = Vec::new();
        let err = BondOrderGenerator::with_options(options.clone())
            .generate(&nitromethane(), &mut orders)
            .unwrap_err();
        assert_eq!(err, PerceptionError::PatternLookup("peroxide".into()));

        options.strict = false;
        let mut generator = BondOrderGenerator::with_options(options);
        let report = generator.generate(&nitromethane(), &mut orders).unwrap();
        assert_eq!(report.pattern_matches.len(), 1);

        let uranium = build_3d(&[(92, 0, 0, [0.0; 3])], &[]);
        let mut strict = BondOrderGenerator::new();
        strict.set_strict(true);
        assert!(matches!(
            strict.generate(&uranium, &mut orders),
            Err(PerceptionError::UnknownElement { atomic_num: 92, .. })
        ));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: BondOrderOptions =
            serde_json::from_str(r#"{"undefined_only": false, "weights": {"geometry": 2.0}}"#).unwrap();
        assert!(!options.undefined_only);
        assert_eq!(options.max_search_steps, 250_000);
        assert_eq!(options.weights.geometry, 2.0);
        assert_eq!(options.weights.bond_length, 1.0);
        assert_eq!(options.conjugation_detector, ConjugationDetector::ConjugatedRingBonds);
    }
}
