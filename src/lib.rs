pub mod alignment;
pub mod atom;
pub mod bond;
pub mod bond_order;
pub mod canonical;
pub mod clique;
pub mod conjugation;
pub mod element;
pub mod error;
pub mod geometry;
pub mod kekule;
pub mod mol;
pub mod resonance;
pub mod rings;
pub mod stereo;
pub mod substruct;
pub mod traits;
pub mod valence;
pub mod wrappers;

pub use petgraph::graph::{EdgeIndex, NodeIndex};

pub use alignment::{topological_atom_aligner, TopologicalEntityAligner};
pub use atom::Atom;
pub use bond::{Bond, BondDirection, BondOrder, BondStereoFlag};
pub use bond_order::{
    calc_bond_orders, AtomGeometry, BondOrderGenerator, BondOrderOptions, BondOrderReport, ConjugationDetector,
    ScoringWeights,
};
pub use canonical::{calc_canonical_numbering, symmetry_classes};
pub use clique::BronKerbosch;
pub use element::ElementData;
pub use error::PerceptionError;
pub use kekule::{kekulize, perceive_kekule_structure, KekuleReport};
pub use mol::{AtomConfiguration, AtomStereoDescriptor, BondConfiguration, BondStereoDescriptor, Mol};
pub use resonance::{ResonanceOptions, ResonanceStructure, ResonanceStructureGenerator};
pub use rings::{Ring, RingInfo};
pub use stereo::{
    atom_configuration_from_coords, bond_configuration_from_coords, calc_bond_directions, calc_bond_stereo_flags,
    perceive_atom_configuration_2d, perceive_bond_configuration, perceive_stereo_descriptors,
    BondDirectionGenerator, BondStereoFlagGenerator, MarkerSummary, StereoOptions,
};
pub use substruct::{SubstructMatch, SubstructurePatternOracle, Vf2Oracle};
pub use traits::{
    HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount, HasIsotope, HasPosition2D, HasPosition3D,
};
pub use valence::{
    allowed_valences, check_valence, check_valence_state, free_valence, octet_electron_count, standard_valence,
    ValenceError,
};
pub use wrappers::{WithPosition2D, WithPosition3D};
