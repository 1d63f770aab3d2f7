//! Functional-group library and the pattern phase of bond order
//! perception.
//!
//! Each group is a small query graph whose atoms carry a conjunction of
//! match expressions and the formal charge the group implies, and whose
//! bonds carry the order to assign. Every embedding is scored against the
//! coordinates; embeddings are committed best first and rejected when they
//! touch an atom an earlier embedding already claimed.

use petgraph::graph::{EdgeIndex, NodeIndex};
use tracing::{debug, trace};

use super::geometry::AtomGeometry;
use super::{ScoringWeights, Workspace};
use crate::bond::UNDEFINED_ORDER;
use crate::element::covalent_radius;
use crate::geometry::distance;
use crate::mol::Mol;
use crate::substruct::{SubstructMatch, SubstructurePatternOracle};
use crate::traits::{HasAtomicNum, HasHydrogenCount};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomMatchExpr {
    AtomicNum(u8),
    ExplicitDegree(usize),
    /// Explicit neighbours plus implicit hydrogens.
    TotalDegree(usize),
    HydrogenCount(u8),
    Geometry(AtomGeometry),
    NotGeometry(AtomGeometry),
}

#[derive(Debug, Clone, Copy)]
pub struct PatternAtom {
    pub exprs: &'static [AtomMatchExpr],
    /// Formal charge the atom carries in the group.
    pub charge: i8,
}

#[derive(Debug)]
pub struct FunctionalGroup {
    pub name: &'static str,
    pub atoms: &'static [PatternAtom],
    /// `(atom, atom, order)` triples over `atoms`.
    pub bonds: &'static [(usize, usize, u8)],
}

impl FunctionalGroup {
    pub(crate) fn query(&self) -> Mol<PatternAtom, u8> {
        let mut query = Mol::new();
        let idx: Vec<NodeIndex> = self.atoms.iter().map(|a| query.add_atom(*a)).collect();
        for &(a, b, order) in self.bonds {
            query.add_bond(idx[a], idx[b], order);
        }
        query
    }
}

use AtomMatchExpr::*;

const fn atom(exprs: &'static [AtomMatchExpr], charge: i8) -> PatternAtom {
    PatternAtom { exprs, charge }
}

const O_TERMINAL: &[AtomMatchExpr] = &[AtomicNum(8), TotalDegree(1)];
const O_SUBSTITUTED: &[AtomMatchExpr] = &[AtomicNum(8), TotalDegree(2)];
const N_TERMINAL: &[AtomMatchExpr] = &[AtomicNum(7), TotalDegree(1)];
const C_TRIGONAL: &[AtomMatchExpr] = &[AtomicNum(6), TotalDegree(3), NotGeometry(AtomGeometry::Tetrahedral)];

pub static FUNCTIONAL_GROUPS: &[FunctionalGroup] = &[
    FunctionalGroup {
        name: "nitro",
        atoms: &[
            atom(&[AtomicNum(7), TotalDegree(3), NotGeometry(AtomGeometry::Tetrahedral)], 1),
            atom(O_TERMINAL, 0),
            atom(O_TERMINAL, -1),
        ],
        bonds: &[(0, 1, 2), (0, 2, 1)],
    },
    FunctionalGroup {
        name: "azide",
        atoms: &[
            atom(&[AtomicNum(7), TotalDegree(2)], 0),
            atom(&[AtomicNum(7), ExplicitDegree(2), TotalDegree(2), Geometry(AtomGeometry::Linear)], 1),
            atom(N_TERMINAL, -1),
        ],
        bonds: &[(0, 1, 2), (1, 2, 2)],
    },
    FunctionalGroup {
        name: "carboxylic_acid",
        atoms: &[atom(C_TRIGONAL, 0), atom(O_TERMINAL, 0), atom(O_SUBSTITUTED, 0)],
        bonds: &[(0, 1, 2), (0, 2, 1)],
    },
    FunctionalGroup {
        name: "carboxylate",
        atoms: &[atom(C_TRIGONAL, 0), atom(O_TERMINAL, 0), atom(O_TERMINAL, -1)],
        bonds: &[(0, 1, 2), (0, 2, 1)],
    },
    FunctionalGroup {
        name: "sulfate",
        atoms: &[
            atom(&[AtomicNum(16), TotalDegree(4)], 0),
            atom(O_TERMINAL, 0),
            atom(O_TERMINAL, 0),
            atom(O_TERMINAL, -1),
            atom(O_TERMINAL, -1),
        ],
        bonds: &[(0, 1, 2), (0, 2, 2), (0, 3, 1), (0, 4, 1)],
    },
    FunctionalGroup {
        name: "sulfonate",
        atoms: &[
            atom(&[AtomicNum(16), TotalDegree(4)], 0),
            atom(O_TERMINAL, 0),
            atom(O_TERMINAL, 0),
            atom(O_TERMINAL, -1),
        ],
        bonds: &[(0, 1, 2), (0, 2, 2), (0, 3, 1)],
    },
    FunctionalGroup {
        name: "sulfonyl",
        atoms: &[
            atom(&[AtomicNum(16), TotalDegree(4)], 0),
            atom(O_TERMINAL, 0),
            atom(O_TERMINAL, 0),
        ],
        bonds: &[(0, 1, 2), (0, 2, 2)],
    },
    FunctionalGroup {
        name: "sulfoxide",
        atoms: &[atom(&[AtomicNum(16), TotalDegree(3)], 0), atom(O_TERMINAL, 0)],
        bonds: &[(0, 1, 2)],
    },
    FunctionalGroup {
        name: "phosphate_ion",
        atoms: &[
            atom(&[AtomicNum(15), TotalDegree(4)], 0),
            atom(O_TERMINAL, 0),
            atom(O_TERMINAL, -1),
            atom(O_TERMINAL, -1),
            atom(O_TERMINAL, -1),
        ],
        bonds: &[(0, 1, 2), (0, 2, 1), (0, 3, 1), (0, 4, 1)],
    },
    FunctionalGroup {
        name: "phosphate",
        atoms: &[atom(&[AtomicNum(15), TotalDegree(4)], 0), atom(O_TERMINAL, 0)],
        bonds: &[(0, 1, 2)],
    },
    FunctionalGroup {
        name: "nitrile",
        atoms: &[
            atom(&[AtomicNum(6), TotalDegree(2), NotGeometry(AtomGeometry::Tetrahedral)], 0),
            atom(N_TERMINAL, 0),
        ],
        bonds: &[(0, 1, 3)],
    },
];

pub fn functional_group(name: &str) -> Option<&'static FunctionalGroup> {
    FUNCTIONAL_GROUPS.iter().find(|g| g.name == name)
}

fn expr_matches<A, B>(mol: &Mol<A, B>, ws: &Workspace, atom: NodeIndex, expr: &AtomMatchExpr) -> bool
where
    A: HasAtomicNum + HasHydrogenCount,
{
    match *expr {
        AtomicNum(z) => mol.atom(atom).atomic_num() == z,
        ExplicitDegree(d) => mol.degree(atom) == d,
        TotalDegree(d) => mol.total_degree(atom) == d,
        HydrogenCount(h) => mol.atom(atom).hydrogen_count() == h,
        Geometry(g) => ws.geometries[atom.index()] == g,
        NotGeometry(g) => ws.geometries[atom.index()] != g,
    }
}

/// Geometric fit of a bond length to the covalent-radius estimate for
/// `order`, in `[0, weights.bond_length]`.
pub(crate) fn bond_length_score(z1: u8, z2: u8, length: f64, order: u8, weights: &ScoringWeights) -> f64 {
    let (r1, r2) = match (covalent_radius(z1), covalent_radius(z2)) {
        (Some(r1), Some(r2)) => (r1, r2),
        _ => return 0.0,
    };
    let factor = match order {
        2 => weights.double_bond_factor,
        3 => weights.triple_bond_factor,
        _ => 1.0,
    };
    let deviation = (length - (r1 + r2) * factor).abs();
    weights.bond_length * (1.0 - deviation / weights.length_tolerance).max(0.0)
}

/// Compatibility of one bond end with the atom's perceived geometry.
pub(crate) fn geometry_score(geometry: AtomGeometry, order: u8, weights: &ScoringWeights) -> f64 {
    match (geometry, order) {
        (AtomGeometry::Tetrahedral, 1) => 0.0,
        (AtomGeometry::Tetrahedral, _) => -weights.geometry,
        (AtomGeometry::TrigonalPlanar, 2) => weights.geometry,
        (AtomGeometry::Linear, 3) => weights.geometry,
        (AtomGeometry::Linear, 2) => 0.5 * weights.geometry,
        _ => 0.0,
    }
}

/// Score of assigning `order` to `bond` under the current workspace.
pub(crate) fn bond_order_score<A, B>(
    mol: &Mol<A, B>,
    ws: &Workspace,
    bond: EdgeIndex,
    order: u8,
    weights: &ScoringWeights,
) -> f64
where
    A: HasAtomicNum,
{
    let (a, b) = mol.endpoints(bond);
    let length = distance(&ws.positions[a.index()], &ws.positions[b.index()]);
    bond_length_score(mol.atom(a).atomic_num(), mol.atom(b).atomic_num(), length, order, weights)
        + geometry_score(ws.geometries[a.index()], order, weights)
        + geometry_score(ws.geometries[b.index()], order, weights)
}

fn calc_mapping_score<A, B>(
    mol: &Mol<A, B>,
    ws: &Workspace,
    query: &Mol<PatternAtom, u8>,
    m: &SubstructMatch,
    weights: &ScoringWeights,
) -> f64
where
    A: HasAtomicNum,
{
    m.bonds
        .iter()
        .map(|&(qb, tb)| bond_order_score(mol, ws, tb, *query.bond(qb), weights))
        .sum()
}

struct ScoredMatch {
    group: &'static FunctionalGroup,
    query_index: usize,
    m: SubstructMatch,
    score: f64,
}

/// Assign bond orders and charges dictated by the best non-overlapping
/// functional-group embeddings. Returns the committed groups with their
/// target atoms in pattern atom order.
pub(crate) fn assign_functional_group_bonds<A, B, O>(
    mol: &Mol<A, B>,
    ws: &mut Workspace,
    oracle: &O,
    groups: &[&'static FunctionalGroup],
    weights: &ScoringWeights,
) -> Vec<(&'static str, Vec<NodeIndex>)>
where
    A: HasAtomicNum + HasHydrogenCount,
    O: SubstructurePatternOracle,
{
    let queries: Vec<Mol<PatternAtom, u8>> = groups.iter().map(|g| g.query()).collect();
    let mut scored: Vec<ScoredMatch> = Vec::new();

    for (gi, (group, query)) in groups.iter().zip(&queries).enumerate() {
        let state: &Workspace = ws;
        let atom_match = |t: NodeIndex, q: NodeIndex| {
            query.atom(q).exprs.iter().all(|e| expr_matches(mol, state, t, e))
        };
        let bond_match = |t: EdgeIndex, q: EdgeIndex| {
            let current = state.orders[t.index()];
            current == UNDEFINED_ORDER || current == *query.bond(q)
        };
        for m in oracle.find_matches(mol, query, &atom_match, &bond_match) {
            let score = calc_mapping_score(mol, state, query, &m, weights);
            trace!(group = group.name, score, "functional group embedding");
            scored.push(ScoredMatch {
                group: *group,
                query_index: gi,
                m,
                score,
            });
        }
    }

    // Stable sort keeps discovery order among equal scores, so groups listed
    // first win ties. Ions precede their partial patterns.
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut committed = Vec::new();
    for sm in scored {
        if sm.m.atoms.iter().any(|&(_, t)| ws.consumed[t.index()]) {
            continue;
        }
        let query = &queries[sm.query_index];
        for &(qb, tb) in &sm.m.bonds {
            if ws.orders[tb.index()] == UNDEFINED_ORDER {
                ws.orders[tb.index()] = *query.bond(qb);
            }
        }
        let mut atoms = Vec::with_capacity(sm.m.atoms.len());
        for &(qa, ta) in &sm.m.atoms {
            ws.charges[ta.index()] = query.atom(qa).charge;
            ws.consumed[ta.index()] = true;
            atoms.push(ta);
        }
        debug!(group = sm.group.name, score = sm.score, "functional group assigned");
        committed.push((sm.group.name, atoms));
    }
    committed
}
