//! Kekulé structures for the undefined-bond subgraph of a working
//! assignment.
//!
//! Every connected component of undefined bonds (order `0`) is resolved
//! independently. Atoms that still need a double bond after counting their
//! undefined bonds as single are paired by a maximum matching over the
//! undefined bonds between them; matched bonds become double, all other
//! undefined bonds single.
//! Components without a perfect matching are reported, and their leftover
//! bonds are still set to single so the output is always fully defined.

use petgraph::algo::maximum_matching;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use tracing::{debug, warn};

use crate::bond::{BondOrder, UNDEFINED_ORDER};
use crate::error::{check_len, PerceptionError};
use crate::mol::Mol;
use crate::traits::{HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};
use crate::valence::{bond_order_sum, free_valence_with_charge};

/// Outcome of a Kekulé pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KekuleReport {
    /// Atoms of every component that had no complete alternating pattern,
    /// in discovery order.
    pub failed_components: Vec<Vec<NodeIndex>>,
    /// Atoms that needed a double bond but did not receive one.
    pub unmatched_atoms: Vec<NodeIndex>,
}

impl KekuleReport {
    pub fn is_complete(&self) -> bool {
        self.unmatched_atoms.is_empty()
    }
}

/// Resolve every undefined bond of `orders` to single or double.
///
/// `orders` must have one entry per bond; on a size mismatch it is left
/// untouched.
pub fn perceive_kekule_structure<A, B>(
    mol: &Mol<A, B>,
    orders: &mut [u8],
) -> Result<KekuleReport, PerceptionError>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
{
    check_len(mol.bond_count(), orders.len())?;
    let charges: Vec<i8> = mol.atoms().map(|a| mol.atom(a).formal_charge()).collect();
    Ok(kekulize_undefined(mol, orders, &charges))
}

/// Bond orders of `mol` with every undefined bond given a Kekulé order.
pub fn kekulize<A, B>(mol: &Mol<A, B>) -> (Vec<u8>, KekuleReport)
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    let mut orders: Vec<u8> = mol
        .bonds()
        .map(|e| mol.bond(e).bond_order().map_or(UNDEFINED_ORDER, BondOrder::as_u8))
        .collect();
    let charges: Vec<i8> = mol.atoms().map(|a| mol.atom(a).formal_charge()).collect();
    let report = kekulize_undefined(mol, &mut orders, &charges);
    (orders, report)
}

/// Kekulé pass with per-atom charges supplied by the caller, for use after
/// functional-group patterns have assigned charges.
pub(crate) fn kekulize_undefined<A, B>(
    mol: &Mol<A, B>,
    orders: &mut [u8],
    charges: &[i8],
) -> KekuleReport
where
    A: HasAtomicNum + HasHydrogenCount,
{
    let n = mol.atom_count();
    let mut adj: Vec<Vec<(NodeIndex, EdgeIndex)>> = vec![Vec::new(); n];
    for e in mol.bonds() {
        if orders[e.index()] == UNDEFINED_ORDER {
            let (a, b) = mol.endpoints(e);
            adj[a.index()].push((b, e));
            adj[b.index()].push((a, e));
        }
    }
    for list in &mut adj {
        list.sort();
    }

    let needs_double: Vec<bool> = mol
        .atoms()
        .map(|atom| !adj[atom.index()].is_empty() && needs_double_bond(mol, atom, orders, charges))
        .collect();

    let matched_edge = match_candidates(mol, &adj, &needs_double);
    let mut report = KekuleReport::default();
    let mut seen = vec![false; n];

    for start in mol.atoms() {
        if adj[start.index()].is_empty() || seen[start.index()] {
            continue;
        }
        let component = discover_component(&adj, start, &mut seen);
        let unmatched: Vec<NodeIndex> = component
            .iter()
            .copied()
            .filter(|v| needs_double[v.index()] && matched_edge[v.index()].is_none())
            .collect();
        if !unmatched.is_empty() {
            warn!(
                component_size = component.len(),
                unmatched = unmatched.len(),
                "no alternating bond pattern for component"
            );
            report.unmatched_atoms.extend(unmatched);
            report.failed_components.push(component);
        }
    }

    let mut num_double = 0usize;
    for e in mol.bonds() {
        if orders[e.index()] != UNDEFINED_ORDER {
            continue;
        }
        let (a, _) = mol.endpoints(e);
        orders[e.index()] = if matched_edge[a.index()] == Some(e) {
            num_double += 1;
            2
        } else {
            1
        };
    }
    debug!(
        num_double,
        failed = report.failed_components.len(),
        "kekule pass done"
    );
    report
}

fn needs_double_bond<A, B>(mol: &Mol<A, B>, atom: NodeIndex, orders: &[u8], charges: &[i8]) -> bool
where
    A: HasAtomicNum + HasHydrogenCount,
{
    let charge = charges[atom.index()];
    let free = match free_valence_with_charge(mol, atom, orders, charge) {
        Some(f) => f,
        None => return false,
    };
    let (_, undefined) = bond_order_sum(mol, atom, orders);
    let gap = free - undefined as i16;
    let bare_charged = gap == 2 && mol.atom(atom).hydrogen_count() == 0 && charge != 0;
    gap == 1 || bare_charged
}

/// Depth-first discovery order of the undefined-bond component of `start`,
/// lower-index neighbours first.
fn discover_component(
    adj: &[Vec<(NodeIndex, EdgeIndex)>],
    start: NodeIndex,
    seen: &mut [bool],
) -> Vec<NodeIndex> {
    let mut component = Vec::new();
    let mut stack = vec![start];
    while let Some(v) = stack.pop() {
        if seen[v.index()] {
            continue;
        }
        seen[v.index()] = true;
        component.push(v);
        for &(w, _) in adj[v.index()].iter().rev() {
            if !seen[w.index()] {
                stack.push(w);
            }
        }
    }
    component
}

/// Maximum matching over the atoms that need a double bond, joined by
/// their undefined bonds. Odd cycles are handled by the blossom search in
/// [`maximum_matching`].
fn match_candidates<A, B>(
    mol: &Mol<A, B>,
    adj: &[Vec<(NodeIndex, EdgeIndex)>],
    needs_double: &[bool],
) -> Vec<Option<EdgeIndex>> {
    let mut sub: UnGraph<NodeIndex, EdgeIndex> = UnGraph::default();
    let mut local: Vec<Option<NodeIndex>> = vec![None; mol.atom_count()];
    for atom in mol.atoms().filter(|a| needs_double[a.index()]) {
        local[atom.index()] = Some(sub.add_node(atom));
    }
    for atom in mol.atoms() {
        let Some(u) = local[atom.index()] else { continue };
        for &(nb, e) in &adj[atom.index()] {
            if let Some(v) = local[nb.index()] {
                if atom < nb {
                    sub.add_edge(u, v, e);
                }
            }
        }
    }

    let mut matched_edge = vec![None; mol.atom_count()];
    let matching = maximum_matching(&sub);
    for (u, v) in matching.edges() {
        if let Some(e) = sub.find_edge(u, v) {
            let bond = sub[e];
            matched_edge[sub[u].index()] = Some(bond);
            matched_edge[sub[v].index()] = Some(bond);
        }
    }
    matched_edge
}
