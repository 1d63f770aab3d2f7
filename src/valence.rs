//! Valence model shared by all perception algorithms.
//!
//! Charged main-group atoms take the valences of the isoelectronic element
//! in the same period (N+ behaves like C, O- like F, C- like N). Atoms of
//! the second period never exceed an octet, so only their first standard
//! valence is allowed. Elements without a valence model are unconstrained.

use petgraph::graph::NodeIndex;

use crate::element::{element_data, element_symbol, outer_shell_electrons, period};
use crate::mol::Mol;
use crate::traits::{HasAtomicNum, HasFormalCharge, HasHydrogenCount};

static ZERO: &[u8] = &[0];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValenceError {
    pub atom_idx: NodeIndex,
    pub atomic_num: u8,
    pub formal_charge: i8,
    pub actual_valence: u8,
    pub allowed_valences: Vec<u8>,
}

impl std::fmt::Display for ValenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "atom {} ({}{:+}): valence {} not in {:?}",
            self.atom_idx.index(),
            element_symbol(self.atomic_num),
            self.formal_charge,
            self.actual_valence,
            self.allowed_valences,
        )
    }
}

impl std::error::Error for ValenceError {}

/// Allowed valences (bond order sum plus hydrogens) for an element in a
/// given charge state. An empty slice means "no constraint".
pub fn allowed_valences(atomic_num: u8, formal_charge: i8) -> &'static [u8] {
    let data = match element_data(atomic_num) {
        Some(d) => d,
        None => return &[],
    };
    if data.valences.is_empty() {
        return &[];
    }
    let row = period(atomic_num);
    let octet = |vals: &'static [u8]| -> &'static [u8] {
        if row == 2 && !vals.is_empty() {
            &vals[..1]
        } else {
            vals
        }
    };
    if formal_charge == 0 {
        return octet(data.valences);
    }
    if atomic_num == 1 {
        return ZERO;
    }
    let effective = atomic_num as i16 - formal_charge as i16;
    if effective < 1 || effective > u8::MAX as i16 || period(effective as u8) != row {
        return &[];
    }
    match element_data(effective as u8) {
        Some(iso) if !iso.valences.is_empty() => octet(iso.valences),
        Some(iso) if iso.outer_electrons == 8 || iso.atomic_num == 2 => ZERO,
        _ => &[],
    }
}

/// Lowest allowed valence that is at least `used`.
pub fn standard_valence(atomic_num: u8, formal_charge: i8, used: u8) -> Option<u8> {
    allowed_valences(atomic_num, formal_charge)
        .iter()
        .copied()
        .find(|&v| v >= used)
}

/// `true` if `used` (bond order sum plus hydrogens) is a valid valence for
/// this element and charge.
pub fn check_valence_state(atomic_num: u8, formal_charge: i8, used: u8) -> bool {
    let allowed = allowed_valences(atomic_num, formal_charge);
    allowed.is_empty() || allowed.contains(&used)
}

/// Electrons in the valence shell of an atom: two per bond (hydrogens
/// included) plus its nonbonding electrons.
pub fn octet_electron_count(atomic_num: u8, formal_charge: i8, bond_order_sum: u8, h_count: u8) -> i16 {
    let bonding = bond_order_sum as i16 + h_count as i16;
    let nonbonding = outer_shell_electrons(atomic_num) as i16 - formal_charge as i16 - bonding;
    2 * bonding + nonbonding.max(0)
}

/// Sum of defined bond orders at `atom` and the number of its undefined
/// bonds, reading orders from a working assignment.
pub fn bond_order_sum<A, B>(mol: &Mol<A, B>, atom: NodeIndex, orders: &[u8]) -> (u8, u8) {
    let mut fixed = 0u8;
    let mut undefined = 0u8;
    for e in mol.bonds_of(atom) {
        match orders[e.index()] {
            0 => undefined += 1,
            o => fixed = fixed.saturating_add(o),
        }
    }
    (fixed, undefined)
}

/// Remaining bonding capacity of an atom after its defined bonds and
/// hydrogens, relative to the lowest standard valence that can still hold
/// all of its bonds (undefined bonds counted as single).
///
/// Negative when even the highest allowed valence is exceeded; `None` for
/// unconstrained elements.
pub fn free_valence<A, B>(mol: &Mol<A, B>, atom: NodeIndex, orders: &[u8]) -> Option<i16>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
{
    let a = mol.atom(atom);
    free_valence_with_charge(mol, atom, orders, a.formal_charge())
}

pub(crate) fn free_valence_with_charge<A, B>(
    mol: &Mol<A, B>,
    atom: NodeIndex,
    orders: &[u8],
    formal_charge: i8,
) -> Option<i16>
where
    A: HasAtomicNum + HasHydrogenCount,
{
    let a = mol.atom(atom);
    let allowed = allowed_valences(a.atomic_num(), formal_charge);
    let max = *allowed.last()?;
    let (fixed, undefined) = bond_order_sum(mol, atom, orders);
    let used = fixed as i16 + a.hydrogen_count() as i16;
    let target = allowed
        .iter()
        .map(|&v| v as i16)
        .find(|&v| v >= used + undefined as i16)
        .unwrap_or(max as i16);
    Some(target - used)
}

/// Bond order sum plus implicit hydrogens, reading orders from `orders`.
pub fn total_valence<A, B>(mol: &Mol<A, B>, atom: NodeIndex, orders: &[u8]) -> u8
where
    A: HasHydrogenCount,
{
    let (fixed, undefined) = bond_order_sum(mol, atom, orders);
    fixed + undefined + mol.atom(atom).hydrogen_count()
}

/// Check every atom against the valence model.
///
/// `orders` is a per-bond working assignment (undefined bonds count as
/// single); `charges`, when given, overrides the atoms' formal charges.
pub fn check_valence<A, B>(
    mol: &Mol<A, B>,
    orders: &[u8],
    charges: Option<&[i8]>,
) -> Result<(), Vec<ValenceError>>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
{
    let errors: Vec<ValenceError> = mol
        .atoms()
        .filter_map(|idx| {
            let atom = mol.atom(idx);
            let charge = charges
                .and_then(|c| c.get(idx.index()).copied())
                .unwrap_or_else(|| atom.formal_charge());
            let v = total_valence(mol, idx, orders);
            if check_valence_state(atom.atomic_num(), charge, v) {
                return None;
            }
            Some(ValenceError {
                atom_idx: idx,
                atomic_num: atom.atomic_num(),
                formal_charge: charge,
                actual_valence: v,
                allowed_valences: allowed_valences(atom.atomic_num(), charge).to_vec(),
            })
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
