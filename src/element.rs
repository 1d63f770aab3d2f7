//! Per-element data needed by the perception algorithms.
//!
//! The table covers hydrogen through xenon, which includes every element
//! with standard organic valences. Heavier elements have no entry; callers
//! treat them as unconstrained (or reject them in strict mode).

/// Static data for one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementData {
    pub atomic_num: u8,
    pub symbol: &'static str,
    /// Valence shell electrons of the neutral atom.
    pub outer_electrons: u8,
    /// Standard valences in ascending order; empty for elements without a
    /// fixed valence model (noble gases, metals).
    pub valences: &'static [u8],
    /// Single-bond covalent radius in Å (Cordero et al. 2008).
    pub covalent_radius: f64,
}

macro_rules! elem {
    ($z:expr, $sym:expr, $outer:expr, $val:expr, $rad:expr) => {
        ElementData {
            atomic_num: $z,
            symbol: $sym,
            outer_electrons: $outer,
            valences: $val,
            covalent_radius: $rad,
        }
    };
}

const NONE: &[u8] = &[];

static ELEMENTS: [ElementData; 54] = [
    elem!(1, "H", 1, &[1], 0.31),
    elem!(2, "He", 2, NONE, 0.28),
    elem!(3, "Li", 1, NONE, 1.28),
    elem!(4, "Be", 2, NONE, 0.96),
    elem!(5, "B", 3, &[3], 0.84),
    elem!(6, "C", 4, &[4], 0.76),
    elem!(7, "N", 5, &[3, 5], 0.71),
    elem!(8, "O", 6, &[2], 0.66),
    elem!(9, "F", 7, &[1], 0.57),
    elem!(10, "Ne", 8, NONE, 0.58),
    elem!(11, "Na", 1, NONE, 1.66),
    elem!(12, "Mg", 2, NONE, 1.41),
    elem!(13, "Al", 3, NONE, 1.21),
    elem!(14, "Si", 4, &[4], 1.11),
    elem!(15, "P", 5, &[3, 5], 1.07),
    elem!(16, "S", 6, &[2, 4, 6], 1.05),
    elem!(17, "Cl", 7, &[1], 1.02),
    elem!(18, "Ar", 8, NONE, 1.06),
    elem!(19, "K", 1, NONE, 2.03),
    elem!(20, "Ca", 2, NONE, 1.76),
    elem!(21, "Sc", 3, NONE, 1.70),
    elem!(22, "Ti", 4, NONE, 1.60),
    elem!(23, "V", 5, NONE, 1.53),
    elem!(24, "Cr", 6, NONE, 1.39),
    elem!(25, "Mn", 7, NONE, 1.39),
    elem!(26, "Fe", 8, NONE, 1.32),
    elem!(27, "Co", 9, NONE, 1.26),
    elem!(28, "Ni", 10, NONE, 1.24),
    elem!(29, "Cu", 11, NONE, 1.32),
    elem!(30, "Zn", 12, NONE, 1.22),
    elem!(31, "Ga", 3, NONE, 1.22),
    elem!(32, "Ge", 4, &[4], 1.20),
    elem!(33, "As", 5, &[3, 5], 1.19),
    elem!(34, "Se", 6, &[2, 4, 6], 1.20),
    elem!(35, "Br", 7, &[1], 1.20),
    elem!(36, "Kr", 8, NONE, 1.16),
    elem!(37, "Rb", 1, NONE, 2.20),
    elem!(38, "Sr", 2, NONE, 1.95),
    elem!(39, "Y", 3, NONE, 1.90),
    elem!(40, "Zr", 4, NONE, 1.75),
    elem!(41, "Nb", 5, NONE, 1.64),
    elem!(42, "Mo", 6, NONE, 1.54),
    elem!(43, "Tc", 7, NONE, 1.47),
    elem!(44, "Ru", 8, NONE, 1.46),
    elem!(45, "Rh", 9, NONE, 1.42),
    elem!(46, "Pd", 10, NONE, 1.39),
    elem!(47, "Ag", 11, NONE, 1.45),
    elem!(48, "Cd", 12, NONE, 1.44),
    elem!(49, "In", 3, NONE, 1.42),
    elem!(50, "Sn", 4, NONE, 1.39),
    elem!(51, "Sb", 5, NONE, 1.39),
    elem!(52, "Te", 6, &[2, 4, 6], 1.38),
    elem!(53, "I", 7, &[1, 3, 5, 7], 1.39),
    elem!(54, "Xe", 8, NONE, 1.40),
];

pub fn element_data(atomic_num: u8) -> Option<&'static ElementData> {
    if atomic_num == 0 {
        return None;
    }
    ELEMENTS.get(atomic_num as usize - 1)
}

pub fn element_symbol(atomic_num: u8) -> &'static str {
    element_data(atomic_num).map(|e| e.symbol).unwrap_or("?")
}

pub fn outer_shell_electrons(atomic_num: u8) -> u8 {
    element_data(atomic_num)
        .map(|e| e.outer_electrons)
        .unwrap_or(0)
}

pub fn covalent_radius(atomic_num: u8) -> Option<f64> {
    element_data(atomic_num).map(|e| e.covalent_radius)
}

/// Period (row) of the periodic table; `0` for unknown atomic numbers.
pub fn period(atomic_num: u8) -> u8 {
    match atomic_num {
        1..=2 => 1,
        3..=10 => 2,
        11..=18 => 3,
        19..=36 => 4,
        37..=54 => 5,
        55..=86 => 6,
        87..=118 => 7,
        _ => 0,
    }
}
