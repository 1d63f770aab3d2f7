use serde::{Deserialize, Serialize};

/// Default atom type for a molecular graph node.
///
/// `Atom` stores intrinsic atomic properties, the things you would read off
/// a structural formula. Coordinates are attached with the wrapper types in
/// the [`wrappers`](crate::wrappers) module when an algorithm needs them.
///
/// # Examples
///
/// ```
/// use chemcrab_perceive::Atom;
///
/// let carbon = Atom {
///     atomic_num: 6,
///     formal_charge: 0,
///     isotope: 0,
///     hydrogen_count: 3,
/// };
/// assert_eq!(carbon.atomic_num, 6);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// Atomic number (1 = H, 6 = C, 7 = N, …). Identifies the element.
    pub atomic_num: u8,
    /// Formal charge in elementary charge units (e.g. −1 for a carboxylate oxygen).
    pub formal_charge: i8,
    /// Mass number. `0` means natural isotopic abundance (the common case).
    pub isotope: u16,
    /// Number of implicit hydrogens on this atom.
    ///
    /// These are not graph nodes. Explicit hydrogens are ordinary atoms
    /// with `atomic_num == 1` and count as neighbours instead.
    pub hydrogen_count: u8,
}

impl Atom {
    pub fn new(atomic_num: u8) -> Self {
        Self {
            atomic_num,
            ..Self::default()
        }
    }

    pub fn with_hydrogens(atomic_num: u8, hydrogen_count: u8) -> Self {
        Self {
            atomic_num,
            hydrogen_count,
            ..Self::default()
        }
    }

    pub fn charged(atomic_num: u8, formal_charge: i8) -> Self {
        Self {
            atomic_num,
            formal_charge,
            ..Self::default()
        }
    }
}

impl crate::traits::HasAtomicNum for Atom {
    fn atomic_num(&self) -> u8 {
        self.atomic_num
    }
}

impl crate::traits::HasFormalCharge for Atom {
    fn formal_charge(&self) -> i8 {
        self.formal_charge
    }
}

impl crate::traits::HasIsotope for Atom {
    fn isotope(&self) -> u16 {
        self.isotope
    }
}

impl crate::traits::HasHydrogenCount for Atom {
    fn hydrogen_count(&self) -> u8 {
        self.hydrogen_count
    }
}
