use serde::{Deserialize, Serialize};

/// Order value used in working assignments for a bond that has not been
/// assigned yet.
pub const UNDEFINED_ORDER: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
}

impl BondOrder {
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Single => 1,
            Self::Double => 2,
            Self::Triple => 3,
        }
    }

    /// Inverse of [`as_u8`](Self::as_u8). `0` and values above 3 have no
    /// order.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Single),
            2 => Some(Self::Double),
            3 => Some(Self::Triple),
            _ => None,
        }
    }
}

/// Default bond type for a molecular graph edge.
///
/// `order` is `None` when the order is not known yet, which is the normal
/// state of bonds read from coordinate-only formats before bond order
/// perception.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Bond {
    pub order: Option<BondOrder>,
}

impl Bond {
    pub fn single() -> Self {
        Self::with_order(BondOrder::Single)
    }

    pub fn double() -> Self {
        Self::with_order(BondOrder::Double)
    }

    pub fn triple() -> Self {
        Self::with_order(BondOrder::Triple)
    }

    pub fn undefined() -> Self {
        Self { order: None }
    }

    pub fn with_order(order: BondOrder) -> Self {
        Self { order: Some(order) }
    }
}

impl crate::traits::HasBondOrder for Bond {
    fn bond_order(&self) -> Option<BondOrder> {
        self.order
    }
}

/// Direction marker of a single bond adjacent to a stereogenic double bond.
///
/// The direction is read from the bond's stored begin atom towards its end
/// atom: `Up` corresponds to SMILES `/`, `Down` to `\`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BondDirection {
    #[default]
    None,
    Up,
    Down,
}

impl BondDirection {
    pub fn inverted(self) -> Self {
        match self {
            Self::None => Self::None,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

/// Wedge/hash marker of a bond in a 2D depiction.
///
/// `Up`, `Down` and `Either` have their narrow end at the bond's begin
/// atom; the `Reverse*` variants at its end atom. `Up` places the wide end
/// above the drawing plane, `Down` below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BondStereoFlag {
    #[default]
    Plain,
    Up,
    Down,
    ReverseUp,
    ReverseDown,
    Either,
    ReverseEither,
}

impl BondStereoFlag {
    /// Wedge (`up == true`) or hash flag whose narrow end sits at the begin
    /// atom when `at_begin` is true, else at the end atom.
    pub fn wedge(at_begin: bool, up: bool) -> Self {
        match (at_begin, up) {
            (true, true) => Self::Up,
            (true, false) => Self::Down,
            (false, true) => Self::ReverseUp,
            (false, false) => Self::ReverseDown,
        }
    }

    pub fn either(at_begin: bool) -> Self {
        if at_begin {
            Self::Either
        } else {
            Self::ReverseEither
        }
    }

    /// `Some(true)` if the narrow end is at the begin atom, `Some(false)`
    /// if at the end atom, `None` for plain bonds.
    pub fn narrow_end_at_begin(self) -> Option<bool> {
        match self {
            Self::Plain => None,
            Self::Up | Self::Down | Self::Either => Some(true),
            Self::ReverseUp | Self::ReverseDown | Self::ReverseEither => Some(false),
        }
    }

    /// Out-of-plane displacement (+1 up, -1 down) this flag gives the wide
    /// end atom. `Either` and `Plain` give none.
    pub fn z_sign(self) -> i8 {
        match self {
            Self::Up | Self::ReverseUp => 1,
            Self::Down | Self::ReverseDown => -1,
            _ => 0,
        }
    }

    pub fn is_either(self) -> bool {
        matches!(self, Self::Either | Self::ReverseEither)
    }
}
