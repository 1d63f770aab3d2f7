//! Coordinate-carrying wrappers around atom types.
//!
//! Perception algorithms bound their atom type on [`HasPosition2D`] or
//! [`HasPosition3D`]. Wrapping an [`Atom`](crate::Atom) in one of these
//! types attaches positions without changing the atom itself; all other
//! atom traits are delegated to the inner value, so wrappers nest.

use crate::traits::*;

#[derive(Debug, Clone, PartialEq)]
pub struct WithPosition2D<T> {
    pub inner: T,
    pub position_2d: Option<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithPosition3D<T> {
    pub inner: T,
    pub position_3d: Option<[f64; 3]>,
}

impl<T> WithPosition2D<T> {
    pub fn new(inner: T, x: f64, y: f64) -> Self {
        Self {
            inner,
            position_2d: Some([x, y]),
        }
    }
}

impl<T> WithPosition3D<T> {
    pub fn new(inner: T, x: f64, y: f64, z: f64) -> Self {
        Self {
            inner,
            position_3d: Some([x, y, z]),
        }
    }
}

impl<T> HasPosition2D for WithPosition2D<T> {
    fn position_2d(&self) -> Option<[f64; 2]> {
        self.position_2d
    }
    fn set_position_2d(&mut self, pos: Option<[f64; 2]>) {
        self.position_2d = pos;
    }
}

impl<T> HasPosition3D for WithPosition3D<T> {
    fn position_3d(&self) -> Option<[f64; 3]> {
        self.position_3d
    }
    fn set_position_3d(&mut self, pos: Option<[f64; 3]>) {
        self.position_3d = pos;
    }
}

macro_rules! delegate_trait {
    ($wrapper:ident, $trait:ident, $method:ident, $ret:ty) => {
        impl<T: $trait> $trait for $wrapper<T> {
            fn $method(&self) -> $ret {
                self.inner.$method()
            }
        }
    };
}

macro_rules! delegate_common {
    ($wrapper:ident) => {
        delegate_trait!($wrapper, HasAtomicNum, atomic_num, u8);
        delegate_trait!($wrapper, HasFormalCharge, formal_charge, i8);
        delegate_trait!($wrapper, HasIsotope, isotope, u16);
        delegate_trait!($wrapper, HasHydrogenCount, hydrogen_count, u8);
    };
}

delegate_common!(WithPosition2D);
delegate_common!(WithPosition3D);

impl<T: HasPosition3D> HasPosition3D for WithPosition2D<T> {
    fn position_3d(&self) -> Option<[f64; 3]> {
        self.inner.position_3d()
    }
    fn set_position_3d(&mut self, pos: Option<[f64; 3]>) {
        self.inner.set_position_3d(pos);
    }
}

impl<T: HasPosition2D> HasPosition2D for WithPosition3D<T> {
    fn position_2d(&self) -> Option<[f64; 2]> {
        self.inner.position_2d()
    }
    fn set_position_2d(&mut self, pos: Option<[f64; 2]>) {
        self.inner.set_position_2d(pos);
    }
}
