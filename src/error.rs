//! Fatal errors shared by all perception algorithms.
//!
//! Only conditions that make a call meaningless are reported here: wrong
//! array sizes, missing coordinates, undefined input where a complete
//! structure is required, and lookup failures in strict mode. Partial
//! failures (an unkekulizable component, a stereocenter that cannot be
//! encoded) are not errors; they are listed in the result value of the
//! respective algorithm.

use petgraph::graph::{EdgeIndex, NodeIndex};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PerceptionError {
    /// A caller-supplied per-atom or per-bond array has the wrong length.
    #[error("array size mismatch: expected {expected} entries, got {actual}")]
    ArraySizeMismatch { expected: usize, actual: usize },

    /// An atom has no coordinates but the algorithm requires them.
    #[error("atom {} has no coordinates", .0.index())]
    MissingCoordinates(NodeIndex),

    /// A bond order is undefined where a complete structure is required.
    #[error("bond {} has an undefined order", .0.index())]
    UndefinedBondOrder(EdgeIndex),

    /// Strict mode only: no element data exists for an atom.
    #[error("atom {} has unsupported atomic number {atomic_num}", atom.index())]
    UnknownElement { atom: NodeIndex, atomic_num: u8 },

    /// Strict mode only: a requested pattern does not exist in the library.
    #[error("no functional group pattern named {0:?}")]
    PatternLookup(String),
}

pub(crate) fn check_len(expected: usize, actual: usize) -> Result<(), PerceptionError> {
    if expected == actual {
        Ok(())
    } else {
        Err(PerceptionError::ArraySizeMismatch { expected, actual })
    }
}
