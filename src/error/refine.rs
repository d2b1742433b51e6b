use super::InvalidPointer;
use crate::CellIndex;
use std::{error::Error, fmt};

/// The targeted cell is not in the live set.
///
/// A cell stops being live once it has been split into children.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NotLive {
    /// Index of the missing cell.
    pub index: CellIndex,
}

impl NotLive {
    pub(crate) const fn new(index: CellIndex) -> Self {
        Self { index }
    }
}

impl fmt::Display for NotLive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell {} is not live", self.index)
    }
}

impl Error for NotLive {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

// -----------------------------------------------------------------------------

/// The targeted cell is already at the finest level and cannot be split.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MaxLevel {
    /// The finest level of the mesh.
    pub levels: u8,
}

impl MaxLevel {
    pub(crate) const fn new(levels: u8) -> Self {
        Self { levels }
    }
}

impl fmt::Display for MaxLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell is already at the finest level ({})", self.levels)
    }
}

impl Error for MaxLevel {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

// -----------------------------------------------------------------------------

/// Errors occurring while refining a cell.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum RefineError {
    /// The given pointer does not address a cell of the mesh.
    Pointer(InvalidPointer),
    /// The targeted cell is not live.
    NotLive(NotLive),
    /// The targeted cell is already at the finest level.
    MaxLevel(MaxLevel),
}

impl fmt::Display for RefineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Pointer(ref err) => err.fmt(f),
            Self::NotLive(ref err) => err.fmt(f),
            Self::MaxLevel(ref err) => err.fmt(f),
        }
    }
}

impl Error for RefineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            Self::Pointer(ref err) => Some(err),
            Self::NotLive(ref err) => Some(err),
            Self::MaxLevel(ref err) => Some(err),
        }
    }
}

impl From<InvalidPointer> for RefineError {
    fn from(value: InvalidPointer) -> Self {
        Self::Pointer(value)
    }
}

impl From<NotLive> for RefineError {
    fn from(value: NotLive) -> Self {
        Self::NotLive(value)
    }
}

impl From<MaxLevel> for RefineError {
    fn from(value: MaxLevel) -> Self {
        Self::MaxLevel(value)
    }
}

