use super::{InvalidDimension, InvalidLevel, InvalidShape};
use std::{error::Error, fmt};

/// Errors occurring while building a mesh.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum NewMeshError {
    /// The number of spacing axes is not 2 or 3.
    Dimension(InvalidDimension),
    /// A spacing axis has the wrong length or non-positive widths.
    Shape(InvalidShape),
    /// The level count is zero or too deep for 64-bit indices.
    Level(InvalidLevel),
}

impl fmt::Display for NewMeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Dimension(ref err) => err.fmt(f),
            Self::Shape(ref err) => err.fmt(f),
            Self::Level(ref err) => err.fmt(f),
        }
    }
}

impl Error for NewMeshError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            Self::Dimension(ref err) => Some(err),
            Self::Shape(ref err) => Some(err),
            Self::Level(ref err) => Some(err),
        }
    }
}

impl From<InvalidDimension> for NewMeshError {
    fn from(value: InvalidDimension) -> Self {
        Self::Dimension(value)
    }
}

impl From<InvalidShape> for NewMeshError {
    fn from(value: InvalidShape) -> Self {
        Self::Shape(value)
    }
}

impl From<InvalidLevel> for NewMeshError {
    fn from(value: InvalidLevel) -> Self {
        Self::Level(value)
    }
}
