//! Treemesh error types.

mod construction;
mod invalid_value;
mod not_implemented;
mod refine;


pub use construction::NewMeshError;
pub use invalid_value::{
    InvalidCellIndex, InvalidDimension, InvalidLevel, InvalidPointer,
    InvalidShape,
};
pub use not_implemented::NotImplemented;
pub use refine::{MaxLevel, NotLive, RefineError};
