//! Packed cell indices and the Morton codec behind them.

pub mod bits;
mod cell;

pub use cell::CellIndex;

pub(crate) use cell::Encoding;
