use crate::{error::InvalidLevel, index::bits, Dimension, Pointer};
use std::fmt;

/// Packed index of a tree cell.
///
/// The index is encoded on 64-bit with the following bit layout:
///
/// ```text
///  ┏━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┳━━━━━━┓
///  ┃ morton(i₁, …, i_d)             ┃  ℓ   ┃
///  ┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┻━━━━━━┛
///  63                             B B-1    0
/// ```
///
/// Where:
/// - the low `B = ⌈√L⌉ + 1` bits store the refinement level `ℓ`;
/// - the remaining bits interleave the cell coordinates along the Z-order
///   curve, x being the least significant axis.
///
/// Ordering indices by raw value yields the canonical cell ordering
/// (Morton-major, level-minor) used by the numbering sweep.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct CellIndex(u64);

impl CellIndex {
    #[allow(dead_code)]
    pub(crate) const fn new_unchecked(value: u64) -> Self {
        Self(value)
    }
}

impl From<CellIndex> for u64 {
    fn from(value: CellIndex) -> Self {
        value.0
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// -----------------------------------------------------------------------------

/// Morton codec tied to a mesh shape: packs pointers into cell indices and
/// back.
#[derive(Clone, Debug)]
pub(crate) struct Encoding {
    dim: Dimension,
    level_bits: u32,
}

impl Encoding {
    /// Builds the codec for a `dim`-dimensional mesh with `levels` levels.
    ///
    /// Errors when `levels` is zero or when `d·L + B` exceeds 64 bits,
    /// i.e. when some finest-level index would not fit in a `u64`.
    pub fn new(dim: Dimension, levels: u8) -> Result<Self, InvalidLevel> {
        if levels == 0 {
            return Err(InvalidLevel::new(levels, "at least one level is required"));
        }
        let level_bits = bits::level_bits(levels);
        let coord_bits = u32::from(u8::from(dim)) * u32::from(levels);
        if coord_bits + level_bits > u64::BITS {
            return Err(InvalidLevel::new(
                levels,
                "cell indices would overflow 64 bits",
            ));
        }
        Ok(Self { dim, level_bits })
    }

    /// Packs a pointer into its cell index.
    pub fn encode(&self, pointer: &Pointer) -> CellIndex {
        let [x, y, z] = pointer.coords();
        let morton = match self.dim {
            Dimension::Two => {
                bits::spread2(x.into()) | bits::spread2(y.into()) << 1
            }
            Dimension::Three => {
                bits::spread3(x.into())
                    | bits::spread3(y.into()) << 1
                    | bits::spread3(z.into()) << 2
            }
        };
        CellIndex(morton << self.level_bits | u64::from(pointer.level()))
    }

    /// Unpacks a cell index into its pointer.
    ///
    /// Inverse of [`encode`](Self::encode) over valid indices; garbage in,
    /// garbage out otherwise (callers validate through the mesh).
    #[allow(clippy::cast_possible_truncation)] // Casts safe thx to masking.
    pub fn decode(&self, index: CellIndex) -> Pointer {
        let raw = index.0;
        let level = (raw & ((1 << self.level_bits) - 1)) as u8;
        let morton = raw >> self.level_bits;
        let coords = match self.dim {
            Dimension::Two => [
                bits::compact2(morton) as u32,
                bits::compact2(morton >> 1) as u32,
                0,
            ],
            Dimension::Three => [
                bits::compact3(morton) as u32,
                bits::compact3(morton >> 1) as u32,
                bits::compact3(morton >> 2) as u32,
            ],
        };
        Pointer::new_unchecked(coords, level)
    }
}

#[cfg(test)]
#[path = "./cell_tests.rs"]
mod tests;
