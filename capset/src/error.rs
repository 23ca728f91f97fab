use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapError {
    /// The point does not fit in `dim` bits.
    OutOfRange { point: u32, dim: u32 },
    /// Three selected points already XOR to the point.
    Excluded { point: u32 },
    /// The exclusion index lost a combination it was expected to hold.
    ///
    /// This is a programming error, never a caller error.
    Inconsistency {
        point: u32,
        value: u32,
        length: usize,
    },
    InvalidDimension { dim: u32 },
    InvalidTracking(&'static str),
}

impl Display for CapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { point, dim } => {
                write!(f, "point {point} too large for dimension {dim}")
            }
            Self::Excluded { point } => write!(f, "point {point} is excluded"),
            Self::Inconsistency {
                point,
                value,
                length,
            } => {
                write!(
                    f,
                    "exclusion index inconsistent: no length-{length} combination \
                     with point {point} recorded for value {value}"
                )
            }
            Self::InvalidDimension { dim } => {
                write!(
                    f,
                    "invalid dimension {dim}: must be in [1, {}]",
                    crate::cap::MAX_DIM
                )
            }
            Self::InvalidTracking(msg) => write!(f, "invalid tracking: {msg}"),
        }
    }
}

impl Error for CapError {}
