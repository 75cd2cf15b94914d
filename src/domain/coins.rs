use crate::error::VendError;
use serde::{Deserialize, Serialize};

/// A coin face value from the closed set the machine accepts.
///
/// Anything outside this set is not a coin as far as the machine is
/// concerned: inserting it is a silent no-op and the reserve never
/// tracks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Denomination {
    One,
    Five,
    Ten,
    Fifty,
}

impl Denomination {
    /// Largest to smallest, the order the change allocator walks.
    pub const DESCENDING: [Denomination; 4] = [
        Denomination::Fifty,
        Denomination::Ten,
        Denomination::Five,
        Denomination::One,
    ];

    pub const fn value(self) -> i64 {
        match self {
            Denomination::One => 1,
            Denomination::Five => 5,
            Denomination::Ten => 10,
            Denomination::Fifty => 50,
        }
    }

    /// Stable index into fixed-size per-denomination arrays.
    pub const fn index(self) -> usize {
        match self {
            Denomination::One => 0,
            Denomination::Five => 1,
            Denomination::Ten => 2,
            Denomination::Fifty => 3,
        }
    }

    pub const fn is_smallest(self) -> bool {
        matches!(self, Denomination::One)
    }
}

impl TryFrom<i64> for Denomination {
    type Error = VendError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Denomination::One),
            5 => Ok(Denomination::Five),
            10 => Ok(Denomination::Ten),
            50 => Ok(Denomination::Fifty),
            other => Err(VendError::Validation(format!(
                "{other} is not an accepted denomination"
            ))),
        }
    }
}

impl From<Denomination> for i64 {
    fn from(denomination: Denomination) -> Self {
        denomination.value()
    }
}
