use crate::domain::coins::Denomination;
use crate::domain::ports::CoinVault;

/// An in-memory coin reserve backed by a fixed per-denomination array.
///
/// The denomination set is closed, so there is no need for a dynamic
/// collection; each slot holds the count on hand for one face value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryVault {
    counts: [u32; 4],
}

impl InMemoryVault {
    /// Creates an empty vault.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a vault seeded with the given per-denomination counts.
    pub fn with_counts(counts: &[(Denomination, u32)]) -> Self {
        let mut vault = Self::new();
        for &(denomination, count) in counts {
            vault.counts[denomination.index()] = count;
        }
        vault
    }

    /// Total monetary value currently on hand.
    pub fn total_value(&self) -> i64 {
        Denomination::DESCENDING
            .iter()
            .map(|d| d.value() * i64::from(self.counts[d.index()]))
            .sum()
    }
}

impl CoinVault for InMemoryVault {
    fn count(&self, denomination: Denomination) -> u32 {
        self.counts[denomination.index()]
    }

    fn take(&mut self, denomination: Denomination, n: u32) {
        let slot = &mut self.counts[denomination.index()];
        *slot = slot.saturating_sub(n);
    }
}
