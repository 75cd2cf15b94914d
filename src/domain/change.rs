use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::coins::Denomination;
use crate::domain::ports::CoinVault;
use crate::infrastructure::in_memory::InMemoryVault;

/// Coins kept back per denomination so one large transaction cannot
/// drain a face value the next customer will need.
pub const SAFETY_THRESHOLD: u32 = 3;

/// Change amounts above this trigger a read-only reserve health scan.
pub const AUDIT_TRIGGER: i64 = 50;

/// The standard coin float a freshly serviced machine carries.
pub const STANDARD_FLOAT: [(Denomination, u32); 4] = [
    (Denomination::Fifty, 5),
    (Denomination::Ten, 20),
    (Denomination::Five, 20),
    (Denomination::One, 50),
];

/// The coins handed out for one change request.
///
/// `shortfall` is the portion of the requested amount the reserve could
/// not cover. A solvent reserve always produces `shortfall == 0`; an
/// insolvent one degrades to partial change rather than refusing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeBreakdown {
    coins: BTreeMap<Denomination, u32>,
    pub shortfall: i64,
}

impl ChangeBreakdown {
    pub fn count(&self, denomination: Denomination) -> u32 {
        self.coins.get(&denomination).copied().unwrap_or(0)
    }

    /// Monetary value actually dispensed.
    pub fn total(&self) -> i64 {
        self.coins
            .iter()
            .map(|(d, n)| d.value() * i64::from(*n))
            .sum()
    }

    pub fn is_exact(&self) -> bool {
        self.shortfall == 0
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    fn add(&mut self, denomination: Denomination, n: u32) {
        *self.coins.entry(denomination).or_insert(0) += n;
    }
}

/// Reserve health band for one denomination, used by the audit scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReserveBand {
    Empty,
    CriticallyLow,
    Low,
    Healthy,
    Overflow,
}

impl ReserveBand {
    pub fn classify(count: u32) -> Self {
        if count == 0 {
            ReserveBand::Empty
        } else if count < 3 {
            ReserveBand::CriticallyLow
        } else if count < 10 {
            ReserveBand::Low
        } else if count > 100 {
            ReserveBand::Overflow
        } else {
            ReserveBand::Healthy
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DenominationHealth {
    pub denomination: i64,
    pub count: u32,
    pub band: ReserveBand,
}

/// Computes change breakdowns from a depletable coin reserve.
///
/// The allocator walks denominations from largest to smallest and holds
/// back a small buffer of each scarce denomination, pushing the
/// remainder onto smaller coins instead of emptying a slot outright.
pub struct ChangeAllocator<V: CoinVault = InMemoryVault> {
    vault: V,
}

impl Default for ChangeAllocator {
    fn default() -> Self {
        Self {
            vault: InMemoryVault::with_counts(&STANDARD_FLOAT),
        }
    }
}

impl<V: CoinVault> ChangeAllocator<V> {
    pub fn with_vault(vault: V) -> Self {
        Self { vault }
    }

    pub fn vault(&self) -> &V {
        &self.vault
    }

    /// Allocates coins covering `amount`, mutating the reserve by exactly
    /// the coins dispensed. Requests of zero or less return an empty
    /// breakdown and touch nothing.
    pub fn make_change(&mut self, amount: i64) -> ChangeBreakdown {
        let mut breakdown = ChangeBreakdown::default();
        if amount <= 0 {
            return breakdown;
        }
        if amount > AUDIT_TRIGGER {
            self.audit_reserves();
        }

        let mut remaining = amount;
        for denomination in Denomination::DESCENDING {
            if remaining == 0 {
                break;
            }
            let needed = remaining / denomination.value();
            if needed == 0 {
                continue;
            }
            let given = self.coins_to_give(denomination, needed);
            if given > 0 {
                let given_u32 = given as u32;
                breakdown.add(denomination, given_u32);
                self.vault.take(denomination, given_u32);
                remaining -= given * denomination.value();
            }
        }

        breakdown.shortfall = remaining;
        if remaining > 0 {
            warn!(amount, shortfall = remaining, "reserve could not cover change in full");
        }
        breakdown
    }

    /// Scarcity guard: how many coins of `denomination` to part with when
    /// `needed` are requested. A comfortably stocked slot gives the full
    /// count; a scarce one gives one fewer than asked so the remainder
    /// falls to smaller coins; the smallest denomination has no fallback
    /// and may be exhausted.
    fn coins_to_give(&self, denomination: Denomination, needed: i64) -> i64 {
        let available = i64::from(self.vault.count(denomination));
        if available == 0 {
            return 0;
        }
        if available >= needed + i64::from(SAFETY_THRESHOLD) {
            return needed;
        }
        if denomination.is_smallest() {
            return available.min(needed);
        }
        if available <= i64::from(SAFETY_THRESHOLD) {
            return available.min(needed - 1).max(0);
        }
        available.min(needed)
    }

    /// Read-only health scan of every denomination. Purely observational:
    /// it never changes what the allocator dispenses.
    pub fn audit(&self) -> Vec<DenominationHealth> {
        Denomination::DESCENDING
            .iter()
            .map(|&d| {
                let count = self.vault.count(d);
                DenominationHealth {
                    denomination: d.value(),
                    count,
                    band: ReserveBand::classify(count),
                }
            })
            .collect()
    }

    fn audit_reserves(&self) {
        for health in self.audit() {
            match health.band {
                ReserveBand::Empty | ReserveBand::CriticallyLow => warn!(
                    denomination = health.denomination,
                    count = health.count,
                    band = ?health.band,
                    "coin reserve running out"
                ),
                _ => debug!(
                    denomination = health.denomination,
                    count = health.count,
                    band = ?health.band,
                    "coin reserve status"
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allocator_with(counts: &[(Denomination, u32)]) -> ChangeAllocator {
        ChangeAllocator::with_vault(InMemoryVault::with_counts(counts))
    }

    #[test]
    fn test_exact_change_from_standard_float() {
        let mut allocator = ChangeAllocator::default();
        let change = allocator.make_change(66);

        assert_eq!(change.count(Denomination::Fifty), 1);
        assert_eq!(change.count(Denomination::Ten), 1);
        assert_eq!(change.count(Denomination::Five), 1);
        assert_eq!(change.count(Denomination::One), 1);
        assert!(change.is_exact());
        assert_eq!(change.total(), 66);
    }

    #[test]
    fn test_scarcity_guard_preserves_buffer() {
        // Three tens on hand; asking for two would normally take both.
        // The guard gives one and covers the rest with fives.
        let mut allocator = allocator_with(&[
            (Denomination::Ten, 3),
            (Denomination::Five, 20),
            (Denomination::One, 50),
        ]);
        let change = allocator.make_change(20);

        assert_eq!(change.count(Denomination::Ten), 1);
        assert_eq!(change.count(Denomination::Five), 2);
        assert!(change.is_exact());
        assert_eq!(allocator.vault().count(Denomination::Ten), 2);
    }

    #[test]
    fn test_empty_denomination_is_skipped() {
        let mut allocator = allocator_with(&[
            (Denomination::Ten, 5),
            (Denomination::Five, 5),
        ]);
        let change = allocator.make_change(60);

        assert_eq!(change.count(Denomination::Fifty), 0);
        assert_eq!(change.count(Denomination::Ten), 5);
        assert_eq!(change.count(Denomination::Five), 2);
        assert!(change.is_exact());
    }

    #[test]
    fn test_smallest_denomination_may_be_exhausted() {
        let mut allocator = allocator_with(&[(Denomination::One, 2)]);
        let change = allocator.make_change(2);

        assert_eq!(change.count(Denomination::One), 2);
        assert!(change.is_exact());
        assert_eq!(allocator.vault().count(Denomination::One), 0);
    }

    #[test]
    fn test_insolvent_reserve_surfaces_shortfall() {
        let mut allocator = allocator_with(&[(Denomination::One, 2)]);
        let change = allocator.make_change(15);

        assert_eq!(change.count(Denomination::One), 2);
        assert_eq!(change.total(), 2);
        assert_eq!(change.shortfall, 13);
        assert!(!change.is_exact());
        assert_eq!(allocator.vault().count(Denomination::One), 0);
    }

    #[test]
    fn test_non_positive_amount_is_a_no_op() {
        let mut allocator = ChangeAllocator::default();
        let before = allocator.vault().clone();

        assert!(allocator.make_change(0).is_empty());
        assert!(allocator.make_change(-5).is_empty());
        assert_eq!(allocator.vault(), &before);
    }

    #[test]
    fn test_band_classification() {
        assert_eq!(ReserveBand::classify(0), ReserveBand::Empty);
        assert_eq!(ReserveBand::classify(2), ReserveBand::CriticallyLow);
        assert_eq!(ReserveBand::classify(5), ReserveBand::Low);
        assert_eq!(ReserveBand::classify(50), ReserveBand::Healthy);
        assert_eq!(ReserveBand::classify(150), ReserveBand::Overflow);
    }

    #[test]
    fn test_audit_reports_every_denomination() {
        let allocator = allocator_with(&[(Denomination::Fifty, 1), (Denomination::One, 30)]);
        let report = allocator.audit();

        assert_eq!(report.len(), 4);
        assert_eq!(report[0].denomination, 50);
        assert_eq!(report[0].band, ReserveBand::CriticallyLow);
        assert_eq!(report[3].band, ReserveBand::Healthy);
    }

    #[test]
    fn test_value_conservation_under_random_load() {
        use rand::{Rng, SeedableRng};
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let counts: Vec<(Denomination, u32)> = Denomination::DESCENDING
                .iter()
                .map(|&d| (d, rng.gen_range(0..30)))
                .collect();
            let mut allocator = allocator_with(&counts);
            let reserve_before = allocator.vault().total_value();

            let amount = rng.gen_range(0..300);
            let change = allocator.make_change(amount);

            assert_eq!(change.total() + change.shortfall, amount.max(0));
            assert_eq!(
                allocator.vault().total_value(),
                reserve_before - change.total()
            );
        }
    }
}
