use super::coins::Denomination;

/// Backend holding the machine's coin reserve.
///
/// The allocator only ever removes coins it has confirmed are on hand,
/// so `take` may assume `n <= count(denomination)`.
pub trait CoinVault {
    fn count(&self, denomination: Denomination) -> u32;
    fn take(&mut self, denomination: Denomination, n: u32);
}
