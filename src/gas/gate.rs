//! Gas price ceiling

use rust_decimal::Decimal;

const WEI_PER_GWEI: u128 = 1_000_000_000;

/// Convert a gwei amount to wei
pub fn gwei_to_wei(gwei: u64) -> u128 {
    u128::from(gwei) * WEI_PER_GWEI
}

/// Convert wei to gwei; `None` past Decimal's 96-bit mantissa
pub fn wei_to_gwei(wei: u128) -> Option<Decimal> {
    let wei = i128::try_from(wei).ok()?;
    Decimal::try_from_i128_with_scale(wei, 9).ok()
}

/// Gas price for logs and reports, in gwei when representable
pub fn display_gwei(wei: u128) -> String {
    match wei_to_gwei(wei) {
        Some(gwei) => format!("{} gwei", gwei.round_dp(2).normalize()),
        None => format!("{wei} wei"),
    }
}

/// Gas price in gwei as a metric sample
pub fn gwei_f64(wei: u128) -> f64 {
    wei as f64 / WEI_PER_GWEI as f64
}

/// Outcome of a gate check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasVerdict {
    /// Submission may proceed
    Allow,
    /// Current price above the ceiling
    Reject { current: u128, max: u128 },
}

impl GasVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GasVerdict::Allow)
    }
}

/// Rejects submissions while gas is above a configured ceiling
#[derive(Debug, Clone, Copy)]
pub struct GasGate {
    max_gas_price: u128,
}

impl GasGate {
    /// Gate with a ceiling in wei
    pub fn new(max_gas_price: u128) -> Self {
        Self { max_gas_price }
    }

    /// Gate with a ceiling in gwei
    pub fn from_gwei(max_gwei: u64) -> Self {
        Self::new(gwei_to_wei(max_gwei))
    }

    pub fn max_gas_price(&self) -> u128 {
        self.max_gas_price
    }

    /// `false` iff `current_gas_price > max_gas_price`
    pub fn allow(current_gas_price: u128, max_gas_price: u128) -> bool {
        current_gas_price <= max_gas_price
    }

    /// Evaluate the gate against a freshly queried price
    pub fn check(&self, current_gas_price: u128) -> GasVerdict {
        if Self::allow(current_gas_price, self.max_gas_price) {
            GasVerdict::Allow
        } else {
            GasVerdict::Reject {
                current: current_gas_price,
                max: self.max_gas_price,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_allow_predicate() {
        assert!(GasGate::allow(50, 50));
        assert!(GasGate::allow(49, 50));
        assert!(!GasGate::allow(60, 50));
    }

    #[test]
    fn test_check_rejects_over_ceiling() {
        let gate = GasGate::from_gwei(50);
        let verdict = gate.check(gwei_to_wei(60));
        assert_eq!(
            verdict,
            GasVerdict::Reject {
                current: 60_000_000_000,
                max: 50_000_000_000
            }
        );
        assert!(!verdict.is_allowed());
    }

    #[test]
    fn test_check_allows_at_ceiling() {
        let gate = GasGate::from_gwei(50);
        assert!(gate.check(gwei_to_wei(50)).is_allowed());
    }

    #[test]
    fn test_wei_to_gwei() {
        assert_eq!(wei_to_gwei(1_500_000_000), Some(dec!(1.5)));
        assert_eq!(wei_to_gwei(0), Some(dec!(0)));
    }

    #[test]
    fn test_wei_to_gwei_large_values() {
        // above i64::MAX but still representable
        let wei = 20_000_000_000_000_000_000_u128;
        assert_eq!(wei_to_gwei(wei), Some(dec!(20000000000)));
        assert_eq!(wei_to_gwei(u128::MAX), None);
    }

    #[test]
    fn test_display_gwei() {
        assert_eq!(display_gwei(gwei_to_wei(50)), "50 gwei");
        assert_eq!(display_gwei(1_234_567_890), "1.23 gwei");
        assert_eq!(display_gwei(u128::MAX), format!("{} wei", u128::MAX));
    }

    #[test]
    fn test_gwei_f64() {
        assert_eq!(gwei_f64(gwei_to_wei(20)), 20.0);
        assert!(gwei_f64(u128::MAX) > 1e29);
    }
}
