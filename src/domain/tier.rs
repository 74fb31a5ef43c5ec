//! Tier calculator.
//!
//! Maps a balance amount to a user level. Thresholds are exclusive lower
//! bounds, evaluated highest first; anything at or below the lowest
//! threshold (including zero and negative balances) is `BASE_LEVEL`.

use rust_decimal::Decimal;

/// User tier. Always `>= BASE_LEVEL`.
pub type Level = i32;

/// Level of a user whose balance clears no threshold.
pub const BASE_LEVEL: Level = 1;

/// `(threshold, level)` pairs, highest threshold first.
pub const TIER_THRESHOLDS: &[(i64, Level)] = &[
    (3_000_000, 4),
    (2_000_000, 3),
    (1_000_000, 2),
];

/// Level for the given balance amount.
pub fn tier_for(amount: Decimal) -> Level {
    TIER_THRESHOLDS
        .iter()
        .find(|(threshold, _)| amount > Decimal::from(*threshold))
        .map(|(_, level)| *level)
        .unwrap_or(BASE_LEVEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(amount: i64) -> Level {
        tier_for(Decimal::from(amount))
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(level(1_000_000), 1);
        assert_eq!(level(1_000_001), 2);
        assert_eq!(level(2_000_000), 2);
        assert_eq!(level(2_000_001), 3);
        assert_eq!(level(3_000_000), 3);
        assert_eq!(level(3_000_001), 4);
    }

    #[test]
    fn test_fractional_amount_just_over_threshold() {
        assert_eq!(tier_for(Decimal::new(10_000_000_001, 4)), 2);
    }

    #[test]
    fn test_zero_and_negative_are_base_level() {
        assert_eq!(level(0), BASE_LEVEL);
        assert_eq!(level(-5), BASE_LEVEL);
        assert_eq!(level(-10_000_000), BASE_LEVEL);
    }

    #[test]
    fn test_monotonic() {
        let mut previous = level(-1_000);
        for amount in (-1_000..5_000_000).step_by(99_991) {
            let current = level(amount);
            assert!(current >= previous, "level dropped at {}", amount);
            previous = current;
        }
    }

    #[test]
    fn test_table_is_ordered_highest_first() {
        assert!(TIER_THRESHOLDS.windows(2).all(|w| w[0].0 > w[1].0 && w[0].1 > w[1].1));
    }
}
