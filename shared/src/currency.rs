//! Conversion between internal coins and the display currency.
//!
//! `1000` coins make one dollar. Converting coins to a display string rounds
//! to cents; converting an amount back to coins floors, so the round trip can
//! lose coins.

pub const COINS_PER_DOLLAR: u64 = 1000;

/// Formats a coin balance as dollars with two decimals (`1500` -> `"1.50"`).
///
/// Rounding is decimal half-up on the exact integer value.
pub fn coins_to_currency(coins: u64) -> String {
    let cents = coins / 10 + u64::from(coins % 10 >= 5);
    format!("{}.{:02}", cents / 100, cents % 100)
}

/// Converts a dollar amount to coins, flooring any fraction of a coin.
///
/// The multiplication is plain binary floating point, so `1.23` becomes
/// `1229`. Negative and NaN amounts yield zero.
pub fn currency_to_coins(amount: f64) -> u64 {
    (amount * COINS_PER_DOLLAR as f64).floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coins_to_currency_formatting() {
        assert_eq!(coins_to_currency(0), "0.00");
        assert_eq!(coins_to_currency(500), "0.50");
        assert_eq!(coins_to_currency(1000), "1.00");
        assert_eq!(coins_to_currency(123_456), "123.46");
        assert_eq!(coins_to_currency(1004), "1.00");
        assert_eq!(coins_to_currency(1005), "1.01");
    }

    #[test]
    fn test_currency_to_coins_floors() {
        assert_eq!(currency_to_coins(1.0), 1000);
        assert_eq!(currency_to_coins(1.23), 1229);
        assert_eq!(currency_to_coins(0.0009999995), 0);
        assert_eq!(currency_to_coins(0.0015), 1);
        assert_eq!(currency_to_coins(-2.0), 0);
        assert_eq!(currency_to_coins(f64::NAN), 0);
    }

    #[test]
    fn test_round_trip_exact_for_whole_dollars() {
        for c in (0..50_000u64).step_by(1000) {
            let display: f64 = coins_to_currency(c).parse().unwrap();
            assert_eq!(currency_to_coins(display), c);
        }
    }

    #[test]
    fn test_round_trip_is_lossy_below_a_cent() {
        let display: f64 = coins_to_currency(1234).parse().unwrap();
        assert_eq!(currency_to_coins(display), 1229);
    }

    #[test]
    fn test_conversion_is_monotonic() {
        let mut previous = 0.0;
        for c in 0..5000u64 {
            let value: f64 = coins_to_currency(c).parse().unwrap();
            assert!(value >= previous);
            previous = value;
        }
    }
}
