// Utility modules

use rust_decimal::Decimal;

/// Render a monetary amount with exactly two fractional digits, the way
/// prices and totals appear on the wire.
pub fn format_amount(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_amount_keeps_two_fraction_digits() {
        assert_eq!(format_amount(Decimal::new(49995, 2)), "499.95");
        assert_eq!(format_amount(Decimal::new(500, 0)), "500.00");
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
    }

    #[test]
    fn format_amount_normalizes_excess_scale() {
        // NUMERIC columns can hand back a wider scale than displayed.
        assert_eq!(format_amount(Decimal::new(99_990, 3)), "99.99");
    }
}
