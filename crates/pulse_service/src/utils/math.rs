use rust_decimal::{prelude::FromPrimitive, Decimal};

/// Decimal places kept on prices, matching the `NUMERIC(20, 8)` column.
pub const PRICE_SCALE: u32 = 8;

/// `price * (1 + pct)`, clamped at zero and rounded to [`PRICE_SCALE`].
pub fn apply_percent_change(price: Decimal, pct: f64) -> Decimal {
    let factor = Decimal::ONE + Decimal::from_f64(pct).unwrap_or(Decimal::ZERO);
    let next = price.checked_mul(factor).unwrap_or(price);

    next.max(Decimal::ZERO).round_dp(PRICE_SCALE)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_apply_percent_change() {
        let price = Decimal::from(100);
        assert_eq!(apply_percent_change(price, 0.02), Decimal::from(102));
        assert_eq!(apply_percent_change(price, -0.02), Decimal::from(98));
        assert_eq!(apply_percent_change(price, 0.0), price);
    }

    #[test]
    fn test_apply_percent_change_never_negative() {
        let price = Decimal::from_str("0.5").unwrap();
        assert_eq!(apply_percent_change(price, -1.5), Decimal::ZERO);
    }

    #[test]
    fn test_apply_percent_change_rounds_to_price_scale() {
        let price = Decimal::from_str("0.123456789").unwrap();
        let next = apply_percent_change(price, 0.01);
        assert!(next.scale() <= PRICE_SCALE);
    }
}
