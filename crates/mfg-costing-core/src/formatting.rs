//! Rendering of amounts for display. Calculations never go through here.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{Currency, Money, Percent, Viability};

/// Text shown in place of a figure that cannot be reached.
pub const NOT_VIABLE_LABEL: &str = "Not viable";

/// Round to 2 dp, halves away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn fixed_2dp(value: Decimal) -> String {
    let mut v = round_money(value);
    v.rescale(2);
    v.to_string()
}

/// Currency symbol followed by the amount at 2 dp, e.g. `₹65.00`.
pub fn format_money(amount: Money, currency: &Currency) -> String {
    format!("{}{}", currency.symbol(), fixed_2dp(amount))
}

/// `23.08%`
pub fn format_percent(pct: Percent) -> String {
    format!("{}%", fixed_2dp(pct))
}

/// Renders a viable figure with `render`, or the not-viable label.
pub fn format_viable(value: &Viability<Decimal>, render: impl Fn(Decimal) -> String) -> String {
    match value {
        Viability::Viable(v) => render(*v),
        Viability::NotViable => NOT_VIABLE_LABEL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec!(2.345)), dec!(2.35));
        assert_eq!(round_money(dec!(-2.345)), dec!(-2.35));
        assert_eq!(round_money(dec!(2.344)), dec!(2.34));
    }

    #[test]
    fn test_format_money_pads_to_two_places() {
        assert_eq!(format_money(dec!(65), &Currency::INR), "₹65.00");
        assert_eq!(format_money(dec!(71.428571), &Currency::USD), "$71.43");
        assert_eq!(format_money(dec!(0.5), &Currency::GBP), "£0.50");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(23.076923)), "23.08%");
        assert_eq!(format_percent(dec!(40)), "40.00%");
    }

    #[test]
    fn test_format_viable() {
        let units = Viability::Viable(dec!(250));
        assert_eq!(format_viable(&units, |u| format!("{u} units")), "250 units");
        assert_eq!(
            format_viable(&Viability::NotViable, |u| format_money(u, &Currency::INR)),
            NOT_VIABLE_LABEL
        );
    }
}
