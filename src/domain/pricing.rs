//! Pricing calculator
//!
//! Cost is derived from the booked window and the lot's hourly rate.
//! Fractional hours are billed as-is (no rounding up to whole hours); the
//! result is rounded to currency precision, half-up.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places of the currency
pub const CURRENCY_SCALE: u32 = 2;

/// Windows are measured to the millisecond
const MILLIS_PER_HOUR: i64 = 3_600_000;

fn elapsed_millis(start: DateTime<Utc>, end: DateTime<Utc>) -> Decimal {
    Decimal::from((end - start).num_milliseconds())
}

/// Elapsed time between `start` and `end` in (fractional) hours
pub fn duration_hours(start: DateTime<Utc>, end: DateTime<Utc>) -> Decimal {
    elapsed_millis(start, end) / Decimal::from(MILLIS_PER_HOUR)
}

/// Round a money amount to currency precision, half-up
pub fn round_currency(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(CURRENCY_SCALE);
    rounded
}

/// Total cost of a window at `price_per_hour`.
///
/// Assumes `end > start`; the allocator rejects other windows upstream.
pub fn compute_cost(start: DateTime<Utc>, end: DateTime<Utc>, price_per_hour: Decimal) -> Decimal {
    // Multiply before dividing so short windows keep their precision.
    round_currency(elapsed_millis(start, end) * price_per_hour / Decimal::from(MILLIS_PER_HOUR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ten_am() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 3, 1, 10, 0, 0).unwrap()
    }

    fn rate(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn two_hours_at_fifteen_costs_thirty() {
        let cost = compute_cost(ten_am(), ten_am() + Duration::hours(2), rate(1500));
        assert_eq!(cost, rate(3000));
        assert_eq!(cost.to_string(), "30.00");
    }

    #[test]
    fn fractional_hours_are_not_rounded_up() {
        let cost = compute_cost(ten_am(), ten_am() + Duration::minutes(90), rate(1500));
        assert_eq!(cost.to_string(), "22.50");
    }

    #[test]
    fn rounds_to_cents() {
        // 20 min at 10.00/h = 3.333...
        let cost = compute_cost(ten_am(), ten_am() + Duration::minutes(20), rate(1000));
        assert_eq!(cost.to_string(), "3.33");
        // 40 min at 10.00/h = 6.666...
        let cost = compute_cost(ten_am(), ten_am() + Duration::minutes(40), rate(1000));
        assert_eq!(cost.to_string(), "6.67");
    }

    #[test]
    fn midpoint_rounds_up() {
        // 1 s at 18.00/h = 0.005 exactly
        let cost = compute_cost(ten_am(), ten_am() + Duration::seconds(1), rate(1800));
        assert_eq!(cost.to_string(), "0.01");
    }

    #[test]
    fn sub_second_time_is_billed() {
        let hourly = rate(360_000);
        let cost = compute_cost(ten_am(), ten_am() + Duration::milliseconds(1999), hourly);
        assert_eq!(cost.to_string(), "2.00");
        let cost = compute_cost(ten_am(), ten_am() + Duration::milliseconds(500), hourly);
        assert_eq!(cost.to_string(), "0.50");
        let hours = duration_hours(ten_am(), ten_am() + Duration::milliseconds(1800));
        assert_eq!(hours, Decimal::new(5, 4));
    }

    #[test]
    fn cost_is_linear_in_duration() {
        let price = Decimal::new(1275, 2);
        for minutes in [15_i64, 45, 60, 95, 600] {
            let single = compute_cost(ten_am(), ten_am() + Duration::minutes(minutes), price);
            let double = compute_cost(ten_am(), ten_am() + Duration::minutes(minutes * 2), price);
            let diff = (double - single * Decimal::from(2)).abs();
            assert!(diff <= rate(1), "{} min: {} vs {}", minutes, single, double);
        }
    }

    #[test]
    fn duration_in_hours_is_fractional() {
        let hours = duration_hours(ten_am(), ten_am() + Duration::minutes(45));
        assert_eq!(hours, Decimal::new(75, 2));
    }
}
