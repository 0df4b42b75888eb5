use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::constants::{DAYS_PER_YEAR, DAYS_PER_YEAR_F64};

/// Fraction of a 365.25-day year between two dates.
///
/// This is the single source of truth for annualization day-counting.
/// Negative when `end` precedes `start`.
pub fn year_fraction(start: NaiveDate, end: NaiveDate) -> Decimal {
    Decimal::from((end - start).num_days()) / DAYS_PER_YEAR
}

/// Same day-count on the f64 path used inside the IRR root-finder.
pub fn year_fraction_f64(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64 / DAYS_PER_YEAR_F64
}
