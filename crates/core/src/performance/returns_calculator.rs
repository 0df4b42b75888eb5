//! Pure return calculations over a validated price history.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

use super::ReturnData;
use crate::errors::{Error, Result, ValidationError};
use crate::history::{validate_history, PricePoint};
use crate::utils::time_utils::year_fraction;

/// Simple calendar-year returns on adjusted closes.
///
/// Each year's return runs from the prior year's last adjusted close to this
/// year's last adjusted close; the inception year runs from its own first
/// price instead, and is emitted only when that year has a measurable span
/// (at least two points; a lone seed point just anchors the next year).
/// Years without data are absent from the map, never zero.
pub fn yearly_returns(history: &[PricePoint]) -> Result<BTreeMap<i32, Decimal>> {
    validate_history(history)?;

    let mut returns = BTreeMap::new();
    let mut anchor = history[0].adjusted_close;
    let mut year = history[0].date.year();
    let mut last_close = anchor;
    let mut points_in_year = 0usize;
    let mut inception_year = true;

    for point in history {
        if point.date.year() != year {
            if !inception_year || points_in_year >= 2 {
                returns.insert(year, (last_close - anchor) / anchor);
            }
            anchor = last_close;
            year = point.date.year();
            points_in_year = 0;
            inception_year = false;
        }
        last_close = point.adjusted_close;
        points_in_year += 1;
    }
    if !inception_year || points_in_year >= 2 {
        returns.insert(year, (last_close - anchor) / anchor);
    }

    Ok(returns)
}

/// Cumulative return over the instrument's full available span.
pub fn total_return(history: &[PricePoint]) -> Result<Decimal> {
    validate_history(history)?;
    let first = history[0].adjusted_close;
    let last = history[history.len() - 1].adjusted_close;
    Ok((last - first) / first)
}

/// Annualizes a cumulative return over an actual-day span.
///
/// Sub-year spans return the cumulative value unchanged; a total loss caps
/// at -100% since the compounding base would go non-positive.
pub fn annualize_return(
    start_date: NaiveDate,
    end_date: NaiveDate,
    total_return: Decimal,
) -> Decimal {
    if start_date > end_date {
        return Decimal::ZERO;
    }
    if total_return <= dec!(-1.0) {
        return dec!(-1.0);
    }

    let years = year_fraction(start_date, end_date);
    if years <= Decimal::ZERO {
        return total_return;
    }
    if years < Decimal::ONE {
        return total_return;
    }

    let base = Decimal::ONE + total_return;
    if base <= Decimal::ZERO {
        return dec!(-1.0);
    }

    base.powd(Decimal::ONE / years) - Decimal::ONE
}

/// Rolling n-year simple returns.
///
/// Walks the history from the latest point backwards, pairing each point
/// with the latest observation at least `years` calendar years earlier, and
/// keys the window return by its end date.
pub fn rolling_returns(history: &[PricePoint], years: u32) -> Result<Vec<ReturnData>> {
    if years == 0 {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "rolling window must span at least one year".to_string(),
        )));
    }
    validate_history(history)?;

    let window = Months::new(years * 12);
    let first_date = history[0].date;
    let last_date = history[history.len() - 1].date;
    match first_date.checked_add_months(window) {
        Some(earliest_end) if earliest_end <= last_date => {}
        _ => {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "history {} - {} is shorter than the {}-year window",
                first_date, last_date, years
            ))))
        }
    }

    let mut windows = Vec::new();
    for point in history.iter().rev() {
        let cutoff = match point.date.checked_sub_months(window) {
            Some(cutoff) => cutoff,
            None => break,
        };
        let pos = history.partition_point(|earlier| earlier.date <= cutoff);
        if pos == 0 {
            break;
        }
        let start = &history[pos - 1];
        windows.push(ReturnData {
            date: point.date,
            value: (point.adjusted_close - start.adjusted_close) / start.adjusted_close,
        });
    }
    windows.reverse();

    Ok(windows)
}
