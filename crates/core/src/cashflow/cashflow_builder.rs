//! Turns a price history plus a strategy into a signed cash-flow schedule.

use chrono::Months;
use log::debug;
use rust_decimal::Decimal;

use super::{CashFlow, ContributionPlan};
use crate::errors::{Error, Result, ValidationError};
use crate::history::{validate_history, PricePoint};

/// Buy-and-hold: one investment at the first record, one terminal value at
/// the last.
pub fn build_lump_sum_flows(history: &[PricePoint]) -> Result<Vec<CashFlow>> {
    validate_history(history)?;
    let (first, last) = boundary_points(history)?;

    Ok(vec![
        CashFlow::new(first.date, -first.adjusted_close),
        CashFlow::new(last.date, last.adjusted_close),
    ])
}

/// Regular plan: one fixed-amount investment at the first trading date of
/// each scheduled period, then a terminal flow liquidating all accumulated
/// units at the last adjusted close.
///
/// Periods before the instrument's listing (or without any trading date)
/// contribute nothing, so a late-incepted instrument gets a shorter
/// schedule, never an error. Flows on the same date are summed, so a
/// contribution landing on the final record merges into the terminal flow.
pub fn build_regular_flows(history: &[PricePoint], plan: &ContributionPlan) -> Result<Vec<CashFlow>> {
    plan.validate()?;
    validate_history(history)?;
    let (first, last) = boundary_points(history)?;

    let anchor = plan.anchor.unwrap_or(first.date);
    if anchor > last.date {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "plan anchor {} is after the last record {}",
            anchor, last.date
        ))));
    }

    let mut schedule = Vec::new();
    let mut due = anchor;
    while due <= last.date {
        schedule.push(due);
        match due.checked_add_months(Months::new(plan.interval.months())) {
            Some(next) => due = next,
            None => break,
        }
    }

    let mut flows: Vec<CashFlow> = Vec::with_capacity(schedule.len() + 1);
    let mut units = Decimal::ZERO;
    let mut cursor = 0usize;

    for (idx, &period_start) in schedule.iter().enumerate() {
        while cursor < history.len() && history[cursor].date < period_start {
            cursor += 1;
        }
        if cursor >= history.len() {
            break;
        }
        let point = &history[cursor];
        if let Some(&period_end) = schedule.get(idx + 1) {
            if point.date >= period_end {
                debug!(
                    "no trading date in period starting {}; contribution skipped",
                    period_start
                );
                continue;
            }
        }

        units += plan.amount / point.adjusted_close;
        flows.push(CashFlow::new(point.date, -plan.amount));
        cursor += 1;
    }

    let terminal = units * last.adjusted_close;
    match flows.last_mut() {
        Some(flow) if flow.date == last.date => flow.amount += terminal,
        _ => flows.push(CashFlow::new(last.date, terminal)),
    }

    Ok(flows)
}

fn boundary_points(history: &[PricePoint]) -> Result<(&PricePoint, &PricePoint)> {
    match (history.first(), history.last()) {
        (Some(first), Some(last)) if history.len() >= 2 => Ok((first, last)),
        _ => Err(Error::InvalidHistory(format!(
            "at least two price points are needed, got {}",
            history.len()
        ))),
    }
}
