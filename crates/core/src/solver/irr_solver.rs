//! Annualized IRR over an irregular, dated cash-flow schedule.
//!
//! Solves for the rate `r` with Σ amountᵢ · (1+r)^(−tᵢ) = 0, where `tᵢ` is
//! the fractional 365.25-day-year span from the first flow. Two-flow
//! schedules are solved in closed form; anything longer goes through a
//! bracketing bisection with an iteration cap, so non-convergence is an
//! explicit error instead of a best-guess rate.
//!
//! The search runs on f64: near the lower bracket the discount factor
//! `(1+r)^(-t)` exceeds what 96-bit fixed point can represent. Rates are
//! converted back to `Decimal` at the boundary.

use chrono::NaiveDate;
use log::debug;
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::cashflow::CashFlow;
use crate::constants::{
    IRR_BRACKET_HIGH, IRR_BRACKET_LIMIT, IRR_BRACKET_LOW, IRR_MAX_ITERATIONS, IRR_NPV_TOLERANCE,
    IRR_RATE_TOLERANCE,
};
use crate::utils::time_utils::year_fraction_f64;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverError {
    /// All flows share one sign (or cancel out); no discount rate zeroes
    /// the schedule.
    #[error("cash-flow schedule has no sign change; IRR is undefined")]
    AllSameSign,

    /// The iteration budget ran out before the tolerance was met.
    #[error("IRR search did not converge within {iterations} iterations")]
    NoConvergence { iterations: u32 },
}

#[derive(Debug, Clone, Copy)]
pub struct IrrSolverConfig {
    pub bracket_low: f64,
    pub bracket_high: f64,
    pub bracket_limit: f64,
    pub rate_tolerance: f64,
    pub npv_tolerance: f64,
    pub max_iterations: u32,
}

impl Default for IrrSolverConfig {
    fn default() -> Self {
        Self {
            bracket_low: IRR_BRACKET_LOW,
            bracket_high: IRR_BRACKET_HIGH,
            bracket_limit: IRR_BRACKET_LIMIT,
            rate_tolerance: IRR_RATE_TOLERANCE,
            npv_tolerance: IRR_NPV_TOLERANCE,
            max_iterations: IRR_MAX_ITERATIONS,
        }
    }
}

/// Solves with the default configuration.
pub fn solve_irr(flows: &[CashFlow]) -> Result<Decimal, SolverError> {
    solve_irr_with(flows, &IrrSolverConfig::default())
}

pub fn solve_irr_with(
    flows: &[CashFlow],
    config: &IrrSolverConfig,
) -> Result<Decimal, SolverError> {
    let schedule = collapse_ties(flows);

    let has_negative = schedule.iter().any(|(_, amount)| *amount < 0.0);
    let has_positive = schedule.iter().any(|(_, amount)| *amount > 0.0);
    if !has_negative || !has_positive {
        return Err(SolverError::AllSameSign);
    }

    // Degenerate buy-and-hold schedule: r = (final/initial)^(1/t) - 1.
    if schedule.len() == 2 {
        let (t, first_amount) = (schedule[1].0, schedule[0].1);
        let ratio = -(schedule[1].1 / first_amount);
        let rate = ratio.powf(1.0 / t) - 1.0;
        return to_decimal(rate, 0);
    }

    let npv = |rate: f64| -> f64 {
        schedule
            .iter()
            .map(|(t, amount)| amount * (1.0 + rate).powf(-t))
            .sum()
    };
    let scale = schedule
        .iter()
        .map(|(_, amount)| amount.abs())
        .fold(0.0_f64, f64::max);

    let lo_start = config.bracket_low;
    let mut hi = config.bracket_high;
    let f_lo_start = npv(lo_start);
    let mut f_hi = npv(hi);

    // Widen upward until the endpoints straddle a root.
    while f_lo_start * f_hi > 0.0 && hi < config.bracket_limit {
        hi = (hi * 2.0).min(config.bracket_limit);
        f_hi = npv(hi);
    }
    if f_lo_start * f_hi > 0.0 {
        debug!(
            "no sign change in [{}, {}]; npv({}) = {}",
            lo_start, hi, hi, f_hi
        );
        return Err(SolverError::NoConvergence { iterations: 0 });
    }

    let mut lo = lo_start;
    let mut f_lo = f_lo_start;
    for iteration in 1..=config.max_iterations {
        let mid = 0.5 * (lo + hi);
        let f_mid = npv(mid);

        if f_mid.abs() <= config.npv_tolerance * scale {
            return to_decimal(mid, iteration);
        }
        if (f_mid > 0.0) == (f_lo > 0.0) {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
        if hi - lo <= config.rate_tolerance {
            return to_decimal(0.5 * (lo + hi), iteration);
        }
    }

    Err(SolverError::NoConvergence {
        iterations: config.max_iterations,
    })
}

/// Net present value of a schedule at an annualized rate, discounted on
/// actual-day fractional-year exponents. Exposed for diagnostics and tests.
pub fn net_present_value(flows: &[CashFlow], rate: f64) -> f64 {
    collapse_ties(flows)
        .iter()
        .map(|(t, amount)| amount * (1.0 + rate).powf(-t))
        .sum()
}

/// Orders flows by date, sums same-date amounts, and maps them to
/// (fractional years since the first flow, f64 amount) pairs.
fn collapse_ties(flows: &[CashFlow]) -> Vec<(f64, f64)> {
    let mut ordered: Vec<CashFlow> = flows.to_vec();
    ordered.sort_by_key(|flow| flow.date);

    let mut collapsed: Vec<(NaiveDate, Decimal)> = Vec::with_capacity(ordered.len());
    for flow in ordered {
        match collapsed.last_mut() {
            Some((date, amount)) if *date == flow.date => *amount += flow.amount,
            _ => collapsed.push((flow.date, flow.amount)),
        }
    }

    let base_date = match collapsed.first() {
        Some((date, _)) => *date,
        None => return Vec::new(),
    };
    collapsed
        .into_iter()
        .map(|(date, amount)| {
            (
                year_fraction_f64(base_date, date),
                amount.to_f64().unwrap_or(0.0),
            )
        })
        .collect()
}

fn to_decimal(rate: f64, iterations: u32) -> Result<Decimal, SolverError> {
    Decimal::from_f64(rate).ok_or(SolverError::NoConvergence { iterations })
}
