use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Day-count denominator for annualizing returns over calendar-day spans.
pub const DAYS_PER_YEAR: Decimal = dec!(365.25);

/// Same denominator for the f64 root-finding path.
pub const DAYS_PER_YEAR_F64: f64 = 365.25;

/// Decimal precision for reported rates
pub const DECIMAL_PRECISION: u32 = 9;

/// Nominal amount invested per scheduled contribution of a regular plan
pub const DEFAULT_CONTRIBUTION_AMOUNT: Decimal = dec!(1000);

/// Default IRR search bracket. The lower bound stays above -100% so the
/// discount factor base remains positive.
pub const IRR_BRACKET_LOW: f64 = -0.999;
pub const IRR_BRACKET_HIGH: f64 = 10.0;

/// Hard ceiling when widening the upper bracket in search of a sign change.
pub const IRR_BRACKET_LIMIT: f64 = 100.0;

/// Convergence thresholds: bracket width on the rate, and objective
/// magnitude relative to the largest flow.
pub const IRR_RATE_TOLERANCE: f64 = 1e-9;
pub const IRR_NPV_TOLERANCE: f64 = 1e-9;

/// Iteration cap; exceeding it is a `NoConvergence` error, never a guess.
pub const IRR_MAX_ITERATIONS: u32 = 200;
