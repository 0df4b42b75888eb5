use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cashflow::ContributionPlan;
use crate::solver::IrrSolverConfig;

/// A dated return observation (rolling windows, cumulative curves).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReturnData {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// Engine configuration, fixed for the lifetime of a service instance.
///
/// `report_span` pins the report period: each instrument's history is
/// clipped to the window before any metric is computed, and every yearly
/// map is normalized over the window's years. Without it each instrument
/// spans its full history and the union of those spans frames the report.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    pub contribution_plan: ContributionPlan,
    pub solver: IrrSolverConfig,
    pub report_span: Option<(NaiveDate, NaiveDate)>,
}

/// All computed metrics for one instrument over its available span.
///
/// The IRR fields are absent when the metric is undefined for the
/// instrument's schedule (`AllSameSign`) or the solver gave up
/// (`NoConvergence`); the other metrics stay valid. `yearly_returns` maps
/// every calendar year of the report span, with `None` for years the
/// instrument has no measurable data; absent is not a flat year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentPerformance {
    pub symbol: String,
    pub display_name: String,
    pub period_start_date: NaiveDate,
    pub period_end_date: NaiveDate,
    pub total_return: Decimal,
    pub annualized_return: Decimal,
    pub annualized_irr: Option<Decimal>,
    pub regular_plan_irr: Option<Decimal>,
    pub yearly_returns: BTreeMap<i32, Option<Decimal>>,
}

/// Per-run output for every tracked instrument.
///
/// Failures are scoped per instrument: an entry in `failures` never removes
/// the successful entries, and `yearly_returns` of every successful entry is
/// normalized over the union of report years.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub period_start_date: Option<NaiveDate>,
    pub period_end_date: Option<NaiveDate>,
    pub instruments: Vec<InstrumentPerformance>,
    pub failures: BTreeMap<String, String>,
}

impl PerformanceReport {
    pub fn get(&self, symbol: &str) -> Option<&InstrumentPerformance> {
        self.instruments
            .iter()
            .find(|performance| performance.symbol == symbol)
    }
}
