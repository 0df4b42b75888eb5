//! Per-instrument fan-out and report assembly.

use chrono::Datelike;
use dashmap::DashMap;
use log::warn;
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{
    annualize_return, total_return, yearly_returns, EngineOptions, InstrumentPerformance,
    PerformanceReport,
};
use crate::cashflow::{build_lump_sum_flows, build_regular_flows, CashFlow};
use crate::constants::DECIMAL_PRECISION;
use crate::errors::{Error, Result};
use crate::history::{validate_history, HistoryRepositoryTrait, Instrument, PricePoint};
use crate::solver::solve_irr_with;

pub trait PerformanceServiceTrait: Send + Sync {
    /// Computes all metrics for one instrument. Fails with `InvalidHistory`
    /// when the store contract is broken for this symbol; IRR metrics demote
    /// to `None` on solver failures instead of failing the instrument.
    fn calculate_instrument(&self, symbol: &str) -> Result<InstrumentPerformance>;

    /// Computes every tracked instrument in parallel. One instrument's
    /// failure lands in `report.failures` and never halts the others.
    fn calculate_all(&self) -> Result<PerformanceReport>;
}

pub struct PerformanceService<R> {
    repository: Arc<R>,
    options: EngineOptions,
    // Per-run memo cache; entries are write-once since options are fixed.
    cache: DashMap<String, InstrumentPerformance>,
}

impl<R: HistoryRepositoryTrait> PerformanceService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_options(repository, EngineOptions::default())
    }

    pub fn with_options(repository: Arc<R>, options: EngineOptions) -> Self {
        Self {
            repository,
            options,
            cache: DashMap::new(),
        }
    }

    fn calculate(&self, instrument: &Instrument) -> Result<InstrumentPerformance> {
        // A configured report span clips the history first, so every metric
        // is measured over the window rather than the full listing.
        let history: Vec<PricePoint> = match self.options.report_span {
            Some((start, end)) => instrument
                .history
                .iter()
                .copied()
                .filter(|point| point.date >= start && point.date <= end)
                .collect(),
            None => instrument.history.clone(),
        };
        let history = &history;
        validate_history(history)?;
        if history.len() < 2 {
            warn!(
                "Instrument '{}': not enough history data ({} points)",
                instrument.symbol,
                history.len()
            );
            return Err(Error::InvalidHistory(format!(
                "instrument '{}' has {} price points; at least two are needed",
                instrument.symbol,
                history.len()
            )));
        }

        let period_start_date = history[0].date;
        let period_end_date = history[history.len() - 1].date;

        let total = total_return(history)?;
        let annualized = annualize_return(period_start_date, period_end_date, total);

        let lump_sum_flows = build_lump_sum_flows(history)?;
        let annualized_irr = self.solve_metric(&instrument.symbol, "lump-sum IRR", &lump_sum_flows);

        let regular_flows = build_regular_flows(history, &self.options.contribution_plan)?;
        let regular_plan_irr =
            self.solve_metric(&instrument.symbol, "regular-plan IRR", &regular_flows);

        let per_year = yearly_returns(history)?;
        let mut yearly: BTreeMap<i32, Option<Decimal>> = BTreeMap::new();
        for year in period_start_date.year()..=period_end_date.year() {
            yearly.insert(
                year,
                per_year
                    .get(&year)
                    .map(|rate| rate.round_dp(DECIMAL_PRECISION)),
            );
        }

        Ok(InstrumentPerformance {
            symbol: instrument.symbol.clone(),
            display_name: instrument.display_name.clone(),
            period_start_date,
            period_end_date,
            total_return: total.round_dp(DECIMAL_PRECISION),
            annualized_return: annualized.round_dp(DECIMAL_PRECISION),
            annualized_irr,
            regular_plan_irr,
            yearly_returns: yearly,
        })
    }

    /// Solver failures are per-metric: log and report the metric as absent.
    fn solve_metric(&self, symbol: &str, metric: &str, flows: &[CashFlow]) -> Option<Decimal> {
        match solve_irr_with(flows, &self.options.solver) {
            Ok(rate) => Some(rate.round_dp(DECIMAL_PRECISION)),
            Err(err) => {
                warn!("Instrument '{}': {} unavailable: {}", symbol, metric, err);
                None
            }
        }
    }
}

impl<R: HistoryRepositoryTrait> PerformanceServiceTrait for PerformanceService<R> {
    fn calculate_instrument(&self, symbol: &str) -> Result<InstrumentPerformance> {
        if let Some(hit) = self.cache.get(symbol) {
            return Ok(hit.clone());
        }
        let instrument = self.repository.get_instrument(symbol)?;
        let performance = self.calculate(&instrument)?;
        self.cache
            .entry(symbol.to_string())
            .or_insert_with(|| performance.clone());
        Ok(performance)
    }

    fn calculate_all(&self) -> Result<PerformanceReport> {
        let instruments = self.repository.list_instruments()?;

        let outcomes: Vec<(String, Result<InstrumentPerformance>)> = instruments
            .par_iter()
            .map(|instrument| {
                (
                    instrument.symbol.clone(),
                    self.calculate_instrument(&instrument.symbol),
                )
            })
            .collect();

        let mut report = PerformanceReport::default();
        for (symbol, outcome) in outcomes {
            match outcome {
                Ok(performance) => report.instruments.push(performance),
                Err(err) => {
                    warn!("Instrument '{}' dropped from report: {}", symbol, err);
                    report.failures.insert(symbol, err.to_string());
                }
            }
        }

        // Normalize yearly maps over the report span so pre-listing years
        // show up as absent entries rather than missing keys. The span is
        // either the configured override or the union of instrument spans.
        match self.options.report_span {
            Some((start, end)) => {
                report.period_start_date = Some(start);
                report.period_end_date = Some(end);
            }
            None => {
                report.period_start_date = report
                    .instruments
                    .iter()
                    .map(|performance| performance.period_start_date)
                    .min();
                report.period_end_date = report
                    .instruments
                    .iter()
                    .map(|performance| performance.period_end_date)
                    .max();
            }
        }
        if let (Some(start), Some(end)) = (report.period_start_date, report.period_end_date) {
            for performance in &mut report.instruments {
                for year in start.year()..=end.year() {
                    performance.yearly_returns.entry(year).or_insert(None);
                }
            }
        }

        Ok(report)
    }
}
