use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// A single observation in an instrument's price history.
///
/// `adjusted_close` carries adjusted-close semantics: dividends and splits
/// are already folded in, so simple price ratios reflect total return.
/// `dividend` is the cash distribution ex on this date (zero for most days).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub date: NaiveDate,
    pub adjusted_close: Decimal,
    #[serde(default)]
    pub dividend: Decimal,
}

impl PricePoint {
    pub fn new(date: NaiveDate, adjusted_close: Decimal) -> Self {
        Self {
            date,
            adjusted_close,
            dividend: Decimal::ZERO,
        }
    }

    pub fn with_dividend(date: NaiveDate, adjusted_close: Decimal, dividend: Decimal) -> Self {
        Self {
            date,
            adjusted_close,
            dividend,
        }
    }
}

/// A tracked security or index with its full loaded history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub symbol: String,
    pub display_name: String,
    pub history: Vec<PricePoint>,
}

impl Instrument {
    pub fn new(
        symbol: impl Into<String>,
        display_name: impl Into<String>,
        history: Vec<PricePoint>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            display_name: display_name.into(),
            history,
        }
    }
}

/// A quote as published by the exchange, before dividend adjustment.
///
/// `dividend` is the cash amount per share ex on this date and must be
/// stated on the same share basis as `close`: when a split occurred after
/// the ex-date, the caller divides the recorded dividend by the split
/// factor before loading it here. No split records are carried.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuote {
    pub date: NaiveDate,
    pub close: Decimal,
    #[serde(default)]
    pub dividend: Decimal,
}

/// Checks the store contract for a loaded history: non-empty, strictly
/// ascending dates (no duplicates), positive prices, non-negative dividends.
pub fn validate_history(history: &[PricePoint]) -> Result<()> {
    if history.is_empty() {
        return Err(Error::InvalidHistory("history is empty".to_string()));
    }

    for point in history {
        if point.adjusted_close <= Decimal::ZERO {
            return Err(Error::InvalidHistory(format!(
                "non-positive adjusted close {} on {}",
                point.adjusted_close, point.date
            )));
        }
        if point.dividend < Decimal::ZERO {
            return Err(Error::InvalidHistory(format!(
                "negative dividend {} on {}",
                point.dividend, point.date
            )));
        }
    }

    for window in history.windows(2) {
        if window[1].date <= window[0].date {
            return Err(Error::InvalidHistory(format!(
                "dates not strictly ascending: {} followed by {}",
                window[0].date, window[1].date
            )));
        }
    }

    Ok(())
}

/// Builds adjusted closes from raw closes and dividends.
///
/// Policy: reinvest-at-ex-date. Every close strictly before an ex-date is
/// scaled by `1 - dividend / last_close_before_ex`, so the ratio between any
/// two adjusted closes reflects total return across the distribution.
pub fn adjust_close_series(quotes: &[RawQuote]) -> Result<Vec<PricePoint>> {
    for window in quotes.windows(2) {
        if window[1].date <= window[0].date {
            return Err(Error::InvalidHistory(format!(
                "quote dates not strictly ascending: {} followed by {}",
                window[0].date, window[1].date
            )));
        }
    }
    for quote in quotes {
        if quote.close <= Decimal::ZERO {
            return Err(Error::InvalidHistory(format!(
                "non-positive close {} on {}",
                quote.close, quote.date
            )));
        }
    }

    let mut ratios = vec![Decimal::ONE; quotes.len()];
    for (idx, quote) in quotes.iter().enumerate() {
        if quote.dividend <= Decimal::ZERO {
            continue;
        }
        // No close precedes the first ex-date; nothing to scale.
        if idx == 0 {
            continue;
        }
        let prior_close = quotes[idx - 1].close;
        let factor = Decimal::ONE - quote.dividend / prior_close;
        if factor <= Decimal::ZERO {
            return Err(Error::InvalidHistory(format!(
                "dividend {} on {} is not below the prior close {}",
                quote.dividend, quote.date, prior_close
            )));
        }
        for ratio in ratios.iter_mut().take(idx) {
            *ratio *= factor;
        }
    }

    Ok(quotes
        .iter()
        .zip(ratios)
        .map(|(quote, ratio)| PricePoint::with_dividend(quote.date, quote.close * ratio, quote.dividend))
        .collect())
}

/// Rebuilds a history by compounding each daily return times `multiplier`,
/// producing a synthetic leveraged series (e.g. a 2x daily-reset variant).
pub fn apply_daily_return_multiplier(
    history: &[PricePoint],
    multiplier: Decimal,
) -> Result<Vec<PricePoint>> {
    if multiplier <= Decimal::ZERO {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "daily return multiplier must be positive, got {}",
            multiplier
        ))));
    }
    validate_history(history)?;

    let mut result = Vec::with_capacity(history.len());
    // Dividends are already folded into the source adjusted closes, so the
    // synthetic series carries none of its own.
    result.push(PricePoint::new(history[0].date, history[0].adjusted_close));

    for window in history.windows(2) {
        let day_return = (window[1].adjusted_close - window[0].adjusted_close)
            / window[0].adjusted_close;
        let prev: &PricePoint = result.last().ok_or_else(|| {
            Error::Unexpected("leveraged series lost its seed point".to_string())
        })?;
        let close = prev.adjusted_close * (Decimal::ONE + day_return * multiplier);
        if close <= Decimal::ZERO {
            return Err(Error::InvalidHistory(format!(
                "multiplier {} drives the price non-positive on {}",
                multiplier, window[1].date
            )));
        }
        result.push(PricePoint::new(window[1].date, close));
    }

    Ok(result)
}
