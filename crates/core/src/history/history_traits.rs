//! Boundary trait for the price/dividend history store.

use super::{Instrument, PricePoint};
use crate::errors::Result;

/// Supplies loaded histories to the engine.
///
/// Implementations must return histories in ascending date order with no
/// duplicate dates; the engine re-validates and fails the instrument with
/// `Error::InvalidHistory` when the contract is broken.
pub trait HistoryRepositoryTrait: Send + Sync {
    /// Full price history for one instrument.
    fn get_history(&self, symbol: &str) -> Result<Vec<PricePoint>>;

    /// The instrument with its display name and history.
    fn get_instrument(&self, symbol: &str) -> Result<Instrument>;

    /// Every instrument tracked in this run, in report order.
    fn list_instruments(&self) -> Result<Vec<Instrument>>;
}
