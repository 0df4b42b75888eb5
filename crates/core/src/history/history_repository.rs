//! In-memory history store for embedding callers and tests.

use super::{HistoryRepositoryTrait, Instrument, PricePoint};
use crate::errors::{Error, Result, ValidationError};

/// A `HistoryRepositoryTrait` backed by instruments loaded up front.
///
/// Keeps insertion order so reports list instruments the way the caller
/// loaded them. Symbols are unique within a run.
#[derive(Debug, Default)]
pub struct InMemoryHistoryRepository {
    instruments: Vec<Instrument>,
}

impl InMemoryHistoryRepository {
    pub fn new(instruments: Vec<Instrument>) -> Result<Self> {
        let mut repository = Self::default();
        for instrument in instruments {
            repository.insert(instrument)?;
        }
        Ok(repository)
    }

    pub fn insert(&mut self, instrument: Instrument) -> Result<()> {
        if self
            .instruments
            .iter()
            .any(|existing| existing.symbol == instrument.symbol)
        {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "duplicate symbol '{}'",
                instrument.symbol
            ))));
        }
        self.instruments.push(instrument);
        Ok(())
    }
}

impl HistoryRepositoryTrait for InMemoryHistoryRepository {
    fn get_history(&self, symbol: &str) -> Result<Vec<PricePoint>> {
        self.get_instrument(symbol)
            .map(|instrument| instrument.history)
    }

    fn get_instrument(&self, symbol: &str) -> Result<Instrument> {
        self.instruments
            .iter()
            .find(|instrument| instrument.symbol == symbol)
            .cloned()
            .ok_or_else(|| Error::Repository(format!("Instrument {} not found", symbol)))
    }

    fn list_instruments(&self) -> Result<Vec<Instrument>> {
        Ok(self.instruments.clone())
    }
}
