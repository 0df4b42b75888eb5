//! ReturnLab Core - Return analytics over instrument price histories.
//!
//! This crate computes calendar-year returns, cumulative total return,
//! lump-sum IRR, and regular-saving-plan IRR from in-memory price/dividend
//! histories. It is storage- and presentation-agnostic: histories arrive
//! through the `HistoryRepositoryTrait` boundary and results leave as
//! serializable report models.

pub mod cashflow;
pub mod constants;
pub mod errors;
pub mod history;
pub mod performance;
pub mod solver;
pub mod utils;

// Re-export common types from the history and performance modules
pub use history::*;
pub use performance::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
