pub mod cashflow_builder;
pub mod cashflow_model;

pub use cashflow_builder::*;
pub use cashflow_model::*;
