pub mod performance_model;
pub mod performance_service;
pub mod returns_calculator;

#[cfg(test)]
mod performance_service_tests;

pub use performance_model::*;
pub use performance_service::*;
pub use returns_calculator::*;
