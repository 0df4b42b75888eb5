pub mod history_model;
pub mod history_repository;
pub mod history_traits;

pub use history_model::*;
pub use history_repository::*;
pub use history_traits::*;
