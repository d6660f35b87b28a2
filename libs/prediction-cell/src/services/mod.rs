pub mod catalog;
pub mod prediction;

pub use prediction::PredictionService;
