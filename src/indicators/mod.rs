// Technical indicators module

pub mod deviation;
pub mod moving_average;

pub use deviation::deviation_score;
pub use moving_average::calculate_sma;
