pub mod dto;
mod helpers;
pub mod prompt;
pub mod service;

pub use dto::ComparisonResult;
pub use helpers::{comparison_output_schema, single_outlet_output_schema};
pub use service::{ComparisonService, TextGenerator};
