pub mod comparison;
pub mod generation;
pub mod news;
pub mod pipeline;
pub mod topics;
pub mod utilities;
