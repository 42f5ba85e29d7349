pub mod dto;
mod helpers;
pub mod selector;

pub use dto::Topic;
pub use selector::TopicSelector;
