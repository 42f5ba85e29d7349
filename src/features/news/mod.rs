pub mod client;
pub mod dto;
mod helpers;

pub use client::NewsApiClient;
pub use dto::{Article, Outlet};
