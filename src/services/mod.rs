pub mod catalog_filter;
pub mod prompt;
pub mod providers;
pub mod recommendations;

pub use catalog_filter::filter_catalog;
pub use providers::{GeminiClient, ModelClient};
pub use recommendations::{Recommender, RECOMMENDATION_LIMIT};
