pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod services;
pub mod stores;

pub use config::Config;
pub use error::{AppError, Result};

// Re-export feed composition components
pub use services::{FeedComposer, FeedMode, FeedRequest, LocationSuggestionService};
