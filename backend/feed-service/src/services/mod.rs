pub mod feed;
pub mod location_suggestions;

pub use feed::{FeedComposer, FeedMode, FeedRequest};
pub use location_suggestions::LocationSuggestionService;
