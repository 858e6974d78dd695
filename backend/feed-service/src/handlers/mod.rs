pub mod feed;

pub use feed::{get_feed, get_suggested_locations, FeedHandlerState};
