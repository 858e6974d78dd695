//! Location suggestions
//!
//! Secondary heuristic next to the feed composer: likes are tracked per
//! location, and the locations a user interacted with most over the last
//! month are suggested as candidates for their saved recommendation
//! locations. Simple count ranking, no blending.

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::models::LocationInteractionCount;
use crate::stores::InteractionStore;

/// How far back interactions are counted.
const SUGGESTION_WINDOW_DAYS: i64 = 30;

/// How many locations a suggestion response carries.
const SUGGESTION_LIMIT: usize = 5;

pub struct LocationSuggestionService {
    interactions: Arc<dyn InteractionStore>,
}

impl LocationSuggestionService {
    pub fn new(interactions: Arc<dyn InteractionStore>) -> Self {
        Self { interactions }
    }

    /// Top locations by interaction count over the suggestion window.
    pub async fn suggest(&self, user_id: Uuid) -> Result<Vec<LocationInteractionCount>> {
        let since = Utc::now() - Duration::days(SUGGESTION_WINDOW_DAYS);
        let mut counts = self
            .interactions
            .recent_interaction_counts(user_id, since)
            .await?;

        counts.truncate(SUGGESTION_LIMIT);
        debug!(user_id = %user_id, suggestions = counts.len(), "location suggestions computed");
        Ok(counts)
    }
}
