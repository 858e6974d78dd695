//! Collaborator store contracts
//!
//! The feed composer is a pure read path over four external stores. Each store
//! is a trait so composers can be exercised against mocks; the Postgres
//! implementations live in `db/`.
//!
//! Every [`PostQuery`] excludes stories (`expires_at IS NULL`) at the SQL
//! boundary: a post with a non-null expiry must never reach a durable feed,
//! so the filter is not optional and not client-side.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::models::{
    LocationInteractionCount, MediaType, Post, RecommendationProfile, Visibility,
};

/// Store-level failure. Composers decide per call site whether a failure is
/// fatal (mandatory path) or degrades a single bucket to empty.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("malformed row: {0}")]
    Malformed(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Country clause of a [`PostQuery`]. Both variants require a non-null
/// country column, so geography-less posts never match either side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryFilter {
    Is(String),
    IsNot(String),
}

/// Declarative post filter covering the query capabilities the composers
/// need: author sets, geography, visibility, media type, freshness, and
/// offset/limit pagination. Results are always newest-first.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    /// Restrict to posts authored by any of these users.
    pub authors: Option<Vec<Uuid>>,
    /// Drop posts authored by this user (viewer self-exclusion).
    pub exclude_author: Option<Uuid>,
    pub country: Option<CountryFilter>,
    /// Restrict to posts whose district is in this set.
    pub districts: Option<Vec<String>>,
    /// Drop posts whose district is in this set (city-bucket set exclusion).
    pub exclude_districts: Option<Vec<String>>,
    /// Restrict to posts whose city is in this set.
    pub cities: Option<Vec<String>>,
    pub visibility: Option<Visibility>,
    pub media_type: Option<MediaType>,
    /// Creation-time lower bound (freshness window).
    pub created_after: Option<DateTime<Utc>>,
    /// Require both latitude and longitude to be present.
    pub geotagged_only: bool,
    pub limit: i64,
    pub offset: i64,
}

impl PostQuery {
    pub fn with_limit(limit: i64) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch matching posts, newest-first. Used by the weighted buckets.
    async fn find_posts(&self, query: PostQuery) -> StoreResult<Vec<Post>>;

    /// Fetch one page of matching posts plus the exact total count. Used by
    /// the Following/Discovery path where pagination must be stable.
    async fn find_posts_page(&self, query: PostQuery) -> StoreResult<(Vec<Post>, i64)>;

    /// Like totals for the given posts. Missing entries mean zero.
    async fn like_counts(&self, post_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, i64>>;

    /// Which of the given posts the user has liked.
    async fn liked_by_user(&self, user_id: Uuid, post_ids: &[Uuid])
        -> StoreResult<HashSet<Uuid>>;

    /// Comment totals for the given posts. Missing entries mean zero.
    async fn comment_counts(&self, post_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, i64>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SocialGraphStore: Send + Sync {
    /// Users the given user follows. Does not include the user themselves.
    async fn following_of(&self, user_id: Uuid) -> StoreResult<Vec<Uuid>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Recommendation settings for a user. `None` when the profile row does
    /// not exist (new account); a transport failure is a hard error.
    async fn recommendation_profile(
        &self,
        user_id: Uuid,
    ) -> StoreResult<Option<RecommendationProfile>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Per-location interaction counts for a user since the given instant,
    /// ordered by count descending.
    async fn recent_interaction_counts(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<LocationInteractionCount>>;
}
