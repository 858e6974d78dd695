//! Feed composition
//!
//! `FeedComposer` is the core of the service: given a viewer and pagination
//! parameters it picks one of four ranking modes, blends the mode's weighted
//! bucket queries into a page of posts, and annotates the page with the
//! viewer's engagement state.
//!
//! The composer is a pure function of its stores for the duration of one
//! call: it holds no mutable state and never writes. Bucket queries are
//! independently fault-isolated; a failing bucket degrades to empty instead
//! of failing the page (the profile lookup is the only mandatory read).

pub mod bucket;
pub mod enrich;
mod explorer;
mod following;
mod mode;
mod personalized;

pub use mode::{select_mode, FeedMode};

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::metrics;
use crate::models::{FeedResponse, MediaType, Post, RecommendationProfile};
use crate::stores::{ContentStore, PostQuery, ProfileStore, SocialGraphStore};

/// Parsed, validated inputs for one feed request.
#[derive(Debug, Clone)]
pub struct FeedRequest {
    pub user_id: Uuid,
    pub page: i64,
    pub page_size: i64,
    pub media_type: Option<MediaType>,
    pub following_only: Option<bool>,
}

pub struct FeedComposer {
    content: Arc<dyn ContentStore>,
    graph: Arc<dyn SocialGraphStore>,
    profiles: Arc<dyn ProfileStore>,
    home_country: String,
}

impl FeedComposer {
    pub fn new(
        content: Arc<dyn ContentStore>,
        graph: Arc<dyn SocialGraphStore>,
        profiles: Arc<dyn ProfileStore>,
        home_country: String,
    ) -> Self {
        Self {
            content,
            graph,
            profiles,
            home_country,
        }
    }

    /// Compose one feed page for the given request.
    pub async fn compose(&self, request: &FeedRequest) -> Result<FeedResponse> {
        let started = Instant::now();
        let now = Utc::now();

        // Mandatory path: a transport failure here is a hard error. A missing
        // row just means a brand-new account with default settings.
        let profile = self
            .profiles
            .recommendation_profile(request.user_id)
            .await?
            .unwrap_or_else(|| RecommendationProfile {
                user_id: request.user_id,
                ..Default::default()
            });

        let mode = select_mode(request.media_type, request.following_only, &profile, now);
        info!(
            user_id = %request.user_id,
            mode = mode.as_str(),
            page = request.page,
            page_size = request.page_size,
            "composing feed"
        );

        let (posts, total) = match mode {
            FeedMode::Explorer => {
                explorer::compose(
                    self.content.as_ref(),
                    &self.home_country,
                    request,
                    &profile,
                    now,
                )
                .await
            }
            FeedMode::Personalized => {
                personalized::compose(
                    self.content.as_ref(),
                    &self.home_country,
                    request,
                    &profile,
                )
                .await
            }
            FeedMode::FollowingOnly => {
                following::compose(self.content.as_ref(), self.graph.as_ref(), request, true)
                    .await?
            }
            FeedMode::Discovery => {
                following::compose(self.content.as_ref(), self.graph.as_ref(), request, false)
                    .await?
            }
        };

        let annotated = enrich::annotate(self.content.as_ref(), request.user_id, posts).await;

        metrics::FEED_REQUESTS_TOTAL
            .with_label_values(&[mode.as_str()])
            .inc();
        metrics::FEED_REQUEST_DURATION_SECONDS
            .with_label_values(&[mode.as_str()])
            .observe(started.elapsed().as_secs_f64());

        let total_pages = if request.page_size > 0 {
            (total + request.page_size - 1) / request.page_size
        } else {
            0
        };

        Ok(FeedResponse {
            posts: annotated,
            total,
            page: request.page,
            total_pages,
        })
    }
}

/// Run one bucket query, degrading a failure to an empty bucket. The page
/// must survive a flaky bucket; the failure is logged and counted instead.
pub(crate) async fn fetch_bucket(
    content: &dyn ContentStore,
    mode: FeedMode,
    bucket: &'static str,
    query: PostQuery,
) -> Vec<Post> {
    match content.find_posts(query).await {
        Ok(posts) => {
            metrics::FEED_BUCKET_FILL
                .with_label_values(&[mode.as_str(), bucket])
                .observe(posts.len() as f64);
            posts
        }
        Err(err) => {
            warn!(
                mode = mode.as_str(),
                bucket,
                error = %err,
                "bucket fetch failed, treating bucket as empty"
            );
            metrics::FEED_BUCKET_FAILURES_TOTAL
                .with_label_values(&[mode.as_str(), bucket])
                .inc();
            Vec::new()
        }
    }
}
