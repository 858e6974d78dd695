//! Feed mode selection
//!
//! Exactly one of four mutually exclusive modes applies to a request, in this
//! precedence order:
//!
//! 1. Explorer — the profile's time-boxed explorer toggle is currently active.
//!    It overrides every other signal, including `following_only`.
//! 2. Personalized — recommendations are enabled and at least one location is
//!    saved on the profile.
//! 3. Following-only — explicitly requested, or the request neither asks for
//!    a video-only feed nor supplies `following_only` at all (legacy client
//!    contract: non-video feeds default to following semantics).
//! 4. Discovery — everything else: all public content from all users.
//!
//! A Following-only request from a user who follows nobody degrades into
//! Discovery inside the composer, not here; the selector is a pure function
//! of the request and profile.

use chrono::{DateTime, Utc};

use crate::models::{MediaType, RecommendationProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMode {
    Explorer,
    Personalized,
    FollowingOnly,
    Discovery,
}

impl FeedMode {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedMode::Explorer => "explorer",
            FeedMode::Personalized => "personalized",
            FeedMode::FollowingOnly => "following",
            FeedMode::Discovery => "discovery",
        }
    }
}

pub fn select_mode(
    media_type: Option<MediaType>,
    following_only: Option<bool>,
    profile: &RecommendationProfile,
    now: DateTime<Utc>,
) -> FeedMode {
    if profile.explorer_mode_active(now) {
        return FeedMode::Explorer;
    }

    if profile.recommendation_enabled && !profile.recommendation_locations.is_empty() {
        return FeedMode::Personalized;
    }

    let explicit_following = following_only == Some(true);
    let implicit_following = media_type != Some(MediaType::Video) && following_only.is_none();
    if explicit_following || implicit_following {
        return FeedMode::FollowingOnly;
    }

    FeedMode::Discovery
}
