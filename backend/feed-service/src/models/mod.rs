use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Media attached to a post. Stored as the `media_type` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "media_type", rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

/// Who may see a post. Stored as the `post_visibility` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "post_visibility", rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Friends,
    Private,
}

/// A post row as read from the content store.
///
/// A non-null `expires_at` marks the row as a story; stories never appear in
/// durable feeds, so every feed query filters them out at the SQL boundary.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub caption: Option<String>,
    pub media_url: String,
    pub media_type: MediaType,
    pub thumbnail_url: Option<String>,
    pub visibility: Visibility,
    pub country: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// One saved location in a user's recommendation settings.
/// Stored as jsonb on the profile row; up to three entries, first is primary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedLocation {
    pub country: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
}

/// Per-user feed settings read from the profile store.
#[derive(Debug, Clone, Default)]
pub struct RecommendationProfile {
    pub user_id: Uuid,
    pub recommendation_enabled: bool,
    pub recommendation_locations: Vec<SavedLocation>,
    /// Radius in meters; 0 means unlimited.
    pub recommendation_radius: f64,
    pub explorer_mode_enabled: bool,
    pub explorer_mode_expires_at: Option<DateTime<Utc>>,
    pub last_location_lat: Option<f64>,
    pub last_location_lng: Option<f64>,
}

impl RecommendationProfile {
    /// Explorer mode is active only while the stored expiry is in the future.
    /// An enabled flag with a null or past expiry counts as inactive (lazy
    /// expiry: nothing resets the flag in the database).
    pub fn explorer_mode_active(&self, now: DateTime<Utc>) -> bool {
        self.explorer_mode_enabled
            && self
                .explorer_mode_expires_at
                .map(|expires| expires > now)
                .unwrap_or(false)
    }

    pub fn saved_districts(&self) -> Vec<String> {
        self.recommendation_locations
            .iter()
            .filter_map(|loc| loc.district.clone())
            .collect()
    }

    pub fn saved_cities(&self) -> Vec<String> {
        self.recommendation_locations
            .iter()
            .filter_map(|loc| loc.city.clone())
            .collect()
    }

    pub fn known_coordinates(&self) -> Option<(f64, f64)> {
        match (self.last_location_lat, self.last_location_lng) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

/// A post annotated with the per-viewer engagement fields the mobile client
/// renders. Produced by the enrichment pass, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPost {
    #[serde(flatten)]
    pub post: Post,
    pub likes_count: i64,
    pub comments_count: i64,
    pub is_liked: bool,
}

/// Feed response wire format (matches the mobile client's expectations).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub posts: Vec<FeedPost>,
    pub total: i64,
    pub page: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

/// Aggregated interaction counts for one location, used by the
/// location-suggestion heuristic.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LocationInteractionCount {
    pub country: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub interactions: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_explorer_mode_requires_future_expiry() {
        let now = Utc::now();
        let mut profile = RecommendationProfile {
            explorer_mode_enabled: true,
            explorer_mode_expires_at: Some(now + Duration::minutes(10)),
            ..Default::default()
        };
        assert!(profile.explorer_mode_active(now));

        profile.explorer_mode_expires_at = Some(now - Duration::minutes(10));
        assert!(!profile.explorer_mode_active(now));

        profile.explorer_mode_expires_at = None;
        assert!(!profile.explorer_mode_active(now));
    }

    #[test]
    fn test_explorer_mode_disabled_flag_wins() {
        let now = Utc::now();
        let profile = RecommendationProfile {
            explorer_mode_enabled: false,
            explorer_mode_expires_at: Some(now + Duration::hours(1)),
            ..Default::default()
        };
        assert!(!profile.explorer_mode_active(now));
    }

    #[test]
    fn test_saved_districts_skips_missing_values() {
        let profile = RecommendationProfile {
            recommendation_locations: vec![
                SavedLocation {
                    country: Some("Moldova".into()),
                    city: Some("Chișinău".into()),
                    district: Some("Botanica".into()),
                },
                SavedLocation {
                    country: Some("Moldova".into()),
                    city: Some("Bălți".into()),
                    district: None,
                },
            ],
            ..Default::default()
        };

        assert_eq!(profile.saved_districts(), vec!["Botanica".to_string()]);
        assert_eq!(
            profile.saved_cities(),
            vec!["Chișinău".to_string(), "Bălți".to_string()]
        );
    }

    #[test]
    fn test_known_coordinates_requires_both_axes() {
        let mut profile = RecommendationProfile {
            last_location_lat: Some(47.0),
            last_location_lng: None,
            ..Default::default()
        };
        assert_eq!(profile.known_coordinates(), None);

        profile.last_location_lng = Some(28.8);
        assert_eq!(profile.known_coordinates(), Some((47.0, 28.8)));
    }
}
