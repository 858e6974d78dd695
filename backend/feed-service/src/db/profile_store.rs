use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{RecommendationProfile, SavedLocation};
use crate::stores::{ProfileStore, StoreResult};

pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw profile row; `recommendation_locations` is a nullable jsonb column.
#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    recommendation_enabled: bool,
    recommendation_locations: Option<Json<Vec<SavedLocation>>>,
    recommendation_radius: Option<f64>,
    explorer_mode_enabled: bool,
    explorer_mode_expires_at: Option<DateTime<Utc>>,
    last_location_lat: Option<f64>,
    last_location_lng: Option<f64>,
}

impl From<ProfileRow> for RecommendationProfile {
    fn from(row: ProfileRow) -> Self {
        RecommendationProfile {
            user_id: row.id,
            recommendation_enabled: row.recommendation_enabled,
            recommendation_locations: row
                .recommendation_locations
                .map(|Json(locations)| locations)
                .unwrap_or_default(),
            recommendation_radius: row.recommendation_radius.unwrap_or(0.0),
            explorer_mode_enabled: row.explorer_mode_enabled,
            explorer_mode_expires_at: row.explorer_mode_expires_at,
            last_location_lat: row.last_location_lat,
            last_location_lng: row.last_location_lng,
        }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn recommendation_profile(
        &self,
        user_id: Uuid,
    ) -> StoreResult<Option<RecommendationProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, recommendation_enabled, recommendation_locations,
                   recommendation_radius, explorer_mode_enabled,
                   explorer_mode_expires_at, last_location_lat, last_location_lng
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RecommendationProfile::from))
    }
}
