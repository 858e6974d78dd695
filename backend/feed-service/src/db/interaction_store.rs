use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::LocationInteractionCount;
use crate::stores::{InteractionStore, StoreResult};

pub struct PgInteractionStore {
    pool: PgPool,
}

impl PgInteractionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InteractionStore for PgInteractionStore {
    async fn recent_interaction_counts(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<LocationInteractionCount>> {
        let counts = sqlx::query_as::<_, LocationInteractionCount>(
            r#"
            SELECT location_country AS country,
                   location_city AS city,
                   location_district AS district,
                   COUNT(*) AS interactions
            FROM location_interactions
            WHERE user_id = $1 AND created_at >= $2
            GROUP BY location_country, location_city, location_district
            ORDER BY interactions DESC
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }
}
