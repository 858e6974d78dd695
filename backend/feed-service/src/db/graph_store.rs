use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::stores::{SocialGraphStore, StoreResult};

pub struct PgSocialGraphStore {
    pool: PgPool,
}

impl PgSocialGraphStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SocialGraphStore for PgSocialGraphStore {
    async fn following_of(&self, user_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let rows = sqlx::query_as::<_, (Uuid,)>(
            r#"
            SELECT following_id
            FROM follows
            WHERE follower_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
