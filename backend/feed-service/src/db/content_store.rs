use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::models::Post;
use crate::stores::{ContentStore, CountryFilter, PostQuery, StoreResult};

const POST_COLUMNS: &str = "id, user_id, caption, media_url, media_type, thumbnail_url, \
     visibility, country, city, district, latitude, longitude, created_at, expires_at";

pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Append the WHERE clauses a [`PostQuery`] describes.
///
/// The base statement already carries `WHERE expires_at IS NULL`; stories are
/// excluded from every feed query without exception.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &PostQuery) {
    if let Some(authors) = &query.authors {
        builder.push(" AND user_id = ANY(");
        builder.push_bind(authors.clone());
        builder.push(")");
    }
    if let Some(author) = query.exclude_author {
        builder.push(" AND user_id <> ");
        builder.push_bind(author);
    }
    match &query.country {
        Some(CountryFilter::Is(country)) => {
            builder.push(" AND country = ");
            builder.push_bind(country.clone());
        }
        Some(CountryFilter::IsNot(country)) => {
            builder.push(" AND country IS NOT NULL AND country <> ");
            builder.push_bind(country.clone());
        }
        None => {}
    }
    if let Some(districts) = &query.districts {
        builder.push(" AND district = ANY(");
        builder.push_bind(districts.clone());
        builder.push(")");
    }
    if let Some(excluded) = &query.exclude_districts {
        if !excluded.is_empty() {
            builder.push(" AND (district IS NULL OR district <> ALL(");
            builder.push_bind(excluded.clone());
            builder.push("))");
        }
    }
    if let Some(cities) = &query.cities {
        builder.push(" AND city = ANY(");
        builder.push_bind(cities.clone());
        builder.push(")");
    }
    if let Some(visibility) = query.visibility {
        builder.push(" AND visibility = ");
        builder.push_bind(visibility);
    }
    if let Some(media_type) = query.media_type {
        builder.push(" AND media_type = ");
        builder.push_bind(media_type);
    }
    if let Some(created_after) = query.created_after {
        builder.push(" AND created_at >= ");
        builder.push_bind(created_after);
    }
    if query.geotagged_only {
        builder.push(" AND latitude IS NOT NULL AND longitude IS NOT NULL");
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn find_posts(&self, query: PostQuery) -> StoreResult<Vec<Post>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE expires_at IS NULL"
        ));
        push_filters(&mut builder, &query);
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(query.limit);
        builder.push(" OFFSET ");
        builder.push_bind(query.offset);

        let posts = builder
            .build_query_as::<Post>()
            .fetch_all(&self.pool)
            .await?;
        Ok(posts)
    }

    async fn find_posts_page(&self, query: PostQuery) -> StoreResult<(Vec<Post>, i64)> {
        let mut count_builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts WHERE expires_at IS NULL");
        push_filters(&mut count_builder, &query);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let posts = self.find_posts(query).await?;
        Ok((posts, total))
    }

    async fn like_counts(&self, post_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, i64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query(
            r#"
            SELECT post_id, COUNT(*) AS likes
            FROM likes
            WHERE post_id = ANY($1)
            GROUP BY post_id
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get::<Uuid, _>("post_id"), row.get::<i64, _>("likes")))
            .collect())
    }

    async fn liked_by_user(
        &self,
        user_id: Uuid,
        post_ids: &[Uuid],
    ) -> StoreResult<HashSet<Uuid>> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let rows = sqlx::query(
            r#"
            SELECT post_id
            FROM likes
            WHERE user_id = $1 AND post_id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.get::<Uuid, _>("post_id"))
            .collect())
    }

    async fn comment_counts(&self, post_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, i64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query(
            r#"
            SELECT post_id, COUNT(*) AS comments
            FROM comments
            WHERE post_id = ANY($1)
            GROUP BY post_id
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get::<Uuid, _>("post_id"), row.get::<i64, _>("comments")))
            .collect())
    }
}
