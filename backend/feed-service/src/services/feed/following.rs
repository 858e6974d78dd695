//! Following / Discovery composer
//!
//! The conventional path: stable offset/limit pagination over a single
//! query. Following-only restricts to posts authored by the viewer's
//! following set plus the viewer themselves and shows every visibility
//! level; Discovery has no author restriction and shows public posts only.
//!
//! A viewer who follows nobody degrades transparently into Discovery rather
//! than receiving an empty page. That is an empty-state fallback, not an
//! error.

use tracing::info;

use super::FeedRequest;
use crate::error::Result;
use crate::models::{Post, Visibility};
use crate::stores::{ContentStore, PostQuery, SocialGraphStore};

pub(super) async fn compose(
    content: &dyn ContentStore,
    graph: &dyn SocialGraphStore,
    request: &FeedRequest,
    following_only: bool,
) -> Result<(Vec<Post>, i64)> {
    let mut authors = None;
    let mut restrict_to_public = !following_only;

    if following_only {
        let following = graph.following_of(request.user_id).await?;
        if following.is_empty() {
            info!(
                user_id = %request.user_id,
                "viewer follows nobody, degrading to discovery"
            );
            restrict_to_public = true;
        } else {
            // A user's own posts belong in their own feed.
            let mut ids = following;
            ids.push(request.user_id);
            authors = Some(ids);
        }
    }

    let offset = (request.page - 1) * request.page_size;
    let query = PostQuery {
        authors,
        visibility: restrict_to_public.then_some(Visibility::Public),
        media_type: request.media_type,
        limit: request.page_size,
        offset,
        ..Default::default()
    };

    let (posts, total) = content.find_posts_page(query).await?;
    Ok((posts, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaType;
    use crate::stores::{MockContentStore, MockSocialGraphStore};
    use chrono::Utc;
    use uuid::Uuid;

    fn post_by(author: Uuid) -> Post {
        Post {
            id: Uuid::new_v4(),
            user_id: author,
            caption: None,
            media_url: "https://cdn.example/p.jpg".into(),
            media_type: MediaType::Image,
            thumbnail_url: None,
            visibility: Visibility::Public,
            country: None,
            city: None,
            district: None,
            latitude: None,
            longitude: None,
            created_at: Utc::now(),
            expires_at: None,
        }
    }

    fn request(user_id: Uuid, page: i64) -> FeedRequest {
        FeedRequest {
            user_id,
            page,
            page_size: 10,
            media_type: None,
            following_only: Some(true),
        }
    }

    #[tokio::test]
    async fn test_following_query_includes_self_and_all_visibilities() {
        let viewer = Uuid::new_v4();
        let followee = Uuid::new_v4();

        let mut graph = MockSocialGraphStore::new();
        graph
            .expect_following_of()
            .returning(move |_| Ok(vec![followee]));

        let mut content = MockContentStore::new();
        content
            .expect_find_posts_page()
            .withf(move |q| {
                let authors = q.authors.as_ref().unwrap();
                authors.contains(&viewer)
                    && authors.contains(&followee)
                    && q.visibility.is_none()
            })
            .returning(move |_| Ok((vec![post_by(followee)], 1)));

        let (posts, total) = compose(&content, &graph, &request(viewer, 1), true)
            .await
            .unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_no_follows_degrades_to_public_discovery() {
        let viewer = Uuid::new_v4();

        let mut graph = MockSocialGraphStore::new();
        graph.expect_following_of().returning(|_| Ok(vec![]));

        let mut content = MockContentStore::new();
        content
            .expect_find_posts_page()
            .withf(|q| q.authors.is_none() && q.visibility == Some(Visibility::Public))
            .returning(|_| Ok((vec![post_by(Uuid::new_v4())], 42)));

        let (posts, total) = compose(&content, &graph, &request(viewer, 1), true)
            .await
            .unwrap();
        assert!(!posts.is_empty(), "degrade-to-discovery must fill the page");
        assert_eq!(total, 42);
    }

    #[tokio::test]
    async fn test_discovery_never_consults_the_graph() {
        let mut graph = MockSocialGraphStore::new();
        graph.expect_following_of().times(0);

        let mut content = MockContentStore::new();
        content
            .expect_find_posts_page()
            .withf(|q| q.authors.is_none() && q.visibility == Some(Visibility::Public))
            .returning(|_| Ok((vec![], 0)));

        let req = request(Uuid::new_v4(), 1);
        compose(&content, &graph, &req, false).await.unwrap();
    }

    #[tokio::test]
    async fn test_media_type_filter_and_offset_pagination() {
        let viewer = Uuid::new_v4();
        let mut graph = MockSocialGraphStore::new();
        graph.expect_following_of().returning(|_| Ok(vec![Uuid::new_v4()]));

        let mut content = MockContentStore::new();
        content
            .expect_find_posts_page()
            .withf(|q| q.media_type == Some(MediaType::Video) && q.offset == 20 && q.limit == 10)
            .returning(|_| Ok((vec![], 35)));

        let mut req = request(viewer, 3);
        req.media_type = Some(MediaType::Video);
        let (_, total) = compose(&content, &graph, &req, true).await.unwrap();
        assert_eq!(total, 35);
    }

    #[tokio::test]
    async fn test_graph_failure_is_propagated() {
        let mut graph = MockSocialGraphStore::new();
        graph
            .expect_following_of()
            .returning(|_| Err(sqlx::Error::PoolTimedOut.into()));

        let content = MockContentStore::new();
        let result = compose(&content, &graph, &request(Uuid::new_v4(), 1), true).await;
        assert!(result.is_err());
    }
}
