//! Feed enrichment
//!
//! Annotates a composed page with the viewer's engagement state: like
//! totals, whether the viewer liked each post, and comment totals. The three
//! batch reads are independent and degrade to zeros on failure; enrichment
//! never changes the page's ordering.

use std::collections::{HashMap, HashSet};
use tracing::warn;
use uuid::Uuid;

use crate::models::{FeedPost, Post};
use crate::stores::ContentStore;

pub async fn annotate(content: &dyn ContentStore, viewer: Uuid, posts: Vec<Post>) -> Vec<FeedPost> {
    if posts.is_empty() {
        return Vec::new();
    }

    let ids: Vec<Uuid> = posts.iter().map(|post| post.id).collect();

    let (likes, liked, comments) = tokio::join!(
        content.like_counts(&ids),
        content.liked_by_user(viewer, &ids),
        content.comment_counts(&ids),
    );

    let likes: HashMap<Uuid, i64> = likes.unwrap_or_else(|err| {
        warn!(error = %err, "like counts unavailable, serving zeros");
        HashMap::new()
    });
    let liked: HashSet<Uuid> = liked.unwrap_or_else(|err| {
        warn!(error = %err, "liked set unavailable, serving false");
        HashSet::new()
    });
    let comments: HashMap<Uuid, i64> = comments.unwrap_or_else(|err| {
        warn!(error = %err, "comment counts unavailable, serving zeros");
        HashMap::new()
    });

    posts
        .into_iter()
        .map(|post| {
            let likes_count = likes.get(&post.id).copied().unwrap_or(0);
            let comments_count = comments.get(&post.id).copied().unwrap_or(0);
            let is_liked = liked.contains(&post.id);
            FeedPost {
                post,
                likes_count,
                comments_count,
                is_liked,
            }
        })
        .collect()
}
