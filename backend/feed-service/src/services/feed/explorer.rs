//! Explorer-mode composer
//!
//! Blends up to `page_size` public posts from the last week as 50% world
//! (country present and not the home country), 30% home country, 20% nearby
//! (10–50 km from the viewer's last known coordinates). Each bucket is
//! over-fetched, shuffled, truncated to its target, and the concatenation is
//! shuffled once more. Shuffles are seeded from `(viewer, page)` so flipping
//! back to a page replays the same blend.
//!
//! Fallback: when the blend comes back empty (sparse region), the world and
//! home buckets are re-fetched without the viewer-self exclusion; the nearby
//! selection from the first pass is kept.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;
use uuid::Uuid;

use super::bucket::{
    bucket_target, dedup_by_id, distance_meters, shuffle_seed, take_shuffled, BUCKET_OVERFETCH,
    EXPLORER_HOME_WEIGHT, EXPLORER_NEARBY_WEIGHT, EXPLORER_WORLD_WEIGHT, FRESHNESS_WINDOW_DAYS,
    GEO_CANDIDATE_LIMIT, NEARBY_MAX_METERS, NEARBY_MIN_METERS,
};
use super::{fetch_bucket, FeedMode, FeedRequest};
use crate::models::{Post, RecommendationProfile, Visibility};
use crate::stores::{ContentStore, CountryFilter, PostQuery};

pub(super) async fn compose(
    content: &dyn ContentStore,
    home_country: &str,
    request: &FeedRequest,
    profile: &RecommendationProfile,
    now: DateTime<Utc>,
) -> (Vec<Post>, i64) {
    let world_target = bucket_target(request.page_size, EXPLORER_WORLD_WEIGHT);
    let home_target = bucket_target(request.page_size, EXPLORER_HOME_WEIGHT);
    let nearby_target = bucket_target(request.page_size, EXPLORER_NEARBY_WEIGHT);

    let fresh_since = now - Duration::days(FRESHNESS_WINDOW_DAYS);
    let mut rng = StdRng::seed_from_u64(shuffle_seed(request.user_id, request.page));

    let world_query = geo_query(
        CountryFilter::IsNot(home_country.to_string()),
        Some(request.user_id),
        fresh_since,
        world_target * BUCKET_OVERFETCH,
    );
    let home_query = geo_query(
        CountryFilter::Is(home_country.to_string()),
        Some(request.user_id),
        fresh_since,
        home_target * BUCKET_OVERFETCH,
    );

    // The three buckets have no data dependency on each other.
    let (world, home, nearby) = tokio::join!(
        fetch_bucket(content, FeedMode::Explorer, "world", world_query),
        fetch_bucket(content, FeedMode::Explorer, "home", home_query),
        nearby_bucket(
            content,
            request.user_id,
            profile.known_coordinates(),
            nearby_target,
            fresh_since,
        ),
    );

    let nearby_selected = take_shuffled(nearby, nearby_target as usize, &mut rng);
    let mut blended = take_shuffled(world, world_target as usize, &mut rng);
    blended.extend(take_shuffled(home, home_target as usize, &mut rng));
    blended.extend(nearby_selected.clone());
    blended.shuffle(&mut rng);

    if blended.is_empty() {
        debug!(
            user_id = %request.user_id,
            "explorer blend empty, retrying without viewer-self exclusion"
        );
        let relaxed_world = geo_query(
            CountryFilter::IsNot(home_country.to_string()),
            None,
            fresh_since,
            world_target * BUCKET_OVERFETCH,
        );
        let relaxed_home = geo_query(
            CountryFilter::Is(home_country.to_string()),
            None,
            fresh_since,
            home_target * BUCKET_OVERFETCH,
        );
        let (world, home) = tokio::join!(
            fetch_bucket(content, FeedMode::Explorer, "world", relaxed_world),
            fetch_bucket(content, FeedMode::Explorer, "home", relaxed_home),
        );

        blended = take_shuffled(world, world_target as usize, &mut rng);
        blended.extend(take_shuffled(home, home_target as usize, &mut rng));
        blended.extend(nearby_selected);
        blended.shuffle(&mut rng);
    }

    // The nearby bucket carries no country clause, so a home-country post in
    // the distance band can satisfy two buckets at once.
    let blended = dedup_by_id(blended);
    let total = blended.len() as i64;
    (blended, total)
}

fn geo_query(
    country: CountryFilter,
    exclude_author: Option<Uuid>,
    fresh_since: DateTime<Utc>,
    limit: i64,
) -> PostQuery {
    PostQuery {
        country: Some(country),
        exclude_author,
        visibility: Some(Visibility::Public),
        created_after: Some(fresh_since),
        limit,
        ..Default::default()
    }
}

/// Fetch geo-tagged candidates and keep those inside the 10–50 km band.
/// Without viewer coordinates the bucket contributes nothing; the other
/// buckets' targets are not redistributed.
async fn nearby_bucket(
    content: &dyn ContentStore,
    viewer: Uuid,
    coordinates: Option<(f64, f64)>,
    target: i64,
    fresh_since: DateTime<Utc>,
) -> Vec<Post> {
    let Some((lat, lng)) = coordinates else {
        return Vec::new();
    };

    let query = PostQuery {
        geotagged_only: true,
        exclude_author: Some(viewer),
        visibility: Some(Visibility::Public),
        created_after: Some(fresh_since),
        limit: GEO_CANDIDATE_LIMIT,
        ..Default::default()
    };
    let candidates = fetch_bucket(content, FeedMode::Explorer, "nearby", query).await;

    candidates
        .into_iter()
        .filter(|post| match (post.latitude, post.longitude) {
            (Some(post_lat), Some(post_lng)) => {
                let distance = distance_meters(lat, lng, post_lat, post_lng);
                (NEARBY_MIN_METERS..=NEARBY_MAX_METERS).contains(&distance)
            }
            _ => false,
        })
        .take((target * BUCKET_OVERFETCH) as usize)
        .collect()
}
