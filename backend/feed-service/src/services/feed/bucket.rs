//! Weighted-bucket primitives shared by the Explorer and Personalized
//! composers: target sizing, over-fetch ratios, uniform shuffling, identifier
//! deduplication, and the Haversine distance used by the geo buckets.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

use crate::models::Post;

/// Explorer-mode blend: 50% world, 30% home country, 20% nearby.
pub const EXPLORER_WORLD_WEIGHT: f64 = 0.5;
pub const EXPLORER_HOME_WEIGHT: f64 = 0.3;
pub const EXPLORER_NEARBY_WEIGHT: f64 = 0.2;

/// Personalized blend: 60% district, 20% city, 10% home country, 10% world.
pub const PERSONALIZED_DISTRICT_WEIGHT: f64 = 0.6;
pub const PERSONALIZED_CITY_WEIGHT: f64 = 0.2;
pub const PERSONALIZED_HOME_WEIGHT: f64 = 0.1;
pub const PERSONALIZED_WORLD_WEIGHT: f64 = 0.1;

/// Buckets over-fetch so shuffling and post-hoc exclusion still fill the
/// target. The personalized home-country bucket over-fetches more because it
/// additionally drops posts already selected by the district/city buckets.
pub const BUCKET_OVERFETCH: i64 = 2;
pub const HOME_BUCKET_OVERFETCH: i64 = 3;

/// Nearby band for Explorer mode: 10 km to 50 km from the viewer.
pub const NEARBY_MIN_METERS: f64 = 10_000.0;
pub const NEARBY_MAX_METERS: f64 = 50_000.0;

/// Cap on geo-tagged candidates fetched for client-side distance filtering.
pub const GEO_CANDIDATE_LIMIT: i64 = 100;

/// Explorer buckets only consider posts from the last week.
pub const FRESHNESS_WINDOW_DAYS: i64 = 7;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Number of posts a bucket contributes to a page of `page_size`.
pub fn bucket_target(page_size: i64, weight: f64) -> i64 {
    (page_size as f64 * weight).ceil() as i64
}

/// Uniformly shuffle a bucket and keep at most `target` posts.
pub fn take_shuffled<R: Rng>(mut posts: Vec<Post>, target: usize, rng: &mut R) -> Vec<Post> {
    posts.shuffle(rng);
    posts.truncate(target);
    posts
}

/// Keep at most `target` posts, preserving the store's newest-first order.
pub fn take_newest(mut posts: Vec<Post>, target: usize) -> Vec<Post> {
    posts.truncate(target);
    posts
}

/// Drop repeated post identifiers, keeping the first occurrence. The same
/// post can satisfy more than one weighted bucket.
pub fn dedup_by_id(posts: Vec<Post>) -> Vec<Post> {
    let mut seen: HashSet<Uuid> = HashSet::with_capacity(posts.len());
    posts
        .into_iter()
        .filter(|post| seen.insert(post.id))
        .collect()
}

/// Great-circle distance in meters between two coordinates (Haversine).
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_METERS * c
}

/// Stable shuffle seed so flipping back and forth between pages replays the
/// same Explorer blend for the same viewer.
pub fn shuffle_seed(user_id: Uuid, page: i64) -> u64 {
    let mut hasher = DefaultHasher::new();
    user_id.hash(&mut hasher);
    page.hash(&mut hasher);
    hasher.finish()
}
