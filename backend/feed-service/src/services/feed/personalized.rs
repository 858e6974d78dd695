//! Personalized-mode composer
//!
//! Blends 60% district, 20% city, 10% home country, 10% world around the
//! viewer's saved locations. Buckets keep the store's newest-first order and
//! are concatenated district → city → home → world; there is no final
//! reshuffle, so calling twice against an unchanged store yields the same
//! page.
//!
//! Double-counting guards:
//! - the city bucket excludes posts whose district is already saved,
//! - the home-country bucket drops posts already selected by the district
//!   and city buckets (and over-fetches 3× to compensate),
//! - the concatenation is deduplicated by post id as a final guard.

use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

use super::bucket::{
    bucket_target, dedup_by_id, distance_meters, take_newest, BUCKET_OVERFETCH,
    HOME_BUCKET_OVERFETCH, PERSONALIZED_CITY_WEIGHT, PERSONALIZED_DISTRICT_WEIGHT,
    PERSONALIZED_HOME_WEIGHT, PERSONALIZED_WORLD_WEIGHT,
};
use super::{fetch_bucket, FeedMode, FeedRequest};
use crate::models::{Post, RecommendationProfile, Visibility};
use crate::stores::{ContentStore, CountryFilter, PostQuery};

pub(super) async fn compose(
    content: &dyn ContentStore,
    home_country: &str,
    request: &FeedRequest,
    profile: &RecommendationProfile,
) -> (Vec<Post>, i64) {
    let district_target = bucket_target(request.page_size, PERSONALIZED_DISTRICT_WEIGHT);
    let city_target = bucket_target(request.page_size, PERSONALIZED_CITY_WEIGHT);
    let home_target = bucket_target(request.page_size, PERSONALIZED_HOME_WEIGHT);
    let world_target = bucket_target(request.page_size, PERSONALIZED_WORLD_WEIGHT);

    let districts = profile.saved_districts();
    let cities = profile.saved_cities();

    let district_bucket = async {
        if districts.is_empty() {
            return Vec::new();
        }
        let query = PostQuery {
            districts: Some(districts.clone()),
            visibility: Some(Visibility::Public),
            limit: district_target * BUCKET_OVERFETCH,
            ..Default::default()
        };
        let posts = fetch_bucket(content, FeedMode::Personalized, "district", query).await;
        apply_radius_filter(posts, profile)
    };

    let city_bucket = async {
        if cities.is_empty() {
            return Vec::new();
        }
        let query = PostQuery {
            cities: Some(cities.clone()),
            exclude_districts: Some(districts.clone()),
            visibility: Some(Visibility::Public),
            limit: city_target * BUCKET_OVERFETCH,
            ..Default::default()
        };
        fetch_bucket(content, FeedMode::Personalized, "city", query).await
    };

    let home_bucket = fetch_bucket(
        content,
        FeedMode::Personalized,
        "home",
        PostQuery {
            country: Some(CountryFilter::Is(home_country.to_string())),
            visibility: Some(Visibility::Public),
            limit: home_target * HOME_BUCKET_OVERFETCH,
            ..Default::default()
        },
    );

    let world_bucket = fetch_bucket(
        content,
        FeedMode::Personalized,
        "world",
        PostQuery {
            country: Some(CountryFilter::IsNot(home_country.to_string())),
            visibility: Some(Visibility::Public),
            limit: world_target * BUCKET_OVERFETCH,
            ..Default::default()
        },
    );

    // Four independent read queries; issue them together.
    let (district_posts, city_posts, home_posts, world_posts) =
        tokio::join!(district_bucket, city_bucket, home_bucket, world_bucket);

    let selected_districts = take_newest(district_posts, district_target as usize);
    let selected_cities = take_newest(city_posts, city_target as usize);

    // Anything already picked by the district/city buckets must not be
    // re-counted by the home-country bucket.
    let shown: HashSet<Uuid> = selected_districts
        .iter()
        .chain(selected_cities.iter())
        .map(|post| post.id)
        .collect();
    let filtered_home: Vec<Post> = home_posts
        .into_iter()
        .filter(|post| !shown.contains(&post.id))
        .collect();
    let selected_home = take_newest(filtered_home, home_target as usize);
    let selected_world = take_newest(world_posts, world_target as usize);

    debug!(
        districts = selected_districts.len(),
        cities = selected_cities.len(),
        home = selected_home.len(),
        world = selected_world.len(),
        "personalized buckets selected"
    );

    // Bucket order is the display order.
    let mut blended = selected_districts;
    blended.extend(selected_cities);
    blended.extend(selected_home);
    blended.extend(selected_world);

    let blended = dedup_by_id(blended);
    let total = blended.len() as i64;
    (blended, total)
}

/// Drop district-bucket posts outside the viewer's recommendation radius.
/// Posts without coordinates are kept: radius filtering is permissive on
/// missing data, and it only applies when the viewer's own location is known.
fn apply_radius_filter(posts: Vec<Post>, profile: &RecommendationProfile) -> Vec<Post> {
    if profile.recommendation_radius <= 0.0 {
        return posts;
    }
    let Some((lat, lng)) = profile.known_coordinates() else {
        return posts;
    };

    posts
        .into_iter()
        .filter(|post| match (post.latitude, post.longitude) {
            (Some(post_lat), Some(post_lng)) => {
                distance_meters(lat, lng, post_lat, post_lng) <= profile.recommendation_radius
            }
            _ => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MediaType, SavedLocation};
    use crate::stores::MockContentStore;
    use chrono::{Duration, Utc};

    fn located_post(district: Option<&str>, city: Option<&str>, country: &str) -> Post {
        Post {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            caption: None,
            media_url: "https://cdn.example/p.jpg".into(),
            media_type: MediaType::Image,
            thumbnail_url: None,
            visibility: Visibility::Public,
            country: Some(country.to_string()),
            city: city.map(str::to_string),
            district: district.map(str::to_string),
            latitude: None,
            longitude: None,
            created_at: Utc::now(),
            expires_at: None,
        }
    }

    fn botanica_profile() -> RecommendationProfile {
        RecommendationProfile {
            recommendation_enabled: true,
            recommendation_locations: vec![SavedLocation {
                country: Some("Moldova".into()),
                city: Some("Chișinău".into()),
                district: Some("Botanica".into()),
            }],
            ..Default::default()
        }
    }

    fn request(page_size: i64) -> FeedRequest {
        FeedRequest {
            user_id: Uuid::new_v4(),
            page: 1,
            page_size,
            media_type: None,
            following_only: None,
        }
    }

    fn full_store() -> MockContentStore {
        let mut content = MockContentStore::new();
        content
            .expect_find_posts()
            .returning(|q| {
                let n = q.limit as usize;
                if q.districts.is_some() {
                    Ok((0..n)
                        .map(|_| located_post(Some("Botanica"), Some("Chișinău"), "Moldova"))
                        .collect())
                } else if q.cities.is_some() {
                    Ok((0..n)
                        .map(|_| located_post(Some("Centru"), Some("Chișinău"), "Moldova"))
                        .collect())
                } else if matches!(q.country, Some(CountryFilter::Is(_))) {
                    Ok((0..n)
                        .map(|_| located_post(None, None, "Moldova"))
                        .collect())
                } else {
                    Ok((0..n)
                        .map(|_| located_post(None, None, "Romania"))
                        .collect())
                }
            });
        content
    }

    #[tokio::test]
    async fn test_bucket_targets_and_display_order() {
        let content = full_store();
        let profile = botanica_profile();
        let (posts, total) = compose(&content, "Moldova", &request(10), &profile).await;

        // 6 district + 2 city + 1 home + 1 world, in that fixed order.
        assert_eq!(total, 10);
        assert!(posts[..6]
            .iter()
            .all(|p| p.district.as_deref() == Some("Botanica")));
        assert!(posts[6..8]
            .iter()
            .all(|p| p.district.as_deref() == Some("Centru")));
        assert_eq!(posts[8].country.as_deref(), Some("Moldova"));
        assert!(posts[8].district.is_none());
        assert_eq!(posts[9].country.as_deref(), Some("Romania"));
    }

    #[tokio::test]
    async fn test_city_bucket_excludes_saved_districts() {
        let content = full_store();
        let profile = botanica_profile();
        let (posts, _) = compose(&content, "Moldova", &request(10), &profile).await;

        // Store-level exclusion is exercised through the query; the composer
        // must also never place a saved-district post in the city slots.
        let saved = profile.saved_districts();
        for post in &posts[6..8] {
            assert!(!saved.iter().any(|d| Some(d.as_str()) == post.district.as_deref()));
        }
    }

    #[tokio::test]
    async fn test_home_bucket_drops_already_selected_posts() {
        let shared = located_post(Some("Botanica"), Some("Chișinău"), "Moldova");
        let shared_id = shared.id;
        let fresh_home = located_post(None, None, "Moldova");
        let fresh_home_id = fresh_home.id;

        let district_rows = vec![shared.clone()];
        let home_rows = vec![shared, fresh_home];

        let mut content = MockContentStore::new();
        content
            .expect_find_posts()
            .returning(move |q| {
                if q.districts.is_some() {
                    Ok(district_rows.clone())
                } else if q.cities.is_some() {
                    Ok(vec![])
                } else if matches!(q.country, Some(CountryFilter::Is(_))) {
                    Ok(home_rows.clone())
                } else {
                    Ok(vec![])
                }
            });

        let profile = botanica_profile();
        let (posts, _) = compose(&content, "Moldova", &request(10), &profile).await;

        let shared_count = posts.iter().filter(|p| p.id == shared_id).count();
        assert_eq!(shared_count, 1, "district selection wins, home copy dropped");
        assert!(posts.iter().any(|p| p.id == fresh_home_id));
    }

    #[tokio::test]
    async fn test_ordering_is_stable_across_calls() {
        // Fixed rows, newest-first per bucket; two identical calls must
        // produce identical pages (no shuffling in personalized mode).
        let now = Utc::now();
        let mut district_rows = Vec::new();
        for i in 0..12 {
            let mut p = located_post(Some("Botanica"), Some("Chișinău"), "Moldova");
            p.created_at = now - Duration::minutes(i);
            district_rows.push(p);
        }

        let make_mock = |rows: Vec<Post>| {
            let mut content = MockContentStore::new();
            content.expect_find_posts().returning(move |q| {
                if q.districts.is_some() {
                    Ok(rows.clone())
                } else {
                    Ok(vec![])
                }
            });
            content
        };

        let profile = botanica_profile();
        let req = request(10);
        let (a, _) = compose(&make_mock(district_rows.clone()), "Moldova", &req, &profile).await;
        let (b, _) = compose(&make_mock(district_rows), "Moldova", &req, &profile).await;

        let ids_a: Vec<Uuid> = a.iter().map(|p| p.id).collect();
        let ids_b: Vec<Uuid> = b.iter().map(|p| p.id).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[tokio::test]
    async fn test_radius_filter_keeps_posts_without_coordinates() {
        let mut near = located_post(Some("Botanica"), Some("Chișinău"), "Moldova");
        near.latitude = Some(47.02);
        near.longitude = Some(28.86);
        let mut far = located_post(Some("Botanica"), Some("Chișinău"), "Moldova");
        far.latitude = Some(48.5);
        far.longitude = Some(27.0);
        let no_coords = located_post(Some("Botanica"), Some("Chișinău"), "Moldova");

        let profile = RecommendationProfile {
            recommendation_radius: 5_000.0,
            last_location_lat: Some(47.0105),
            last_location_lng: Some(28.8638),
            ..botanica_profile()
        };

        let far_id = far.id;
        let filtered = apply_radius_filter(vec![near, far, no_coords], &profile);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|p| p.id != far_id));
    }

    #[tokio::test]
    async fn test_failed_district_bucket_still_serves_other_buckets() {
        let mut content = MockContentStore::new();
        content
            .expect_find_posts()
            .returning(|q| {
                if q.districts.is_some() {
                    Err(sqlx::Error::PoolTimedOut.into())
                } else if q.cities.is_some() {
                    Ok(vec![located_post(Some("Centru"), Some("Chișinău"), "Moldova")])
                } else if matches!(q.country, Some(CountryFilter::Is(_))) {
                    Ok(vec![located_post(None, None, "Moldova")])
                } else {
                    Ok(vec![located_post(None, None, "Romania")])
                }
            });

        let profile = botanica_profile();
        let (posts, total) = compose(&content, "Moldova", &request(10), &profile).await;

        assert_eq!(total, 3);
        assert_eq!(posts.len(), 3);
    }
}
