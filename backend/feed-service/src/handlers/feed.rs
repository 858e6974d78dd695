use actix_web::{get, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::MediaType;
use crate::services::{FeedComposer, FeedRequest, LocationSuggestionService};

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 50;

/// Raw query parameters. Everything arrives as strings and is coerced
/// leniently: non-numeric paging falls back to defaults instead of being
/// rejected, matching the endpoint's historical behavior.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQueryParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub media_type: Option<String>,
    pub following_only: Option<String>,
}

impl FeedQueryParams {
    fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(DEFAULT_PAGE)
    }

    fn page_size(&self) -> i64 {
        self.limit
            .as_deref()
            .and_then(|raw| raw.parse::<i64>().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    fn media_type(&self) -> Option<MediaType> {
        match self.media_type.as_deref() {
            Some("image") => Some(MediaType::Image),
            Some("video") => Some(MediaType::Video),
            _ => None,
        }
    }

    /// `None` when the flag was not supplied at all; the mode selector
    /// distinguishes "absent" from an explicit opt-out.
    fn following_only(&self) -> Option<bool> {
        self.following_only.as_deref().map(|raw| raw == "true")
    }
}

pub struct FeedHandlerState {
    pub composer: FeedComposer,
    pub suggestions: LocationSuggestionService,
}

/// The viewer's identity is asserted by the API gateway and forwarded as a
/// header; this service performs no session verification of its own.
fn viewer_id(request: &HttpRequest) -> Result<Uuid> {
    request
        .headers()
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .ok_or_else(|| AppError::Unauthorized("Missing user context".into()))
}

#[get("/feed")]
pub async fn get_feed(
    query: web::Query<FeedQueryParams>,
    http_req: HttpRequest,
    state: web::Data<FeedHandlerState>,
) -> Result<HttpResponse> {
    let user_id = viewer_id(&http_req)?;

    let request = FeedRequest {
        user_id,
        page: query.page(),
        page_size: query.page_size(),
        media_type: query.media_type(),
        following_only: query.following_only(),
    };

    debug!(
        user_id = %user_id,
        page = request.page,
        page_size = request.page_size,
        media_type = ?request.media_type,
        following_only = ?request.following_only,
        "feed request received"
    );

    let response = state.composer.compose(&request).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/feed/locations/suggested")]
pub async fn get_suggested_locations(
    http_req: HttpRequest,
    state: web::Data<FeedHandlerState>,
) -> Result<HttpResponse> {
    let user_id = viewer_id(&http_req)?;
    let locations = state.suggestions.suggest(user_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "locations": locations })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paging_defaults_on_garbage_input() {
        let params = FeedQueryParams {
            page: Some("banana".into()),
            limit: Some("-3".into()),
            ..Default::default()
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 1); // -3 parses, then clamps to 1

        let params = FeedQueryParams {
            page: Some("0".into()),
            limit: Some("oops".into()),
            ..Default::default()
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_page_size_is_capped() {
        let params = FeedQueryParams {
            limit: Some("5000".into()),
            ..Default::default()
        };
        assert_eq!(params.page_size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_media_type_parsing_is_lenient() {
        let params = FeedQueryParams {
            media_type: Some("video".into()),
            ..Default::default()
        };
        assert_eq!(params.media_type(), Some(MediaType::Video));

        let params = FeedQueryParams {
            media_type: Some("gif".into()),
            ..Default::default()
        };
        assert_eq!(params.media_type(), None);
    }

    #[test]
    fn test_following_only_distinguishes_absent_from_false() {
        let absent = FeedQueryParams::default();
        assert_eq!(absent.following_only(), None);

        let explicit_true = FeedQueryParams {
            following_only: Some("true".into()),
            ..Default::default()
        };
        assert_eq!(explicit_true.following_only(), Some(true));

        let explicit_false = FeedQueryParams {
            following_only: Some("false".into()),
            ..Default::default()
        };
        assert_eq!(explicit_false.following_only(), Some(false));
    }
}
