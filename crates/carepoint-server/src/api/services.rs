use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use carepoint_places::{Bounds, PlacesError, SearchLocation, SearchRequest, ServiceRecord};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SearchBody {
    #[serde(default)]
    keyword: Option<String>,
    #[serde(default)]
    user_lat: Option<f64>,
    #[serde(default)]
    user_lng: Option<f64>,
    #[serde(default)]
    radius: Option<f64>,
    #[serde(default)]
    bounds: Option<Bounds>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SearchResponse {
    success: bool,
    services: Vec<ServiceRecord>,
    count: usize,
    search_location: SearchLocation,
    search_radius: u32,
    bounds: Option<Bounds>,
}

pub(super) async fn search_services(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<SearchBody>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(body) = payload.map_err(|e| {
        tracing::debug!(request_id = %req_id.0, error = %e, "rejected search body");
        ApiError::bad_request("Invalid JSON body")
    })?;

    let request = SearchRequest::new(
        body.keyword.as_deref(),
        body.user_lat,
        body.user_lng,
        body.radius,
        body.bounds,
    )
    .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let Some(client) = state.places.as_ref() else {
        tracing::error!(request_id = %req_id.0, "GOOGLE_MAPS_API_KEY is not configured");
        return Err(ApiError::internal("Google Maps API key is not configured"));
    };

    let outcome = carepoint_places::search_services(client, &request)
        .await
        .map_err(|e| map_places_error(&req_id.0, &e))?;

    Ok(Json(SearchResponse {
        success: true,
        count: outcome.services.len(),
        services: outcome.services,
        search_location: outcome.search_location,
        search_radius: outcome.search_radius,
        bounds: outcome.bounds,
    }))
}

fn map_places_error(request_id: &str, error: &PlacesError) -> ApiError {
    if error.is_client_error() {
        return ApiError::bad_request(error.to_string());
    }
    tracing::error!(request_id, error = %error, "service search failed");
    ApiError::internal(error.to_string())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use carepoint_places::PlacesClient;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::api::test_support::{app, empty_state, post_json, send};

    const SEARCH: &str = "/api/v1/services/search";

    fn places_state(base_url: &str) -> crate::api::AppState {
        let mut state = empty_state();
        state.places = Some(
            PlacesClient::with_base_url("test-key", 5, "carepoint-test", base_url)
                .expect("client"),
        );
        state
    }

    #[tokio::test]
    async fn other_methods_get_405() {
        let (status, json) = send(
            app(empty_state()),
            Request::builder()
                .method("GET")
                .uri(SEARCH)
                .body(Body::empty())
                .expect("request"),
        )
        .await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json, serde_json::json!({ "error": "Only POST allowed" }));
    }

    #[tokio::test]
    async fn missing_keyword_is_400() {
        let (status, json) = send(
            app(empty_state()),
            post_json(SEARCH, &serde_json::json!({ "userLat": -33.8, "userLng": 151.2 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, serde_json::json!({ "error": "Keyword is required" }));
    }

    #[tokio::test]
    async fn missing_location_is_400() {
        let (status, json) = send(
            app(empty_state()),
            post_json(SEARCH, &serde_json::json!({ "keyword": "anxiety" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json,
            serde_json::json!({ "error": "Valid user coordinates or bounds are required" })
        );
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let (status, json) = send(
            app(empty_state()),
            Request::builder()
                .method("POST")
                .uri(SEARCH)
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .expect("request"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid JSON body");
    }

    #[tokio::test]
    async fn missing_api_key_is_500() {
        let (status, json) = send(
            app(empty_state()),
            post_json(
                SEARCH,
                &serde_json::json!({ "keyword": "anxiety", "userLat": -33.8, "userLng": 151.2 }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["success"], false);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn successful_search_returns_ranked_services() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/maps/api/place/textsearch/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "OK",
                "results": [
                    {
                        "place_id": "p1",
                        "name": "City Psychologist Clinic",
                        "types": ["health"],
                        "geometry": { "location": { "lat": -33.87, "lng": 151.21 } },
                        "formatted_address": "1 George St, Sydney NSW 2000",
                        "rating": 4.8
                    }
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/maps/api/place/nearbysearch/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "status": "ZERO_RESULTS" })),
            )
            .mount(&server)
            .await;

        let (status, json) = send(
            app(places_state(&server.uri())),
            post_json(
                SEARCH,
                &serde_json::json!({
                    "keyword": "anxiety",
                    "userLat": -33.8688,
                    "userLng": 151.2093,
                    "radius": 5000
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 1);
        assert_eq!(json["searchRadius"], 5000);
        assert!(json["bounds"].is_null());
        assert_eq!(json["searchLocation"]["lat"], -33.8688);
        let service = &json["services"][0];
        assert_eq!(service["id"], "p1");
        assert_eq!(service["type"], "counseling");
        assert_eq!(service["category"], "Counseling & Psychology");
        assert_eq!(service["rating"], 4.8);
        assert!(service["distanceKm"].is_number());
    }

    #[tokio::test]
    async fn all_upstream_failures_are_an_empty_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (status, json) = send(
            app(places_state(&server.uri())),
            post_json(
                SEARCH,
                &serde_json::json!({ "keyword": "anxiety", "userLat": -33.8, "userLng": 151.2 }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["services"], serde_json::json!([]));
        assert_eq!(json["count"], 0);
    }

    #[tokio::test]
    async fn unknown_address_is_400() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/maps/api/geocode/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "status": "ZERO_RESULTS", "results": [] })),
            )
            .mount(&server)
            .await;

        let (status, json) = send(
            app(places_state(&server.uri())),
            post_json(
                SEARCH,
                &serde_json::json!({
                    "keyword": "123 Example Street NSW 2000",
                    "userLat": -33.8,
                    "userLng": 151.2
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json["error"],
            "Could not find the address: 123 Example Street NSW 2000"
        );
    }
}
