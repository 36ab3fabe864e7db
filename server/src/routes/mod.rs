use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::config::{apply_security_headers, create_cors_layer, SecurityHeaders};
use crate::handlers::{create_event, get_event, hello, list_events};
use crate::state::AppState;

pub fn create_routes(state: AppState, security: SecurityHeaders) -> Router {
    let router = Router::new()
        .route("/", get(hello))
        .route("/events", get(list_events).post(create_event))
        .route("/events/:id", get(get_event))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    apply_security_headers(router, security).layer(create_cors_layer())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EventSettings;
    use crate::db::open_in_memory;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app_with(settings: EventSettings) -> Router {
        let pool = open_in_memory().await.unwrap();
        create_routes(AppState::new(pool, settings), SecurityHeaders::new(false))
    }

    async fn app() -> Router {
        app_with(EventSettings::default()).await
    }

    fn post_json(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/events")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn sample_event() -> Value {
        json!({
            "name": "Product launch",
            "date": "2024-03-15T10:30:00",
            "languages": ["en", "es", "pt"],
            "VideoQuality": ["720p", "1080p"],
            "AudioQuality": ["mid"],
            "invitees": ["ada@example.com", "grace@example.com"],
            "description": "Live stream"
        })
    }

    async fn create(app: &Router, event: Value) -> i64 {
        let response = app.clone().oneshot(post_json(event.to_string())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_hello() {
        let response = app().await.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
    }

    #[tokio::test]
    async fn test_create_echoes_event_with_id() {
        let app = app().await;
        let response = app.oneshot(post_json(sample_event().to_string())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert!(body["id"].as_i64().unwrap() > 0);
        assert_eq!(body["name"], "Product launch");
        assert_eq!(body["VideoQuality"], json!(["720p", "1080p"]));
        assert_eq!(body["AudioQuality"], json!(["mid"]));
        assert_eq!(body["invitees"].as_array().unwrap().len(), 2);
        assert_eq!(body["description"], "Live stream");
    }

    #[tokio::test]
    async fn test_quality_negotiation_end_to_end() {
        let app = app().await;
        let id = create(&app, sample_event()).await;

        let response = app
            .clone()
            .oneshot(get(&format!("/events/{}?videoQuality=1080p", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["videoQuality"], "1080p");
        assert_eq!(body["audioQuality"], "mid");
        assert_eq!(body["language"].as_array().unwrap().len(), 3);
        assert!(body.get("invitees").is_none());

        let response = app
            .clone()
            .oneshot(get(&format!("/events/{}?videoQuality=4k&audioQuality=", id)))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["videoQuality"], "720p");
        assert_eq!(body["audioQuality"], "mid");
    }

    #[tokio::test]
    async fn test_repeated_quality_parameter_uses_first_value() {
        let app = app().await;
        let id = create(&app, sample_event()).await;

        let response = app
            .oneshot(get(&format!(
                "/events/{}?videoQuality=1080p&videoQuality=720p",
                id
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["videoQuality"], "1080p");
    }

    #[tokio::test]
    async fn test_configured_defaults_are_served() {
        let settings = EventSettings {
            default_video_quality: "360p".into(),
            ..EventSettings::default()
        };
        let app = app_with(settings).await;
        let id = create(&app, sample_event()).await;

        let response = app.oneshot(get(&format!("/events/{}", id))).await.unwrap();
        let body = json_body(response).await;
        assert_eq!(body["videoQuality"], "360p");
    }

    #[tokio::test]
    async fn test_unknown_event_is_not_found() {
        let response = app().await.oneshot(get("/events/999")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_bad_request() {
        let response = app().await.oneshot(get("/events/abc")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "INVALID_ID");
        assert_eq!(body["error"]["message"], "invalid event id");
    }

    #[tokio::test]
    async fn test_list_events() {
        let app = app().await;
        let response = app.clone().oneshot(get("/events")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!([]));

        create(&app, sample_event()).await;
        create(&app, sample_event()).await;

        let response = app.oneshot(get("/events")).await.unwrap();
        let body = json_body(response).await;
        let events = body.as_array().unwrap();
        assert_eq!(events.len(), 2);
        for event in events {
            assert_eq!(event["videoQuality"].as_array().unwrap().len(), 2);
            assert_eq!(event["audioQuality"], json!(["mid"]));
            assert!(event.get("invitees").is_none());
        }
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let mut event = sample_event();
        event.as_object_mut().unwrap().remove("invitees");

        let response = app().await.oneshot(post_json(event.to_string())).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(
            body["error"]["details"]["cause"],
            "missing required field: invitees"
        );
    }

    #[tokio::test]
    async fn test_bad_date_is_bad_request() {
        let mut event = sample_event();
        event["date"] = json!("next tuesday");

        let response = app().await.oneshot(post_json(event.to_string())).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invitee_limit_is_enforced() {
        let settings = EventSettings {
            max_invitees: 1,
            ..EventSettings::default()
        };
        let response = app_with(settings)
            .await
            .oneshot(post_json(sample_event().to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_email_is_reported() {
        let mut event = sample_event();
        event["invitees"] = json!(["ada@example.com", "not-an-email"]);

        let response = app().await.oneshot(post_json(event.to_string())).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(
            body["error"]["details"]["cause"],
            "invalid email address: not-an-email"
        );
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let response = app()
            .await
            .oneshot(post_json("{\"name\": ".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }
}
