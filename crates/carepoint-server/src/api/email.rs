use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use carepoint_mail::{EmailMessage, EmailRequest};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiError, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SendEmailResponse {
    success: bool,
    message: &'static str,
    message_id: Option<String>,
}

pub(super) async fn send_email(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    let Json(request) = payload.map_err(|_| ApiError::bad_request("Missing required fields"))?;

    let message =
        EmailMessage::from_request(&request).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let Some(client) = state.mail.as_ref() else {
        tracing::error!(request_id = %req_id.0, "SENDGRID_API_KEY is not configured");
        return Err(ApiError::internal("Email service is not configured"));
    };

    let receipt = client.send(&message).await.map_err(|e| {
        tracing::error!(request_id = %req_id.0, error = %e, "email send failed");
        ApiError::internal(e.to_string())
    })?;

    Ok(Json(SendEmailResponse {
        success: true,
        message: "Email sent successfully",
        message_id: receipt.message_id,
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use carepoint_mail::SendGridClient;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::api::test_support::{app, empty_state, post_json, send};

    const SEND: &str = "/api/v1/email/send";

    fn mail_state(base_url: &str) -> crate::api::AppState {
        let mut state = empty_state();
        state.mail = Some(
            SendGridClient::with_base_url(
                "sg-key",
                "noreply@example.org",
                5,
                "carepoint-test",
                base_url,
            )
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
                .uri(SEND)
                .body(Body::empty())
                .expect("request"),
        )
        .await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json["error"], "Only POST allowed");
    }

    #[tokio::test]
    async fn missing_fields_are_400() {
        let (status, json) = send(
            app(empty_state()),
            post_json(SEND, &serde_json::json!({ "to": "a@example.org" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, serde_json::json!({ "error": "Missing required fields" }));
    }

    #[tokio::test]
    async fn unconfigured_mail_is_500() {
        let (status, json) = send(
            app(empty_state()),
            post_json(
                SEND,
                &serde_json::json!({ "to": "a@example.org", "subject": "Hi", "message": "Body" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn sends_and_echoes_message_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/mail/send"))
            .and(body_partial_json(serde_json::json!({
                "subject": "Weekly check-in",
                "attachments": [{ "content": "QUJD", "filename": "notes.txt" }]
            })))
            .respond_with(ResponseTemplate::new(202).insert_header("x-message-id", "abc-123"))
            .expect(1)
            .mount(&server)
            .await;

        let (status, json) = send(
            app(mail_state(&server.uri())),
            post_json(
                SEND,
                &serde_json::json!({
                    "to": "friend@example.org",
                    "subject": "Weekly check-in",
                    "message": "Hello",
                    "attachmentBase64": "data:text/plain;base64,QUJD",
                    "attachmentName": "notes.txt"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "message": "Email sent successfully",
                "messageId": "abc-123"
            })
        );
        server.verify().await;
    }

    #[tokio::test]
    async fn upstream_rejection_is_500() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/mail/send"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad sender"))
            .mount(&server)
            .await;

        let (status, json) = send(
            app(mail_state(&server.uri())),
            post_json(
                SEND,
                &serde_json::json!({ "to": "a@example.org", "subject": "Hi", "message": "Body" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap_or_default().contains("400"));
    }
}
