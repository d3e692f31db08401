//! HTTP client for the hospital queue backend

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;

use mediqueue_common::{DoctorQueue, QueueStatusPayload};

use super::source::{FetchError, SnapshotSource};
use crate::config::ApiConfig;

const USER_AGENT: &str = concat!("mediqueue-tracker/", env!("CARGO_PKG_VERSION"));

/// Thin wrapper over `reqwest::Client` for the queue endpoints.
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Clone)]
pub struct QueueApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl QueueApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.bearer_token().map(str::to_string),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /queue/patient/{appointmentId}`
    pub async fn fetch_patient_queue(&self, appointment_id: &str) -> Result<QueueStatusPayload, FetchError> {
        self.get_json(&format!("/queue/patient/{}", urlencoding::encode(appointment_id)))
            .await
    }

    /// `GET /queue/doctor/{doctorId}`
    pub async fn fetch_doctor_queue(&self, doctor_id: &str) -> Result<DoctorQueue, FetchError> {
        self.get_json(&format!("/queue/doctor/{}", urlencoding::encode(doctor_id)))
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let mut request = self.client.get(&url).header(CONTENT_TYPE, "application/json");
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!("API request to {} failed: {}", url, e);
            FetchError::Transport(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(status.as_u16(), &body);
            tracing::warn!("API request to {} returned {}: {}", url, status, message);
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Pick the most useful message out of an error response body: the JSON
/// `message` or `error` field, else the raw text, else a generic line.
fn error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let field = value
            .get("message")
            .or_else(|| value.get("error"))
            .and_then(|v| v.as_str());
        if let Some(message) = field {
            return message.to_string();
        }
    }

    let text = body.trim();
    if !text.is_empty() {
        return text.to_string();
    }

    format!("Request failed with status {}", status)
}

#[async_trait]
impl SnapshotSource for QueueApiClient {
    async fn fetch_queue_status(&self, appointment_id: &str) -> Result<QueueStatusPayload, FetchError> {
        self.fetch_patient_queue(appointment_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::Path,
        http::{HeaderMap, StatusCode, header::AUTHORIZATION},
        routing::get,
    };
    use serde_json::json;

    async fn patient_queue(Path(id): Path<String>, headers: HeaderMap) -> (StatusCode, Json<serde_json::Value>) {
        let authorized = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "Bearer secret");
        if !authorized {
            return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" })));
        }
        if id != "appt 7" {
            return (StatusCode::NOT_FOUND, Json(json!({ "message": "Appointment not found" })));
        }
        (
            StatusCode::OK,
            Json(json!({
                "currentToken": "T042",
                "myToken": "T043",
                "patientsAhead": 1,
                "estimatedWaitTime": 15,
                "queue": [
                    { "token": "T042", "name": "Patient A", "status": "current" },
                    { "token": "T043", "name": "You", "status": "waiting" }
                ]
            })),
        )
    }

    async fn doctor_queue() -> &'static str {
        "not json"
    }

    async fn spawn_backend() -> String {
        let app = Router::new()
            .route("/api/queue/patient/{id}", get(patient_queue))
            .route("/api/queue/doctor/{id}", get(doctor_queue));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api/", addr)
    }

    fn client(base_url: String, token: Option<&str>) -> QueueApiClient {
        QueueApiClient::new(&ApiConfig {
            base_url,
            auth_token: token.map(str::to_string),
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(error_message(404, r#"{"message":"gone"}"#), "gone");
        assert_eq!(error_message(500, r#"{"error":"boom"}"#), "boom");
        assert_eq!(error_message(502, "Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(503, "  "), "Request failed with status 503");
    }

    #[tokio::test]
    async fn test_fetch_patient_queue() {
        let base_url = spawn_backend().await;
        let client = client(base_url, Some("secret"));
        assert!(!client.base_url().ends_with('/'));

        let payload = client.fetch_queue_status("appt 7").await.unwrap();
        assert_eq!(payload.my_token.as_deref(), Some("T043"));
        assert_eq!(payload.entries.map(|e| e.len()), Some(2));
    }

    #[tokio::test]
    async fn test_status_errors_carry_backend_message() {
        let base_url = spawn_backend().await;

        let err = client(base_url.clone(), Some("secret"))
            .fetch_queue_status("appt 8")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, ref message } if message == "Appointment not found"));

        let err = client(base_url, None).fetch_queue_status("appt 7").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 401, ref message } if message == "Unauthorized"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_decode_error() {
        let base_url = spawn_backend().await;
        let err = client(base_url, Some("secret"))
            .fetch_doctor_queue("d1")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(format!("http://{}/api", addr), None)
            .fetch_queue_status("appt 7")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
