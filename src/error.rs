use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, warn};

#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("Invalid input: {0}")]
    Validation(String),

    /// `raw` keeps the provider's answer for the logs; callers only see `message`.
    #[error("Weather provider error: {message}")]
    Upstream { message: String, raw: Option<String> },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

impl ForecastError {
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
            raw: None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InsufficientData(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

// The request URL carries the provider key in its query string, so it never
// reaches the message.
impl From<reqwest::Error> for ForecastError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::upstream("request timed out")
        } else if e.is_connect() {
            Self::upstream("could not connect to the weather provider")
        } else {
            Self::upstream(e.without_url().to_string())
        }
    }
}

impl IntoResponse for ForecastError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            match &self {
                Self::Upstream { raw: Some(raw), .. } => error!("{} -> {}", self, raw),
                _ => error!("{}", self),
            }
        } else {
            warn!("{}", self);
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(
            ForecastError::Validation("bad date".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ForecastError::InsufficientData("empty".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn collaborator_errors_map_to_5xx() {
        assert!(ForecastError::upstream("down").status_code().is_server_error());
        assert!(ForecastError::Storage("down".into())
            .status_code()
            .is_server_error());
    }

    #[tokio::test]
    async fn transport_errors_drop_the_request_url() {
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:1/data/2.5/forecast?appid=SECRETKEY")
            .send()
            .await
            .unwrap_err();
        let message = ForecastError::from(err).to_string();
        assert!(!message.contains("SECRETKEY"));
        assert!(!message.contains("appid"));
    }

    #[test]
    fn upstream_message_hides_raw_body() {
        let err = ForecastError::Upstream {
            message: "missing forecast list".into(),
            raw: Some(r#"{"cod":401,"message":"Invalid API key"}"#.into()),
        };
        assert_eq!(
            err.to_string(),
            "Weather provider error: missing forecast list"
        );
    }
}
