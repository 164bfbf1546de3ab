//! HTTP wire types: success envelopes, failure responses, and the body extractor.

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Multipart, Request},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::aggregate::PlatformSummary;
use crate::thread::Message;

/// Text returned for every server-side failure.
pub const SERVER_ERROR: &str = "Something went wrong on the server, please try again later.";

/// `{ "success": true, ...body }`.
#[derive(Debug, Serialize)]
pub struct ApiOk<T> {
    pub success: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T> ApiOk<T> {
    pub fn new(body: T) -> Self {
        Self {
            success: true,
            body,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlatformsBody {
    pub platforms: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SummariesBody {
    pub data: Vec<PlatformSummary>,
}

#[derive(Debug, Serialize)]
pub struct ThreadBody {
    pub all_messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct QuestionsBody {
    pub questions: serde_json::Value,
}

/// `{ "success": false, "statusText": ... }`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    pub success: bool,
    pub status_text: String,
}

/// 500 with the JSON failure envelope.
#[derive(Debug)]
pub struct JsonFailure;

impl IntoResponse for JsonFailure {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiErrorBody {
                success: false,
                status_text: SERVER_ERROR.to_string(),
            }),
        )
            .into_response()
    }
}

/// Plain-text failure (used by the endpoints that answer in text).
#[derive(Debug)]
pub struct TextFailure(pub StatusCode, pub &'static str);

impl TextFailure {
    pub fn server_error() -> Self {
        Self(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR)
    }
}

impl IntoResponse for TextFailure {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// `{ message }` posted to `/addMessage`.
#[derive(Debug, Default, Deserialize)]
pub struct AddMessageParams {
    pub message: Option<String>,
}

/// Query of `/getMessages`.
#[derive(Debug, Default, Deserialize)]
pub struct MessagesQuery {
    pub platform: Option<String>,
}

/// Text returned when a request body cannot be decoded.
pub const BAD_BODY: &str = "Request body could not be read.";

/// Request body accepted as JSON, urlencoded form, or multipart form (text fields only).
/// Any body that fails to decode is rejected with a plain-text 400.
#[derive(Debug)]
pub struct FormOrJson<T>(pub T);

fn bad_body(reason: impl std::fmt::Display) -> TextFailure {
    log::debug!("rejecting request body: {}", reason);
    TextFailure(StatusCode::BAD_REQUEST, BAD_BODY)
}

#[async_trait]
impl<T, S> FromRequest<S> for FormOrJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = TextFailure;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        if content_type.starts_with("application/json") {
            let Json(v) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| bad_body(e.body_text()))?;
            Ok(Self(v))
        } else if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| bad_body(e.body_text()))?;
            let mut fields = serde_json::Map::new();
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| bad_body(e.body_text()))?
            {
                let Some(name) = field.name().map(str::to_string) else {
                    continue;
                };
                let text = field.text().await.map_err(|e| bad_body(e.body_text()))?;
                fields.insert(name, serde_json::Value::String(text));
            }
            serde_json::from_value(serde_json::Value::Object(fields))
                .map(Self)
                .map_err(bad_body)
        } else {
            let Form(v) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| bad_body(e.body_text()))?;
            Ok(Self(v))
        }
    }
}
