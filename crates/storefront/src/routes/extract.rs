//! Request body extractors shared by the handlers.

use axum::{
    Form, Json,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::AppError;

/// A flat form submitted as JSON, urlencoded or `multipart/form-data`.
///
/// The bundled frontend posts `FormData` (multipart); API clients usually
/// send JSON or urlencoded bodies. Multipart fields are read as text and
/// files are not supported.
pub struct FlexibleForm<T>(pub T);

fn bad_body(detail: impl std::fmt::Display) -> AppError {
    AppError::BadRequest(format!("Invalid request body: {detail}"))
}

impl<S, T> FromRequest<S> for FlexibleForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| bad_body(e.body_text()))?;
            return Ok(Self(value));
        }

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| bad_body(e.body_text()))?;

            let mut fields = Map::new();
            while let Some(field) = multipart.next_field().await.map_err(bad_body)? {
                let Some(name) = field.name().map(str::to_owned) else {
                    continue;
                };
                let text = field.text().await.map_err(bad_body)?;
                fields.insert(name, Value::String(text));
            }
            return serde_json::from_value(Value::Object(fields))
                .map(Self)
                .map_err(bad_body);
        }

        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|e| bad_body(e.body_text()))?;
        Ok(Self(value))
    }
}
