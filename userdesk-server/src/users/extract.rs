//! Request body extractors that report failures through [`AppError`].

use axum::{
    Json,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use userdesk_core::domain::users::FieldErrors;

use crate::errors::AppError;

/// JSON body whose rejections use the API error envelope.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// Raw field map of an update request.
///
/// Accepts a JSON object or a `multipart/form-data` form. Form parts arrive
/// as strings, so an unset image input shows up as `profile_image=""`.
#[derive(Debug)]
pub struct UpdateInput(pub Map<String, Value>);

impl<S> FromRequest<S> for UpdateInput
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        if is_multipart(&req) {
            let multipart = Multipart::from_request(req, state).await?;
            return read_form(multipart).await.map(UpdateInput);
        }

        match Json::<Value>::from_request(req, state).await? {
            Json(Value::Object(input)) => Ok(UpdateInput(input)),
            Json(_) => Err(AppError::bad_request("Expected a JSON object")),
        }
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

async fn read_form(
    mut multipart: Multipart,
) -> Result<Map<String, Value>, AppError> {
    let mut input = Map::new();
    let mut errors = FieldErrors::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        // Browsers send an empty file part with a blank filename when nothing
        // was picked.
        let has_file = field.file_name().is_some_and(|file| !file.is_empty());

        if has_file {
            field.bytes().await?;
            errors.push(name, "File uploads are not supported; send a URL.");
            continue;
        }
        input.insert(name, Value::String(field.text().await?));
    }

    if errors.is_empty() {
        Ok(input)
    } else {
        Err(AppError::validation(&errors))
    }
}
