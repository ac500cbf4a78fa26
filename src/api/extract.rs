//! Body Extractors
//!
//! Request body wrappers that turn every rejection into a 400 with the usual
//! error body. JSON bodies are parsed whatever their content type; form
//! bodies may be URL-encoded or multipart.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header,
    Form,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::AppError;

/// JSON request body.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;

        serde_json::from_slice(&bytes).map(Self).map_err(|err| {
            AppError::InvalidRequest(format!("Failed to parse the request body as JSON: {}", err))
        })
    }
}

/// Form request body, URL-encoded or `multipart/form-data`.
///
/// Multipart fields are read as text; file parts are skipped and the first
/// value of a repeated field wins.
#[derive(Debug, Clone)]
pub struct ApiForm<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_multipart(&req) {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;
            return multipart_fields(multipart).await.map(Self);
        }

        match Form::<T>::from_request(req, state).await {
            Ok(Form(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::InvalidRequest(rejection.body_text())),
        }
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().starts_with("multipart/form-data"))
}

async fn multipart_fields<T: DeserializeOwned>(mut multipart: Multipart) -> Result<T, AppError> {
    let mut fields = Map::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::InvalidRequest(err.body_text()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if field.file_name().is_some() || fields.contains_key(&name) {
            continue;
        }
        let text = field
            .text()
            .await
            .map_err(|err| AppError::InvalidRequest(err.body_text()))?;
        fields.insert(name, Value::String(text));
    }

    serde_json::from_value(Value::Object(fields))
        .map_err(|err| AppError::InvalidRequest(format!("Failed to deserialize form: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        name: String,
    }

    fn request(content_type: &str, body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_json_ok() {
        let ApiJson(sample) =
            ApiJson::<Sample>::from_request(request("application/json", r#"{"name":"a"}"#), &())
                .await
                .unwrap();
        assert_eq!(sample.name, "a");
    }

    #[tokio::test]
    async fn test_json_syntax_error_is_invalid_request() {
        let result =
            ApiJson::<Sample>::from_request(request("application/json", r#"{"name""#), &()).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_json_ignores_content_type() {
        let ApiJson(sample) =
            ApiJson::<Sample>::from_request(request("text/plain", r#"{"name":"c"}"#), &())
                .await
                .unwrap();
        assert_eq!(sample.name, "c");

        let bare = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(r#"{"name":"d"}"#))
            .unwrap();
        let ApiJson(sample) = ApiJson::<Sample>::from_request(bare, &()).await.unwrap();
        assert_eq!(sample.name, "d");
    }

    #[tokio::test]
    async fn test_json_missing_field_is_invalid_request() {
        let result = ApiJson::<Sample>::from_request(request("application/json", "{}"), &()).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_form_ok() {
        let ApiForm(sample) = ApiForm::<Sample>::from_request(
            request("application/x-www-form-urlencoded", "name=b"),
            &(),
        )
        .await
        .unwrap();
        assert_eq!(sample.name, "b");
    }

    #[tokio::test]
    async fn test_form_multipart() {
        let body = "--XYZ\r\n\
                    Content-Disposition: form-data; name=\"upload\"; filename=\"a.bin\"\r\n\r\n\
                    ignored\r\n\
                    --XYZ\r\n\
                    Content-Disposition: form-data; name=\"name\"\r\n\r\n\
                    first\r\n\
                    --XYZ\r\n\
                    Content-Disposition: form-data; name=\"name\"\r\n\r\n\
                    second\r\n\
                    --XYZ--\r\n";

        let ApiForm(sample) =
            ApiForm::<Sample>::from_request(request("multipart/form-data; boundary=XYZ", body), &())
                .await
                .unwrap();
        assert_eq!(sample.name, "first");
    }

    #[tokio::test]
    async fn test_form_multipart_missing_field() {
        let body = "--XYZ\r\n\
                    Content-Disposition: form-data; name=\"other\"\r\n\r\n\
                    x\r\n\
                    --XYZ--\r\n";

        let result =
            ApiForm::<Sample>::from_request(request("multipart/form-data; boundary=XYZ", body), &())
                .await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }
}
