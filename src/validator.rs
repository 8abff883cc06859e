use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use labsys_core::AppError;

fn format_errors(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().filter_map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .or_else(|| Some(format!("{} is invalid", field)))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// JSON body extractor that also runs `validator` rules. Every failure is
/// an `InvalidParams` error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let error_msg = rejection.body_text();

                if error_msg.contains("missing field") {
                    let field = error_msg
                        .split("missing field `")
                        .nth(1)
                        .and_then(|s| s.split('`').next())
                        .unwrap_or("unknown");
                    return AppError::invalid_params(anyhow!("{} is required", field));
                }

                if error_msg.contains("invalid type") {
                    return AppError::invalid_params(anyhow!("invalid field type in request"));
                }

                if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
                    return AppError::invalid_params(anyhow!(
                        "missing 'Content-Type: application/json' header"
                    ));
                }

                AppError::invalid_params(anyhow!("invalid request body"))
            })?;

        value
            .validate()
            .map_err(|errors| AppError::invalid_params(anyhow!("{}", format_errors(&errors))))?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{StatusCode, header};
    use labsys_core::ErrorCode;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct Named {
        #[validate(length(min = 1, message = "name must not be empty"))]
        name: String,
    }

    async fn extract(body: &str, content_type: Option<&str>) -> Result<Named, AppError> {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        ValidatedJson::<Named>::from_request(req, &())
            .await
            .map(|ValidatedJson(v)| v)
    }

    #[tokio::test]
    async fn test_accepts_valid_body() {
        let named = extract(r#"{"name":"x"}"#, Some("application/json"))
            .await
            .unwrap();
        assert_eq!(named.name, "x");
    }

    #[tokio::test]
    async fn test_failures_are_invalid_params() {
        let cases = [
            (r#"{}"#, Some("application/json"), "name is required"),
            (r#"{"name":5}"#, Some("application/json"), "invalid field type in request"),
            (r#"{"name":"x"}"#, None, "missing 'Content-Type: application/json' header"),
            (r#"{"name":""}"#, Some("application/json"), "name must not be empty"),
        ];

        for (body, content_type, message) in cases {
            let err = extract(body, content_type).await.unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(err.code, ErrorCode::InvalidParams, "{body}");
            assert_eq!(err.error.to_string(), message, "{body}");
        }
    }
}
