//! Custom Axum extractors

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::{Form, Json};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use roster_core::schema::CommonStudentsQuery;

use super::error::ApiError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// JSON or url-encoded form body
///
/// Rejections are split into "malformed" (cannot be parsed) and "wrong
/// shape" (parsed, but not the expected fields and types).
pub struct ValidBody<T>(pub T);

impl<S, T> FromRequest<S> for ValidBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| ApiError::Malformed {
                    reason: e.body_text(),
                })?;

            return serde_json::from_value(form_object(pairs))
                .map(Self)
                .map_err(|e| ApiError::Shape {
                    reason: e.to_string(),
                });
        }

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            // valid JSON, wrong types: let validation own the answer
            Err(JsonRejection::JsonDataError(e)) => Err(ApiError::Shape {
                reason: e.body_text(),
            }),
            Err(rejection) => Err(ApiError::Malformed {
                reason: rejection.body_text(),
            }),
        }
    }
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with(FORM_CONTENT_TYPE))
}

/// Fold form pairs into a JSON object.
///
/// `key[]` / `key[n]` and repeated keys collect into arrays; a key seen once
/// without brackets stays a string.
fn form_object(pairs: Vec<(String, String)>) -> Value {
    let mut object = Map::new();
    for (key, value) in pairs {
        let (name, listed) = match key.find('[') {
            Some(at) if key.ends_with(']') => (key[..at].to_owned(), true),
            _ => (key, false),
        };
        let value = Value::String(value);

        match object.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None if listed => {
                object.insert(name, Value::Array(vec![value]));
            }
            None => {
                object.insert(name, value);
            }
        }
    }
    Value::Object(object)
}

/// Repeated `teacher` / `teacher[]` query parameters
pub struct TeacherQuery(pub CommonStudentsQuery);

impl<S> FromRequestParts<S> for TeacherQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs): Query<Vec<(String, String)>> = Query::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::Shape {
                reason: e.body_text(),
            })?;

        Ok(Self(CommonStudentsQuery::from_pairs(pairs)))
    }
}
