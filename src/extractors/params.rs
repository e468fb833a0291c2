//! Collect request parameters from the query string and, for POST/PUT, a JSON object body.

use crate::compiler::HttpMethod;
use crate::error::AppError;
use crate::sql::ParameterSet;
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Query, Request},
};
use serde_json::Value;

/// Merged parameter set. Query keys keep their first value; body keys override them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestParams(pub ParameterSet);

#[async_trait]
impl<S> FromRequest<S> for RequestParams
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut params = ParameterSet::new();
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(req.uri())
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        for (key, value) in pairs {
            params.entry(key).or_insert(Value::String(value));
        }

        let carries_body = HttpMethod::from_http(req.method())
            .map(HttpMethod::carries_body)
            .unwrap_or(false);
        if !carries_body {
            return Ok(RequestParams(params));
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        merge_body(&mut params, &body)?;
        Ok(RequestParams(params))
    }
}

/// Merge a JSON object body into `params`. An empty body adds nothing.
pub fn merge_body(params: &mut ParameterSet, body: &[u8]) -> Result<(), AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("invalid JSON body: {}", e)))?;
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                params.insert(key, value);
            }
            Ok(())
        }
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}
