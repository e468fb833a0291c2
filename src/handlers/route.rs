//! Dispatch for a compiled path: OPTIONS, method check, parameter merge, execution, envelope.

use crate::compiler::{HttpMethod, Route};
use crate::error::AppError;
use crate::extractors::RequestParams;
use crate::response::{DebugInfo, Envelope};
use crate::service::ExecutionService;
use crate::state::Endpoint;
use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

fn allowed_methods(routes: &[Route]) -> String {
    routes
        .iter()
        .map(|r| r.descriptor.method().as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn debug_info(route: &Route, processed_sql: String) -> DebugInfo {
    let d = &route.descriptor;
    DebugInfo {
        method: d.method().to_string(),
        sql_path: d.sql_path().to_string(),
        is_universal: d.is_universal(),
        table_name: d.table_name().map(str::to_string),
        processed_sql,
    }
}

fn method_not_allowed(method: &Method, routes: &[Route]) -> Response {
    let expected = allowed_methods(routes);
    let allow = HeaderValue::from_str(&format!("{}, OPTIONS", expected)).ok();
    let mut response = AppError::MethodNotAllowed {
        got: method.to_string(),
        expected,
    }
    .into_response();
    if let Some(allow) = allow {
        response.headers_mut().insert(header::ALLOW, allow);
    }
    response
}

/// Handler registered once per compiled path, for every method.
pub async fn dispatch(
    State(endpoint): State<Endpoint>,
    method: Method,
    params: Result<RequestParams, AppError>,
) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    let route = HttpMethod::from_http(&method)
        .and_then(|m| endpoint.routes.iter().find(|r| r.descriptor.method() == m));
    let Some(route) = route else {
        return method_not_allowed(&method, &endpoint.routes);
    };
    let RequestParams(params) = match params {
        Ok(p) => p,
        Err(e) => return e.into_response(),
    };

    let execution = ExecutionService::run(&endpoint.app.store, route, &params).await;
    let debug = endpoint
        .app
        .config
        .debug
        .then(|| debug_info(route, execution.processed_sql));
    match execution.outcome {
        Ok(data) => (StatusCode::OK, Json(Envelope::success(data).with_debug(debug))).into_response(),
        Err(e) => {
            let err = AppError::from(e);
            (err.status(), Json(Envelope::failure(err.to_string()).with_debug(debug))).into_response()
        }
    }
}
