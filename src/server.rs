//! HTTP surface for out-of-process collaborators.
//!
//! The core is a same-process synchronous API; this module is a thin shim
//! that lets a UI collaborator reach it over localhost. Requests are
//! decoded into the facade's own types and run on a blocking thread, since
//! the store is synchronous today.

use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::{Json, Router as HttpRouter, routing::post};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::error::StoreError;
use crate::persist::{Cmp, Filter, SortOrder};
use crate::provider::InventoryProvider;
use crate::schema::{Value, Values};

/// The provider behind a mutex: the store serializes writes through its
/// connection, and the mutex keeps the shim honest about it.
pub type SharedProvider = Arc<Mutex<InventoryProvider>>;

#[derive(Deserialize)]
pub struct FilterClause {
    pub column: String,
    pub op: String,
    pub value: JsonValue,
}

#[derive(Deserialize)]
pub struct QueryRequest {
    pub identifier: String,
    #[serde(default)]
    pub projection: Option<Vec<String>>,
    #[serde(default)]
    pub filter: Vec<FilterClause>,
    #[serde(default)]
    pub order_by: Option<String>,
    #[serde(default)]
    pub descending: bool,
}

#[derive(Deserialize)]
pub struct WriteRequest {
    pub identifier: String,
    #[serde(default)]
    pub values: serde_json::Map<String, JsonValue>,
    #[serde(default)]
    pub filter: Vec<FilterClause>,
}

#[derive(Deserialize)]
pub struct IdentifierRequest {
    pub identifier: String,
}

#[derive(Serialize)]
pub struct ApiResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<serde_json::Map<String, JsonValue>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    fn ok() -> ApiResponse {
        ApiResponse {
            status: "ok".into(),
            rows: None,
            row_count: None,
            id: None,
            count: None,
            content_type: None,
            error: None,
        }
    }
    fn error(message: String) -> ApiResponse {
        ApiResponse { status: "error".into(), error: Some(message), ..ApiResponse::ok() }
    }
}

type Reply = (StatusCode, Json<ApiResponse>);

fn failure(e: &StoreError) -> Reply {
    let status = match e {
        StoreError::UnrecognizedIdentifier(_) => StatusCode::NOT_FOUND,
        StoreError::Validation(_)
        | StoreError::UnsupportedOperation(_)
        | StoreError::UnknownColumn(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = format!("{e}");
    warn!(%message, code = %status.as_u16(), "request failed");
    (status, Json(ApiResponse::error(message)))
}

fn bad_request(message: String) -> Reply {
    warn!(%message, "request rejected");
    (StatusCode::BAD_REQUEST, Json(ApiResponse::error(message)))
}

fn join_failure() -> Reply {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiResponse::error("join error".into())))
}

fn json_to_value(value: &JsonValue) -> Result<Value, String> {
    match value {
        JsonValue::String(s) => Ok(Value::Text(s.clone())),
        JsonValue::Number(n) => n
            .as_i64()
            .map(Value::Integer)
            .ok_or_else(|| format!("{n} is not a whole number")),
        JsonValue::Null => Ok(Value::Null),
        other => Err(format!("unsupported value {other}")),
    }
}

fn decode_values(map: &serde_json::Map<String, JsonValue>) -> Result<Values, String> {
    let mut values = Values::new();
    for (column, value) in map {
        values.put(column, json_to_value(value)?);
    }
    Ok(values)
}

fn decode_filter(clauses: &[FilterClause]) -> Result<Filter, String> {
    let mut filter = Filter::all();
    for clause in clauses {
        let cmp = match clause.op.as_str() {
            "eq" => Cmp::Eq,
            "ne" => Cmp::Ne,
            "lt" => Cmp::Lt,
            "le" => Cmp::Le,
            "gt" => Cmp::Gt,
            "ge" => Cmp::Ge,
            other => return Err(format!("unsupported comparison {other}")),
        };
        filter = filter.and(&clause.column, cmp, json_to_value(&clause.value)?);
    }
    Ok(filter)
}

fn encode_rows(rows: Vec<Values>) -> Vec<serde_json::Map<String, JsonValue>> {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|(column, value)| {
                    let json = match value {
                        Value::Text(s) => JsonValue::String(s.clone()),
                        Value::Integer(i) => JsonValue::Number((*i).into()),
                        Value::Null => JsonValue::Null,
                    };
                    (column.to_owned(), json)
                })
                .collect()
        })
        .collect()
}

// Runs one synchronous provider call on a blocking thread.
async fn run_blocking<T, F>(provider: SharedProvider, call: F) -> Result<Result<T, StoreError>, Reply>
where
    T: Send + 'static,
    F: FnOnce(&InventoryProvider) -> Result<T, StoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let guard = provider.lock().map_err(|e| StoreError::Lock(e.to_string()))?;
        call(&guard)
    })
    .await
    .map_err(|e| {
        warn!(error = %e, "join error");
        join_failure()
    })
}

/// Build the localhost API router.
pub fn router(provider: SharedProvider) -> HttpRouter {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::POST])
        .allow_headers(Any);

    let query_provider = Arc::clone(&provider);
    let insert_provider = Arc::clone(&provider);
    let update_provider = Arc::clone(&provider);
    let delete_provider = Arc::clone(&provider);
    let type_provider = provider;

    HttpRouter::new()
        .route(
            "/v1/query",
            post(move |Json(req): Json<QueryRequest>| {
                let provider = Arc::clone(&query_provider);
                async move {
                    let filter = match decode_filter(&req.filter) {
                        Ok(filter) => filter,
                        Err(message) => return bad_request(message),
                    };
                    let order = req.order_by.map(|column| {
                        if req.descending {
                            SortOrder::descending(&column)
                        } else {
                            SortOrder::ascending(&column)
                        }
                    });
                    let outcome = run_blocking(provider, move |p| {
                        let projection: Option<Vec<&str>> = req
                            .projection
                            .as_ref()
                            .map(|columns| columns.iter().map(String::as_str).collect());
                        p.query(&req.identifier, projection.as_deref(), &filter, order.as_ref())
                            .map(|snapshot| snapshot.into_rows())
                    })
                    .await;
                    match outcome {
                        Ok(Ok(rows)) => {
                            let mut body = ApiResponse::ok();
                            body.row_count = Some(rows.len());
                            body.rows = Some(encode_rows(rows));
                            (StatusCode::OK, Json(body))
                        }
                        Ok(Err(e)) => failure(&e),
                        Err(reply) => reply,
                    }
                }
            }),
        )
        .route(
            "/v1/insert",
            post(move |Json(req): Json<WriteRequest>| {
                let provider = Arc::clone(&insert_provider);
                async move {
                    let values = match decode_values(&req.values) {
                        Ok(values) => values,
                        Err(message) => return bad_request(message),
                    };
                    let outcome =
                        run_blocking(provider, move |p| p.insert(&req.identifier, &values)).await;
                    match outcome {
                        Ok(Ok(id)) => {
                            let mut body = ApiResponse::ok();
                            body.id = Some(id);
                            (StatusCode::OK, Json(body))
                        }
                        Ok(Err(e)) => failure(&e),
                        Err(reply) => reply,
                    }
                }
            }),
        )
        .route(
            "/v1/update",
            post(move |Json(req): Json<WriteRequest>| {
                let provider = Arc::clone(&update_provider);
                async move {
                    let values = match decode_values(&req.values) {
                        Ok(values) => values,
                        Err(message) => return bad_request(message),
                    };
                    let filter = match decode_filter(&req.filter) {
                        Ok(filter) => filter,
                        Err(message) => return bad_request(message),
                    };
                    let outcome = run_blocking(provider, move |p| {
                        p.update(&req.identifier, &values, &filter)
                    })
                    .await;
                    match outcome {
                        Ok(Ok(count)) => {
                            let mut body = ApiResponse::ok();
                            body.count = Some(count);
                            (StatusCode::OK, Json(body))
                        }
                        Ok(Err(e)) => failure(&e),
                        Err(reply) => reply,
                    }
                }
            }),
        )
        .route(
            "/v1/delete",
            post(move |Json(req): Json<WriteRequest>| {
                let provider = Arc::clone(&delete_provider);
                async move {
                    let filter = match decode_filter(&req.filter) {
                        Ok(filter) => filter,
                        Err(message) => return bad_request(message),
                    };
                    let outcome =
                        run_blocking(provider, move |p| p.delete(&req.identifier, &filter)).await;
                    match outcome {
                        Ok(Ok(count)) => {
                            let mut body = ApiResponse::ok();
                            body.count = Some(count);
                            (StatusCode::OK, Json(body))
                        }
                        Ok(Err(e)) => failure(&e),
                        Err(reply) => reply,
                    }
                }
            }),
        )
        .route(
            "/v1/type",
            post(move |Json(req): Json<IdentifierRequest>| {
                let provider = Arc::clone(&type_provider);
                async move {
                    let outcome =
                        run_blocking(provider, move |p| p.type_of(&req.identifier)).await;
                    match outcome {
                        Ok(Ok(content_type)) => {
                            let mut body = ApiResponse::ok();
                            body.content_type = Some(content_type);
                            (StatusCode::OK, Json(body))
                        }
                        Ok(Err(e)) => failure(&e),
                        Err(reply) => reply,
                    }
                }
            }),
        )
        .layer(cors)
}
