//! Resource CRUD handlers: list, read, create, update, delete.

use crate::dao::DaoError;
use crate::document::Document;
use crate::error::AppError;
use crate::response::{created, ok_many, ok_one};
use crate::state::ResourceState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;

fn body_to_document(payload: Result<Json<Value>, JsonRejection>, allow_empty: bool) -> Result<Document, AppError> {
    let Json(value) = payload?;
    match value {
        Value::Object(m) if m.is_empty() && !allow_empty => {
            Err(AppError::BadRequest("body must be a non-empty JSON object".into()))
        }
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// Run a write on its own task so a dropped connection cannot cancel it midway.
async fn run_to_completion<T, F>(write: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, DaoError>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(write).await {
        Ok(result) => result.map_err(AppError::from),
        Err(e) => Err(AppError::Store(format!("write task failed: {}", e))),
    }
}

pub async fn list(
    State(state): State<ResourceState>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = query?;
    let filter: Document = params.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
    let filter = (!filter.is_empty()).then_some(filter);
    let docs = state.dao.list(filter.as_ref()).await?;
    Ok(ok_many(docs))
}

pub async fn read(
    State(state): State<ResourceState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let doc = state
        .dao
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} '{}'", state.name, id)))?;
    Ok(ok_one(doc))
}

pub async fn create(
    State(state): State<ResourceState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_to_document(payload, false)?;
    let dao = state.dao.clone();
    let doc = run_to_completion(async move { dao.create(body).await }).await?;
    tracing::debug!(resource = %state.name, id = ?doc.get(&*state.id_field), "created");
    Ok(created(doc))
}

pub async fn update(
    State(state): State<ResourceState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let body = body_to_document(payload, true)?;
    let dao = state.dao.clone();
    let target = id.clone();
    let doc = run_to_completion(async move { dao.update_by_id(&target, body).await })
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} '{}'", state.name, id)))?;
    Ok(ok_one(doc))
}

pub async fn delete(
    State(state): State<ResourceState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let dao = state.dao.clone();
    let target = id.clone();
    let removed = run_to_completion(async move { dao.delete_by_id(&target).await }).await?;
    if !removed {
        return Err(AppError::NotFound(format!("{} '{}'", state.name, id)));
    }
    tracing::debug!(resource = %state.name, id = %id, "deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Answers methods a resource path does not support.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
