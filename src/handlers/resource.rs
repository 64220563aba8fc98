use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Extension, Router,
};
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{self, DeleteAck, InsertAck, UpdateAck};

/// The resource kinds served by the generic CRUD handler.
///
/// Each kind is just a collection-name configuration value; the handlers are
/// identical across kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Skill,
    Project,
    Blog,
}

impl ResourceKind {
    /// URL path segment under /api/v1.
    pub fn path_segment(&self) -> &'static str {
        match self {
            ResourceKind::Skill => "skill",
            ResourceKind::Project => "project",
            ResourceKind::Blog => "blog",
        }
    }

    /// Backing collection name in the document store.
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::Skill => "skills",
            ResourceKind::Project => "projects",
            ResourceKind::Blog => "blogs",
        }
    }
}

/// Build the CRUD route set for one resource kind.
///
/// Instantiated once per kind and merged into the app router; the kind rides
/// along as a request extension so the handlers stay generic.
pub fn routes(kind: ResourceKind) -> Router<AppState> {
    let base = format!("/api/v1/{}", kind.path_segment());
    let by_id = format!("{}/:id", base);

    Router::new()
        .route(&base, get(list).post(create))
        .route(&by_id, get(fetch).patch(update).delete(remove))
        .layer(Extension(kind))
}

/// POST /api/v1/:kind - insert a caller-supplied document verbatim.
async fn create(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Json(body): Json<Value>,
) -> Result<Json<InsertAck>, ApiError> {
    let ack = state.store.collection(kind.collection()).insert(body).await?;
    Ok(Json(ack))
}

/// GET /api/v1/:kind - list every document in the collection.
async fn list(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let docs = state.store.collection(kind.collection()).find_all().await?;
    Ok(Json(docs))
}

/// GET /api/v1/:kind/:id - fetch a single document.
async fn fetch(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = store::parse_document_id(&id)?;

    let doc = state
        .store
        .collection(kind.collection())
        .find_by_id(id)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!("{} {} not found", kind.path_segment(), id))
        })?;

    Ok(Json(doc))
}

/// PATCH /api/v1/:kind/:id - merge-update named fields.
async fn update(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Result<Json<UpdateAck>, ApiError> {
    let id = store::parse_document_id(&id)?;

    let ack = state
        .store
        .collection(kind.collection())
        .update_by_id(id, patch)
        .await?;

    Ok(Json(ack))
}

/// DELETE /api/v1/:kind/:id - remove the matching document.
async fn remove(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Path(id): Path<String>,
) -> Result<Json<DeleteAck>, ApiError> {
    let id = store::parse_document_id(&id)?;

    let ack = state
        .store
        .collection(kind.collection())
        .delete_by_id(id)
        .await?;

    Ok(Json(ack))
}
