//! Chart-of-accounts code routes.

use axum::{Router, extract::State, routing::get};
use daftar_core::taxonomy::{CodePayload, TreeNode};
use daftar_db::{CodeRepository, entities::codes, repositories::CodeFilter};
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::AuthUser,
    response::{ApiResult, Body, Id, Params, Reply},
};

/// Creates the code routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/codes", get(list_codes).post(create_code))
        .route("/codes/tree", get(code_tree))
        .route("/codes/{id}", get(get_code).put(update_code).delete(delete_code))
}

/// GET `/codes` - List codes, optionally by kind and active flag.
async fn list_codes(
    State(state): State<AppState>,
    Params(filter): Params<CodeFilter>,
) -> ApiResult<Vec<codes::Model>> {
    let items = CodeRepository::new(state.db()).list(filter).await?;
    Ok(Reply::items("fetched", items))
}

/// GET `/codes/tree` - The whole chart as a forest.
async fn code_tree(State(state): State<AppState>) -> ApiResult<Vec<TreeNode<codes::Model>>> {
    let tree = CodeRepository::new(state.db()).tree().await?;
    Ok(Reply::data("fetched", tree))
}

async fn get_code(State(state): State<AppState>, Id(id): Id<Uuid>) -> ApiResult<codes::Model> {
    let item = CodeRepository::new(state.db()).get(id).await?;
    Ok(Reply::item("fetched", item))
}

/// POST `/codes` - Create a group, general or specific code.
async fn create_code(
    State(state): State<AppState>,
    auth: AuthUser,
    Body(payload): Body<CodePayload>,
) -> ApiResult<codes::Model> {
    let created = CodeRepository::new(state.db()).create(payload).await?;
    info!(operator = auth.subject(), code_id = %created.id, code = %created.code, "Code created");
    Ok(Reply::created(created))
}

/// PUT `/codes/{id}` - Update a code; kind and parent are re-validated.
async fn update_code(
    State(state): State<AppState>,
    auth: AuthUser,
    Id(id): Id<Uuid>,
    Body(payload): Body<CodePayload>,
) -> ApiResult<codes::Model> {
    let updated = CodeRepository::new(state.db()).update(id, payload).await?;
    info!(operator = auth.subject(), code_id = %id, "Code updated");
    Ok(Reply::item("updated", updated))
}

/// DELETE `/codes/{id}` - Delete an unreferenced leaf code.
async fn delete_code(
    State(state): State<AppState>,
    auth: AuthUser,
    Id(id): Id<Uuid>,
) -> ApiResult<()> {
    CodeRepository::new(state.db()).delete(id).await?;
    info!(operator = auth.subject(), code_id = %id, "Code deleted");
    Ok(Reply::message("deleted"))
}
