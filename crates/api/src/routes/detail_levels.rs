//! Detail level routes.

use axum::{Router, extract::State, routing::get};
use daftar_core::taxonomy::TreeNode;
use daftar_db::{DetailLevelRepository, entities::detail_levels, repositories::DetailLevelInput};
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::AuthUser,
    response::{ApiResult, Body, Id, Reply},
};

/// Creates the detail level routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/detail-levels", get(list_levels).post(create_level))
        .route("/detail-levels/tree", get(level_tree))
        .route(
            "/detail-levels/{id}",
            get(get_level).put(update_level).delete(delete_level),
        )
}

async fn list_levels(State(state): State<AppState>) -> ApiResult<Vec<detail_levels::Model>> {
    let items = DetailLevelRepository::new(state.db()).list().await?;
    Ok(Reply::items("fetched", items))
}

async fn level_tree(
    State(state): State<AppState>,
) -> ApiResult<Vec<TreeNode<detail_levels::Model>>> {
    let tree = DetailLevelRepository::new(state.db()).tree().await?;
    Ok(Reply::data("fetched", tree))
}

async fn get_level(
    State(state): State<AppState>,
    Id(id): Id<Uuid>,
) -> ApiResult<detail_levels::Model> {
    let item = DetailLevelRepository::new(state.db()).get(id).await?;
    Ok(Reply::item("fetched", item))
}

async fn create_level(
    State(state): State<AppState>,
    auth: AuthUser,
    Body(input): Body<DetailLevelInput>,
) -> ApiResult<detail_levels::Model> {
    let created = DetailLevelRepository::new(state.db()).create(input).await?;
    info!(operator = auth.subject(), detail_level_id = %created.id, "Detail level created");
    Ok(Reply::created(created))
}

/// PUT `/detail-levels/{id}` - Update a level. Moving it under a linked level
/// or below itself is rejected.
async fn update_level(
    State(state): State<AppState>,
    auth: AuthUser,
    Id(id): Id<Uuid>,
    Body(input): Body<DetailLevelInput>,
) -> ApiResult<detail_levels::Model> {
    let updated = DetailLevelRepository::new(state.db()).update(id, input).await?;
    info!(operator = auth.subject(), detail_level_id = %id, "Detail level updated");
    Ok(Reply::item("updated", updated))
}

async fn delete_level(
    State(state): State<AppState>,
    auth: AuthUser,
    Id(id): Id<Uuid>,
) -> ApiResult<()> {
    DetailLevelRepository::new(state.db()).delete(id).await?;
    info!(operator = auth.subject(), detail_level_id = %id, "Detail level deleted");
    Ok(Reply::message("deleted"))
}
