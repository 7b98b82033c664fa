//! Detail (subsidiary ledger) routes, including level links.

use axum::{Router, extract::State, routing::{delete, get}};
use daftar_db::{
    DetailRepository,
    entities::{details, details_detail_levels},
    repositories::{DetailFilter, DetailInput, LinkInput},
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::AuthUser,
    response::{ApiResult, Body, Id, Params, Reply},
};

/// Creates the detail routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/details", get(list_details).post(create_detail))
        .route("/details/next-code", get(next_code))
        .route(
            "/details/{id}",
            get(get_detail).put(update_detail).delete(delete_detail),
        )
        .route("/details/{id}/levels", get(list_links).post(link_level))
        .route("/details/{id}/levels/{level_id}", delete(unlink_level))
}

/// Next free detail code.
#[derive(Debug, Serialize)]
pub struct NextCodeResponse {
    /// Four-digit code.
    pub code: String,
}

async fn list_details(
    State(state): State<AppState>,
    Params(filter): Params<DetailFilter>,
) -> ApiResult<Vec<details::Model>> {
    let items = DetailRepository::new(state.db()).list(filter).await?;
    Ok(Reply::items("fetched", items))
}

/// GET `/details/next-code` - Preview the code the next create would allocate.
async fn next_code(State(state): State<AppState>) -> ApiResult<NextCodeResponse> {
    let code = DetailRepository::new(state.db()).next_code().await?;
    Ok(Reply::data("fetched", NextCodeResponse { code }))
}

async fn get_detail(State(state): State<AppState>, Id(id): Id<Uuid>) -> ApiResult<details::Model> {
    let item = DetailRepository::new(state.db()).get(id).await?;
    Ok(Reply::item("fetched", item))
}

/// POST `/details` - Create a user-managed detail.
async fn create_detail(
    State(state): State<AppState>,
    auth: AuthUser,
    Body(input): Body<DetailInput>,
) -> ApiResult<details::Model> {
    let created = DetailRepository::new(state.db()).create(input).await?;
    info!(operator = auth.subject(), detail_id = %created.id, code = %created.code, "Detail created");
    Ok(Reply::created(created))
}

async fn update_detail(
    State(state): State<AppState>,
    auth: AuthUser,
    Id(id): Id<Uuid>,
    Body(input): Body<DetailInput>,
) -> ApiResult<details::Model> {
    let updated = DetailRepository::new(state.db()).update(id, input).await?;
    info!(operator = auth.subject(), detail_id = %id, "Detail updated");
    Ok(Reply::item("updated", updated))
}

async fn delete_detail(
    State(state): State<AppState>,
    auth: AuthUser,
    Id(id): Id<Uuid>,
) -> ApiResult<()> {
    DetailRepository::new(state.db()).delete(id).await?;
    info!(operator = auth.subject(), detail_id = %id, "Detail deleted");
    Ok(Reply::message("deleted"))
}

async fn list_links(
    State(state): State<AppState>,
    Id(id): Id<Uuid>,
) -> ApiResult<Vec<details_detail_levels::Model>> {
    let items = DetailRepository::new(state.db()).levels(id).await?;
    Ok(Reply::items("fetched", items))
}

/// POST `/details/{id}/levels` - Link a detail to a leaf level.
async fn link_level(
    State(state): State<AppState>,
    auth: AuthUser,
    Id(id): Id<Uuid>,
    Body(input): Body<LinkInput>,
) -> ApiResult<details_detail_levels::Model> {
    let link = DetailRepository::new(state.db()).link_level(id, input).await?;
    info!(
        operator = auth.subject(),
        detail_id = %id,
        detail_level_id = %link.detail_level_id,
        is_primary = link.is_primary,
        "Detail linked"
    );
    Ok(Reply::created_with("linked", link))
}

async fn unlink_level(
    State(state): State<AppState>,
    auth: AuthUser,
    Id((id, level_id)): Id<(Uuid, Uuid)>,
) -> ApiResult<()> {
    DetailRepository::new(state.db()).unlink_level(id, level_id).await?;
    info!(operator = auth.subject(), detail_id = %id, detail_level_id = %level_id, "Detail unlinked");
    Ok(Reply::message("unlinked"))
}
