//! Checkbook and check routes.

use axum::{Router, extract::State, routing::get};
use daftar_db::{
    CheckRepository,
    entities::{checkbooks, checks},
    repositories::{CheckFilter, CheckInput, CheckbookInput},
};
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::AuthUser,
    response::{ApiResult, Body, Id, Params, Reply},
};

/// Creates the checkbook and check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/checkbooks", get(list_checkbooks).post(create_checkbook))
        .route("/checkbooks/{id}", get(get_checkbook))
        .route("/checks", get(list_checks).post(create_check))
        .route("/checks/{id}", get(get_check).delete(delete_check))
}

async fn list_checkbooks(State(state): State<AppState>) -> ApiResult<Vec<checkbooks::Model>> {
    let items = CheckRepository::new(state.db()).list_checkbooks().await?;
    Ok(Reply::items("fetched", items))
}

async fn get_checkbook(
    State(state): State<AppState>,
    Id(id): Id<Uuid>,
) -> ApiResult<checkbooks::Model> {
    let item = CheckRepository::new(state.db()).get_checkbook(id).await?;
    Ok(Reply::item("fetched", item))
}

async fn create_checkbook(
    State(state): State<AppState>,
    auth: AuthUser,
    Body(input): Body<CheckbookInput>,
) -> ApiResult<checkbooks::Model> {
    let created = CheckRepository::new(state.db()).create_checkbook(input).await?;
    info!(
        operator = auth.subject(),
        checkbook_id = %created.id,
        bank_account_id = %created.bank_account_id,
        "Checkbook created"
    );
    Ok(Reply::created(created))
}

async fn list_checks(
    State(state): State<AppState>,
    Params(filter): Params<CheckFilter>,
) -> ApiResult<Vec<checks::Model>> {
    let items = CheckRepository::new(state.db()).list_checks(filter).await?;
    Ok(Reply::items("fetched", items))
}

async fn get_check(State(state): State<AppState>, Id(id): Id<Uuid>) -> ApiResult<checks::Model> {
    let item = CheckRepository::new(state.db()).get_check(id).await?;
    Ok(Reply::item("fetched", item))
}

/// POST `/checks` - Register an incoming check or issue one from a checkbook.
async fn create_check(
    State(state): State<AppState>,
    auth: AuthUser,
    Body(input): Body<CheckInput>,
) -> ApiResult<checks::Model> {
    let created = CheckRepository::new(state.db()).create_check(input).await?;
    info!(
        operator = auth.subject(),
        check_id = %created.id,
        number = %created.number,
        check_type = ?created.check_type,
        "Check created"
    );
    Ok(Reply::created(created))
}

async fn delete_check(
    State(state): State<AppState>,
    auth: AuthUser,
    Id(id): Id<Uuid>,
) -> ApiResult<()> {
    CheckRepository::new(state.db()).delete_check(id).await?;
    info!(operator = auth.subject(), check_id = %id, "Check deleted");
    Ok(Reply::message("deleted"))
}
