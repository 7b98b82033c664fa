//! Fiscal year routes.

use axum::{Router, extract::State, routing::{get, post}};
use daftar_db::{
    FiscalYearRepository,
    entities::fiscal_years,
    repositories::{CreateFiscalYearInput, UpdateFiscalYearInput},
};
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::AuthUser,
    response::{ApiResult, Body, Id, Reply},
};

/// Creates the fiscal year routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/fiscal-years", get(list_years).post(create_year))
        .route("/fiscal-years/current", get(current_year))
        .route(
            "/fiscal-years/{id}",
            get(get_year).put(update_year).delete(delete_year),
        )
        .route("/fiscal-years/{id}/open", post(open_year))
        .route("/fiscal-years/{id}/open-next", post(open_next_year))
        .route("/fiscal-years/{id}/close", post(close_year))
}

async fn list_years(State(state): State<AppState>) -> ApiResult<Vec<fiscal_years::Model>> {
    let items = FiscalYearRepository::new(state.db()).list().await?;
    Ok(Reply::items("fetched", items))
}

/// GET `/fiscal-years/current` - The single open year.
async fn current_year(State(state): State<AppState>) -> ApiResult<fiscal_years::Model> {
    let item = FiscalYearRepository::new(state.db()).current().await?;
    Ok(Reply::item("fetched", item))
}

async fn get_year(
    State(state): State<AppState>,
    Id(id): Id<Uuid>,
) -> ApiResult<fiscal_years::Model> {
    let item = FiscalYearRepository::new(state.db()).get(id).await?;
    Ok(Reply::item("fetched", item))
}

async fn create_year(
    State(state): State<AppState>,
    auth: AuthUser,
    Body(input): Body<CreateFiscalYearInput>,
) -> ApiResult<fiscal_years::Model> {
    let created = FiscalYearRepository::new(state.db()).create(input).await?;
    info!(
        operator = auth.subject(),
        fiscal_year_id = %created.id,
        start_date = %created.start_date,
        end_date = %created.end_date,
        "Fiscal year created"
    );
    Ok(Reply::created(created))
}

async fn update_year(
    State(state): State<AppState>,
    auth: AuthUser,
    Id(id): Id<Uuid>,
    Body(input): Body<UpdateFiscalYearInput>,
) -> ApiResult<fiscal_years::Model> {
    let updated = FiscalYearRepository::new(state.db()).update(id, input).await?;
    info!(operator = auth.subject(), fiscal_year_id = %id, "Fiscal year updated");
    Ok(Reply::item("updated", updated))
}

async fn delete_year(
    State(state): State<AppState>,
    auth: AuthUser,
    Id(id): Id<Uuid>,
) -> ApiResult<()> {
    FiscalYearRepository::new(state.db()).delete(id).await?;
    info!(operator = auth.subject(), fiscal_year_id = %id, "Fiscal year deleted");
    Ok(Reply::message("deleted"))
}

/// POST `/fiscal-years/{id}/open` - Open a year, closing the current one.
async fn open_year(
    State(state): State<AppState>,
    auth: AuthUser,
    Id(id): Id<Uuid>,
) -> ApiResult<fiscal_years::Model> {
    let opened = FiscalYearRepository::new(state.db()).open(id).await?;
    info!(operator = auth.subject(), fiscal_year_id = %id, "Fiscal year opened");
    Ok(Reply::item("opened", opened))
}

/// POST `/fiscal-years/{id}/open-next` - Create and open the year after a
/// closed one.
async fn open_next_year(
    State(state): State<AppState>,
    auth: AuthUser,
    Id(id): Id<Uuid>,
) -> ApiResult<fiscal_years::Model> {
    let next = FiscalYearRepository::new(state.db()).open_next(id).await?;
    info!(
        operator = auth.subject(),
        previous_id = %id,
        fiscal_year_id = %next.id,
        "Next fiscal year opened"
    );
    Ok(Reply::created_with("opened", next))
}

async fn close_year(
    State(state): State<AppState>,
    auth: AuthUser,
    Id(id): Id<Uuid>,
) -> ApiResult<fiscal_years::Model> {
    let closed = FiscalYearRepository::new(state.db()).close(id).await?;
    info!(operator = auth.subject(), fiscal_year_id = %id, "Fiscal year closed");
    Ok(Reply::item("closed", closed))
}
