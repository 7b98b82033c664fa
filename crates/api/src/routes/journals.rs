//! Journal routes: CRUD, posting, reversal and batch operations.

use axum::{Router, extract::State, routing::{get, post}};
use daftar_core::ledger::JournalFilter;
use daftar_db::{
    JournalRepository,
    entities::journals,
    repositories::{AutoJournalRequest, JournalInput, JournalWithItems},
};
use daftar_shared::types::{PageRequest, PageResponse};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    AppState,
    middleware::AuthUser,
    response::{ApiResult, Body, Id, Params, Reply},
};

/// Creates the journal routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/journals", get(list_journals).post(create_journal))
        .route("/journals/auto", post(create_auto_journal))
        .route("/journals/bulk-post", post(bulk_post))
        .route("/journals/reorder-codes", post(reorder_codes))
        .route(
            "/journals/{id}",
            get(get_journal).put(update_journal).delete(delete_journal),
        )
        .route("/journals/{id}/post", post(post_journal))
        .route("/journals/{id}/reverse", post(reverse_journal))
}

/// Number of rows touched by a batch operation.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    /// Affected journals.
    pub count: u64,
}

/// Query for `/journals/reorder-codes`.
#[derive(Debug, Default, Deserialize)]
pub struct ReorderParams {
    /// Fiscal year to renumber; the open year when omitted.
    pub fiscal_year_id: Option<Uuid>,
}

/// GET `/journals` - Filtered, paginated journal headers, newest first.
async fn list_journals(
    State(state): State<AppState>,
    Params(filter): Params<JournalFilter>,
    Params(page): Params<PageRequest>,
) -> ApiResult<PageResponse<journals::Model>> {
    let result = JournalRepository::new(state.db()).list(&filter, &page).await?;
    Ok(Reply::data("fetched", result))
}

async fn get_journal(
    State(state): State<AppState>,
    Id(id): Id<Uuid>,
) -> ApiResult<JournalWithItems> {
    let item = JournalRepository::new(state.db()).get(id).await?;
    Ok(Reply::item("fetched", item))
}

/// POST `/journals` - Create a journal. Unbalanced input is saved as draft.
async fn create_journal(
    State(state): State<AppState>,
    auth: AuthUser,
    Body(input): Body<JournalInput>,
) -> ApiResult<JournalWithItems> {
    let created = JournalRepository::new(state.db()).create(input).await?;
    info!(
        operator = auth.subject(),
        journal_id = %created.journal.id,
        status = ?created.journal.status,
        "Journal created"
    );
    Ok(Reply::created(created))
}

/// POST `/journals/auto` - Create a two-line journal moving one amount.
async fn create_auto_journal(
    State(state): State<AppState>,
    auth: AuthUser,
    Body(input): Body<AutoJournalRequest>,
) -> ApiResult<JournalWithItems> {
    let created = JournalRepository::new(state.db()).create_auto(input).await?;
    info!(operator = auth.subject(), journal_id = %created.journal.id, "Auto journal created");
    Ok(Reply::created(created))
}

async fn update_journal(
    State(state): State<AppState>,
    auth: AuthUser,
    Id(id): Id<Uuid>,
    Body(input): Body<JournalInput>,
) -> ApiResult<JournalWithItems> {
    let updated = JournalRepository::new(state.db()).update(id, input).await?;
    info!(operator = auth.subject(), journal_id = %id, "Journal updated");
    Ok(Reply::item("updated", updated))
}

/// DELETE `/journals/{id}` - Delete a non-permanent journal and detach the
/// treasury document that produced it.
async fn delete_journal(
    State(state): State<AppState>,
    auth: AuthUser,
    Id(id): Id<Uuid>,
) -> ApiResult<()> {
    JournalRepository::new(state.db()).delete(id).await?;
    info!(operator = auth.subject(), journal_id = %id, "Journal deleted");
    Ok(Reply::message("deleted"))
}

async fn post_journal(
    State(state): State<AppState>,
    auth: AuthUser,
    Id(id): Id<Uuid>,
) -> ApiResult<JournalWithItems> {
    let posted = JournalRepository::new(state.db()).post(id).await?;
    info!(operator = auth.subject(), journal_id = %id, "Journal posted");
    Ok(Reply::item("posted", posted))
}

/// POST `/journals/{id}/reverse` - Counter a permanent journal.
async fn reverse_journal(
    State(state): State<AppState>,
    auth: AuthUser,
    Id(id): Id<Uuid>,
) -> ApiResult<JournalWithItems> {
    let reversal = JournalRepository::new(state.db()).reverse(id).await?;
    info!(
        operator = auth.subject(),
        journal_id = %id,
        reversal_id = %reversal.journal.id,
        "Journal reversed"
    );
    Ok(Reply::created_with("reversed", reversal))
}

/// POST `/journals/bulk-post` - Post every balanced temporary journal that
/// matches the filter.
async fn bulk_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Body(filter): Body<JournalFilter>,
) -> ApiResult<CountResponse> {
    let count = JournalRepository::new(state.db()).bulk_post(&filter).await?;
    if count == 0 {
        warn!(operator = auth.subject(), "Bulk post matched no journals");
    } else {
        info!(operator = auth.subject(), count, "Journals bulk posted");
    }
    Ok(Reply::data("bulkPosted", CountResponse { count }))
}

/// POST `/journals/reorder-codes` - Renumber codes by date within a year.
async fn reorder_codes(
    State(state): State<AppState>,
    auth: AuthUser,
    Params(params): Params<ReorderParams>,
) -> ApiResult<CountResponse> {
    let count = JournalRepository::new(state.db())
        .reorder_codes(params.fiscal_year_id)
        .await?;
    info!(operator = auth.subject(), count, "Journal codes reordered");
    Ok(Reply::data("reordered", CountResponse { count }))
}
