//! Receipt and payment routes.
//!
//! Both document kinds share one repository and one set of handlers; the
//! [`Direction`] marker picks the table pair and the URL prefix.

use axum::{Router, extract::State, routing::{get, post}};
use daftar_db::{
    DocumentRepository,
    repositories::{Document, DocumentFilter, DocumentHeader, DocumentInput},
};
use sea_orm::DatabaseConnection;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::AuthUser,
    response::{ApiResult, Body, Id, Params, Reply},
};

/// Selects the receipt or payment side of the treasury.
pub trait Direction: Send + Sync + 'static {
    /// URL segment under `/api/v1`.
    const PATH: &'static str;

    /// Builds the repository for this direction.
    fn repository(db: DatabaseConnection) -> DocumentRepository;
}

/// Incoming money.
pub struct Receipts;

/// Outgoing money.
pub struct Payments;

impl Direction for Receipts {
    const PATH: &'static str = "receipts";

    fn repository(db: DatabaseConnection) -> DocumentRepository {
        DocumentRepository::receipts(db)
    }
}

impl Direction for Payments {
    const PATH: &'static str = "payments";

    fn repository(db: DatabaseConnection) -> DocumentRepository {
        DocumentRepository::payments(db)
    }
}

/// Creates the receipt and payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(direction_routes::<Receipts>())
        .merge(direction_routes::<Payments>())
}

fn direction_routes<D: Direction>() -> Router<AppState> {
    let base = format!("/{}", D::PATH);
    Router::new()
        .route(&base, get(list_documents::<D>).post(create_document::<D>))
        .route(
            &format!("{base}/{{id}}"),
            get(get_document::<D>)
                .put(update_document::<D>)
                .delete(delete_document::<D>),
        )
        .route(&format!("{base}/{{id}}/post"), post(post_document::<D>))
}

async fn list_documents<D: Direction>(
    State(state): State<AppState>,
    Params(filter): Params<DocumentFilter>,
) -> ApiResult<Vec<DocumentHeader>> {
    let items = D::repository(state.db()).list(filter).await?;
    Ok(Reply::items("fetched", items))
}

async fn get_document<D: Direction>(
    State(state): State<AppState>,
    Id(id): Id<Uuid>,
) -> ApiResult<Document> {
    let item = D::repository(state.db()).get(id).await?;
    Ok(Reply::item("fetched", item))
}

async fn create_document<D: Direction>(
    State(state): State<AppState>,
    auth: AuthUser,
    Body(input): Body<DocumentInput>,
) -> ApiResult<Document> {
    let created = D::repository(state.db()).create(input).await?;
    info!(
        operator = auth.subject(),
        kind = D::PATH,
        document_id = %created.header.id,
        number = %created.header.number,
        total = %created.header.total_amount,
        "Treasury document created"
    );
    Ok(Reply::created(created))
}

async fn update_document<D: Direction>(
    State(state): State<AppState>,
    auth: AuthUser,
    Id(id): Id<Uuid>,
    Body(input): Body<DocumentInput>,
) -> ApiResult<Document> {
    let updated = D::repository(state.db()).update(id, input).await?;
    info!(operator = auth.subject(), kind = D::PATH, document_id = %id, "Treasury document updated");
    Ok(Reply::item("updated", updated))
}

async fn delete_document<D: Direction>(
    State(state): State<AppState>,
    auth: AuthUser,
    Id(id): Id<Uuid>,
) -> ApiResult<()> {
    D::repository(state.db()).delete(id).await?;
    info!(operator = auth.subject(), kind = D::PATH, document_id = %id, "Treasury document deleted");
    Ok(Reply::message("deleted"))
}

/// POST `/{receipts|payments}/{id}/post` - Generate the journal for a
/// temporary document and mark it sent.
async fn post_document<D: Direction>(
    State(state): State<AppState>,
    auth: AuthUser,
    Id(id): Id<Uuid>,
) -> ApiResult<Document> {
    let posted = D::repository(state.db()).post(id, &state.mappings).await?;
    info!(
        operator = auth.subject(),
        kind = D::PATH,
        document_id = %id,
        journal_id = ?posted.header.journal_id,
        "Treasury document posted"
    );
    Ok(Reply::item("posted", posted))
}
