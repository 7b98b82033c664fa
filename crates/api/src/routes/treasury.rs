//! Cashbox, bank account and card reader routes.

use axum::{Router, extract::State, routing::get};
use daftar_db::{
    TreasuryResourceRepository,
    entities::{bank_accounts, card_readers, cashboxes},
    repositories::{BankAccountInput, CardReaderInput, CashboxInput},
};
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::AuthUser,
    response::{ApiResult, Body, Id, Reply},
};

/// Creates the treasury resource routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cashboxes", get(list_cashboxes).post(create_cashbox))
        .route("/cashboxes/{id}", get(get_cashbox))
        .route("/bank-accounts", get(list_bank_accounts).post(create_bank_account))
        .route("/bank-accounts/{id}", get(get_bank_account))
        .route("/card-readers", get(list_card_readers).post(create_card_reader))
        .route("/card-readers/{id}", get(get_card_reader))
}

fn repo(state: &AppState) -> TreasuryResourceRepository {
    TreasuryResourceRepository::new(state.db())
}

async fn list_cashboxes(State(state): State<AppState>) -> ApiResult<Vec<cashboxes::Model>> {
    Ok(Reply::items("fetched", repo(&state).list_cashboxes().await?))
}

async fn get_cashbox(State(state): State<AppState>, Id(id): Id<Uuid>) -> ApiResult<cashboxes::Model> {
    Ok(Reply::item("fetched", repo(&state).get_cashbox(id).await?))
}

/// POST `/cashboxes` - Create a cashbox and its system-managed handler detail.
async fn create_cashbox(
    State(state): State<AppState>,
    auth: AuthUser,
    Body(input): Body<CashboxInput>,
) -> ApiResult<cashboxes::Model> {
    let created = repo(&state).create_cashbox(input).await?;
    info!(operator = auth.subject(), cashbox_id = %created.id, "Cashbox created");
    Ok(Reply::created(created))
}

async fn list_bank_accounts(
    State(state): State<AppState>,
) -> ApiResult<Vec<bank_accounts::Model>> {
    Ok(Reply::items("fetched", repo(&state).list_bank_accounts().await?))
}

async fn get_bank_account(
    State(state): State<AppState>,
    Id(id): Id<Uuid>,
) -> ApiResult<bank_accounts::Model> {
    Ok(Reply::item("fetched", repo(&state).get_bank_account(id).await?))
}

async fn create_bank_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Body(input): Body<BankAccountInput>,
) -> ApiResult<bank_accounts::Model> {
    let created = repo(&state).create_bank_account(input).await?;
    info!(operator = auth.subject(), bank_account_id = %created.id, "Bank account created");
    Ok(Reply::created(created))
}

async fn list_card_readers(State(state): State<AppState>) -> ApiResult<Vec<card_readers::Model>> {
    Ok(Reply::items("fetched", repo(&state).list_card_readers().await?))
}

async fn get_card_reader(
    State(state): State<AppState>,
    Id(id): Id<Uuid>,
) -> ApiResult<card_readers::Model> {
    Ok(Reply::item("fetched", repo(&state).get_card_reader(id).await?))
}

/// POST `/card-readers` - Create a card reader bound to a bank account.
async fn create_card_reader(
    State(state): State<AppState>,
    auth: AuthUser,
    Body(input): Body<CardReaderInput>,
) -> ApiResult<card_readers::Model> {
    let created = repo(&state).create_card_reader(input).await?;
    info!(operator = auth.subject(), card_reader_id = %created.id, "Card reader created");
    Ok(Reply::created(created))
}
