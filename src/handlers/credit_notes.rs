// src/handlers/credit_notes.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::procurement::validate_not_negative,
    models::credit_note::{
        CreditNote, CreditNoteDetail, CreditNoteDraft, CreditNoteDraftItem, CreditNoteStatus,
        CreditReason, DiscrepancySelection,
    },
};

// ---
// Payload: rascunho a partir da conciliação
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftFromMatchPayload {
    #[validate(required(message = "O campo 'purchaseOrderId' é obrigatório."))]
    pub purchase_order_id: Option<Uuid>,

    #[validate(length(min = 1, message = "Selecione ao menos uma divergência."))]
    pub selections: Vec<DiscrepancySelection>,
}

// POST /api/credit-notes/draft
// Não persiste nada: devolve o rascunho montado para a tela revisar.
#[utoipa::path(
    post,
    path = "/api/credit-notes/draft",
    tag = "CreditNotes",
    request_body = DraftFromMatchPayload,
    responses(
        (status = 200, description = "Rascunho derivado das divergências selecionadas", body = CreditNoteDraft),
        (status = 400, description = "Seleção inválida"),
        (status = 404, description = "Pedido não encontrado")
    )
)]
pub async fn draft_credit_note(
    State(app_state): State<AppState>,
    Json(payload): Json<DraftFromMatchPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let draft = app_state
        .credit_note_service
        .draft_from_match(payload.purchase_order_id.unwrap(), &payload.selections)
        .await?;

    Ok((StatusCode::OK, Json(draft)))
}

// ---
// Payload: persistir a nota
// ---
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreditNoteItemPayload {
    #[validate(required(message = "O campo 'stockItemId' é obrigatório."))]
    pub stock_item_id: Option<Uuid>,

    #[validate(length(min = 1, message = "O nome do item é obrigatório."))]
    pub name: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub quantity: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    pub unit_price: Decimal,

    // Ex: "DAMAGED_GOODS", "PRICE_DISCREPANCY"
    pub reason: CreditReason,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCreditNotePayload {
    #[validate(required(message = "O campo 'purchaseOrderId' é obrigatório."))]
    pub purchase_order_id: Option<Uuid>,

    pub supplier_ref: Option<String>,

    #[validate(length(min = 1, message = "A nota precisa de ao menos uma linha."))]
    pub items: Vec<CreditNoteItemPayload>,
}

// POST /api/credit-notes
#[utoipa::path(
    post,
    path = "/api/credit-notes",
    tag = "CreditNotes",
    request_body = CreateCreditNotePayload,
    responses(
        (status = 201, description = "Nota criada como PENDING", body = CreditNoteDetail),
        (status = 400, description = "Payload inválido")
    )
)]
pub async fn create_credit_note(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateCreditNotePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    for item in &payload.items {
        item.validate()?;
    }

    // O total de cada linha é recalculado no service
    let lines: Vec<CreditNoteDraftItem> = payload
        .items
        .iter()
        .map(|i| CreditNoteDraftItem {
            stock_item_id: i.stock_item_id.unwrap(),
            name: i.name.clone(),
            quantity: i.quantity,
            unit_price: i.unit_price,
            total: Decimal::ZERO,
            reason: i.reason,
        })
        .collect();

    let detail = app_state
        .credit_note_service
        .create_credit_note(
            payload.purchase_order_id.unwrap(),
            payload.supplier_ref.as_deref(),
            lines,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// GET /api/credit-notes
#[utoipa::path(
    get,
    path = "/api/credit-notes",
    tag = "CreditNotes",
    responses(
        (status = 200, description = "Notas de crédito registradas", body = Vec<CreditNote>)
    )
)]
pub async fn list_credit_notes(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let notes = app_state.credit_note_service.get_all_credit_notes().await?;
    Ok((StatusCode::OK, Json(notes)))
}

// GET /api/credit-notes/{id}
#[utoipa::path(
    get,
    path = "/api/credit-notes/{id}",
    tag = "CreditNotes",
    params(("id" = Uuid, Path, description = "ID da nota")),
    responses(
        (status = 200, description = "Nota com as linhas", body = CreditNoteDetail),
        (status = 404, description = "Nota não encontrada")
    )
)]
pub async fn get_credit_note(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state
        .credit_note_service
        .get_credit_note_detail(id)
        .await?
        .ok_or(AppError::NotFound("Nota de crédito"))?;
    Ok((StatusCode::OK, Json(detail)))
}

// ---
// Payload: decisão
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecideCreditNotePayload {
    #[validate(length(min = 1, message = "Informe quem está decidindo a nota."))]
    pub approver: String,
}

// POST /api/credit-notes/{id}/approve
#[utoipa::path(
    post,
    path = "/api/credit-notes/{id}/approve",
    tag = "CreditNotes",
    params(("id" = Uuid, Path, description = "ID da nota")),
    request_body = DecideCreditNotePayload,
    responses(
        (status = 200, description = "Nota aprovada", body = CreditNote),
        (status = 409, description = "Nota já decidida (estado terminal)")
    )
)]
pub async fn approve_credit_note(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DecideCreditNotePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let note = app_state
        .credit_note_service
        .decide_credit_note(id, CreditNoteStatus::Approved, &payload.approver)
        .await?;

    Ok((StatusCode::OK, Json(note)))
}

// POST /api/credit-notes/{id}/reject
#[utoipa::path(
    post,
    path = "/api/credit-notes/{id}/reject",
    tag = "CreditNotes",
    params(("id" = Uuid, Path, description = "ID da nota")),
    request_body = DecideCreditNotePayload,
    responses(
        (status = 200, description = "Nota rejeitada", body = CreditNote),
        (status = 409, description = "Nota já decidida (estado terminal)")
    )
)]
pub async fn reject_credit_note(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DecideCreditNotePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let note = app_state
        .credit_note_service
        .decide_credit_note(id, CreditNoteStatus::Rejected, &payload.approver)
        .await?;

    Ok((StatusCode::OK, Json(note)))
}
