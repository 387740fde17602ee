// src/handlers/procurement.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        matching::MatchRecord,
        procurement::{
            InvoiceDetail, ItemCondition, PurchaseOrder, PurchaseOrderDetail,
            ReceivingOrderDetail,
        },
    },
    services::procurement_service::{LineInput, ReceivedLineInput},
};

// ---
// Validação Customizada
// ---
pub(crate) fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: Linha genérica (pedido e fatura)
// ---
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItemPayload {
    #[validate(required(message = "O campo 'stockItemId' é obrigatório."))]
    pub stock_item_id: Option<Uuid>,

    #[validate(length(min = 1, message = "O nome do item é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "A unidade é obrigatória."))]
    pub unit: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub quantity: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    pub unit_price: Decimal,
}

impl LineItemPayload {
    fn to_line_input(&self) -> LineInput {
        LineInput {
            stock_item_id: self.stock_item_id.unwrap(),
            name: self.name.clone(),
            unit: self.unit.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
        }
    }
}

// ---
// Payload: CreatePurchaseOrder
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseOrderPayload {
    #[validate(required(message = "O campo 'supplierId' é obrigatório."))]
    pub supplier_id: Option<Uuid>,

    // Se não vier, assume a data de hoje
    #[schema(value_type = Option<String>, format = Date)]
    pub date_ordered: Option<NaiveDate>,

    #[validate(length(min = 1, message = "O pedido precisa de ao menos um item."))]
    pub items: Vec<LineItemPayload>,
}

// POST /api/purchase-orders
#[utoipa::path(
    post,
    path = "/api/purchase-orders",
    tag = "Procurement",
    request_body = CreatePurchaseOrderPayload,
    responses(
        (status = 201, description = "Pedido criado em rascunho", body = PurchaseOrderDetail),
        (status = 400, description = "Payload inválido")
    )
)]
pub async fn create_purchase_order(
    State(app_state): State<AppState>,
    Json(payload): Json<CreatePurchaseOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    for item in &payload.items {
        item.validate()?;
    }

    let lines: Vec<LineInput> = payload.items.iter().map(|i| i.to_line_input()).collect();

    let detail = app_state
        .procurement_service
        .create_purchase_order(
            payload.supplier_id.unwrap(),
            payload.date_ordered.unwrap_or_else(|| Utc::now().date_naive()),
            lines,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// GET /api/purchase-orders
#[utoipa::path(
    get,
    path = "/api/purchase-orders",
    tag = "Procurement",
    responses(
        (status = 200, description = "Pedidos em ordem cronológica inversa", body = Vec<PurchaseOrder>)
    )
)]
pub async fn list_purchase_orders(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let orders = app_state.procurement_service.get_all_purchase_orders().await?;
    Ok((StatusCode::OK, Json(orders)))
}

// GET /api/purchase-orders/{id}
#[utoipa::path(
    get,
    path = "/api/purchase-orders/{id}",
    tag = "Procurement",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Cabeçalho + linhas do pedido", body = PurchaseOrderDetail),
        (status = 404, description = "Pedido não encontrado")
    )
)]
pub async fn get_purchase_order(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state.procurement_service.get_purchase_order_detail(id).await?;
    Ok((StatusCode::OK, Json(detail)))
}

// POST /api/purchase-orders/{id}/send
#[utoipa::path(
    post,
    path = "/api/purchase-orders/{id}/send",
    tag = "Procurement",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido enviado (documento travado)", body = PurchaseOrder),
        (status = 409, description = "Pedido já saiu de rascunho")
    )
)]
pub async fn send_purchase_order(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.procurement_service.send_purchase_order(id).await?;
    Ok((StatusCode::OK, Json(order)))
}

// ---
// Payload: Recebimento
// ---
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedLineItemPayload {
    #[validate(required(message = "O campo 'stockItemId' é obrigatório."))]
    pub stock_item_id: Option<Uuid>,

    #[validate(length(min = 1, message = "O nome do item é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "A unidade é obrigatória."))]
    pub unit: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub quantity_received: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    pub unit_price: Decimal,

    // Ex: "GOOD", "PARTIAL_DAMAGE", "REJECTED"
    pub condition: ItemCondition,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceivingPayload {
    #[schema(value_type = Option<String>, format = Date)]
    pub date_received: Option<NaiveDate>,

    #[validate(length(min = 1, message = "Informe quem conferiu a entrega."))]
    pub received_by: String,

    #[validate(length(min = 1, message = "O recebimento precisa de ao menos um item."))]
    pub items: Vec<ReceivedLineItemPayload>,
}

// POST /api/purchase-orders/{id}/receiving
#[utoipa::path(
    post,
    path = "/api/purchase-orders/{id}/receiving",
    tag = "Procurement",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = CreateReceivingPayload,
    responses(
        (status = 201, description = "Entrega registrada", body = ReceivingOrderDetail),
        (status = 409, description = "Recebimento já registrado ou pedido em rascunho")
    )
)]
pub async fn create_receiving_order(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateReceivingPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    for item in &payload.items {
        item.validate()?;
    }

    let lines: Vec<ReceivedLineInput> = payload
        .items
        .iter()
        .map(|i| ReceivedLineInput {
            stock_item_id: i.stock_item_id.unwrap(),
            name: i.name.clone(),
            unit: i.unit.clone(),
            quantity_received: i.quantity_received,
            unit_price: i.unit_price,
            condition: i.condition,
        })
        .collect();

    let detail = app_state
        .procurement_service
        .record_receiving(
            id,
            payload.date_received.unwrap_or_else(|| Utc::now().date_naive()),
            &payload.received_by,
            lines,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// ---
// Payload: Fatura
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoicePayload {
    #[validate(length(min = 1, message = "O número da fatura é obrigatório."))]
    pub supplier_ref: String,

    #[schema(value_type = String, format = Date)]
    pub date_issued: NaiveDate,

    #[schema(value_type = String, format = Date)]
    pub date_due: NaiveDate,

    #[validate(length(min = 1, message = "A fatura precisa de ao menos um item."))]
    pub items: Vec<LineItemPayload>,
}

// POST /api/purchase-orders/{id}/invoice
#[utoipa::path(
    post,
    path = "/api/purchase-orders/{id}/invoice",
    tag = "Procurement",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = CreateInvoicePayload,
    responses(
        (status = 201, description = "Fatura registrada", body = InvoiceDetail),
        (status = 409, description = "Fatura já registrada ou pedido em rascunho")
    )
)]
pub async fn create_invoice(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateInvoicePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    for item in &payload.items {
        item.validate()?;
    }

    let lines: Vec<LineInput> = payload.items.iter().map(|i| i.to_line_input()).collect();

    let detail = app_state
        .procurement_service
        .record_invoice(id, &payload.supplier_ref, payload.date_issued, payload.date_due, lines)
        .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// GET /api/purchase-orders/{id}/match
// A conciliação é recalculada a cada chamada a partir dos documentos atuais.
#[utoipa::path(
    get,
    path = "/api/purchase-orders/{id}/match",
    tag = "Matching",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Conciliação em três vias do pedido", body = MatchRecord),
        (status = 404, description = "Pedido não encontrado")
    )
)]
pub async fn get_match(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let record = app_state.matching_service.match_for_purchase_order(id).await?;
    Ok((StatusCode::OK, Json(record)))
}
