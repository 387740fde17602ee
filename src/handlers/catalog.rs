// src/handlers/catalog.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::procurement::validate_not_negative,
    models::catalog::{StockItem, Supplier},
};

// ---
// Payload: CreateSupplier
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(email(message = "E-mail de contato inválido."))]
    pub contact_email: Option<String>,
}

// POST /api/suppliers
#[utoipa::path(
    post,
    path = "/api/suppliers",
    tag = "Catalog",
    request_body = CreateSupplierPayload,
    responses(
        (status = 201, description = "Fornecedor cadastrado", body = Supplier),
        (status = 400, description = "Payload inválido")
    )
)]
pub async fn create_supplier(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateSupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let supplier = app_state
        .catalog_service
        .create_supplier(&payload.name, payload.contact_email.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(supplier)))
}

// GET /api/suppliers
#[utoipa::path(
    get,
    path = "/api/suppliers",
    tag = "Catalog",
    responses((status = 200, description = "Fornecedores cadastrados", body = Vec<Supplier>))
)]
pub async fn list_suppliers(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let suppliers = app_state.catalog_service.get_all_suppliers().await?;
    Ok((StatusCode::OK, Json(suppliers)))
}

// ---
// Payload: CreateStockItem
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStockItemPayload {
    #[validate(length(min = 1, message = "O SKU é obrigatório."))]
    pub sku: String,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "A unidade é obrigatória."))]
    pub unit: String,

    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: String,

    // Nível PAR: quantidade-alvo em estoque
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub par_level: Decimal,
}

// POST /api/stock-items
#[utoipa::path(
    post,
    path = "/api/stock-items",
    tag = "Catalog",
    request_body = CreateStockItemPayload,
    responses(
        (status = 201, description = "Item cadastrado", body = StockItem),
        (status = 400, description = "Payload inválido")
    )
)]
pub async fn create_stock_item(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateStockItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let item = app_state
        .catalog_service
        .create_stock_item(
            &payload.sku,
            &payload.name,
            &payload.unit,
            &payload.category,
            payload.par_level,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

// GET /api/stock-items
#[utoipa::path(
    get,
    path = "/api/stock-items",
    tag = "Catalog",
    responses((status = 200, description = "Itens de estoque", body = Vec<StockItem>))
)]
pub async fn list_stock_items(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let items = app_state.catalog_service.get_all_stock_items().await?;
    Ok((StatusCode::OK, Json(items)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResolveParams {
    pub name: String,
}

// GET /api/stock-items/resolve?name=...
// Usado pelo fluxo de escaneamento de fatura: casa o nome lido por OCR com o
// cadastro, respeitando o limiar de similaridade configurado.
#[utoipa::path(
    get,
    path = "/api/stock-items/resolve",
    tag = "Catalog",
    params(("name" = String, Query, description = "Nome lido do documento")),
    responses(
        (status = 200, description = "Item mais parecido acima do limiar", body = StockItem),
        (status = 404, description = "Nenhum item parecido o bastante")
    )
)]
pub async fn resolve_stock_item(
    State(app_state): State<AppState>,
    Query(params): Query<ResolveParams>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state
        .catalog_service
        .resolve_stock_item(&params.name)
        .await?
        .ok_or(AppError::NotFound("Item de estoque"))?;

    Ok((StatusCode::OK, Json(item)))
}
