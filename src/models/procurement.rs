// src/models/procurement.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use sqlx::FromRow;
use chrono::{DateTime, Utc, NaiveDate};
use rust_decimal::Decimal;
use utoipa::ToSchema;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "purchase_order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseOrderStatus {
    Draft,     // Rascunho (único estado editável)
    Sent,      // Enviado ao fornecedor (documento travado)
    Confirmed, // Confirmado pelo fornecedor
    Received,  // Mercadoria conferida no recebimento
    Closed,    // Conciliado e pago
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "item_condition", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemCondition {
    Good,          // Vira "GOOD"
    PartialDamage, // Vira "PARTIAL_DAMAGE"
    Rejected,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    pub supplier_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2025-03-01")]
    pub date_ordered: NaiveDate,

    pub status: PurchaseOrderStatus,

    // Soma dos totais de linha. Imutável depois que o pedido sai de "Draft".
    #[schema(example = "350.00")]
    pub total_amount: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderItem {
    pub id: Uuid,
    pub purchase_order_id: Uuid,
    pub stock_item_id: Uuid,

    #[schema(example = "Tomate Italiano")]
    pub name: String,
    #[schema(example = "kg")]
    pub unit: String,

    #[schema(example = "20.0")]
    pub quantity: Decimal,
    #[schema(example = "2.50")]
    pub unit_price: Decimal,

    // Invariante: total == round(quantity * unit_price, 2), calculado no servidor.
    #[schema(example = "50.00")]
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceivingOrder {
    pub id: Uuid,
    pub purchase_order_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2025-03-04")]
    pub date_received: NaiveDate,

    #[schema(example = "João (cozinha)")]
    pub received_by: String,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceivingOrderItem {
    pub id: Uuid,
    pub receiving_order_id: Uuid,
    pub stock_item_id: Uuid,
    pub name: String,
    pub unit: String,

    // O que o pedido pedia x o que de fato chegou.
    pub quantity_ordered: Decimal,
    pub quantity_received: Decimal,

    pub unit_price: Decimal,
    pub condition: ItemCondition,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    pub purchase_order_id: Uuid,

    // Número da fatura no sistema do fornecedor
    #[schema(example = "NF-2025-0042")]
    pub supplier_ref: String,

    #[schema(value_type = String, format = Date)]
    pub date_issued: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub date_due: NaiveDate,

    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub stock_item_id: Uuid,
    pub name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total: Decimal,
}

// --- Agregados (cabeçalho + linhas) ---
// Montados pelo repositório; é o formato que o motor de conciliação consome.

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderDetail {
    #[serde(flatten)]
    pub header: PurchaseOrder,
    pub items: Vec<PurchaseOrderItem>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceivingOrderDetail {
    #[serde(flatten)]
    pub header: ReceivingOrder,
    pub items: Vec<ReceivingOrderItem>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub header: Invoice,
    pub items: Vec<InvoiceItem>,
}

// Linha já preparada pelo service (total calculado), pronta para inserir.
#[derive(Debug, Clone)]
pub struct PreparedLine {
    pub stock_item_id: Uuid,
    pub name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total: Decimal,
}

// Linha de recebimento preparada (com a quantidade pedida resolvida).
#[derive(Debug, Clone)]
pub struct PreparedReceivedLine {
    pub stock_item_id: Uuid,
    pub name: String,
    pub unit: String,
    pub quantity_ordered: Decimal,
    pub quantity_received: Decimal,
    pub unit_price: Decimal,
    pub condition: ItemCondition,
}
