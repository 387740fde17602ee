// src/models/credit_note.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use sqlx::FromRow;
use chrono::{DateTime, Utc, NaiveDate};
use rust_decimal::Decimal;
use utoipa::ToSchema;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "credit_note_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditNoteStatus {
    Pending,  // Único estado que aceita decisão
    Approved, // Terminal
    Rejected, // Terminal
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "credit_reason", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditReason {
    DamagedGoods,
    IncorrectItems,
    PriceDiscrepancy,
    QualityIssues,
    ReturnedItems,
    Other,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreditNote {
    pub id: Uuid,
    pub purchase_order_id: Uuid,

    #[schema(example = "NF-2025-0042")]
    pub supplier_ref: Option<String>,

    #[schema(value_type = String, format = Date)]
    pub date_issued: NaiveDate,

    pub status: CreditNoteStatus,

    #[schema(example = "5.00")]
    pub total_amount: Decimal,

    // Preenchidos quando a nota é aprovada ou rejeitada.
    pub approver: Option<String>,
    pub approval_date: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreditNoteItem {
    pub id: Uuid,
    pub credit_note_id: Uuid,
    pub stock_item_id: Uuid,
    pub name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total: Decimal,
    pub reason: CreditReason,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreditNoteDetail {
    #[serde(flatten)]
    pub header: CreditNote,
    pub items: Vec<CreditNoteItem>,
}

// --- Rascunho (ainda não persistido) ---
// Gerado a partir das divergências selecionadas na tela de conciliação.
// A data de emissão só é atribuída na persistência.

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreditNoteDraft {
    pub purchase_order_id: Uuid,
    pub supplier_ref: Option<String>,
    pub status: CreditNoteStatus,
    pub total_amount: Decimal,
    pub items: Vec<CreditNoteDraftItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreditNoteDraftItem {
    pub stock_item_id: Uuid,
    pub name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total: Decimal,
    pub reason: CreditReason,
}

// Seleção feita pelo usuário: qual divergência vira crédito, e por quê.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiscrepancySelection {
    pub discrepancy_index: usize,
    pub reason: CreditReason,
}
