// src/models/matching.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use rust_decimal::Decimal;
use utoipa::ToSchema;

use crate::models::procurement::{InvoiceDetail, PurchaseOrderDetail, ReceivingOrderDetail};

// Resultado da conciliação em três vias (pedido x recebimento x fatura).
// Nada aqui é persistido: o registro é recalculado do zero a cada consulta,
// sempre a partir dos documentos de origem.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Matched,      // Três documentos presentes, zero divergências
    PartialMatch, // Divergência leve (percentual acima do limiar)
    Discrepancy,  // Percentual abaixo do limiar configurado
    Incomplete,   // Falta recebimento ou fatura
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscrepancyKind {
    Quantity,
    Price,
    // Item presente no recebimento/fatura mas ausente do pedido.
    UnknownItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Unpaid,
    Scheduled,
    Paid,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Discrepancy {
    pub kind: DiscrepancyKind,
    pub stock_item_id: Uuid,
    pub name: String,

    // Valor esperado pelo pedido (quantidade ou preço unitário, conforme o tipo).
    // None para UNKNOWN_ITEM, que não tem contrapartida no pedido.
    pub expected: Option<Decimal>,

    // Valor encontrado no recebimento (quantidade) ou na fatura (preço).
    pub found: Option<Decimal>,

    // Impacto financeiro da divergência.
    // Convenção de sinal: falta na entrega => negativo; cobrança a maior => positivo.
    #[schema(example = "-5.00")]
    pub difference: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub purchase_order_id: Uuid,

    pub status: MatchStatus,

    // round(100 * linhas conciliadas / linhas do pedido). Uma linha só conta
    // como conciliada quando quantidade E preço batem.
    #[schema(example = "67")]
    pub match_percentage: Decimal,

    // Limiar configurado abaixo do qual o status vira DISCREPANCY.
    #[schema(example = "80")]
    pub threshold: Decimal,

    pub discrepancies: Vec<Discrepancy>,

    pub approval_status: ApprovalStatus,
    pub payment_status: PaymentStatus,
    pub approver: Option<String>,

    // Os documentos que alimentaram o cálculo, para a tela não refazer fetch.
    pub purchase_order: PurchaseOrderDetail,
    pub receiving_order: Option<ReceivingOrderDetail>,
    pub invoice: Option<InvoiceDetail>,
}
