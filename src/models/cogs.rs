// src/models/cogs.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use utoipa::ToSchema;

// Calendário fixo de 12 nomes usado nos rótulos da tela de CMV.
// As projeções ciclam por aqui a partir do último mês histórico.
pub const MESES: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun",
    "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

// Linha crua da tabela monthly_cogs (ordenada por reference_month).
#[derive(Debug, Clone, FromRow)]
pub struct MonthlyCogsRow {
    pub reference_month: NaiveDate,
    pub cogs: Decimal,
    pub sales: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCogsRecord {
    #[schema(example = "Mar")]
    pub month: String,
    pub cogs: Decimal,
    pub sales: Decimal,
    // round(100 * cogs / sales, 1); zero quando não houve venda no mês.
    #[schema(example = "32.5")]
    pub percentage: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CogsProjection {
    pub month: String,
    pub cogs: Decimal,
    pub sales: Decimal,
    pub percentage: Decimal,
    pub is_projected: bool,
}
