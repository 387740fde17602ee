// src/models/catalog.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    #[schema(example = "Hortifruti Dois Irmãos")]
    pub name: String,
    pub contact_email: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub id: Uuid,
    #[schema(example = "HORT-001")]
    pub sku: String,
    #[schema(example = "Tomate Italiano")]
    pub name: String,
    #[schema(example = "kg")]
    pub unit: String,
    #[schema(example = "Hortifruti")]
    pub category: String,
    // Quantidade-alvo em estoque (nível PAR) para a contagem semanal.
    pub par_level: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    #[schema(example = "Nhoque ao sugo")]
    pub name: String,
    #[schema(example = "Massas")]
    pub category: String,
    #[schema(example = "8.40")]
    pub portion_cost: Decimal,
    #[schema(example = "42.00")]
    pub sale_price: Decimal,
    #[schema(example = "80.0")]
    pub margin_percentage: Decimal,
    pub prep_minutes: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

// Chaves de ordenação aceitas pela listagem de fichas técnicas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RecipeSortKey {
    #[default]
    NameAsc,
    NameDesc,
    CostAsc,
    CostDesc,
    MarginDesc,
}

// Estado explícito de filtro/busca, montado pela camada HTTP e passado
// inteiro para a pipeline pura (a tela só faz o debounce).
#[derive(Debug, Clone, Default)]
pub struct RecipeQuery {
    pub text: Option<String>,
    pub categories: Vec<String>,
    pub max_cost: Option<Decimal>,
    pub min_margin: Option<Decimal>,
    pub only_active: bool,
    pub sort: RecipeSortKey,
}
