// src/handlers/recipes.rs

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
    common::{error::AppError, rounding::round_dp},
    config::AppState,
    handlers::procurement::validate_not_negative,
    models::catalog::{Recipe, RecipeQuery, RecipeSortKey},
};

// ---
// Parâmetros de listagem (a tela manda o estado de filtro inteiro;
// o debounce da busca é responsabilidade dela)
// ---
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeListParams {
    // Busca livre por nome ou categoria
    pub q: Option<String>,

    // Categorias separadas por vírgula, ex: "Massas,Saladas"
    pub categories: Option<String>,

    pub max_cost: Option<Decimal>,
    pub min_margin: Option<Decimal>,

    #[serde(default)]
    pub only_active: bool,

    // Ex: "name-asc", "cost-desc", "margin-desc"
    #[serde(default)]
    pub sort: RecipeSortKey,
}

// GET /api/recipes
#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "Recipes",
    params(
        ("q" = Option<String>, Query, description = "Busca livre por nome/categoria"),
        ("categories" = Option<String>, Query, description = "Categorias separadas por vírgula"),
        ("maxCost" = Option<String>, Query, description = "Custo máximo por porção"),
        ("minMargin" = Option<String>, Query, description = "Margem mínima (%)"),
        ("onlyActive" = Option<bool>, Query, description = "Somente fichas ativas"),
        ("sort" = Option<String>, Query, description = "Chave de ordenação (padrão name-asc)")
    ),
    responses(
        (status = 200, description = "Fichas filtradas e ordenadas", body = Vec<Recipe>)
    )
)]
pub async fn list_recipes(
    State(app_state): State<AppState>,
    Query(params): Query<RecipeListParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = RecipeQuery {
        text: params.q,
        categories: params
            .categories
            .map(|c| {
                c.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default(),
        max_cost: params.max_cost,
        min_margin: params.min_margin,
        only_active: params.only_active,
        sort: params.sort,
    };

    let recipes = app_state.catalog_service.list_recipes(&query).await?;
    Ok((StatusCode::OK, Json(recipes)))
}

// ---
// Payload: CreateRecipe
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub portion_cost: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    pub sale_price: Decimal,

    // Se não vier, é derivada de custo e preço de venda
    pub margin_percentage: Option<Decimal>,

    #[serde(default)]
    pub prep_minutes: i32,
}

// POST /api/recipes
#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "Recipes",
    request_body = CreateRecipePayload,
    responses(
        (status = 201, description = "Ficha técnica criada", body = Recipe),
        (status = 400, description = "Payload inválido")
    )
)]
pub async fn create_recipe(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateRecipePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let margin = payload.margin_percentage.unwrap_or_else(|| {
        if payload.sale_price == Decimal::ZERO {
            Decimal::ZERO
        } else {
            round_dp(
                (payload.sale_price - payload.portion_cost) / payload.sale_price
                    * Decimal::from(100),
                1,
            )
        }
    });

    let recipe = app_state
        .catalog_service
        .create_recipe(
            &payload.name,
            &payload.category,
            payload.portion_cost,
            payload.sale_price,
            margin,
            payload.prep_minutes,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(recipe)))
}
