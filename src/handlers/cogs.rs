// src/handlers/cogs.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::cogs::{CogsProjection, MonthlyCogsRecord},
};

// GET /api/cogs/history
#[utoipa::path(
    get,
    path = "/api/cogs/history",
    tag = "Cogs",
    responses(
        (status = 200, description = "Histórico mensal de CMV x vendas", body = Vec<MonthlyCogsRecord>)
    )
)]
pub async fn get_history(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let history = app_state.cogs_service.get_history().await?;
    Ok((StatusCode::OK, Json(history)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProjectionParams {
    // Quantos meses projetar (padrão: 6)
    #[validate(range(min = 1, max = 24, message = "O horizonte deve ficar entre 1 e 24 meses."))]
    pub horizon: Option<u32>,
}

// GET /api/cogs/projection?horizon=6
#[utoipa::path(
    get,
    path = "/api/cogs/projection",
    tag = "Cogs",
    params(("horizon" = Option<u32>, Query, description = "Meses a projetar (padrão 6)")),
    responses(
        (status = 200, description = "Projeção de CMV/vendas pelo crescimento médio", body = Vec<CogsProjection>),
        (status = 400, description = "Horizonte fora do intervalo")
    )
)]
pub async fn get_projection(
    State(app_state): State<AppState>,
    Query(params): Query<ProjectionParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;

    let horizon = params.horizon.unwrap_or(6) as usize;
    let projection = app_state.cogs_service.get_projection(horizon).await?;

    Ok((StatusCode::OK, Json(projection)))
}
