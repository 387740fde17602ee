// src/db/cogs_repo.rs

use sqlx::PgPool;
use crate::{common::error::AppError, models::cogs::MonthlyCogsRow};

#[derive(Clone)]
pub struct CogsRepository {
    pool: PgPool,
}

impl CogsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Histórico mensal real (alimentado pelo fechamento contábil), em ordem
    // cronológica. É a única fonte da projeção: nada de valores sintéticos.
    pub async fn get_monthly_history(&self) -> Result<Vec<MonthlyCogsRow>, AppError> {
        let rows = sqlx::query_as::<_, MonthlyCogsRow>(
            r#"
            SELECT reference_month, cogs, sales
            FROM monthly_cogs
            ORDER BY reference_month ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
