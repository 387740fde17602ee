// src/db/catalog_repo.rs

use sqlx::PgPool;
use rust_decimal::Decimal;
use crate::{
    common::error::AppError,
    models::catalog::{Recipe, StockItem, Supplier},
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  FORNECEDORES
    // =========================================================================

    pub async fn create_supplier(
        &self,
        name: &str,
        contact_email: Option<&str>,
    ) -> Result<Supplier, AppError> {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (name, contact_email)
            VALUES ($1, $2)
            RETURNING id, name, contact_email, active, created_at
            "#,
        )
        .bind(name)
        .bind(contact_email)
        .fetch_one(&self.pool)
        .await?;

        Ok(supplier)
    }

    pub async fn get_all_suppliers(&self) -> Result<Vec<Supplier>, AppError> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            "SELECT id, name, contact_email, active, created_at FROM suppliers ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    // =========================================================================
    //  ITENS DE ESTOQUE
    // =========================================================================

    pub async fn create_stock_item(
        &self,
        sku: &str,
        name: &str,
        unit: &str,
        category: &str,
        par_level: Decimal,
    ) -> Result<StockItem, AppError> {
        let item = sqlx::query_as::<_, StockItem>(
            r#"
            INSERT INTO stock_items (sku, name, unit, category, par_level)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, sku, name, unit, category, par_level, active, created_at
            "#,
        )
        .bind(sku)
        .bind(name)
        .bind(unit)
        .bind(category)
        .bind(par_level)
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    pub async fn get_all_stock_items(&self) -> Result<Vec<StockItem>, AppError> {
        let items = sqlx::query_as::<_, StockItem>(
            r#"
            SELECT id, sku, name, unit, category, par_level, active, created_at
            FROM stock_items
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    // =========================================================================
    //  FICHAS TÉCNICAS (Receitas)
    // =========================================================================

    pub async fn create_recipe(
        &self,
        name: &str,
        category: &str,
        portion_cost: Decimal,
        sale_price: Decimal,
        margin_percentage: Decimal,
        prep_minutes: i32,
    ) -> Result<Recipe, AppError> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (name, category, portion_cost, sale_price, margin_percentage, prep_minutes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, category, portion_cost, sale_price, margin_percentage,
                      prep_minutes, active, created_at
            "#,
        )
        .bind(name)
        .bind(category)
        .bind(portion_cost)
        .bind(sale_price)
        .bind(margin_percentage)
        .bind(prep_minutes)
        .fetch_one(&self.pool)
        .await?;

        Ok(recipe)
    }

    pub async fn get_all_recipes(&self) -> Result<Vec<Recipe>, AppError> {
        let recipes = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, name, category, portion_cost, sale_price, margin_percentage,
                   prep_minutes, active, created_at
            FROM recipes
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(recipes)
    }
}
