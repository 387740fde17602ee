// src/db/procurement_repo.rs

use sqlx::PgPool;
use uuid::Uuid;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use crate::{
    common::error::AppError,
    models::procurement::{
        Invoice, InvoiceDetail, InvoiceItem, PreparedLine, PreparedReceivedLine,
        PurchaseOrder, PurchaseOrderDetail, PurchaseOrderItem, PurchaseOrderStatus,
        ReceivingOrder, ReceivingOrderDetail, ReceivingOrderItem,
    },
};

#[derive(Clone)]
pub struct ProcurementRepository {
    pool: PgPool,
}

impl ProcurementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  PEDIDOS DE COMPRA
    // =========================================================================

    pub async fn create_purchase_order(
        &self,
        supplier_id: Uuid,
        date_ordered: NaiveDate,
        total_amount: Decimal,
        lines: &[PreparedLine],
    ) -> Result<PurchaseOrderDetail, AppError> {
        // Cabeçalho e linhas na mesma transação
        let mut tx = self.pool.begin().await?;

        let header = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            INSERT INTO purchase_orders (supplier_id, date_ordered, status, total_amount)
            VALUES ($1, $2, 'DRAFT', $3)
            RETURNING id, supplier_id, date_ordered, status, total_amount, created_at, updated_at
            "#,
        )
        .bind(supplier_id)
        .bind(date_ordered)
        .bind(total_amount)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let item = sqlx::query_as::<_, PurchaseOrderItem>(
                r#"
                INSERT INTO purchase_order_items
                    (purchase_order_id, stock_item_id, name, unit, quantity, unit_price, total)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, purchase_order_id, stock_item_id, name, unit, quantity, unit_price, total
                "#,
            )
            .bind(header.id)
            .bind(line.stock_item_id)
            .bind(&line.name)
            .bind(&line.unit)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.total)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item);
        }

        tx.commit().await?;
        Ok(PurchaseOrderDetail { header, items })
    }

    pub async fn get_all_purchase_orders(&self) -> Result<Vec<PurchaseOrder>, AppError> {
        let orders = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            SELECT id, supplier_id, date_ordered, status, total_amount, created_at, updated_at
            FROM purchase_orders
            ORDER BY date_ordered DESC, created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    pub async fn get_purchase_order(&self, id: Uuid) -> Result<Option<PurchaseOrder>, AppError> {
        let order = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            SELECT id, supplier_id, date_ordered, status, total_amount, created_at, updated_at
            FROM purchase_orders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    pub async fn get_purchase_order_detail(
        &self,
        id: Uuid,
    ) -> Result<Option<PurchaseOrderDetail>, AppError> {
        let Some(header) = self.get_purchase_order(id).await? else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, PurchaseOrderItem>(
            r#"
            SELECT id, purchase_order_id, stock_item_id, name, unit, quantity, unit_price, total
            FROM purchase_order_items
            WHERE purchase_order_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(PurchaseOrderDetail { header, items }))
    }

    pub async fn update_purchase_order_status(
        &self,
        id: Uuid,
        status: PurchaseOrderStatus,
    ) -> Result<PurchaseOrder, AppError> {
        let order = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            UPDATE purchase_orders
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, supplier_id, date_ordered, status, total_amount, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(order)
    }

    // =========================================================================
    //  RECEBIMENTOS (1:1 com o pedido)
    // =========================================================================

    pub async fn create_receiving_order(
        &self,
        purchase_order_id: Uuid,
        date_received: NaiveDate,
        received_by: &str,
        lines: &[PreparedReceivedLine],
    ) -> Result<ReceivingOrderDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let header = sqlx::query_as::<_, ReceivingOrder>(
            r#"
            INSERT INTO receiving_orders (purchase_order_id, date_received, received_by)
            VALUES ($1, $2, $3)
            RETURNING id, purchase_order_id, date_received, received_by, created_at
            "#,
        )
        .bind(purchase_order_id)
        .bind(date_received)
        .bind(received_by)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let item = sqlx::query_as::<_, ReceivingOrderItem>(
                r#"
                INSERT INTO receiving_order_items
                    (receiving_order_id, stock_item_id, name, unit,
                     quantity_ordered, quantity_received, unit_price, condition)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id, receiving_order_id, stock_item_id, name, unit,
                          quantity_ordered, quantity_received, unit_price, condition
                "#,
            )
            .bind(header.id)
            .bind(line.stock_item_id)
            .bind(&line.name)
            .bind(&line.unit)
            .bind(line.quantity_ordered)
            .bind(line.quantity_received)
            .bind(line.unit_price)
            .bind(line.condition)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item);
        }

        tx.commit().await?;
        Ok(ReceivingOrderDetail { header, items })
    }

    pub async fn get_receiving_by_purchase_order(
        &self,
        purchase_order_id: Uuid,
    ) -> Result<Option<ReceivingOrderDetail>, AppError> {
        let header = sqlx::query_as::<_, ReceivingOrder>(
            r#"
            SELECT id, purchase_order_id, date_received, received_by, created_at
            FROM receiving_orders
            WHERE purchase_order_id = $1
            "#,
        )
        .bind(purchase_order_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, ReceivingOrderItem>(
            r#"
            SELECT id, receiving_order_id, stock_item_id, name, unit,
                   quantity_ordered, quantity_received, unit_price, condition
            FROM receiving_order_items
            WHERE receiving_order_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(header.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(ReceivingOrderDetail { header, items }))
    }

    // =========================================================================
    //  FATURAS
    // =========================================================================

    pub async fn create_invoice(
        &self,
        purchase_order_id: Uuid,
        supplier_ref: &str,
        date_issued: NaiveDate,
        date_due: NaiveDate,
        total: Decimal,
        lines: &[PreparedLine],
    ) -> Result<InvoiceDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let header = sqlx::query_as::<_, Invoice>(
            r#"
            INSERT INTO invoices (purchase_order_id, supplier_ref, date_issued, date_due, total)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, purchase_order_id, supplier_ref, date_issued, date_due, total, created_at
            "#,
        )
        .bind(purchase_order_id)
        .bind(supplier_ref)
        .bind(date_issued)
        .bind(date_due)
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let item = sqlx::query_as::<_, InvoiceItem>(
                r#"
                INSERT INTO invoice_items
                    (invoice_id, stock_item_id, name, unit, quantity, unit_price, total)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, invoice_id, stock_item_id, name, unit, quantity, unit_price, total
                "#,
            )
            .bind(header.id)
            .bind(line.stock_item_id)
            .bind(&line.name)
            .bind(&line.unit)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.total)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item);
        }

        tx.commit().await?;
        Ok(InvoiceDetail { header, items })
    }

    pub async fn get_invoice_by_purchase_order(
        &self,
        purchase_order_id: Uuid,
    ) -> Result<Option<InvoiceDetail>, AppError> {
        let header = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT id, purchase_order_id, supplier_ref, date_issued, date_due, total, created_at
            FROM invoices
            WHERE purchase_order_id = $1
            "#,
        )
        .bind(purchase_order_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, InvoiceItem>(
            r#"
            SELECT id, invoice_id, stock_item_id, name, unit, quantity, unit_price, total
            FROM invoice_items
            WHERE invoice_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(header.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(InvoiceDetail { header, items }))
    }
}
