// src/db/credit_note_repo.rs

use sqlx::PgPool;
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use crate::{
    common::error::AppError,
    models::credit_note::{
        CreditNote, CreditNoteDetail, CreditNoteDraftItem, CreditNoteItem, CreditNoteStatus,
    },
};

#[derive(Clone)]
pub struct CreditNoteRepository {
    pool: PgPool,
}

impl CreditNoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_credit_note(
        &self,
        purchase_order_id: Uuid,
        supplier_ref: Option<&str>,
        date_issued: NaiveDate,
        total_amount: Decimal,
        lines: &[CreditNoteDraftItem],
    ) -> Result<CreditNoteDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        // Toda nota nasce PENDING; a decisão vem depois, por ação humana.
        let header = sqlx::query_as::<_, CreditNote>(
            r#"
            INSERT INTO credit_notes (purchase_order_id, supplier_ref, date_issued, status, total_amount)
            VALUES ($1, $2, $3, 'PENDING', $4)
            RETURNING id, purchase_order_id, supplier_ref, date_issued, status,
                      total_amount, approver, approval_date, created_at
            "#,
        )
        .bind(purchase_order_id)
        .bind(supplier_ref)
        .bind(date_issued)
        .bind(total_amount)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let item = sqlx::query_as::<_, CreditNoteItem>(
                r#"
                INSERT INTO credit_note_items
                    (credit_note_id, stock_item_id, name, quantity, unit_price, total, reason)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, credit_note_id, stock_item_id, name, quantity, unit_price, total, reason
                "#,
            )
            .bind(header.id)
            .bind(line.stock_item_id)
            .bind(&line.name)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.total)
            .bind(line.reason)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item);
        }

        tx.commit().await?;
        Ok(CreditNoteDetail { header, items })
    }

    pub async fn get_all_credit_notes(&self) -> Result<Vec<CreditNote>, AppError> {
        let notes = sqlx::query_as::<_, CreditNote>(
            r#"
            SELECT id, purchase_order_id, supplier_ref, date_issued, status,
                   total_amount, approver, approval_date, created_at
            FROM credit_notes
            ORDER BY date_issued DESC, created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    pub async fn get_credit_note(&self, id: Uuid) -> Result<Option<CreditNote>, AppError> {
        let note = sqlx::query_as::<_, CreditNote>(
            r#"
            SELECT id, purchase_order_id, supplier_ref, date_issued, status,
                   total_amount, approver, approval_date, created_at
            FROM credit_notes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(note)
    }

    pub async fn get_credit_note_detail(
        &self,
        id: Uuid,
    ) -> Result<Option<CreditNoteDetail>, AppError> {
        let Some(header) = self.get_credit_note(id).await? else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, CreditNoteItem>(
            r#"
            SELECT id, credit_note_id, stock_item_id, name, quantity, unit_price, total, reason
            FROM credit_note_items
            WHERE credit_note_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(CreditNoteDetail { header, items }))
    }

    // Grava a decisão (aprovar/rejeitar). O service já garantiu que a nota
    // ainda estava PENDING.
    pub async fn decide_credit_note(
        &self,
        id: Uuid,
        status: CreditNoteStatus,
        approver: &str,
        approval_date: DateTime<Utc>,
    ) -> Result<CreditNote, AppError> {
        let note = sqlx::query_as::<_, CreditNote>(
            r#"
            UPDATE credit_notes
            SET status = $2, approver = $3, approval_date = $4
            WHERE id = $1
            RETURNING id, purchase_order_id, supplier_ref, date_issued, status,
                      total_amount, approver, approval_date, created_at
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(approver)
        .bind(approval_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(note)
    }
}
