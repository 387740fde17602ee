// src/services/procurement_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{error::AppError, rounding::round_dp},
    db::ProcurementRepository,
    models::procurement::{
        InvoiceDetail, ItemCondition, PreparedLine, PreparedReceivedLine, PurchaseOrder,
        PurchaseOrderDetail, PurchaseOrderStatus, ReceivingOrderDetail,
    },
};

// Linha crua, como chega da tela. O total NUNCA vem de fora: é recalculado
// aqui para manter o invariante total == round(quantity * unit_price, 2).
#[derive(Debug, Clone)]
pub struct LineInput {
    pub stock_item_id: Uuid,
    pub name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone)]
pub struct ReceivedLineInput {
    pub stock_item_id: Uuid,
    pub name: String,
    pub unit: String,
    pub quantity_received: Decimal,
    pub unit_price: Decimal,
    pub condition: ItemCondition,
}

#[derive(Clone)]
pub struct ProcurementService {
    repo: ProcurementRepository,
}

impl ProcurementService {
    pub fn new(repo: ProcurementRepository) -> Self {
        Self { repo }
    }

    pub async fn create_purchase_order(
        &self,
        supplier_id: Uuid,
        date_ordered: NaiveDate,
        lines: Vec<LineInput>,
    ) -> Result<PurchaseOrderDetail, AppError> {
        let (prepared, total_amount) = prepare_lines(&lines);
        self.repo
            .create_purchase_order(supplier_id, date_ordered, total_amount, &prepared)
            .await
    }

    pub async fn get_all_purchase_orders(&self) -> Result<Vec<PurchaseOrder>, AppError> {
        self.repo.get_all_purchase_orders().await
    }

    pub async fn get_purchase_order_detail(
        &self,
        id: Uuid,
    ) -> Result<PurchaseOrderDetail, AppError> {
        self.repo
            .get_purchase_order_detail(id)
            .await?
            .ok_or(AppError::NotFound("Pedido de compra"))
    }

    // Draft -> Sent. A partir daqui o documento está travado.
    pub async fn send_purchase_order(&self, id: Uuid) -> Result<PurchaseOrder, AppError> {
        let po = self
            .repo
            .get_purchase_order(id)
            .await?
            .ok_or(AppError::NotFound("Pedido de compra"))?;

        if po.status != PurchaseOrderStatus::Draft {
            return Err(AppError::InvalidStateTransition(format!(
                "Pedido {} não está em rascunho; documento enviado é imutável.",
                id
            )));
        }

        self.repo
            .update_purchase_order_status(id, PurchaseOrderStatus::Sent)
            .await
    }

    // Uma entrega física por pedido (1:1 neste modelo).
    pub async fn record_receiving(
        &self,
        po_id: Uuid,
        date_received: NaiveDate,
        received_by: &str,
        lines: Vec<ReceivedLineInput>,
    ) -> Result<ReceivingOrderDetail, AppError> {
        let po_detail = self
            .repo
            .get_purchase_order_detail(po_id)
            .await?
            .ok_or(AppError::NotFound("Pedido de compra"))?;
        ensure_locked(&po_detail.header)?;

        if self
            .repo
            .get_receiving_by_purchase_order(po_id)
            .await?
            .is_some()
        {
            return Err(AppError::InvalidStateTransition(
                "Recebimento já registrado para este pedido.".to_string(),
            ));
        }

        // Resolve a quantidade pedida por item; item fora do pedido entra com
        // zero e será apontado pela conciliação.
        let prepared: Vec<PreparedReceivedLine> = lines
            .into_iter()
            .map(|line| {
                let ordered = po_detail
                    .items
                    .iter()
                    .find(|i| i.stock_item_id == line.stock_item_id)
                    .map(|i| i.quantity)
                    .unwrap_or(Decimal::ZERO);
                PreparedReceivedLine {
                    stock_item_id: line.stock_item_id,
                    name: line.name,
                    unit: line.unit,
                    quantity_ordered: ordered,
                    quantity_received: line.quantity_received,
                    unit_price: line.unit_price,
                    condition: line.condition,
                }
            })
            .collect();

        let created = self
            .repo
            .create_receiving_order(po_id, date_received, received_by, &prepared)
            .await?;

        self.repo
            .update_purchase_order_status(po_id, PurchaseOrderStatus::Received)
            .await?;

        Ok(created)
    }

    pub async fn record_invoice(
        &self,
        po_id: Uuid,
        supplier_ref: &str,
        date_issued: NaiveDate,
        date_due: NaiveDate,
        lines: Vec<LineInput>,
    ) -> Result<InvoiceDetail, AppError> {
        let po = self
            .repo
            .get_purchase_order(po_id)
            .await?
            .ok_or(AppError::NotFound("Pedido de compra"))?;
        ensure_locked(&po)?;

        if self
            .repo
            .get_invoice_by_purchase_order(po_id)
            .await?
            .is_some()
        {
            return Err(AppError::InvalidStateTransition(
                "Fatura já registrada para este pedido.".to_string(),
            ));
        }

        let (prepared, total) = prepare_lines(&lines);
        self.repo
            .create_invoice(po_id, supplier_ref, date_issued, date_due, total, &prepared)
            .await
    }
}

// =============================================================================
//  Regras puras
// =============================================================================

// Fecha cada linha com total = round(quantity * unit_price, 2) e soma o
// total do documento.
pub fn prepare_lines(lines: &[LineInput]) -> (Vec<PreparedLine>, Decimal) {
    let prepared: Vec<PreparedLine> = lines
        .iter()
        .map(|line| PreparedLine {
            stock_item_id: line.stock_item_id,
            name: line.name.clone(),
            unit: line.unit.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            total: round_dp(line.quantity * line.unit_price, 2),
        })
        .collect();
    let total = prepared.iter().map(|p| p.total).sum();
    (prepared, total)
}

// Recebimento e fatura só fazem sentido contra um pedido já travado.
fn ensure_locked(po: &PurchaseOrder) -> Result<(), AppError> {
    match po.status {
        PurchaseOrderStatus::Draft => Err(AppError::InvalidStateTransition(
            "Pedido ainda em rascunho; envie ao fornecedor antes de registrar documentos."
                .to_string(),
        )),
        PurchaseOrderStatus::Cancelled => Err(AppError::InvalidStateTransition(
            "Pedido cancelado não recebe documentos.".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(qty: &str, price: &str) -> LineInput {
        LineInput {
            stock_item_id: Uuid::new_v4(),
            name: "Tomate".to_string(),
            unit: "kg".to_string(),
            quantity: d(qty),
            unit_price: d(price),
        }
    }

    fn po(status: PurchaseOrderStatus) -> PurchaseOrder {
        PurchaseOrder {
            id: Uuid::new_v4(),
            supplier_id: Uuid::new_v4(),
            date_ordered: Utc::now().date_naive(),
            status,
            total_amount: d("50.00"),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn totais_de_linha_sao_recalculados() {
        let (prepared, total) = prepare_lines(&[line("20", "2.50"), line("1.333", "3.00")]);

        assert_eq!(prepared[0].total, d("50.00"));
        // 1.333 * 3.00 = 3.999 => 4.00
        assert_eq!(prepared[1].total, d("4.00"));
        assert_eq!(total, d("54.00"));
    }

    // 0.5 * 2.25 = 1.125: arredondamento comercial sobe para 1.13
    // (banker's rounding daria 1.12 e divergiria da tela).
    #[test]
    fn arredondamento_comercial_no_meio() {
        let (prepared, _) = prepare_lines(&[line("0.5", "2.25")]);
        assert_eq!(prepared[0].total, d("1.13"));
    }

    #[test]
    fn documentos_exigem_pedido_travado() {
        assert!(matches!(
            ensure_locked(&po(PurchaseOrderStatus::Draft)),
            Err(AppError::InvalidStateTransition(_))
        ));
        assert!(matches!(
            ensure_locked(&po(PurchaseOrderStatus::Cancelled)),
            Err(AppError::InvalidStateTransition(_))
        ));
        assert!(ensure_locked(&po(PurchaseOrderStatus::Sent)).is_ok());
        assert!(ensure_locked(&po(PurchaseOrderStatus::Received)).is_ok());
    }
}
