// src/services/credit_note_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{error::AppError, rounding::round_dp},
    db::CreditNoteRepository,
    models::{
        credit_note::{
            CreditNote, CreditNoteDetail, CreditNoteDraft, CreditNoteDraftItem, CreditNoteStatus,
            DiscrepancySelection,
        },
        matching::{Discrepancy, DiscrepancyKind, MatchRecord},
    },
    services::matching_service::MatchingService,
};

#[derive(Clone)]
pub struct CreditNoteService {
    repo: CreditNoteRepository,
    matching_service: MatchingService,
}

impl CreditNoteService {
    pub fn new(repo: CreditNoteRepository, matching_service: MatchingService) -> Self {
        Self {
            repo,
            matching_service,
        }
    }

    // Reconcilia o pedido agora e monta o rascunho a partir das divergências
    // selecionadas. Nada é persistido aqui.
    pub async fn draft_from_match(
        &self,
        po_id: Uuid,
        selections: &[DiscrepancySelection],
    ) -> Result<CreditNoteDraft, AppError> {
        let record = self.matching_service.match_for_purchase_order(po_id).await?;
        build_credit_note_draft(&record, selections)
    }

    pub async fn create_credit_note(
        &self,
        purchase_order_id: Uuid,
        supplier_ref: Option<&str>,
        lines: Vec<CreditNoteDraftItem>,
    ) -> Result<CreditNoteDetail, AppError> {
        if lines.is_empty() {
            return Err(selection_error("A nota precisa de ao menos uma linha."));
        }

        // Totais sempre recalculados no servidor; o que veio da tela é descartado.
        let lines: Vec<CreditNoteDraftItem> = lines
            .into_iter()
            .map(|mut line| {
                line.total = round_dp(line.quantity * line.unit_price, 2);
                line
            })
            .collect();
        let total_amount = lines.iter().map(|l| l.total).sum();

        self.repo
            .create_credit_note(
                purchase_order_id,
                supplier_ref,
                Utc::now().date_naive(),
                total_amount,
                &lines,
            )
            .await
    }

    pub async fn get_all_credit_notes(&self) -> Result<Vec<CreditNote>, AppError> {
        self.repo.get_all_credit_notes().await
    }

    pub async fn get_credit_note_detail(
        &self,
        id: Uuid,
    ) -> Result<Option<CreditNoteDetail>, AppError> {
        self.repo.get_credit_note_detail(id).await
    }

    // Pending -> Approved | Rejected. Estados decididos são terminais.
    pub async fn decide_credit_note(
        &self,
        id: Uuid,
        decision: CreditNoteStatus,
        approver: &str,
    ) -> Result<CreditNote, AppError> {
        if decision == CreditNoteStatus::Pending {
            return Err(AppError::InvalidStateTransition(
                "PENDING não é uma decisão.".to_string(),
            ));
        }

        let note = self
            .repo
            .get_credit_note(id)
            .await?
            .ok_or(AppError::NotFound("Nota de crédito"))?;

        ensure_pending(&note)?;

        self.repo
            .decide_credit_note(id, decision, approver, Utc::now())
            .await
    }
}

// =============================================================================
//  Regras puras
// =============================================================================

pub fn ensure_pending(note: &CreditNote) -> Result<(), AppError> {
    match note.status {
        CreditNoteStatus::Pending => Ok(()),
        decided => Err(AppError::InvalidStateTransition(format!(
            "Nota de crédito {} já foi decidida ({:?}); aprovação e rejeição são terminais.",
            note.id, decided
        ))),
    }
}

pub fn build_credit_note_draft(
    record: &MatchRecord,
    selections: &[DiscrepancySelection],
) -> Result<CreditNoteDraft, AppError> {
    if selections.is_empty() {
        return Err(selection_error("Selecione ao menos uma divergência."));
    }

    let mut items = Vec::with_capacity(selections.len());
    for sel in selections {
        let Some(disc) = record.discrepancies.get(sel.discrepancy_index) else {
            return Err(selection_error("Índice de divergência inválido."));
        };

        let (quantity, unit_price) = credit_basis(record, disc)?;
        items.push(CreditNoteDraftItem {
            stock_item_id: disc.stock_item_id,
            name: disc.name.clone(),
            quantity,
            unit_price,
            total: round_dp(quantity * unit_price, 2),
            reason: sel.reason,
        });
    }

    let total_amount = items.iter().map(|i| i.total).sum();
    Ok(CreditNoteDraft {
        purchase_order_id: record.purchase_order_id,
        supplier_ref: record
            .invoice
            .as_ref()
            .map(|inv| inv.header.supplier_ref.clone()),
        status: CreditNoteStatus::Pending,
        total_amount,
        items,
    })
}

// A linha de crédito nasce da magnitude da diferença:
//   - quantidade: |pedido - recebido| ao preço unitário do pedido
//     (faltaram 2kg a R$2,50 => crédito de quantity=2, price=2.50)
//   - preço: quantidade faturada x |sobrepreço unitário|
//   - item desconhecido: quantidade e preço do documento onde apareceu
fn credit_basis(record: &MatchRecord, disc: &Discrepancy) -> Result<(Decimal, Decimal), AppError> {
    match disc.kind {
        DiscrepancyKind::Quantity => {
            let quantity =
                (disc.expected.unwrap_or_default() - disc.found.unwrap_or_default()).abs();
            let unit_price = record
                .purchase_order
                .items
                .iter()
                .find(|l| l.stock_item_id == disc.stock_item_id)
                .map(|l| l.unit_price)
                .unwrap_or_default();
            Ok((quantity, unit_price))
        }
        DiscrepancyKind::Price => {
            let unit_price =
                (disc.found.unwrap_or_default() - disc.expected.unwrap_or_default()).abs();
            let quantity = record
                .invoice
                .as_ref()
                .and_then(|inv| inv.items.iter().find(|l| l.stock_item_id == disc.stock_item_id))
                .map(|l| l.quantity)
                .unwrap_or_default();
            Ok((quantity, unit_price))
        }
        DiscrepancyKind::UnknownItem => {
            if let Some(ri) = record
                .receiving_order
                .as_ref()
                .and_then(|r| r.items.iter().find(|l| l.stock_item_id == disc.stock_item_id))
            {
                return Ok((ri.quantity_received, ri.unit_price));
            }
            if let Some(fi) = record
                .invoice
                .as_ref()
                .and_then(|inv| inv.items.iter().find(|l| l.stock_item_id == disc.stock_item_id))
            {
                return Ok((fi.quantity, fi.unit_price));
            }
            Err(selection_error("Divergência sem documento de origem."))
        }
    }
}

fn selection_error(message: &'static str) -> AppError {
    let mut err = validator::ValidationError::new("selections");
    err.message = Some(message.into());
    let mut errors = validator::ValidationErrors::new();
    errors.add("selections", err);
    AppError::ValidationError(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::EngineSettings,
        models::{
            credit_note::CreditReason,
            procurement::{
                Invoice, InvoiceDetail, InvoiceItem, ItemCondition, PurchaseOrder,
                PurchaseOrderDetail, PurchaseOrderItem, PurchaseOrderStatus, ReceivingOrder,
                ReceivingOrderDetail, ReceivingOrderItem,
            },
        },
        services::matching_service::compute_match,
    };
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    // Monta um cenário com falta de 2kg de tomate e sobrepreço de R$0,30 na
    // cebola, e devolve o MatchRecord calculado.
    fn record_com_divergencias() -> MatchRecord {
        let po_id = Uuid::new_v4();
        let tomate = Uuid::new_v4();
        let cebola = Uuid::new_v4();
        let now = Utc::now();

        let po = PurchaseOrderDetail {
            header: PurchaseOrder {
                id: po_id,
                supplier_id: Uuid::new_v4(),
                date_ordered: now.date_naive(),
                status: PurchaseOrderStatus::Sent,
                total_amount: d("68.00"),
                created_at: now,
                updated_at: now,
            },
            items: vec![
                PurchaseOrderItem {
                    id: Uuid::new_v4(),
                    purchase_order_id: po_id,
                    stock_item_id: tomate,
                    name: "Tomate".to_string(),
                    unit: "kg".to_string(),
                    quantity: d("20"),
                    unit_price: d("2.50"),
                    total: d("50.00"),
                },
                PurchaseOrderItem {
                    id: Uuid::new_v4(),
                    purchase_order_id: po_id,
                    stock_item_id: cebola,
                    name: "Cebola".to_string(),
                    unit: "kg".to_string(),
                    quantity: d("10"),
                    unit_price: d("1.80"),
                    total: d("18.00"),
                },
            ],
        };

        let rec = ReceivingOrderDetail {
            header: ReceivingOrder {
                id: Uuid::new_v4(),
                purchase_order_id: po_id,
                date_received: now.date_naive(),
                received_by: "Conferente".to_string(),
                created_at: now,
            },
            items: vec![
                ReceivingOrderItem {
                    id: Uuid::new_v4(),
                    receiving_order_id: Uuid::new_v4(),
                    stock_item_id: tomate,
                    name: "Tomate".to_string(),
                    unit: "kg".to_string(),
                    quantity_ordered: d("20"),
                    quantity_received: d("18"),
                    unit_price: d("2.50"),
                    condition: ItemCondition::Good,
                },
                ReceivingOrderItem {
                    id: Uuid::new_v4(),
                    receiving_order_id: Uuid::new_v4(),
                    stock_item_id: cebola,
                    name: "Cebola".to_string(),
                    unit: "kg".to_string(),
                    quantity_ordered: d("10"),
                    quantity_received: d("10"),
                    unit_price: d("1.80"),
                    condition: ItemCondition::Good,
                },
            ],
        };

        let inv = InvoiceDetail {
            header: Invoice {
                id: Uuid::new_v4(),
                purchase_order_id: po_id,
                supplier_ref: "NF-0042".to_string(),
                date_issued: now.date_naive(),
                date_due: now.date_naive(),
                total: d("66.00"),
                created_at: now,
            },
            items: vec![
                InvoiceItem {
                    id: Uuid::new_v4(),
                    invoice_id: Uuid::new_v4(),
                    stock_item_id: tomate,
                    name: "Tomate".to_string(),
                    unit: "kg".to_string(),
                    quantity: d("18"),
                    unit_price: d("2.50"),
                    total: d("45.00"),
                },
                InvoiceItem {
                    id: Uuid::new_v4(),
                    invoice_id: Uuid::new_v4(),
                    stock_item_id: cebola,
                    name: "Cebola".to_string(),
                    unit: "kg".to_string(),
                    quantity: d("10"),
                    unit_price: d("2.10"),
                    total: d("21.00"),
                },
            ],
        };

        compute_match(&po, Some(&rec), Some(&inv), &EngineSettings::default())
    }

    fn nota(status: CreditNoteStatus) -> CreditNote {
        CreditNote {
            id: Uuid::new_v4(),
            purchase_order_id: Uuid::new_v4(),
            supplier_ref: Some("NF-0042".to_string()),
            date_issued: Utc::now().date_naive(),
            status,
            total_amount: d("5.00"),
            approver: None,
            approval_date: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn rascunho_de_falta_na_entrega() {
        let record = record_com_divergencias();
        let idx = record
            .discrepancies
            .iter()
            .position(|disc| disc.kind == DiscrepancyKind::Quantity)
            .unwrap();

        let draft = build_credit_note_draft(
            &record,
            &[DiscrepancySelection {
                discrepancy_index: idx,
                reason: CreditReason::ReturnedItems,
            }],
        )
        .unwrap();

        assert_eq!(draft.status, CreditNoteStatus::Pending);
        assert_eq!(draft.items.len(), 1);

        // Faltaram 2kg a R$2,50
        let line = &draft.items[0];
        assert_eq!(line.quantity, d("2"));
        assert_eq!(line.unit_price, d("2.50"));
        assert_eq!(line.total, d("5.00"));
        assert_eq!(draft.total_amount, d("5.00"));
        assert_eq!(draft.supplier_ref.as_deref(), Some("NF-0042"));
    }

    #[test]
    fn rascunho_de_sobrepreco() {
        let record = record_com_divergencias();
        let idx = record
            .discrepancies
            .iter()
            .position(|disc| disc.kind == DiscrepancyKind::Price)
            .unwrap();

        let draft = build_credit_note_draft(
            &record,
            &[DiscrepancySelection {
                discrepancy_index: idx,
                reason: CreditReason::PriceDiscrepancy,
            }],
        )
        .unwrap();

        // 10 unidades faturadas com R$0,30 a maior
        let line = &draft.items[0];
        assert_eq!(line.quantity, d("10"));
        assert_eq!(line.unit_price, d("0.30"));
        assert_eq!(line.total, d("3.00"));
    }

    #[test]
    fn selecao_vazia_e_rejeitada() {
        let record = record_com_divergencias();
        let result = build_credit_note_draft(&record, &[]);
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn indice_fora_da_lista_e_rejeitado() {
        let record = record_com_divergencias();
        let result = build_credit_note_draft(
            &record,
            &[DiscrepancySelection {
                discrepancy_index: 99,
                reason: CreditReason::Other,
            }],
        );
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    // Aprovada ou rejeitada, a nota não aceita nova decisão.
    #[test]
    fn nota_decidida_e_terminal() {
        let aprovada = nota(CreditNoteStatus::Approved);
        let result = ensure_pending(&aprovada);
        assert!(matches!(result, Err(AppError::InvalidStateTransition(_))));
        // O documento em si não foi tocado
        assert_eq!(aprovada.status, CreditNoteStatus::Approved);

        let rejeitada = nota(CreditNoteStatus::Rejected);
        assert!(matches!(
            ensure_pending(&rejeitada),
            Err(AppError::InvalidStateTransition(_))
        ));

        assert!(ensure_pending(&nota(CreditNoteStatus::Pending)).is_ok());
    }
}
