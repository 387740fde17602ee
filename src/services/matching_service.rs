// src/services/matching_service.rs

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{error::AppError, rounding::round_dp},
    config::EngineSettings,
    db::ProcurementRepository,
    models::{
        matching::{
            ApprovalStatus, Discrepancy, DiscrepancyKind, MatchRecord, MatchStatus, PaymentStatus,
        },
        procurement::{InvoiceDetail, PurchaseOrderDetail, ReceivingOrderDetail},
    },
};

#[derive(Clone)]
pub struct MatchingService {
    repo: ProcurementRepository,
    settings: EngineSettings,
}

impl MatchingService {
    pub fn new(repo: ProcurementRepository, settings: EngineSettings) -> Self {
        Self { repo, settings }
    }

    // Busca os três documentos e roda a conciliação. Sempre recalculado a
    // partir do que está no banco agora; nenhum resultado fica em cache.
    pub async fn match_for_purchase_order(&self, po_id: Uuid) -> Result<MatchRecord, AppError> {
        let po = self
            .repo
            .get_purchase_order_detail(po_id)
            .await?
            .ok_or(AppError::NotFound("Pedido de compra"))?;

        let receiving = self.repo.get_receiving_by_purchase_order(po_id).await?;
        let invoice = self.repo.get_invoice_by_purchase_order(po_id).await?;

        Ok(compute_match(
            &po,
            receiving.as_ref(),
            invoice.as_ref(),
            &self.settings,
        ))
    }
}

// =============================================================================
//  Conciliação em três vias (função pura)
// =============================================================================
//
// Percorre as linhas do pedido e procura a contrapartida no recebimento e na
// fatura pelo stock_item_id (nunca pela posição: as linhas podem chegar em
// outra ordem, ou nem chegar).
//
// Cada linha tem duas dimensões independentes:
//   - quantidade: recebido == pedido
//   - preço: faturado == pedido
// Se o documento existe mas a linha não está nele, a dimensão fica
// indeterminada: não conta como conciliada nem gera divergência.
//
// Itens que aparecem no recebimento/fatura sem constar do pedido entram como
// UNKNOWN_ITEM, um por documento em que aparecem.
pub fn compute_match(
    po: &PurchaseOrderDetail,
    receiving: Option<&ReceivingOrderDetail>,
    invoice: Option<&InvoiceDetail>,
    settings: &EngineSettings,
) -> MatchRecord {
    let mut discrepancies: Vec<Discrepancy> = Vec::new();
    let mut matched_lines = 0usize;

    for line in &po.items {
        let received = receiving
            .and_then(|r| r.items.iter().find(|ri| ri.stock_item_id == line.stock_item_id));
        let billed = invoice
            .and_then(|f| f.items.iter().find(|fi| fi.stock_item_id == line.stock_item_id));

        let quantity_ok = received.map(|ri| {
            if ri.quantity_received == line.quantity {
                true
            } else {
                // Falta => diferença negativa; sobra => positiva
                discrepancies.push(Discrepancy {
                    kind: DiscrepancyKind::Quantity,
                    stock_item_id: line.stock_item_id,
                    name: line.name.clone(),
                    expected: Some(line.quantity),
                    found: Some(ri.quantity_received),
                    difference: round_dp(
                        (ri.quantity_received - line.quantity) * line.unit_price,
                        2,
                    ),
                });
                false
            }
        });

        let price_ok = billed.map(|fi| {
            if fi.unit_price == line.unit_price {
                true
            } else {
                // Cobrança a maior => positiva. A base é a quantidade faturada.
                discrepancies.push(Discrepancy {
                    kind: DiscrepancyKind::Price,
                    stock_item_id: line.stock_item_id,
                    name: line.name.clone(),
                    expected: Some(line.unit_price),
                    found: Some(fi.unit_price),
                    difference: round_dp((fi.unit_price - line.unit_price) * fi.quantity, 2),
                });
                false
            }
        });

        // A linha só conta como conciliada com as DUAS dimensões confirmadas.
        if quantity_ok == Some(true) && price_ok == Some(true) {
            matched_lines += 1;
        }
    }

    if let Some(rec) = receiving {
        for ri in &rec.items {
            if !po.items.iter().any(|l| l.stock_item_id == ri.stock_item_id) {
                discrepancies.push(Discrepancy {
                    kind: DiscrepancyKind::UnknownItem,
                    stock_item_id: ri.stock_item_id,
                    name: ri.name.clone(),
                    expected: None,
                    found: Some(ri.quantity_received),
                    difference: round_dp(ri.quantity_received * ri.unit_price, 2),
                });
            }
        }
    }

    if let Some(inv) = invoice {
        for fi in &inv.items {
            if !po.items.iter().any(|l| l.stock_item_id == fi.stock_item_id) {
                discrepancies.push(Discrepancy {
                    kind: DiscrepancyKind::UnknownItem,
                    stock_item_id: fi.stock_item_id,
                    name: fi.name.clone(),
                    expected: None,
                    found: Some(fi.quantity),
                    difference: round_dp(fi.quantity * fi.unit_price, 2),
                });
            }
        }
    }

    let total_lines = po.items.len();
    let match_percentage = if total_lines == 0 {
        // Pedido sem linhas: nada a divergir
        Decimal::from(100)
    } else {
        round_dp(
            Decimal::from(matched_lines as u64 * 100) / Decimal::from(total_lines as u64),
            0,
        )
    };

    let status = if receiving.is_none() || invoice.is_none() {
        MatchStatus::Incomplete
    } else if discrepancies.is_empty() && match_percentage == Decimal::from(100) {
        MatchStatus::Matched
    } else if match_percentage >= settings.discrepancy_threshold {
        MatchStatus::PartialMatch
    } else {
        MatchStatus::Discrepancy
    };

    MatchRecord {
        purchase_order_id: po.header.id,
        status,
        match_percentage,
        threshold: settings.discrepancy_threshold,
        discrepancies,
        approval_status: ApprovalStatus::Pending,
        payment_status: PaymentStatus::Unpaid,
        approver: None,
        purchase_order: po.clone(),
        receiving_order: receiving.cloned(),
        invoice: invoice.cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::procurement::{
        Invoice, InvoiceItem, ItemCondition, PurchaseOrder, PurchaseOrderItem,
        PurchaseOrderStatus, ReceivingOrder, ReceivingOrderItem,
    };
    use chrono::Utc;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn settings(threshold: i64) -> EngineSettings {
        EngineSettings {
            discrepancy_threshold: Decimal::from(threshold),
            fuzzy_match_threshold: 0.6,
        }
    }

    fn po_line(po_id: Uuid, item_id: Uuid, name: &str, qty: &str, price: &str) -> PurchaseOrderItem {
        let quantity = d(qty);
        let unit_price = d(price);
        PurchaseOrderItem {
            id: Uuid::new_v4(),
            purchase_order_id: po_id,
            stock_item_id: item_id,
            name: name.to_string(),
            unit: "kg".to_string(),
            quantity,
            unit_price,
            total: round_dp(quantity * unit_price, 2),
        }
    }

    fn po_with(po_id: Uuid, items: Vec<PurchaseOrderItem>) -> PurchaseOrderDetail {
        let total_amount = items.iter().map(|i| i.total).sum();
        PurchaseOrderDetail {
            header: PurchaseOrder {
                id: po_id,
                supplier_id: Uuid::new_v4(),
                date_ordered: Utc::now().date_naive(),
                status: PurchaseOrderStatus::Sent,
                total_amount,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            items,
        }
    }

    fn received_line(
        item_id: Uuid,
        name: &str,
        ordered: &str,
        received: &str,
        price: &str,
    ) -> ReceivingOrderItem {
        ReceivingOrderItem {
            id: Uuid::new_v4(),
            receiving_order_id: Uuid::new_v4(),
            stock_item_id: item_id,
            name: name.to_string(),
            unit: "kg".to_string(),
            quantity_ordered: d(ordered),
            quantity_received: d(received),
            unit_price: d(price),
            condition: ItemCondition::Good,
        }
    }

    fn receiving_with(po_id: Uuid, items: Vec<ReceivingOrderItem>) -> ReceivingOrderDetail {
        ReceivingOrderDetail {
            header: ReceivingOrder {
                id: Uuid::new_v4(),
                purchase_order_id: po_id,
                date_received: Utc::now().date_naive(),
                received_by: "Conferente".to_string(),
                created_at: Utc::now(),
            },
            items,
        }
    }

    fn invoice_line(item_id: Uuid, name: &str, qty: &str, price: &str) -> InvoiceItem {
        let quantity = d(qty);
        let unit_price = d(price);
        InvoiceItem {
            id: Uuid::new_v4(),
            invoice_id: Uuid::new_v4(),
            stock_item_id: item_id,
            name: name.to_string(),
            unit: "kg".to_string(),
            quantity,
            unit_price,
            total: round_dp(quantity * unit_price, 2),
        }
    }

    fn invoice_with(po_id: Uuid, items: Vec<InvoiceItem>) -> InvoiceDetail {
        let total = items.iter().map(|i| i.total).sum();
        InvoiceDetail {
            header: Invoice {
                id: Uuid::new_v4(),
                purchase_order_id: po_id,
                supplier_ref: "NF-0001".to_string(),
                date_issued: Utc::now().date_naive(),
                date_due: Utc::now().date_naive(),
                total,
                created_at: Utc::now(),
            },
            items,
        }
    }

    #[test]
    fn pedido_totalmente_conciliado() {
        let po_id = Uuid::new_v4();
        let tomate = Uuid::new_v4();
        let cebola = Uuid::new_v4();

        let po = po_with(
            po_id,
            vec![
                po_line(po_id, tomate, "Tomate", "20", "2.50"),
                po_line(po_id, cebola, "Cebola", "10", "1.80"),
            ],
        );
        // Contrapartidas em ordem trocada de propósito: o casamento é por item
        let rec = receiving_with(
            po_id,
            vec![
                received_line(cebola, "Cebola", "10", "10", "1.80"),
                received_line(tomate, "Tomate", "20", "20", "2.50"),
            ],
        );
        let inv = invoice_with(
            po_id,
            vec![
                invoice_line(cebola, "Cebola", "10", "1.80"),
                invoice_line(tomate, "Tomate", "20", "2.50"),
            ],
        );

        let record = compute_match(&po, Some(&rec), Some(&inv), &settings(80));

        assert_eq!(record.status, MatchStatus::Matched);
        assert_eq!(record.match_percentage, Decimal::from(100));
        assert!(record.discrepancies.is_empty());
    }

    #[test]
    fn documento_ausente_gera_incompleto() {
        let po_id = Uuid::new_v4();
        let tomate = Uuid::new_v4();
        let po = po_with(po_id, vec![po_line(po_id, tomate, "Tomate", "20", "2.50")]);
        let rec = receiving_with(
            po_id,
            vec![received_line(tomate, "Tomate", "20", "20", "2.50")],
        );

        // Sem fatura
        let record = compute_match(&po, Some(&rec), None, &settings(80));
        assert_eq!(record.status, MatchStatus::Incomplete);

        // Sem recebimento nem fatura
        let record = compute_match(&po, None, None, &settings(80));
        assert_eq!(record.status, MatchStatus::Incomplete);
        assert!(record.discrepancies.is_empty());
    }

    // Cenário de referência: 20kg pedidos, 18 entregues, preço correto.
    // Com o limiar padrão de 80%, a única linha divergente derruba o
    // percentual para 0 e o status para DISCREPANCY.
    #[test]
    fn falta_na_entrega_com_limiar_padrao() {
        let po_id = Uuid::new_v4();
        let tomate = Uuid::new_v4();
        let po = po_with(po_id, vec![po_line(po_id, tomate, "Tomates", "20", "2.50")]);
        let rec = receiving_with(
            po_id,
            vec![received_line(tomate, "Tomates", "20", "18", "2.50")],
        );
        let inv = invoice_with(po_id, vec![invoice_line(tomate, "Tomates", "18", "2.50")]);

        let record = compute_match(&po, Some(&rec), Some(&inv), &settings(80));

        assert_eq!(record.match_percentage, Decimal::from(0));
        assert_eq!(record.status, MatchStatus::Discrepancy);
        assert_eq!(record.discrepancies.len(), 1);

        let disc = &record.discrepancies[0];
        assert_eq!(disc.kind, DiscrepancyKind::Quantity);
        assert_eq!(disc.expected, Some(d("20")));
        assert_eq!(disc.found, Some(d("18")));
        assert_eq!(disc.difference, d("-5.00"));
    }

    #[test]
    fn convencao_de_sinais() {
        let po_id = Uuid::new_v4();
        let tomate = Uuid::new_v4();
        let cebola = Uuid::new_v4();
        let po = po_with(
            po_id,
            vec![
                po_line(po_id, tomate, "Tomate", "20", "2.50"),
                po_line(po_id, cebola, "Cebola", "10", "1.80"),
            ],
        );
        let rec = receiving_with(
            po_id,
            vec![
                received_line(tomate, "Tomate", "20", "15", "2.50"), // faltaram 5
                received_line(cebola, "Cebola", "10", "10", "1.80"),
            ],
        );
        let inv = invoice_with(
            po_id,
            vec![
                invoice_line(tomate, "Tomate", "15", "2.50"),
                invoice_line(cebola, "Cebola", "10", "2.00"), // cobrado a maior
            ],
        );

        let record = compute_match(&po, Some(&rec), Some(&inv), &settings(80));

        let falta = record
            .discrepancies
            .iter()
            .find(|disc| disc.kind == DiscrepancyKind::Quantity)
            .unwrap();
        assert!(falta.difference < Decimal::ZERO);
        assert_eq!(falta.difference, d("-12.50"));

        let sobrepreco = record
            .discrepancies
            .iter()
            .find(|disc| disc.kind == DiscrepancyKind::Price)
            .unwrap();
        assert!(sobrepreco.difference > Decimal::ZERO);
        assert_eq!(sobrepreco.difference, d("2.00"));
    }

    #[test]
    fn item_fora_do_pedido_e_sinalizado() {
        let po_id = Uuid::new_v4();
        let tomate = Uuid::new_v4();
        let intruso = Uuid::new_v4();
        let po = po_with(po_id, vec![po_line(po_id, tomate, "Tomate", "20", "2.50")]);
        let rec = receiving_with(
            po_id,
            vec![
                received_line(tomate, "Tomate", "20", "20", "2.50"),
                received_line(intruso, "Abobrinha", "0", "5", "3.00"),
            ],
        );
        let inv = invoice_with(po_id, vec![invoice_line(tomate, "Tomate", "20", "2.50")]);

        let record = compute_match(&po, Some(&rec), Some(&inv), &settings(80));

        let desconhecido = record
            .discrepancies
            .iter()
            .find(|disc| disc.kind == DiscrepancyKind::UnknownItem)
            .unwrap();
        assert_eq!(desconhecido.stock_item_id, intruso);
        assert_eq!(desconhecido.expected, None);
        assert_eq!(desconhecido.found, Some(d("5")));
        assert_eq!(desconhecido.difference, d("15.00"));

        // Com divergência presente, MATCHED está fora de questão
        assert_ne!(record.status, MatchStatus::Matched);
    }

    #[test]
    fn linha_sem_contrapartida_nao_conta_como_conciliada() {
        let po_id = Uuid::new_v4();
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let po = po_with(
            po_id,
            ids.iter()
                .enumerate()
                .map(|(n, id)| po_line(po_id, *id, &format!("Item {}", n), "10", "1.00"))
                .collect(),
        );

        // O recebimento cobre só 4 das 5 linhas; a fatura cobre todas.
        let rec = receiving_with(
            po_id,
            ids.iter()
                .take(4)
                .enumerate()
                .map(|(n, id)| received_line(*id, &format!("Item {}", n), "10", "10", "1.00"))
                .collect(),
        );
        let inv = invoice_with(
            po_id,
            ids.iter()
                .enumerate()
                .map(|(n, id)| invoice_line(*id, &format!("Item {}", n), "10", "1.00"))
                .collect(),
        );

        let record = compute_match(&po, Some(&rec), Some(&inv), &settings(80));

        // 4/5 conciliadas = 80%, sem nenhuma divergência emitida
        assert_eq!(record.match_percentage, Decimal::from(80));
        assert!(record.discrepancies.is_empty());
        // 80 >= limiar 80: divergência leve, mas nunca MATCHED
        assert_eq!(record.status, MatchStatus::PartialMatch);
    }

    // Invariante: MATCHED implica zero divergências e 100%.
    #[test]
    fn matched_implica_cem_por_cento_sem_divergencias() {
        let po_id = Uuid::new_v4();
        let tomate = Uuid::new_v4();
        let po = po_with(po_id, vec![po_line(po_id, tomate, "Tomate", "20", "2.50")]);
        let rec = receiving_with(
            po_id,
            vec![received_line(tomate, "Tomate", "20", "20", "2.50")],
        );
        let inv = invoice_with(po_id, vec![invoice_line(tomate, "Tomate", "20", "2.50")]);

        for threshold in [0, 50, 80, 100] {
            let record = compute_match(&po, Some(&rec), Some(&inv), &settings(threshold));
            if record.status == MatchStatus::Matched {
                assert!(record.discrepancies.is_empty());
                assert_eq!(record.match_percentage, Decimal::from(100));
            }
        }
    }

    #[test]
    fn percentual_arredonda_para_inteiro() {
        let po_id = Uuid::new_v4();
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let po = po_with(
            po_id,
            ids.iter()
                .enumerate()
                .map(|(n, id)| po_line(po_id, *id, &format!("Item {}", n), "10", "1.00"))
                .collect(),
        );
        // Só a primeira linha bate nas duas dimensões
        let rec = receiving_with(
            po_id,
            vec![
                received_line(ids[0], "Item 0", "10", "10", "1.00"),
                received_line(ids[1], "Item 1", "10", "8", "1.00"),
                received_line(ids[2], "Item 2", "10", "7", "1.00"),
            ],
        );
        let inv = invoice_with(
            po_id,
            ids.iter()
                .enumerate()
                .map(|(n, id)| invoice_line(*id, &format!("Item {}", n), "10", "1.00"))
                .collect(),
        );

        let record = compute_match(&po, Some(&rec), Some(&inv), &settings(80));

        // 1/3 => 33.33... => 33
        assert_eq!(record.match_percentage, Decimal::from(33));
    }
}
