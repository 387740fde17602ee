// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Catalog ---
        handlers::catalog::create_supplier,
        handlers::catalog::list_suppliers,
        handlers::catalog::create_stock_item,
        handlers::catalog::list_stock_items,
        handlers::catalog::resolve_stock_item,

        // --- Procurement ---
        handlers::procurement::create_purchase_order,
        handlers::procurement::list_purchase_orders,
        handlers::procurement::get_purchase_order,
        handlers::procurement::send_purchase_order,
        handlers::procurement::create_receiving_order,
        handlers::procurement::create_invoice,
        handlers::procurement::get_match,

        // --- Credit Notes ---
        handlers::credit_notes::draft_credit_note,
        handlers::credit_notes::create_credit_note,
        handlers::credit_notes::list_credit_notes,
        handlers::credit_notes::get_credit_note,
        handlers::credit_notes::approve_credit_note,
        handlers::credit_notes::reject_credit_note,

        // --- COGS ---
        handlers::cogs::get_history,
        handlers::cogs::get_projection,

        // --- Recipes ---
        handlers::recipes::list_recipes,
        handlers::recipes::create_recipe,
    ),
    components(
        schemas(
            // --- Catalog ---
            models::catalog::Supplier,
            models::catalog::StockItem,
            models::catalog::Recipe,
            models::catalog::RecipeSortKey,

            // --- Procurement ---
            models::procurement::PurchaseOrderStatus,
            models::procurement::ItemCondition,
            models::procurement::PurchaseOrder,
            models::procurement::PurchaseOrderItem,
            models::procurement::PurchaseOrderDetail,
            models::procurement::ReceivingOrder,
            models::procurement::ReceivingOrderItem,
            models::procurement::ReceivingOrderDetail,
            models::procurement::Invoice,
            models::procurement::InvoiceItem,
            models::procurement::InvoiceDetail,

            // --- Matching ---
            models::matching::MatchStatus,
            models::matching::DiscrepancyKind,
            models::matching::ApprovalStatus,
            models::matching::PaymentStatus,
            models::matching::Discrepancy,
            models::matching::MatchRecord,

            // --- Credit Notes ---
            models::credit_note::CreditNoteStatus,
            models::credit_note::CreditReason,
            models::credit_note::CreditNote,
            models::credit_note::CreditNoteItem,
            models::credit_note::CreditNoteDetail,
            models::credit_note::CreditNoteDraft,
            models::credit_note::CreditNoteDraftItem,
            models::credit_note::DiscrepancySelection,

            // --- COGS ---
            models::cogs::MonthlyCogsRecord,
            models::cogs::CogsProjection,

            // --- Payloads ---
            handlers::catalog::CreateSupplierPayload,
            handlers::catalog::CreateStockItemPayload,
            handlers::procurement::LineItemPayload,
            handlers::procurement::CreatePurchaseOrderPayload,
            handlers::procurement::ReceivedLineItemPayload,
            handlers::procurement::CreateReceivingPayload,
            handlers::procurement::CreateInvoicePayload,
            handlers::credit_notes::DraftFromMatchPayload,
            handlers::credit_notes::CreditNoteItemPayload,
            handlers::credit_notes::CreateCreditNotePayload,
            handlers::credit_notes::DecideCreditNotePayload,
            handlers::recipes::CreateRecipePayload,
        )
    ),
    tags(
        (name = "Catalog", description = "Fornecedores e Itens de Estoque"),
        (name = "Procurement", description = "Pedidos de Compra, Recebimentos e Faturas"),
        (name = "Matching", description = "Conciliação em Três Vias"),
        (name = "CreditNotes", description = "Notas de Crédito"),
        (name = "Cogs", description = "Análise e Projeção de CMV"),
        (name = "Recipes", description = "Fichas Técnicas")
    )
)]
pub struct ApiDoc;
