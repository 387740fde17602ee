//src/main.rs

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

// Importações principais
use crate::config::AppState;
use crate::docs::ApiDoc;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
    tracing::info!(
        "Limiar de conciliação: {}% | similaridade mínima: {}",
        app_state.settings.discrepancy_threshold,
        app_state.settings.fuzzy_match_threshold
    );

    // Cadastros (fornecedores, itens de estoque)
    let catalog_routes = Router::new()
        .route("/suppliers"
               ,post(handlers::catalog::create_supplier)
               .get(handlers::catalog::list_suppliers)
        )
        .route("/stock-items"
               ,post(handlers::catalog::create_stock_item)
               .get(handlers::catalog::list_stock_items)
        )
        .route("/stock-items/resolve"
               ,get(handlers::catalog::resolve_stock_item)
        );

    // Compras: pedido -> envio -> recebimento -> fatura -> conciliação
    let procurement_routes = Router::new()
        .route("/"
               ,post(handlers::procurement::create_purchase_order)
               .get(handlers::procurement::list_purchase_orders)
        )
        .route("/{id}", get(handlers::procurement::get_purchase_order))
        .route("/{id}/send", post(handlers::procurement::send_purchase_order))
        .route("/{id}/receiving", post(handlers::procurement::create_receiving_order))
        .route("/{id}/invoice", post(handlers::procurement::create_invoice))
        .route("/{id}/match", get(handlers::procurement::get_match));

    let credit_note_routes = Router::new()
        .route("/"
               ,post(handlers::credit_notes::create_credit_note)
               .get(handlers::credit_notes::list_credit_notes)
        )
        .route("/draft", post(handlers::credit_notes::draft_credit_note))
        .route("/{id}", get(handlers::credit_notes::get_credit_note))
        .route("/{id}/approve", post(handlers::credit_notes::approve_credit_note))
        .route("/{id}/reject", post(handlers::credit_notes::reject_credit_note));

    let cogs_routes = Router::new()
        .route("/history", get(handlers::cogs::get_history))
        .route("/projection", get(handlers::cogs::get_projection));

    let recipe_routes = Router::new()
        .route("/"
               ,post(handlers::recipes::create_recipe)
               .get(handlers::recipes::list_recipes)
        );

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", catalog_routes)
        .nest("/api/purchase-orders", procurement_routes)
        .nest("/api/credit-notes", credit_note_routes)
        .nest("/api/cogs", cogs_routes)
        .nest("/api/recipes", recipe_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
