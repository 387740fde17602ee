// src/config.rs

use crate::{
    db::{CatalogRepository, CogsRepository, CreditNoteRepository, ProcurementRepository},
    services::{
        catalog_service::CatalogService, cogs_service::CogsService,
        credit_note_service::CreditNoteService, matching_service::MatchingService,
        procurement_service::ProcurementService,
    },
};
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

// Parâmetros do motor de conciliação/projeção. Lidos do ambiente uma única
// vez e passados por valor para as funções puras (o motor nunca lê env).
#[derive(Debug, Clone)]
pub struct EngineSettings {
    // Percentual mínimo para uma conciliação com divergência ainda contar
    // como PARTIAL_MATCH. Abaixo disso o status vira DISCREPANCY.
    pub discrepancy_threshold: Decimal,

    // Similaridade mínima [0, 1] para o casamento aproximado de nomes de
    // itens (usado pelo fluxo de escaneamento de faturas).
    pub fuzzy_match_threshold: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            discrepancy_threshold: Decimal::from(80),
            fuzzy_match_threshold: 0.6,
        }
    }
}

impl EngineSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let discrepancy_threshold = env::var("MATCH_DISCREPANCY_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<Decimal>().ok())
            .unwrap_or(defaults.discrepancy_threshold);

        let fuzzy_match_threshold = env::var("FUZZY_MATCH_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(defaults.fuzzy_match_threshold);

        Self {
            discrepancy_threshold,
            fuzzy_match_threshold,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: EngineSettings,
    pub procurement_service: ProcurementService,
    pub matching_service: MatchingService,
    pub credit_note_service: CreditNoteService,
    pub cogs_service: CogsService,
    pub catalog_service: CatalogService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let settings = EngineSettings::from_env();

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let procurement_repo = ProcurementRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let credit_note_repo = CreditNoteRepository::new(db_pool.clone());
        let cogs_repo = CogsRepository::new(db_pool.clone());

        let procurement_service = ProcurementService::new(procurement_repo.clone());
        let matching_service = MatchingService::new(procurement_repo, settings.clone());
        let credit_note_service = CreditNoteService::new(credit_note_repo, matching_service.clone());
        let cogs_service = CogsService::new(cogs_repo);
        let catalog_service = CatalogService::new(catalog_repo, settings.clone());

        Ok(Self {
            db_pool,
            settings,
            procurement_service,
            matching_service,
            credit_note_service,
            cogs_service,
            catalog_service,
        })
    }
}
