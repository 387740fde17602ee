// src/services/catalog_service.rs

use std::cmp::Ordering;

use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    config::EngineSettings,
    db::CatalogRepository,
    models::catalog::{Recipe, RecipeQuery, RecipeSortKey, StockItem, Supplier},
};

#[derive(Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
    settings: EngineSettings,
}

impl CatalogService {
    pub fn new(repo: CatalogRepository, settings: EngineSettings) -> Self {
        Self { repo, settings }
    }

    pub async fn create_supplier(
        &self,
        name: &str,
        contact_email: Option<&str>,
    ) -> Result<Supplier, AppError> {
        self.repo.create_supplier(name, contact_email).await
    }

    pub async fn get_all_suppliers(&self) -> Result<Vec<Supplier>, AppError> {
        self.repo.get_all_suppliers().await
    }

    pub async fn create_stock_item(
        &self,
        sku: &str,
        name: &str,
        unit: &str,
        category: &str,
        par_level: Decimal,
    ) -> Result<StockItem, AppError> {
        self.repo
            .create_stock_item(sku, name, unit, category, par_level)
            .await
    }

    pub async fn get_all_stock_items(&self) -> Result<Vec<StockItem>, AppError> {
        self.repo.get_all_stock_items().await
    }

    // Resolve um nome vindo do escaneamento de fatura para um item do
    // cadastro, usando o limiar de similaridade configurado.
    pub async fn resolve_stock_item(&self, name: &str) -> Result<Option<StockItem>, AppError> {
        let items = self.repo.get_all_stock_items().await?;
        Ok(find_stock_item_fuzzy(name, &items, self.settings.fuzzy_match_threshold).cloned())
    }

    pub async fn create_recipe(
        &self,
        name: &str,
        category: &str,
        portion_cost: Decimal,
        sale_price: Decimal,
        margin_percentage: Decimal,
        prep_minutes: i32,
    ) -> Result<Recipe, AppError> {
        self.repo
            .create_recipe(
                name,
                category,
                portion_cost,
                sale_price,
                margin_percentage,
                prep_minutes,
            )
            .await
    }

    pub async fn list_recipes(&self, query: &RecipeQuery) -> Result<Vec<Recipe>, AppError> {
        let recipes = self.repo.get_all_recipes().await?;
        Ok(filter_and_sort_recipes(&recipes, query))
    }
}

// =============================================================================
//  Pipeline de filtro/ordenação (funções puras)
// =============================================================================

// Núcleo genérico: predicado composto + comparador, sem mutar a coleção de
// entrada. sort_by é estável: empates preservam a ordem original.
pub fn filter_and_sort<T, P, C>(items: &[T], keep: P, cmp: C) -> Vec<T>
where
    T: Clone,
    P: Fn(&T) -> bool,
    C: Fn(&T, &T) -> Ordering,
{
    let mut out: Vec<T> = items.iter().filter(|item| keep(item)).cloned().collect();
    out.sort_by(|a, b| cmp(a, b));
    out
}

// Filtros combinados por E lógico. Filtro vazio (texto em branco, zero
// categorias marcadas) significa "sem restrição", nunca "nada casa".
pub fn filter_and_sort_recipes(recipes: &[Recipe], query: &RecipeQuery) -> Vec<Recipe> {
    let text = query
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    filter_and_sort(
        recipes,
        |r| {
            text.as_ref().map_or(true, |t| {
                r.name.to_lowercase().contains(t) || r.category.to_lowercase().contains(t)
            }) && (query.categories.is_empty()
                || query
                    .categories
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(&r.category)))
                && query.max_cost.map_or(true, |max| r.portion_cost <= max)
                && query.min_margin.map_or(true, |min| r.margin_percentage >= min)
                && (!query.only_active || r.active)
        },
        recipe_comparator(query.sort),
    )
}

fn recipe_comparator(sort: RecipeSortKey) -> impl Fn(&Recipe, &Recipe) -> Ordering {
    move |a, b| match sort {
        RecipeSortKey::NameAsc => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        RecipeSortKey::NameDesc => b.name.to_lowercase().cmp(&a.name.to_lowercase()),
        RecipeSortKey::CostAsc => a.portion_cost.cmp(&b.portion_cost),
        RecipeSortKey::CostDesc => b.portion_cost.cmp(&a.portion_cost),
        RecipeSortKey::MarginDesc => b.margin_percentage.cmp(&a.margin_percentage),
    }
}

// =============================================================================
//  Casamento aproximado de nomes (fatura escaneada -> cadastro)
// =============================================================================

// Pontuação em [0, 1]: nomes iguais (normalizados) valem 1.0; um nome contido
// no outro vale no mínimo 0.8; o resto é similaridade de edição normalizada
// (1 - levenshtein / tamanho do maior). Empate: vence o primeiro da lista.
pub fn find_stock_item_fuzzy<'a>(
    query: &str,
    items: &'a [StockItem],
    threshold: f64,
) -> Option<&'a StockItem> {
    let wanted = normalize(query);
    if wanted.is_empty() {
        return None;
    }

    let mut best: Option<(&StockItem, f64)> = None;
    for item in items {
        let score = similarity(&wanted, &normalize(&item.name));
        let beats = match best {
            Some((_, best_score)) => score > best_score,
            None => true,
        };
        if beats {
            best = Some((item, score));
        }
    }

    best.filter(|(_, score)| *score >= threshold)
        .map(|(item, _)| item)
}

fn normalize(s: &str) -> String {
    s.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let edit = 1.0 - levenshtein(a, b) as f64 / len_a.max(len_b) as f64;

    if a.contains(b) || b.contains(a) {
        edit.max(0.8)
    } else {
        edit
    }
}

// Distância de edição clássica, com duas linhas de DP.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0usize; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = if ca == *cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;
    use uuid::Uuid;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn recipe(name: &str, category: &str, cost: &str, margin: &str, active: bool) -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category: category.to_string(),
            portion_cost: d(cost),
            sale_price: d(cost) * Decimal::from(4),
            margin_percentage: d(margin),
            prep_minutes: 20,
            active,
            created_at: Utc::now(),
        }
    }

    fn item(name: &str) -> StockItem {
        StockItem {
            id: Uuid::new_v4(),
            sku: "SKU-1".to_string(),
            name: name.to_string(),
            unit: "kg".to_string(),
            category: "Hortifruti".to_string(),
            par_level: d("10"),
            active: true,
            created_at: Utc::now(),
        }
    }

    // Filtro vazio é identidade: nada excluído, só ordenado.
    #[test]
    fn filtro_vazio_devolve_tudo_ordenado_por_nome() {
        let recipes = vec![
            recipe("Nhoque", "Massas", "8.00", "75", true),
            recipe("Feijoada", "Pratos", "12.00", "60", false),
            recipe("Caprese", "Saladas", "6.00", "80", true),
        ];

        let out = filter_and_sort_recipes(&recipes, &RecipeQuery::default());

        assert_eq!(out.len(), 3);
        let names: Vec<&str> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Caprese", "Feijoada", "Nhoque"]);
    }

    #[test]
    fn filtros_compoem_por_e_logico() {
        let recipes = vec![
            recipe("Nhoque", "Massas", "8.00", "75", true),
            recipe("Lasanha", "Massas", "15.00", "65", true),
            recipe("Caprese", "Saladas", "6.00", "80", true),
        ];

        let query = RecipeQuery {
            categories: vec!["Massas".to_string()],
            max_cost: Some(d("10.00")),
            ..RecipeQuery::default()
        };
        let out = filter_and_sort_recipes(&recipes, &query);

        // Só o Nhoque é Massas E custa até 10
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Nhoque");
    }

    #[test]
    fn busca_textual_cobre_nome_e_categoria() {
        let recipes = vec![
            recipe("Nhoque", "Massas", "8.00", "75", true),
            recipe("Caprese", "Saladas", "6.00", "80", true),
        ];

        let query = RecipeQuery {
            text: Some("  sala  ".to_string()),
            ..RecipeQuery::default()
        };
        let out = filter_and_sort_recipes(&recipes, &query);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Caprese");
    }

    #[test]
    fn margem_minima_e_apenas_ativas() {
        let recipes = vec![
            recipe("Nhoque", "Massas", "8.00", "75", true),
            recipe("Feijoada", "Pratos", "12.00", "60", false),
            recipe("Caprese", "Saladas", "6.00", "80", true),
        ];

        let query = RecipeQuery {
            min_margin: Some(d("70")),
            only_active: true,
            ..RecipeQuery::default()
        };
        let out = filter_and_sort_recipes(&recipes, &query);

        let names: Vec<&str> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Caprese", "Nhoque"]);
    }

    // Empate de chave preserva a ordem original (ordenação estável).
    #[test]
    fn ordenacao_estavel_em_empates() {
        let recipes = vec![
            recipe("Zeta", "Pratos", "9.00", "70", true),
            recipe("Alfa", "Pratos", "9.00", "70", true),
            recipe("Beta", "Pratos", "5.00", "70", true),
        ];

        let query = RecipeQuery {
            sort: RecipeSortKey::CostAsc,
            ..RecipeQuery::default()
        };
        let out = filter_and_sort_recipes(&recipes, &query);

        let names: Vec<&str> = out.iter().map(|r| r.name.as_str()).collect();
        // Zeta e Alfa empatam no custo e mantêm a ordem de entrada
        assert_eq!(names, vec!["Beta", "Zeta", "Alfa"]);
    }

    #[test]
    fn entrada_nao_e_mutada() {
        let recipes = vec![
            recipe("Zeta", "Pratos", "9.00", "70", true),
            recipe("Alfa", "Pratos", "5.00", "70", true),
        ];

        let _ = filter_and_sort_recipes(&recipes, &RecipeQuery::default());

        assert_eq!(recipes[0].name, "Zeta");
        assert_eq!(recipes[1].name, "Alfa");
    }

    #[test]
    fn fuzzy_casamento_exato_e_contido() {
        let items = vec![item("Tomate Italiano"), item("Cebola Roxa")];

        // Exato (ignorando caixa e espaços extras)
        let hit = find_stock_item_fuzzy("  tomate   italiano ", &items, 0.6).unwrap();
        assert_eq!(hit.name, "Tomate Italiano");

        // Contido: "tomate" está dentro de "tomate italiano"
        let hit = find_stock_item_fuzzy("Tomate", &items, 0.6).unwrap();
        assert_eq!(hit.name, "Tomate Italiano");
    }

    #[test]
    fn fuzzy_abaixo_do_limiar_nao_casa() {
        let items = vec![item("Farinha de Trigo")];
        assert!(find_stock_item_fuzzy("Picanha", &items, 0.6).is_none());
        // Consulta vazia nunca casa
        assert!(find_stock_item_fuzzy("   ", &items, 0.6).is_none());
    }

    #[test]
    fn fuzzy_empate_vence_o_primeiro() {
        let primeiro = item("Tomate");
        let primeiro_id = primeiro.id;
        let items = vec![primeiro, item("Tomate")];

        let hit = find_stock_item_fuzzy("Tomate", &items, 0.6).unwrap();
        assert_eq!(hit.id, primeiro_id);
    }

    #[test]
    fn fuzzy_erro_de_digitacao_leve() {
        let items = vec![item("Azeitona")];
        // 1 edição em 8 caracteres: similaridade 0.875
        let hit = find_stock_item_fuzzy("Azeitena", &items, 0.6).unwrap();
        assert_eq!(hit.name, "Azeitona");
    }
}
