// src/services/cogs_service.rs

use chrono::Datelike;
use rust_decimal::Decimal;

use crate::{
    common::{error::AppError, rounding::round_dp},
    db::CogsRepository,
    models::cogs::{CogsProjection, MESES, MonthlyCogsRecord, MonthlyCogsRow},
};

#[derive(Clone)]
pub struct CogsService {
    repo: CogsRepository,
}

impl CogsService {
    pub fn new(repo: CogsRepository) -> Self {
        Self { repo }
    }

    pub async fn get_history(&self) -> Result<Vec<MonthlyCogsRecord>, AppError> {
        let rows = self.repo.get_monthly_history().await?;
        Ok(rows.into_iter().map(row_to_record).collect())
    }

    pub async fn get_projection(&self, horizon: usize) -> Result<Vec<CogsProjection>, AppError> {
        let history = self.get_history().await?;
        Ok(project_cogs(&history, horizon))
    }
}

fn row_to_record(row: MonthlyCogsRow) -> MonthlyCogsRecord {
    MonthlyCogsRecord {
        month: MESES[row.reference_month.month0() as usize].to_string(),
        percentage: cogs_percentage(row.cogs, row.sales),
        cogs: row.cogs,
        sales: row.sales,
    }
}

// round(100 * cogs / sales, 1). Mês sem venda => 0, nunca NaN/Infinity.
fn cogs_percentage(cogs: Decimal, sales: Decimal) -> Decimal {
    if sales == Decimal::ZERO {
        Decimal::ZERO
    } else {
        round_dp(cogs / sales * Decimal::from(100), 1)
    }
}

// =============================================================================
//  Projeção de CMV (função pura)
// =============================================================================
//
// Janela dos últimos 6 meses (ou menos, se o histórico for curto). O fator de
// crescimento é a média das razões mês-a-mês do CMV, pulando razões
// indefinidas (mês anterior com CMV zero); se todas forem indefinidas, o
// crescimento é 0. As vendas seguem o MESMO fator do CMV — simplificação
// herdada da tela de análise, mantida de propósito.
//
// Rótulos ciclam pelo calendário fixo a partir do último mês histórico.
pub fn project_cogs(history: &[MonthlyCogsRecord], horizon: usize) -> Vec<CogsProjection> {
    let Some(last) = history.last() else {
        return Vec::new();
    };

    let window = &history[history.len().saturating_sub(6)..];

    let mut ratios: Vec<Decimal> = Vec::new();
    for pair in window.windows(2) {
        if pair[0].cogs != Decimal::ZERO {
            ratios.push(pair[1].cogs / pair[0].cogs - Decimal::ONE);
        }
    }

    let avg_growth = if ratios.is_empty() {
        Decimal::ZERO
    } else {
        ratios.iter().copied().sum::<Decimal>() / Decimal::from(ratios.len() as u64)
    };
    let factor = Decimal::ONE + avg_growth;

    // Rótulo fora do calendário reinicia o ciclo em "Jan"
    let last_idx = MESES.iter().position(|m| *m == last.month).unwrap_or(11);

    // Acumuladores sem arredondamento, para compor (1+g)^(k+1) fielmente;
    // o arredondamento acontece só na saída.
    let mut cogs = last.cogs;
    let mut sales = last.sales;

    let mut out = Vec::with_capacity(horizon);
    for k in 0..horizon {
        cogs *= factor;
        sales *= factor;

        let rounded_cogs = round_dp(cogs, 2);
        let rounded_sales = round_dp(sales, 2);
        out.push(CogsProjection {
            month: MESES[(last_idx + 1 + k) % 12].to_string(),
            cogs: rounded_cogs,
            sales: rounded_sales,
            percentage: cogs_percentage(rounded_cogs, rounded_sales),
            is_projected: true,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn rec(month: &str, cogs: &str, sales: &str) -> MonthlyCogsRecord {
        MonthlyCogsRecord {
            month: month.to_string(),
            cogs: d(cogs),
            sales: d(sales),
            percentage: cogs_percentage(d(cogs), d(sales)),
        }
    }

    #[test]
    fn respeita_horizonte_e_calendario() {
        let history = vec![
            rec("Jan", "100", "300"),
            rec("Fev", "100", "300"),
            rec("Mar", "100", "300"),
        ];

        let out = project_cogs(&history, 6);

        assert_eq!(out.len(), 6);
        assert!(out.iter().all(|p| p.is_projected));
        let labels: Vec<&str> = out.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(labels, vec!["Abr", "Mai", "Jun", "Jul", "Ago", "Set"]);
    }

    #[test]
    fn virada_de_ano() {
        let history = vec![rec("Nov", "100", "300"), rec("Dez", "100", "300")];

        let out = project_cogs(&history, 3);
        let labels: Vec<&str> = out.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(labels, vec!["Jan", "Fev", "Mar"]);
    }

    #[test]
    fn crescimento_medio_compoe_mes_a_mes() {
        // 100 -> 110: crescimento de 10% ao mês
        let history = vec![rec("Jan", "100", "200"), rec("Fev", "110", "220")];

        let out = project_cogs(&history, 2);

        assert_eq!(out[0].cogs, d("121.00"));
        assert_eq!(out[1].cogs, d("133.10"));
        // As vendas seguem o mesmo fator
        assert_eq!(out[0].sales, d("242.00"));
        // Percentual estável quando CMV e venda crescem juntos
        assert_eq!(out[0].percentage, d("50.0"));
    }

    // Mês anterior com CMV zero: a razão é indefinida e precisa ser pulada,
    // nunca virar NaN/Infinity.
    #[test]
    fn cmv_zero_nao_contamina_o_crescimento() {
        let history = vec![rec("Jan", "0", "0"), rec("Fev", "100", "250")];

        let out = project_cogs(&history, 3);

        // Única razão era indefinida => crescimento 0, projeção plana
        assert_eq!(out.len(), 3);
        for p in &out {
            assert_eq!(p.cogs, d("100.00"));
            assert_eq!(p.sales, d("250.00"));
        }
    }

    #[test]
    fn historico_curto_nao_quebra() {
        let out = project_cogs(&[rec("Mai", "80", "240")], 4);
        assert_eq!(out.len(), 4);
        // Sem pares para comparar => plano
        assert!(out.iter().all(|p| p.cogs == d("80.00")));

        assert!(project_cogs(&[], 6).is_empty());
    }

    #[test]
    fn janela_considera_so_os_ultimos_seis_meses() {
        // Dois primeiros meses com salto enorme, depois seis meses estáveis:
        // o salto fica fora da janela e não contamina a média.
        let mut history = vec![rec("Jan", "10", "30"), rec("Fev", "500", "1500")];
        for month in ["Mar", "Abr", "Mai", "Jun", "Jul", "Ago"] {
            history.push(rec(month, "500", "1500"));
        }

        let out = project_cogs(&history, 2);
        assert_eq!(out[0].cogs, d("500.00"));
        assert_eq!(out[1].cogs, d("500.00"));
    }

    #[test]
    fn percentual_sem_vendas_e_zero() {
        let history = vec![rec("Jan", "100", "0"), rec("Fev", "100", "0")];
        let out = project_cogs(&history, 1);
        assert_eq!(out[0].percentage, Decimal::ZERO);
    }
}
