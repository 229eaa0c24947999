//! Aggregations over already-fetched vaga rows. Shared by the R&S reports, the
//! statistics endpoint and the dashboard.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::Serialize;

use crate::models::vaga::{
    is_closed_status, Vaga, ACTIVE_STATUSES, IN_PROGRESS_STATUSES, STATUS_ABERTA,
    STATUS_CANCELADA_CLIENTE,
};
use crate::utils::time::{same_month, start_of_day};

pub const COMMISSION_PERCENT: f64 = 5.0;
const MS_PER_DAY: u64 = 86_400_000;

pub fn amount(value: Option<Decimal>) -> f64 {
    value.and_then(|d| d.to_f64()).unwrap_or(0.0)
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn percent_of(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Billing, state tax and net value of one vaga. Missing numbers count as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RowFinancials {
    pub valor_faturamento: f64,
    pub imposto_estado: f64,
    pub valor_imposto: f64,
    pub valor_liquido: f64,
}

pub fn row_financials(vaga: &Vaga) -> RowFinancials {
    let valor_faturamento = amount(vaga.valor_faturamento);
    let imposto_estado = amount(vaga.imposto_estado);
    let valor_imposto = valor_faturamento * (imposto_estado / 100.0);
    RowFinancials {
        valor_faturamento,
        imposto_estado,
        valor_imposto,
        valor_liquido: valor_faturamento - valor_imposto,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportMetrics {
    pub total: usize,
    pub abertas: usize,
    pub fechadas: usize,
    pub canceladas: usize,
    pub taxa_fechamento: f64,
    pub faturamento_total: f64,
    pub imposto_total: f64,
    pub valor_liquido_total: f64,
}

pub fn calculate_metrics<V: AsRef<Vaga>>(rows: &[V]) -> ReportMetrics {
    let mut metrics = ReportMetrics {
        total: rows.len(),
        ..Default::default()
    };

    for row in rows {
        let vaga = row.as_ref();
        match vaga.status.as_str() {
            STATUS_ABERTA => metrics.abertas += 1,
            STATUS_CANCELADA_CLIENTE => metrics.canceladas += 1,
            status if is_closed_status(status) => metrics.fechadas += 1,
            _ => {}
        }

        let financials = row_financials(vaga);
        metrics.faturamento_total += financials.valor_faturamento;
        metrics.imposto_total += financials.valor_imposto;
        metrics.valor_liquido_total += financials.valor_liquido;
    }

    metrics.taxa_fechamento = round1(percent_of(metrics.fechadas, metrics.total));
    metrics
}

/// Consultant commission on one vaga: a fixed share of the profit
/// (billing minus state tax).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Commission {
    pub user_id: i64,
    pub percentual_comissao: f64,
    pub valor_faturamento: f64,
    pub valor_imposto: f64,
    pub valor_lucro: f64,
    pub valor_comissao: f64,
}

pub fn commission(vaga: &Vaga, user_id: i64) -> Commission {
    let financials = row_financials(vaga);
    let valor_lucro = financials.valor_faturamento - financials.valor_imposto;
    Commission {
        user_id,
        percentual_comissao: COMMISSION_PERCENT,
        valor_faturamento: financials.valor_faturamento,
        valor_imposto: financials.valor_imposto,
        valor_lucro,
        valor_comissao: valor_lucro * (COMMISSION_PERCENT / 100.0),
    }
}

/// Only closed vagas earn commission.
pub fn total_commissions<V: AsRef<Vaga>>(rows: &[V], user_id: i64) -> f64 {
    rows.iter()
        .map(AsRef::as_ref)
        .filter(|vaga| is_closed_status(&vaga.status))
        .map(|vaga| commission(vaga, user_id).valor_comissao)
        .sum()
}

/// Whether the closure date (UTC calendar day) falls inside the inclusive range.
/// A vaga without a closure date never matches.
pub fn closed_within(vaga: &Vaga, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    let Some(closed_at) = vaga.data_fechamento_cancelamento else {
        return false;
    };
    let day = closed_at.date_naive();
    start.map_or(true, |s| day >= s) && end.map_or(true, |e| day <= e)
}

pub fn filter_by_closure_date<V: AsRef<Vaga>>(
    rows: Vec<V>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<V> {
    if start.is_none() && end.is_none() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| closed_within(row.as_ref(), start, end))
        .collect()
}

/// Whole days (rounded up) between opening and closing of a closed vaga.
pub fn closing_days(vaga: &Vaga) -> Option<i64> {
    if !is_closed_status(&vaga.status) {
        return None;
    }
    let closed_at = vaga.data_fechamento_cancelamento?;
    let opened_at = start_of_day(vaga.data_abertura);
    let elapsed_ms = (closed_at - opened_at).num_milliseconds().unsigned_abs();
    Some(elapsed_ms.div_ceil(MS_PER_DAY) as i64)
}

pub fn average_closing_days<V: AsRef<Vaga>>(rows: &[V]) -> i64 {
    let days: Vec<i64> = rows
        .iter()
        .filter_map(|row| closing_days(row.as_ref()))
        .collect();
    if days.is_empty() {
        return 0;
    }
    (days.iter().sum::<i64>() as f64 / days.len() as f64).round() as i64
}

pub fn conversion_rate(closed: usize, total: usize) -> i64 {
    percent_of(closed, total).round() as i64
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VagaStatistics {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_tipo_cargo: BTreeMap<String, usize>,
    pub total_faturamento: f64,
    pub total_impostos: f64,
    pub avg_salario: f64,
    pub total_vagas_abertas: usize,
    pub total_vagas_fechadas: usize,
    pub vagas_fechadas_mes: usize,
    pub tempo_medio_fechamento: i64,
    pub taxa_conversao: i64,
}

pub fn vaga_statistics<V: AsRef<Vaga>>(rows: &[V], today: NaiveDate) -> VagaStatistics {
    let mut stats = VagaStatistics {
        total: rows.len(),
        ..Default::default()
    };
    let mut salary_sum = 0.0;

    for row in rows {
        let vaga = row.as_ref();
        *stats.by_status.entry(vaga.status.clone()).or_default() += 1;
        *stats.by_tipo_cargo.entry(vaga.tipo_cargo.clone()).or_default() += 1;

        let financials = row_financials(vaga);
        stats.total_faturamento += financials.valor_faturamento;
        stats.total_impostos += financials.valor_imposto;
        salary_sum += amount(vaga.salario);

        if ACTIVE_STATUSES.contains(&vaga.status.as_str()) {
            stats.total_vagas_abertas += 1;
        }
        if is_closed_status(&vaga.status) {
            stats.total_vagas_fechadas += 1;
            if vaga
                .data_fechamento_cancelamento
                .is_some_and(|closed_at| same_month(closed_at.date_naive(), today))
            {
                stats.vagas_fechadas_mes += 1;
            }
        }
    }

    if stats.total > 0 {
        stats.avg_salario = salary_sum / stats.total as f64;
    }
    stats.tempo_medio_fechamento = average_closing_days(rows);
    stats.taxa_conversao = conversion_rate(stats.total_vagas_fechadas, stats.total);
    stats
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bucket {
    pub count: usize,
    pub percent: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VagaBuckets {
    pub total: usize,
    pub abertas: Bucket,
    pub em_processo: Bucket,
    pub fechadas: Bucket,
}

fn count_status<V: AsRef<Vaga>>(rows: &[V], pred: impl Fn(&str) -> bool) -> usize {
    rows.iter()
        .filter(|row| pred(row.as_ref().status.as_str()))
        .count()
}

pub fn vaga_buckets<V: AsRef<Vaga>>(rows: &[V]) -> VagaBuckets {
    let total = rows.len();
    let bucket = |count: usize| Bucket {
        count,
        percent: percent_of(count, total).round() as i64,
    };

    VagaBuckets {
        total,
        abertas: bucket(count_status(rows, |s| s == STATUS_ABERTA)),
        em_processo: bucket(count_status(rows, |s| IN_PROGRESS_STATUSES.contains(&s))),
        fechadas: bucket(count_status(rows, is_closed_status)),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyVagas {
    pub month: String,
    pub abertas: usize,
    pub fechadas: usize,
}

/// Opened and closed counts for the `months` calendar months ending at `today`'s month.
pub fn monthly_vagas<V: AsRef<Vaga>>(rows: &[V], today: NaiveDate, months: u32) -> Vec<MonthlyVagas> {
    let first_of_month = today.with_day(1).unwrap_or(today);
    (0..months)
        .rev()
        .filter_map(|back| first_of_month.checked_sub_months(Months::new(back)))
        .map(|month| MonthlyVagas {
            month: month.format("%Y-%m").to_string(),
            abertas: rows
                .iter()
                .filter(|row| same_month(row.as_ref().data_abertura, month))
                .count(),
            fechadas: rows
                .iter()
                .map(AsRef::as_ref)
                .filter(|vaga| is_closed_status(&vaga.status))
                .filter(|vaga| {
                    vaga.data_fechamento_cancelamento
                        .is_some_and(|closed_at| same_month(closed_at.date_naive(), month))
                })
                .count(),
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::prelude::FromPrimitive;

    fn dec(value: f64) -> Decimal {
        Decimal::from_f64(value).unwrap()
    }

    pub(crate) fn vaga(status: &str, faturamento: Option<f64>, imposto: Option<f64>) -> Vaga {
        let created = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        Vaga {
            id: 1,
            codigo: "VAG-2024-0001".into(),
            client_id: 1,
            contract_id: None,
            user_id: 7,
            cargo: "Analista".into(),
            tipo_cargo: "administrativo".into(),
            tipo_abertura: "nova".into(),
            status: status.into(),
            fonte_recrutamento: None,
            salario: None,
            pretensao_salarial: None,
            data_abertura: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            data_fechamento_cancelamento: None,
            candidato_aprovado_id: None,
            observacoes: None,
            porcentagem_faturamento: None,
            valor_faturamento: faturamento.map(dec),
            sigilosa: false,
            imposto_estado: imposto.map(dec),
            unique_token: None,
            token_expires_at: None,
            is_public: false,
            created_by: None,
            updated_by: None,
            created_at: created,
            updated_at: created,
        }
    }

    fn closed_at(mut v: Vaga, ts: DateTime<Utc>) -> Vaga {
        v.data_fechamento_cancelamento = Some(ts);
        v
    }

    fn scenario() -> Vec<Vaga> {
        vec![
            vaga("fechada", Some(10000.0), Some(10.0)),
            vaga("aberta", Some(5000.0), Some(20.0)),
            vaga("cancelada_cliente", Some(8000.0), Some(5.0)),
        ]
    }

    #[test]
    fn three_row_scenario() {
        let metrics = calculate_metrics(&scenario());
        assert_eq!(metrics.total, 3);
        assert_eq!(metrics.fechadas, 1);
        assert_eq!(metrics.abertas, 1);
        assert_eq!(metrics.canceladas, 1);
        assert_eq!(metrics.taxa_fechamento, 33.3);
        assert!((metrics.valor_liquido_total - 20600.0).abs() < 1e-6);
        assert!((metrics.faturamento_total - 23000.0).abs() < 1e-6);
        assert!((metrics.imposto_total - 2400.0).abs() < 1e-6);
    }

    #[test]
    fn total_matches_row_count_and_buckets_never_exceed_it() {
        let rows = vec![
            vaga("aberta", None, None),
            vaga("testes", None, None),
            vaga("standby", None, None),
            vaga("fechada_rep", None, None),
            vaga("nao_cobrada", None, None),
        ];
        let metrics = calculate_metrics(&rows);
        assert_eq!(metrics.total, rows.len());
        assert!(metrics.abertas + metrics.fechadas + metrics.canceladas <= metrics.total);
        assert_eq!(metrics.fechadas, 1);
        assert_eq!(metrics.taxa_fechamento, 20.0);
    }

    #[test]
    fn empty_rows_have_zero_rate() {
        let rows: Vec<Vaga> = Vec::new();
        let metrics = calculate_metrics(&rows);
        assert_eq!(metrics.total, 0);
        assert_eq!(metrics.taxa_fechamento, 0.0);
        assert_eq!(conversion_rate(0, 0), 0);
        assert_eq!(average_closing_days(&rows), 0);
    }

    #[test]
    fn missing_numbers_count_as_zero() {
        let financials = row_financials(&vaga("aberta", None, Some(12.0)));
        assert_eq!(financials.valor_faturamento, 0.0);
        assert_eq!(financials.valor_imposto, 0.0);
        assert_eq!(financials.valor_liquido, 0.0);

        let untaxed = row_financials(&vaga("aberta", Some(1500.0), None));
        assert_eq!(untaxed.valor_liquido, 1500.0);
    }

    #[test]
    fn net_total_equals_billing_minus_tax() {
        let rows = vec![
            vaga("fechada", Some(1234.56), Some(7.5)),
            vaga("aberta", Some(999.99), Some(18.0)),
            vaga("testes", Some(0.1), Some(33.3)),
        ];
        let metrics = calculate_metrics(&rows);
        let per_row: f64 = rows.iter().map(|v| row_financials(v).valor_liquido).sum();
        assert!((metrics.valor_liquido_total - per_row).abs() < 1e-9);
        assert!(
            (metrics.valor_liquido_total - (metrics.faturamento_total - metrics.imposto_total))
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn commission_is_five_percent_of_profit() {
        let c = commission(&vaga("fechada", Some(10000.0), Some(10.0)), 7);
        assert_eq!(c.percentual_comissao, 5.0);
        assert!((c.valor_imposto - 1000.0).abs() < 1e-9);
        assert!((c.valor_lucro - 9000.0).abs() < 1e-9);
        assert!((c.valor_comissao - 450.0).abs() < 1e-9);
    }

    #[test]
    fn commission_total_only_counts_closed_rows() {
        let rows = vec![
            vaga("fechada", Some(10000.0), Some(10.0)),
            vaga("fechada_rep", Some(2000.0), None),
            vaga("aberta", Some(5000.0), Some(20.0)),
            vaga("cancelada_cliente", Some(8000.0), Some(5.0)),
        ];
        assert!((total_commissions(&rows, 7) - 550.0).abs() < 1e-9);
    }

    #[test]
    fn closure_date_range_uses_utc_calendar_day() {
        let row = closed_at(
            vaga("fechada", None, None),
            Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap(),
        );
        let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day);
        assert!(closed_within(&row, d(3, 1), d(3, 31)));
        assert!(!closed_within(&row, None, d(2, 28)));
        assert!(closed_within(&row, d(3, 15), d(3, 15)));
        assert!(closed_within(&row, None, None));
    }

    #[test]
    fn date_filter_drops_rows_without_closure() {
        let rows = vec![
            closed_at(
                vaga("fechada", None, None),
                Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap(),
            ),
            vaga("aberta", None, None),
        ];
        let start = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert_eq!(filter_by_closure_date(rows.clone(), start, None).len(), 1);
        assert_eq!(filter_by_closure_date(rows, None, None).len(), 2);
    }

    #[test]
    fn closing_days_round_up_partial_days() {
        // opened 2024-01-10, closed ten days and two hours later
        let row = closed_at(
            vaga("fechada", None, None),
            Utc.with_ymd_and_hms(2024, 1, 20, 2, 0, 0).unwrap(),
        );
        assert_eq!(closing_days(&row), Some(11));

        let exact = closed_at(
            vaga("fechada_rep", None, None),
            Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap(),
        );
        assert_eq!(closing_days(&exact), Some(10));

        let cancelled = closed_at(
            vaga("cancelada_cliente", None, None),
            Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap(),
        );
        assert_eq!(closing_days(&cancelled), None);
        assert_eq!(average_closing_days(&[row, exact, cancelled]), 11);
    }

    #[test]
    fn statistics_follow_active_and_closed_sets() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let mut a = vaga("aberta", Some(1000.0), Some(10.0));
        a.salario = Some(dec(3000.0));
        let mut b = vaga("standby", None, None);
        b.tipo_cargo = "comercial".into();
        b.salario = Some(dec(5000.0));
        let c = closed_at(
            vaga("fechada", Some(2000.0), None),
            Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap(),
        );
        let d = closed_at(
            vaga("fechada_rep", None, None),
            Utc.with_ymd_and_hms(2024, 2, 9, 0, 0, 0).unwrap(),
        );

        let stats = vaga_statistics(&[a, b, c, d], today);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_status.get("aberta"), Some(&1));
        assert_eq!(stats.by_tipo_cargo.get("administrativo"), Some(&3));
        assert_eq!(stats.by_tipo_cargo.get("comercial"), Some(&1));
        assert_eq!(stats.total_vagas_abertas, 2);
        assert_eq!(stats.total_vagas_fechadas, 2);
        assert_eq!(stats.vagas_fechadas_mes, 1);
        assert!((stats.total_faturamento - 3000.0).abs() < 1e-9);
        assert!((stats.total_impostos - 100.0).abs() < 1e-9);
        assert!((stats.avg_salario - 2000.0).abs() < 1e-9);
        // 52 and 30 days
        assert_eq!(stats.tempo_medio_fechamento, 41);
        assert_eq!(stats.taxa_conversao, 50);
    }

    #[test]
    fn statistics_serialize_camel_case() {
        let stats = vaga_statistics::<Vaga>(&[], NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("byStatus").is_some());
        assert!(json.get("tempoMedioFechamento").is_some());
        assert_eq!(json["taxaConversao"], 0);
    }

    #[test]
    fn buckets_split_open_in_progress_and_closed() {
        let rows = vec![
            vaga("aberta", None, None),
            vaga("entrevista_nc", None, None),
            vaga("testes", None, None),
            vaga("fechada", None, None),
        ];
        let buckets = vaga_buckets(&rows);
        assert_eq!(buckets.total, 4);
        assert_eq!(buckets.abertas, Bucket { count: 1, percent: 25 });
        assert_eq!(buckets.em_processo, Bucket { count: 2, percent: 50 });
        assert_eq!(buckets.fechadas, Bucket { count: 1, percent: 25 });
    }

    #[test]
    fn monthly_series_covers_trailing_months() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let closed = closed_at(
            vaga("fechada", None, None),
            Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap(),
        );
        let series = monthly_vagas(&[closed], today, 6);
        assert_eq!(series.len(), 6);
        assert_eq!(series[0].month, "2023-10");
        assert_eq!(series[3].month, "2024-01");
        assert_eq!(series[3].abertas, 1);
        assert_eq!(series[5].month, "2024-03");
        assert_eq!(series[5].fechadas, 1);
    }
}
