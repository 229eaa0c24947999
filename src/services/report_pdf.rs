//! PDF layouts of the R&S reports.

use chrono::NaiveDate;

use crate::models::vaga::{is_closed_status, VagaDetail};
use crate::services::metrics::{amount, commission, row_financials, ReportMetrics};
use crate::services::pdf_service::{FontStyle, PdfDocument, Rgb, BRAND, MUTED, POSITIVE, TEXT};
use crate::services::report_service::VagaReportBundle;
use crate::utils::format::{
    date_br, datetime_date_br, money_br, opt_datetime_date_br, or_na, plain_number,
};
use crate::utils::labels::{
    candidato_status_label, entrevista_status_label, status_label, tipo_abertura_label,
    tipo_cargo_label,
};

const DETAIL_INDENT: f32 = 12.0;

/// Closing rate as shown on reports: one decimal, plain `0` when there are no rows.
pub fn taxa_text(metrics: &ReportMetrics) -> String {
    if metrics.total == 0 {
        "0".to_string()
    } else {
        format!("{:.1}", metrics.taxa_fechamento)
    }
}

fn entry_title(doc: &mut PdfDocument, index: usize, title: &str) {
    doc.text(10.0, FontStyle::Bold, BRAND, &format!("{}. {}", index + 1, title));
}

fn detail(doc: &mut PdfDocument, line: &str) {
    doc.text_indented(DETAIL_INDENT, 9.0, FontStyle::Regular, TEXT, line);
}

fn closure_text(row: &VagaDetail) -> String {
    opt_datetime_date_br(row.vaga.data_fechamento_cancelamento, "-")
}

/// Draws the summary box and its lines, leaving the cursor below it.
fn summary(doc: &mut PdfDocument, height: f32, lines: &[(String, f32, FontStyle, Rgb)]) {
    let top = doc.summary_box(height);
    for (i, (text, size, style, color)) in lines.iter().enumerate() {
        doc.text_at(70.0, top + 15.0 + i as f32 * 20.0, *size, *style, *color, text);
    }
    doc.set_y(top + height + 15.0);
    doc.move_down(1.0);
}

pub fn general(rows: &[VagaDetail], metrics: &ReportMetrics, generated_on: NaiveDate) -> Vec<u8> {
    let mut doc = PdfDocument::new();
    doc.header("Relatório Geral R&S", None, &date_br(generated_on));

    doc.section_title("Resumo Geral");
    summary(
        &mut doc,
        130.0,
        &[
            (format!("Total de Vagas: {}", metrics.total), 11.0, FontStyle::Regular, TEXT),
            (format!("Vagas Abertas: {}", metrics.abertas), 11.0, FontStyle::Regular, TEXT),
            (format!("Vagas Fechadas: {}", metrics.fechadas), 11.0, FontStyle::Regular, TEXT),
            (format!("Vagas Canceladas: {}", metrics.canceladas), 11.0, FontStyle::Regular, TEXT),
            (format!("Taxa de Fechamento: {}%", taxa_text(metrics)), 11.0, FontStyle::Regular, TEXT),
            (
                format!("Valor Líquido Total: {}", money_br(metrics.valor_liquido_total)),
                12.0,
                FontStyle::Bold,
                POSITIVE,
            ),
        ],
    );

    doc.section_title("Detalhamento das Vagas");
    for (index, row) in rows.iter().enumerate() {
        doc.break_after(700.0);
        let vaga = &row.vaga;
        let financials = row_financials(vaga);

        entry_title(&mut doc, index, &vaga.cargo);
        detail(&mut doc, &format!("Cliente: {}", or_na(row.client_name.as_deref())));
        detail(&mut doc, &format!("Consultora: {}", or_na(row.user_name.as_deref())));
        detail(&mut doc, &format!("Status: {}", status_label(&vaga.status)));
        detail(&mut doc, &format!("Tipo: {}", tipo_cargo_label(&vaga.tipo_cargo)));
        detail(&mut doc, &format!("Data Abertura: {}", date_br(vaga.data_abertura)));
        detail(&mut doc, &format!("Data Fechamento: {}", closure_text(row)));
        detail(&mut doc, &format!("Salário: {}", money_br(amount(vaga.salario))));
        detail(
            &mut doc,
            &format!("% Faturamento: {}%", plain_number(billing_percent(row))),
        );
        detail(
            &mut doc,
            &format!("Valor Faturamento: {}", money_br(financials.valor_faturamento)),
        );
        detail(
            &mut doc,
            &format!("Imposto Estado: {}%", plain_number(financials.imposto_estado)),
        );
        detail(&mut doc, &format!("Valor Imposto: {}", money_br(financials.valor_imposto)));
        detail(&mut doc, &format!("Valor Líquido: {}", money_br(financials.valor_liquido)));
        doc.move_down(0.5);
    }

    doc.finish()
}

/// Billing percentage, 100 when unset.
pub fn billing_percent(row: &VagaDetail) -> f64 {
    row.vaga
        .porcentagem_faturamento
        .map(|p| amount(Some(p)))
        .filter(|p| *p != 0.0)
        .unwrap_or(100.0)
}

pub fn by_client(
    rows: &[VagaDetail],
    metrics: &ReportMetrics,
    client_name: &str,
    generated_on: NaiveDate,
) -> Vec<u8> {
    let mut doc = PdfDocument::new();
    doc.header(
        "Relatório R&S por Cliente",
        Some(&format!("Cliente: {}", client_name)),
        &date_br(generated_on),
    );

    doc.section_title("Resumo");
    summary(
        &mut doc,
        95.0,
        &[
            (format!("Total de Vagas: {}", metrics.total), 11.0, FontStyle::Regular, TEXT),
            (format!("Vagas Fechadas: {}", metrics.fechadas), 11.0, FontStyle::Regular, TEXT),
            (format!("Taxa de Fechamento: {}%", taxa_text(metrics)), 11.0, FontStyle::Regular, TEXT),
            (
                format!("Faturamento Total: {}", money_br(metrics.faturamento_total)),
                12.0,
                FontStyle::Bold,
                BRAND,
            ),
        ],
    );

    doc.section_title("Vagas do Cliente");
    for (index, row) in rows.iter().enumerate() {
        doc.break_after(700.0);
        let vaga = &row.vaga;
        entry_title(&mut doc, index, &vaga.cargo);
        detail(&mut doc, &format!("Status: {}", status_label(&vaga.status)));
        detail(&mut doc, &format!("Consultora: {}", or_na(row.user_name.as_deref())));
        detail(&mut doc, &format!("Salário: {}", money_br(amount(vaga.salario))));
        detail(&mut doc, &format!("Data Abertura: {}", date_br(vaga.data_abertura)));
        detail(&mut doc, &format!("Data Fechamento: {}", closure_text(row)));
        doc.move_down(0.5);
    }

    doc.finish()
}

pub fn by_consultant(
    rows: &[VagaDetail],
    metrics: &ReportMetrics,
    total_commissions: f64,
    user_name: &str,
    user_id: i64,
    generated_on: NaiveDate,
) -> Vec<u8> {
    let mut doc = PdfDocument::new();
    doc.header(
        "Relatório R&S por Consultora",
        Some(&format!("Consultora: {}", user_name)),
        &date_br(generated_on),
    );

    doc.section_title("Performance");
    summary(
        &mut doc,
        115.0,
        &[
            (format!("Total de Vagas: {}", metrics.total), 11.0, FontStyle::Regular, TEXT),
            (format!("Vagas Fechadas: {}", metrics.fechadas), 11.0, FontStyle::Regular, TEXT),
            (format!("Taxa de Fechamento: {}%", taxa_text(metrics)), 11.0, FontStyle::Regular, TEXT),
            (
                format!("Faturamento Gerado: {}", money_br(metrics.faturamento_total)),
                12.0,
                FontStyle::Bold,
                BRAND,
            ),
            (
                format!("Total de Comissões: {}", money_br(total_commissions)),
                12.0,
                FontStyle::Bold,
                POSITIVE,
            ),
        ],
    );

    doc.section_title("Vagas da Consultora");
    for (index, row) in rows.iter().enumerate() {
        doc.break_after(700.0);
        let vaga = &row.vaga;
        let c = commission(vaga, user_id);

        entry_title(&mut doc, index, &vaga.cargo);
        detail(&mut doc, &format!("Cliente: {}", or_na(row.client_name.as_deref())));
        detail(&mut doc, &format!("Status: {}", status_label(&vaga.status)));
        detail(&mut doc, &format!("Data Abertura: {}", date_br(vaga.data_abertura)));
        detail(&mut doc, &format!("Data Fechamento: {}", closure_text(row)));
        detail(&mut doc, &format!("Salário: {}", money_br(amount(vaga.salario))));
        detail(&mut doc, &format!("Valor Faturamento: {}", money_br(c.valor_faturamento)));
        detail(
            &mut doc,
            &format!("Imposto Estado: {}%", plain_number(amount(vaga.imposto_estado))),
        );
        detail(&mut doc, &format!("Valor Imposto: {}", money_br(c.valor_imposto)));
        detail(&mut doc, &format!("Valor Lucro: {}", money_br(c.valor_lucro)));
        detail(&mut doc, &format!("% Comissão: {}%", plain_number(c.percentual_comissao)));
        doc.text_indented(
            DETAIL_INDENT,
            9.0,
            FontStyle::Bold,
            POSITIVE,
            &format!("Valor Comissão: {}", money_br(c.valor_comissao)),
        );
        doc.move_down(0.5);
    }

    doc.finish()
}

pub fn open_vacancies(rows: &[VagaDetail], generated_on: NaiveDate) -> Vec<u8> {
    let mut doc = PdfDocument::new();
    doc.header(
        "Relatório de Vagas Abertas",
        Some(&format!("Total: {} vagas", rows.len())),
        &date_br(generated_on),
    );

    for (index, row) in rows.iter().enumerate() {
        doc.break_after(650.0);
        let vaga = &row.vaga;
        entry_title(&mut doc, index, &vaga.cargo);
        detail(&mut doc, &format!("Código: {}", vaga.codigo));
        detail(&mut doc, &format!("Cliente: {}", or_na(row.client_name.as_deref())));
        detail(&mut doc, &format!("Consultora: {}", or_na(row.user_name.as_deref())));
        detail(&mut doc, &format!("Tipo: {}", tipo_cargo_label(&vaga.tipo_cargo)));
        detail(&mut doc, &format!("Salário: {}", money_br(amount(vaga.salario))));
        detail(&mut doc, &format!("Aberta em: {}", date_br(vaga.data_abertura)));
        doc.move_down(0.5);
    }

    doc.finish()
}

/// The approved candidate is only highlighted once the vaga is closed.
pub fn selected_candidate(row: &VagaDetail) -> Option<&str> {
    if is_closed_status(&row.vaga.status) {
        row.candidato_aprovado_nome.as_deref()
    } else {
        None
    }
}

pub fn individual(bundle: &VagaReportBundle, generated_on: NaiveDate) -> Vec<u8> {
    let row = &bundle.vaga;
    let vaga = &row.vaga;
    let mut doc = PdfDocument::new();
    doc.header(
        "Relatório Individual de Vaga",
        Some(&format!("Código: {}", vaga.codigo)),
        &date_br(generated_on),
    );

    doc.section_title("Informações da Vaga");

    let mut lines: Vec<(String, f32, FontStyle, Rgb)> = vec![
        (format!("Código: {}", vaga.codigo), 10.0, FontStyle::Regular, TEXT),
        (format!("Cargo: {}", vaga.cargo), 10.0, FontStyle::Regular, TEXT),
        (format!("Cliente: {}", or_na(row.client_name.as_deref())), 10.0, FontStyle::Regular, TEXT),
        (
            format!("Consultora Responsável: {}", or_na(row.user_name.as_deref())),
            10.0,
            FontStyle::Regular,
            TEXT,
        ),
        (format!("Status: {}", status_label(&vaga.status)), 10.0, FontStyle::Regular, TEXT),
        (format!("Tipo de Cargo: {}", tipo_cargo_label(&vaga.tipo_cargo)), 10.0, FontStyle::Regular, TEXT),
        (
            format!("Tipo de Abertura: {}", tipo_abertura_label(&vaga.tipo_abertura)),
            10.0,
            FontStyle::Regular,
            TEXT,
        ),
        (
            format!("Fonte de Recrutamento: {}", or_na(vaga.fonte_recrutamento.as_deref())),
            10.0,
            FontStyle::Regular,
            TEXT,
        ),
        (format!("Salário: {}", money_br(amount(vaga.salario))), 10.0, FontStyle::Regular, TEXT),
        (
            format!("Porcentagem de Faturamento: {}%", plain_number(billing_percent(row))),
            10.0,
            FontStyle::Regular,
            TEXT,
        ),
        (
            format!("Valor de Faturamento: {}", money_br(amount(vaga.valor_faturamento))),
            11.0,
            FontStyle::Bold,
            BRAND,
        ),
        (format!("Data de Abertura: {}", date_br(vaga.data_abertura)), 10.0, FontStyle::Regular, TEXT),
    ];
    if let Some(closed_at) = vaga.data_fechamento_cancelamento {
        lines.push((
            format!("Data de Fechamento: {}", datetime_date_br(closed_at)),
            10.0,
            FontStyle::Regular,
            TEXT,
        ));
    }
    if let Some(name) = selected_candidate(row) {
        lines.push((
            format!("Candidato Selecionado: {}", name),
            11.0,
            FontStyle::Bold,
            POSITIVE,
        ));
    }

    let line_h = 15.0;
    let height = 30.0 + lines.len() as f32 * line_h;
    let top = doc.summary_box(height);
    for (i, (text, size, style, color)) in lines.iter().enumerate() {
        doc.text_at(70.0, top + 15.0 + i as f32 * line_h, *size, *style, *color, text);
    }
    doc.set_y(top + height + 15.0);

    doc.section_title("Candidatos");
    doc.text(
        10.0,
        FontStyle::Regular,
        MUTED,
        &format!("Total de Candidatos: {}", bundle.candidatos.len()),
    );
    doc.move_down(1.0);
    if bundle.candidatos.is_empty() {
        doc.text(9.0, FontStyle::Oblique, MUTED, "Nenhum candidato cadastrado.");
    }
    for (index, vc) in bundle.candidatos.iter().enumerate() {
        doc.break_after(680.0);
        entry_title(&mut doc, index, &vc.candidato_nome);
        detail(
            &mut doc,
            &format!("Status: {}", candidato_status_label(&vc.candidato_status)),
        );
        detail(&mut doc, &format!("Email: {}", or_na(vc.candidato_email.as_deref())));
        detail(&mut doc, &format!("Telefone: {}", or_na(vc.candidato_telefone.as_deref())));
        detail(
            &mut doc,
            &format!("Data de Inscrição: {}", datetime_date_br(vc.link.data_inscricao)),
        );
        if let Some(obs) = vc.link.observacoes.as_deref().filter(|o| !o.is_empty()) {
            detail(&mut doc, &format!("Observações: {}", obs));
        }
        doc.move_down(0.5);
    }
    doc.move_down(1.5);

    doc.section_title("Entrevistas Agendadas/Realizadas");
    if bundle.entrevistas.is_empty() {
        doc.text(9.0, FontStyle::Oblique, MUTED, "Nenhuma entrevista agendada.");
    }
    for (index, e) in bundle.entrevistas.iter().enumerate() {
        doc.break_after(680.0);
        let entrevista = &e.entrevista;
        entry_title(&mut doc, index, or_na(e.candidato_nome.as_deref()));
        detail(&mut doc, &format!("Data: {}", date_br(entrevista.data_entrevista)));
        detail(&mut doc, &format!("Horário: {}", or_na(Some(entrevista.hora_entrevista.as_str()))));
        detail(
            &mut doc,
            &format!("Status: {}", entrevista_status_label(&entrevista.status)),
        );
        if let Some(link) = entrevista.link_chamada.as_deref().filter(|l| !l.is_empty()) {
            detail(&mut doc, &format!("Link: {}", link));
        }
        if let Some(obs) = entrevista.observacoes.as_deref().filter(|o| !o.is_empty()) {
            detail(&mut doc, &format!("Observações: {}", obs));
        }
        doc.move_down(0.5);
    }
    doc.move_down(1.5);

    if let Some(obs) = vaga.observacoes.as_deref().filter(|o| !o.is_empty()) {
        doc.section_title("Observações Gerais");
        doc.text(10.0, FontStyle::Regular, TEXT, obs);
    }

    doc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidato::{VagaCandidato, VagaCandidatoDetail};
    use crate::services::metrics::{calculate_metrics, tests::vaga};
    use chrono::{TimeZone, Utc};

    fn detail_row(status: &str) -> VagaDetail {
        VagaDetail {
            vaga: vaga(status, Some(1000.0), Some(10.0)),
            client_name: None,
            user_name: Some("Marina".into()),
            candidato_aprovado_nome: Some("João".into()),
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn taxa_text_has_one_decimal() {
        let rows = vec![detail_row("fechada"), detail_row("aberta"), detail_row("aberta")];
        assert_eq!(taxa_text(&calculate_metrics(&rows)), "33.3");
        let empty: Vec<VagaDetail> = Vec::new();
        assert_eq!(taxa_text(&calculate_metrics(&empty)), "0");
    }

    #[test]
    fn billing_percent_defaults_to_full() {
        let mut row = detail_row("aberta");
        assert_eq!(billing_percent(&row), 100.0);
        row.vaga.porcentagem_faturamento = Some(rust_decimal::Decimal::new(50, 0));
        assert_eq!(billing_percent(&row), 50.0);
    }

    #[test]
    fn selected_candidate_requires_closed_status() {
        assert_eq!(selected_candidate(&detail_row("fechada_rep")), Some("João"));
        assert_eq!(selected_candidate(&detail_row("testes")), None);
    }

    #[test]
    fn long_listing_spans_pages() {
        let rows: Vec<VagaDetail> = (0..40).map(|_| detail_row("aberta")).collect();
        let metrics = calculate_metrics(&rows);
        let bytes = general(&rows, &metrics, day());
        assert!(bytes.starts_with(b"%PDF"));
        let pages = bytes.windows(9).filter(|w| *w == b"/MediaBox").count();
        assert!(pages > 1);
    }

    #[test]
    fn individual_report_renders_candidates() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        let bundle = VagaReportBundle {
            vaga: detail_row("fechada"),
            candidatos: vec![VagaCandidatoDetail {
                link: VagaCandidato {
                    id: 1,
                    vaga_id: 1,
                    candidato_id: 2,
                    status: "aprovado".into(),
                    data_inscricao: now,
                    observacoes: Some("Ótimo perfil".into()),
                    created_at: now,
                    updated_at: now,
                },
                candidato_nome: "João".into(),
                candidato_email: None,
                candidato_telefone: None,
                candidato_status: "aprovado".into(),
            }],
            entrevistas: Vec::new(),
        };
        let bytes = individual(&bundle, day());
        assert!(bytes.starts_with(b"%PDF"));
    }
}
