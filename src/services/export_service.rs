use crate::error::Result;
use crate::models::vaga::VagaDetail;
use crate::services::metrics::{amount, commission, row_financials, ReportMetrics};
use crate::services::report_pdf::{billing_percent, selected_candidate, taxa_text};
use crate::services::report_service::VagaReportBundle;
use crate::utils::format::{date_br, datetime_date_br, opt_datetime_date_br, or_na};
use crate::utils::labels::{
    candidato_status_label, entrevista_status_label, fonte_recrutamento_label, status_label,
    tipo_abertura_label, tipo_cargo_label,
};
use chrono::NaiveDate;
use rust_xlsxwriter::*;

const MONEY_FORMAT: &str = "R$ #,##0.00";
const PERCENT_FORMAT: &str = "0.00%";

/// One spreadsheet cell; numbers keep their type so Excel can sum them.
enum Cell {
    Text(String),
    Int(f64),
    Money(f64),
    Percent(f64),
}

fn text(value: impl Into<String>) -> Cell {
    Cell::Text(value.into())
}

struct Styles {
    title: Format,
    subtitle: Format,
    section: Format,
    header: Format,
    money: Format,
    percent: Format,
    highlight: Format,
    highlight_money: Format,
}

impl Styles {
    fn new() -> Self {
        let positive = Color::RGB(0x007A33);
        Self {
            title: Format::new()
                .set_font_size(16)
                .set_bold()
                .set_align(FormatAlign::Center),
            subtitle: Format::new()
                .set_font_size(12)
                .set_align(FormatAlign::Center),
            section: Format::new().set_bold(),
            header: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(0xD3D3D3))
                .set_border(FormatBorder::Thin),
            money: Format::new().set_num_format(MONEY_FORMAT),
            percent: Format::new().set_num_format(PERCENT_FORMAT),
            highlight: Format::new().set_bold().set_font_color(positive),
            highlight_money: Format::new()
                .set_bold()
                .set_font_color(positive)
                .set_num_format(MONEY_FORMAT),
        }
    }
}

/// Sequential row writer over one worksheet.
struct Sheet<'a> {
    ws: &'a mut Worksheet,
    styles: Styles,
    row: u32,
}

impl<'a> Sheet<'a> {
    fn new(ws: &'a mut Worksheet, name: &str, widths: &[f64]) -> Result<Self> {
        ws.set_name(name)?;
        for (i, width) in widths.iter().enumerate() {
            ws.set_column_width(i as u16, *width)?;
        }
        Ok(Self {
            ws,
            styles: Styles::new(),
            row: 0,
        })
    }

    fn banner(&mut self, title: &str, subtitle: &str, last_col: u16) -> Result<()> {
        self.ws.set_row_height(0, 26)?;
        self.ws.merge_range(0, 0, 0, last_col, title, &self.styles.title)?;
        self.ws.merge_range(1, 0, 1, last_col, subtitle, &self.styles.subtitle)?;
        self.row = 3;
        Ok(())
    }

    fn skip(&mut self) {
        self.row += 1;
    }

    fn section(&mut self, title: &str) -> Result<()> {
        self.ws
            .write_string_with_format(self.row, 0, title, &self.styles.section)?;
        self.row += 1;
        Ok(())
    }

    fn header(&mut self, columns: &[&str]) -> Result<()> {
        for (i, name) in columns.iter().enumerate() {
            self.ws
                .write_string_with_format(self.row, i as u16, *name, &self.styles.header)?;
        }
        self.row += 1;
        Ok(())
    }

    fn write(&mut self, cells: &[Cell], highlight: bool) -> Result<()> {
        for (i, cell) in cells.iter().enumerate() {
            let col = i as u16;
            match (cell, highlight) {
                (Cell::Text(v), false) => {
                    self.ws.write_string(self.row, col, v)?;
                }
                (Cell::Text(v), true) => {
                    self.ws
                        .write_string_with_format(self.row, col, v, &self.styles.highlight)?;
                }
                (Cell::Int(v), _) => {
                    self.ws.write_number(self.row, col, *v)?;
                }
                (Cell::Money(v), false) => {
                    self.ws
                        .write_number_with_format(self.row, col, *v, &self.styles.money)?;
                }
                (Cell::Money(v), true) => {
                    self.ws.write_number_with_format(
                        self.row,
                        col,
                        *v,
                        &self.styles.highlight_money,
                    )?;
                }
                (Cell::Percent(v), _) => {
                    self.ws
                        .write_number_with_format(self.row, col, *v, &self.styles.percent)?;
                }
            }
        }
        self.row += 1;
        Ok(())
    }

    fn row(&mut self, cells: &[Cell]) -> Result<()> {
        self.write(cells, false)
    }

    fn highlighted(&mut self, cells: &[Cell]) -> Result<()> {
        self.write(cells, true)
    }
}

fn closure(row: &VagaDetail) -> String {
    opt_datetime_date_br(row.vaga.data_fechamento_cancelamento, "-")
}

pub struct ExportService;

impl ExportService {
    pub fn general_xlsx(
        rows: &[VagaDetail],
        metrics: &ReportMetrics,
        generated_on: NaiveDate,
    ) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let mut sheet = Sheet::new(
            workbook.add_worksheet(),
            "Relatório Geral R&S",
            &[12.0, 30.0, 30.0, 25.0, 20.0, 15.0, 15.0, 15.0, 15.0, 15.0, 18.0, 15.0, 15.0, 15.0],
        )?;

        sheet.banner(
            "RELATÓRIO GERAL R&S",
            &format!("Gerado em: {}", date_br(generated_on)),
            13,
        )?;

        // ── Summary ──
        sheet.section("RESUMO GERAL")?;
        sheet.row(&[text("Total de Vagas:"), Cell::Int(metrics.total as f64)])?;
        sheet.row(&[text("Vagas Abertas:"), Cell::Int(metrics.abertas as f64)])?;
        sheet.row(&[text("Vagas Fechadas:"), Cell::Int(metrics.fechadas as f64)])?;
        sheet.row(&[text("Vagas Canceladas:"), Cell::Int(metrics.canceladas as f64)])?;
        sheet.row(&[
            text("Taxa de Fechamento:"),
            text(format!("{}%", taxa_text(metrics))),
        ])?;
        sheet.highlighted(&[
            text("Valor Líquido Total:"),
            Cell::Money(metrics.valor_liquido_total),
        ])?;

        // ── Detail table ──
        sheet.skip();
        sheet.section("DETALHAMENTO DAS VAGAS")?;
        sheet.skip();
        sheet.header(&[
            "Código",
            "Cargo",
            "Cliente",
            "Consultora",
            "Status",
            "Tipo",
            "Data Abertura",
            "Data Fechamento",
            "Salário",
            "% Faturamento",
            "Valor Faturamento",
            "Imposto Estado",
            "Valor Imposto",
            "Valor Líquido",
        ])?;

        for row in rows {
            let vaga = &row.vaga;
            let financials = row_financials(vaga);
            sheet.row(&[
                text(vaga.codigo.as_str()),
                text(vaga.cargo.as_str()),
                text(or_na(row.client_name.as_deref())),
                text(or_na(row.user_name.as_deref())),
                text(status_label(&vaga.status)),
                text(tipo_cargo_label(&vaga.tipo_cargo)),
                text(date_br(vaga.data_abertura)),
                text(closure(row)),
                Cell::Money(amount(vaga.salario)),
                Cell::Percent(billing_percent(row) / 100.0),
                Cell::Money(financials.valor_faturamento),
                Cell::Percent(financials.imposto_estado / 100.0),
                Cell::Money(financials.valor_imposto),
                Cell::Money(financials.valor_liquido),
            ])?;
        }

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }

    pub fn client_xlsx(
        rows: &[VagaDetail],
        metrics: &ReportMetrics,
        client_name: &str,
    ) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let mut sheet = Sheet::new(
            workbook.add_worksheet(),
            "Relatório Cliente R&S",
            &[12.0, 30.0, 20.0, 25.0, 15.0, 15.0],
        )?;

        sheet.banner(
            "RELATÓRIO R&S POR CLIENTE",
            &format!("Cliente: {}", client_name),
            5,
        )?;

        sheet.row(&[text("Total de Vagas:"), Cell::Int(metrics.total as f64)])?;
        sheet.row(&[text("Vagas Fechadas:"), Cell::Int(metrics.fechadas as f64)])?;
        sheet.row(&[
            text("Taxa de Fechamento:"),
            text(format!("{}%", taxa_text(metrics))),
        ])?;
        sheet.row(&[
            text("Faturamento Total:"),
            Cell::Money(metrics.faturamento_total),
        ])?;

        sheet.skip();
        sheet.header(&["Código", "Cargo", "Status", "Consultora", "Salário", "Data Abertura"])?;
        for row in rows {
            let vaga = &row.vaga;
            sheet.row(&[
                text(vaga.codigo.as_str()),
                text(vaga.cargo.as_str()),
                text(status_label(&vaga.status)),
                text(or_na(row.user_name.as_deref())),
                Cell::Money(amount(vaga.salario)),
                text(date_br(vaga.data_abertura)),
            ])?;
        }

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }

    pub fn consultant_xlsx(
        rows: &[VagaDetail],
        metrics: &ReportMetrics,
        total_commissions: f64,
        user_name: &str,
        user_id: i64,
    ) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let mut sheet = Sheet::new(
            workbook.add_worksheet(),
            "Relatório Consultora R&S",
            &[12.0, 30.0, 30.0, 20.0, 15.0, 15.0, 15.0, 18.0, 12.0, 15.0, 15.0, 12.0, 18.0],
        )?;

        sheet.banner(
            "RELATÓRIO R&S POR CONSULTORA",
            &format!("Consultora: {}", user_name),
            12,
        )?;

        sheet.row(&[text("Total de Vagas:"), Cell::Int(metrics.total as f64)])?;
        sheet.row(&[text("Vagas Fechadas:"), Cell::Int(metrics.fechadas as f64)])?;
        sheet.row(&[
            text("Taxa de Fechamento:"),
            text(format!("{}%", taxa_text(metrics))),
        ])?;
        sheet.row(&[
            text("Faturamento Gerado:"),
            Cell::Money(metrics.faturamento_total),
        ])?;
        sheet.highlighted(&[text("Total de Comissões:"), Cell::Money(total_commissions)])?;

        sheet.skip();
        sheet.header(&[
            "Código",
            "Cargo",
            "Cliente",
            "Status",
            "Data Abertura",
            "Data Fechamento",
            "Salário",
            "Valor Faturamento",
            "Imposto %",
            "Valor Imposto",
            "Valor Lucro",
            "% Comissão",
            "Valor Comissão",
        ])?;

        for row in rows {
            let vaga = &row.vaga;
            let c = commission(vaga, user_id);
            sheet.row(&[
                text(vaga.codigo.as_str()),
                text(vaga.cargo.as_str()),
                text(or_na(row.client_name.as_deref())),
                text(status_label(&vaga.status)),
                text(date_br(vaga.data_abertura)),
                text(closure(row)),
                Cell::Money(amount(vaga.salario)),
                Cell::Money(c.valor_faturamento),
                Cell::Percent(amount(vaga.imposto_estado) / 100.0),
                Cell::Money(c.valor_imposto),
                Cell::Money(c.valor_lucro),
                Cell::Percent(c.percentual_comissao / 100.0),
                Cell::Money(c.valor_comissao),
            ])?;
        }

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }

    pub fn open_vacancies_xlsx(rows: &[VagaDetail]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let mut sheet = Sheet::new(
            workbook.add_worksheet(),
            "Vagas Abertas",
            &[12.0, 30.0, 30.0, 25.0, 15.0, 15.0, 15.0],
        )?;

        sheet.banner(
            "RELATÓRIO DE VAGAS ABERTAS",
            &format!("Total: {} vagas abertas", rows.len()),
            6,
        )?;

        sheet.header(&[
            "Código",
            "Cargo",
            "Cliente",
            "Consultora",
            "Tipo",
            "Salário",
            "Data Abertura",
        ])?;
        for row in rows {
            let vaga = &row.vaga;
            sheet.row(&[
                text(vaga.codigo.as_str()),
                text(vaga.cargo.as_str()),
                text(or_na(row.client_name.as_deref())),
                text(or_na(row.user_name.as_deref())),
                text(tipo_cargo_label(&vaga.tipo_cargo)),
                Cell::Money(amount(vaga.salario)),
                text(date_br(vaga.data_abertura)),
            ])?;
        }

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }

    pub fn individual_xlsx(bundle: &VagaReportBundle) -> Result<Vec<u8>> {
        let row = &bundle.vaga;
        let vaga = &row.vaga;

        let mut workbook = Workbook::new();
        let mut sheet = Sheet::new(
            workbook.add_worksheet(),
            "Relatório Individual",
            &[30.0, 25.0, 30.0, 20.0, 40.0],
        )?;

        sheet.banner(
            "RELATÓRIO INDIVIDUAL DE VAGA",
            &format!("Código: {}", vaga.codigo),
            3,
        )?;

        // ── Vaga info ──
        sheet.section("INFORMAÇÕES DA VAGA")?;
        sheet.row(&[text("Código"), text(vaga.codigo.as_str())])?;
        sheet.row(&[text("Cargo"), text(vaga.cargo.as_str())])?;
        sheet.row(&[text("Cliente"), text(or_na(row.client_name.as_deref()))])?;
        sheet.row(&[
            text("Consultora Responsável"),
            text(or_na(row.user_name.as_deref())),
        ])?;
        sheet.row(&[text("Status"), text(status_label(&vaga.status))])?;
        sheet.row(&[text("Tipo de Cargo"), text(tipo_cargo_label(&vaga.tipo_cargo))])?;
        sheet.row(&[
            text("Tipo de Abertura"),
            text(tipo_abertura_label(&vaga.tipo_abertura)),
        ])?;
        sheet.row(&[
            text("Fonte de Recrutamento"),
            text(
                vaga.fonte_recrutamento
                    .as_deref()
                    .map(fonte_recrutamento_label)
                    .unwrap_or("N/A"),
            ),
        ])?;
        sheet.row(&[text("Salário"), Cell::Money(amount(vaga.salario))])?;
        sheet.row(&[
            text("Porcentagem de Faturamento"),
            Cell::Percent(billing_percent(row) / 100.0),
        ])?;
        sheet.row(&[
            text("Valor de Faturamento"),
            Cell::Money(amount(vaga.valor_faturamento)),
        ])?;
        sheet.row(&[text("Data de Abertura"), text(date_br(vaga.data_abertura))])?;
        if let Some(closed_at) = vaga.data_fechamento_cancelamento {
            sheet.row(&[text("Data de Fechamento"), text(datetime_date_br(closed_at))])?;
        }
        if let Some(name) = selected_candidate(row) {
            sheet.highlighted(&[text("Candidato Selecionado"), text(name)])?;
        }

        // ── Candidates ──
        sheet.skip();
        sheet.section("CANDIDATOS")?;
        sheet.row(&[
            text("Total de Candidatos"),
            Cell::Int(bundle.candidatos.len() as f64),
        ])?;
        if !bundle.candidatos.is_empty() {
            sheet.skip();
            sheet.header(&["Nome", "Status", "Email", "Telefone", "Data Inscrição"])?;
            for vc in &bundle.candidatos {
                sheet.row(&[
                    text(vc.candidato_nome.as_str()),
                    text(candidato_status_label(&vc.candidato_status)),
                    text(or_na(vc.candidato_email.as_deref())),
                    text(or_na(vc.candidato_telefone.as_deref())),
                    text(datetime_date_br(vc.link.data_inscricao)),
                ])?;
            }
        }

        // ── Interviews ──
        sheet.skip();
        sheet.section("ENTREVISTAS")?;
        if bundle.entrevistas.is_empty() {
            sheet.row(&[text("Nenhuma entrevista agendada")])?;
        } else {
            sheet.skip();
            sheet.header(&["Candidato", "Data", "Horário", "Status", "Link"])?;
            for e in &bundle.entrevistas {
                let entrevista = &e.entrevista;
                sheet.row(&[
                    text(or_na(e.candidato_nome.as_deref())),
                    text(date_br(entrevista.data_entrevista)),
                    text(or_na(Some(entrevista.hora_entrevista.as_str()))),
                    text(entrevista_status_label(&entrevista.status)),
                    text(entrevista.link_chamada.as_deref().unwrap_or_default()),
                ])?;
            }
        }

        if let Some(obs) = vaga.observacoes.as_deref().filter(|o| !o.is_empty()) {
            sheet.skip();
            sheet.section("OBSERVAÇÕES GERAIS")?;
            sheet.row(&[text(obs)])?;
        }

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::metrics::{calculate_metrics, tests::vaga};

    fn rows() -> Vec<VagaDetail> {
        vec![
            VagaDetail {
                vaga: vaga("fechada", Some(10000.0), Some(10.0)),
                client_name: Some("ACME Ltda".into()),
                user_name: Some("Marina".into()),
                candidato_aprovado_nome: Some("João".into()),
            },
            VagaDetail {
                vaga: vaga("aberta", None, None),
                client_name: None,
                user_name: None,
                candidato_aprovado_nome: None,
            },
        ]
    }

    #[test]
    fn every_layout_produces_a_workbook() {
        let rows = rows();
        let metrics = calculate_metrics(&rows);
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let outputs = [
            ExportService::general_xlsx(&rows, &metrics, day).unwrap(),
            ExportService::client_xlsx(&rows, &metrics, "ACME Ltda").unwrap(),
            ExportService::consultant_xlsx(&rows, &metrics, 450.0, "Marina", 7).unwrap(),
            ExportService::open_vacancies_xlsx(&rows).unwrap(),
            ExportService::individual_xlsx(&VagaReportBundle {
                vaga: rows[0].clone(),
                candidatos: Vec::new(),
                entrevistas: Vec::new(),
            })
            .unwrap(),
        ];
        for bytes in outputs {
            assert!(bytes.starts_with(b"PK"));
        }
    }

    #[test]
    fn empty_listing_still_renders() {
        let empty: Vec<VagaDetail> = Vec::new();
        let metrics = calculate_metrics(&empty);
        let bytes = ExportService::client_xlsx(&empty, &metrics, "Cliente não encontrado").unwrap();
        assert!(!bytes.is_empty());
    }
}
