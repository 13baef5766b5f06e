//! Spreadsheet export of a projection
//!
//! The sheet has three blocks separated by blank rows: the input parameters,
//! the 1-year monthly table and the 10-year table. Every row is tagged with
//! its block and role. The xlsx writer turns those tags into header fill,
//! bold totals, borders and alignment; the CSV writer only emits values.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDateTime;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::error::ExportError;
use crate::policy::input::{format_decimal_comma, format_grouped, format_percent};
use crate::policy::CalculationParams;
use crate::projection::{CombinedProjection, MonthlyDetail, TOTAL_LABEL};

/// Worksheet name of the xlsx export
pub const SHEET_NAME: &str = "Police_Bilanco_Simulasyonu";

/// Width of every used column, in characters
pub const COLUMN_WIDTH: f64 = 19.0;

/// Header fill colour
pub const HEADER_FILL: u32 = 0x4A5568;

const CURRENCY_FORMAT: &str = "#,##0.00\" $\"";

/// Output file type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }
}

const PARAMS_HEADERS: [&str; 2] = ["Parametre", "Değer"];

const ONE_YEAR_HEADERS: [&str; 7] = [
    "Ay",
    "Ödenen Prim ($)",
    "Vergi Dilimi (%)",
    "Vergi İadesi ($)",
    "Kâr Payı ($)",
    "Gider Payı ($)",
    "Poliçe Tutarı ($)",
];

const TEN_YEAR_HEADERS: [&str; 6] = [
    "Yıl",
    "Yıllık Ödenen Prim ($)",
    "Yıllık Vergi İadesi ($)",
    "Yıllık Kâr Payı ($)",
    "Yıllık Gider Payı ($)",
    "Poliçe Tutarı ($)",
];

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format!("{:.2}", n),
            Cell::Empty => String::new(),
        }
    }
}

/// Role of a row within its block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Header,
    Body,
    Total,
    Blank,
}

/// Table a row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetBlock {
    Parameters,
    OneYear,
    TenYear,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub block: SheetBlock,
    pub kind: RowKind,
    pub cells: Vec<Cell>,
}

impl SheetRow {
    fn header(block: SheetBlock, labels: &[&str]) -> Self {
        Self {
            block,
            kind: RowKind::Header,
            cells: labels.iter().map(|l| Cell::text(*l)).collect(),
        }
    }

    fn body(block: SheetBlock, cells: Vec<Cell>) -> Self {
        Self {
            block,
            kind: RowKind::Body,
            cells,
        }
    }

    fn total(block: SheetBlock, cells: Vec<Cell>) -> Self {
        Self {
            block,
            kind: RowKind::Total,
            cells,
        }
    }

    fn blank(block: SheetBlock) -> Self {
        Self {
            block,
            kind: RowKind::Blank,
            cells: Vec::new(),
        }
    }
}

/// Presentation of one cell in the styled sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellStyle {
    pub header: bool,
    pub bold: bool,
    pub align_left: bool,
    pub currency: bool,
}

impl CellStyle {
    /// Style for column `col` of `row`
    pub fn for_cell(row: &SheetRow, col: usize) -> Self {
        let cell = row.cells.get(col);
        let left_columns = match row.block {
            SheetBlock::Parameters => 2,
            SheetBlock::OneYear | SheetBlock::TenYear => 1,
        };
        let is_percent = matches!(cell, Some(Cell::Text(s)) if s.contains('%'));

        Self {
            header: row.kind == RowKind::Header,
            bold: matches!(row.kind, RowKind::Header | RowKind::Total),
            align_left: col < left_columns && !is_percent,
            currency: col > 0 && matches!(cell, Some(Cell::Number(n)) if *n > 0.0),
        }
    }

    fn to_format(self) -> Format {
        let mut format = Format::new()
            .set_border(FormatBorder::Thin)
            .set_align(if self.align_left { FormatAlign::Left } else { FormatAlign::Right });
        if self.header {
            format = format
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(HEADER_FILL));
        }
        if self.bold {
            format = format.set_bold();
        }
        if self.currency {
            format = format.set_num_format(CURRENCY_FORMAT);
        }
        format
    }
}

/// The full export sheet
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionSheet {
    rows: Vec<SheetRow>,
}

impl ProjectionSheet {
    /// Lay out parameters and both projections
    pub fn build(params: &CalculationParams, projection: &CombinedProjection) -> Self {
        let mut rows = Vec::new();

        rows.push(SheetRow::header(SheetBlock::Parameters, &PARAMS_HEADERS));
        for (label, value) in parameter_rows(params) {
            rows.push(SheetRow::body(
                SheetBlock::Parameters,
                vec![Cell::text(label), Cell::Text(value)],
            ));
        }

        rows.push(SheetRow::blank(SheetBlock::Parameters));
        rows.push(SheetRow::header(SheetBlock::OneYear, &ONE_YEAR_HEADERS));
        for detail in &projection.one_year.monthly_details {
            rows.push(monthly_row(detail));
        }

        rows.push(SheetRow::blank(SheetBlock::OneYear));
        rows.push(SheetRow::header(SheetBlock::TenYear, &TEN_YEAR_HEADERS));
        for year in &projection.ten_year.yearly_data {
            rows.push(SheetRow::body(
                SheetBlock::TenYear,
                vec![
                    Cell::Text(format!("{}. Yıl", year.year)),
                    Cell::Number(year.premium_usd),
                    Cell::Number(year.rebate_usd),
                    Cell::Number(year.profit_usd),
                    Cell::Number(year.expense_usd),
                    Cell::Number(year.end_policy_value_usd),
                ],
            ));
        }
        let totals = &projection.ten_year.totals_usd;
        rows.push(SheetRow::total(
            SheetBlock::TenYear,
            vec![
                Cell::text(TOTAL_LABEL),
                Cell::Number(totals.premium),
                Cell::Number(totals.rebate),
                Cell::Number(totals.profit),
                Cell::Number(totals.expense),
                Cell::Number(totals.policy_value),
            ],
        ));

        Self { rows }
    }

    pub fn rows(&self) -> &[SheetRow] {
        &self.rows
    }

    /// Widest row, used to pad every CSV record to the same length
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// Write the sheet as CSV
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        let width = self.width();
        let mut csv_writer = csv::Writer::from_writer(writer);

        for row in &self.rows {
            let mut record: Vec<String> = row.cells.iter().map(Cell::render).collect();
            record.resize(width, String::new());
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Styled workbook with a single sheet named [`SHEET_NAME`]
    pub fn to_workbook(&self) -> Result<Workbook, ExportError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;
        self.write_worksheet(worksheet)?;
        Ok(workbook)
    }

    fn write_worksheet(&self, worksheet: &mut Worksheet) -> Result<(), ExportError> {
        for col in 0..self.width() {
            worksheet.set_column_width(col as u16, COLUMN_WIDTH)?;
        }

        for (r, row) in self.rows.iter().enumerate() {
            if row.kind == RowKind::Blank {
                continue;
            }
            let r = r as u32;
            for (c, cell) in row.cells.iter().enumerate() {
                let format = CellStyle::for_cell(row, c).to_format();
                let c = c as u16;
                match cell {
                    Cell::Text(text) => {
                        worksheet.write_string_with_format(r, c, text, &format)?;
                    }
                    Cell::Number(n) => {
                        worksheet.write_number_with_format(r, c, *n, &format)?;
                    }
                    Cell::Empty => {
                        worksheet.write_blank(r, c, &format)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Write the sheet as an xlsx file
    pub fn save_xlsx(&self, path: &Path) -> Result<(), ExportError> {
        self.to_workbook()?.save(path)?;
        Ok(())
    }

    /// Write the sheet as a CSV file
    pub fn save_csv(&self, path: &Path) -> Result<(), ExportError> {
        let file = File::create(path)?;
        self.write_csv(file)
    }

    pub fn save(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        match format {
            ExportFormat::Xlsx => self.save_xlsx(path)?,
            ExportFormat::Csv => self.save_csv(path)?,
        }
        log::info!("Projection exported to {}", path.display());
        Ok(())
    }
}

/// `Police-simulasyonu-YYYYMMDD-HHMM.xlsx` (or `.csv`)
pub fn export_filename(at: NaiveDateTime, format: ExportFormat) -> String {
    format!(
        "Police-simulasyonu-{}.{}",
        at.format("%Y%m%d-%H%M"),
        format.extension()
    )
}

fn parameter_rows(params: &CalculationParams) -> Vec<(&'static str, String)> {
    vec![
        ("Aylık Brüt Maaş", format!("{} ₺", format_grouped(params.monthly_salary))),
        (
            "Aylık Prim (USD)",
            format!("{} $", format_decimal_comma(params.monthly_premium_usd, 2)),
        ),
        ("Başlangıç USD/TRY Kuru", format_decimal_comma(params.usd_try, 4)),
        ("Yıllık Maaş Artışı %", format_percent(params.annual_salary_growth)),
        ("Yıllık Prim Artışı %", format_percent(params.annual_premium_growth)),
        ("Yıllık Kur Artışı %", format_percent(params.annual_usd_growth)),
        ("Yıllık Kâr Payı %", format_percent(params.annual_profit_rate)),
        ("Yıllık Kâr Payı Artışı %", format_percent(params.annual_profit_rate_growth)),
        ("Gider Kesintisi %", format_percent(params.annual_expense_rate)),
        ("Vergi Matrahı Artışı Yıl/%", format_percent(params.annual_tax_bracket_growth)),
    ]
}

fn monthly_row(detail: &MonthlyDetail) -> SheetRow {
    let tax_cell = match detail.tax_rate {
        Some(rate) => Cell::Text(format!("{:.0}%", rate * 100.0)),
        None => Cell::text("-"),
    };

    SheetRow {
        block: SheetBlock::OneYear,
        kind: if detail.is_total() { RowKind::Total } else { RowKind::Body },
        cells: vec![
            Cell::text(detail.label.as_str()),
            Cell::Number(detail.premium_usd),
            tax_cell,
            Cell::Number(detail.rebate_usd),
            Cell::Number(detail.profit_usd),
            Cell::Number(detail.expense_usd),
            Cell::Number(detail.policy_value_usd),
        ],
    }
}
