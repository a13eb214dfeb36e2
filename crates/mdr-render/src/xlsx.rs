//! Excel (XLSX) renderer.
//!
//! Extracts every markdown table into a single worksheet, stacked in
//! document order with blank separator rows. Non-table content and
//! diagrams are ignored; a document without tables still produces a
//! valid empty workbook.

use mdr_parser::{MarkdownParser, TableData};
use rust_xlsxwriter::{Format, FormatAlign, Workbook};

use crate::error::RenderError;
use crate::format::DocumentRenderer;
use crate::options::RenderOptions;

/// Rows of padding between stacked tables.
const TABLE_GAP_ROWS: u32 = 2;
/// Worksheet name length limit imposed by the XLSX format.
const MAX_SHEET_NAME: usize = 31;
/// Upper bound for auto-fitted column widths.
const MAX_COLUMN_WIDTH: usize = 50;

/// Renders markdown tables to a spreadsheet.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExcelRenderer;

impl DocumentRenderer for ExcelRenderer {
    fn render(&self, markdown: &str, options: &RenderOptions) -> Result<Vec<u8>, RenderError> {
        // Diagram fences carry no tabular data; the resolver is skipped
        // entirely for spreadsheet output.
        let document = MarkdownParser::default().parse(markdown);

        let mut workbook = Workbook::new();
        let sheet_name = sheet_name(&options.effective_title(document.title.as_deref()));
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&sheet_name)
            .map_err(|e| RenderError::Encoding(e.to_string()))?;

        let header_format = Format::new().set_bold().set_align(FormatAlign::Center);
        let mut row: u32 = 0;
        let mut widths: Vec<usize> = Vec::new();

        for table in &document.tables {
            row = write_table(worksheet, table, row, &header_format, &mut widths)
                .map_err(|e| RenderError::Encoding(e.to_string()))?;
            row += TABLE_GAP_ROWS;
        }

        for (column, width) in widths.iter().enumerate() {
            let column = u16::try_from(column).unwrap_or(u16::MAX);
            let width = (width + 2).min(MAX_COLUMN_WIDTH);
            worksheet
                .set_column_width(column, width as f64)
                .map_err(|e| RenderError::Encoding(e.to_string()))?;
        }

        workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Encoding(e.to_string()))
    }
}

/// Write one table starting at `start_row`; returns the next free row.
fn write_table(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    table: &TableData,
    start_row: u32,
    header_format: &Format,
    widths: &mut Vec<usize>,
) -> Result<u32, rust_xlsxwriter::XlsxError> {
    let mut row = start_row;

    for (column, cell) in table.header.iter().enumerate() {
        let column_u16 = u16::try_from(column).unwrap_or(u16::MAX);
        worksheet.write_string_with_format(row, column_u16, cell, header_format)?;
        track_width(widths, column, cell);
    }
    if !table.header.is_empty() {
        row += 1;
    }

    for data_row in &table.rows {
        for (column, cell) in data_row.iter().enumerate() {
            let column_u16 = u16::try_from(column).unwrap_or(u16::MAX);
            // Numeric cells become numbers so spreadsheet formulas work.
            if let Ok(value) = cell.parse::<f64>() {
                worksheet.write_number(row, column_u16, value)?;
            } else {
                worksheet.write_string(row, column_u16, cell)?;
            }
            track_width(widths, column, cell);
        }
        row += 1;
    }

    Ok(row)
}

fn track_width(widths: &mut Vec<usize>, column: usize, cell: &str) {
    if widths.len() <= column {
        widths.resize(column + 1, 0);
    }
    widths[column] = widths[column].max(cell.chars().count());
}

/// Sanitize a document title into a legal worksheet name.
fn sheet_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => ' ',
            other => other,
        })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return "Tables".to_owned();
    }
    trimmed.chars().take(MAX_SHEET_NAME).collect()
}
