// src/export/xlsx.rs

use crate::errors::{AppError, AppResult};
use crate::export::model::{BatchRow, HEADERS};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook, Worksheet};
use std::path::Path;
use unicode_width::UnicodeWidthStr;

/// Index of the `recordId` column, written as a number.
const RECORD_ID_COL: usize = 4;

/// Batch artifact as XLSX: styled header, frozen first row, fitted columns.
pub(crate) fn write_xlsx(rows: &[BatchRow], path: &Path) -> AppResult<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    // ---------------------------
    // Header
    // ---------------------------
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(0x2F75B5))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet
            .write_with_format(0, col as u16, *header, &header_format)
            .map_err(to_export_error)?;
    }

    worksheet.set_freeze_panes(1, 0).map_err(to_export_error)?;

    let mut col_widths: Vec<usize> = HEADERS.iter().map(|h| UnicodeWidthStr::width(*h)).collect();

    // ---------------------------
    // Rows
    // ---------------------------
    let text_format = Format::new().set_border(FormatBorder::Thin);
    let id_format = Format::new()
        .set_align(FormatAlign::Right)
        .set_border(FormatBorder::Thin);

    for (row_index, row) in rows.iter().enumerate() {
        let xl_row = (row_index + 1) as u32;

        for (col, value) in row.cells().iter().enumerate() {
            write_cell(worksheet, xl_row, col, row, value, &text_format, &id_format)?;
            col_widths[col] = col_widths[col].max(UnicodeWidthStr::width(value.as_str()));
        }
    }

    for (c, w) in col_widths.iter().enumerate() {
        worksheet
            .set_column_width(c as u16, *w as f64 + 2.0)
            .map_err(to_export_error)?;
    }

    workbook.save(path).map_err(to_export_error)?;
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: usize,
    source: &BatchRow,
    value: &str,
    text_format: &Format,
    id_format: &Format,
) -> AppResult<()> {
    match (col, source.record_id) {
        (RECORD_ID_COL, Some(id)) => {
            worksheet
                .write_with_format(row, col as u16, id as f64, id_format)
                .map_err(to_export_error)?;
        }
        _ => {
            worksheet
                .write_with_format(row, col as u16, value, text_format)
                .map_err(to_export_error)?;
        }
    }
    Ok(())
}

fn to_export_error<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Export(e.to_string())
}
