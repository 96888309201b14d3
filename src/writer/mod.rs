//! Writing a [`Document`] as an `.xlsx` package with `rust_xlsxwriter`.
//!
//! Items the writer refuses (a table overlapping a merged range, an image in
//! an unsupported format, ...) are logged and left out; everything else is
//! written or the whole save fails.

mod format;
mod tables;

use std::path::Path;

use rust_xlsxwriter::{Format, Image as XlsxImage, Workbook, Worksheet};
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::{CellRange, CellRef, CellValue, Document, Sheet};
use format::{DEFAULT_DATETIME_FORMAT, to_format};

/// Pixels per character unit of column width at the default font.
const PIXELS_PER_CHAR: f64 = 7.0;

pub fn save<P: AsRef<Path>>(document: &Document, path: P) -> Result<()> {
    let mut workbook = build_workbook(document)?;
    workbook.save(path.as_ref())?;
    Ok(())
}

pub fn to_buffer(document: &Document) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(document)?;
    Ok(workbook.save_to_buffer()?)
}

fn build_workbook(document: &Document) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    for sheet in document.sheets() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        write_sheet(worksheet, sheet)?;
    }
    Ok(workbook)
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<()> {
    write_dimensions(worksheet, sheet)?;
    // Merging blanks the covered cells, so values are written afterwards.
    write_merged_ranges(worksheet, sheet);
    write_cells(worksheet, sheet)?;
    let tables = write_tables(worksheet, sheet);

    if let Some(range) = sheet.autofilter {
        if tables.iter().any(|table| table.intersects(&range)) {
            debug!(sheet = %sheet.name, range = %range, "autofilter overlaps a table, dropped");
        } else if let Err(err) =
            worksheet.autofilter(range.first.row, range.first.col, range.last.row, range.last.col)
        {
            warn!(sheet = %sheet.name, range = %range, error = %err, "autofilter dropped");
        }
    }

    write_images(worksheet, sheet);
    Ok(())
}

fn write_dimensions(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<()> {
    for (&col, dimension) in &sheet.columns {
        if let Some(width) = dimension.width {
            let pixels = (width * PIXELS_PER_CHAR).round().clamp(0.0, u16::MAX as f64) as u16;
            worksheet.set_column_width_pixels(col, pixels)?;
        }
        if dimension.hidden {
            worksheet.set_column_hidden(col)?;
        }
    }

    for (&row, dimension) in &sheet.rows {
        if let Some(height) = dimension.height {
            worksheet.set_row_height(row, height)?;
        }
        if dimension.hidden {
            worksheet.set_row_hidden(row)?;
        }
    }

    Ok(())
}

fn write_merged_ranges(worksheet: &mut Worksheet, sheet: &Sheet) {
    let blank = Format::new();
    for range in &sheet.merged_ranges {
        if range.is_single_cell() {
            debug!(sheet = %sheet.name, range = %range, "single-cell merge ignored");
            continue;
        }

        let CellRange { first, last } = *range;
        if let Err(err) = worksheet.merge_range(first.row, first.col, last.row, last.col, "", &blank) {
            warn!(sheet = %sheet.name, range = %range, error = %err, "merged range dropped");
        }
    }
}

fn write_cells(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<()> {
    for (at, cell) in &sheet.cells {
        let (row, col) = (at.row, at.col);
        let format = cell.style.as_ref().map(to_format).unwrap_or_else(Format::new);

        match &cell.value {
            CellValue::Empty => {
                if cell.style.is_some() {
                    worksheet.write_blank(row, col, &format)?;
                }
            }
            CellValue::Text(text) => {
                worksheet.write_string_with_format(row, col, text, &format)?;
            }
            CellValue::Number(number) => {
                worksheet.write_number_with_format(row, col, *number, &format)?;
            }
            CellValue::Bool(value) => {
                worksheet.write_boolean_with_format(row, col, *value, &format)?;
            }
            CellValue::DateTime(serial) => {
                let has_format = cell
                    .style
                    .as_ref()
                    .is_some_and(|style| !style.number_format.is_general());
                let format = if has_format {
                    format
                } else {
                    format.set_num_format(DEFAULT_DATETIME_FORMAT)
                };
                worksheet.write_number_with_format(row, col, *serial, &format)?;
            }
            // The writer has no error cell type; the literal is kept as text and
            // reads back as `CellValue::Text`.
            CellValue::Error(literal) => {
                worksheet.write_string_with_format(row, col, literal, &format)?;
            }
        }
    }
    Ok(())
}

/// Adds every table the writer accepts and returns their ranges.
fn write_tables(worksheet: &mut Worksheet, sheet: &Sheet) -> Vec<CellRange> {
    let mut written = Vec::with_capacity(sheet.tables.len());
    for table in &sheet.tables {
        let CellRange { first, last } = table.range;
        let header_formats: Vec<Option<Format>> = if table.header_row {
            (first.col..=last.col)
                .map(|col| {
                    sheet
                        .cell(CellRef::new(first.row, col))
                        .and_then(|cell| cell.style.as_ref())
                        .map(to_format)
                })
                .collect()
        } else {
            Vec::new()
        };

        let definition = tables::to_table(table, &header_formats);
        match worksheet.add_table(first.row, first.col, last.row, last.col, &definition) {
            Ok(_) => written.push(table.range),
            Err(err) => warn!(
                sheet = %sheet.name,
                table = %table.display_name,
                range = %table.range,
                error = %err,
                "table dropped"
            ),
        }
    }
    written
}

fn write_images(worksheet: &mut Worksheet, sheet: &Sheet) {
    for image in &sheet.images {
        let mut picture = match XlsxImage::new_from_buffer(&image.data) {
            Ok(picture) => picture,
            Err(err) => {
                warn!(sheet = %sheet.name, anchor = %image.anchor, error = %err, "image dropped");
                continue;
            }
        };

        if let (Some(width), Some(height)) = (image.width, image.height) {
            picture = picture.set_scale_to_size(width, height, false);
        }
        if let Some(description) = &image.description {
            picture = picture.set_alt_text(description);
        }

        let anchor = image.anchor;
        if let Err(err) = worksheet.insert_image_with_offset(
            anchor.row,
            anchor.col,
            &picture,
            image.offset_x,
            image.offset_y,
        ) {
            warn!(sheet = %sheet.name, anchor = %anchor, error = %err, "image dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnDimension, RowDimension, Table};
    use crate::ooxml::read_document;

    #[test]
    fn writes_a_package_the_reader_understands() {
        let mut sheet = Sheet::new("Data");
        sheet.set_value(CellRef::new(0, 0), CellValue::Text("name".into()));
        sheet.set_value(CellRef::new(1, 0), CellValue::Number(4.5));
        sheet.set_value(CellRef::new(1, 1), CellValue::Bool(true));
        sheet.columns.insert(1, ColumnDimension { hidden: true, width: None });
        sheet.rows.insert(1, RowDimension { hidden: false, height: Some(24.0) });
        let mut document = Document::new();
        document.add_sheet(sheet);

        let bytes = to_buffer(&document).unwrap();
        let read = read_document(&bytes).unwrap();
        let data = read.sheet("Data").unwrap();

        assert_eq!(data.value(CellRef::new(0, 0)), &CellValue::Text("name".into()));
        assert_eq!(data.value(CellRef::new(1, 0)), &CellValue::Number(4.5));
        assert_eq!(data.value(CellRef::new(1, 1)), &CellValue::Bool(true));
        assert!(data.columns[&1].hidden);
        assert_eq!(data.rows[&1].height, Some(24.0));
    }

    #[test]
    fn conflicting_items_are_dropped_not_fatal() {
        let mut sheet = Sheet::new("S");
        for row in 0..3 {
            for col in 0..2 {
                sheet.set_value(CellRef::new(row, col), CellValue::Number(1.0));
            }
        }
        sheet.merged_ranges.push(CellRange::parse("A1:B1").unwrap());
        sheet.merged_ranges.push(CellRange::parse("B1:B2").unwrap());
        sheet.merged_ranges.push(CellRange::parse("C5").unwrap());
        sheet.images.push(crate::model::Image {
            data: b"not an image".to_vec(),
            anchor: CellRef::new(0, 4),
            offset_x: 0,
            offset_y: 0,
            width: None,
            height: None,
            description: None,
        });
        sheet.tables.push(Table {
            display_name: "S_T".into(),
            range: CellRange::parse("A1:B3").unwrap(),
            columns: vec!["X".into(), "Y".into()],
            header_row: true,
            autofilter: true,
            style_name: None,
            show_first_column: false,
            show_last_column: false,
            show_row_stripes: true,
            show_column_stripes: false,
        });
        let mut document = Document::new();
        document.add_sheet(sheet);

        let bytes = to_buffer(&document).unwrap();
        let read = read_document(&bytes).unwrap();
        assert_eq!(read.sheet("S").unwrap().merged_ranges.len(), 1);
        assert!(read.sheet("S").unwrap().images.is_empty());
    }

    #[test]
    fn error_literals_are_written_as_text() {
        let mut sheet = Sheet::new("E");
        sheet.set_value(CellRef::new(0, 0), CellValue::Error("#DIV/0!".into()));
        let mut document = Document::new();
        document.add_sheet(sheet);

        let read = read_document(&to_buffer(&document).unwrap()).unwrap();
        assert_eq!(
            read.sheet("E").unwrap().value(CellRef::new(0, 0)),
            &CellValue::Text("#DIV/0!".into())
        );
    }
}
