//! Reading OOXML spreadsheet packages (`.xlsx`) into a [`Document`].
//!
//! Cell values come from `calamine`. The parts calamine does not expose (styles,
//! merged ranges, dimensions, tables, drawings) are read straight from the zip
//! package.

mod drawings;
mod package;
mod styles;
mod tables;
mod values;
mod worksheet;
mod xml;

use std::io::Cursor;

use calamine::{Xlsx, open_workbook_from_rs};
use thiserror::Error;
use tracing::debug;

use crate::model::{Document, Sheet};
use package::Package;
use styles::Stylesheet;

const TABLE_REL: &str = "/table";
const DRAWING_REL: &str = "/drawing";

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("xml parse error in {part}: {source}")]
    Xml {
        part: String,
        #[source]
        source: roxmltree::Error,
    },
    #[error("{0} is not valid utf-8")]
    Utf8(String),
    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::XlsxError),
    #[error("missing package part: {0}")]
    MissingPart(String),
    #[error("{part} inflates past {max} bytes (declares {size})")]
    PartTooLarge { part: String, size: u64, max: u64 },
    #[error("invalid reference: {0}")]
    InvalidReference(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parses a complete workbook held in memory.
pub fn read_document(bytes: &[u8]) -> Result<Document, PackageError> {
    let mut package = Package::open(bytes)?;
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;

    let stylesheet = match package.styles_part()? {
        Some(part) if package.has_part(&part) => {
            let xml = package.read_xml(&part)?;
            Stylesheet::parse(&part, &xml)?
        }
        _ => Stylesheet::default(),
    };

    let date1904 = package.uses_1904_dates()?;

    let mut document = Document::new();
    for entry in package.worksheets()? {
        let mut sheet = Sheet::new(&entry.name);
        values::read_values(&mut workbook, &entry.name, date1904, &mut sheet)?;

        let xml = package.read_xml(&entry.part)?;
        let layout = worksheet::parse_worksheet(&entry.part, &xml)?;

        for (at, index) in layout.cell_styles {
            match stylesheet.cell_style(index) {
                Some(style) => sheet.cell_mut(at).style = Some(style.clone()),
                None => debug!(sheet = %entry.name, cell = %at, index, "unknown style index"),
            }
        }
        if layout.row_extent > 0 {
            sheet.cover_row(layout.row_extent - 1);
        }

        sheet.merged_ranges = layout.merged_ranges;
        sheet.autofilter = layout.autofilter;
        sheet.rows = layout.rows;
        sheet.columns = layout.columns;

        let rels = package.relationships(&entry.part)?;
        for rel_id in &layout.table_rels {
            let Some(rel) = rels.iter().find(|rel| &rel.id == rel_id && rel.is(TABLE_REL)) else {
                continue;
            };
            let xml = package.read_xml(&rel.target)?;
            sheet.tables.push(tables::parse_table(&rel.target, &xml)?);
        }

        if let Some(rel) = layout
            .drawing_rel
            .as_ref()
            .and_then(|id| rels.iter().find(|rel| &rel.id == id && rel.is(DRAWING_REL)))
        {
            sheet.images = drawings::read_images(&mut package, &rel.target)?;
        }

        debug!(
            sheet = %sheet.name,
            rows = sheet.row_count,
            cells = sheet.cells.len(),
            styles = stylesheet.len(),
            "read worksheet"
        );
        document.add_sheet(sheet);
    }

    Ok(document)
}
