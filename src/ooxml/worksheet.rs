use std::collections::BTreeMap;

use crate::model::{CellRange, CellRef, ColumnDimension, MAX_COL, RowDimension};
use crate::ooxml::PackageError;
use crate::ooxml::xml::{attr, attr_bool, child, children, parse_xml, relationship_id};

/// Everything a worksheet part says about a sheet besides cell values.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct WorksheetLayout {
    /// Non-default style index of each `<c>` that carries one.
    pub cell_styles: Vec<(CellRef, usize)>,
    /// Rows spanned by `<c>` elements, counted from the first row.
    pub row_extent: u32,
    pub merged_ranges: Vec<CellRange>,
    pub autofilter: Option<CellRange>,
    pub rows: BTreeMap<u32, RowDimension>,
    pub columns: BTreeMap<u16, ColumnDimension>,
    pub drawing_rel: Option<String>,
    pub table_rels: Vec<String>,
}

pub(crate) fn parse_worksheet(part: &str, xml: &str) -> Result<WorksheetLayout, PackageError> {
    let doc = parse_xml(part, xml)?;
    let root = doc.root_element();
    let mut layout = WorksheetLayout::default();

    if let Some(cols) = child(root, "cols") {
        for col in children(cols, "col") {
            let (Some(min), Some(max)) = (attr::<u32>(col, "min"), attr::<u32>(col, "max")) else {
                continue;
            };
            let dimension = ColumnDimension {
                hidden: attr_bool(col, "hidden").unwrap_or(false),
                width: attr(col, "width"),
            };
            if !dimension.hidden && dimension.width.is_none() {
                continue;
            }

            let last = max.min(MAX_COL as u32 + 1);
            for index in min.max(1)..=last {
                layout.columns.insert((index - 1) as u16, dimension);
            }
        }
    }

    if let Some(sheet_data) = child(root, "sheetData") {
        let mut next_row: u32 = 0;
        for row in children(sheet_data, "row") {
            let row_index = match attr::<u32>(row, "r") {
                Some(r) if r > 0 => r - 1,
                _ => next_row,
            };
            next_row = row_index + 1;

            let dimension = RowDimension {
                hidden: attr_bool(row, "hidden").unwrap_or(false),
                height: attr(row, "ht"),
            };
            if dimension.hidden || dimension.height.is_some() {
                layout.rows.insert(row_index, dimension);
            }

            let mut next_col: u16 = 0;
            for cell in children(row, "c") {
                let at = match cell.attribute("r") {
                    Some(reference) => CellRef::parse(reference).ok_or_else(|| {
                        PackageError::InvalidReference(format!("{part}: cell `{reference}`"))
                    })?,
                    None => CellRef::new(row_index, next_col),
                };
                next_col = at.col.saturating_add(1);
                layout.row_extent = layout.row_extent.max(at.row + 1);

                match attr::<usize>(cell, "s") {
                    Some(style) if style != 0 => layout.cell_styles.push((at, style)),
                    _ => {}
                }
            }
        }
    }

    if let Some(merges) = child(root, "mergeCells") {
        for merge in children(merges, "mergeCell") {
            let Some(reference) = merge.attribute("ref") else {
                continue;
            };
            let range = CellRange::parse(reference).ok_or_else(|| {
                PackageError::InvalidReference(format!("{part}: merged range `{reference}`"))
            })?;
            layout.merged_ranges.push(range);
        }
    }

    layout.autofilter = child(root, "autoFilter")
        .and_then(|node| node.attribute("ref"))
        .and_then(CellRange::parse);

    layout.drawing_rel = child(root, "drawing")
        .and_then(relationship_id)
        .map(str::to_string);

    if let Some(parts) = child(root, "tableParts") {
        layout.table_rels = children(parts, "tablePart")
            .filter_map(relationship_id)
            .map(str::to_string)
            .collect();
    }

    Ok(layout)
}
