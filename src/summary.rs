use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{Document, Sheet};

/// What ended up in one sheet of a merged workbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetSummary {
    pub rows: u32,
    pub cells: usize,
    pub merged_ranges: usize,
    pub tables: Vec<String>,
    pub images: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autofilter: Option<String>,
    pub hidden_rows: usize,
    pub hidden_columns: usize,
}

impl SheetSummary {
    fn of(sheet: &Sheet) -> Self {
        Self {
            rows: sheet.row_count,
            cells: sheet
                .cells
                .values()
                .filter(|cell| !cell.value.is_empty())
                .count(),
            merged_ranges: sheet.merged_ranges.len(),
            tables: sheet
                .tables
                .iter()
                .map(|table| table.display_name.clone())
                .collect(),
            images: sheet.images.len(),
            autofilter: sheet.autofilter.map(|range| range.to_string()),
            hidden_rows: sheet.rows.values().filter(|row| row.hidden).count(),
            hidden_columns: sheet.columns.values().filter(|col| col.hidden).count(),
        }
    }
}

/// Per-sheet summary, in sheet order.
pub fn summarize(document: &Document) -> IndexMap<String, SheetSummary> {
    document
        .sheets()
        .map(|sheet| (sheet.name.clone(), SheetSummary::of(sheet)))
        .collect()
}

pub fn serialize_to_json<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data).context("Failed to serialize data to JSON")
}
