use std::collections::BTreeMap;

use crate::model::cell::{Cell, CellValue};
use crate::model::range::{CellRange, CellRef};

/// A picture placed on a sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Encoded image file (PNG, JPEG, GIF, ...), exactly as embedded in the package.
    pub data: Vec<u8>,
    pub anchor: CellRef,
    /// Offset in pixels from the anchor cell's top-left corner.
    pub offset_x: u32,
    pub offset_y: u32,
    /// Displayed size in pixels, when the drawing declares one.
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub display_name: String,
    pub range: CellRange,
    /// Header names, one per column of `range`.
    pub columns: Vec<String>,
    pub header_row: bool,
    pub autofilter: bool,
    pub style_name: Option<String>,
    pub show_first_column: bool,
    pub show_last_column: bool,
    pub show_row_stripes: bool,
    pub show_column_stripes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RowDimension {
    pub hidden: bool,
    /// Height in points.
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColumnDimension {
    pub hidden: bool,
    /// Width in character units, as stored in the package.
    pub width: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub cells: BTreeMap<CellRef, Cell>,
    /// Number of rows in use counting from the first row, leading blank rows included.
    pub row_count: u32,
    pub merged_ranges: Vec<CellRange>,
    pub images: Vec<Image>,
    pub tables: Vec<Table>,
    pub autofilter: Option<CellRange>,
    pub rows: BTreeMap<u32, RowDimension>,
    pub columns: BTreeMap<u16, ColumnDimension>,
}

impl Sheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cells: BTreeMap::new(),
            row_count: 0,
            merged_ranges: Vec::new(),
            images: Vec::new(),
            tables: Vec::new(),
            autofilter: None,
            rows: BTreeMap::new(),
            columns: BTreeMap::new(),
        }
    }

    pub fn cell(&self, at: CellRef) -> Option<&Cell> {
        self.cells.get(&at)
    }

    pub fn value(&self, at: CellRef) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cells.get(&at).map_or(&EMPTY, |cell| &cell.value)
    }

    /// Returns the cell at `at`, creating it and growing `row_count` if needed.
    pub fn cell_mut(&mut self, at: CellRef) -> &mut Cell {
        self.cover_row(at.row);
        self.cells.entry(at).or_default()
    }

    pub fn set_value(&mut self, at: CellRef, value: CellValue) {
        self.cell_mut(at).value = value;
    }

    /// Makes sure `row_count` reaches the zero-based `row`.
    pub fn cover_row(&mut self, row: u32) {
        self.row_count = self.row_count.max(row.saturating_add(1));
    }

    /// Values of one zero-based row, from column A up to the last non-empty cell.
    pub fn row_values(&self, row: u32) -> Vec<CellValue> {
        let cells: Vec<(u16, &CellValue)> = self
            .cells
            .range(CellRef::new(row, 0)..=CellRef::new(row, u16::MAX))
            .filter(|(_, cell)| !cell.value.is_empty())
            .map(|(at, cell)| (at.col, &cell.value))
            .collect();

        let Some(&(last_col, _)) = cells.last() else {
            return Vec::new();
        };

        let mut values = vec![CellValue::Empty; last_col as usize + 1];
        for (col, value) in cells {
            values[col as usize] = value.clone();
        }
        values
    }

    pub fn is_empty(&self) -> bool {
        self.cells.values().all(Cell::is_blank)
    }
}
