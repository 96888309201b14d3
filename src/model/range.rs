use std::fmt;

use crate::utils::{col_name_to_index, index_to_col_name, split_cell_reference};

/// Largest zero-based column index a worksheet can address (`XFD`).
pub const MAX_COL: u16 = 16_383;

/// Zero-based address of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u16,
}

impl CellRef {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parses an A1-style reference such as `B3` or `$B$3`.
    pub fn parse(reference: &str) -> Option<Self> {
        let (letters, row) = split_cell_reference(reference)?;
        let col = col_name_to_index(letters)?;
        if row == 0 || col == 0 || col > MAX_COL as usize + 1 {
            return None;
        }

        Some(Self::new(row - 1, (col - 1) as u16))
    }

    /// Same column, `rows` further down.
    #[must_use]
    pub fn shifted(self, rows: u32) -> Self {
        Self::new(self.row.saturating_add(rows), self.col)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            index_to_col_name(self.col as usize + 1),
            u64::from(self.row) + 1
        )
    }
}

/// Inclusive rectangle of cells, `first` being the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub first: CellRef,
    pub last: CellRef,
}

impl CellRange {
    pub fn new(first: CellRef, last: CellRef) -> Self {
        Self {
            first: CellRef::new(first.row.min(last.row), first.col.min(last.col)),
            last: CellRef::new(first.row.max(last.row), first.col.max(last.col)),
        }
    }

    /// Parses `A1:B2`; a lone `A1` is a one-cell range.
    pub fn parse(reference: &str) -> Option<Self> {
        match reference.trim().split_once(':') {
            Some((first, last)) => Some(Self::new(CellRef::parse(first)?, CellRef::parse(last)?)),
            None => {
                let cell = CellRef::parse(reference)?;
                Some(Self::new(cell, cell))
            }
        }
    }

    #[must_use]
    pub fn shifted(self, rows: u32) -> Self {
        Self {
            first: self.first.shifted(rows),
            last: self.last.shifted(rows),
        }
    }

    pub fn is_single_cell(&self) -> bool {
        self.first == self.last
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        (self.first.row..=self.last.row).contains(&cell.row)
            && (self.first.col..=self.last.col).contains(&cell.col)
    }

    pub fn intersects(&self, other: &CellRange) -> bool {
        self.first.row <= other.last.row
            && other.first.row <= self.last.row
            && self.first.col <= other.last.col
            && other.first.col <= self.last.col
    }

    pub fn width(&self) -> usize {
        (self.last.col - self.first.col) as usize + 1
    }

    /// Row-major iteration over every cell of the range.
    pub fn cells(&self) -> impl Iterator<Item = CellRef> + use<> {
        let (first, last) = (self.first, self.last);
        (first.row..=last.row)
            .flat_map(move |row| (first.col..=last.col).map(move |col| CellRef::new(row, col)))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}:{}", self.first, self.last)
        }
    }
}
