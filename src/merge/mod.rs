//! Folding several workbooks into one.
//!
//! Sheets are matched by name. Each source sheet is appended below whatever the
//! target sheet already holds; the target's row count before the append is the
//! row offset applied to everything copied from that source sheet.

mod tables;

use std::collections::HashSet;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{Cell, Document, Sheet, Table};
use crate::ooxml::read_document;

pub use tables::table_display_name;

/// Builds the merged document one source at a time.
#[derive(Debug, Default)]
pub struct SheetMerger {
    output: Document,
    /// Lowercased display names of every table already placed.
    table_names: HashSet<String>,
}

impl SheetMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends every sheet of `source`, in sheet order.
    pub fn add_document(&mut self, source: &Document) -> Result<()> {
        for sheet in source.sheets() {
            self.add_sheet(sheet)?;
        }
        Ok(())
    }

    /// Appends `source` to the output sheet of the same name and returns the
    /// row offset it was placed at.
    pub fn add_sheet(&mut self, source: &Sheet) -> Result<u32> {
        let tables = self.rename_tables(source)?;

        let target = self.output.sheet_or_insert(&source.name);
        let offset = target.row_count;

        append_values(source, target, offset);
        overlay_styles(source, target, offset);

        for range in &source.merged_ranges {
            let range = range.shifted(offset);
            target.cover_row(range.last.row);
            target.merged_ranges.push(range);
        }

        for image in &source.images {
            let mut image = image.clone();
            image.anchor = image.anchor.shifted(offset);
            target.images.push(image);
        }

        for (table, display_name) in source.tables.iter().zip(tables) {
            copy_table_cells(source, target, table, offset);
            let range = table.range.shifted(offset);
            target.cover_row(range.last.row);
            target.tables.push(Table {
                display_name,
                range,
                ..table.clone()
            });
        }

        if let Some(range) = source.autofilter {
            target.autofilter = Some(range.shifted(offset));
        }

        for (row, dimension) in &source.rows {
            let entry = target.rows.entry(row.saturating_add(offset)).or_default();
            entry.hidden |= dimension.hidden;
            if dimension.height.is_some() {
                entry.height = dimension.height;
            }
        }
        for (col, dimension) in &source.columns {
            let entry = target.columns.entry(*col).or_default();
            entry.hidden |= dimension.hidden;
            if dimension.width.is_some() {
                entry.width = dimension.width;
            }
        }

        info!(
            sheet = %target.name,
            offset,
            rows = source.row_count,
            merged = source.merged_ranges.len(),
            tables = source.tables.len(),
            images = source.images.len(),
            "merged sheet"
        );
        Ok(offset)
    }

    /// Computes the output names of `source`'s tables and reserves them.
    /// Nothing is reserved when any of them is already taken.
    fn rename_tables(&mut self, source: &Sheet) -> Result<Vec<String>> {
        let mut names = Vec::with_capacity(source.tables.len());
        let mut claimed = HashSet::new();
        for table in &source.tables {
            let name = table_display_name(&source.name, &table.display_name);
            let key = name.to_lowercase();
            if self.table_names.contains(&key) || !claimed.insert(key) {
                return Err(Error::DuplicateTableName(name));
            }
            debug!(sheet = %source.name, from = %table.display_name, to = %name, "renamed table");
            names.push(name);
        }

        self.table_names.extend(claimed);
        Ok(names)
    }

    pub fn finish(self) -> Document {
        self.output
    }
}

fn append_values(source: &Sheet, target: &mut Sheet, offset: u32) {
    for (at, cell) in &source.cells {
        if cell.value.is_empty() {
            continue;
        }
        target.set_value(at.shifted(offset), cell.value.clone());
    }
    target.row_count = target.row_count.max(offset.saturating_add(source.row_count));
}

fn overlay_styles(source: &Sheet, target: &mut Sheet, offset: u32) {
    for (at, cell) in &source.cells {
        if cell.value.is_empty() {
            continue;
        }
        if let Some(style) = &cell.style {
            let target_cell = target.cell_mut(at.shifted(offset));
            target_cell.style = Some(style.overlay(target_cell.style.as_ref()));
        }
    }
}

/// Copies every cell inside `table`'s range, blank styled cells included.
fn copy_table_cells(source: &Sheet, target: &mut Sheet, table: &Table, offset: u32) {
    for at in table.range.cells() {
        let Some(cell) = source.cell(at) else {
            continue;
        };
        copy_cell(cell, target.cell_mut(at.shifted(offset)));
    }
}

fn copy_cell(source: &Cell, target: &mut Cell) {
    if !source.value.is_empty() {
        target.value = source.value.clone();
    }
    if let Some(style) = &source.style {
        target.style = Some(style.overlay(target.style.as_ref()));
    }
}

/// Merges already parsed documents, in order.
pub fn merge(sources: &[Document]) -> Result<Document> {
    let mut merger = SheetMerger::new();
    for source in sources {
        merger.add_document(source)?;
    }
    Ok(merger.finish())
}

/// Parses and merges `(name, bytes)` pairs, in order. The first source that
/// is not a valid workbook aborts the merge.
pub fn merge_workbooks<'a, I>(sources: I) -> Result<Document>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut merger = SheetMerger::new();
    for (name, bytes) in sources {
        let document = read_document(bytes).map_err(|source| Error::Parse {
            name: name.to_string(),
            source,
        })?;
        merger.add_document(&document)?;
    }
    Ok(merger.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::style::{ColorRef, Fill, FillKind};
    use crate::model::{
        CellRange, CellRef, CellValue, ColumnDimension, Image, RowDimension, StyleBundle,
    };
    use pretty_assertions::assert_eq;

    fn text(value: &str) -> CellValue {
        CellValue::Text(value.to_string())
    }

    fn sheet(name: &str, rows: &[&[&str]]) -> Sheet {
        let mut sheet = Sheet::new(name);
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    sheet.set_value(CellRef::new(r as u32, c as u16), text(value));
                }
            }
        }
        sheet
    }

    fn document(sheets: Vec<Sheet>) -> Document {
        let mut doc = Document::new();
        for sheet in sheets {
            doc.add_sheet(sheet);
        }
        doc
    }

    fn solid(rgb: u32) -> StyleBundle {
        StyleBundle {
            fill: Fill {
                kind: FillKind::Solid,
                foreground: Some(ColorRef::Rgb(rgb)),
                background: Some(ColorRef::Rgb(rgb)),
            },
            ..StyleBundle::default()
        }
    }

    fn table(name: &str, range: &str) -> Table {
        Table {
            display_name: name.to_string(),
            range: CellRange::parse(range).unwrap(),
            columns: vec!["A".into(), "B".into()],
            header_row: true,
            autofilter: true,
            style_name: Some("TableStyleMedium9".into()),
            show_first_column: false,
            show_last_column: false,
            show_row_stripes: true,
            show_column_stripes: false,
        }
    }

    #[test]
    fn appends_rows_in_source_order() {
        let first = document(vec![sheet("Data", &[&["a", "b"], &["c", "d"]])]);
        let second = document(vec![sheet("Data", &[&["e", "f"]])]);

        let merged = merge(&[first, second]).unwrap();
        let data = merged.sheet("Data").unwrap();

        assert_eq!(data.row_count, 3);
        assert_eq!(data.row_values(0), vec![text("a"), text("b")]);
        assert_eq!(data.row_values(1), vec![text("c"), text("d")]);
        assert_eq!(data.row_values(2), vec![text("e"), text("f")]);
    }

    #[test]
    fn unions_sheets_in_first_seen_order() {
        let first = document(vec![sheet("A", &[&["1"]]), sheet("B", &[&["2"]])]);
        let second = document(vec![sheet("C", &[&["3"]]), sheet("a", &[&["4"]])]);

        let merged = merge(&[first, second]).unwrap();
        assert_eq!(merged.sheet_names(), ["A", "B", "C"]);
        assert_eq!(merged.sheet("A").unwrap().row_count, 2);
    }

    #[test]
    fn single_source_is_reproduced() {
        let mut source = sheet("Only", &[&["x", "", "y"], &[], &["z"]]);
        source.cell_mut(CellRef::new(0, 0)).style = Some(solid(0xFF0000));
        source.merged_ranges.push(CellRange::parse("D1:E2").unwrap());
        let doc = document(vec![source.clone()]);

        let merged = merge(&[doc]).unwrap();
        assert_eq!(merged.sheet("Only"), Some(&source));
    }

    #[test]
    fn leading_blank_rows_are_kept() {
        let first = document(vec![sheet("S", &[&[], &["x"]])]);
        let second = document(vec![sheet("S", &[&["y"]])]);

        let merged = merge(&[first, second]).unwrap();
        let s = merged.sheet("S").unwrap();
        assert_eq!(s.value(CellRef::new(1, 0)), &text("x"));
        assert_eq!(s.value(CellRef::new(2, 0)), &text("y"));
    }

    #[test]
    fn empty_source_sheet_adds_no_rows() {
        let first = document(vec![sheet("S", &[&["x"]])]);
        let second = document(vec![Sheet::new("S")]);
        let third = document(vec![sheet("S", &[&["y"]])]);

        let merged = merge(&[first, second, third]).unwrap();
        assert_eq!(merged.sheet("S").unwrap().row_count, 2);
        assert_eq!(merged.sheet("S").unwrap().value(CellRef::new(1, 0)), &text("y"));
    }

    #[test]
    fn styles_follow_the_shifted_rows() {
        let first = document(vec![sheet("S", &[&["a"], &["b"]])]);
        let mut second = sheet("S", &[&["c"]]);
        second.cell_mut(CellRef::new(0, 0)).style = Some(solid(0x00FF00));

        let merged = merge(&[first, document(vec![second])]).unwrap();
        let s = merged.sheet("S").unwrap();
        assert_eq!(s.cell(CellRef::new(0, 0)).and_then(|c| c.style.clone()), None);
        assert_eq!(
            s.cell(CellRef::new(2, 0)).and_then(|c| c.style.clone()),
            Some(solid(0x00FF00))
        );
    }

    #[test]
    fn shifts_merged_ranges_images_and_autofilter() {
        let first = document(vec![sheet("S", &[&["a"], &["b"], &["c"]])]);
        let mut second = sheet("S", &[&["h1", "h2"], &["1", "2"]]);
        second.merged_ranges.push(CellRange::parse("A4:B5").unwrap());
        second.autofilter = CellRange::parse("A1:B2");
        second.images.push(Image {
            data: vec![1, 2, 3],
            anchor: CellRef::new(0, 3),
            offset_x: 4,
            offset_y: 5,
            width: Some(10.0),
            height: None,
            description: None,
        });

        let merged = merge(&[first, document(vec![second])]).unwrap();
        let s = merged.sheet("S").unwrap();

        assert_eq!(s.merged_ranges, vec![CellRange::parse("A7:B8").unwrap()]);
        assert_eq!(s.autofilter, CellRange::parse("A4:B5"));
        assert_eq!(s.images[0].anchor, CellRef::new(3, 3));
        assert_eq!(s.row_count, 8);
    }

    #[test]
    fn renames_tables_and_shifts_them() {
        let first = document(vec![sheet("S", &[&["x"]])]);
        let mut second = sheet("S", &[&["A", "B"], &["1", "2"]]);
        second.tables.push(table("Sales", "A1:B2"));

        let merged = merge(&[first, document(vec![second])]).unwrap();
        let tables = &merged.sheet("S").unwrap().tables;

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].display_name, "S_Sales");
        assert_eq!(tables[0].range, CellRange::parse("A2:B3").unwrap());
    }

    #[test]
    fn table_cells_carry_their_styles_blank_ones_included() {
        let first = document(vec![sheet("S", &[&["x"], &["y"]])]);
        let mut second = sheet("S", &[&["A", "B"], &["1", "2"], &["3"]]);
        second.cell_mut(CellRef::new(1, 1)).style = Some(solid(0xFF0000));
        second.cell_mut(CellRef::new(2, 1)).style = Some(solid(0x0000FF));
        second.tables.push(table("Sales", "A1:B3"));

        let merged = merge(&[first, document(vec![second])]).unwrap();
        let s = merged.sheet("S").unwrap();

        let styled = s.cell(CellRef::new(3, 1)).unwrap();
        assert_eq!(styled.value, text("2"));
        assert_eq!(styled.style, Some(solid(0xFF0000)));

        let blank = s.cell(CellRef::new(4, 1)).unwrap();
        assert_eq!(blank.value, CellValue::Empty);
        assert_eq!(blank.style, Some(solid(0x0000FF)));
        assert_eq!(s.row_count, 5);
    }

    #[test]
    fn duplicate_table_names_fail_fast() {
        let mut first = sheet("S", &[&["A", "B"], &["1", "2"]]);
        first.tables.push(table("Sales", "A1:B2"));
        let mut second = first.clone();
        second.tables[0].display_name = "SALES".into();

        let result = merge(&[document(vec![first]), document(vec![second])]);
        assert!(matches!(result, Err(Error::DuplicateTableName(name)) if name == "S_SALES"));
    }

    #[test]
    fn dimensions_are_created_then_updated() {
        let mut first = sheet("S", &[&["a"]]);
        first.columns.insert(2, ColumnDimension { hidden: true, width: None });
        first.rows.insert(0, RowDimension { hidden: false, height: Some(30.0) });
        let mut second = sheet("S", &[&["b"]]);
        second.columns.insert(2, ColumnDimension { hidden: false, width: Some(12.5) });
        second.rows.insert(0, RowDimension { hidden: true, height: None });

        let merged = merge(&[document(vec![first]), document(vec![second])]).unwrap();
        let s = merged.sheet("S").unwrap();

        assert_eq!(s.columns[&2], ColumnDimension { hidden: true, width: Some(12.5) });
        assert_eq!(s.rows[&0], RowDimension { hidden: false, height: Some(30.0) });
        assert_eq!(s.rows[&1], RowDimension { hidden: true, height: None });
    }

    #[test]
    fn malformed_bytes_name_the_source() {
        let result = merge_workbooks([("broken.xlsx", b"not a zip".as_slice())]);
        assert!(matches!(result, Err(Error::Parse { name, .. }) if name == "broken.xlsx"));
    }
}
