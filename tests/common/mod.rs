// Shared fixture builders for the integration tests.
#![allow(dead_code)]

use std::io::{Cursor, Read, Write};

use rust_xlsxwriter::{Workbook, Worksheet};
use xlsx_merge::model::{CellRef, CellValue, Sheet};
use xlsx_merge::{Document, merge_workbooks, read_document, writer};

/// Builds a workbook in memory with `rust_xlsxwriter` and returns its bytes.
pub fn build_workbook<F>(build: F) -> Vec<u8>
where
    F: FnOnce(&mut Workbook),
{
    let mut workbook = Workbook::new();
    build(&mut workbook);
    workbook.save_to_buffer().expect("save fixture workbook")
}

/// A workbook with one sheet holding `rows` as strings, starting at A1.
pub fn text_workbook(sheet: &str, rows: &[&[&str]]) -> Vec<u8> {
    build_workbook(|book| {
        let ws = book.add_worksheet();
        ws.set_name(sheet).unwrap();
        write_rows(ws, 0, rows);
    })
}

pub fn write_rows(ws: &mut Worksheet, first_row: u32, rows: &[&[&str]]) {
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if !value.is_empty() {
                ws.write_string(first_row + r as u32, c as u16, *value).unwrap();
            }
        }
    }
}

/// Re-zips `bytes`, passing the text of `part` through `edit`.
pub fn patch_part<F>(bytes: &[u8], part: &str, edit: F) -> Vec<u8>
where
    F: FnOnce(&str) -> String,
{
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("fixture is a zip");
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let mut edit = Some(edit);

    for index in 0..archive.len() {
        let mut file = archive.by_index(index).unwrap();
        let name = file.name().to_string();
        let mut content = Vec::new();
        file.read_to_end(&mut content).unwrap();

        if name == part {
            let text = String::from_utf8(content).unwrap();
            let edit = edit.take().expect("part appears once");
            content = edit(&text).into_bytes();
        }

        writer
            .start_file(name, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(&content).unwrap();
    }

    assert!(edit.is_none(), "{part} not found in fixture");
    writer.finish().unwrap().into_inner()
}

/// Overwrites the uncompressed size of every central directory entry.
pub fn forge_uncompressed_sizes(bytes: &[u8], size: u32) -> Vec<u8> {
    let mut bytes = bytes.to_vec();
    let read_u16 = |b: &[u8], at: usize| u16::from_le_bytes([b[at], b[at + 1]]) as usize;
    let read_u32 =
        |b: &[u8], at: usize| u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]]) as usize;

    let eocd = bytes
        .windows(4)
        .rposition(|w| w == [0x50, 0x4b, 0x05, 0x06])
        .expect("end of central directory");
    let entries = read_u16(&bytes, eocd + 10);
    let mut at = read_u32(&bytes, eocd + 16);

    for _ in 0..entries {
        assert_eq!(&bytes[at..at + 4], &[0x50, 0x4b, 0x01, 0x02]);
        bytes[at + 24..at + 28].copy_from_slice(&size.to_le_bytes());
        at += 46 + read_u16(&bytes, at + 28) + read_u16(&bytes, at + 30) + read_u16(&bytes, at + 32);
    }
    bytes
}

/// A solid-color PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]));
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, image::ImageFormat::Png)
        .expect("encode png");
    buffer.into_inner()
}

/// Merges the named sources, writes the result and parses it again.
pub fn merge_and_reload(sources: &[(&str, Vec<u8>)]) -> Document {
    let merged = merge_workbooks(
        sources
            .iter()
            .map(|(name, bytes)| (*name, bytes.as_slice())),
    )
    .expect("merge");
    let bytes = writer::to_buffer(&merged).expect("write merged workbook");
    read_document(&bytes).expect("read merged workbook")
}

pub fn text(value: &str) -> CellValue {
    CellValue::Text(value.to_string())
}

/// `A1`-style lookup of a cell value.
pub fn value_at<'a>(sheet: &'a Sheet, reference: &str) -> &'a CellValue {
    sheet.value(CellRef::parse(reference).expect("valid reference"))
}
