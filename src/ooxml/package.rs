use std::io::{Cursor, Read};

use zip::ZipArchive;
use zip::result::ZipError;

use crate::ooxml::PackageError;
use crate::ooxml::xml::{attr_bool, is_named, parse_xml, relationship_id};

const WORKSHEET_REL: &str = "/worksheet";
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";
const STYLES_REL: &str = "/styles";
const DEFAULT_WORKBOOK_PART: &str = "xl/workbook.xml";

/// Largest uncompressed part inflated into memory. Guards against zip bombs and
/// forged size fields in uploaded files.
pub(crate) const MAX_PART_BYTES: u64 = 256 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub id: String,
    pub kind: String,
    /// Absolute part name inside the package, without a leading `/`.
    pub target: String,
    pub external: bool,
}

impl Relationship {
    pub fn is(&self, suffix: &str) -> bool {
        self.kind.ends_with(suffix)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SheetEntry {
    pub name: String,
    pub part: String,
}

/// Read access to the parts of an in-memory OOXML package.
pub(crate) struct Package<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    workbook_part: String,
}

impl<'a> Package<'a> {
    pub fn open(bytes: &'a [u8]) -> Result<Self, PackageError> {
        let archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut package = Self {
            archive,
            workbook_part: DEFAULT_WORKBOOK_PART.to_string(),
        };

        if let Some(rel) = package
            .relationships("")?
            .into_iter()
            .find(|rel| rel.is(OFFICE_DOCUMENT_REL))
        {
            package.workbook_part = rel.target;
        }

        if !package.has_part(&package.workbook_part) {
            return Err(PackageError::MissingPart(package.workbook_part));
        }

        Ok(package)
    }

    pub fn has_part(&self, part: &str) -> bool {
        self.archive.file_names().any(|name| name == part)
    }

    pub fn read_part(&mut self, part: &str) -> Result<Vec<u8>, PackageError> {
        self.read_part_with_limit(part, MAX_PART_BYTES)
    }

    fn read_part_with_limit(&mut self, part: &str, max: u64) -> Result<Vec<u8>, PackageError> {
        let file = match self.archive.by_name(part) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Err(PackageError::MissingPart(part.to_string())),
            Err(e) => return Err(e.into()),
        };

        let declared = file.size();
        if declared > max {
            return Err(PackageError::PartTooLarge {
                part: part.to_string(),
                size: declared,
                max,
            });
        }

        // The declared size can be forged, so the read itself is bounded too.
        let mut bytes = Vec::with_capacity(declared as usize);
        file.take(max + 1).read_to_end(&mut bytes)?;
        if bytes.len() as u64 > max {
            return Err(PackageError::PartTooLarge {
                part: part.to_string(),
                size: bytes.len() as u64,
                max,
            });
        }
        Ok(bytes)
    }

    /// True when the workbook counts dates from 1904 instead of 1900.
    pub fn uses_1904_dates(&mut self) -> Result<bool, PackageError> {
        let workbook_part = self.workbook_part.clone();
        let xml = self.read_xml(&workbook_part)?;
        let doc = parse_xml(&workbook_part, &xml)?;
        Ok(doc
            .descendants()
            .find(|n| is_named(n, "workbookPr"))
            .and_then(|n| attr_bool(n, "date1904"))
            .unwrap_or(false))
    }

    pub fn read_xml(&mut self, part: &str) -> Result<String, PackageError> {
        let bytes = self.read_part(part)?;
        let mut text =
            String::from_utf8(bytes).map_err(|_| PackageError::Utf8(part.to_string()))?;
        if text.starts_with('\u{feff}') {
            text.remove(0);
        }
        Ok(text)
    }

    /// Relationships declared by `part`; an empty `part` means the package root.
    pub fn relationships(&mut self, part: &str) -> Result<Vec<Relationship>, PackageError> {
        let rels_part = rels_part_for(part);
        if !self.has_part(&rels_part) {
            return Ok(Vec::new());
        }

        let xml = self.read_xml(&rels_part)?;
        let doc = parse_xml(&rels_part, &xml)?;

        let mut rels = Vec::new();
        for node in doc.descendants().filter(|n| is_named(n, "Relationship")) {
            let Some(id) = node.attribute("Id") else {
                continue;
            };
            let target = node.attribute("Target").unwrap_or_default();
            let external = node.attribute("TargetMode") == Some("External");
            rels.push(Relationship {
                id: id.to_string(),
                kind: node.attribute("Type").unwrap_or_default().to_string(),
                target: if external {
                    target.to_string()
                } else {
                    resolve_target(part, target)
                },
                external,
            });
        }

        Ok(rels)
    }

    /// Worksheets in workbook order. Chart sheets and dialog sheets are skipped.
    pub fn worksheets(&mut self) -> Result<Vec<SheetEntry>, PackageError> {
        let workbook_part = self.workbook_part.clone();
        let rels = self.relationships(&workbook_part)?;
        let xml = self.read_xml(&workbook_part)?;
        let doc = parse_xml(&workbook_part, &xml)?;

        let mut sheets = Vec::new();
        for node in doc.descendants().filter(|n| is_named(n, "sheet")) {
            let (Some(name), Some(rel_id)) = (node.attribute("name"), relationship_id(node)) else {
                continue;
            };
            let Some(rel) = rels.iter().find(|rel| rel.id == rel_id) else {
                return Err(PackageError::InvalidReference(format!(
                    "sheet `{name}` points at unknown relationship {rel_id}"
                )));
            };
            if rel.is(WORKSHEET_REL) {
                sheets.push(SheetEntry {
                    name: name.to_string(),
                    part: rel.target.clone(),
                });
            }
        }

        Ok(sheets)
    }

    pub fn styles_part(&mut self) -> Result<Option<String>, PackageError> {
        let workbook_part = self.workbook_part.clone();
        Ok(self
            .relationships(&workbook_part)?
            .into_iter()
            .find(|rel| rel.is(STYLES_REL))
            .map(|rel| rel.target))
    }
}

fn rels_part_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None if part.is_empty() => "_rels/.rels".to_string(),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolves a relationship target relative to the part that declares it.
fn resolve_target(base_part: &str, target: &str) -> String {
    let target = target.replace('\\', "/");
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match base_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').filter(|s| !s.is_empty()).collect(),
        None => Vec::new(),
    };

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}
