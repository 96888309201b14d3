//! The merge upload endpoint, independent of any web framework.
//!
//! A web layer collects the multipart form into an [`UploadForm`], calls
//! [`respond`] (or [`handle_upload`] when it builds its own responses) and
//! sends the result back.

use std::fs::{self, File};
use std::path::Path;

use indexmap::IndexMap;
use tempfile::NamedTempFile;
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::merge::merge_workbooks;
use crate::writer;

/// Form field carrying the workbooks to merge.
pub const FILES_FIELD: &str = "files";
/// The same field as named by forms that post repeated values with `[]`.
pub const FILES_FIELD_ARRAY: &str = "files[]";
pub const DOWNLOAD_NAME: &str = "merged_workbook.xlsx";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Uploaded files grouped by form field, in the order they were posted.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    fields: IndexMap<String, Vec<UploadedFile>>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `field` without attaching anything to it, as a browser does for
    /// a file input left empty.
    pub fn add_field(&mut self, field: &str) {
        self.fields.entry(field.to_string()).or_default();
    }

    pub fn add_file(&mut self, field: &str, file: UploadedFile) {
        self.fields.entry(field.to_string()).or_default().push(file);
    }

    #[must_use]
    pub fn with_file(mut self, field: &str, file: UploadedFile) -> Self {
        self.add_file(field, file);
        self
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn files(&self, field: &str) -> &[UploadedFile] {
        self.fields
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The workbooks posted under either spelling of the files field.
    fn workbooks(&self) -> impl Iterator<Item = &UploadedFile> {
        self.files(FILES_FIELD)
            .iter()
            .chain(self.files(FILES_FIELD_ARRAY))
    }

    fn has_files_field(&self) -> bool {
        self.has_field(FILES_FIELD) || self.has_field(FILES_FIELD_ARRAY)
    }
}

/// The merged workbook, held in a scratch file until it is sent or persisted.
/// The scratch file is removed when this value is dropped.
#[derive(Debug)]
pub struct MergedDownload {
    file: NamedTempFile,
}

impl MergedDownload {
    pub fn file_name(&self) -> &'static str {
        DOWNLOAD_NAME
    }

    pub fn content_type(&self) -> &'static str {
        XLSX_CONTENT_TYPE
    }

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{DOWNLOAD_NAME}\"")
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(fs::read(self.file.path())?)
    }

    /// Moves the scratch file to `path`, keeping it on disk.
    pub fn persist<P: AsRef<Path>>(self, path: P) -> Result<File> {
        self.file
            .persist(path)
            .map_err(|err| Error::Io(err.error))
    }
}

/// Merges the workbooks posted in `form` into a scratch file.
///
/// Fails with [`Error::NoFiles`] before touching the disk when the files field
/// is absent or empty.
pub fn handle_upload(form: &UploadForm) -> Result<MergedDownload> {
    let files: Vec<&UploadedFile> = form.workbooks().collect();
    if files.is_empty() {
        return Err(Error::NoFiles);
    }

    info!(files = files.len(), "merging uploaded workbooks");
    let document = merge_workbooks(
        files
            .iter()
            .map(|file| (file.file_name.as_str(), file.bytes.as_slice())),
    )?;

    let file = tempfile::Builder::new()
        .prefix("merged_")
        .suffix(".xlsx")
        .tempfile()?;
    writer::save(&document, file.path())?;

    Ok(MergedDownload { file })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    fn text(status: u16, message: &str) -> Self {
        Self {
            status,
            headers: vec![(
                "Content-Type".to_string(),
                "text/plain; charset=utf-8".to_string(),
            )],
            body: message.as_bytes().to_vec(),
        }
    }

    fn attachment(download: &MergedDownload, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            headers: vec![
                ("Content-Type".to_string(), download.content_type().to_string()),
                ("Content-Disposition".to_string(), download.content_disposition()),
                ("Content-Length".to_string(), body.len().to_string()),
            ],
            body,
        }
    }

    /// Value of the first header called `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Handles the upload and turns the outcome into a response: the merged
/// workbook as an attachment, or a plain-text error.
pub fn respond(form: &UploadForm) -> Response {
    let outcome = handle_upload(form).and_then(|download| {
        let body = download.to_bytes()?;
        Ok(Response::attachment(&download, body))
    });

    match outcome {
        Ok(response) => response,
        Err(Error::NoFiles) => {
            let message = if form.has_files_field() {
                "No files selected"
            } else {
                "No file part in the request"
            };
            warn!(reason = message, "upload rejected");
            Response::text(400, message)
        }
        Err(err @ (Error::Parse { .. } | Error::DuplicateTableName(_))) => {
            warn!(error = %err, "upload rejected");
            Response::text(400, &err.to_string())
        }
        Err(err) => {
            error!(error = %err, "merge failed");
            Response::text(500, &err.to_string())
        }
    }
}
