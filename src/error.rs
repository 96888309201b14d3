use thiserror::Error;

use crate::ooxml::PackageError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no files were uploaded")]
    NoFiles,
    #[error("unable to parse `{name}` as an Excel workbook: {source}")]
    Parse {
        name: String,
        #[source]
        source: PackageError,
    },
    #[error("table name `{0}` is already used in the merged workbook")]
    DuplicateTableName(String),
    #[error("unable to write merged workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
