//! Merge several `.xlsx` workbooks into one.
//!
//! Sheets with the same name are stacked vertically, in input order, keeping
//! cell styles, merged ranges, images, tables, autofilters and row/column
//! layout.

pub mod error;
pub mod merge;
pub mod model;
pub mod ooxml;
pub mod summary;
pub mod upload;
pub mod utils;
pub mod writer;

pub use error::{Error, Result};
pub use merge::{SheetMerger, merge, merge_workbooks};
pub use model::Document;
pub use ooxml::read_document;
