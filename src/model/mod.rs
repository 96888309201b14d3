mod cell;
mod document;
mod range;
mod sheet;
pub mod style;

pub use cell::{Cell, CellValue};
pub use document::Document;
pub use range::{CellRange, CellRef, MAX_COL};
pub use sheet::{ColumnDimension, Image, RowDimension, Sheet, Table};
pub use style::StyleBundle;
