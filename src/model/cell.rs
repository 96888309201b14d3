use crate::model::style::StyleBundle;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Date-time as a serial day number in the 1900 date system.
    DateTime(f64),
    /// Error literal such as `#DIV/0!`. Written back out as text.
    Error(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub value: CellValue,
    /// `None` means the workbook's default style.
    pub style: Option<StyleBundle>,
}

impl Cell {
    pub fn new(value: CellValue) -> Self {
        Self { value, style: None }
    }

    pub fn is_blank(&self) -> bool {
        self.value.is_empty() && self.style.is_none()
    }
}
