use indexmap::IndexMap;

use crate::model::sheet::Sheet;

/// An ordered set of uniquely named sheets.
///
/// Sheet names are compared case-insensitively, as spreadsheet applications do;
/// the spelling of the first sheet inserted under a name is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    sheets: IndexMap<String, Sheet>,
}

impl Document {
    /// A document with no sheets at all.
    pub fn new() -> Self {
        Self::default()
    }

    fn key_of(&self, name: &str) -> Option<usize> {
        let lowered = name.to_lowercase();
        self.sheets
            .keys()
            .position(|key| key.to_lowercase() == lowered)
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        let index = self.key_of(name)?;
        self.sheets.get_index(index).map(|(_, sheet)| sheet)
    }

    /// Returns the sheet called `name`, appending an empty one if there is none.
    pub fn sheet_or_insert(&mut self, name: &str) -> &mut Sheet {
        let index = match self.key_of(name) {
            Some(index) => index,
            None => {
                self.sheets.insert(name.to_string(), Sheet::new(name));
                self.sheets.len() - 1
            }
        };

        &mut self.sheets[index]
    }

    /// Adds `sheet`, replacing any sheet with the same name in place.
    pub fn add_sheet(&mut self, sheet: Sheet) {
        match self.key_of(&sheet.name) {
            Some(index) => self.sheets[index] = sheet,
            None => {
                self.sheets.insert(sheet.name.clone(), sheet);
            }
        }
    }

    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.values()
    }

    pub fn sheet_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.sheets.len());
        for sheet in self.sheets.values() {
            names.push(sheet.name.clone());
        }
        names
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Display names of every table in the document.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.sheets
            .values()
            .flat_map(|sheet| sheet.tables.iter().map(|table| table.display_name.as_str()))
    }
}
