/// Longest name a table may have.
const MAX_TABLE_NAME_LEN: usize = 255;

/// Name under which a table of `sheet` is stored in the merged workbook.
///
/// The sheet name is prefixed so that tables from different sheets never
/// collide. Characters a table name cannot hold become `_`, and a leading
/// digit or dot gets an `_` in front.
pub fn table_display_name(sheet: &str, table: &str) -> String {
    let mut name: String = format!("{sheet}_{table}")
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if !name.starts_with(|c: char| c.is_alphabetic() || c == '_') {
        name.insert(0, '_');
    }

    if let Some((cut, _)) = name.char_indices().nth(MAX_TABLE_NAME_LEN) {
        name.truncate(cut);
    }
    name
}
