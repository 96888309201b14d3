use crate::model::{CellRange, Table};
use crate::ooxml::PackageError;
use crate::ooxml::xml::{attr, attr_bool, child, children, parse_xml};

pub(crate) fn parse_table(part: &str, xml: &str) -> Result<Table, PackageError> {
    let doc = parse_xml(part, xml)?;
    let root = doc.root_element();

    let display_name = root
        .attribute("displayName")
        .or_else(|| root.attribute("name"))
        .ok_or_else(|| PackageError::InvalidReference(format!("{part}: table without a name")))?;

    let reference = root.attribute("ref").unwrap_or_default();
    let range = CellRange::parse(reference).ok_or_else(|| {
        PackageError::InvalidReference(format!("{part}: table range `{reference}`"))
    })?;

    let columns = child(root, "tableColumns")
        .map(|node| {
            children(node, "tableColumn")
                .map(|column| column.attribute("name").unwrap_or_default().to_string())
                .collect()
        })
        .unwrap_or_default();

    let style = child(root, "tableStyleInfo");
    let style_flag = |name: &str| {
        style
            .and_then(|node| attr_bool(node, name))
            .unwrap_or(false)
    };

    Ok(Table {
        display_name: display_name.to_string(),
        range,
        columns,
        header_row: attr::<u32>(root, "headerRowCount").unwrap_or(1) > 0,
        autofilter: child(root, "autoFilter").is_some(),
        style_name: style
            .and_then(|node| node.attribute("name"))
            .map(str::to_string),
        show_first_column: style_flag("showFirstColumn"),
        show_last_column: style_flag("showLastColumn"),
        show_row_stripes: style_flag("showRowStripes"),
        show_column_stripes: style_flag("showColumnStripes"),
    })
}
