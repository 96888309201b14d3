use rust_xlsxwriter::{Format, Table, TableColumn, TableStyle};

use crate::model;

/// Builds the writer table for `table`. `header_formats` holds the format of
/// each header cell, in column order.
pub(crate) fn to_table(table: &model::Table, header_formats: &[Option<Format>]) -> Table {
    let columns: Vec<TableColumn> = (0..table.range.width())
        .map(|index| {
            let mut column = TableColumn::new();
            if let Some(header) = table.columns.get(index).filter(|h| !h.is_empty()) {
                column = column.set_header(header);
            }
            if let Some(Some(format)) = header_formats.get(index) {
                column = column.set_header_format(format);
            }
            column
        })
        .collect();

    Table::new()
        .set_name(&table.display_name)
        .set_columns(&columns)
        .set_header_row(table.header_row)
        .set_autofilter(table.autofilter)
        .set_style(table_style(table.style_name.as_deref()))
        .set_first_column(table.show_first_column)
        .set_last_column(table.show_last_column)
        .set_banded_rows(table.show_row_stripes)
        .set_banded_columns(table.show_column_stripes)
}

/// Maps a built-in style name such as `TableStyleMedium9` onto the writer's enum.
/// Unknown and custom styles fall back to no style.
pub(crate) fn table_style(name: Option<&str>) -> TableStyle {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return TableStyle::None;
    };
    let token = name.strip_prefix("TableStyle").unwrap_or(name);

    let digits = token.find(|c: char| c.is_ascii_digit()).unwrap_or(token.len());
    let (family, number) = token.split_at(digits);
    let Ok(number) = number.parse::<u8>() else {
        return TableStyle::None;
    };

    match (family, number) {
        ("Light", n) => light_style(n),
        ("Medium", n) => medium_style(n),
        ("Dark", n) => dark_style(n),
        _ => TableStyle::None,
    }
}

fn light_style(number: u8) -> TableStyle {
    match number {
        1 => TableStyle::Light1,
        2 => TableStyle::Light2,
        3 => TableStyle::Light3,
        4 => TableStyle::Light4,
        5 => TableStyle::Light5,
        6 => TableStyle::Light6,
        7 => TableStyle::Light7,
        8 => TableStyle::Light8,
        9 => TableStyle::Light9,
        10 => TableStyle::Light10,
        11 => TableStyle::Light11,
        12 => TableStyle::Light12,
        13 => TableStyle::Light13,
        14 => TableStyle::Light14,
        15 => TableStyle::Light15,
        16 => TableStyle::Light16,
        17 => TableStyle::Light17,
        18 => TableStyle::Light18,
        19 => TableStyle::Light19,
        20 => TableStyle::Light20,
        21 => TableStyle::Light21,
        _ => TableStyle::None,
    }
}

fn medium_style(number: u8) -> TableStyle {
    match number {
        1 => TableStyle::Medium1,
        2 => TableStyle::Medium2,
        3 => TableStyle::Medium3,
        4 => TableStyle::Medium4,
        5 => TableStyle::Medium5,
        6 => TableStyle::Medium6,
        7 => TableStyle::Medium7,
        8 => TableStyle::Medium8,
        9 => TableStyle::Medium9,
        10 => TableStyle::Medium10,
        11 => TableStyle::Medium11,
        12 => TableStyle::Medium12,
        13 => TableStyle::Medium13,
        14 => TableStyle::Medium14,
        15 => TableStyle::Medium15,
        16 => TableStyle::Medium16,
        17 => TableStyle::Medium17,
        18 => TableStyle::Medium18,
        19 => TableStyle::Medium19,
        20 => TableStyle::Medium20,
        21 => TableStyle::Medium21,
        22 => TableStyle::Medium22,
        23 => TableStyle::Medium23,
        24 => TableStyle::Medium24,
        25 => TableStyle::Medium25,
        26 => TableStyle::Medium26,
        27 => TableStyle::Medium27,
        28 => TableStyle::Medium28,
        _ => TableStyle::None,
    }
}

fn dark_style(number: u8) -> TableStyle {
    match number {
        1 => TableStyle::Dark1,
        2 => TableStyle::Dark2,
        3 => TableStyle::Dark3,
        4 => TableStyle::Dark4,
        5 => TableStyle::Dark5,
        6 => TableStyle::Dark6,
        7 => TableStyle::Dark7,
        8 => TableStyle::Dark8,
        9 => TableStyle::Dark9,
        10 => TableStyle::Dark10,
        11 => TableStyle::Dark11,
        _ => TableStyle::None,
    }
}
