use std::io::{Read, Seek};

use calamine::{Data, Range, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::model::{CellRef, CellValue, Sheet};
use crate::ooxml::PackageError;

/// Days between the 1900 and 1904 date system epochs.
const DAYS_1900_TO_1904: f64 = 1462.0;

/// Copies every non-empty value of `name` into `sheet`, at its absolute position.
///
/// Dates from a 1904-system workbook are moved onto the 1900 system.
pub(crate) fn read_values<RS: Read + Seek>(
    workbook: &mut Xlsx<RS>,
    name: &str,
    date1904: bool,
    sheet: &mut Sheet,
) -> Result<(), PackageError> {
    let range: Range<Data> = workbook.worksheet_range(name)?;
    let Some((first_row, first_col)) = range.start() else {
        return Ok(());
    };

    for (row_idx, col_idx, data) in range.used_cells() {
        let value = convert_value(data, date1904);
        if value.is_empty() {
            continue;
        }

        let row = first_row + row_idx as u32;
        let col = first_col + col_idx as u32;
        let Ok(col) = u16::try_from(col) else {
            return Err(PackageError::InvalidReference(format!(
                "{name}: column {col} is out of range"
            )));
        };
        sheet.set_value(CellRef::new(row, col), value);
    }

    Ok(())
}

fn convert_value(data: &Data, date1904: bool) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) if date1904 && dt.is_datetime() => {
            CellValue::DateTime(dt.as_f64() + DAYS_1900_TO_1904)
        }
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) => match iso_to_serial(s) {
            Some(serial) => CellValue::DateTime(serial),
            None => CellValue::Text(s.clone()),
        },
        // Only produced for ODS sources; xlsx durations arrive as `DateTime`.
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}

/// Converts an ISO-8601 date, time or date-time into a 1900-system serial number.
fn iso_to_serial(text: &str) -> Option<f64> {
    let text = text.trim();
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;

    let datetime = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        });

    if let Some(datetime) = datetime {
        let elapsed = datetime - epoch;
        return Some(elapsed.num_milliseconds() as f64 / 86_400_000.0);
    }

    let time = NaiveTime::parse_from_str(text, "%H:%M:%S%.f").ok()?;
    let elapsed = time - NaiveTime::MIN;
    Some(elapsed.num_milliseconds() as f64 / 86_400_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_dates_become_serials() {
        assert_eq!(iso_to_serial("1900-03-01"), Some(61.0));
        assert_eq!(iso_to_serial("2023-03-01"), Some(44986.0));
        assert_eq!(iso_to_serial("2023-03-01T12:00:00"), Some(44986.5));
        assert_eq!(iso_to_serial("06:00:00"), Some(0.25));
        assert_eq!(iso_to_serial("not a date"), None);
    }

    #[test]
    fn errors_keep_their_literal() {
        assert_eq!(
            convert_value(&Data::Error(calamine::CellErrorType::Div0), false),
            CellValue::Error("#DIV/0!".into())
        );
        assert_eq!(convert_value(&Data::Int(3), false), CellValue::Number(3.0));
    }

    #[test]
    fn dates_from_1904_workbooks_move_to_the_1900_system() {
        use calamine::{ExcelDateTime, ExcelDateTimeType};

        let date = Data::DateTime(ExcelDateTime::new(100.0, ExcelDateTimeType::DateTime, true));
        assert_eq!(convert_value(&date, true), CellValue::DateTime(1562.0));
        assert_eq!(convert_value(&date, false), CellValue::DateTime(100.0));

        let duration = Data::DateTime(ExcelDateTime::new(1.5, ExcelDateTimeType::TimeDelta, true));
        assert_eq!(convert_value(&duration, true), CellValue::DateTime(1.5));
    }
}
