use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, trace};

use crate::{layout::EpwLayout, model::HourlyRecord};

/// Parses EPW text into hourly records, in file order.
///
/// The first `layout.header_lines` lines are skipped unconditionally. A data line
/// is kept when it has at least `layout.min_columns` fields and its date/time
/// fields are integers; anything else is dropped without error. Measurement
/// columns that are missing or unparsable become `None`. Quotes are plain
/// characters, so a stray `"` never joins lines.
pub fn parse_records(text: &str, layout: &EpwLayout) -> Vec<HourlyRecord> {
    let body = skip_lines(text, layout.header_lines);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .delimiter(layout.delimiter_byte())
        .from_reader(body.as_bytes());

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                trace!(%err, "unreadable data line");
                skipped += 1;
                continue;
            }
        };

        match parse_row(&row, layout) {
            Some(record) => records.push(record),
            None => {
                trace!(fields = row.len(), "dropping data line");
                skipped += 1;
            }
        }
    }

    debug!(accepted = records.len(), skipped, "parsed EPW data lines");
    records
}

fn parse_row(row: &StringRecord, layout: &EpwLayout) -> Option<HourlyRecord> {
    if row.len() < layout.min_columns {
        return None;
    }

    Some(HourlyRecord {
        year: integer(row, layout.year_column)?,
        month: integer(row, layout.month_column)?,
        day: integer(row, layout.day_column)?,
        hour: integer(row, layout.hour_column)?,
        minute: integer(row, layout.minute_column)?,
        dry_bulb_temperature: measurement(row, layout.dry_bulb_column),
        cloud_cover: measurement(row, layout.cloud_cover_column),
    })
}

fn integer(row: &StringRecord, column: usize) -> Option<i32> {
    row.get(column)?.trim().parse().ok()
}

fn measurement(row: &StringRecord, column: usize) -> Option<f64> {
    row.get(column)?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Returns what follows the first `n` lines of `text`.
fn skip_lines(text: &str, n: usize) -> &str {
    if n == 0 {
        return text;
    }

    text.match_indices('\n')
        .nth(n - 1)
        .map_or("", |(idx, _)| &text[idx + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "LOCATION,Somewhere\nDESIGN CONDITIONS,0\nTYPICAL/EXTREME PERIODS,0\n\
GROUND TEMPERATURES,0\nHOLIDAYS/DAYLIGHT SAVINGS,No,0,0,0\nCOMMENTS 1,x\nCOMMENTS 2,y\n\
DATA PERIODS,1,1,Data,Sunday,1/1,12/31\n";

    fn line(month: u32, day: u32, hour: u32, temp: &str, cloud: &str) -> String {
        let mut fields: Vec<String> = vec![
            "1999".into(),
            month.to_string(),
            day.to_string(),
            hour.to_string(),
            "0".into(),
            "?9?9?9".into(),
            temp.into(),
        ];
        fields.extend((7..20).map(|i| i.to_string()));
        fields.push(cloud.into());
        fields.join(",")
    }

    #[test]
    fn skips_header_and_reads_columns() {
        let text = format!("{HEADER}{}\n", line(1, 1, 1, "20.0", "5.0"));
        let records = parse_records(&text, &EpwLayout::default());

        assert_eq!(records.len(), 1);
        let r = records[0];
        assert_eq!((r.year, r.month, r.day, r.hour, r.minute), (1999, 1, 1, 1, 0));
        assert_eq!(r.dry_bulb_temperature, Some(20.0));
        assert_eq!(r.cloud_cover, Some(5.0));
    }

    #[test]
    fn header_lines_are_skipped_even_when_they_look_like_data() {
        let data = line(2, 3, 4, "1.5", "0");
        let text = std::iter::repeat_n(data.as_str(), 9).collect::<Vec<_>>().join("\n");

        let records = parse_records(&text, &EpwLayout::default());
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn short_lines_are_dropped() {
        let text = format!("{HEADER}1999,1,1,1,0,x\n\n{}\n", line(1, 1, 2, "3.0", "1"));
        let records = parse_records(&text, &EpwLayout::default());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hour, 2);
    }

    #[test]
    fn seven_fields_are_enough_and_cloud_cover_may_be_missing() {
        let text = format!("{HEADER}1999,6,15,12,0,x,25.5\n");
        let records = parse_records(&text, &EpwLayout::default());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].dry_bulb_temperature, Some(25.5));
        assert_eq!(records[0].cloud_cover, None);
    }

    #[test]
    fn unparsable_measurements_become_absent() {
        let text = format!(
            "{HEADER}{}\n{}\n",
            line(1, 1, 1, "abc", "NaN"),
            line(1, 1, 2, "", "inf")
        );
        let records = parse_records(&text, &EpwLayout::default());

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.dry_bulb_temperature.is_none()));
        assert!(records.iter().all(|r| r.cloud_cover.is_none()));
    }

    #[test]
    fn unparsable_date_fields_drop_the_line() {
        let text = format!("{HEADER}1999,Jan,1,1,0,x,5.0\n{}\n", line(1, 1, 1, "5.0", "1"));
        let records = parse_records(&text, &EpwLayout::default());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].month, 1);
    }

    #[test]
    fn tolerates_crlf_line_endings() {
        let text = format!(
            "{HEADER}{}\n{}\n",
            line(1, 1, 1, "1.0", "2.0"),
            line(1, 1, 2, "3.0", "4.0")
        )
        .replace('\n', "\r\n");
        let records = parse_records(&text, &EpwLayout::default());

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].cloud_cover, Some(4.0));
    }

    #[test]
    fn stray_quote_only_affects_its_own_line() {
        let text = format!(
            "{HEADER}1999,1,1,1,0,\"A7,20.0\n{}\n{}\n",
            line(1, 1, 2, "3.0", "1"),
            line(1, 1, 3, "4.0", "2")
        );
        let records = parse_records(&text, &EpwLayout::default());

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].dry_bulb_temperature, Some(20.0));
        assert_eq!(records[1].hour, 2);
        assert_eq!(records[2].hour, 3);
    }

    #[test]
    fn file_shorter_than_header_yields_nothing() {
        assert!(parse_records("LOCATION,x\nDESIGN,y\n", &EpwLayout::default()).is_empty());
        assert!(parse_records("", &EpwLayout::default()).is_empty());
    }

    #[test]
    fn custom_layout_is_honoured() {
        let layout = EpwLayout {
            header_lines: 1,
            delimiter: ';',
            cloud_cover_column: 7,
            ..EpwLayout::default()
        };
        let text = "header\n2001;12;31;24;0;x;-4.5;9\n";
        let records = parse_records(text, &layout);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].dry_bulb_temperature, Some(-4.5));
        assert_eq!(records[0].cloud_cover, Some(9.0));
    }
}
