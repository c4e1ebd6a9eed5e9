use crate::error::RowIssue;
use crate::utils;

/// One OHLCV bar as handed to the chart.
///
/// `time` is Unix seconds shifted by `utils::SESSION_OFFSET_SECS`. Prices that
/// could not be read as numbers are `NaN` and an unreadable volume is `None`;
/// such bars are still kept.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<i64>,
}

/// Result of parsing one file: surviving bars in input order plus the rows that were skipped.
#[derive(Debug, Default)]
pub struct ParsedSeries {
    pub records: Vec<Candle>,
    pub issues: Vec<RowIssue>,
}

/// Reads a float the way a lenient number reader does.
///
/// Leading whitespace is skipped and the longest prefix that forms a decimal
/// number (optional sign, digits, fraction, exponent) is used, so `"12.5abc"`
/// reads as `12.5`. An `Infinity` prefix reads as infinity. Anything else is `NaN`.
pub fn parse_float_lenient(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        return if bytes.first() == Some(&b'-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return f64::NAN;
    }

    // exponent only counts when at least one digit follows it
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

/// Reads an integer from the leading digits of `s`: `"1000.7"` reads as `1000`.
///
/// Returns `None` when no digits lead the (whitespace-trimmed) text. A digit
/// run too long for an `i64` saturates at `i64::MAX` / `i64::MIN`.
pub fn parse_int_lenient(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    // only overflow can fail past this point
    Some(s[..end].parse::<i64>().unwrap_or(if bytes[0] == b'-' { i64::MIN } else { i64::MAX }))
}

/// Turns the fields of one data row into a candle.
///
/// Column 1 is the datetime and columns 2..=6 are open, high, low, close and
/// volume. Only emptiness is checked before the numbers are read.
fn process_row(
    fields: &[&str],
    index: usize,
    file: &str,
    basis: utils::TimeBasis,
) -> Result<Candle, RowIssue> {
    let field = |i: usize| fields.get(i).copied().filter(|f| !f.is_empty());

    let (Some(datetime), Some(open), Some(high), Some(low), Some(close), Some(volume)) =
        (field(1), field(2), field(3), field(4), field(5), field(6))
    else {
        return Err(RowIssue::MalformedRow {
            index,
            file: file.to_string(),
            row: fields.join(","),
        });
    };

    let time = utils::chart_time(datetime, basis).ok_or_else(|| RowIssue::InvalidDatetime {
        index,
        file: file.to_string(),
        raw: datetime.to_string(),
    })?;

    Ok(Candle {
        time,
        open: parse_float_lenient(open),
        high: parse_float_lenient(high),
        low: parse_float_lenient(low),
        close: parse_float_lenient(close),
        volume: parse_int_lenient(volume),
    })
}

/// Parses raw CSV text into an ordered candle series.
///
/// This function:
/// 1. Splits the text into lines, dropping blank and whitespace-only ones.
/// 2. Drops the first remaining line as the header, whatever it contains.
/// 3. Trims each row at both ends and splits it on commas (no quoting).
/// 4. Builds a `Candle` per row, skipping rows with a missing field or a bad datetime.
///
/// Every skipped row is logged with its index and `file`, and returned in `issues`.
///
/// # Arguments
/// * `text` - Whole file contents.
/// * `file` - File identity used in diagnostics.
/// * `basis` - How datetime components map to an instant.
///
/// # Returns
/// * `anyhow::Result<ParsedSeries>` - Surviving bars and skipped-row diagnostics.
///
/// # Errors
/// * If the CSV reader fails to produce a record.
pub fn parse_series(text: &str, file: &str, basis: utils::TimeBasis) -> anyhow::Result<ParsedSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_reader(text.as_bytes());

    let mut parsed = ParsedSeries::default();
    let mut header_seen = false;
    let mut index = 0usize;

    for result in reader.records() {
        let record = result?;
        if record.len() <= 1 && record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        if !header_seen {
            header_seen = true;
            continue;
        }

        // trimming the outer fields is the same as trimming the whole line
        let last = record.len() - 1;
        let fields: Vec<&str> = record
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let f = if i == 0 { f.trim_start() } else { f };
                if i == last { f.trim_end() } else { f }
            })
            .collect();

        match process_row(&fields, index, file, basis) {
            Ok(candle) => parsed.records.push(candle),
            Err(issue) => {
                tracing::warn!(file = %file, row = index, "{}", issue);
                parsed.issues.push(issue);
            }
        }
        index += 1;
    }

    tracing::debug!(file = %file, records = parsed.records.len(), skipped = parsed.issues.len(), "Data from file");
    anyhow::Ok(parsed)
}

/// Reads a CSV file from disk and parses it with `parse_series`.
///
/// Bytes that are not valid UTF-8 are replaced rather than failing the file.
///
/// # Errors
/// * If the file cannot be read.
pub fn load_series<P: AsRef<std::path::Path>>(
    path: P,
    basis: utils::TimeBasis,
) -> anyhow::Result<ParsedSeries> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    let text = String::from_utf8_lossy(&bytes);
    parse_series(&text, &path.display().to_string(), basis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{SESSION_OFFSET_SECS, TimeBasis};

    const HEADER: &str = "SYMBOL,DATETIME,OPEN,HIGH,LOW,CLOSE,VOLUME";

    fn parse(text: &str) -> ParsedSeries {
        parse_series(text, "ABB.csv", TimeBasis::Utc).unwrap()
    }

    #[test]
    fn parses_a_full_row() {
        let text = format!("{HEADER}\nABB,20230103 09:15:00,100.0,105.0,99.0,102.0,1000\n");
        let parsed = parse(&text);
        assert!(parsed.issues.is_empty());
        assert_eq!(
            parsed.records,
            vec![Candle {
                time: 1_672_737_300 + SESSION_OFFSET_SECS,
                open: 100.0,
                high: 105.0,
                low: 99.0,
                close: 102.0,
                volume: Some(1000),
            }]
        );
    }

    #[test]
    fn header_is_dropped_even_if_it_looks_like_data() {
        let text = "ABB,20230103 09:15:00,1,2,3,4,5\nABB,20230103 09:16:00,6,7,8,9,10";
        let parsed = parse(text);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].open, 6.0);
    }

    #[test]
    fn blank_lines_are_skipped_before_header_and_between_rows() {
        let text = format!(
            "\n   \n{HEADER}\r\n\r\nABB,20230103 09:15:00,1,2,3,4,5\r\n \t \nABB,20230103 09:16:00,6,7,8,9,10\r\n"
        );
        let parsed = parse(&text);
        assert!(parsed.issues.is_empty());
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[1].volume, Some(10));
    }

    #[test]
    fn missing_volume_drops_row_with_one_diagnostic() {
        let text = format!(
            "{HEADER}\nABB,20230103 09:15:00,100,105,99,102\nABB,20230103 09:16:00,1,2,3,4,5"
        );
        let parsed = parse(&text);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(
            parsed.issues,
            vec![RowIssue::MalformedRow {
                index: 0,
                file: "ABB.csv".to_string(),
                row: "ABB,20230103 09:15:00,100,105,99,102".to_string(),
            }]
        );
    }

    #[test]
    fn empty_field_is_malformed() {
        let text = format!("{HEADER}\nABB,20230103 09:15:00,100,,99,102,7\nABB,,1,2,3,4,5");
        let parsed = parse(&text);
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.issues.len(), 2);
        assert!(matches!(parsed.issues[1], RowIssue::MalformedRow { index: 1, .. }));
    }

    #[test]
    fn invalid_datetime_reports_raw_value() {
        let text = format!("{HEADER}\nABB,20230103 09:15:00,1,2,3,4,5\nABB,2023-01-03,1,2,3,4,5");
        let parsed = parse(&text);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(
            parsed.issues,
            vec![RowIssue::InvalidDatetime {
                index: 1,
                file: "ABB.csv".to_string(),
                raw: "2023-01-03".to_string(),
            }]
        );
    }

    #[test]
    fn out_of_range_datetimes_are_kept() {
        let text = format!(
            "{HEADER}\nABB,20230132 09:15:00,1,2,3,4,5\nABB,20230103 24:00:00,1,2,3,4,5\nABB,20230103 09::00,1,2,3,4,5\nABB,20230103 09:15:60,1,2,3,4,5"
        );
        let parsed = parse(&text);
        assert!(parsed.issues.is_empty());
        let times: Vec<i64> = parsed.records.iter().map(|c| c.time - SESSION_OFFSET_SECS).collect();
        assert_eq!(
            times,
            vec![
                1_675_242_900, // 2023-02-01 09:15:00
                1_672_790_400, // 2023-01-04 00:00:00
                1_672_736_400, // 2023-01-03 09:00:00
                1_672_737_360, // 2023-01-03 09:16:00
            ]
        );
    }

    #[test]
    fn non_numeric_values_are_kept() {
        let text = format!("{HEADER}\nABB,20230103 09:15:00,abc,105,99,12.5x,lots");
        let parsed = parse(&text);
        assert!(parsed.issues.is_empty());
        let candle = parsed.records[0];
        assert!(candle.open.is_nan());
        assert_eq!(candle.high, 105.0);
        assert_eq!(candle.close, 12.5);
        assert_eq!(candle.volume, None);
    }

    #[test]
    fn extra_columns_are_ignored() {
        let text = format!("{HEADER}\nABB,20230103 09:15:00,1,2,3,4,5,oi,extra");
        let parsed = parse(&text);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].volume, Some(5));
    }

    #[test]
    fn output_length_matches_surviving_rows() {
        let mut text = String::from(HEADER);
        for minute in 0..30 {
            text.push_str(&format!("\nABB,20230103 10:{minute:02}:00,1,2,3,{minute},10"));
        }
        text.push_str("\nABB,20230103 10:45:00,1,2,3");
        text.push_str("\nABB,2023AB01 10:46:00,1,2,3,4,5");
        text.push_str("\n\n");
        let parsed = parse(&text);
        assert_eq!(parsed.records.len(), 30);
        assert_eq!(parsed.issues.len(), 2);
        assert!(parsed.records.windows(2).all(|w| w[0].time + 60 == w[1].time));
    }

    #[test]
    fn empty_text_yields_nothing() {
        let parsed = parse("");
        assert!(parsed.records.is_empty());
        assert!(parsed.issues.is_empty());
        assert!(parse(HEADER).records.is_empty());
    }

    #[test]
    fn lenient_float_prefixes() {
        assert_eq!(parse_float_lenient("  42"), 42.0);
        assert_eq!(parse_float_lenient("-1.5e2x"), -150.0);
        assert_eq!(parse_float_lenient(".5"), 0.5);
        assert_eq!(parse_float_lenient("7."), 7.0);
        assert_eq!(parse_float_lenient("3e"), 3.0);
        assert_eq!(parse_float_lenient("Infinity"), f64::INFINITY);
        assert_eq!(parse_float_lenient("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_float_lenient(".").is_nan());
        assert!(parse_float_lenient("-").is_nan());
        assert!(parse_float_lenient("x1").is_nan());
    }

    #[test]
    fn lenient_int_prefixes() {
        assert_eq!(parse_int_lenient("1000"), Some(1000));
        assert_eq!(parse_int_lenient(" 1000.7"), Some(1000));
        assert_eq!(parse_int_lenient("-12abc"), Some(-12));
        assert_eq!(parse_int_lenient("+5"), Some(5));
        assert_eq!(parse_int_lenient("abc"), None);
        assert_eq!(parse_int_lenient("-"), None);
        assert_eq!(parse_int_lenient("99999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_int_lenient("-99999999999999999999x"), Some(i64::MIN));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_series(dir.path().join("missing.csv"), TimeBasis::Utc);
        assert!(result.is_err());
    }

    #[test]
    fn loads_file_with_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("BEL.csv");
        let mut bytes = format!("{HEADER}\n").into_bytes();
        bytes.extend_from_slice(b"B\xffL,20230103 09:15:00,1,2,3,4,5\n");
        std::fs::write(&path, bytes).unwrap();
        let parsed = load_series(&path, TimeBasis::Utc).unwrap();
        assert_eq!(parsed.records.len(), 1);
    }
}
