use crate::csv_processor;
use crate::indicators;

use chrono::TimeZone;

/// Seconds added to every decoded timestamp (5h30m).
///
/// The source files are stamped in exchange-local wall-clock time and the
/// chart renders in UTC, so the bars are shifted by a fixed amount.
pub const SESSION_OFFSET_SECS: i64 = 19_800;

/// How the wall-clock components of a CSV datetime are turned into an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeBasis {
    /// Treat the components as UTC.
    #[default]
    Utc,
    /// Treat the components as the host's local time.
    Local,
}

/// Configures a custom Rayon thread pool with specified size.
///
/// This function creates a new Rayon thread pool with the exact number of threads specified.
/// It's used when `--threads` is given, so the per-chart pipelines run on a pool of known
/// size instead of the global Rayon pool.
///
/// # Arguments
/// * `num_threads` - Desired number of threads for the pool.
///
/// # Returns
/// * `Result<ThreadPool>` - Created thread pool or an error if creation fails.
pub fn configure_thread_pool(num_threads: usize) -> anyhow::Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build thread pool: {}", e))
}

/// Characters `start..end` of `s`, clipped to its length.
fn char_slice(s: &str, start: usize, end: usize) -> String {
    s.chars().skip(start).take(end.saturating_sub(start)).collect()
}

/// Reads a clock component with a whole-text number conversion.
///
/// Blank text is `0`. Otherwise the trimmed text must be a decimal number
/// (fraction and exponent allowed) or a `0x` hex integer, and fractions are
/// truncated toward zero. Anything else, or a non-finite value, is `None`.
fn clock_component(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(0);
    }
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => {
            if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            i64::from_str_radix(hex, 16).ok()? as f64
        }
        None => {
            if !s.bytes().all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-')) {
                return None;
            }
            s.parse::<f64>().ok()?
        }
    };
    if !value.is_finite() || value.abs() >= 1e15 {
        return None;
    }
    Some(value.trunc() as i64)
}

/// Decodes a combined `YYYYMMDD HH:MM:SS` stamp into a calendar date-time.
///
/// The first 8 characters hold the date, everything from index 9 on holds the
/// time; the character at index 8 is a separator and is never inspected. Both
/// parts are trimmed. Date components read their leading integer
/// (`csv_processor::parse_int_lenient`); clock components go through
/// `clock_component`, so an empty minute is `0`. The time part needs at least
/// three `:`-separated components and anything past the third is ignored.
///
/// Out-of-range values roll over instead of failing: day 32 of January is
/// 1 February, month 13 is January of the next year, `24:00:00` is midnight
/// of the next day and second 60 is the next minute. Years 0 to 99 mean
/// 1900 to 1999.
///
/// # Arguments
/// * `raw` - Datetime field from column 1 of a row (e.g. "20230103 09:15:00").
///
/// # Returns
/// * `Option<NaiveDateTime>` - `None` if any component is not a number or the
///   result falls outside the representable range.
pub fn decode_datetime(raw: &str) -> Option<chrono::NaiveDateTime> {
    let date_part = char_slice(raw, 0, 8);
    let time_part: String = raw.chars().skip(9).collect();
    let date_part = date_part.trim();
    let time_part = time_part.trim();

    let mut year = csv_processor::parse_int_lenient(&char_slice(date_part, 0, 4))?;
    let month = csv_processor::parse_int_lenient(&char_slice(date_part, 4, 6))?;
    let day = csv_processor::parse_int_lenient(&char_slice(date_part, 6, 8))?;

    let mut clock = time_part.split(':');
    let hour = clock_component(clock.next()?)?;
    let minute = clock_component(clock.next()?)?;
    let second = clock_component(clock.next()?)?;

    if (0..=99).contains(&year) {
        year += 1900;
    }
    let month0 = month.checked_sub(1)?;
    let year = year.checked_add(month0.div_euclid(12))?;
    let month_start = chrono::NaiveDate::from_ymd_opt(
        i32::try_from(year).ok()?,
        u32::try_from(month0.rem_euclid(12)).ok()? + 1,
        1,
    )?;
    let date = month_start.checked_add_signed(chrono::TimeDelta::try_days(day.checked_sub(1)?)?)?;

    let secs = hour
        .checked_mul(3600)?
        .checked_add(minute.checked_mul(60)?)?
        .checked_add(second)?;
    date.and_hms_opt(0, 0, 0)?
        .checked_add_signed(chrono::TimeDelta::try_seconds(secs)?)
}

/// Converts a calendar date-time to Unix seconds under the given basis.
///
/// Local times skipped by a DST change yield `None`; repeated ones resolve to
/// the earliest instant.
pub fn epoch_seconds(dt: chrono::NaiveDateTime, basis: TimeBasis) -> Option<i64> {
    match basis {
        TimeBasis::Utc => Some(dt.and_utc().timestamp()),
        TimeBasis::Local => chrono::Local
            .from_local_datetime(&dt)
            .earliest()
            .map(|local| local.timestamp()),
    }
}

/// Decodes a raw datetime field into the chart time of a bar.
///
/// This is `epoch_seconds(decode_datetime(raw)) + SESSION_OFFSET_SECS`.
pub fn chart_time(raw: &str, basis: TimeBasis) -> Option<i64> {
    let dt = decode_datetime(raw)?;
    epoch_seconds(dt, basis).map(|secs| secs + SESSION_OFFSET_SECS)
}

/// Formats Unix timestamp into readable string: YYYYMMDD HHMMSS.
///
/// This function converts a Unix timestamp (seconds since epoch) into a human-readable
/// string in the format "YYYYMMDD HHMMSS". It's used for printing bar times in the
/// `--check` preview. Chart times already include the session offset, so the output
/// shows the exchange wall-clock time.
///
/// # Arguments
/// * `ts` - Unix timestamp in seconds.
///
/// # Returns
/// * `anyhow::Result<String>` - Formatted string (e.g., "20240613 100000") or error if invalid timestamp.
pub fn format_timestamp(ts: i64) -> anyhow::Result<String> {
    let dt = chrono::Utc
        .timestamp_opt(ts, 0)
        .single()
        .ok_or_else(|| anyhow::anyhow!("Timestamp out of range: {}", ts))?;
    let output = dt.format("%Y%m%d %H%M%S").to_string();
    anyhow::Ok(output)
}

/// Prints the first `count` candles of a chart.
///
/// # Example Output
/// ```text
///  - ts: 20230103 091500, open: 100.00, high: 105.00, low: 99.00, close: 102.00, vol: 1000
///  - ts: 20230103 091600, open: 102.00, high: 103.50, low: 101.00, close: 103.00, vol: NaN
/// ```
pub fn print_candles(items: &[csv_processor::Candle], count: usize) -> anyhow::Result<()> {
    for item in items.iter().take(count) {
        let formatted = format_timestamp(item.time)?;
        let vol = item
            .volume
            .map_or_else(|| "NaN".to_string(), |v| v.to_string());
        println!(
            " - ts: {}, open: {:.2}, high: {:.2}, low: {:.2}, close: {:.2}, vol: {}",
            formatted, item.open, item.high, item.low, item.close, vol,
        );
    }

    anyhow::Ok(())
}

/// Prints the first `count` points of a moving-average series.
pub fn print_points(items: &[indicators::SeriesPoint], count: usize) -> anyhow::Result<()> {
    for item in items.iter().take(count) {
        let formatted = format_timestamp(item.time)?;
        println!(" - ts: {}, value: {:.4}", formatted, item.value);
    }

    anyhow::Ok(())
}
