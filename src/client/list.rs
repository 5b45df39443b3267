//! Parses the text lines returned by the LIST command into [`ListEntry`] records.
//!
//! There is no standard for LIST output. Two formats cover practically all servers seen in the
//! wild:
//!
//! * Unix `ls -l` style, e.g. `drwxr-xr-x 1 owner group 4096 Mar 01 12:34 name`, also without the
//!   group column, and with a year instead of a time for older entries.
//! * DOS/IIS style, e.g. `03-01-23  12:34PM  <DIR>  name` or `03-01-23  12:34PM  1234  name`.
//!
//! Lines in neither format are skipped.

use super::{EntryType, ListEntry};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use ftpfs_core::fs::Permissions;

/// Parses all lines of a LIST reply. `now` is used to pick the year for recent entries that are
/// listed with a time of day instead of a year.
pub fn parse_listing<'a, I>(lines: I, now: DateTime<Utc>) -> Vec<ListEntry>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .filter_map(|line| {
            let line = line.trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() || line.starts_with("total ") {
                return None;
            }
            let entry = parse_line(line, now);
            if entry.is_none() {
                tracing::debug!(line, "skipping unrecognized LIST line");
            }
            entry
        })
        .collect()
}

/// Parses a single LIST line.
pub fn parse_line(line: &str, now: DateTime<Utc>) -> Option<ListEntry> {
    parse_unix(line, now).or_else(|| parse_dos(line))
}

fn parse_unix(line: &str, now: DateTime<Utc>) -> Option<ListEntry> {
    let fields: Vec<&str> = line.split_whitespace().take(9).collect();
    let mode = *fields.first()?;
    if mode.len() < 10 || !mode.is_ascii() {
        return None;
    }
    let kind = match mode.as_bytes()[0] {
        b'd' => EntryType::Folder,
        b'l' => EntryType::Link,
        b'-' | b'b' | b'c' | b'p' | b's' => EntryType::File,
        _ => return None,
    };
    let permissions = Permissions::from_symbolic(&mode[1..10])?;

    // With a group column the month is the sixth field, without it the fifth. Servers that don't
    // know the modification time (libunftp writes `--- -- --:--`) still fill three date columns.
    let is_size = |s: &str| s.parse::<u64>().is_ok();
    let (size, date, skip) = if fields.len() >= 9 && month(fields[5]).is_some() {
        (fields[4], &fields[5..8], 8)
    } else if fields.len() >= 8 && month(fields[4]).is_some() {
        (fields[3], &fields[4..7], 7)
    } else if fields.len() >= 9 && is_size(fields[4]) {
        (fields[4], &fields[5..8], 8)
    } else if fields.len() >= 8 && is_size(fields[3]) {
        (fields[3], &fields[4..7], 7)
    } else {
        return None;
    };
    let size = size.parse().ok()?;
    let modified = unix_date(date[0], date[1], date[2], now);

    let mut name = rest_after(line, skip)?;
    let mut target = None;
    if let (EntryType::Link, Some((link, to))) = (kind, name.split_once(" -> ")) {
        name = link;
        target = Some(to.to_string());
    }

    Some(ListEntry {
        name: name.to_string(),
        size,
        kind,
        modified,
        permissions: Some(permissions.0),
        target,
    })
}

fn parse_dos(line: &str) -> Option<ListEntry> {
    let fields: Vec<&str> = line.split_whitespace().take(3).collect();
    if fields.len() < 3 {
        return None;
    }
    let date = dos_date(fields[0])?;
    let time = dos_time(fields[1])?;
    let (kind, size) = if fields[2].eq_ignore_ascii_case("<DIR>") {
        (EntryType::Folder, 0)
    } else {
        (EntryType::File, fields[2].parse().ok()?)
    };
    let name = rest_after(line, 3)?;

    Some(ListEntry {
        name: name.to_string(),
        size,
        kind,
        modified: Some(NaiveDateTime::new(date, time).and_utc()),
        permissions: None,
        target: None,
    })
}

/// Returns what follows the first `n` whitespace separated fields of `line`.
fn rest_after(line: &str, n: usize) -> Option<&str> {
    let mut rest = line.trim_start();
    for _ in 0..n {
        let end = rest.find(char::is_whitespace)?;
        rest = rest[end..].trim_start();
    }
    if rest.is_empty() { None } else { Some(rest) }
}

fn month(s: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = ["jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec"];
    let prefix = s.get(..3)?;
    MONTHS.iter().position(|m| m.eq_ignore_ascii_case(prefix)).map(|i| i as u32 + 1)
}

fn unix_date(mon: &str, day: &str, time_or_year: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let month = month(mon)?;
    let day: u32 = day.parse().ok()?;
    match time_or_year.split_once(':') {
        Some((hour, minute)) => {
            let time = NaiveTime::from_hms_opt(hour.parse().ok()?, minute.parse().ok()?, 0)?;
            // Recent entries omit the year. An entry can't be from the future, so a date more than
            // a day ahead of now belongs to last year.
            let this_year = NaiveDate::from_ymd_opt(now.year(), month, day).map(|d| NaiveDateTime::new(d, time).and_utc());
            match this_year {
                Some(dt) if dt <= now + TimeDelta::days(1) => Some(dt),
                _ => NaiveDate::from_ymd_opt(now.year() - 1, month, day).map(|d| NaiveDateTime::new(d, time).and_utc()),
            }
        }
        None => {
            let year = time_or_year.parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day).map(|d| NaiveDateTime::new(d, NaiveTime::MIN).and_utc())
        }
    }
}

fn dos_date(s: &str) -> Option<NaiveDate> {
    let mut parts = s.split('-');
    let month = parts.next()?.parse().ok()?;
    let day = parts.next()?.parse().ok()?;
    let year_str = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let year: i32 = year_str.parse().ok()?;
    let year = match year_str.len() {
        2 if year < 70 => 2000 + year,
        2 => 1900 + year,
        4 => year,
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn dos_time(s: &str) -> Option<NaiveTime> {
    let upper = s.to_ascii_uppercase();
    let (clock, pm) = if let Some(c) = upper.strip_suffix("PM") {
        (c, Some(true))
    } else if let Some(c) = upper.strip_suffix("AM") {
        (c, Some(false))
    } else {
        (upper.as_str(), None)
    };
    let (hour, minute) = clock.split_once(':')?;
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    let hour = match pm {
        Some(true) if hour < 12 => hour + 12,
        Some(false) if hour == 12 => 0,
        _ => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}
