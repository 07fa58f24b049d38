//! Timestamp: instant + declared precision + UTC offset, per `spec.md` §4.3.

use crate::error::{IonError, IonResult};

/// The granularity at which a timestamp's text/binary form was declared.
/// Round-tripping a timestamp must reproduce this precision exactly
/// (`spec.md` invariant I6), not just an equal instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precision {
    Year,
    Month,
    Day,
    Minute,
    Second,
    /// Second plus a fractional part. `fractional_digits` on the
    /// [`Timestamp`] records how many digits were declared (for text
    /// round-trip of trailing zeros), independent of `subsecond_nanos`,
    /// which holds the truncated-to-nanosecond value (`spec.md` §1: "Out
    /// of scope... sub-nanosecond timestamp fractions may be truncated at
    /// nanosecond precision").
    Fractional,
}

/// `offset_minutes = None` means "unknown local offset" (the binary
/// negative-zero VarInt sentinel, `spec.md` §4.3); `Some(0)` means UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub subsecond_nanos: u32,
    pub fractional_digits: u32,
    pub offset_minutes: Option<i32>,
    pub precision: Precision,
}

const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: u16, month: u8) -> u8 {
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS_IN_MONTH[(month - 1) as usize]
    }
}

impl Timestamp {
    pub fn validate(&self) -> IonResult<()> {
        if self.year == 0 {
            return Err(IonError::syntax(0, "timestamp year must be >= 1"));
        }
        if !(1..=12).contains(&self.month) {
            return Err(IonError::syntax(0, "timestamp month out of range"));
        }
        let max_day = days_in_month(self.year, self.month);
        if self.day == 0 || self.day > max_day {
            return Err(IonError::syntax(0, "timestamp day out of range"));
        }
        if self.hour > 23 {
            return Err(IonError::syntax(0, "timestamp hour out of range"));
        }
        if self.minute > 59 {
            return Err(IonError::syntax(0, "timestamp minute out of range"));
        }
        if self.second > 59 {
            return Err(IonError::syntax(0, "timestamp second out of range"));
        }
        Ok(())
    }

    pub fn year(year: u16) -> IonResult<Timestamp> {
        let ts = Timestamp {
            year,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
            subsecond_nanos: 0,
            fractional_digits: 0,
            offset_minutes: None,
            precision: Precision::Year,
        };
        ts.validate()?;
        Ok(ts)
    }

    pub fn month(year: u16, month: u8) -> IonResult<Timestamp> {
        let mut ts = Timestamp::year(year)?;
        ts.month = month;
        ts.precision = Precision::Month;
        ts.validate()?;
        Ok(ts)
    }

    pub fn day(year: u16, month: u8, day: u8) -> IonResult<Timestamp> {
        let mut ts = Timestamp::month(year, month)?;
        ts.day = day;
        ts.precision = Precision::Day;
        ts.validate()?;
        Ok(ts)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn minute(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        offset_minutes: Option<i32>,
    ) -> IonResult<Timestamp> {
        let mut ts = Timestamp::day(year, month, day)?;
        ts.hour = hour;
        ts.minute = minute;
        ts.offset_minutes = offset_minutes;
        ts.precision = Precision::Minute;
        ts.validate()?;
        Ok(ts)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn second(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        offset_minutes: Option<i32>,
    ) -> IonResult<Timestamp> {
        let mut ts = Timestamp::minute(year, month, day, hour, minute, offset_minutes)?;
        ts.second = second;
        ts.precision = Precision::Second;
        ts.validate()?;
        Ok(ts)
    }

    /// Parses RFC-3339-derived Ion timestamp text (`spec.md` §4.3).
    pub fn parse(text: &str) -> IonResult<Timestamp> {
        let b = text.as_bytes();
        let err = || IonError::syntax(0, "malformed timestamp");
        let digits = |s: &str, n: usize| -> IonResult<u32> {
            if s.len() != n || !s.bytes().all(|c| c.is_ascii_digit()) {
                return Err(err());
            }
            s.parse().map_err(|_| err())
        };
        if b.len() < 5 {
            return Err(err());
        }
        let year = digits(&text[0..4], 4)? as u16;
        if b[4] == b'T' {
            return Timestamp::year(year);
        }
        if b.len() < 7 || b[4] != b'-' {
            return Err(err());
        }
        let month = digits(&text[5..7], 2)? as u8;
        if b.len() == 8 && b[7] == b'T' {
            return Timestamp::month(year, month);
        }
        if b.len() < 10 || b[7] != b'-' {
            return Err(err());
        }
        let day = digits(&text[8..10], 2)? as u8;
        if b.len() == 10 {
            return Timestamp::day(year, month, day);
        }
        if b[10] != b'T' {
            return Err(err());
        }
        if b.len() == 11 {
            return Timestamp::day(year, month, day);
        }
        // yyyy-mm-ddThh:mm(:ss(.fraction))?(Z|+hh:mm|-hh:mm)
        if b.len() < 17 {
            return Err(err());
        }
        let hour = digits(&text[11..13], 2)? as u8;
        if b[13] != b':' {
            return Err(err());
        }
        let minute = digits(&text[14..16], 2)? as u8;
        let mut i = 16;
        let (second, subsecond_nanos, fractional_digits, precision) = if b.get(i) == Some(&b':') {
            i += 1;
            if text.len() < i + 2 {
                return Err(err());
            }
            let second = digits(&text[i..i + 2], 2)? as u8;
            i += 2;
            if b.get(i) == Some(&b'.') {
                i += 1;
                let frac_start = i;
                while i < b.len() && b[i].is_ascii_digit() {
                    i += 1;
                }
                let frac_str = &text[frac_start..i];
                if frac_str.is_empty() {
                    return Err(err());
                }
                let nanos = fractional_str_to_nanos(frac_str);
                (second, nanos, frac_str.len() as u32, Precision::Fractional)
            } else {
                (second, 0, 0, Precision::Second)
            }
        } else {
            (0, 0, 0, Precision::Minute)
        };
        let offset_minutes = parse_offset(&text[i..])?;
        let ts = Timestamp {
            year,
            month,
            day,
            hour,
            minute,
            second,
            subsecond_nanos,
            fractional_digits,
            offset_minutes,
            precision,
        };
        ts.validate()?;
        Ok(ts)
    }

    /// Produces RFC-3339-derived canonical text at the declared precision.
    pub fn format(&self) -> String {
        let mut out = format!("{:04}", self.year);
        if self.precision == Precision::Year {
            out.push('T');
            return out;
        }
        out.push_str(&format!("-{:02}", self.month));
        if self.precision == Precision::Month {
            out.push('T');
            return out;
        }
        out.push_str(&format!("-{:02}", self.day));
        if self.precision == Precision::Day {
            out.push('T');
            return out;
        }
        out.push_str(&format!("T{:02}:{:02}", self.hour, self.minute));
        if self.precision >= Precision::Second {
            out.push_str(&format!(":{:02}", self.second));
        }
        if self.precision == Precision::Fractional {
            out.push('.');
            out.push_str(&nanos_to_fractional_str(
                self.subsecond_nanos,
                self.fractional_digits,
            ));
        }
        match self.offset_minutes {
            None => out.push_str("-00:00"),
            Some(0) => out.push('Z'),
            Some(m) => {
                let sign = if m < 0 { '-' } else { '+' };
                let m = m.unsigned_abs();
                out.push_str(&format!("{sign}{:02}:{:02}", m / 60, m % 60));
            }
        }
        out
    }
}

fn fractional_str_to_nanos(digits: &str) -> u32 {
    let mut padded = digits.to_string();
    padded.truncate(9);
    while padded.len() < 9 {
        padded.push('0');
    }
    padded.parse().unwrap_or(0)
}

fn nanos_to_fractional_str(nanos: u32, declared_digits: u32) -> String {
    let full = format!("{nanos:09}");
    let digits = declared_digits.clamp(1, 9) as usize;
    full[..digits].to_string()
}

fn parse_offset(text: &str) -> IonResult<Option<i32>> {
    let err = || IonError::syntax(0, "malformed timestamp offset");
    if text == "Z" || text == "z" {
        return Ok(Some(0));
    }
    if text == "-00:00" {
        return Ok(None);
    }
    let bytes = text.as_bytes();
    if bytes.len() != 6 || bytes[3] != b':' {
        return Err(err());
    }
    let sign = match bytes[0] {
        b'+' => 1i32,
        b'-' => -1i32,
        _ => return Err(err()),
    };
    let hours: i32 = text[1..3].parse().map_err(|_| err())?;
    let minutes: i32 = text[4..6].parse().map_err(|_| err())?;
    if hours > 23 || minutes > 59 {
        return Err(err());
    }
    Ok(Some(sign * (hours * 60 + minutes)))
}
