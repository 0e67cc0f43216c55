//! Timezone names and UTC offsets
//!
//! Zone names resolve through the IANA database shipped with `chrono-tz`;
//! a small table covers the abbreviations PostgreSQL accepts by default.

use chrono::{NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sign of a UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetDirection {
    Plus,
    Minus,
}

/// A UTC offset as an `(hour, minute, direction)` triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimezoneOffset {
    pub hour: u8,
    pub minute: u8,
    pub direction: OffsetDirection,
}

/// Largest offset PostgreSQL accepts, in minutes (15:59)
pub const MAX_OFFSET_MINUTES: i32 = 15 * 60 + 59;

impl TimezoneOffset {
    pub const UTC: Self = Self {
        hour: 0,
        minute: 0,
        direction: OffsetDirection::Plus,
    };

    /// Build from signed minutes east of UTC
    pub fn from_minutes(minutes: i32) -> Option<Self> {
        if minutes.abs() > MAX_OFFSET_MINUTES {
            return None;
        }
        let direction = if minutes < 0 {
            OffsetDirection::Minus
        } else {
            OffsetDirection::Plus
        };
        let abs = minutes.unsigned_abs();
        Some(Self {
            hour: (abs / 60) as u8,
            minute: (abs % 60) as u8,
            direction,
        })
    }

    /// Signed minutes east of UTC
    pub fn total_minutes(&self) -> i32 {
        let minutes = self.hour as i32 * 60 + self.minute as i32;
        match self.direction {
            OffsetDirection::Plus => minutes,
            OffsetDirection::Minus => -minutes,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.hour == 0 && self.minute == 0
    }

    /// Parse `Z`, `±HH`, `±HHMM` or `±HH:MM`
    pub fn parse(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("z") {
            return Some(Self::UTC);
        }
        let (direction, body) = match text.as_bytes().first()? {
            b'+' => (OffsetDirection::Plus, &text[1..]),
            b'-' => (OffsetDirection::Minus, &text[1..]),
            _ => return None,
        };
        if !body.chars().all(|c| c.is_ascii_digit() || c == ':') {
            return None;
        }
        let (hour, minute) = match (body.len(), body.find(':')) {
            (1 | 2, None) => (body, "0"),
            (4, None) => (&body[..2], &body[2..]),
            (4 | 5, Some(i)) if i >= 1 => (&body[..i], &body[i + 1..]),
            _ => return None,
        };
        let hour: u8 = hour.parse().ok()?;
        let minute: u8 = minute.parse().ok()?;
        if minute > 59 {
            return None;
        }
        let direction = if hour == 0 && minute == 0 {
            OffsetDirection::Plus
        } else {
            direction
        };
        let offset = Self {
            hour,
            minute,
            direction,
        };
        (offset.total_minutes().abs() <= MAX_OFFSET_MINUTES).then_some(offset)
    }
}

impl fmt::Display for TimezoneOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_offset(self, OffsetFormat::default()))
    }
}

/// How a zero offset is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroOffset {
    /// `+00:00`
    #[default]
    Numeric,
    /// `Z`
    Z,
    /// nothing at all
    Empty,
}

/// Options for [`format_offset`]
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetFormat {
    pub zero: ZeroOffset,
}

/// Render an offset as `±HH:MM`
pub fn format_offset(offset: &TimezoneOffset, options: OffsetFormat) -> String {
    if offset.is_zero() {
        match options.zero {
            ZeroOffset::Z => return "Z".to_string(),
            ZeroOffset::Empty => return String::new(),
            ZeroOffset::Numeric => {}
        }
    }
    let sign = match offset.direction {
        OffsetDirection::Minus if !offset.is_zero() => '-',
        _ => '+',
    };
    format!("{}{:02}:{:02}", sign, offset.hour, offset.minute)
}

const ABBREVIATIONS: &[(&str, i32)] = &[
    ("UTC", 0),
    ("UT", 0),
    ("GMT", 0),
    ("Z", 0),
    ("ZULU", 0),
    ("WET", 0),
    ("WEST", 60),
    ("BST", 60),
    ("CET", 60),
    ("CEST", 120),
    ("MET", 60),
    ("MEST", 120),
    ("EET", 120),
    ("EEST", 180),
    ("MSK", 180),
    ("IST", 120),
    ("JST", 540),
    ("KST", 540),
    ("HKT", 480),
    ("AWST", 480),
    ("ACST", 570),
    ("AEST", 600),
    ("AEDT", 660),
    ("NZST", 720),
    ("NZDT", 780),
    ("AST", -240),
    ("ADT", -180),
    ("EST", -300),
    ("EDT", -240),
    ("CST", -360),
    ("CDT", -300),
    ("MST", -420),
    ("MDT", -360),
    ("PST", -480),
    ("PDT", -420),
    ("AKST", -540),
    ("AKDT", -480),
    ("HST", -600),
];

fn abbreviation_offset(name: &str) -> Option<i32> {
    ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| abbr.eq_ignore_ascii_case(name))
        .map(|(_, minutes)| *minutes)
}

fn lookup_zone(name: &str) -> Option<Tz> {
    name.parse::<Tz>().ok()
}

/// Check whether `name` is a known zone name or abbreviation
pub fn is_valid_timezone(name: &str) -> bool {
    timezone_offset_minutes(name).is_some()
}

/// Current UTC offset of a zone name or abbreviation, in minutes
///
/// `None` means the name is not recognized.
pub fn timezone_offset_minutes(name: &str) -> Option<i32> {
    if let Some(minutes) = abbreviation_offset(name) {
        return Some(minutes);
    }
    let Some(tz) = lookup_zone(name) else {
        log::trace!("unrecognized timezone {:?}", name);
        return None;
    };
    let now = Utc::now().naive_utc();
    Some(seconds_to_minutes(tz.offset_from_utc_datetime(&now).fix().local_minus_utc()))
}

/// UTC offset of a zone at a given wall-clock time, in minutes
///
/// Wall-clock times inside a daylight-saving gap resolve with the offset in
/// effect at the same UTC reading.
pub fn timezone_offset_at(name: &str, local: &NaiveDateTime) -> Option<i32> {
    if let Some(minutes) = abbreviation_offset(name) {
        return Some(minutes);
    }
    let tz = lookup_zone(name)?;
    let seconds = match tz.from_local_datetime(local).earliest() {
        Some(dt) => dt.offset().fix().local_minus_utc(),
        None => tz.offset_from_utc_datetime(local).fix().local_minus_utc(),
    };
    Some(seconds_to_minutes(seconds))
}

/// Round an offset in seconds to the nearest minute
///
/// Local mean time offsets in the tz database carry seconds (New York used
/// `-04:56:02` until 1883); offsets here have minute precision.
fn seconds_to_minutes(seconds: i32) -> i32 {
    (seconds + 30).div_euclid(60)
}
