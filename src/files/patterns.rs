//! Filename grammars for cycle files
//!
//! - Fixed camera: `Left_12619 _2025-11-03-09-54-23_Cy-0.50.jpg`. Letters, an id,
//!   the six timestamp fields, `_Cy-` and a dotted cycle. Names already written by
//!   the cycle templates (`Left_2025-11-03-09-54-23_Cy-0.50 (12619).jpg`) carry the
//!   id in a trailing parenthesized group instead, and match too.
//! - Cycle number: anything, the timestamp, `-`/`_`, `cy` in any case, an optional
//!   `-` or space, the cycle, an optional `(id)` and an optional extension.

use crate::types::CycleFileWithDate;
use chrono::{NaiveDate, NaiveDateTime};
use regex::{Captures, Regex};
use std::path::Path;
use std::sync::LazyLock;

static FIXED_CAMERA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<prefix>[A-Za-z]+?)_*(?:(?P<id>\d+)\s*_)?(?P<year>\d{4})-(?P<month>\d{2})-(?P<day>\d{2})-(?P<hour>\d{2})-(?P<minute>\d{2})-(?P<second>\d{2})_Cy-(?P<cycle>\d+\.\d+)(?P<tail>.*?)(?P<extension>\.[^.]+)$",
    )
    .expect("fixed camera grammar is valid")
});

static TRAILING_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((?P<id>\d+)\)").expect("trailing id pattern is valid"));

static CYCLE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<prefix>.*?)(?P<year>\d{4})-(?P<month>\d{2})-(?P<day>\d{2})-(?P<hour>\d{2})-(?P<minute>\d{2})-(?P<second>\d{2})[-_](?i:cy)[- ]?(?P<cycle>\d+(?:\.\d+)?)(?:\s*\((?P<id>\d+)\))?(?P<extension>\.\w+)?$",
    )
    .expect("cycle number grammar is valid")
});

/// The two named filename grammars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    FixedCamera,
    CycleNumber,
}

impl Grammar {
    /// Match a file's name; `None` means "no match", never an error
    pub fn parse(self, path: &Path) -> Option<CycleFileWithDate> {
        let name = path.file_name()?.to_str()?;
        let parts = match self {
            Grammar::FixedCamera => parse_fixed_camera(name)?,
            Grammar::CycleNumber => parse_cycle_number(name)?,
        };
        Some(CycleFileWithDate::new(
            path.to_path_buf(),
            parts.date_taken,
            parts.cycle_number,
            parts.prefix,
            parts.id,
        ))
    }
}

/// Identity pieces extracted from a file name
#[derive(Debug, Clone, PartialEq)]
pub struct NameParts {
    pub prefix: String,
    pub id: String,
    pub date_taken: NaiveDateTime,
    pub cycle_number: f64,
}

fn field(caps: &Captures<'_>, name: &str) -> Option<u32> {
    caps.name(name)?.as_str().parse().ok()
}

fn timestamp(caps: &Captures<'_>) -> Option<NaiveDateTime> {
    let year = caps.name("year")?.as_str().parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, field(caps, "month")?, field(caps, "day")?)?.and_hms_opt(
        field(caps, "hour")?,
        field(caps, "minute")?,
        field(caps, "second")?,
    )
}

fn cycle(caps: &Captures<'_>) -> Option<f64> {
    // `str::parse` always uses `.` as the decimal point
    caps.name("cycle")?.as_str().parse::<f64>().ok()
}

/// Fixed-camera grammar; prefix, id, timestamp and cycle are all required
pub fn parse_fixed_camera(name: &str) -> Option<NameParts> {
    let caps = FIXED_CAMERA.captures(name)?;

    let id = match caps.name("id") {
        Some(id) => id.as_str().to_string(),
        None => {
            let tail = caps.name("tail")?.as_str();
            TRAILING_ID
                .captures_iter(tail)
                .last()?
                .name("id")?
                .as_str()
                .to_string()
        }
    };

    Some(NameParts {
        prefix: caps.name("prefix")?.as_str().to_string(),
        id,
        date_taken: timestamp(&caps)?,
        cycle_number: cycle(&caps)?,
    })
}

/// Cycle-number grammar; the id defaults to an empty string
pub fn parse_cycle_number(name: &str) -> Option<NameParts> {
    let caps = CYCLE_NUMBER.captures(name)?;

    let prefix = caps
        .name("prefix")
        .map(|p| p.as_str().trim_end_matches(['_', '-', ' ']).to_string())
        .unwrap_or_default();
    // the prefix becomes a folder name; `.`/`..` would escape the destination
    if prefix == "." || prefix == ".." {
        return None;
    }

    Some(NameParts {
        prefix,
        id: caps
            .name("id")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        date_taken: timestamp(&caps)?,
        cycle_number: cycle(&caps)?,
    })
}
