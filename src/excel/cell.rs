//! Cell value coercion: best-guess typing plus typed accessors with defaults
//!
//! Text that looks numeric is parsed with the invariant convention: `.` is the
//! decimal point and `,` is only ever a thousands separator.

use super::sheet::{cell_text, is_blank};
use calamine::{Data, DataType};
use chrono::NaiveDateTime;

/// Auto-typed value of a single cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Int(i32),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(f64::from(*i)),
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Enumerations that can be read from a cell by case-insensitive name
pub trait CellEnum: Sized + Copy + 'static {
    const NAMES: &'static [(&'static str, Self)];
}

/// Best-guess conversion of a cell
pub fn auto(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::Float(f) => number(*f),
        Data::Int(i) => number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(dt) => CellValue::DateTime(dt),
            None => text_value(cell),
        },
        _ => text_value(cell),
    }
}

fn number(d: f64) -> CellValue {
    let rounded = d.round();
    if (d - rounded).abs() < 1e-12 && rounded <= f64::from(i32::MAX) && rounded >= f64::from(i32::MIN)
    {
        CellValue::Int(rounded as i32)
    } else {
        CellValue::Number(d)
    }
}

fn text_value(cell: &Data) -> CellValue {
    let s = cell_text(cell);
    if s.is_empty() {
        return CellValue::Empty;
    }
    if let Some(i) = parse_invariant_int(&s) {
        return CellValue::Int(i);
    }
    if let Some(d) = parse_invariant_float(&s) {
        return CellValue::Number(d);
    }
    CellValue::Text(s)
}

/// Integer text: optional sign and digits, no grouping separators
pub fn parse_invariant_int(s: &str) -> Option<i32> {
    s.trim().parse::<i32>().ok()
}

/// Decimal text: optional sign, digits with `,` grouping, `.` decimal point, exponent
pub fn parse_invariant_float(s: &str) -> Option<f64> {
    let s = s.trim();
    if !s.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | ',' | 'e' | 'E'))
    {
        return None;
    }
    s.replace(',', "").parse::<f64>().ok()
}

/// Integer value of a cell, or `default` when empty or unparsable
pub fn int(cell: &Data, default: i32) -> i32 {
    if is_blank(cell) {
        return default;
    }
    match cell {
        Data::Float(f) => {
            let rounded = f.round();
            if rounded >= f64::from(i32::MIN) && rounded <= f64::from(i32::MAX) {
                rounded as i32
            } else {
                default
            }
        }
        Data::Int(i) => i32::try_from(*i).unwrap_or(default),
        _ => parse_invariant_int(&cell_text(cell)).unwrap_or(default),
    }
}

/// Floating-point value of a cell, or `default` when empty or unparsable
pub fn double(cell: &Data, default: f64) -> f64 {
    try_double(cell).unwrap_or(default)
}

/// Floating-point value of a cell; `None` when blank or not numeric
pub fn try_double(cell: &Data) -> Option<f64> {
    if is_blank(cell) {
        return None;
    }
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        _ => parse_invariant_float(&cell_text(cell)),
    }
}

/// Trimmed text of a cell, or `default` when blank
pub fn string(cell: &Data, default: &str) -> String {
    let s = cell_text(cell);
    if s.is_empty() {
        default.to_string()
    } else {
        s
    }
}

/// Enumeration member named by the cell text (case-insensitive), or `default`
pub fn enumeration<T: CellEnum>(cell: &Data, default: T) -> T {
    let s = string(cell, "");
    if s.is_empty() {
        return default;
    }
    T::NAMES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(&s))
        .map(|(_, value)| *value)
        .unwrap_or(default)
}

/// Boolean cell, or text reading `true`/`false` in any case
pub fn boolean(cell: &Data) -> CellValue {
    match cell {
        Data::Bool(b) => CellValue::Bool(*b),
        _ => {
            let s = cell_text(cell);
            if s.eq_ignore_ascii_case("true") {
                CellValue::Bool(true)
            } else if s.eq_ignore_ascii_case("false") {
                CellValue::Bool(false)
            } else if s.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s)
            }
        }
    }
}

/// Text of a cell, never reinterpreted as a number
pub fn text(cell: &Data) -> CellValue {
    let s = cell_text(cell);
    if s.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(s)
    }
}
