//! One worksheet viewed as a grid of typed cells with 1-based row/column addressing

use calamine::{Data, Range};

static EMPTY: Data = Data::Empty;

/// Bounding rectangle of the non-empty cells of a sheet (1-based, inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsedArea {
    pub first_row: u32,
    pub last_row: u32,
    pub first_col: u32,
    pub last_col: u32,
}

impl UsedArea {
    /// Area reported for a sheet with no content at all
    pub const EMPTY_SHEET: UsedArea = UsedArea {
        first_row: 1,
        last_row: 1,
        first_col: 1,
        last_col: 1,
    };

    fn of(range: &Range<Data>) -> Self {
        let Some((start_row, start_col)) = range.start() else {
            return Self::EMPTY_SHEET;
        };

        let mut area: Option<UsedArea> = None;
        for (row, col, cell) in range.cells() {
            if is_blank(cell) {
                continue;
            }
            let row = start_row + row as u32 + 1;
            let col = start_col + col as u32 + 1;
            area = Some(match area {
                None => UsedArea {
                    first_row: row,
                    last_row: row,
                    first_col: col,
                    last_col: col,
                },
                Some(a) => UsedArea {
                    first_row: a.first_row.min(row),
                    last_row: a.last_row.max(row),
                    first_col: a.first_col.min(col),
                    last_col: a.last_col.max(col),
                },
            });
        }

        area.unwrap_or(Self::EMPTY_SHEET)
    }
}

/// A single worksheet and its used area, computed once
#[derive(Debug, Clone)]
pub struct Sheet {
    range: Range<Data>,
    area: UsedArea,
}

impl Sheet {
    pub fn new(range: Range<Data>) -> Self {
        let area = UsedArea::of(&range);
        Self { range, area }
    }

    /// Build a sheet from rows of cells, row 1 / column 1 first.
    pub fn from_rows(rows: Vec<Vec<Data>>) -> Self {
        let height = rows.len() as u32;
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
        if height == 0 || width == 0 {
            return Self::new(Range::empty());
        }

        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                range.set_value((r as u32, c as u32), value);
            }
        }
        Self::new(range)
    }

    pub fn used_area(&self) -> UsedArea {
        self.area
    }

    /// Cell at a 1-based (row, column); absent cells read as `Data::Empty`
    pub fn cell(&self, row: u32, col: u32) -> &Data {
        if row == 0 || col == 0 {
            return &EMPTY;
        }
        self.range.get_value((row - 1, col - 1)).unwrap_or(&EMPTY)
    }

    /// Trimmed display text of a cell
    pub fn text(&self, row: u32, col: u32) -> String {
        cell_text(self.cell(row, col))
    }
}

/// Trimmed display text of a cell value
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

/// True for empty cells and cells holding only whitespace
pub fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    #[test]
    fn test_used_area_ignores_blank_cells() {
        let sheet = Sheet::from_rows(vec![
            vec![Data::Empty, Data::Empty, Data::Empty],
            vec![Data::Empty, s("Inputs"), Data::Empty],
            vec![Data::Empty, s("  "), Data::Float(2.0)],
            vec![Data::Empty, Data::Empty, Data::Empty],
        ]);

        assert_eq!(
            sheet.used_area(),
            UsedArea {
                first_row: 2,
                last_row: 3,
                first_col: 2,
                last_col: 3,
            }
        );
    }

    #[test]
    fn test_empty_sheet_area() {
        let sheet = Sheet::from_rows(vec![]);
        assert_eq!(sheet.used_area(), UsedArea::EMPTY_SHEET);
        assert_eq!(sheet.cell(1, 1), &Data::Empty);
    }

    #[test]
    fn test_cell_addressing_is_one_based() {
        let sheet = Sheet::from_rows(vec![vec![s("A1"), s(" B1 ")], vec![Data::Int(7)]]);

        assert_eq!(sheet.text(1, 1), "A1");
        assert_eq!(sheet.text(1, 2), "B1");
        assert_eq!(sheet.text(2, 1), "7");
        assert_eq!(sheet.cell(0, 1), &Data::Empty);
        assert_eq!(sheet.cell(40, 40), &Data::Empty);
    }
}
