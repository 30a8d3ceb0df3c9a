//! Full-text index of every non-empty cell, built in one pass over the used area

use super::sheet::Sheet;
use crate::error::{SortError, SortResult};
use std::collections::HashMap;

/// Position of a marker cell (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MarkerPosition {
    pub row: u32,
    pub col: u32,
}

/// Trimmed cell text (case-insensitive) → positions in row-major order
#[derive(Debug, Clone, Default)]
pub struct MarkerIndex {
    index: HashMap<String, Vec<MarkerPosition>>,
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

impl MarkerIndex {
    pub fn build(sheet: &Sheet) -> Self {
        let area = sheet.used_area();
        let mut index: HashMap<String, Vec<MarkerPosition>> = HashMap::new();

        for row in area.first_row..=area.last_row {
            for col in area.first_col..=area.last_col {
                let text = sheet.text(row, col);
                if text.is_empty() {
                    continue;
                }
                index
                    .entry(normalize(&text))
                    .or_default()
                    .push(MarkerPosition { row, col });
            }
        }

        Self { index }
    }

    fn positions<'a>(
        &'a self,
        markers: &'a [String],
    ) -> impl Iterator<Item = MarkerPosition> + 'a {
        markers
            .iter()
            .filter_map(|m| self.index.get(&normalize(m)))
            .flat_map(|positions| positions.iter().copied())
    }

    /// Smallest (row, then column) position among all cells matching any marker
    pub fn find_first(&self, markers: &[String]) -> SortResult<MarkerPosition> {
        if markers.is_empty() {
            return Err(SortError::InvalidInput(
                "At least one marker text is required".to_string(),
            ));
        }

        self.positions(markers)
            .min()
            .ok_or_else(|| SortError::MarkerNotFound {
                markers: markers.join(", "),
            })
    }

    /// Smallest row >= `start_row` in column `col` holding any of the markers
    pub fn find_first_row_in_column_below(
        &self,
        col: u32,
        start_row: u32,
        markers: &[String],
    ) -> Option<u32> {
        self.positions(markers)
            .filter(|p| p.col == col && p.row >= start_row)
            .map(|p| p.row)
            .min()
    }
}
