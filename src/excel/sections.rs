//! Semi-structured sheet reader
//!
//! Sections are located by marker cells rather than fixed indices. A section is
//! either a block of key/value rows or a table with a header row; its end is the
//! first of: an explicit end marker, the next section's start marker, or the end
//! of the used area. Readers may stop earlier on a blank key or a row terminator.

use super::cell::{self, CellValue};
use super::markers::MarkerIndex;
use super::sheet::{is_blank, Sheet, UsedArea};
use crate::error::{SortError, SortResult};
use calamine::Data;
use std::collections::HashMap;

/// Parser applied to a value cell instead of auto-typing
pub type CellParser = Box<dyn Fn(&Data) -> CellValue + Send + Sync>;

/// Produces one item from a data row
pub type RowFactory<T> = Box<dyn Fn(&TableRow<'_>) -> SortResult<T> + Send + Sync>;

/// Returns true on the first row that is no longer part of the table
pub type RowTerminator = Box<dyn Fn(&TableRow<'_>) -> bool + Send + Sync>;

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn contains_ignore_case(items: &[String], value: &str) -> bool {
    items.iter().any(|item| item.eq_ignore_ascii_case(value))
}

//==============================================================================
// Specs
//==============================================================================

/// A logical column and the header texts it may appear under
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub logical_name: String,
    pub header_aliases: Vec<String>,
}

impl ColumnSpec {
    /// Fails when no alias is given
    pub fn new(logical_name: &str, header_aliases: &[&str]) -> SortResult<Self> {
        if header_aliases.is_empty() {
            return Err(SortError::InvalidInput(format!(
                "Column '{}' needs at least one header alias",
                logical_name
            )));
        }
        Ok(Self {
            logical_name: logical_name.to_string(),
            header_aliases: to_strings(header_aliases),
        })
    }

    /// First alias (in declared order) present in the header map
    fn resolve(&self, headers: &HeaderMap) -> Option<u32> {
        self.header_aliases.iter().find_map(|a| headers.get(a))
    }
}

/// Key/value section anchored under a start marker
pub struct KeyValueSectionSpec {
    pub start_markers: Vec<String>,
    /// Stop when the key column holds one of these
    pub end_markers: Vec<String>,
    /// Stop at the next section's marker when sections are back-to-back
    pub next_section_start_markers: Vec<String>,
    pub start_row_offset: u32,
    pub key_col_offset: u32,
    pub value_col_offset: u32,
    per_key_parsers: HashMap<String, CellParser>,
}

impl KeyValueSectionSpec {
    pub fn new(start_markers: &[&str]) -> Self {
        Self {
            start_markers: to_strings(start_markers),
            end_markers: Vec::new(),
            next_section_start_markers: Vec::new(),
            start_row_offset: 1,
            key_col_offset: 0,
            value_col_offset: 1,
            per_key_parsers: HashMap::new(),
        }
    }

    pub fn end_markers(mut self, markers: &[&str]) -> Self {
        self.end_markers = to_strings(markers);
        self
    }

    pub fn next_section(mut self, markers: &[&str]) -> Self {
        self.next_section_start_markers = to_strings(markers);
        self
    }

    pub fn offsets(mut self, start_row: u32, key_col: u32, value_col: u32) -> Self {
        self.start_row_offset = start_row;
        self.key_col_offset = key_col;
        self.value_col_offset = value_col;
        self
    }

    /// Register a parser for one key (matched case-insensitively)
    pub fn parser(
        mut self,
        key: &str,
        parser: impl Fn(&Data) -> CellValue + Send + Sync + 'static,
    ) -> Self {
        self.per_key_parsers
            .insert(key.trim().to_lowercase(), Box::new(parser));
        self
    }

    fn parser_for(&self, key: &str) -> Option<&CellParser> {
        self.per_key_parsers.get(&key.to_lowercase())
    }
}

/// Table section: a header row somewhere below a start marker, then data rows
pub struct TableSectionSpec<T> {
    pub start_markers: Vec<String>,
    pub end_markers: Vec<String>,
    pub next_section_start_markers: Vec<String>,
    pub start_row_offset: u32,
    pub base_col_offset: u32,
    pub header_search_max_rows: u32,
    pub header_row_scan_max_cols: u32,
    /// Header row is the first whose base-column cell reads one of these.
    /// When empty, it is the first row where every column resolves.
    pub header_marker_texts: Vec<String>,
    pub columns: Vec<ColumnSpec>,
    terminator: Option<RowTerminator>,
    row_factory: RowFactory<T>,
}

impl<T> TableSectionSpec<T> {
    pub fn new(
        start_markers: &[&str],
        columns: Vec<ColumnSpec>,
        row_factory: impl Fn(&TableRow<'_>) -> SortResult<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            start_markers: to_strings(start_markers),
            end_markers: Vec::new(),
            next_section_start_markers: Vec::new(),
            start_row_offset: 1,
            base_col_offset: 0,
            header_search_max_rows: 50,
            header_row_scan_max_cols: 100,
            header_marker_texts: Vec::new(),
            columns,
            terminator: None,
            row_factory: Box::new(row_factory),
        }
    }

    pub fn end_markers(mut self, markers: &[&str]) -> Self {
        self.end_markers = to_strings(markers);
        self
    }

    pub fn next_section(mut self, markers: &[&str]) -> Self {
        self.next_section_start_markers = to_strings(markers);
        self
    }

    pub fn offsets(mut self, start_row: u32, base_col: u32) -> Self {
        self.start_row_offset = start_row;
        self.base_col_offset = base_col;
        self
    }

    pub fn header_search(mut self, max_rows: u32, max_cols: u32) -> Self {
        self.header_search_max_rows = max_rows;
        self.header_row_scan_max_cols = max_cols;
        self
    }

    pub fn header_markers(mut self, texts: &[&str]) -> Self {
        self.header_marker_texts = to_strings(texts);
        self
    }

    pub fn terminator(
        mut self,
        terminator: impl Fn(&TableRow<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.terminator = Some(Box::new(terminator));
        self
    }

    fn has_all_required_headers(&self, headers: &HeaderMap) -> bool {
        self.columns.iter().all(|c| c.resolve(headers).is_some())
    }
}

//==============================================================================
// Results
//==============================================================================

/// Key/value pairs read from a section; keys compare case-insensitively
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyValueSection {
    entries: HashMap<String, (String, CellValue)>,
}

impl KeyValueSection {
    fn insert(&mut self, key: String, value: CellValue) {
        self.entries.insert(key.to_lowercase(), (key, value));
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.entries
            .get(&key.trim().to_lowercase())
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pairs with the key text as last written in the sheet
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.entries.values().map(|(k, v)| (k.as_str(), v))
    }
}

/// Header text (case-insensitive) → column; the first duplicate wins
#[derive(Debug, Clone, Default)]
struct HeaderMap(HashMap<String, u32>);

impl HeaderMap {
    fn get(&self, header: &str) -> Option<u32> {
        self.0.get(&header.trim().to_lowercase()).copied()
    }
}

/// One data row of a table section, with its logical columns resolved
pub struct TableRow<'a> {
    sheet: &'a Sheet,
    row: u32,
    columns: &'a HashMap<String, u32>,
}

impl<'a> TableRow<'a> {
    pub fn row(&self) -> u32 {
        self.row
    }

    /// Sheet column of a logical column
    pub fn column(&self, logical_name: &str) -> Option<u32> {
        self.columns.get(&logical_name.to_lowercase()).copied()
    }

    /// Cell of a logical column on this row; unknown names read as empty
    pub fn cell(&self, logical_name: &str) -> &'a Data {
        match self.column(logical_name) {
            Some(col) => self.sheet.cell(self.row, col),
            None => self.sheet.cell(0, 0),
        }
    }

    pub fn is_blank(&self, logical_name: &str) -> bool {
        is_blank(self.cell(logical_name))
    }

    /// Numeric value of a logical column; blank or non-numeric cells are an error
    pub fn number(&self, logical_name: &str) -> SortResult<f64> {
        let data = self.cell(logical_name);
        cell::try_double(data).ok_or_else(|| {
            SortError::InvalidInput(format!(
                "'{}' at row {}, column {} is not a number: {:?}",
                logical_name,
                self.row,
                self.column(logical_name).unwrap_or(0),
                super::sheet::cell_text(data)
            ))
        })
    }
}

//==============================================================================
// Reader
//==============================================================================

/// Reads marker-anchored sections out of one sheet
pub struct SemiStructuredReader<'a> {
    sheet: &'a Sheet,
    area: UsedArea,
    markers: MarkerIndex,
}

impl<'a> SemiStructuredReader<'a> {
    pub fn new(sheet: &'a Sheet) -> Self {
        Self {
            sheet,
            area: sheet.used_area(),
            markers: MarkerIndex::build(sheet),
        }
    }

    pub fn read_key_value_section(&self, spec: &KeyValueSectionSpec) -> SortResult<KeyValueSection> {
        let anchor = self.markers.find_first(&spec.start_markers)?;
        let start_row = anchor.row + spec.start_row_offset;
        let key_col = anchor.col + spec.key_col_offset;
        let value_col = anchor.col + spec.value_col_offset;

        let stop_row = self.resolve_stop_row_exclusive(
            start_row,
            key_col,
            &spec.end_markers,
            &spec.next_section_start_markers,
        );

        let mut result = KeyValueSection::default();
        for row in start_row..stop_row {
            let key = self.sheet.text(row, key_col);
            if key.is_empty() {
                break;
            }
            if contains_ignore_case(&spec.end_markers, &key)
                || contains_ignore_case(&spec.next_section_start_markers, &key)
            {
                break;
            }

            let value_cell = self.sheet.cell(row, value_col);
            let value = match spec.parser_for(&key) {
                Some(parser) => parser(value_cell),
                None => cell::auto(value_cell),
            };
            result.insert(key, value);
        }

        Ok(result)
    }

    pub fn read_table_section<T>(&self, spec: &TableSectionSpec<T>) -> SortResult<Vec<T>> {
        let anchor = self.markers.find_first(&spec.start_markers)?;
        let base_row = anchor.row + spec.start_row_offset;
        let base_col = anchor.col + spec.base_col_offset;

        let header_row = self.find_header_row(spec, base_row, base_col)?;
        let headers = self.build_header_map(header_row, spec.header_row_scan_max_cols);

        let mut columns = HashMap::with_capacity(spec.columns.len());
        for column in &spec.columns {
            let col = column
                .resolve(&headers)
                .ok_or_else(|| SortError::ColumnNotResolved {
                    column: column.logical_name.clone(),
                    aliases: column.header_aliases.join(", "),
                })?;
            columns.insert(column.logical_name.to_lowercase(), col);
        }

        let first_data_row = header_row + 1;
        let stop_row = self.resolve_stop_row_exclusive(
            first_data_row,
            base_col,
            &spec.end_markers,
            &spec.next_section_start_markers,
        );

        let mut items = Vec::with_capacity(stop_row.saturating_sub(first_data_row).max(8) as usize);
        for row in first_data_row..stop_row {
            let table_row = TableRow {
                sheet: self.sheet,
                row,
                columns: &columns,
            };
            if let Some(terminator) = &spec.terminator {
                if terminator(&table_row) {
                    break;
                }
            }
            items.push((spec.row_factory)(&table_row)?);
        }

        Ok(items)
    }

    fn find_header_row<T>(
        &self,
        spec: &TableSectionSpec<T>,
        base_row: u32,
        base_col: u32,
    ) -> SortResult<u32> {
        let max_row = self
            .area
            .last_row
            .min(base_row.saturating_add(spec.header_search_max_rows));

        for row in base_row..=max_row {
            if !spec.header_marker_texts.is_empty() {
                let text = self.sheet.text(row, base_col);
                if !text.is_empty() && contains_ignore_case(&spec.header_marker_texts, &text) {
                    return Ok(row);
                }
            } else {
                let headers = self.build_header_map(row, spec.header_row_scan_max_cols);
                if spec.has_all_required_headers(&headers) {
                    return Ok(row);
                }
            }
        }

        Err(SortError::HeaderNotFound {
            markers: spec.start_markers.join(", "),
        })
    }

    fn build_header_map(&self, row: u32, max_cols: u32) -> HeaderMap {
        let first_col = self.area.first_col;
        let last_col = self
            .area
            .last_col
            .min((first_col + max_cols).saturating_sub(1));

        let mut map = HashMap::new();
        for col in first_col..=last_col {
            let name = self.sheet.text(row, col);
            if name.is_empty() {
                continue;
            }
            map.entry(name.to_lowercase()).or_insert(col);
        }
        HeaderMap(map)
    }

    fn resolve_stop_row_exclusive(
        &self,
        start_row: u32,
        marker_col: u32,
        end_markers: &[String],
        next_start_markers: &[String],
    ) -> u32 {
        let mut stop = self.area.last_row + 1;

        for markers in [end_markers, next_start_markers] {
            if markers.is_empty() {
                continue;
            }
            if let Some(row) = self
                .markers
                .find_first_row_in_column_below(marker_col, start_row, markers)
            {
                stop = stop.min(row);
            }
        }

        stop
    }
}
