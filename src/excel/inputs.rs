//! Input workbook reader - Excel (.xlsx) → drift run inputs
//!
//! Layout (first worksheet only):
//!
//! ```text
//! Inputs
//! Folder Address   /data/cycles
//! Recursive        TRUE
//!
//! Data
//! Cycle   Drift Level   Cycle Type
//! 0.50    1.2           Push
//! 4.50    -0.3          Pull
//! ```

use super::cell::{self, CellValue};
use super::sections::{ColumnSpec, KeyValueSectionSpec, SemiStructuredReader, TableSectionSpec};
use super::sheet::Sheet;
use crate::cancel::CancelToken;
use crate::error::{SortError, SortResult};
use crate::types::{CycleUnit, DriftInputs, DriftTable};
use calamine::{open_workbook_auto, Reader};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const INPUTS_MARKER: &str = "Inputs";
pub const DATA_MARKER: &str = "Data";
pub const FOLDER_ADDRESS_KEY: &str = "Folder Address";
pub const RECURSIVE_KEY: &str = "Recursive";
pub const CYCLE_HEADER: &str = "Cycle";
pub const DRIFT_LEVEL_HEADER: &str = "Drift Level";
pub const CYCLE_TYPE_HEADER: &str = "Cycle Type";

/// Reader for the drift input workbook
pub struct ExcelInputReader {
    path: PathBuf,
}

impl ExcelInputReader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Open the workbook and parse it on the blocking pool as one unit of work
    pub async fn read(&self, cancel: &CancelToken) -> SortResult<DriftInputs> {
        if !self.path.is_file() {
            return Err(SortError::FileNotFound(self.path.clone()));
        }
        cancel.check()?;

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let sheet = load_first_sheet(&path)?;
            parse_drift_inputs(&sheet)
        })
        .await?
    }
}

/// First worksheet of a workbook
pub fn load_first_sheet(path: &Path) -> SortResult<Sheet> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| SortError::Workbook(format!("Failed to open Excel file: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SortError::Workbook("Workbook has no worksheets".to_string()))?
        .map_err(|e| SortError::Workbook(format!("Failed to read first worksheet: {}", e)))?;

    Ok(Sheet::new(range))
}

fn inputs_spec() -> KeyValueSectionSpec {
    KeyValueSectionSpec::new(&[INPUTS_MARKER])
        .next_section(&[DATA_MARKER])
        .parser(FOLDER_ADDRESS_KEY, cell::text)
        .parser(RECURSIVE_KEY, cell::boolean)
}

fn data_spec() -> SortResult<TableSectionSpec<CycleUnit>> {
    let columns = vec![
        ColumnSpec::new("Cycle", &[CYCLE_HEADER])?,
        ColumnSpec::new("Drift", &[DRIFT_LEVEL_HEADER, "Drift"])?,
        ColumnSpec::new("Type", &[CYCLE_TYPE_HEADER, "Type"])?,
    ];

    Ok(TableSectionSpec::new(&[DATA_MARKER], columns, |row| {
        Ok(CycleUnit::new(
            row.number("Cycle")?,
            row.number("Drift")?,
            cell::string(row.cell("Type"), ""),
        ))
    })
    .header_markers(&[CYCLE_HEADER])
    .terminator(|row| row.is_blank("Cycle")))
}

/// Parse the `Inputs` and `Data` sections of an input sheet
pub fn parse_drift_inputs(sheet: &Sheet) -> SortResult<DriftInputs> {
    let reader = SemiStructuredReader::new(sheet);

    let inputs = reader.read_key_value_section(&inputs_spec())?;
    let units = reader.read_table_section(&data_spec()?)?;
    debug!(keys = inputs.len(), rows = units.len(), "parsed input sheet");

    let folder_address = match inputs.get(FOLDER_ADDRESS_KEY) {
        Some(CellValue::Text(s)) => PathBuf::from(s),
        _ => return Err(SortError::MissingInput(FOLDER_ADDRESS_KEY.to_string())),
    };

    let recursive = match inputs.get(RECURSIVE_KEY) {
        None | Some(CellValue::Empty) => {
            return Err(SortError::MissingInput(RECURSIVE_KEY.to_string()))
        }
        Some(CellValue::Bool(b)) => *b,
        Some(other) => {
            return Err(SortError::InvalidInput(format!(
                "{} must be a boolean or parsable string, got {:?}",
                RECURSIVE_KEY, other
            )))
        }
    };

    Ok(DriftInputs {
        folder_address,
        recursive,
        data: units.into_iter().collect::<DriftTable>(),
    })
}
