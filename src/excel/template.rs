//! Input workbook template writer

use super::inputs::{
    CYCLE_HEADER, CYCLE_TYPE_HEADER, DATA_MARKER, DRIFT_LEVEL_HEADER, FOLDER_ADDRESS_KEY,
    INPUTS_MARKER, RECURSIVE_KEY,
};
use crate::error::{SortError, SortResult};
use crate::types::CycleUnit;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::{Path, PathBuf};

fn export_err(what: &str) -> impl FnOnce(XlsxError) -> SortError + '_ {
    move |e| SortError::Workbook(format!("Failed to write {}: {}", what, e))
}

/// Writes an input workbook the drift reader accepts
#[derive(Debug, Clone, Default)]
pub struct InputTemplate {
    folder_address: PathBuf,
    recursive: bool,
    rows: Vec<CycleUnit>,
}

impl InputTemplate {
    pub fn new<P: AsRef<Path>>(folder_address: P, recursive: bool) -> Self {
        Self {
            folder_address: folder_address.as_ref().to_path_buf(),
            recursive,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<CycleUnit>) -> Self {
        self.rows = rows;
        self
    }

    /// Save the workbook to `output_path`
    pub fn write<P: AsRef<Path>>(&self, output_path: P) -> SortResult<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name("Input")
            .map_err(export_err("worksheet name"))?;

        self.write_inputs(worksheet)?;
        self.write_data(worksheet, 4)?;

        worksheet
            .set_column_width(0, 18)
            .map_err(export_err("column width"))?;
        worksheet
            .set_column_width(1, 40)
            .map_err(export_err("column width"))?;

        workbook
            .save(output_path.as_ref())
            .map_err(|e| SortError::Workbook(format!("Failed to save Excel file: {}", e)))?;

        Ok(())
    }

    fn write_inputs(&self, worksheet: &mut Worksheet) -> SortResult<()> {
        let bold = Format::new().set_bold();

        worksheet
            .write_string_with_format(0, 0, INPUTS_MARKER, &bold)
            .map_err(export_err("marker"))?;
        worksheet
            .write_string(1, 0, FOLDER_ADDRESS_KEY)
            .map_err(export_err("key"))?;
        worksheet
            .write_string(1, 1, self.folder_address.to_string_lossy())
            .map_err(export_err("value"))?;
        worksheet
            .write_string(2, 0, RECURSIVE_KEY)
            .map_err(export_err("key"))?;
        worksheet
            .write_boolean(2, 1, self.recursive)
            .map_err(export_err("value"))?;

        Ok(())
    }

    fn write_data(&self, worksheet: &mut Worksheet, start_row: u32) -> SortResult<()> {
        let bold = Format::new().set_bold();

        worksheet
            .write_string_with_format(start_row, 0, DATA_MARKER, &bold)
            .map_err(export_err("marker"))?;

        let header_row = start_row + 1;
        for (col, header) in [CYCLE_HEADER, DRIFT_LEVEL_HEADER, CYCLE_TYPE_HEADER]
            .iter()
            .enumerate()
        {
            worksheet
                .write_string_with_format(header_row, col as u16, *header, &bold)
                .map_err(export_err("header"))?;
        }

        for (idx, unit) in self.rows.iter().enumerate() {
            let row = header_row + 1 + idx as u32;
            worksheet
                .write_number(row, 0, unit.cycle)
                .map_err(export_err("cycle"))?;
            worksheet
                .write_number(row, 1, unit.drift_level)
                .map_err(export_err("drift level"))?;
            worksheet
                .write_string(row, 2, &unit.cycle_type)
                .map_err(export_err("cycle type"))?;
        }

        Ok(())
    }
}
