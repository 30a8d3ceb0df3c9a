//! Semi-structured Excel input
//!
//! - Sheet: typed cell grid with a used area, over calamine
//! - Markers: text index used to anchor sections
//! - Sections: key/value and table readers driven by specs
//! - Inputs: the drift workbook (`Inputs` + `Data` sections)
//! - Template: writes a blank input workbook

pub mod cell;
mod inputs;
mod markers;
mod sections;
mod sheet;
mod template;

pub use cell::{CellEnum, CellValue};
pub use inputs::{load_first_sheet, parse_drift_inputs, ExcelInputReader};
pub use markers::{MarkerIndex, MarkerPosition};
pub use sections::{
    CellParser, ColumnSpec, KeyValueSection, KeyValueSectionSpec, RowFactory, RowTerminator,
    SemiStructuredReader, TableRow, TableSectionSpec,
};
pub use sheet::{cell_text, is_blank, Sheet, UsedArea};
pub use template::InputTemplate;
