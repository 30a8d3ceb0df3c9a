//! Cyclesort - camera file organizer driven by filename grammars and an Excel input sheet
//!
//! This library classifies camera files (by capture date or by the cycle number in
//! their names) and moves or renames them into a predictable layout.
//!
//! # Features
//!
//! - Date folders (`23-07 July-12`) and date-based names for phone/roaming cameras
//! - Two cycle filename grammars (fixed camera, general cycle number)
//! - Cycle layout `<prefix>/CY<n>/<cycle>/` with optional drift level merge
//! - Semi-structured Excel reading: marker-anchored key/value and table sections
//! - Collision-safe moves, exclusive renames, dry-run and cooperative cancellation
//!
//! # Example
//!
//! ```no_run
//! use cyclesort::excel::{load_first_sheet, parse_drift_inputs};
//! use std::path::Path;
//!
//! let sheet = load_first_sheet(Path::new("input.xlsx"))?;
//! let inputs = parse_drift_inputs(&sheet)?;
//!
//! println!("Folder: {}", inputs.folder_address.display());
//! println!("Drift rows: {}", inputs.data.len());
//! # Ok::<(), cyclesort::error::SortError>(())
//! ```

pub mod cancel;
pub mod cli;
pub mod config;
pub mod error;
pub mod excel;
pub mod files;
pub mod reporter;
pub mod types;

// Re-export commonly used types
pub use cancel::CancelToken;
pub use config::Settings;
pub use error::{SortError, SortResult};
pub use types::{CycleFileWithDate, CycleUnit, DriftInputs, DriftTable, FileWithDate, MediaKind};
