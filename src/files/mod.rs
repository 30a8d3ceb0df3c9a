//! Filesystem side: classify media files, then move or rename them
//!
//! - Patterns: the two cycle filename grammars
//! - Names: folder and file naming templates
//! - Capture: capture-date extraction with filesystem fallback
//! - Exif reader: embedded image dates
//! - Classifier: enumerate a folder and classify each file
//! - Mover: collision-safe moves and exclusive renames
//! - Organizer: the three organize pipelines

mod capture;
mod classifier;
mod exif_reader;
mod mover;
pub mod names;
mod organizer;
pub mod patterns;

pub use capture::{
    shift_hours, CaptureDateExtractor, EmbeddedDateReader, MetadataDateExtractor,
    NoEmbeddedMetadata,
};
pub use classifier::{enumerate_media, FileClassifier};
pub use exif_reader::ExifDateReader;
pub use mover::{ensure_dir, SafeMover};
pub use organizer::{OrganizeSummary, Organizer};
pub use patterns::{Grammar, NameParts};
