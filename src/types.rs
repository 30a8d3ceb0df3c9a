use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

//==============================================================================
// Media Kinds
//==============================================================================

/// Supported image extensions (lowercase, without the dot)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "heic"];

/// Supported video extensions (lowercase, without the dot)
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov"];

/// Kind of a supported media file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a path by its extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// Extension of a path including the leading dot, or an empty string
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

//==============================================================================
// Parsed Files
//==============================================================================

/// A media file with the capture date derived for it (if any)
#[derive(Debug, Clone, PartialEq)]
pub struct FileWithDate {
    pub path: PathBuf,
    pub kind: MediaKind,
    pub date_taken: Option<NaiveDateTime>,
}

impl FileWithDate {
    pub fn new(path: PathBuf, kind: MediaKind, date_taken: Option<NaiveDateTime>) -> Self {
        Self {
            path,
            kind,
            date_taken,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn extension(&self) -> String {
        dotted_extension(&self.path)
    }
}

/// A file whose name encodes prefix, timestamp and cycle number
#[derive(Debug, Clone, PartialEq)]
pub struct CycleFileWithDate {
    pub path: PathBuf,
    pub date_taken: NaiveDateTime,
    pub cycle_number: f64,
    pub prefix: String,
    /// Kept as text so leading zeros survive renaming
    pub id: String,
    pub extension: String,
    /// Drift row joined by exact cycle number, once merged
    pub drift: Option<CycleUnit>,
}

impl CycleFileWithDate {
    pub fn new(
        path: PathBuf,
        date_taken: NaiveDateTime,
        cycle_number: f64,
        prefix: String,
        id: String,
    ) -> Self {
        let extension = dotted_extension(&path);
        Self {
            path,
            date_taken,
            cycle_number,
            prefix,
            id,
            extension,
            drift: None,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Join this file with its drift row, if the table has one for its exact cycle
    pub fn merge_drift(mut self, table: &DriftTable) -> Self {
        self.drift = table.get(self.cycle_number).cloned();
        self
    }
}

//==============================================================================
// Drift Lookup
//==============================================================================

/// One row of the drift table
#[derive(Debug, Clone, PartialEq)]
pub struct CycleUnit {
    pub cycle: f64,
    pub drift_level: f64,
    pub cycle_type: String,
}

impl CycleUnit {
    pub fn new(cycle: f64, drift_level: f64, cycle_type: impl Into<String>) -> Self {
        Self {
            cycle,
            drift_level,
            cycle_type: cycle_type.into(),
        }
    }
}

/// Cycle number → drift row, keyed by the exact bit pattern of the cycle value.
///
/// There is deliberately no tolerance: `4.5` and `4.5000001` are different keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriftTable {
    units: HashMap<u64, CycleUnit>,
}

impl DriftTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(cycle: f64) -> u64 {
        // -0.0 and 0.0 compare equal, so they share a key
        (cycle + 0.0).to_bits()
    }

    /// Insert a row; a later row with the same cycle replaces the earlier one
    pub fn insert(&mut self, unit: CycleUnit) {
        self.units.insert(Self::key(unit.cycle), unit);
    }

    pub fn get(&self, cycle: f64) -> Option<&CycleUnit> {
        self.units.get(&Self::key(cycle))
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CycleUnit> {
        self.units.values()
    }
}

impl FromIterator<CycleUnit> for DriftTable {
    fn from_iter<I: IntoIterator<Item = CycleUnit>>(iter: I) -> Self {
        let mut table = DriftTable::new();
        for unit in iter {
            table.insert(unit);
        }
        table
    }
}

/// Everything the input workbook provides for a drift run
#[derive(Debug, Clone, PartialEq)]
pub struct DriftInputs {
    pub folder_address: PathBuf,
    pub recursive: bool,
    pub data: DriftTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_is_case_insensitive() {
        assert_eq!(
            MediaKind::from_path(Path::new("a/IMG_1.JPG")),
            Some(MediaKind::Image)
        );
        assert_eq!(
            MediaKind::from_path(Path::new("clip.MoV")),
            Some(MediaKind::Video)
        );
        assert_eq!(MediaKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(MediaKind::from_path(Path::new("no_extension")), None);
    }

    #[test]
    fn test_drift_table_exact_match_only() {
        let table: DriftTable = vec![
            CycleUnit::new(0.50, 1.2, "Push"),
            CycleUnit::new(4.5000001, -0.3, "Pull"),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.get(0.5).map(|u| u.cycle_type.as_str()), Some("Push"));
        // Known fragility: a value that is close but not bit-identical misses
        assert!(table.get(4.50).is_none());
        assert!(table.get(4.5000001).is_some());
    }

    #[test]
    fn test_drift_table_last_writer_wins() {
        let table: DriftTable = vec![
            CycleUnit::new(1.0, 0.1, "First"),
            CycleUnit::new(1.0, 0.2, "Second"),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(1.0).unwrap().cycle_type, "Second");
    }

    #[test]
    fn test_merge_drift_keeps_missing_cycles_unmerged() {
        let date = chrono::NaiveDate::from_ymd_opt(2023, 12, 1)
            .unwrap()
            .and_hms_opt(10, 47, 51)
            .unwrap();
        let table: DriftTable = vec![CycleUnit::new(4.5, -0.3, "Pull")].into_iter().collect();

        let hit = CycleFileWithDate::new(
            PathBuf::from("Side_x.jpg"),
            date,
            4.5,
            "Side".to_string(),
            "00375".to_string(),
        )
        .merge_drift(&table);
        assert_eq!(hit.drift.as_ref().map(|d| d.drift_level), Some(-0.3));
        assert_eq!(hit.extension, ".jpg");

        let miss = CycleFileWithDate::new(
            PathBuf::from("Side_y.jpg"),
            date,
            7.0,
            "Side".to_string(),
            String::new(),
        )
        .merge_drift(&table);
        assert!(miss.drift.is_none());
    }
}
