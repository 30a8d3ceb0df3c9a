//! Capture-date extraction
//!
//! Embedded metadata is consulted first (EXIF `DateTimeOriginal`/`DateTime` for images,
//! QuickTime created/metadata creation date for videos). When it yields nothing, the
//! filesystem creation time is used, then the last write time. The hour offset is
//! applied to whichever date was found.

use crate::error::SortResult;
use crate::reporter::Reporter;
use crate::types::MediaKind;
use chrono::{DateTime, Local, NaiveDateTime, TimeDelta};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

/// Format-specific embedded-metadata decoder
pub trait EmbeddedDateReader: Send + Sync {
    fn read_date(&self, path: &Path, kind: MediaKind) -> SortResult<Option<NaiveDateTime>>;
}

/// Reader used when no decoder is configured; always yields no date
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEmbeddedMetadata;

impl EmbeddedDateReader for NoEmbeddedMetadata {
    fn read_date(&self, _path: &Path, _kind: MediaKind) -> SortResult<Option<NaiveDateTime>> {
        Ok(None)
    }
}

pub trait CaptureDateExtractor: Send + Sync {
    /// Best-effort capture date; never fails
    fn capture_date(&self, path: &Path, kind: MediaKind, hour_offset: f64)
        -> Option<NaiveDateTime>;
}

/// Embedded metadata, then filesystem times
pub struct MetadataDateExtractor {
    reporter: Arc<dyn Reporter>,
    embedded: Arc<dyn EmbeddedDateReader>,
}

impl MetadataDateExtractor {
    pub fn new(reporter: Arc<dyn Reporter>, embedded: Arc<dyn EmbeddedDateReader>) -> Self {
        Self { reporter, embedded }
    }

    /// Extractor with no embedded decoder
    pub fn filesystem_only(reporter: Arc<dyn Reporter>) -> Self {
        Self::new(reporter, Arc::new(NoEmbeddedMetadata))
    }

    fn embedded_date(&self, path: &Path, kind: MediaKind) -> Option<NaiveDateTime> {
        match self.embedded.read_date(path, kind) {
            Ok(date) => date,
            Err(e) => {
                let what = match kind {
                    MediaKind::Image => "EXIF",
                    MediaKind::Video => "video",
                };
                self.reporter.warn(&format!(
                    "Failed to read {} metadata for {}",
                    what,
                    path.display()
                ));
                self.reporter.error(
                    &format!("Metadata read error for {}", path.display()),
                    Some(&e),
                );
                None
            }
        }
    }
}

impl CaptureDateExtractor for MetadataDateExtractor {
    fn capture_date(
        &self,
        path: &Path,
        kind: MediaKind,
        hour_offset: f64,
    ) -> Option<NaiveDateTime> {
        let date = self
            .embedded_date(path, kind)
            .or_else(|| filesystem_date(path))?;
        Some(shift_hours(date, hour_offset))
    }
}

/// Creation time, then last write time
fn filesystem_date(path: &Path) -> Option<NaiveDateTime> {
    let metadata = fs::metadata(path).ok()?;
    metadata
        .created()
        .or_else(|_| metadata.modified())
        .ok()
        .map(local_time)
}

fn local_time(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}

/// Apply a (possibly fractional or negative) hour offset.
/// An offset that leaves the representable range leaves the date unchanged.
pub fn shift_hours(date: NaiveDateTime, hours: f64) -> NaiveDateTime {
    if hours == 0.0 || !hours.is_finite() {
        return date;
    }
    let millis = (hours * 3_600_000.0).round();
    if millis <= i64::MIN as f64 || millis >= i64::MAX as f64 {
        return date;
    }
    TimeDelta::try_milliseconds(millis as i64)
        .and_then(|offset| date.checked_add_signed(offset))
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SortError;
    use crate::reporter::{Level, MemoryReporter};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn at(h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 21)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    struct Fixed(NaiveDateTime);

    impl EmbeddedDateReader for Fixed {
        fn read_date(&self, _: &Path, _: MediaKind) -> SortResult<Option<NaiveDateTime>> {
            Ok(Some(self.0))
        }
    }

    struct Broken;

    impl EmbeddedDateReader for Broken {
        fn read_date(&self, _: &Path, _: MediaKind) -> SortResult<Option<NaiveDateTime>> {
            Err(SortError::InvalidInput("corrupt APP1 segment".to_string()))
        }
    }

    #[test]
    fn test_shift_hours() {
        assert_eq!(shift_hours(at(9, 0), 2.0), at(11, 0));
        assert_eq!(shift_hours(at(9, 0), -1.5), at(7, 30));
        assert_eq!(shift_hours(at(9, 0), 0.0), at(9, 0));
    }

    #[test]
    fn test_shift_hours_out_of_range_keeps_date() {
        assert_eq!(shift_hours(at(9, 0), -1e20), at(9, 0));
        assert_eq!(shift_hours(at(9, 0), 1e20), at(9, 0));
        assert_eq!(shift_hours(at(9, 0), 1e12), at(9, 0));
        assert_eq!(shift_hours(at(9, 0), f64::NAN), at(9, 0));
    }

    #[test]
    fn test_embedded_date_wins_and_is_shifted() {
        let reporter = Arc::new(MemoryReporter::new());
        let extractor = MetadataDateExtractor::new(reporter.clone(), Arc::new(Fixed(at(9, 0))));

        let date = extractor.capture_date(Path::new("missing.jpg"), MediaKind::Image, 3.0);
        assert_eq!(date, Some(at(12, 0)));
        assert!(reporter.entries().is_empty());
    }

    #[test]
    fn test_broken_reader_falls_back_to_filesystem() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.jpg");
        fs::write(&path, b"x").unwrap();

        let reporter = Arc::new(MemoryReporter::new());
        let extractor = MetadataDateExtractor::new(reporter.clone(), Arc::new(Broken));

        assert!(extractor
            .capture_date(&path, MediaKind::Image, 0.0)
            .is_some());
        assert_eq!(reporter.messages(Level::Warn).len(), 1);
        assert!(reporter.messages(Level::Error)[0].contains("corrupt APP1 segment"));
    }

    #[test]
    fn test_missing_file_has_no_date() {
        let extractor = MetadataDateExtractor::filesystem_only(Arc::new(MemoryReporter::new()));
        assert_eq!(
            extractor.capture_date(Path::new("/no/such/clip.mov"), MediaKind::Video, 1.0),
            None
        );
    }
}
