//! EXIF capture dates for still images

use crate::error::{SortError, SortResult};
use crate::files::capture::EmbeddedDateReader;
use crate::types::MediaKind;
use chrono::{NaiveDate, NaiveDateTime};
use exif::{In, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Tags tried in order; the first well-formed one wins
const DATE_TAGS: [Tag; 2] = [Tag::DateTimeOriginal, Tag::DateTime];

/// Reads `DateTimeOriginal`, then `DateTime`, from JPEG and HEIF containers.
/// Videos yield no embedded date.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifDateReader;

impl ExifDateReader {
    pub fn new() -> Self {
        Self
    }
}

impl EmbeddedDateReader for ExifDateReader {
    fn read_date(&self, path: &Path, kind: MediaKind) -> SortResult<Option<NaiveDateTime>> {
        if kind != MediaKind::Image {
            return Ok(None);
        }

        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let exif = match exif::Reader::new().read_from_container(&mut reader) {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(_)) => return Ok(None),
            Err(exif::Error::Io(e)) => return Err(e.into()),
            Err(e) => return Err(SortError::Metadata(e.to_string())),
        };

        Ok(DATE_TAGS.iter().find_map(|tag| {
            let field = exif.get_field(*tag, In::PRIMARY)?;
            match &field.value {
                Value::Ascii(parts) => parts.first().and_then(|raw| parse_exif_date(raw)),
                _ => None,
            }
        }))
    }
}

/// `YYYY:MM:DD HH:MM:SS`; blank or impossible dates are `None`
fn parse_exif_date(raw: &[u8]) -> Option<NaiveDateTime> {
    let dt = exif::DateTime::from_ascii(raw).ok()?;
    NaiveDate::from_ymd_opt(i32::from(dt.year), u32::from(dt.month), u32::from(dt.day))?
        .and_hms_opt(
            u32::from(dt.hour),
            u32::from(dt.minute),
            u32::from(dt.second),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    /// Smallest JPEG carrying one IFD0 ASCII tag
    fn jpeg_with_ascii_tag(tag: u16, value: &str) -> Vec<u8> {
        let mut ascii = value.as_bytes().to_vec();
        ascii.push(0);

        // big-endian TIFF: header, one-entry IFD0, no next IFD, then the value
        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"MM\x00\x2a\x00\x00\x00\x08");
        tiff.extend_from_slice(&1u16.to_be_bytes());
        tiff.extend_from_slice(&tag.to_be_bytes());
        tiff.extend_from_slice(&2u16.to_be_bytes());
        tiff.extend_from_slice(&(ascii.len() as u32).to_be_bytes());
        tiff.extend_from_slice(&26u32.to_be_bytes());
        tiff.extend_from_slice(&0u32.to_be_bytes());
        tiff.extend_from_slice(&ascii);

        let mut app1 = b"Exif\x00\x00".to_vec();
        app1.extend_from_slice(&tiff);

        let mut jpeg = vec![0xff, 0xd8, 0xff, 0xe1];
        jpeg.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
        jpeg.extend_from_slice(&app1);
        jpeg.extend_from_slice(&[0xff, 0xd9]);
        jpeg
    }

    #[test]
    fn test_reads_date_time_tag() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.jpg");
        fs::write(&path, jpeg_with_ascii_tag(0x0132, "2024:07:21 09:55:43")).unwrap();

        let date = ExifDateReader::new().read_date(&path, MediaKind::Image).unwrap();
        assert_eq!(
            date,
            NaiveDate::from_ymd_opt(2024, 7, 21)
                .unwrap()
                .and_hms_opt(9, 55, 43)
        );
    }

    #[test]
    fn test_blank_date_is_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blank.jpg");
        fs::write(&path, jpeg_with_ascii_tag(0x0132, "    :  :     :  :  ")).unwrap();

        assert_eq!(
            ExifDateReader::new().read_date(&path, MediaKind::Image).unwrap(),
            None
        );
    }

    #[test]
    fn test_jpeg_without_exif_is_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.jpg");
        fs::write(&path, [0xff, 0xd8, 0xff, 0xd9]).unwrap();

        assert_eq!(
            ExifDateReader::new().read_date(&path, MediaKind::Image).unwrap(),
            None
        );
    }

    #[test]
    fn test_videos_are_skipped() {
        assert_eq!(
            ExifDateReader::new()
                .read_date(Path::new("/no/such/clip.mov"), MediaKind::Video)
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_garbage_image_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"not an image at all").unwrap();

        assert!(ExifDateReader::new()
            .read_date(&path, MediaKind::Image)
            .is_err());
    }
}
