//! Folder and file naming templates

use crate::types::CycleFileWithDate;
use chrono::NaiveDateTime;
use std::path::PathBuf;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// `23-07 July-12` for 2023-07-12
pub fn date_folder_name(date: NaiveDateTime) -> String {
    date.format("%y-%m %B-%d").to_string()
}

/// `2024-07-21-09-55-43.jpg`; the extension is kept as given
pub fn date_file_name(date: NaiveDateTime, extension: &str) -> String {
    format!("{}{}", date.format(TIMESTAMP_FORMAT), extension)
}

/// Cycle number as written in folder and file names
pub fn cycle_label(cycle: f64) -> String {
    two_decimals(cycle)
}

/// Two fixed decimals, ties rounded away from zero (`0.125` -> `0.13`)
fn two_decimals(value: f64) -> String {
    let scaled = (value * 100.0).round();
    if scaled.is_finite() {
        format!("{:.2}", scaled / 100.0)
    } else {
        format!("{:.2}", value)
    }
}

/// `<prefix>/CY<ceil(cycle)>/<cycle:.2>`, relative to the destination root
pub fn cycle_folder(file: &CycleFileWithDate) -> PathBuf {
    let bucket = file.cycle_number.ceil() as i64;
    PathBuf::from(&file.prefix)
        .join(format!("CY{}", bucket))
        .join(cycle_label(file.cycle_number))
}

/// `Side_2023-12-01-10-47-51_Cy-4.50 (00375).jpg`, with
/// `_Drift-<level:.2>_<type>` after the cycle when a drift row was merged
pub fn cycle_file_name(file: &CycleFileWithDate) -> String {
    let mut name = format!(
        "{}_{}_Cy-{}",
        file.prefix,
        file.date_taken.format(TIMESTAMP_FORMAT),
        cycle_label(file.cycle_number)
    );

    if let Some(drift) = &file.drift {
        name.push_str(&format!("_Drift-{}", two_decimals(drift.drift_level)));
        let cycle_type = drift.cycle_type.trim();
        if !cycle_type.is_empty() {
            name.push('_');
            name.push_str(cycle_type);
        }
    }

    if !file.id.is_empty() {
        name.push_str(&format!(" ({})", file.id));
    }

    name.push_str(&file.extension);
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::patterns::parse_fixed_camera;
    use crate::types::CycleUnit;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn side_file() -> CycleFileWithDate {
        CycleFileWithDate::new(
            PathBuf::from("/in/raw.jpg"),
            at(2023, 12, 1, 10, 47, 51),
            4.5,
            "Side".to_string(),
            "00375".to_string(),
        )
    }

    #[test]
    fn test_date_folder_name() {
        assert_eq!(date_folder_name(at(2023, 7, 12, 8, 0, 0)), "23-07 July-12");
        assert_eq!(date_folder_name(at(2009, 1, 2, 0, 0, 0)), "09-01 January-02");
    }

    #[test]
    fn test_date_file_name() {
        assert_eq!(
            date_file_name(at(2024, 7, 21, 9, 55, 43), ".HEIC"),
            "2024-07-21-09-55-43.HEIC"
        );
    }

    #[test]
    fn test_cycle_label_rounds_ties_away_from_zero() {
        assert_eq!(cycle_label(0.125), "0.13");
        assert_eq!(cycle_label(2.675), "2.68");
        assert_eq!(cycle_label(-0.125), "-0.13");
        assert_eq!(cycle_label(4.5), "4.50");
        assert_eq!(cycle_label(12.994), "12.99");
    }

    #[test]
    fn test_cycle_folder() {
        assert_eq!(cycle_folder(&side_file()), Path::new("Side/CY5/4.50"));

        let mut whole = side_file();
        whole.cycle_number = 3.0;
        assert_eq!(cycle_folder(&whole), Path::new("Side/CY3/3.00"));
    }

    #[test]
    fn test_cycle_file_name_without_drift() {
        assert_eq!(
            cycle_file_name(&side_file()),
            "Side_2023-12-01-10-47-51_Cy-4.50 (00375).jpg"
        );
    }

    #[test]
    fn test_cycle_file_name_with_drift() {
        let mut file = side_file();
        file.drift = Some(CycleUnit::new(4.5, -0.3, "Pull"));
        assert_eq!(
            cycle_file_name(&file),
            "Side_2023-12-01-10-47-51_Cy-4.50_Drift--0.30_Pull (00375).jpg"
        );

        file.id = String::new();
        assert_eq!(
            cycle_file_name(&file),
            "Side_2023-12-01-10-47-51_Cy-4.50_Drift--0.30_Pull.jpg"
        );
    }

    #[test]
    fn test_cycle_file_name_round_trips_through_fixed_camera_grammar() {
        let cases = [
            ("P", at(2021, 2, 3, 4, 5, 6), 0.5, "007"),
            ("Left", at(2025, 11, 3, 9, 54, 23), 12.25, "12619"),
            ("Top", at(1999, 12, 31, 23, 59, 59), 100.0, "0001"),
        ];

        for (prefix, date, cycle, id) in cases {
            let file = CycleFileWithDate::new(
                PathBuf::from("x.jpg"),
                date,
                cycle,
                prefix.to_string(),
                id.to_string(),
            );
            let name = cycle_file_name(&file);
            let parts = parse_fixed_camera(&name).unwrap();

            assert_eq!(parts.prefix, prefix);
            assert_eq!(parts.date_taken, date);
            assert_eq!(cycle_label(parts.cycle_number), cycle_label(cycle));
            assert_eq!(parts.id, id);
        }
    }
}
