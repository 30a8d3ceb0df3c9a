//! Date-folder moves, date-based renames and cycle layout moves

use crate::cancel::CancelToken;
use crate::error::{SortError, SortResult};
use crate::files::mover::SafeMover;
use crate::files::names::{cycle_file_name, cycle_folder, date_file_name, date_folder_name};
use crate::reporter::Reporter;
use crate::types::{CycleFileWithDate, DriftTable, FileWithDate};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Counts for one organizer run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrganizeSummary {
    pub processed: usize,
    pub skipped: usize,
}

enum Outcome {
    Processed,
    Skipped,
}

pub struct Organizer {
    mover: Arc<SafeMover>,
    reporter: Arc<dyn Reporter>,
    workers: usize,
    dry_run: bool,
}

impl Organizer {
    pub fn new(
        mover: Arc<SafeMover>,
        reporter: Arc<dyn Reporter>,
        workers: usize,
        dry_run: bool,
    ) -> Self {
        Self {
            mover,
            reporter,
            workers: workers.max(1),
            dry_run,
        }
    }

    /// Move each dated file into `<destination>/<yy-MM MMMM-dd>/`
    pub async fn move_to_date_folder(
        &self,
        files: Vec<FileWithDate>,
        destination: &Path,
        cancel: &CancelToken,
    ) -> SortResult<OrganizeSummary> {
        require_dir(destination)?;
        let destination = destination.to_path_buf();
        let mover = Arc::clone(&self.mover);
        let reporter = Arc::clone(&self.reporter);
        let dry_run = self.dry_run;

        let summary = self
            .for_each_file(files, cancel, move |file: FileWithDate| {
                let Some(date) = file.date_taken else {
                    reporter.warn(&format!("No usable date for {}, skipping.", file.file_name()));
                    return Ok(Outcome::Skipped);
                };
                let target_dir = destination.join(date_folder_name(date));

                if dry_run {
                    reporter.info(&format!(
                        "[DRY-RUN] Would move {} -> {}",
                        file.file_name(),
                        target_dir.display()
                    ));
                    return Ok(Outcome::Processed);
                }

                mover
                    .move_into_folder(&file.path, &target_dir)
                    .map_err(|e| report_failure(reporter.as_ref(), "move", &file.path, e))?;
                Ok(Outcome::Processed)
            })
            .await?;

        self.finish(summary)
    }

    /// Rename each dated file in place to `yyyy-MM-dd-HH-mm-ss<ext>`.
    /// A taken name is a warning and the file is left alone.
    pub async fn rename_to_date_name(
        &self,
        files: Vec<FileWithDate>,
        destination: &Path,
        cancel: &CancelToken,
    ) -> SortResult<OrganizeSummary> {
        require_dir(destination)?;
        let mover = Arc::clone(&self.mover);
        let reporter = Arc::clone(&self.reporter);
        let dry_run = self.dry_run;

        let summary = self
            .for_each_file(files, cancel, move |file: FileWithDate| {
                let Some(date) = file.date_taken else {
                    reporter.warn(&format!("No usable date for {}, skipping.", file.file_name()));
                    return Ok(Outcome::Skipped);
                };
                let new_name = date_file_name(date, &file.extension());

                if dry_run {
                    reporter.info(&format!(
                        "[DRY-RUN] Would rename {} -> {}",
                        file.file_name(),
                        new_name
                    ));
                    return Ok(Outcome::Processed);
                }

                match mover.rename(&file.path, &new_name) {
                    Ok(_) => Ok(Outcome::Processed),
                    Err(e @ SortError::NameCollision(_)) => {
                        reporter.warn(&e.to_string());
                        reporter.warn("The file is skipped!");
                        Ok(Outcome::Skipped)
                    }
                    Err(e) => Err(report_failure(reporter.as_ref(), "rename", &file.path, e)),
                }
            })
            .await?;

        self.finish(summary)
    }

    /// Move cycle files into `<destination>/<prefix>/CY<ceil>/<cycle:.2>/` under their
    /// canonical names, merging drift rows by exact cycle number when a table is given.
    pub async fn move_cycle_files(
        &self,
        files: Vec<CycleFileWithDate>,
        destination: &Path,
        drift: Option<&DriftTable>,
        cancel: &CancelToken,
    ) -> SortResult<OrganizeSummary> {
        require_dir(destination)?;

        let files: Vec<CycleFileWithDate> = match drift {
            Some(table) => files.into_iter().map(|f| f.merge_drift(table)).collect(),
            None => files,
        };

        let destination = destination.to_path_buf();
        let mover = Arc::clone(&self.mover);
        let reporter = Arc::clone(&self.reporter);
        let dry_run = self.dry_run;

        let summary = self
            .for_each_file(files, cancel, move |file: CycleFileWithDate| {
                let target_dir = destination.join(cycle_folder(&file));
                let target_file = target_dir.join(cycle_file_name(&file));

                if dry_run {
                    reporter.info(&format!(
                        "[DRY-RUN] Would move {} -> {}",
                        file.file_name(),
                        target_file.display()
                    ));
                    return Ok(Outcome::Processed);
                }

                mover
                    .move_to(&file.path, &target_file)
                    .map_err(|e| report_failure(reporter.as_ref(), "move", &file.path, e))?;
                Ok(Outcome::Processed)
            })
            .await?;

        self.finish(summary)
    }

    /// Run `work` for every item on the blocking pool, at most `workers` at a time.
    /// The first error stops scheduling; files already handled stay where they are.
    async fn for_each_file<T, F>(
        &self,
        items: Vec<T>,
        cancel: &CancelToken,
        work: F,
    ) -> SortResult<OrganizeSummary>
    where
        T: Send + 'static,
        F: Fn(T) -> SortResult<Outcome> + Send + Sync + 'static,
    {
        let work = Arc::new(work);
        let mut results = stream::iter(items)
            .map(|item| {
                let work = Arc::clone(&work);
                let cancel = cancel.clone();
                async move {
                    cancel.check()?;
                    tokio::task::spawn_blocking(move || work(item)).await?
                }
            })
            .buffer_unordered(self.workers);

        let mut summary = OrganizeSummary::default();
        while let Some(outcome) = results.next().await {
            match outcome? {
                Outcome::Processed => summary.processed += 1,
                Outcome::Skipped => summary.skipped += 1,
            }
        }
        Ok(summary)
    }

    fn finish(&self, summary: OrganizeSummary) -> SortResult<OrganizeSummary> {
        info!(
            processed = summary.processed,
            skipped = summary.skipped,
            dry_run = self.dry_run,
            "organizer run complete"
        );
        self.reporter.info("Organization finished.");
        Ok(summary)
    }
}

fn require_dir(dir: &Path) -> SortResult<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(SortError::DirectoryNotFound(dir.to_path_buf()))
    }
}

fn report_failure(reporter: &dyn Reporter, action: &str, path: &Path, err: SortError) -> SortError {
    reporter.error(
        &format!("Failed to {} {}", action, path.display()),
        Some(&err),
    );
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::{Level, MemoryReporter};
    use crate::types::{CycleUnit, MediaKind};
    use chrono::{NaiveDate, NaiveDateTime};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn organizer(reporter: Arc<MemoryReporter>, dry_run: bool) -> Organizer {
        Organizer::new(Arc::new(SafeMover::new()), reporter, 4, dry_run)
    }

    fn image(dir: &Path, name: &str, date: Option<NaiveDateTime>) -> FileWithDate {
        let path = dir.join(name);
        fs::write(&path, name).unwrap();
        FileWithDate::new(path, MediaKind::Image, date)
    }

    #[tokio::test]
    async fn test_move_to_date_folder_skips_undated() {
        let dir = TempDir::new().unwrap();
        let reporter = Arc::new(MemoryReporter::new());
        let files = vec![
            image(dir.path(), "a.jpg", Some(at(2023, 7, 12, 8, 0, 0))),
            image(dir.path(), "b.jpg", None),
        ];

        let summary = organizer(reporter.clone(), false)
            .move_to_date_folder(files, dir.path(), &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(summary, OrganizeSummary { processed: 1, skipped: 1 });
        assert!(dir.path().join("23-07 July-12/a.jpg").exists());
        assert!(dir.path().join("b.jpg").exists());
        assert_eq!(
            reporter.messages(Level::Warn),
            vec!["No usable date for b.jpg, skipping."]
        );
        assert_eq!(reporter.messages(Level::Info), vec!["Organization finished."]);
    }

    #[tokio::test]
    async fn test_missing_destination_is_fatal() {
        let reporter = Arc::new(MemoryReporter::new());
        let result = organizer(reporter, false)
            .move_to_date_folder(Vec::new(), Path::new("/no/such/dir"), &CancelToken::new())
            .await;
        assert!(matches!(result, Err(SortError::DirectoryNotFound(_))));
    }

    #[tokio::test]
    async fn test_rename_collision_is_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        let reporter = Arc::new(MemoryReporter::new());
        fs::write(dir.path().join("2024-07-21-09-55-43.jpg"), "taken").unwrap();
        let files = vec![
            image(dir.path(), "IMG_1.jpg", Some(at(2024, 7, 21, 9, 55, 43))),
            image(dir.path(), "IMG_2.jpg", Some(at(2024, 7, 21, 9, 55, 44))),
        ];

        let summary = organizer(reporter.clone(), false)
            .rename_to_date_name(files, dir.path(), &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(summary, OrganizeSummary { processed: 1, skipped: 1 });
        assert!(dir.path().join("IMG_1.jpg").exists());
        assert!(dir.path().join("2024-07-21-09-55-44.jpg").exists());
        assert!(reporter
            .messages(Level::Warn)
            .contains(&"The file is skipped!".to_string()));
    }

    #[tokio::test]
    async fn test_move_cycle_files_with_drift() {
        let dir = TempDir::new().unwrap();
        let reporter = Arc::new(MemoryReporter::new());
        let raw = dir.path().join("Side__00375_2023-12-01-10-47-51_Cy-4.50.jpg");
        fs::write(&raw, "x").unwrap();
        let file = CycleFileWithDate::new(
            raw.clone(),
            at(2023, 12, 1, 10, 47, 51),
            4.5,
            "Side".to_string(),
            "00375".to_string(),
        );
        let table: DriftTable = vec![CycleUnit::new(4.5, 1.2, "Push")].into_iter().collect();

        organizer(reporter, false)
            .move_cycle_files(vec![file], dir.path(), Some(&table), &CancelToken::new())
            .await
            .unwrap();

        assert!(!raw.exists());
        assert!(dir
            .path()
            .join("Side/CY5/4.50/Side_2023-12-01-10-47-51_Cy-4.50_Drift-1.20_Push (00375).jpg")
            .exists());
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let reporter = Arc::new(MemoryReporter::new());
        let files = vec![image(dir.path(), "a.jpg", Some(at(2023, 7, 12, 8, 0, 0)))];

        let summary = organizer(reporter.clone(), true)
            .rename_to_date_name(files, dir.path(), &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(summary.processed, 1);
        assert!(dir.path().join("a.jpg").exists());
        assert_eq!(
            reporter.messages(Level::Info)[0],
            "[DRY-RUN] Would rename a.jpg -> 2023-07-12-08-00-00.jpg"
        );
    }

    #[tokio::test]
    async fn test_cancelled_run_moves_nothing() {
        let dir = TempDir::new().unwrap();
        let files = vec![image(dir.path(), "a.jpg", Some(at(2023, 7, 12, 8, 0, 0)))];
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = organizer(Arc::new(MemoryReporter::new()), false)
            .move_to_date_folder(files, dir.path(), &cancel)
            .await;

        assert!(matches!(result, Err(SortError::Cancelled)));
        assert!(dir.path().join("a.jpg").exists());
    }
}
