//! Folder enumeration and per-file classification

use crate::cancel::CancelToken;
use crate::error::{SortError, SortResult};
use crate::files::capture::CaptureDateExtractor;
use crate::files::patterns::Grammar;
use crate::reporter::Reporter;
use crate::types::{CycleFileWithDate, FileWithDate, MediaKind};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use walkdir::WalkDir;

pub struct FileClassifier {
    reporter: Arc<dyn Reporter>,
    extractor: Arc<dyn CaptureDateExtractor>,
    workers: usize,
}

impl FileClassifier {
    pub fn new(
        reporter: Arc<dyn Reporter>,
        extractor: Arc<dyn CaptureDateExtractor>,
        workers: usize,
    ) -> Self {
        Self {
            reporter,
            extractor,
            workers: workers.max(1),
        }
    }

    /// Images then videos under `root`, each with its capture date
    pub async fn search_in_folder(
        &self,
        root: &Path,
        hour_offset: f64,
        recursive: bool,
        cancel: &CancelToken,
    ) -> SortResult<Vec<FileWithDate>> {
        let candidates = self.candidates(root, recursive).await?;
        debug!("{} media files under {}", candidates.len(), root.display());

        stream::iter(candidates)
            .map(|(path, kind)| {
                let extractor = Arc::clone(&self.extractor);
                let cancel = cancel.clone();
                async move {
                    cancel.check()?;
                    let file = tokio::task::spawn_blocking(move || {
                        let date = extractor.capture_date(&path, kind, hour_offset);
                        FileWithDate::new(path, kind, date)
                    })
                    .await?;
                    Ok::<_, SortError>(file)
                }
            })
            .buffered(self.workers)
            .try_collect()
            .await
    }

    /// Files whose names match the fixed-camera grammar
    pub async fn search_for_fixed_camera_files(
        &self,
        root: &Path,
        recursive: bool,
        cancel: &CancelToken,
    ) -> SortResult<Vec<CycleFileWithDate>> {
        self.search_for_cycle_files(root, recursive, Grammar::FixedCamera, cancel)
            .await
    }

    /// Files whose names match the general cycle-number grammar
    pub async fn search_for_cycle_number_files(
        &self,
        root: &Path,
        recursive: bool,
        cancel: &CancelToken,
    ) -> SortResult<Vec<CycleFileWithDate>> {
        self.search_for_cycle_files(root, recursive, Grammar::CycleNumber, cancel)
            .await
    }

    async fn search_for_cycle_files(
        &self,
        root: &Path,
        recursive: bool,
        grammar: Grammar,
        cancel: &CancelToken,
    ) -> SortResult<Vec<CycleFileWithDate>> {
        let candidates = self.candidates(root, recursive).await?;

        let mut matched = Vec::new();
        for (path, _) in candidates {
            cancel.check()?;
            match grammar.parse(&path) {
                Some(file) => matched.push(file),
                None => debug!("{} does not match {:?}", path.display(), grammar),
            }
        }
        Ok(matched)
    }

    async fn candidates(
        &self,
        root: &Path,
        recursive: bool,
    ) -> SortResult<Vec<(PathBuf, MediaKind)>> {
        if !root.is_dir() {
            return Err(SortError::DirectoryNotFound(root.to_path_buf()));
        }
        let root = root.to_path_buf();
        let reporter = Arc::clone(&self.reporter);
        let files =
            tokio::task::spawn_blocking(move || enumerate_media(&root, recursive, reporter.as_ref()))
                .await?;
        Ok(files)
    }
}

/// Supported media under `root`: all images first, then all videos.
/// Entries that cannot be read are reported and skipped.
pub fn enumerate_media(
    root: &Path,
    recursive: bool,
    reporter: &dyn Reporter,
) -> Vec<(PathBuf, MediaKind)> {
    let mut walker = WalkDir::new(root).follow_links(false).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut images = Vec::new();
    let mut videos = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                reporter.warn(&format!("Skipping unreadable entry: {}", e));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        match MediaKind::from_path(entry.path()) {
            Some(MediaKind::Image) => images.push((entry.into_path(), MediaKind::Image)),
            Some(MediaKind::Video) => videos.push((entry.into_path(), MediaKind::Video)),
            None => {}
        }
    }

    images.extend(videos);
    images
}
