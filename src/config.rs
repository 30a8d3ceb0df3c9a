//! Run settings: defaults, then an optional YAML file, then command-line overrides

use crate::error::{SortError, SortResult};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default `tracing` filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "cyclesort=info";

/// Largest accepted `hour_offset` magnitude (100 years)
pub const MAX_HOUR_OFFSET: f64 = 876_600.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Files handled at once by the blocking pool
    pub workers: usize,
    /// Hours added to every capture date
    pub hour_offset: f64,
    /// Report moves and renames without touching the filesystem
    pub dry_run: bool,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            hour_offset: 0.0,
            dry_run: false,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Settings {
    /// Defaults, or defaults overlaid with the YAML file at `path`
    pub fn load(path: Option<&Path>) -> SortResult<Self> {
        match path {
            None => Ok(Self::default()),
            Some(path) => {
                if !path.is_file() {
                    return Err(SortError::FileNotFound(path.to_path_buf()));
                }
                Self::from_yaml_str(&fs::read_to_string(path)?)
            }
        }
    }

    pub fn from_yaml_str(yaml: &str) -> SortResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply command-line values; `None` keeps the loaded value
    pub fn with_overrides(
        mut self,
        workers: Option<usize>,
        dry_run: bool,
        hour_offset: Option<f64>,
    ) -> SortResult<Self> {
        if let Some(workers) = workers {
            self.workers = workers;
        }
        if dry_run {
            self.dry_run = true;
        }
        if let Some(hours) = hour_offset {
            self.hour_offset = hours;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> SortResult<()> {
        if self.workers == 0 {
            return Err(SortError::Config("workers must be at least 1".to_string()));
        }
        if !self.hour_offset.is_finite() {
            return Err(SortError::Config(format!(
                "hour_offset must be a finite number, got {}",
                self.hour_offset
            )));
        }
        if self.hour_offset.abs() > MAX_HOUR_OFFSET {
            return Err(SortError::Config(format!(
                "hour_offset must be within ±{} hours, got {}",
                MAX_HOUR_OFFSET, self.hour_offset
            )));
        }
        Ok(())
    }
}
