//! Collision-safe moves and exclusive renames

use crate::error::{SortError, SortResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Moves never overwrite; renames never disambiguate.
///
/// The pick-a-free-name-then-move step is serialized so concurrent workers
/// targeting one directory cannot pick the same name.
#[derive(Debug, Default)]
pub struct SafeMover {
    lock: Mutex<()>,
}

impl SafeMover {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `file` into `target_dir` (created if absent), keeping its name
    /// or appending ` (n)` before the extension until the name is free.
    pub fn move_into_folder(&self, file: &Path, target_dir: &Path) -> SortResult<PathBuf> {
        let name = file
            .file_name()
            .ok_or_else(|| SortError::InvalidInput(format!("{} has no file name", file.display())))?;
        self.move_to(file, &target_dir.join(name))
    }

    /// Move `file` to `dest_spec`, disambiguating the same way if it is taken
    pub fn move_to(&self, file: &Path, dest_spec: &Path) -> SortResult<PathBuf> {
        // already in place
        if file == dest_spec {
            return Ok(dest_spec.to_path_buf());
        }
        if let Some(parent) = dest_spec.parent() {
            ensure_dir(parent)?;
        }

        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let dest = unique_path(dest_spec);
        move_file(file, &dest)?;
        debug!("moved {} -> {}", file.display(), dest.display());
        Ok(dest)
    }

    /// Rename `file` within its directory. Fails with `NameCollision` and leaves
    /// the filesystem untouched if `new_name` is taken.
    pub fn rename(&self, file: &Path, new_name: &str) -> SortResult<PathBuf> {
        let dest = file
            .parent()
            .map(|p| p.join(new_name))
            .unwrap_or_else(|| PathBuf::from(new_name));

        if dest == file {
            return Ok(dest);
        }

        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if dest.exists() {
            return Err(SortError::NameCollision(dest));
        }
        fs::rename(file, &dest)?;
        debug!("renamed {} -> {}", file.display(), dest.display());
        Ok(dest)
    }
}

/// Create a directory and its parents; an existing directory is success
pub fn ensure_dir(dir: &Path) -> SortResult<()> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// `spec` itself if free, else `stem (1).ext`, `stem (2).ext`, ...
fn unique_path(spec: &Path) -> PathBuf {
    if !spec.exists() {
        return spec.to_path_buf();
    }

    let parent = spec.parent().unwrap_or(Path::new("."));
    let stem = spec
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());
    let ext = spec
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1u32;
    loop {
        let candidate = parent.join(format!("{} ({}){}", stem, counter, ext));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// `fs::rename`, or copy + remove when the rename crosses filesystems
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device(&e) => {
            debug!("{} is on another device, copying", from.display());
            fs::copy(from, to)?;
            if let Err(e) = fs::remove_file(from) {
                // keep exactly one copy
                let _ = fs::remove_file(to);
                return Err(e);
            }
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// EXDEV on Unix, ERROR_NOT_SAME_DEVICE on Windows
fn is_cross_device(e: &io::Error) -> bool {
    #[cfg(unix)]
    const CROSS_DEVICE: i32 = 18;
    #[cfg(windows)]
    const CROSS_DEVICE: i32 = 17;
    #[cfg(not(any(unix, windows)))]
    const CROSS_DEVICE: i32 = -1;

    e.raw_os_error() == Some(CROSS_DEVICE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn touch(path: &Path, body: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn test_move_into_folder_creates_target() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("in/a.jpg");
        touch(&src, "a");

        let dest = SafeMover::new()
            .move_into_folder(&src, &dir.path().join("out/23-07 July-12"))
            .unwrap();

        assert_eq!(dest, dir.path().join("out/23-07 July-12/a.jpg"));
        assert!(dest.exists());
        assert!(!src.exists());
    }

    #[test]
    fn test_move_into_occupied_folder_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out");
        touch(&target.join("name.ext"), "existing");
        let first = dir.path().join("one/name.ext");
        let second = dir.path().join("two/name.ext");
        touch(&first, "first");
        touch(&second, "second");

        let mover = SafeMover::new();
        let a = mover.move_into_folder(&first, &target).unwrap();
        let b = mover.move_into_folder(&second, &target).unwrap();

        assert_eq!(a, target.join("name (1).ext"));
        assert_eq!(b, target.join("name (2).ext"));
        assert_eq!(fs::read_to_string(target.join("name.ext")).unwrap(), "existing");
        assert_eq!(fs::read_to_string(&a).unwrap(), "first");
        assert_eq!(fs::read_to_string(&b).unwrap(), "second");
    }

    #[test]
    fn test_move_to_uses_destination_name() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("raw.jpg");
        touch(&src, "x");
        let spec = dir.path().join("Side/CY5/4.50/Side_2023-12-01-10-47-51_Cy-4.50 (00375).jpg");
        touch(&spec, "taken");

        let dest = SafeMover::new().move_to(&src, &spec).unwrap();
        assert_eq!(
            dest,
            dir.path()
                .join("Side/CY5/4.50/Side_2023-12-01-10-47-51_Cy-4.50 (00375) (1).jpg")
        );
    }

    #[test]
    fn test_move_to_own_path_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("Side/CY5/4.50/a.jpg");
        touch(&src, "x");

        let dest = SafeMover::new().move_to(&src, &src).unwrap();
        assert_eq!(dest, src);
        assert!(src.exists());
    }

    #[test]
    fn test_rename_collision_leaves_files_untouched() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("IMG_1.jpg");
        let taken = dir.path().join("2024-07-21-09-55-43.jpg");
        touch(&src, "src");
        touch(&taken, "taken");

        let err = SafeMover::new()
            .rename(&src, "2024-07-21-09-55-43.jpg")
            .unwrap_err();

        assert!(matches!(err, SortError::NameCollision(ref p) if p == &taken));
        assert_eq!(fs::read_to_string(&src).unwrap(), "src");
        assert_eq!(fs::read_to_string(&taken).unwrap(), "taken");
    }

    #[test]
    fn test_rename_in_place() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("IMG_1.jpg");
        touch(&src, "src");

        let dest = SafeMover::new().rename(&src, "2024-07-21-09-55-43.jpg").unwrap();
        assert_eq!(dest, dir.path().join("2024-07-21-09-55-43.jpg"));
        assert!(!src.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_only_cross_device_errors_fall_back_to_copy() {
        assert!(is_cross_device(&io::Error::from_raw_os_error(18)));
        assert!(!is_cross_device(&io::Error::from_raw_os_error(13)));
        assert!(!is_cross_device(&io::Error::new(io::ErrorKind::Other, "x")));
    }

    #[test]
    fn test_failed_rename_leaves_no_copy() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.jpg");
        touch(&src, "x");
        // a directory cannot be replaced by a file
        let blocked = dir.path().join("out/a.jpg");
        touch(&blocked.join("inner.txt"), "y");

        assert!(move_file(&src, &blocked).is_err());
        assert_eq!(fs::read_to_string(&src).unwrap(), "x");
        assert!(blocked.is_dir());
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a/b");
        ensure_dir(&target).unwrap();
        ensure_dir(&target).unwrap();
        assert!(target.is_dir());
    }
}
