//! PNG capture output

use crate::{ExportError, ExportResult};
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};

pub const CAPTURE_PREFIX: &str = "capture";

/// `capture_YYYYMMDD_HHMMSS.png`, or `capture_YYYYMMDD_HHMMSS_NNN.png` for `counter > 0`
pub fn capture_file_name(stamp: &NaiveDateTime, counter: u32) -> String {
    let stamp = stamp.format("%Y%m%d_%H%M%S");
    if counter == 0 {
        format!("{}_{}.png", CAPTURE_PREFIX, stamp)
    } else {
        format!("{}_{}_{:03}.png", CAPTURE_PREFIX, stamp, counter)
    }
}

/// First capture path in `dir` for `stamp` that `exists` rejects
pub fn next_capture_path<F>(dir: &Path, stamp: &NaiveDateTime, exists: F) -> PathBuf
where
    F: Fn(&Path) -> bool,
{
    let mut counter = 0;
    loop {
        let path = dir.join(capture_file_name(stamp, counter));
        if !exists(&path) {
            return path;
        }
        counter += 1;
    }
}

/// Write encoded image bytes, creating the parent directory if needed
pub fn save_image(bytes: &[u8], path: &Path) -> ExportResult<()> {
    if bytes.is_empty() {
        return Err(ExportError::Empty);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}

/// Saves captures into one directory under collision-free names
#[derive(Debug, Clone)]
pub struct PngExporter {
    dir: PathBuf,
}

impl PngExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save PNG bytes taken at `stamp`, returning the path written
    pub fn save_capture(&self, bytes: &[u8], stamp: &NaiveDateTime) -> ExportResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = next_capture_path(&self.dir, stamp, Path::exists);
        save_image(bytes, &path)?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 42)
            .unwrap()
    }

    #[test]
    fn file_names() {
        assert_eq!(capture_file_name(&stamp(), 0), "capture_20240309_070542.png");
        assert_eq!(capture_file_name(&stamp(), 1), "capture_20240309_070542_001.png");
        assert_eq!(capture_file_name(&stamp(), 27), "capture_20240309_070542_027.png");
    }

    #[test]
    fn next_path_skips_taken_names() {
        let dir = Path::new("shots");
        let taken: HashSet<PathBuf> = [
            dir.join("capture_20240309_070542.png"),
            dir.join("capture_20240309_070542_001.png"),
        ]
        .into_iter()
        .collect();

        let path = next_capture_path(dir, &stamp(), |p| taken.contains(p));
        assert_eq!(path, dir.join("capture_20240309_070542_002.png"));
    }

    #[test]
    fn same_second_saves_get_suffix() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = PngExporter::new(tmp.path().join("images"));

        let first = exporter.save_capture(b"one", &stamp()).unwrap();
        let second = exporter.save_capture(b"two", &stamp()).unwrap();

        assert_eq!(first.file_name().unwrap(), "capture_20240309_070542.png");
        assert_eq!(second.file_name().unwrap(), "capture_20240309_070542_001.png");
        assert_eq!(fs::read(&first).unwrap(), b"one");
        assert_eq!(fs::read(&second).unwrap(), b"two");
    }

    #[test]
    fn save_image_creates_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a").join("b").join("x.png");
        save_image(b"png", &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn save_image_rejects_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("x.png");
        assert!(matches!(save_image(&[], &path), Err(ExportError::Empty)));
        assert!(!path.exists());
    }

    #[test]
    fn save_into_file_path_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let exporter = PngExporter::new(&blocker);
        assert!(matches!(
            exporter.save_capture(b"png", &stamp()),
            Err(ExportError::Io(_))
        ));
    }
}
