//! Flat file storage for todo.txt and its archive
//!
//! The todo file is rewritten wholesale on save. The archive file is
//! append-only, except for [`TodoFile::truncate_archive`], which cuts it
//! back to an offset found by [`TodoFile::last_archive_line`].

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::error::{CoreError, Result};

/// Archive file name used when none is configured
pub const DEFAULT_ARCHIVE_NAME: &str = "done.txt";

/// A todo file, its archive, and the last modification time we observed
#[derive(Debug, Clone)]
pub struct TodoFile {
    path: PathBuf,
    archive_path: PathBuf,
    modified: Option<SystemTime>,
}

impl TodoFile {
    /// Create a storage adapter; the archive defaults to `done.txt` next to `path`
    pub fn new(path: impl Into<PathBuf>, archive_path: Option<PathBuf>) -> Self {
        let path = path.into();
        let archive_path = archive_path.unwrap_or_else(|| default_archive_path(&path));
        Self {
            path,
            archive_path,
            modified: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Read every line of the todo file and remember its mtime
    pub fn read_lines(&mut self) -> Result<Vec<String>> {
        self.modified = Some(modified_time(&self.path)?);
        let content = fs::read_to_string(&self.path)
            .map_err(|e| CoreError::io("Failed to read todo file", &self.path, e))?;
        let lines: Vec<String> = content.lines().map(str::to_string).collect();
        debug!(path = %self.path.display(), count = lines.len(), "read todo file");
        Ok(lines)
    }

    /// Overwrite the todo file, one line each, and remember the new mtime
    pub fn write_lines<'a>(&mut self, lines: impl IntoIterator<Item = &'a str>) -> Result<()> {
        let file = File::create(&self.path)
            .map_err(|e| CoreError::io("Failed to open todo file for writing", &self.path, e))?;
        let count = write_all(file, lines)
            .map_err(|e| CoreError::io("Failed to write todo file", &self.path, e))?;
        self.modified = Some(modified_time(&self.path)?);
        debug!(path = %self.path.display(), count, "saved todo file");
        Ok(())
    }

    /// Whether the file on disk differs from what we last read or wrote
    pub fn has_changed(&self) -> Result<bool> {
        let current = modified_time(&self.path)?;
        Ok(self.modified != Some(current))
    }

    /// Append lines to the archive, creating it if needed
    pub fn append_archive<'a>(&self, lines: impl IntoIterator<Item = &'a str>) -> Result<usize> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.archive_path)
            .map_err(|e| CoreError::io("Failed to open archive file", &self.archive_path, e))?;
        let count = write_all(file, lines)
            .map_err(|e| CoreError::io("Failed to append to archive file", &self.archive_path, e))?;
        debug!(path = %self.archive_path.display(), count, "appended to archive");
        Ok(count)
    }

    /// The last non-blank line of the archive and the byte offset it starts at
    ///
    /// Nothing is modified. A missing, empty or blank-only archive yields
    /// `None`.
    pub fn last_archive_line(&self) -> Result<Option<(u64, String)>> {
        let data = match fs::read(&self.archive_path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CoreError::io("Failed to read archive file", &self.archive_path, e)),
        };

        let Some((start, line)) = last_non_blank_line(&data) else {
            return Ok(None);
        };
        let text = std::str::from_utf8(line)
            .map_err(|e| CoreError::parse_with_source("Archive line is not valid UTF-8", e))?
            .trim()
            .to_string();
        Ok(Some((start as u64, text)))
    }

    /// Cut the archive back to `offset` bytes
    ///
    /// Used with the offset from [`Self::last_archive_line`] to drop that
    /// line together with any blank lines after it.
    pub fn truncate_archive(&self, offset: u64) -> Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .open(&self.archive_path)
            .map_err(|e| CoreError::io("Failed to open archive file", &self.archive_path, e))?;
        file.set_len(offset)
            .map_err(|e| CoreError::io("Failed to truncate archive file", &self.archive_path, e))?;
        debug!(path = %self.archive_path.display(), offset, "truncated archive");
        Ok(())
    }
}

/// `done.txt` in the same directory as `path`
pub fn default_archive_path(path: &Path) -> PathBuf {
    path.parent()
        .map(|dir| dir.join(DEFAULT_ARCHIVE_NAME))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ARCHIVE_NAME))
}

fn modified_time(path: &Path) -> Result<SystemTime> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|e| CoreError::io("Failed to read modification time", path, e))
}

fn write_all<'a>(file: File, lines: impl IntoIterator<Item = &'a str>) -> std::io::Result<usize> {
    let mut writer = BufWriter::new(file);
    let mut count = 0;
    for line in lines {
        writeln!(writer, "{}", line)?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

/// Scan backwards from the end for the last line with non-whitespace content
///
/// Returns the byte offset where that line starts and its bytes.
fn last_non_blank_line(data: &[u8]) -> Option<(usize, &[u8])> {
    let mut end = data.len();
    loop {
        let start = data[..end]
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        let line = &data[start..end];
        if !line.trim_ascii().is_empty() {
            return Some((start, line));
        }
        if start == 0 {
            return None;
        }
        end = start - 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, TodoFile) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todo.txt");
        fs::write(&path, "first\n\nsecond\n").unwrap();
        let file = TodoFile::new(&path, None);
        (dir, file)
    }

    #[test]
    fn test_default_archive_path() {
        let file = TodoFile::new("/home/me/todo.txt", None);
        assert_eq!(file.archive_path(), Path::new("/home/me/done.txt"));

        let file = TodoFile::new("/home/me/todo.txt", Some(PathBuf::from("/tmp/a.txt")));
        assert_eq!(file.archive_path(), Path::new("/tmp/a.txt"));
    }

    #[test]
    fn test_read_and_write_lines() {
        let (_dir, mut file) = setup();
        assert_eq!(file.read_lines().unwrap(), vec!["first", "", "second"]);

        file.write_lines(["one", "two"]).unwrap();
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_read_missing_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let mut file = TodoFile::new(dir.path().join("missing.txt"), None);
        let err = file.read_lines().unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn test_has_changed() {
        let (_dir, mut file) = setup();
        file.read_lines().unwrap();
        assert!(!file.has_changed().unwrap());

        file.write_lines(["mine"]).unwrap();
        assert!(!file.has_changed().unwrap());

        let handle = OpenOptions::new().write(true).open(file.path()).unwrap();
        handle.set_modified(SystemTime::UNIX_EPOCH).unwrap();
        assert!(file.has_changed().unwrap());
    }

    #[test]
    fn test_append_creates_archive() {
        let (_dir, file) = setup();
        assert!(!file.archive_path().exists());
        assert_eq!(file.append_archive(["a", "b"]).unwrap(), 2);
        assert_eq!(file.append_archive(["c"]).unwrap(), 1);
        assert_eq!(fs::read_to_string(file.archive_path()).unwrap(), "a\nb\nc\n");
    }

    fn pop(file: &TodoFile) -> Option<String> {
        let (offset, text) = file.last_archive_line().unwrap()?;
        file.truncate_archive(offset).unwrap();
        Some(text)
    }

    #[test]
    fn test_last_archive_line_does_not_modify() {
        let (_dir, file) = setup();
        file.append_archive(["a", "b"]).unwrap();
        assert_eq!(file.last_archive_line().unwrap(), Some((2, "b".to_string())));
        assert_eq!(file.last_archive_line().unwrap(), Some((2, "b".to_string())));
        assert_eq!(fs::read_to_string(file.archive_path()).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_pop_archive_is_lifo_per_line() {
        let (_dir, file) = setup();
        file.append_archive(["a", "b"]).unwrap();

        assert_eq!(pop(&file).as_deref(), Some("b"));
        assert_eq!(fs::read_to_string(file.archive_path()).unwrap(), "a\n");
        assert_eq!(pop(&file).as_deref(), Some("a"));
        assert_eq!(fs::read_to_string(file.archive_path()).unwrap(), "");
        assert_eq!(pop(&file), None);
    }

    #[test]
    fn test_pop_archive_skips_trailing_blank_lines() {
        let (_dir, file) = setup();
        fs::write(file.archive_path(), "keep\n  last one \n\n   \n").unwrap();
        assert_eq!(pop(&file).as_deref(), Some("last one"));
        assert_eq!(fs::read_to_string(file.archive_path()).unwrap(), "keep\n");
    }

    #[test]
    fn test_pop_archive_without_trailing_newline() {
        let (_dir, file) = setup();
        fs::write(file.archive_path(), "a\nb").unwrap();
        assert_eq!(pop(&file).as_deref(), Some("b"));
        assert_eq!(fs::read_to_string(file.archive_path()).unwrap(), "a\n");
    }

    #[test]
    fn test_pop_blank_archive_leaves_it_alone() {
        let (_dir, file) = setup();
        assert_eq!(pop(&file), None);

        fs::write(file.archive_path(), "\n \n\n").unwrap();
        assert_eq!(pop(&file), None);
        assert_eq!(fs::read_to_string(file.archive_path()).unwrap(), "\n \n\n");
    }
}
