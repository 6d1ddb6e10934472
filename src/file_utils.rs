use anyhow::{Result, Context};
use chrono::{DateTime, Local};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Extension of the files processed in folder mode
pub const MARKDOWN_EXTENSION: &str = "md";

/// Suffix appended to a processed file's original
pub const BACKUP_SUFFIX: &str = ".bak";

/// Stem suffix of the corrected copy in single-file mode
pub const MODIFIED_SUFFIX: &str = "_modified";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: `{stem}_modified.{ext}` next to the input
    pub fn modified_output_path<P: AsRef<Path>>(input_file: P) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default().to_string_lossy();
        let extension = input_file
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_else(|| MARKDOWN_EXTENSION.to_string());

        input_file.with_file_name(format!("{}{}.{}", stem, MODIFIED_SUFFIX, extension))
    }

    // @generates: `file.md` -> `file.md.bak`
    pub fn backup_path<P: AsRef<Path>>(input_file: P) -> PathBuf {
        let mut name = input_file.as_ref().as_os_str().to_owned();
        name.push(BACKUP_SUFFIX);
        PathBuf::from(name)
    }

    // @generates: `organized_notes_{timestamp}.md` in the input's directory
    pub fn organized_notes_path<P: AsRef<Path>>(input_file: P, now: DateTime<Local>) -> PathBuf {
        let dir = input_file.as_ref().parent().unwrap_or_else(|| Path::new(""));
        dir.join(format!("organized_notes_{}.md", now.format("%Y-%m-%d_%H-%M-%S")))
    }

    /// Find Markdown files below `dir`, skipping stems that contain `exclude_marker`
    ///
    /// Results are sorted so folder runs process files in a stable order.
    pub fn find_markdown_files<P: AsRef<Path>>(dir: P, exclude_marker: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            let is_markdown = path
                .extension()
                .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(MARKDOWN_EXTENSION))
                .unwrap_or(false);
            if !is_markdown {
                continue;
            }

            let stem = path.file_stem().unwrap_or_default().to_string_lossy();
            if !exclude_marker.is_empty() && stem.contains(exclude_marker) {
                continue;
            }

            result.push(path.to_path_buf());
        }

        result.sort();
        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                Self::ensure_dir(parent)?;
            }
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Move the original to its `.bak` path and write `content` in its place.
    ///
    /// An existing backup already holds the first original and is never replaced;
    /// only the file itself is rewritten in that case.
    pub fn replace_with_backup<P: AsRef<Path>>(path: P, content: &str) -> Result<PathBuf> {
        let path = path.as_ref();
        let backup = Self::backup_path(path);

        if backup.exists() {
            debug!("Keeping existing backup {:?}", backup);
        } else {
            fs::rename(path, &backup)
                .with_context(|| format!("Failed to back up {:?} to {:?}", path, backup))?;
        }
        Self::write_to_file(path, content)?;

        Ok(backup)
    }
}
