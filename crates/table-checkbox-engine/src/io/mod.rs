use relative_path::{RelativePath, RelativePathBuf};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid notes directory: {0}")]
    InvalidNotesDir(String),
}

/// Persisted storage for documents, addressed by notes-relative path
pub trait FileStore {
    fn read(&self, path: &RelativePath) -> Result<String, IoError>;
    fn write(&mut self, path: &RelativePath, content: &str) -> Result<(), IoError>;
}

/// Documents stored under a notes directory on disk
#[derive(Debug, Clone)]
pub struct NotesDir {
    root: PathBuf,
}

impl NotesDir {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, IoError> {
        let root = root.into();
        validate_notes_dir(&root)?;
        Ok(Self { root })
    }
}

impl FileStore for NotesDir {
    fn read(&self, path: &RelativePath) -> Result<String, IoError> {
        read_file(path, &self.root)
    }

    fn write(&mut self, path: &RelativePath, content: &str) -> Result<(), IoError> {
        write_file(path, &self.root, content)
    }
}

/// Documents held in memory, for hosts that keep their own persistence
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    files: BTreeMap<RelativePathBuf, String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files
            .insert(RelativePathBuf::from(path), content.to_string());
        self
    }

    /// Number of successful writes, useful for asserting no-ops
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl FileStore for MemoryStore {
    fn read(&self, path: &RelativePath) -> Result<String, IoError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| IoError::NotFound(PathBuf::from(path.as_str())))
    }

    fn write(&mut self, path: &RelativePath, content: &str) -> Result<(), IoError> {
        self.files.insert(path.to_relative_path_buf(), content.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Read a markdown file and return its content
pub fn read_file(relative_path: &RelativePath, notes_root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(notes_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Write content to a markdown file
pub fn write_file(
    relative_path: &RelativePath,
    notes_root: &Path,
    content: &str,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(notes_root);

    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(&absolute_path, content).map_err(IoError::Io)
}

pub fn validate_notes_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidNotesDir(
            "Directory does not exist".to_string(),
        ));
    }

    Ok(())
}
