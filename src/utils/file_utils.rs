/// File handle utilities
///
/// This module defines the `FileHandle` abstraction the analyzer reads from,
/// along with an on-disk implementation and an in-memory one.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::string::FromUtf8Error;

use log::debug;
use thiserror::Error;

/// Failure while reading from a file handle
#[derive(Debug, Error)]
pub enum HandleError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("content is not valid UTF-8 text: {0}")]
    Decode(#[from] FromUtf8Error),
}

/// Read access to one file under analysis
///
/// Implementations must not change their content while an analysis runs.
pub trait FileHandle {
    /// Display name, including any extension
    fn name(&self) -> &str;

    /// Size in bytes
    fn size(&self) -> u64;

    /// Read up to `length` bytes starting at `offset`
    ///
    /// Returns fewer bytes when the file ends early.
    fn read_bytes(&self, offset: u64, length: usize) -> Result<Vec<u8>, HandleError>;

    /// Read and decode the whole file as UTF-8 text
    fn read_all_as_text(&self) -> Result<String, HandleError>;
}

/// A file on disk, opened lazily for each read
#[derive(Debug, Clone)]
pub struct DiskFile {
    path: PathBuf,
    name: String,
    size: u64,
}

impl DiskFile {
    /// Create a handle for `path`, taking the size from its metadata
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    ///
    /// # Returns
    ///
    /// The handle, or the metadata error
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, HandleError> {
        let path = path.as_ref().to_path_buf();
        let size = fs::metadata(&path)?.len();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        Ok(Self { path, name, size })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileHandle for DiskFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn read_bytes(&self, offset: u64, length: usize) -> Result<Vec<u8>, HandleError> {
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;

        let mut buffer = Vec::with_capacity(length);
        file.take(length as u64).read_to_end(&mut buffer)?;
        debug!("Read {} bytes at offset {} from {}", buffer.len(), offset, self.path.display());

        Ok(buffer)
    }

    fn read_all_as_text(&self) -> Result<String, HandleError> {
        let bytes = fs::read(&self.path)?;
        Ok(String::from_utf8(bytes)?)
    }
}

/// An in-memory file, useful for library callers that already hold the bytes
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    data: Vec<u8>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

impl FileHandle for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_bytes(&self, offset: u64, length: usize) -> Result<Vec<u8>, HandleError> {
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(self.data.len());
        let end = start.saturating_add(length).min(self.data.len());
        Ok(self.data[start..end].to_vec())
    }

    fn read_all_as_text(&self) -> Result<String, HandleError> {
        Ok(String::from_utf8(self.data.clone())?)
    }
}

/// Split the extension off a file name
///
/// Returns the text after the last `.`, uppercased, or an empty string when
/// the name has no dot.
pub fn extension_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_uppercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("photo.png"), "PNG");
        assert_eq!(extension_of("archive.tar.GZ"), "GZ");
        assert_eq!(extension_of("Makefile"), "");
        assert_eq!(extension_of("trailing."), "");
        assert_eq!(extension_of(".bashrc"), "BASHRC");
    }

    #[test]
    fn test_memory_file_ranges() {
        let file = MemoryFile::new("a.bin", vec![1u8, 2, 3, 4, 5]);
        assert_eq!(file.size(), 5);
        assert_eq!(file.read_bytes(0, 3).unwrap(), vec![1, 2, 3]);
        assert_eq!(file.read_bytes(3, 20).unwrap(), vec![4, 5]);
        assert!(file.read_bytes(99, 4).unwrap().is_empty());
    }

    #[test]
    fn test_memory_file_invalid_utf8() {
        let file = MemoryFile::new("blob.dat", vec![0xFF, 0xFE, 0x00, 0xC3]);
        assert!(matches!(file.read_all_as_text(), Err(HandleError::Decode(_))));
    }

    #[test]
    fn test_disk_file_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let mut f = File::create(&path).unwrap();
        f.write_all(b"hello disk").unwrap();
        drop(f);

        let handle = DiskFile::open(&path).unwrap();
        assert_eq!(handle.name(), "notes.txt");
        assert_eq!(handle.size(), 10);
        assert_eq!(handle.read_bytes(0, 20).unwrap(), b"hello disk".to_vec());
        assert_eq!(handle.read_bytes(6, 2).unwrap(), b"di".to_vec());
        assert_eq!(handle.read_all_as_text().unwrap(), "hello disk");
    }

    #[test]
    fn test_disk_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            DiskFile::open(dir.path().join("nope.txt")),
            Err(HandleError::Io(_))
        ));
    }
}
