//! File handles and the host's default file wrapper.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::gateway::Body;

/// Default block size used for file iteration (256 KiB).
pub const DEFAULT_BLOCK_SIZE: usize = 4096 * 64;

/// A readable file that may know its own path.
pub trait FileHandle: Read + Send {
    /// Path the handle was opened from, if any.
    fn path(&self) -> Option<&Path>;
}

/// The "fast file send" facility an environment offers to applications.
pub trait FileWrapper: Send + Sync {
    /// Turn an open file into a response body.
    fn wrap(&self, file: Box<dyn FileHandle>, block_size: usize) -> Body;
}

/// A file opened from disk, remembering its path.
pub struct NamedFile {
    path: PathBuf,
    file: File,
}

impl NamedFile {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        Ok(Self { path, file })
    }

    pub fn metadata(&self) -> io::Result<std::fs::Metadata> {
        self.file.metadata()
    }
}

impl fmt::Debug for NamedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedFile").field("path", &self.path).finish()
    }
}

impl Read for NamedFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl FileHandle for NamedFile {
    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Read up to `block_size` bytes. `None` once the file is exhausted.
pub(crate) fn read_block(file: &mut dyn FileHandle, block_size: usize) -> io::Result<Option<Bytes>> {
    let mut buf = Vec::with_capacity(block_size.min(DEFAULT_BLOCK_SIZE));
    Read::take(&mut *file, block_size as u64).read_to_end(&mut buf)?;
    if buf.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Bytes::from(buf)))
    }
}

/// Fixed-block-size iterator over a file.
pub struct FileChunks {
    file: Box<dyn FileHandle>,
    block_size: usize,
    done: bool,
}

impl FileChunks {
    pub fn new(file: Box<dyn FileHandle>, block_size: usize) -> Self {
        Self {
            file,
            block_size: block_size.max(1),
            done: false,
        }
    }
}

impl Iterator for FileChunks {
    type Item = io::Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match read_block(self.file.as_mut(), self.block_size) {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// File wrapper the host installs when it streams files itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamingFileWrapper;

impl FileWrapper for StreamingFileWrapper {
    fn wrap(&self, file: Box<dyn FileHandle>, block_size: usize) -> Body {
        Body::Chunks(Box::new(FileChunks::new(file, block_size)))
    }
}
