//! File-send intent handed out as the filter's file wrapper.

use std::fmt;
use std::io;
use std::path::Path;

use bytes::Bytes;

use crate::gateway::file::read_block;
use crate::gateway::{Body, FileHandle, FileWrapper, DEFAULT_BLOCK_SIZE};

/// A file the application asked to send, plus the block size to read it with.
///
/// Iterating the marker reads the file lazily in `block_size` chunks; the
/// final chunk may be shorter. Iteration ends at the first empty read or
/// after the first read error. Dropping or closing it releases the handle.
pub struct FileMarker {
    file: Box<dyn FileHandle>,
    block_size: usize,
    exhausted: bool,
}

impl FileMarker {
    pub fn new(file: Box<dyn FileHandle>, block_size: usize) -> Self {
        Self {
            file,
            block_size: block_size.max(1),
            exhausted: false,
        }
    }

    /// Marker using the default 256 KiB block size.
    pub fn with_default_block_size(file: Box<dyn FileHandle>) -> Self {
        Self::new(file, DEFAULT_BLOCK_SIZE)
    }

    pub fn path(&self) -> Option<&Path> {
        self.file.path()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Give up the handle, e.g. to a fallback file wrapper.
    pub fn into_parts(self) -> (Box<dyn FileHandle>, usize) {
        (self.file, self.block_size)
    }

    pub fn close(self) {
        drop(self.file);
    }
}

impl fmt::Debug for FileMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileMarker")
            .field("path", &self.path())
            .field("block_size", &self.block_size)
            .finish()
    }
}

impl Iterator for FileMarker {
    type Item = io::Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let block = read_block(self.file.as_mut(), self.block_size);
        // Not restartable: stop at end of file and after any read error.
        self.exhausted = !matches!(block, Ok(Some(_)));
        block.transpose()
    }
}

/// File wrapper that turns every file into a [`FileMarker`] body.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerWrapper;

impl FileWrapper for MarkerWrapper {
    fn wrap(&self, file: Box<dyn FileHandle>, block_size: usize) -> Body {
        Body::File(FileMarker::new(file, block_size))
    }
}
