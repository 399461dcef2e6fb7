//! Per-request environment handed to applications.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::gateway::{Body, FileChunks, FileHandle, FileWrapper};

/// Request variables plus the host-supplied file wrapper facility.
#[derive(Default, Clone)]
pub struct Environ {
    vars: HashMap<String, String>,
    file_wrapper: Option<Arc<dyn FileWrapper>>,
}

impl Environ {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variable setter.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_var(key, value);
        self
    }

    /// Builder-style file wrapper setter.
    pub fn with_file_wrapper(mut self, wrapper: Arc<dyn FileWrapper>) -> Self {
        self.file_wrapper = Some(wrapper);
        self
    }

    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn file_wrapper(&self) -> Option<&Arc<dyn FileWrapper>> {
        self.file_wrapper.as_ref()
    }

    /// Install a new file wrapper, returning the one it replaces.
    pub fn replace_file_wrapper(&mut self, wrapper: Option<Arc<dyn FileWrapper>>) -> Option<Arc<dyn FileWrapper>> {
        std::mem::replace(&mut self.file_wrapper, wrapper)
    }

    /// Send a file using the installed facility, or plain block reads when
    /// the host offers none.
    pub fn send_file(&self, file: Box<dyn FileHandle>, block_size: usize) -> Body {
        match &self.file_wrapper {
            Some(wrapper) => wrapper.wrap(file, block_size),
            None => Body::Chunks(Box::new(FileChunks::new(file, block_size))),
        }
    }
}

impl fmt::Debug for Environ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environ")
            .field("vars", &self.vars)
            .field("file_wrapper", &self.file_wrapper.is_some())
            .finish()
    }
}
