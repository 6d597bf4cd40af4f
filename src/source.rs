//! @ai:module:intent Acquire the byte stream a parse reads from
//! @ai:module:layer infrastructure
//! @ai:module:public_api Source, FileSource
//! @ai:module:stateless true

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// @ai:intent Something that can be opened once per parse into an owned reader
pub trait Source {
    type Reader: Read;

    /// @ai:intent Name of the resource, used in error context
    fn path(&self) -> &Path;

    /// @ai:intent Open the resource; the returned reader is released when dropped
    /// @ai:effects fs:read
    fn open(&self) -> io::Result<Self::Reader>;
}

/// @ai:intent A file on disk
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Source for FileSource {
    type Reader = File;

    fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> io::Result<Self::Reader> {
        File::open(&self.path)
    }
}
