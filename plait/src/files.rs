//! A thin wrapper over `codespan_reporting::files::SimpleFiles` that hands out
//! compact `FileId` handles instead of `usize` indices.

use std::fmt;
use std::num::NonZeroU32;
use std::ops::Range;

use codespan_reporting::files::{Error, SimpleFile};

/// File id.
// `NonZeroU32` keeps `ByteRange` small, and 4 billion files is plenty.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FileId(NonZeroU32);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<FileId> for usize {
    fn from(file_id: FileId) -> usize {
        file_id.0.get() as usize
    }
}

/// Database of the source files loaded into a driver session.
pub struct Files {
    files: Vec<SimpleFile<String, String>>,
}

impl Files {
    /// Create an empty files database.
    pub fn new() -> Files {
        Files { files: Vec::new() }
    }

    /// Add a file to the database, returning the handle that can be used to
    /// refer to it again.
    pub fn add(&mut self, name: String, source: String) -> FileId {
        self.files.push(SimpleFile::new(name, source));
        let id = u32::try_from(self.files.len()).expect("too many files");
        FileId(NonZeroU32::new(id).unwrap())
    }

    /// Get the file corresponding to the given id.
    pub fn get(&self, file_id: FileId) -> Result<&SimpleFile<String, String>, Error> {
        let index = usize::from(file_id) - 1;
        self.files.get(index).ok_or(Error::FileMissing)
    }

    /// The source text of the given file.
    pub fn source(&self, file_id: FileId) -> Result<&str, Error> {
        Ok(self.get(file_id)?.source().as_str())
    }
}

impl<'a> codespan_reporting::files::Files<'a> for Files {
    type FileId = FileId;
    type Name = &'a str;
    type Source = &'a str;

    fn name(&self, file_id: FileId) -> Result<&str, Error> {
        Ok(self.get(file_id)?.name().as_str())
    }

    fn source(&self, file_id: FileId) -> Result<&str, Error> {
        Files::source(self, file_id)
    }

    fn line_index(&self, file_id: FileId, byte_index: usize) -> Result<usize, Error> {
        self.get(file_id)?.line_index((), byte_index)
    }

    fn line_range(&self, file_id: FileId, line_index: usize) -> Result<Range<usize>, Error> {
        self.get(file_id)?.line_range((), line_index)
    }
}
