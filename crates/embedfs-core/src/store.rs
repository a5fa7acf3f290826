//! Backing store for the embedded filesystem.
//!
//! The store maps exact path strings to [`FileRecord`]s. It is assembled
//! once (usually from data baked in with `include_bytes!`) and never
//! mutated afterwards, so any number of threads may open and stat through
//! a shared reference.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use embedfs_platform::{File, FileInfo, FileSystem, FsError, FsResult};

use crate::file::EmbeddedFile;

/// Metadata, content and child listing for one embedded path.
#[derive(Debug, Clone)]
pub struct FileRecord {
    info: FileInfo,
    content: Bytes,
    children: Vec<FileInfo>,
}

impl FileRecord {
    pub fn new(info: FileInfo, content: impl Into<Bytes>, children: Vec<FileInfo>) -> Self {
        Self {
            info,
            content: content.into(),
            children,
        }
    }

    /// Regular file record.
    pub fn file(info: FileInfo, content: impl Into<Bytes>) -> Self {
        Self::new(info, content, Vec::new())
    }

    /// Directory record. Children keep the order given here.
    pub fn dir(info: FileInfo, children: Vec<FileInfo>) -> Self {
        Self::new(info, Bytes::new(), children)
    }

    pub fn info(&self) -> &FileInfo {
        &self.info
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn children(&self) -> &[FileInfo] {
        &self.children
    }
}

/// Read-only filesystem over an in-memory path → record map.
///
/// Lookup is a literal string match: `"/a/b"`, `"a/b"` and `"/a/./b"` are
/// three different keys.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedFileSystem {
    records: HashMap<String, Arc<FileRecord>>,
}

impl EmbeddedFileSystem {
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    /// Open without boxing, for callers that know the backend.
    pub fn open_file(&self, path: &str) -> FsResult<EmbeddedFile> {
        self.records
            .get(path)
            .map(|record| EmbeddedFile::new(Arc::clone(record)))
            .ok_or_else(|| FsError::not_found(path))
    }

    /// Borrow the record registered under `path`.
    pub fn get(&self, path: &str) -> Option<&FileRecord> {
        self.records.get(path).map(|r| r.as_ref())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.records.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Registered paths, sorted.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.records.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}

impl FileSystem for EmbeddedFileSystem {
    fn open(&self, path: &str) -> FsResult<Box<dyn File>> {
        Ok(Box::new(self.open_file(path)?))
    }

    fn stat(&self, path: &str) -> FsResult<FileInfo> {
        self.records
            .get(path)
            .map(|record| record.info().clone())
            .ok_or_else(|| FsError::not_found(path))
    }
}

impl<P: Into<String>> FromIterator<(P, FileRecord)> for EmbeddedFileSystem {
    fn from_iter<I: IntoIterator<Item = (P, FileRecord)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(StoreBuilder::new(), |b, (path, record)| b.record(path, record))
            .build()
    }
}

/// Assembles an [`EmbeddedFileSystem`].
///
/// Input is taken as-is: directory children are not checked against the
/// registered paths, and a path inserted twice keeps its last record.
#[derive(Debug, Default)]
pub struct StoreBuilder {
    records: HashMap<String, Arc<FileRecord>>,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(mut self, path: impl Into<String>, record: FileRecord) -> Self {
        self.records.insert(path.into(), Arc::new(record));
        self
    }

    pub fn file(self, path: impl Into<String>, info: FileInfo, content: impl Into<Bytes>) -> Self {
        self.record(path, FileRecord::file(info, content))
    }

    pub fn dir(self, path: impl Into<String>, info: FileInfo, children: Vec<FileInfo>) -> Self {
        self.record(path, FileRecord::dir(info, children))
    }

    pub fn build(self) -> EmbeddedFileSystem {
        debug!("embedded store built with {} records", self.records.len());
        EmbeddedFileSystem {
            records: self.records,
        }
    }
}
