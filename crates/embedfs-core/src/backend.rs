use embedfs_host::HostFileSystem;
use embedfs_platform::{File, FileInfo, FileSystem, FsResult};

use crate::config::BackendKind;
use crate::store::EmbeddedFileSystem;

/// Filesystem chosen once at startup and handed to consumers.
#[derive(Debug, Clone)]
pub enum Backend {
    /// Paths go straight to the host OS.
    Host(HostFileSystem),
    /// Paths are looked up in a baked-in store.
    Embedded(EmbeddedFileSystem),
}

impl Backend {
    pub fn host() -> Self {
        Backend::Host(HostFileSystem::new())
    }

    pub fn embedded(store: EmbeddedFileSystem) -> Self {
        Backend::Embedded(store)
    }

    /// Pick a backend by kind. `store` is only consulted for the embedded kind.
    pub fn select(kind: BackendKind, store: EmbeddedFileSystem) -> Self {
        match kind {
            BackendKind::Host => Self::host(),
            BackendKind::Embedded => Self::embedded(store),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Host(_) => BackendKind::Host,
            Backend::Embedded(_) => BackendKind::Embedded,
        }
    }
}

impl FileSystem for Backend {
    fn open(&self, path: &str) -> FsResult<Box<dyn File>> {
        match self {
            Backend::Host(fs) => fs.open(path),
            Backend::Embedded(fs) => fs.open(path),
        }
    }

    fn stat(&self, path: &str) -> FsResult<FileInfo> {
        match self {
            Backend::Host(fs) => fs.stat(path),
            Backend::Embedded(fs) => fs.stat(path),
        }
    }
}
