pub mod backend;
pub mod config;
pub mod file;
pub mod files;
pub mod store;

pub use backend::Backend;
pub use config::{BackendKind, EmbedConfig};
pub use file::EmbeddedFile;
pub use files::FileHandler;
pub use store::{EmbeddedFileSystem, FileRecord, StoreBuilder};

pub use embedfs_platform::{File, FileInfo, FileMode, FileSystem, FsError, FsResult, Transfer, Whence};
