// Backend-neutral filesystem capability: metadata types, errors and the
// FileSystem / File traits every backend implements.

pub mod error;
pub mod filesystem;
pub mod info;

pub use error::{FsError, FsResult};
pub use filesystem::{File, FileSystem, Transfer, Whence};
pub use info::{FileInfo, FileMode};
