// Host filesystem backend: straight delegation to std::fs.

pub mod filesystem;

pub use filesystem::{HostFile, HostFileSystem};
