use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use embedfs_platform::{File, FileInfo, FileSystem};

/// Default chunk size for file downloads (64 KB)
pub const DOWNLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Serves listings and file content from any backend.
///
/// Works purely through `open`/`stat` and the handle operations, so the
/// host and embedded backends are interchangeable underneath it.
pub struct FileHandler {
    fs: Box<dyn FileSystem>,
    chunk_size: usize,
}

impl FileHandler {
    pub fn new(fs: Box<dyn FileSystem>) -> Self {
        Self {
            fs,
            chunk_size: DOWNLOAD_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Stat a path without opening it.
    pub fn metadata(&self, path: &str) -> Result<FileInfo> {
        self.fs
            .stat(path)
            .with_context(|| format!("failed to stat {}", path))
    }

    /// List every entry of a directory, in the backend's order.
    pub fn list(&self, path: &str) -> Result<Vec<FileInfo>> {
        info!("file list: {}", path);
        self.with_open(path, |file| {
            file.readdir(-1)
                .with_context(|| format!("failed to read directory {}", path))
        })
    }

    /// Stream a file through `sink` in chunks of at most `chunk_size` bytes.
    ///
    /// An empty file produces a single empty chunk. Returns the number of
    /// bytes delivered.
    pub fn download<F>(&self, path: &str, mut sink: F) -> Result<u64>
    where
        F: FnMut(&[u8]) -> Result<()>,
    {
        info!("file download: {}", path);
        self.with_open(path, |file| {
            let meta = file.stat()?;
            if meta.is_dir() {
                anyhow::bail!("{} is a directory", path);
            }

            let mut buf = vec![0u8; self.chunk_size];
            let mut total = 0u64;
            let mut chunks = 0usize;
            loop {
                let transfer = file
                    .read(&mut buf)
                    .with_context(|| format!("failed to read {}", path))?;
                let n = transfer.len();
                if n > 0 {
                    sink(&buf[..n])?;
                    total += n as u64;
                    chunks += 1;
                }
                if transfer.is_end_of_data() || n == 0 {
                    break;
                }
            }

            if chunks == 0 {
                sink(&[])?;
            }
            debug!("file download: {} done ({} bytes)", path, total);
            Ok(total)
        })
    }

    /// Read a whole file into memory.
    pub fn read_all(&self, path: &str) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.download(path, |chunk| {
            out.extend_from_slice(chunk);
            Ok(())
        })?;
        Ok(out)
    }

    /// Open `path`, run `f` on the handle, and close it whatever `f` returned.
    fn with_open<T, F>(&self, path: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn File) -> Result<T>,
    {
        let mut file = self
            .fs
            .open(path)
            .with_context(|| format!("failed to open {}", path))?;
        let result = f(file.as_mut());
        if let Err(e) = file.close() {
            warn!("failed to close {}: {}", path, e);
        }
        result
    }
}
