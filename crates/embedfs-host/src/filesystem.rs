use std::fs;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::time::UNIX_EPOCH;

use embedfs_platform::{File, FileInfo, FileMode, FileSystem, FsError, FsResult, Transfer, Whence};

/// Filesystem backed by the host OS. Paths go to `std::fs` unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostFileSystem;

impl HostFileSystem {
    pub fn new() -> Self {
        Self
    }

    /// Open without boxing, for callers that know the backend.
    pub fn open_file(&self, path: &str) -> FsResult<HostFile> {
        let file = fs::File::open(path).map_err(|e| FsError::from_io(path, e))?;
        Ok(HostFile {
            path: path.to_string(),
            file: Some(file),
        })
    }
}

impl FileSystem for HostFileSystem {
    fn open(&self, path: &str) -> FsResult<Box<dyn File>> {
        Ok(Box::new(self.open_file(path)?))
    }

    fn stat(&self, path: &str) -> FsResult<FileInfo> {
        let meta = fs::metadata(path).map_err(|e| FsError::from_io(path, e))?;
        Ok(to_file_info(Path::new(path), &meta))
    }
}

/// Open handle on a host file or directory.
#[derive(Debug)]
pub struct HostFile {
    path: String,
    file: Option<fs::File>,
}

impl HostFile {
    fn inner(&self) -> FsResult<&fs::File> {
        self.file.as_ref().ok_or(FsError::ClosedHandle)
    }

    fn inner_mut(&mut self) -> FsResult<&mut fs::File> {
        self.file.as_mut().ok_or(FsError::ClosedHandle)
    }
}

impl File for HostFile {
    fn read(&mut self, buf: &mut [u8]) -> FsResult<Transfer> {
        let n = self.inner_mut()?.read(buf)?;
        if n == 0 && !buf.is_empty() {
            Ok(Transfer::EndOfData(0))
        } else {
            Ok(Transfer::Data(n))
        }
    }

    fn read_at(&self, buf: &mut [u8], offset: i64) -> FsResult<Transfer> {
        let file = self.inner()?;
        if offset < 0 {
            return Err(FsError::InvalidOffset(offset));
        }

        // Keep reading until the buffer is full or the file runs out.
        let mut filled = 0;
        while filled < buf.len() {
            let pos = offset as u64 + filled as u64;
            match positioned_read(file, &mut buf[filled..], pos) {
                Ok(0) => return Ok(Transfer::EndOfData(filled)),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(Transfer::Data(filled))
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> FsResult<i64> {
        let pos = match whence {
            Whence::Start => {
                if offset < 0 {
                    self.inner()?;
                    return Err(FsError::InvalidOffset(offset));
                }
                SeekFrom::Start(offset as u64)
            }
            Whence::Current => SeekFrom::Current(offset),
            Whence::End => SeekFrom::End(offset),
        };
        let abs = self.inner_mut()?.seek(pos).map_err(|e| {
            if e.kind() == io::ErrorKind::InvalidInput {
                FsError::InvalidOffset(offset)
            } else {
                FsError::Io(e)
            }
        })?;
        Ok(abs as i64)
    }

    fn stat(&self) -> FsResult<FileInfo> {
        let meta = self.inner()?.metadata()?;
        Ok(to_file_info(Path::new(&self.path), &meta))
    }

    fn readdir(&self, count: isize) -> FsResult<Vec<FileInfo>> {
        let info = self.stat()?;
        if !info.is_dir() {
            return Err(FsError::invalid_directory(info.name()));
        }

        let limit = usize::try_from(count).unwrap_or(usize::MAX);
        let mut result = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            if result.len() >= limit {
                break;
            }
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("skipping dir entry in {}: {}", self.path, e);
                    continue;
                }
            };
            match entry.metadata() {
                Ok(meta) => result.push(to_file_info(&entry.path(), &meta)),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", entry.path().display(), e);
                }
            }
        }
        Ok(result)
    }

    fn close(&mut self) -> FsResult<()> {
        self.file = None;
        Ok(())
    }
}

#[cfg(unix)]
fn positioned_read(file: &fs::File, buf: &mut [u8], pos: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, pos)
}

#[cfg(windows)]
fn positioned_read(file: &fs::File, buf: &mut [u8], pos: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, pos)
}

fn to_file_info(path: &Path, meta: &fs::Metadata) -> FileInfo {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());

    let perm = permission_bits(meta);
    let mut mode = if meta.is_dir() {
        FileMode::dir(perm)
    } else {
        FileMode::file(perm)
    };
    if meta.file_type().is_symlink() {
        mode |= FileMode::SYMLINK;
    }

    let mod_time = meta.modified().unwrap_or(UNIX_EPOCH);
    FileInfo::new(name, meta.len() as i64, mode, mod_time)
}

#[cfg(unix)]
fn permission_bits(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode()
}

#[cfg(not(unix))]
fn permission_bits(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o666
    }
}
