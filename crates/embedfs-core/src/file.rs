//! Open handle over an embedded record.

use std::io::{self, SeekFrom};
use std::sync::Arc;

use embedfs_platform::{File, FileInfo, FsError, FsResult, Transfer, Whence};

use crate::store::FileRecord;

/// Cursor over one [`FileRecord`].
///
/// Each `open` yields a fresh handle at offset 0. The record is shared
/// with the store and every other handle; closing only fences off this
/// handle.
#[derive(Debug)]
pub struct EmbeddedFile {
    record: Arc<FileRecord>,
    offset: i64,
    closed: bool,
}

impl EmbeddedFile {
    pub(crate) fn new(record: Arc<FileRecord>) -> Self {
        Self {
            record,
            offset: 0,
            closed: false,
        }
    }

    /// Current cursor position. May lie past the end of content.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> FsResult<()> {
        if self.closed {
            Err(FsError::ClosedHandle)
        } else {
            Ok(())
        }
    }

    /// Content from `pos` to the end, or `None` when `pos` is at or past it.
    fn remaining_from(&self, pos: i64) -> Option<&[u8]> {
        let content = self.record.content();
        let start = usize::try_from(pos).ok()?;
        if start >= content.len() {
            None
        } else {
            Some(&content[start..])
        }
    }
}

impl File for EmbeddedFile {
    fn read(&mut self, buf: &mut [u8]) -> FsResult<Transfer> {
        self.ensure_open()?;
        let Some(remaining) = self.remaining_from(self.offset) else {
            return Ok(Transfer::EndOfData(0));
        };

        let n = buf.len().min(remaining.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.offset += n as i64;
        Ok(Transfer::Data(n))
    }

    fn read_at(&self, buf: &mut [u8], offset: i64) -> FsResult<Transfer> {
        self.ensure_open()?;
        if offset < 0 {
            return Err(FsError::InvalidOffset(offset));
        }
        let Some(remaining) = self.remaining_from(offset) else {
            return Ok(Transfer::EndOfData(0));
        };

        let n = buf.len().min(remaining.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        if n < buf.len() {
            Ok(Transfer::EndOfData(n))
        } else {
            Ok(Transfer::Data(n))
        }
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> FsResult<i64> {
        self.ensure_open()?;
        let base = match whence {
            Whence::Start => 0,
            Whence::Current => self.offset,
            Whence::End => self.record.content().len() as i64,
        };
        let abs = base
            .checked_add(offset)
            .filter(|abs| *abs >= 0)
            .ok_or(FsError::InvalidOffset(offset))?;

        // No upper bound; reads past the end report EndOfData.
        self.offset = abs;
        Ok(abs)
    }

    fn stat(&self) -> FsResult<FileInfo> {
        self.ensure_open()?;
        Ok(self.record.info().clone())
    }

    fn readdir(&self, count: isize) -> FsResult<Vec<FileInfo>> {
        self.ensure_open()?;
        let info = self.record.info();
        if !info.is_dir() {
            return Err(FsError::invalid_directory(info.name()));
        }

        let children = self.record.children();
        let Ok(count) = usize::try_from(count) else {
            return Ok(children.to_vec());
        };
        // Over-asking is rejected rather than clamped.
        if count > children.len() {
            return Err(FsError::InvalidCount {
                requested: count,
                available: children.len(),
            });
        }
        Ok(children[..count].to_vec())
    }

    fn close(&mut self) -> FsResult<()> {
        self.closed = true;
        Ok(())
    }
}

impl io::Read for EmbeddedFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(File::read(self, buf)?.len())
    }
}

impl io::Seek for EmbeddedFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (offset, whence) = match pos {
            SeekFrom::Start(n) => {
                let n = i64::try_from(n).map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidInput, "seek offset overflows i64")
                })?;
                (n, Whence::Start)
            }
            SeekFrom::Current(n) => (n, Whence::Current),
            SeekFrom::End(n) => (n, Whence::End),
        };
        let abs = File::seek(self, offset, whence)?;
        Ok(abs as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedfs_platform::FileMode;
    use std::time::SystemTime;

    const BODY: &[u8] = b"0123456789abcdef";

    fn info(name: &str, size: i64, mode: FileMode) -> FileInfo {
        FileInfo::new(name, size, mode, SystemTime::UNIX_EPOCH)
    }

    fn open_file() -> EmbeddedFile {
        let record = FileRecord::file(info("body.bin", BODY.len() as i64, FileMode::file(0o644)), BODY);
        EmbeddedFile::new(Arc::new(record))
    }

    fn open_dir() -> EmbeddedFile {
        let children = vec![
            info("a", 1, FileMode::file(0o644)),
            info("b", 2, FileMode::file(0o644)),
            info("c", 0, FileMode::dir(0o755)),
        ];
        let record = FileRecord::dir(info("dir", 0, FileMode::dir(0o755)), children);
        EmbeddedFile::new(Arc::new(record))
    }

    fn names(entries: &[FileInfo]) -> Vec<&str> {
        entries.iter().map(|e| e.name()).collect()
    }

    #[test]
    fn test_fresh_handle_state() {
        let f = open_file();
        assert_eq!(f.offset(), 0);
        assert!(!f.is_closed());
    }

    #[test]
    fn test_read_round_trip_any_buffer_size() {
        for size in [1, 3, 7, 16, 64] {
            let mut f = open_file();
            let mut out = Vec::new();
            let mut buf = vec![0u8; size];
            loop {
                match File::read(&mut f, &mut buf).unwrap() {
                    Transfer::Data(n) => out.extend_from_slice(&buf[..n]),
                    Transfer::EndOfData(n) => {
                        assert_eq!(n, 0);
                        break;
                    }
                }
            }
            assert_eq!(out, BODY, "buffer size {}", size);
            assert_eq!(f.offset(), BODY.len() as i64);
        }
    }

    #[test]
    fn test_read_at_end_reports_end_of_data() {
        let mut f = open_file();
        File::seek(&mut f, 0, Whence::End).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(File::read(&mut f, &mut buf).unwrap(), Transfer::EndOfData(0));
    }

    #[test]
    fn test_empty_content_is_immediately_exhausted() {
        let record = FileRecord::file(info("empty", 0, FileMode::file(0o644)), &b""[..]);
        let mut f = EmbeddedFile::new(Arc::new(record));
        let mut buf = [0u8; 4];
        assert_eq!(File::read(&mut f, &mut buf).unwrap(), Transfer::EndOfData(0));
        assert_eq!(f.read_at(&mut buf, 0).unwrap(), Transfer::EndOfData(0));
    }

    #[test]
    fn test_read_at_does_not_move_cursor() {
        let mut f = open_file();
        File::seek(&mut f, 2, Whence::Start).unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(f.read_at(&mut buf, 10).unwrap(), Transfer::Data(4));
        assert_eq!(&buf, b"abcd");
        assert_eq!(f.offset(), 2);
    }

    #[test]
    fn test_read_at_partial_carries_count_and_end() {
        let f = open_file();
        let mut buf = [0u8; 8];
        assert_eq!(f.read_at(&mut buf, 12).unwrap(), Transfer::EndOfData(4));
        assert_eq!(&buf[..4], b"cdef");

        assert_eq!(f.read_at(&mut buf, 16).unwrap(), Transfer::EndOfData(0));
        assert_eq!(f.read_at(&mut buf, 1_000).unwrap(), Transfer::EndOfData(0));
        assert!(matches!(
            f.read_at(&mut buf, -1),
            Err(FsError::InvalidOffset(-1))
        ));
    }

    #[test]
    fn test_read_at_exact_fit_is_data() {
        let f = open_file();
        let mut buf = [0u8; 4];
        assert_eq!(f.read_at(&mut buf, 12).unwrap(), Transfer::Data(4));
    }

    #[test]
    fn test_seek_then_read_matches_read_at() {
        for k in 0..=BODY.len() as i64 {
            let mut f = open_file();
            let mut seq = [0u8; 5];
            let mut pos = [0u8; 5];

            assert_eq!(File::seek(&mut f, k, Whence::Start).unwrap(), k);
            let a = File::read(&mut f, &mut seq).unwrap();
            let b = f.read_at(&mut pos, k).unwrap();
            assert_eq!(a.len(), b.len(), "offset {}", k);
            assert_eq!(seq[..a.len()], pos[..b.len()]);
        }
    }

    #[test]
    fn test_seek_origins() {
        let mut f = open_file();
        assert_eq!(File::seek(&mut f, 4, Whence::Start).unwrap(), 4);
        assert_eq!(File::seek(&mut f, 3, Whence::Current).unwrap(), 7);
        assert_eq!(File::seek(&mut f, -2, Whence::Current).unwrap(), 5);
        assert_eq!(File::seek(&mut f, -1, Whence::End).unwrap(), 15);
        assert_eq!(File::seek(&mut f, 10, Whence::End).unwrap(), 26);

        let mut buf = [0u8; 1];
        assert_eq!(File::read(&mut f, &mut buf).unwrap(), Transfer::EndOfData(0));
    }

    #[test]
    fn test_negative_seek_rejected() {
        let mut f = open_file();
        assert!(matches!(
            File::seek(&mut f, -1, Whence::Current),
            Err(FsError::InvalidOffset(-1))
        ));
        assert_eq!(f.offset(), 0);

        File::seek(&mut f, 3, Whence::Start).unwrap();
        assert!(File::seek(&mut f, -17, Whence::End).is_err());
        assert!(File::seek(&mut f, -1, Whence::Start).is_err());
        assert_eq!(f.offset(), 3);
    }

    #[test]
    fn test_seek_overflow_rejected() {
        let mut f = open_file();
        File::seek(&mut f, i64::MAX, Whence::Start).unwrap();
        assert!(matches!(
            File::seek(&mut f, 1, Whence::Current),
            Err(FsError::InvalidOffset(1))
        ));
        assert_eq!(f.offset(), i64::MAX);
    }

    #[test]
    fn test_seek_raw_invalid_whence() {
        let mut f = open_file();
        File::seek(&mut f, 5, Whence::Start).unwrap();
        assert!(matches!(f.seek_raw(1, 9), Err(FsError::InvalidWhence(9))));
        assert_eq!(f.offset(), 5);
        assert_eq!(f.seek_raw(1, 1).unwrap(), 6);
    }

    #[test]
    fn test_stat_repeatable() {
        let f = open_file();
        let a = f.stat().unwrap();
        let b = f.stat().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.name(), "body.bin");
        assert_eq!(f.offset(), 0);
    }

    #[test]
    fn test_closed_handle_rejects_everything() {
        let mut f = open_dir();
        f.close().unwrap();
        assert!(f.is_closed());

        let mut buf = [0u8; 4];
        assert!(matches!(File::read(&mut f, &mut buf), Err(FsError::ClosedHandle)));
        assert!(matches!(f.read_at(&mut buf, 0), Err(FsError::ClosedHandle)));
        assert!(matches!(File::seek(&mut f, 0, Whence::Start), Err(FsError::ClosedHandle)));
        assert!(matches!(f.seek_raw(0, 42), Err(FsError::ClosedHandle)));
        assert!(matches!(f.stat(), Err(FsError::ClosedHandle)));
        assert!(matches!(f.readdir(-1), Err(FsError::ClosedHandle)));
        assert!(f.close().is_ok());
    }

    #[test]
    fn test_readdir_count_policy() {
        let f = open_dir();
        assert_eq!(names(&f.readdir(-1).unwrap()), vec!["a", "b", "c"]);
        assert_eq!(names(&f.readdir(3).unwrap()), vec!["a", "b", "c"]);
        assert_eq!(names(&f.readdir(2).unwrap()), vec!["a", "b"]);
        assert!(f.readdir(0).unwrap().is_empty());
        assert!(matches!(
            f.readdir(4),
            Err(FsError::InvalidCount { requested: 4, available: 3 })
        ));
    }

    #[test]
    fn test_readdir_has_no_continuation() {
        let f = open_dir();
        let first = f.readdir(2).unwrap();
        let second = f.readdir(2).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_readdir_on_file() {
        let f = open_file();
        for count in [-1, 0, 1, 100] {
            assert!(matches!(
                f.readdir(count),
                Err(FsError::InvalidDirectory(_))
            ));
        }
    }

    #[test]
    fn test_close_keeps_record_alive() {
        let record = Arc::new(FileRecord::file(info("x", 1, FileMode::file(0o644)), &b"x"[..]));
        let mut a = EmbeddedFile::new(Arc::clone(&record));
        let b = EmbeddedFile::new(Arc::clone(&record));
        a.close().unwrap();

        let mut buf = [0u8; 1];
        assert_eq!(b.read_at(&mut buf, 0).unwrap(), Transfer::Data(1));
        assert_eq!(&record.content()[..], b"x");
    }

    #[test]
    fn test_io_traits() {
        use std::io::Read as _;

        let mut f = open_file();
        io::Seek::seek(&mut f, SeekFrom::Start(10)).unwrap();
        let mut out = Vec::new();
        f.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"abcdef");

        let err = io::Seek::seek(&mut f, SeekFrom::Current(-100)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let mut copied = Vec::new();
        io::Seek::seek(&mut f, SeekFrom::Start(0)).unwrap();
        io::copy(&mut f, &mut copied).unwrap();
        assert_eq!(copied, BODY);
    }
}
