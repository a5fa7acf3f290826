use crate::error::{FsError, FsResult};
use crate::info::FileInfo;

/// Seek origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Start,
    Current,
    End,
}

impl Whence {
    pub const START: i32 = 0;
    pub const CURRENT: i32 = 1;
    pub const END: i32 = 2;
}

/// Decodes the numeric origin used by callers that speak the classic
/// 0/1/2 convention.
impl TryFrom<i32> for Whence {
    type Error = FsError;

    fn try_from(raw: i32) -> FsResult<Self> {
        match raw {
            Self::START => Ok(Whence::Start),
            Self::CURRENT => Ok(Whence::Current),
            Self::END => Ok(Whence::End),
            other => Err(FsError::InvalidWhence(other)),
        }
    }
}

/// Outcome of a successful read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// Bytes were copied and more may follow.
    Data(usize),
    /// Bytes were copied (possibly none) and no more remain from this
    /// position. The count is still valid data.
    EndOfData(usize),
}

impl Transfer {
    /// Number of bytes copied into the caller's buffer.
    pub fn len(&self) -> usize {
        match *self {
            Transfer::Data(n) | Transfer::EndOfData(n) => n,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_end_of_data(&self) -> bool {
        matches!(self, Transfer::EndOfData(_))
    }
}

/// An open file or directory.
///
/// Handles are owned by a single caller at a time; the cursor moves only
/// through `read` and `seek` on the same handle. Every operation after
/// [`close`](File::close) fails with [`FsError::ClosedHandle`], except
/// `close` itself which always succeeds.
pub trait File: Send {
    /// Sequential read from the cursor, advancing it by the bytes copied.
    fn read(&mut self, buf: &mut [u8]) -> FsResult<Transfer>;

    /// Positioned read. Does not consult or move the cursor.
    fn read_at(&self, buf: &mut [u8], offset: i64) -> FsResult<Transfer>;

    /// Moves the cursor and returns its new absolute position.
    fn seek(&mut self, offset: i64, whence: Whence) -> FsResult<i64>;

    fn stat(&self) -> FsResult<FileInfo>;

    /// Lists directory entries. A negative `count` lists everything.
    fn readdir(&self, count: isize) -> FsResult<Vec<FileInfo>>;

    fn close(&mut self) -> FsResult<()>;

    /// Seek with a numeric origin (0 = start, 1 = current, 2 = end).
    ///
    /// An unknown origin fails with [`FsError::InvalidWhence`] and leaves
    /// the cursor where it was. A closed handle reports
    /// [`FsError::ClosedHandle`] first.
    fn seek_raw(&mut self, offset: i64, whence: i32) -> FsResult<i64> {
        self.stat()?;
        let whence = Whence::try_from(whence)?;
        self.seek(offset, whence)
    }
}

/// Path-addressed filesystem capability.
pub trait FileSystem: Send + Sync {
    fn open(&self, path: &str) -> FsResult<Box<dyn File>>;
    fn stat(&self, path: &str) -> FsResult<FileInfo>;
}
