use std::fmt;
use std::time::SystemTime;

use bitflags::bitflags;

bitflags! {
    /// File type and permission bits.
    ///
    /// The low nine bits hold Unix permissions; the high bits mark the
    /// entry type. A mode with no type bit set is a regular file.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FileMode: u32 {
        const DIR = 1 << 31;
        const SYMLINK = 1 << 27;
        const PERM = 0o777;
    }
}

impl FileMode {
    /// Regular file with the given permission bits.
    pub fn file(perm: u32) -> Self {
        Self::from_bits_retain(perm & Self::PERM.bits())
    }

    /// Directory with the given permission bits.
    pub fn dir(perm: u32) -> Self {
        Self::DIR | Self::file(perm)
    }

    pub fn is_dir(&self) -> bool {
        self.contains(Self::DIR)
    }

    pub fn is_symlink(&self) -> bool {
        self.contains(Self::SYMLINK)
    }

    pub fn is_regular(&self) -> bool {
        !self.intersects(Self::DIR | Self::SYMLINK)
    }

    pub fn perm(&self) -> u32 {
        self.bits() & Self::PERM.bits()
    }
}

/// Renders `ls -l` style, e.g. `drwxr-xr-x`.
impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_dir() {
            'd'
        } else if self.is_symlink() {
            'l'
        } else {
            '-'
        };
        let mut out = String::with_capacity(10);
        out.push(kind);
        let perm = self.perm();
        for shift in [6, 3, 0] {
            let bits = (perm >> shift) & 0o7;
            out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
            out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
            out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
        }
        f.write_str(&out)
    }
}

/// Immutable metadata for one file or directory.
///
/// `size` is whatever the record was built with; it is never recomputed
/// from content, so directories may carry a non-zero size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    name: String,
    size: i64,
    mode: FileMode,
    mod_time: SystemTime,
}

impl FileInfo {
    pub fn new(name: impl Into<String>, size: i64, mode: FileMode, mod_time: SystemTime) -> Self {
        Self {
            name: name.into(),
            size,
            mode,
            mod_time,
        }
    }

    /// Base name of the entry (not the full path).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn mode(&self) -> FileMode {
        self.mode
    }

    pub fn mod_time(&self) -> SystemTime {
        self.mod_time
    }

    pub fn is_dir(&self) -> bool {
        self.mode.is_dir()
    }
}
