use std::collections::BTreeSet;
use std::ffi::CStr;
use std::os::unix::ffi::OsStrExt;

use libc::{c_int, stat as Stat};

use crate::fs::directory::Directory;
use crate::fs::error::{DiskError, PathLengthError};
use crate::fs::fd::Fd;
use crate::fs::path::{Path, validity};
use crate::fs::status::{self, StatusInfo, Timestamp};
use crate::fs::FileType;
use crate::magic::{self, FileKind, MAGIC_LEN};

// Every query in here goes to the OS again, nothing about the entry is remembered between calls.
impl Path {
    fn stat_raw(&self, no_follow: bool) -> Result<Option<Stat>, DiskError> {
        if self.is_empty() {
            return Ok(None);
        }
        status::stat(&self.to_c_string()?, no_follow)
    }

    fn file_type(&self) -> Result<Option<FileType>, DiskError> {
        Ok(self.stat_raw(false)?.map(|raw| FileType::from_stat_mode(raw.st_mode)))
    }

    pub fn exists(&self) -> Result<bool, DiskError> {
        Ok(self.stat_raw(false)?.is_some())
    }

    /// Whether the path names a regular file, following symlinks.
    pub fn is_file(&self) -> Result<bool, DiskError> {
        Ok(self.file_type()?.is_some_and(|t| t.is_regular()))
    }

    /// Whether the path names a directory, following symlinks.
    pub fn is_directory(&self) -> Result<bool, DiskError> {
        Ok(self.file_type()?.is_some_and(|t| t.is_directory()))
    }

    /// Whether the path names the root directory, however it is spelled.
    pub fn is_root_directory(&self) -> Result<bool, DiskError> {
        let Some(this) = self.stat_raw(false)? else {
            return Ok(false);
        };
        let Some(root) = Path::root().stat_raw(false)? else {
            return Ok(false);
        };
        Ok(this.st_dev == root.st_dev && this.st_ino == root.st_ino)
    }

    /// Whether the final component is hidden, which on Unix means that it starts with a `.`.
    pub fn is_hidden(&self) -> bool {
        let last = self.last_component().as_bytes();
        last.starts_with(b".") && last != b"." && last != b".."
    }

    fn access(&self, mode: c_int) -> bool {
        let Ok(pathname) = self.to_c_string() else {
            return false;
        };
        // SAFETY: pathname is a valid, null-terminated string for the duration of the call.
        unsafe { libc::access(pathname.as_ptr(), mode) == 0 }
    }

    pub fn can_read(&self) -> bool {
        self.access(libc::R_OK)
    }

    pub fn can_write(&self) -> bool {
        self.access(libc::W_OK)
    }

    /// Whether the path names a regular file that may be executed. Directories are never
    /// executable, even when they may be searched.
    pub fn can_execute(&self) -> bool {
        self.access(libc::X_OK) && matches!(self.is_file(), Ok(true))
    }

    /// Adds a path for every entry of the directory to `paths`. Returns `false` without touching
    /// `paths` if this isn't a directory. Fails with a path length error if an entry is nested too
    /// deep to be named by a path, in which case `paths` may hold some of the entries.
    pub fn list_directory(&self, paths: &mut BTreeSet<Path>) -> Result<bool, DiskError> {
        if !self.is_directory()? {
            return Ok(false);
        }

        let mut dir = match Directory::open(&self.to_c_string()?) {
            Ok(dir) => dir,
            // Removed since the check above.
            Err(e) if e.is_not_found() => return Ok(false),
            Err(e) => Err(e)?,
        };

        for name in dir.entries() {
            let name = name?;
            let mut entry = self.clone();
            // Names from readdir are always valid components, so only the length can fail.
            if !entry.append_component(&name) {
                tracing::debug!(
                    dir = %self,
                    entry = %name.to_string_lossy(),
                    "directory entry is too deep to be named by a path"
                );
                Err(PathLengthError)?
            }
            paths.insert(entry);
        }
        Ok(true)
    }

    /// The status of the entry, or `None` if there is no such entry.
    pub fn status_info(&self) -> Result<Option<StatusInfo>, DiskError> {
        Ok(self.stat_raw(false)?.map(|raw| StatusInfo::from_stat(&raw)))
    }

    /// The time of the last modification, or `None` if there is no such entry.
    pub fn modified(&self) -> Result<Option<Timestamp>, DiskError> {
        Ok(self.status_info()?.map(|info| info.mod_time))
    }

    /// The size in bytes, or `None` if there is no such entry.
    pub fn size(&self) -> Result<Option<u64>, DiskError> {
        Ok(self.status_info()?.map(|info| info.file_size))
    }

    /// Reads up to `len` bytes from the start of the file. Returns `None` if the path doesn't name
    /// an existing, readable, regular file.
    pub fn magic_number(&self, len: usize) -> Result<Option<Vec<u8>>, DiskError> {
        if self.is_empty() {
            return Ok(None);
        }
        let fd = match open_for_magic(&self.to_c_string()?) {
            Ok(fd) => fd,
            Err(
                e @ (DiskError::Path(_)
                | DiskError::Permission(_)
                | DiskError::IsDir(_)),
            ) => {
                tracing::trace!(path = %self, error = %e, "no magic number available");
                return Ok(None);
            },
            Err(e) => Err(e)?,
        };
        if !FileType::from_stat_mode(fd.stat()?.st_mode).is_regular() {
            return Ok(None);
        }

        let prefix = fd.read_up_to(len)?;
        fd.close()?;
        Ok(Some(prefix))
    }

    /// Whether the file starts with exactly `expected`. Any failure to read it counts as a
    /// mismatch.
    pub fn has_magic_number(&self, expected: &[u8]) -> bool {
        matches!(self.magic_number(expected.len()), Ok(Some(actual)) if actual == expected)
    }

    /// Classifies the file by its magic number. Anything that isn't a readable file is
    /// [`FileKind::Unknown`].
    pub fn file_kind(&self) -> FileKind {
        match self.magic_number(MAGIC_LEN) {
            Ok(Some(prefix)) => magic::classify(&prefix),
            Ok(None) => FileKind::Unknown,
            Err(e) => {
                tracing::trace!(path = %self, error = %e, "failed to read magic number");
                FileKind::Unknown
            },
        }
    }

    pub fn is_archive(&self) -> bool {
        self.file_kind().is_archive()
    }

    pub fn is_bytecode(&self) -> bool {
        self.file_kind().is_bytecode()
    }

    pub fn is_compressed_bytecode(&self) -> bool {
        self.file_kind().is_compressed_bytecode()
    }

    /// Whether the path names a shared library, either by its suffix or by its contents.
    pub fn is_dynamic_library(&self) -> bool {
        if !matches!(self.is_file(), Ok(true)) {
            return false;
        }
        let last = self.last_component().as_bytes();
        let has_suffix = validity::suffix_start(last)
            .is_some_and(|dot| &last[dot + 1..] == Path::dynamic_library_suffix().as_bytes());

        has_suffix
            || matches!(
                self.magic_number(magic::ELF_HEADER_PREFIX_LEN),
                Ok(Some(header)) if magic::is_shared_object(&header)
            )
    }
}

fn open_for_magic(pathname: &CStr) -> Result<Fd, DiskError> {
    // Don't block on FIFOs, they are rejected once the file type is known.
    Fd::open(pathname, libc::O_RDONLY | libc::O_NONBLOCK, 0)
}
