use std::ffi::{CStr, OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::ptr::NonNull;

use libc::DIR;

use crate::fs::error::DiskError;
use crate::fs::syscall::err_no;

/// An open directory stream, closed when dropped.
#[derive(Debug)]
pub(crate) struct Directory {
    stream: NonNull<DIR>,
}

impl Directory {
    pub fn open(pathname: &CStr) -> Result<Directory, DiskError> {
        // SAFETY: pathname is a valid, null-terminated string for the duration of the call.
        match NonNull::new(unsafe { libc::opendir(pathname.as_ptr()) }) {
            Some(stream) => Ok(Directory { stream }),
            None => Err(DiskError::from_errno(err_no())),
        }
    }

    pub fn entries(&mut self) -> DirEntries<'_> {
        DirEntries { dir: self }
    }
}

impl Drop for Directory {
    fn drop(&mut self) {
        // SAFETY: The stream came from opendir and is never used again.
        if unsafe { libc::closedir(self.stream.as_ptr()) } == -1 {
            tracing::warn!(errno = err_no(), "error while closing directory stream");
        }
    }
}

/// The names of the entries in a [`Directory`], without `.` and `..`.
pub(crate) struct DirEntries<'a> {
    dir: &'a mut Directory,
}

impl<'a> Iterator for DirEntries<'a> {
    type Item = Result<OsString, DiskError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // readdir only reports errors through errno, so it has to be cleared first.
            // SAFETY: __errno_location always returns a valid pointer to this thread's errno.
            unsafe { *libc::__errno_location() = 0 };
            // SAFETY: The stream is open for as long as self.dir lives.
            let entry = unsafe { libc::readdir(self.dir.stream.as_ptr()) };
            if entry.is_null() {
                return match err_no() {
                    0 => None,
                    e => Some(Err(DiskError::from_errno(e))),
                };
            }
            // SAFETY: readdir returned a valid entry, whose name is null-terminated and stays
            // valid until the next call on this stream.
            let name = unsafe { CStr::from_ptr((*entry).d_name.as_ptr()) }.to_bytes();
            if name == b"." || name == b".." {
                continue;
            }
            return Some(Ok(OsStr::from_bytes(name).to_owned()));
        }
    }
}
