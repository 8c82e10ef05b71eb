use std::collections::BTreeSet;
use std::ffi::CStr;
use std::sync::OnceLock;

use libc::{c_int, mode_t};

use crate::fs::error::{DiskError, NonDirComponentError};
use crate::fs::fd::Fd;
use crate::fs::path::Path;
use crate::fs::path::validity::SEPARATOR;
use crate::fs::status::{self, StatusInfo};
use crate::fs::syscall::err_no;
use crate::fs::FileType;

const NEW_DIR_MODE: mode_t = 0o777;
const NEW_FILE_MODE: mode_t = 0o666;
const PERMISSION_MASK: u32 = 0o7777;

/// The process umask, read once. Reading it requires setting it, which isn't thread safe, so
/// changes made to it after the first read aren't seen.
fn umask() -> mode_t {
    static UMASK: OnceLock<mode_t> = OnceLock::new();
    *UMASK.get_or_init(|| {
        // SAFETY: umask can't fail, and the original mask is restored straight away.
        unsafe {
            let mask = libc::umask(0o022);
            libc::umask(mask);
            mask
        }
    })
}

fn check(res: c_int) -> Result<(), DiskError> {
    match res {
        -1 => Err(DiskError::from_errno(err_no())),
        _ => Ok(()),
    }
}

fn chmod(pathname: &CStr, mode: mode_t) -> Result<(), DiskError> {
    // SAFETY: pathname is a valid, null-terminated string for the duration of the call.
    check(unsafe { libc::chmod(pathname.as_ptr(), mode) })
}

fn mkdir(pathname: &CStr) -> Result<(), DiskError> {
    // SAFETY: pathname is a valid, null-terminated string for the duration of the call.
    check(unsafe { libc::mkdir(pathname.as_ptr(), NEW_DIR_MODE) })
}

impl Path {
    fn add_permission_bits(&self, bits: mode_t) -> Result<(), DiskError> {
        let pathname = self.to_c_string()?;
        let Some(raw) = status::stat(&pathname, false)? else {
            return Ok(());
        };
        chmod(&pathname, (raw.st_mode & PERMISSION_MASK) | (bits & !umask()))
    }

    fn make_on_disk(&self, bits: mode_t, what: &str) {
        if let Err(e) = self.add_permission_bits(bits) {
            tracing::warn!(path = %self, error = %e, "failed to make {what}");
        }
    }

    /// Adds read permission, as far as the umask allows. Use [`can_read`](Path::can_read) to
    /// check the outcome.
    pub fn make_readable_on_disk(&self) {
        self.make_on_disk(0o444, "readable");
    }

    /// Adds write permission, as far as the umask allows. Use [`can_write`](Path::can_write) to
    /// check the outcome.
    pub fn make_writeable_on_disk(&self) {
        self.make_on_disk(0o222, "writeable");
    }

    /// Adds execute permission, as far as the umask allows. Use
    /// [`can_execute`](Path::can_execute) to check the outcome.
    pub fn make_executable_on_disk(&self) {
        self.make_on_disk(0o111, "executable");
    }

    /// Applies the permission bits and the modification time of `info` to the entry. The access
    /// time is left as it is.
    pub fn set_disk_status(&self, info: &StatusInfo) -> Result<(), DiskError> {
        let pathname = self.to_c_string()?;
        chmod(&pathname, info.mode & PERMISSION_MASK)?;

        let times = [
            libc::timespec {
                tv_sec: 0,
                tv_nsec: libc::UTIME_OMIT,
            },
            info.mod_time.to_timespec(),
        ];
        // SAFETY: pathname is null-terminated and times holds exactly the two entries required.
        check(unsafe { libc::utimensat(libc::AT_FDCWD, pathname.as_ptr(), times.as_ptr(), 0) })?;

        tracing::debug!(path = %self, mode = format_args!("{:o}", info.mode), "set disk status");
        Ok(())
    }

    /// Creates the directory. With `create_parents`, missing ancestors are created first and an
    /// existing directory is accepted. Returns `false` for an empty path.
    pub fn create_directory(&self, create_parents: bool) -> Result<bool, DiskError> {
        if self.is_empty() {
            return Ok(false);
        }
        if !create_parents {
            mkdir(&self.to_c_string()?)?;
            tracing::debug!(path = %self, "created directory");
            return Ok(true);
        }

        let text = self.as_bytes();
        let ends = text
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(i, ch)| **ch == SEPARATOR && text[i - 1] != SEPARATOR)
            .map(|(i, _)| i)
            .chain([text.len()]);

        for end in ends {
            let ancestor = Path::from_valid(text[..end].to_vec());
            match mkdir(&ancestor.to_c_string()?) {
                Ok(()) => tracing::debug!(path = %ancestor, "created directory"),
                Err(DiskError::AlreadyExists(_)) => {
                    if !ancestor.is_directory()? {
                        Err(NonDirComponentError)?
                    }
                },
                Err(e) => Err(e)?,
            }
        }
        Ok(true)
    }

    /// Creates an empty file, truncating any file that's already there. The parent directory
    /// must exist. Returns `false` for empty and directory-style paths.
    pub fn create_file(&self) -> Result<bool, DiskError> {
        if self.is_empty() || self.is_directory_style() {
            return Ok(false);
        }
        let fd = Fd::open(
            &self.to_c_string()?,
            libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC,
            NEW_FILE_MODE,
        )?;
        fd.close()?;

        tracing::debug!(path = %self, "created file");
        Ok(true)
    }

    /// Creates an empty file only if nothing exists at the path yet, in a single atomic step.
    pub(crate) fn create_file_exclusive(&self, mode: mode_t) -> Result<(), DiskError> {
        let fd = Fd::open(
            &self.to_c_string()?,
            libc::O_WRONLY | libc::O_CREAT | libc::O_EXCL,
            mode,
        )?;
        fd.close()
    }

    /// Renames the entry to `new_path`, replacing whatever is there if the OS allows it. This
    /// path itself is left unchanged.
    pub fn rename_on_disk(&self, new_path: &Path) -> Result<(), DiskError> {
        let from = self.to_c_string()?;
        let to = new_path.to_c_string()?;
        // SAFETY: Both names are valid, null-terminated strings for the duration of the call.
        check(unsafe { libc::rename(from.as_ptr(), to.as_ptr()) })?;

        tracing::debug!(from = %self, to = %new_path, "renamed");
        Ok(())
    }

    /// Removes the file or directory. A directory is only removed along with its contents if
    /// `destroy_contents` is set. Symlinks are removed themselves, never followed. Returns `false`
    /// if there is nothing to remove.
    pub fn erase_from_disk(&self, destroy_contents: bool) -> Result<bool, DiskError> {
        let Some(raw) = self.stat_no_follow()? else {
            return Ok(false);
        };
        let pathname = self.to_c_string()?;

        if FileType::from_stat_mode(raw.st_mode).is_directory() {
            if destroy_contents {
                let mut entries = BTreeSet::new();
                self.list_directory(&mut entries)?;
                for entry in &entries {
                    entry.erase_from_disk(true)?;
                }
            }
            // SAFETY: pathname is a valid, null-terminated string for the duration of the call.
            check(unsafe { libc::rmdir(pathname.as_ptr()) })?;
        } else {
            // SAFETY: pathname is a valid, null-terminated string for the duration of the call.
            check(unsafe { libc::unlink(pathname.as_ptr()) })?;
        }

        tracing::debug!(path = %self, destroy_contents, "erased from disk");
        Ok(true)
    }

    fn stat_no_follow(&self) -> Result<Option<libc::stat>, DiskError> {
        if self.is_empty() {
            return Ok(None);
        }
        status::stat(&self.to_c_string()?, true)
    }
}
